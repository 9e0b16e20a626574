//! Local view routing and form inputs.
//!
//! DESIGN
//! ======
//! Three independent bits of presentation state: which view is showing, whether
//! the creation modal is open over it, and an optional blocking alert. There is
//! no history stack; "back" always means the list.

#[cfg(test)]
#[path = "ui_test.rs"]
mod ui_test;

/// Primary view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Route {
    #[default]
    List,
    Detail,
}

#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub route: Route,
    /// Creation modal overlay; independent of `route`.
    pub modal_open: bool,
    /// Blocking alert text, shown until dismissed.
    pub alert: Option<String>,
    /// Raw manual-production input on the detail view.
    pub manual_input: String,
}

impl UiState {
    pub fn show_list(&mut self) {
        self.route = Route::List;
        self.manual_input.clear();
    }

    pub fn show_detail(&mut self) {
        self.route = Route::Detail;
        self.manual_input.clear();
    }

    pub fn raise_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }
}
