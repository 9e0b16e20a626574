//! Terminal rendering of the dashboard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every function here is a pure `String` producer over dashboard state. The
//! binary decides when to print. `screen` composes the header, the routed
//! view, the modal overlay, and the alert, in that order.


pub mod chart;
pub mod detail;
pub mod list;
pub mod modal;

use crate::dashboard::Dashboard;
use crate::state::ui::Route;

pub const TITLE: &str = "OracleX Lite";

/// Title bar with the action available from the current route.
#[must_use]
pub fn header(route: Route) -> String {
    let action = match route {
        Route::List => "[INITIALIZE_ASSET]",
        Route::Detail => "[<- DASHBOARD]",
    };
    let rule = "=".repeat(60);
    format!("{TITLE:<40}{action:>20}\n{rule}\n")
}

/// Full screen for the dashboard's current state.
#[must_use]
pub fn screen(dash: &Dashboard) -> String {
    let mut out = header(dash.ui.route);
    match dash.ui.route {
        Route::List => out.push_str(&list::bond_list(&dash.registry.bonds)),
        Route::Detail => {
            let ctx = detail::DetailContext { variant: dash.variant(), logged_today: dash.has_logged_today() };
            out.push_str(&detail::detail_view(&dash.detail, ctx));
        }
    }
    if let Some(draft) = dash.draft.as_ref().filter(|_| dash.ui.modal_open) {
        out.push('\n');
        out.push_str(&modal::registration_modal(draft));
    }
    if let Some(message) = &dash.ui.alert {
        out.push('\n');
        out.push_str(&modal::alert_box(message));
    }
    out
}
