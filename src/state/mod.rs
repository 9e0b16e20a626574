//! Dashboard state slices.
//!
//! SYSTEM CONTEXT
//! ==============
//! `registry` holds the list view inventory, `detail` the selected bond's
//! scope, `draft` the registration form, and `ui` routing plus overlays. The
//! `Dashboard` controller is the only writer.

pub mod detail;
pub mod draft;
pub mod registry;
pub mod ui;
