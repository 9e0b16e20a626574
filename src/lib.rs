//! Client for the solar asset oracle backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Dashboard` is the view-state controller. It talks to the backend through
//! the `net::api::OracleApi` seam, keeps its state in `state`, and is drawn by
//! `render`. The `oraclex` binary drives it from one-shot subcommands or the
//! interactive `shell`.

pub mod config;
pub mod dashboard;
pub mod net;
pub mod render;
pub mod shell;
pub mod state;
