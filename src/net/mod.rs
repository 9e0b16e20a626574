//! Networking for the oracle backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls, `feed` manages the live websocket, `normalize`
//! turns loose JSON into the canonical shapes in `types`.

pub mod api;
pub mod feed;
pub mod normalize;
pub mod types;
