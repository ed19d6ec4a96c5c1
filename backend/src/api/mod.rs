//! HTTP API module.
//!
//! JSON endpoints over the registrar plus an SSE stream of notices.

pub mod server;
pub mod types;

pub use server::{router, start_server, SharedRegistrar};
pub use types::*;
