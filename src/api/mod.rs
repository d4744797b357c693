//! Clinic portal HTTP API.
//!
//! The router serves the unread-notification endpoints next to the
//! write-side messaging surface that moves the flags those endpoints
//! count. `clinic_router()` returns a composable `Router`; `server`
//! wraps it in a bindable lifecycle with graceful shutdown.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::clinic_router;
pub use server::{start_server_on, ServerHandle};
pub use types::{Actor, ApiContext};
