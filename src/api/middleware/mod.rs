//! API middleware stack.
//!
//! A single layer: actor resolution. It attaches `Option<Actor>` to
//! every request and never rejects, so each endpoint can choose between
//! strict (401/403) and best-effort (zero snapshot) behavior.

pub mod auth;
