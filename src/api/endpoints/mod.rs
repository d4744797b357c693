//! API endpoint handlers, one module per surface area.

pub mod chat;
pub mod feedback;
pub mod health;
pub mod letters;
pub mod notifications;
