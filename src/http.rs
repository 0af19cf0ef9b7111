//! Authenticated request layer for the host REST API.

pub mod client;
pub mod session;
