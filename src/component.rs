//! Component configuration resolver: type detection, caching, and property storage.

pub mod cache;
pub mod descriptor;
pub mod resolver;
pub mod store;
