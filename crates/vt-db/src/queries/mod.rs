//! Database query modules.

pub mod shared_links;
pub mod videos;
