//! Application services layer.

pub mod content_cache;
pub mod error;
pub mod repos;
pub mod sitemap;
