//! Infrastructure adapters: the filesystem content store, the HTTP surface,
//! and telemetry wiring.

pub mod content;
pub mod error;
pub mod http;
pub mod telemetry;
