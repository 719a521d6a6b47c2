//! Federation director library.
//!
//! Origins and caches advertise the namespaces they serve; clients ask which
//! servers cover an object path and get redirected to one of them.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use config::schema::DirectorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use registry::{AdRecorder, AdRegistry, ExpirationSweeper, PathResolver, Resolution};
