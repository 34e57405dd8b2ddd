//! lanshare — self-hosted HTTPS static-file server for ad-hoc LAN sharing.

pub mod certs;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::ServerOptions;
pub use error::ServeError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
