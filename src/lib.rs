//! Library Catalog Service
//!
//! An in-memory catalog of book titles served over HTTP, where each catalog
//! operation is reachable through several method/path bindings.

pub mod catalog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use catalog::CatalogStore;
pub use config::schema::CatalogConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
