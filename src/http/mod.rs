//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, base path check)
//!     → request.rs (request ID assigned and echoed)
//!     → routing::RouteTable (binding lookup)
//!     → dispatch.rs (parameter binding, catalog call, status + body)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod server;

pub use dispatch::{dispatch, DispatchError, Reply, ReplyBody, JOKE};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
