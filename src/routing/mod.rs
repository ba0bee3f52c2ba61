//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path relative to the controller base)
//!     → router.rs (binding lookup by method + pattern)
//!     → matcher.rs (segment-wise pattern match, variable capture)
//!     → Return: Matched(binding, route values) | MethodNotAllowed | NotFound
//!
//! Table Compilation (at startup):
//!     declarations (method, pattern, operation, parameter sources)
//!     → parse patterns into segments
//!     → reject multi-variable patterns and overlapping bindings
//!     → freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Table built once at startup, immutable at runtime
//! - Method is part of the match key, never a tie-break
//! - No two bindings may overlap in (method, path) space
//! - First match wins, which equals unique match under the overlap check

pub mod matcher;
pub mod router;

pub use matcher::{PathPattern, RouteValues, Segment};
pub use router::{
    BoundParams, Operation, ParamSource, ParamSpec, Resolution, RouteBinding, RouteMatch,
    RouteTable, RouteTableError,
};
