//! Catalog subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher (http::dispatch)
//!     → store.rs (list / get / add / replace / remove)
//!     → Vec<String> behind a single Mutex
//! ```
//!
//! # Design Decisions
//! - One lock around the whole sequence; each operation is one critical section
//! - Titles compared byte-for-byte (case-sensitive)
//! - Duplicates permitted, insertion order preserved

pub mod store;

pub use store::{CatalogStore, SEED_TITLES};
