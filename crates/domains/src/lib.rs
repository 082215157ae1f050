//! The central domain logic and interface definitions for the Peblob API.
//!
//! Holds the data records (`Ptiblob`, `Peblob`), the shape/bounds validation,
//! the aggregate computations, and the port traits implemented by the
//! storage and user-directory adapters.

pub mod aggregate;
pub mod error;
pub mod models;
pub mod ports;
pub mod validate;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use ports::*;
