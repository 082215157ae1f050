//! Repository backends for the Peblob API.
//!
//! `MemoryPeblobRepository` is always compiled and backs tests and
//! single-process deployments; the Postgres backend sits behind the
//! `db-postgres` feature.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryPeblobRepository;

#[cfg(feature = "db-postgres")]
pub use postgres::PostgresPeblobRepository;
