//! The web routing and orchestration layer for the Peblob API.
//!
//! Everything is gated behind `web-axum` so the domain and service crates can
//! be consumed without pulling in the web stack.

#[cfg(feature = "web-axum")]
pub mod dto;
#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod handlers;

#[cfg(feature = "web-axum")]
mod router;

#[cfg(feature = "web-axum")]
pub use router::{router, AppState};
