//! Shared assembly helpers for the end-to-end tests: a real service over the
//! in-memory repository, with the null user directory standing in for the
//! external service.

use std::sync::Arc;

use services::{CreationPolicy, PeblobService};
use storage_adapters::MemoryPeblobRepository;
use user_adapters::NullUserDirectory;

pub fn memory_service() -> PeblobService {
    memory_service_with_policy(CreationPolicy::default())
}

pub fn memory_service_with_policy(policy: CreationPolicy) -> PeblobService {
    PeblobService::new(
        Arc::new(MemoryPeblobRepository::new()),
        Arc::new(NullUserDirectory),
        policy,
    )
}

#[cfg(feature = "web-axum")]
pub fn test_router() -> axum::Router {
    test_router_with_policy(CreationPolicy::default())
}

#[cfg(feature = "web-axum")]
pub fn test_router_with_policy(policy: CreationPolicy) -> axum::Router {
    api_adapters::router(api_adapters::AppState {
        service: Arc::new(memory_service_with_policy(policy)),
    })
}
