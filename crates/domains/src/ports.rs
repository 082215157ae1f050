//! # Core Traits (Ports)
//!
//! Contracts implemented by the adapter crates. The binary assembles one
//! implementation of each behind dynamic dispatch.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Peblob, StatusCounts, UserProfile};

/// Persistence boundary for Peblobs. Backed either by an in-process
/// collection or an external document store; the contracts are equivalent.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PeblobRepository: Send + Sync {
    async fn insert(&self, peblob: Peblob) -> Result<Peblob>;

    async fn find_all(&self) -> Result<Vec<Peblob>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Peblob>>;
    /// Exact grid-size match.
    async fn find_by_size(&self, size: usize) -> Result<Vec<Peblob>>;
    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Peblob>>;
    /// Peblobs with no owner.
    async fn find_public(&self) -> Result<Vec<Peblob>>;

    /// Replaces the stored record with the same id; `None` when unknown.
    async fn replace(&self, peblob: Peblob) -> Result<Option<Peblob>>;

    /// `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool>;
    /// Returns the number of records removed.
    async fn delete_by_user(&self, user_id: &str) -> Result<u64>;

    async fn count_by_status(&self) -> Result<StatusCounts>;
}

/// Thin client over the external User service. Implementations degrade:
/// transport failures and malformed payloads resolve to `false`/`None`/empty
/// and are never surfaced to the caller.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `false` when there is no backing service to ask; callers skip
    /// existence probes entirely instead of treating every user as absent.
    fn can_verify(&self) -> bool {
        true
    }

    /// `false` on non-success response or transport failure.
    async fn exists(&self, user_id: &str) -> bool;

    /// `None` on non-success response, malformed payload, or transport
    /// failure.
    async fn profile(&self, user_id: &str) -> Option<UserProfile>;

    /// Fetches each id independently; unresolved ids are omitted and the
    /// resolved entries follow input order.
    async fn profiles(&self, user_ids: &[String]) -> Vec<UserProfile> {
        let mut resolved = Vec::new();
        for user_id in user_ids {
            if let Some(profile) = self.profile(user_id).await {
                resolved.push(profile);
            }
        }
        resolved
    }

    /// Best-effort activity notification; failures are logged and swallowed
    /// by the implementation, never affecting the caller's outcome.
    async fn notify_activity(&self, user_id: &str, action: &str, details: Option<String>);
}
