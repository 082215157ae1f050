//! Orchestration layer between the API adapters and the ports.
//!
//! `PeblobService` runs validation before any write, computes aggregates over
//! the stored records, and keeps User-service notifications off the request
//! path.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use domains::aggregate;
use domains::validate::validate_square;
use domains::{
    DomainError, Peblob, PeblobRepository, PeblobStatus, Ptiblob, Result, StatusCounts,
    UserDirectory, UserProfile, MAX_SIZE, MIN_SIZE,
};

/// Grid size used by `create_random` when the caller does not supply one.
pub const DEFAULT_RANDOM_SIZE: usize = 3;

/// Creation rules that vary by deployment, resolved at configuration level.
#[derive(Debug, Clone, Copy)]
pub struct CreationPolicy {
    /// Reject creations without a non-blank name.
    pub require_name: bool,
    /// Apply the 1-50 size bound to explicit (non-random) creation too.
    pub bound_explicit_size: bool,
}

impl Default for CreationPolicy {
    fn default() -> Self {
        Self {
            require_name: false,
            bound_explicit_size: true,
        }
    }
}

/// Input for explicit creation.
#[derive(Debug, Clone)]
pub struct NewPeblob {
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub structure: Vec<Vec<Ptiblob>>,
}

/// Partial update; absent fields are left unchanged. Ownership cannot be
/// cleared here, only reassigned (clearing goes through deletion).
#[derive(Debug, Clone, Default)]
pub struct PeblobPatch {
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub structure: Option<Vec<Vec<Ptiblob>>>,
    pub status: Option<PeblobStatus>,
}

/// Per-owner totals: `total_pixels = Σ size²`, `average_size` rounded to the
/// nearest integer (0 when the owner has no peblobs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total: u64,
    pub average_size: u64,
    pub total_pixels: u64,
}

pub struct PeblobService {
    repo: Arc<dyn PeblobRepository>,
    users: Arc<dyn UserDirectory>,
    policy: CreationPolicy,
}

impl PeblobService {
    pub fn new(
        repo: Arc<dyn PeblobRepository>,
        users: Arc<dyn UserDirectory>,
        policy: CreationPolicy,
    ) -> Self {
        Self {
            repo,
            users,
            policy,
        }
    }

    /// Creates a peblob from an explicit structure. All validation happens
    /// before the insert; nothing is written on failure.
    pub async fn create(&self, new: NewPeblob) -> Result<Peblob> {
        self.check_name(new.name.as_deref())?;
        let size = validate_square(&new.structure)?;
        if self.policy.bound_explicit_size {
            Self::check_size(size)?;
        }
        if let Some(user_id) = new.user_id.as_deref() {
            // Ownership does not require upstream existence; a missing owner
            // is only worth a warning, and only when a directory can answer.
            if self.users.can_verify() && !self.users.exists(user_id).await {
                warn!(user_id, "owner unknown to the user service, accepting peblob anyway");
            }
        }
        let stored = self
            .repo
            .insert(Peblob::new(new.name, new.user_id, new.structure))
            .await?;
        if let Some(owner) = stored.user_id.as_deref() {
            self.notify(owner, "peblob.created", Some(format!("size {}", stored.size())));
        }
        Ok(stored)
    }

    /// Creates a peblob of `size x size` cells with uniformly random
    /// channels. The 1-50 bound always applies here.
    pub async fn create_random(&self, name: Option<String>, size: Option<usize>) -> Result<Peblob> {
        self.check_name(name.as_deref())?;
        let size = size.unwrap_or(DEFAULT_RANDOM_SIZE);
        Self::check_size(size)?;
        let structure = {
            let mut rng = rand::thread_rng();
            (0..size)
                .map(|_| {
                    (0..size)
                        .map(|_| Ptiblob::new(rng.gen(), rng.gen(), rng.gen()))
                        .collect()
                })
                .collect()
        };
        self.repo.insert(Peblob::new(name, None, structure)).await
    }

    pub async fn find_all(&self) -> Result<Vec<Peblob>> {
        self.repo.find_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Peblob> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound("Peblob", id.to_string()))
    }

    pub async fn find_by_size(&self, size: usize) -> Result<Vec<Peblob>> {
        self.repo.find_by_size(size).await
    }

    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Peblob>> {
        self.repo.find_by_user(user_id).await
    }

    pub async fn find_public(&self) -> Result<Vec<Peblob>> {
        self.repo.find_public().await
    }

    /// Peblobs whose average brightness falls in `[min, max]` inclusive.
    /// Defaults cover the whole channel range.
    pub async fn find_by_brightness_range(
        &self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Vec<Peblob>> {
        let min = min.unwrap_or(0.0);
        let max = max.unwrap_or(255.0);
        if min > max {
            return Err(DomainError::Validation(format!(
                "brightness range is inverted: min={min}, max={max}"
            )));
        }
        let all = self.repo.find_all().await?;
        Ok(all
            .into_iter()
            .filter(|peblob| {
                let brightness = aggregate::average_brightness(peblob);
                brightness >= min && brightness <= max
            })
            .collect())
    }

    pub async fn dominant_color(&self, id: Uuid) -> Result<Ptiblob> {
        let peblob = self.get(id).await?;
        Ok(aggregate::dominant_color(&peblob))
    }

    /// Applies a partial update. A supplied structure is validated before
    /// anything is read or written.
    pub async fn update(&self, id: Uuid, patch: PeblobPatch) -> Result<Peblob> {
        if let Some(structure) = &patch.structure {
            let size = validate_square(structure)?;
            if self.policy.bound_explicit_size {
                Self::check_size(size)?;
            }
        }
        let mut peblob = self.get(id).await?;
        if let Some(name) = patch.name {
            peblob.name = Some(name);
        }
        if let Some(user_id) = patch.user_id {
            peblob.user_id = Some(user_id);
        }
        if let Some(structure) = patch.structure {
            peblob.structure = structure;
        }
        if let Some(status) = patch.status {
            peblob.status = status;
        }
        peblob.touch();
        self.replace_existing(peblob).await
    }

    /// Replaces a single cell. Unknown ids and out-of-range indices both
    /// surface as not-found; out-of-range channels as validation errors.
    pub async fn update_cell(
        &self,
        id: Uuid,
        row: usize,
        col: usize,
        r: i64,
        g: i64,
        b: i64,
    ) -> Result<Peblob> {
        let cell = Ptiblob::try_new(r, g, b)?;
        let mut peblob = self.get(id).await?;
        peblob.set_cell(row, col, cell)?;
        self.replace_existing(peblob).await
    }

    pub async fn transfer_owner(&self, id: Uuid, new_user_id: &str) -> Result<Peblob> {
        let mut peblob = self.get(id).await?;
        peblob.user_id = Some(new_user_id.to_owned());
        peblob.touch();
        let stored = self.replace_existing(peblob).await?;
        self.notify(new_user_id, "peblob.transferred", Some(stored.id.to_string()));
        Ok(stored)
    }

    pub async fn remove(&self, id: Uuid) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::NotFound("Peblob", id.to_string()));
        }
        Ok(())
    }

    /// Removes every peblob owned by `user_id`, returning the count.
    pub async fn remove_all_for_user(&self, user_id: &str) -> Result<u64> {
        let removed = self.repo.delete_by_user(user_id).await?;
        if removed > 0 {
            self.notify(user_id, "peblobs.purged", Some(removed.to_string()));
        }
        Ok(removed)
    }

    pub async fn stats(&self) -> Result<StatusCounts> {
        self.repo.count_by_status().await
    }

    pub async fn user_stats(&self, user_id: &str) -> Result<UserStats> {
        let peblobs = self.repo.find_by_user(user_id).await?;
        let total = peblobs.len() as u64;
        let total_pixels: u64 = peblobs
            .iter()
            .map(|peblob| (peblob.size() * peblob.size()) as u64)
            .sum();
        let average_size = if total == 0 {
            0
        } else {
            (total_pixels as f64 / total as f64).round() as u64
        };
        Ok(UserStats {
            total,
            average_size,
            total_pixels,
        })
    }

    /// Upstream profile lookup; degrades to `None` per the directory port.
    pub async fn owner_profile(&self, user_id: &str) -> Option<UserProfile> {
        self.users.profile(user_id).await
    }

    fn check_name(&self, name: Option<&str>) -> Result<()> {
        if self.policy.require_name && name.map_or(true, |n| n.trim().is_empty()) {
            return Err(DomainError::Validation("name is required".into()));
        }
        Ok(())
    }

    fn check_size(size: usize) -> Result<()> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(DomainError::SizeOutOfRange {
                size,
                min: MIN_SIZE,
                max: MAX_SIZE,
            });
        }
        Ok(())
    }

    /// Fire-and-forget: the primary request never waits on or fails with the
    /// User service.
    fn notify(&self, user_id: &str, action: &'static str, details: Option<String>) {
        let users = Arc::clone(&self.users);
        let user_id = user_id.to_owned();
        tokio::spawn(async move {
            users.notify_activity(&user_id, action, details).await;
        });
    }

    async fn replace_existing(&self, peblob: Peblob) -> Result<Peblob> {
        let id = peblob.id;
        self.repo
            .replace(peblob)
            .await?
            .ok_or_else(|| DomainError::NotFound("Peblob", id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockPeblobRepository, MockUserDirectory};

    fn service_with(
        repo: MockPeblobRepository,
        users: MockUserDirectory,
        policy: CreationPolicy,
    ) -> PeblobService {
        PeblobService::new(Arc::new(repo), Arc::new(users), policy)
    }

    fn ragged() -> Vec<Vec<Ptiblob>> {
        vec![
            vec![Ptiblob::new(0, 0, 0), Ptiblob::new(0, 0, 0)],
            vec![Ptiblob::new(0, 0, 0)],
        ]
    }

    // Mocks carry no expectations: any repository or directory call panics,
    // proving rejected inputs never reach a port.

    #[tokio::test]
    async fn create_rejects_ragged_structure_before_any_write() {
        let service = service_with(
            MockPeblobRepository::new(),
            MockUserDirectory::new(),
            CreationPolicy::default(),
        );
        let err = service
            .create(NewPeblob {
                name: None,
                user_id: None,
                structure: ragged(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotSquare { row: 1, .. }));
    }

    #[tokio::test]
    async fn create_rejects_empty_structure() {
        let service = service_with(
            MockPeblobRepository::new(),
            MockUserDirectory::new(),
            CreationPolicy::default(),
        );
        let err = service
            .create(NewPeblob {
                name: None,
                user_id: None,
                structure: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::EmptyStructure));
    }

    #[tokio::test]
    async fn create_random_rejects_out_of_range_sizes() {
        let service = service_with(
            MockPeblobRepository::new(),
            MockUserDirectory::new(),
            CreationPolicy::default(),
        );
        for size in [0usize, 51] {
            let err = service
                .create_random(Some("r".into()), Some(size))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::SizeOutOfRange { .. }), "size {size}");
        }
    }

    #[tokio::test]
    async fn require_name_policy_rejects_blank_names() {
        let service = service_with(
            MockPeblobRepository::new(),
            MockUserDirectory::new(),
            CreationPolicy {
                require_name: true,
                ..CreationPolicy::default()
            },
        );
        for name in [None, Some("   ".to_string())] {
            let err = service
                .create(NewPeblob {
                    name,
                    user_id: None,
                    structure: vec![vec![Ptiblob::new(1, 2, 3)]],
                })
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn update_with_ragged_structure_never_reads_the_store() {
        let service = service_with(
            MockPeblobRepository::new(),
            MockUserDirectory::new(),
            CreationPolicy::default(),
        );
        let err = service
            .update(
                Uuid::new_v4(),
                PeblobPatch {
                    structure: Some(ragged()),
                    ..PeblobPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotSquare { .. }));
    }

    #[tokio::test]
    async fn update_cell_rejects_bad_channels_before_fetching() {
        let service = service_with(
            MockPeblobRepository::new(),
            MockUserDirectory::new(),
            CreationPolicy::default(),
        );
        let err = service
            .update_cell(Uuid::new_v4(), 0, 0, 300, 0, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ChannelOutOfRange { .. }));
    }

    #[tokio::test]
    async fn inverted_brightness_range_is_a_validation_error() {
        let service = service_with(
            MockPeblobRepository::new(),
            MockUserDirectory::new(),
            CreationPolicy::default(),
        );
        let err = service
            .find_by_brightness_range(Some(200.0), Some(100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn user_stats_for_sizes_two_and_four() {
        let mut repo = MockPeblobRepository::new();
        repo.expect_find_by_user().returning(|user_id| {
            let owner = Some(user_id.to_owned());
            Ok(vec![
                Peblob::new(None, owner.clone(), vec![vec![Ptiblob::new(0, 0, 0); 2]; 2]),
                Peblob::new(None, owner, vec![vec![Ptiblob::new(0, 0, 0); 4]; 4]),
            ])
        });
        let service = service_with(repo, MockUserDirectory::new(), CreationPolicy::default());
        let stats = service.user_stats("u1").await.unwrap();
        assert_eq!(
            stats,
            UserStats {
                total: 2,
                average_size: 10,
                total_pixels: 20,
            }
        );
    }

    #[tokio::test]
    async fn user_stats_of_empty_owner_is_all_zero() {
        let mut repo = MockPeblobRepository::new();
        repo.expect_find_by_user().returning(|_| Ok(vec![]));
        let service = service_with(repo, MockUserDirectory::new(), CreationPolicy::default());
        let stats = service.user_stats("nobody").await.unwrap();
        assert_eq!(
            stats,
            UserStats {
                total: 0,
                average_size: 0,
                total_pixels: 0,
            }
        );
    }

    #[tokio::test]
    async fn create_accepts_an_unknown_owner_with_a_warning() {
        let mut repo = MockPeblobRepository::new();
        repo.expect_insert().returning(|peblob| Ok(peblob));
        let mut users = MockUserDirectory::new();
        users.expect_can_verify().return_const(true);
        users.expect_exists().returning(|_| false);
        // The spawned notification may or may not run before the test ends.
        users.expect_notify_activity().returning(|_, _, _| ());
        let service = service_with(repo, users, CreationPolicy::default());
        let created = service
            .create(NewPeblob {
                name: Some("owned".into()),
                user_id: Some("ghost".into()),
                structure: vec![vec![Ptiblob::new(5, 5, 5)]],
            })
            .await
            .unwrap();
        assert_eq!(created.user_id.as_deref(), Some("ghost"));
        assert_eq!(created.size(), 1);
    }

    #[tokio::test]
    async fn owner_probe_is_skipped_when_the_directory_cannot_verify() {
        let mut repo = MockPeblobRepository::new();
        repo.expect_insert().returning(|peblob| Ok(peblob));
        let mut users = MockUserDirectory::new();
        users.expect_can_verify().return_const(false);
        users.expect_notify_activity().returning(|_, _, _| ());
        // No exists() expectation: a probe would panic the mock.
        let service = service_with(repo, users, CreationPolicy::default());
        let created = service
            .create(NewPeblob {
                name: None,
                user_id: Some("u1".into()),
                structure: vec![vec![Ptiblob::new(5, 5, 5)]],
            })
            .await
            .unwrap();
        assert_eq!(created.user_id.as_deref(), Some("u1"));
    }
}
