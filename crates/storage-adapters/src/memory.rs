//! In-process repository over a concurrent map.
//!
//! Each logical operation is a single guarded map access, so concurrent
//! handler tasks cannot observe a half-applied mutation.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use domains::{Peblob, PeblobRepository, PeblobStatus, Result, StatusCounts};

#[derive(Default)]
pub struct MemoryPeblobRepository {
    peblobs: DashMap<Uuid, Peblob>,
}

impl MemoryPeblobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn filter<F>(&self, keep: F) -> Vec<Peblob>
    where
        F: Fn(&Peblob) -> bool,
    {
        self.peblobs
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl PeblobRepository for MemoryPeblobRepository {
    async fn insert(&self, peblob: Peblob) -> Result<Peblob> {
        self.peblobs.insert(peblob.id, peblob.clone());
        Ok(peblob)
    }

    async fn find_all(&self) -> Result<Vec<Peblob>> {
        Ok(self.filter(|_| true))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Peblob>> {
        Ok(self.peblobs.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_size(&self, size: usize) -> Result<Vec<Peblob>> {
        Ok(self.filter(|peblob| peblob.size() == size))
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Peblob>> {
        Ok(self.filter(|peblob| peblob.user_id.as_deref() == Some(user_id)))
    }

    async fn find_public(&self) -> Result<Vec<Peblob>> {
        Ok(self.filter(Peblob::is_public))
    }

    async fn replace(&self, peblob: Peblob) -> Result<Option<Peblob>> {
        match self.peblobs.get_mut(&peblob.id) {
            Some(mut entry) => {
                *entry = peblob.clone();
                Ok(Some(peblob))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.peblobs.remove(&id).is_some())
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<u64> {
        let ids: Vec<Uuid> = self
            .peblobs
            .iter()
            .filter(|entry| entry.value().user_id.as_deref() == Some(user_id))
            .map(|entry| *entry.key())
            .collect();
        let mut removed = 0u64;
        for id in ids {
            if self.peblobs.remove(&id).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn count_by_status(&self) -> Result<StatusCounts> {
        let mut counts = StatusCounts::default();
        for entry in self.peblobs.iter() {
            counts.total += 1;
            match entry.value().status {
                PeblobStatus::Active => counts.active += 1,
                PeblobStatus::Inactive => counts.inactive += 1,
                PeblobStatus::Archived => counts.archived += 1,
            }
        }
        Ok(counts)
    }
}
