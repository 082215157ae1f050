//! # Domain Models
//!
//! Plain serializable records for the Peblob API. Aggregation lives in
//! [`crate::aggregate`] and shape validation in [`crate::validate`] so the
//! records stay independent of any computation over them.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, Result};

/// Smallest grid size accepted at creation time.
pub const MIN_SIZE: usize = 1;
/// Largest grid size accepted at creation time.
pub const MAX_SIZE: usize = 50;

/// A single RGB cell. Channels are bounded to [0, 255] by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ptiblob {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Ptiblob {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a cell from unchecked wide integers, rejecting any channel
    /// outside [0, 255]. Every ingestion boundary goes through here.
    pub fn try_new(r: i64, g: i64, b: i64) -> Result<Self> {
        let check = |channel: char, value: i64| -> Result<u8> {
            u8::try_from(value)
                .map_err(|_| DomainError::ChannelOutOfRange { channel, value })
        };
        Ok(Self {
            r: check('r', r)?,
            g: check('g', g)?,
            b: check('b', b)?,
        })
    }

    /// Lowercase `#rrggbb` representation, each channel zero-padded.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Mean of the three channels, in [0, 255].
    pub fn brightness(&self) -> f64 {
        (self.r as f64 + self.g as f64 + self.b as f64) / 3.0
    }
}

/// Lifecycle status of a Peblob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeblobStatus {
    Active,
    Inactive,
    Archived,
}

impl PeblobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeblobStatus::Active => "active",
            PeblobStatus::Inactive => "inactive",
            PeblobStatus::Archived => "archived",
        }
    }
}

impl FromStr for PeblobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "active" => Ok(PeblobStatus::Active),
            "inactive" => Ok(PeblobStatus::Inactive),
            "archived" => Ok(PeblobStatus::Archived),
            other => Err(DomainError::Validation(format!(
                "unknown status '{other}'"
            ))),
        }
    }
}

/// A square matrix of Ptiblobs, optionally named and optionally owned by a
/// user managed in a separate service. `user_id == None` means public.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peblob {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub structure: Vec<Vec<Ptiblob>>,
    pub status: PeblobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Peblob {
    /// Assembles a fresh record with a new id and matching timestamps.
    /// Callers are expected to have validated the structure already.
    pub fn new(
        name: Option<String>,
        user_id: Option<String>,
        structure: Vec<Vec<Ptiblob>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            user_id,
            structure,
            status: PeblobStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derived grid size: number of rows == number of columns.
    pub fn size(&self) -> usize {
        self.structure.len()
    }

    pub fn is_public(&self) -> bool {
        self.user_id.is_none()
    }

    /// Bounds-checked cell access; `None` for indices outside `[0, size)`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Ptiblob> {
        let size = self.size();
        if row >= size || col >= size {
            return None;
        }
        self.structure.get(row).and_then(|r| r.get(col))
    }

    /// Bounds-checked cell replacement; refreshes `updated_at` on success and
    /// leaves the record untouched on failure.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Ptiblob) -> Result<()> {
        let size = self.size();
        if row >= size || col >= size {
            return Err(DomainError::CellOutOfBounds { row, col, size });
        }
        self.structure[row][col] = cell;
        self.touch();
        Ok(())
    }

    /// Advances `updated_at`; called by every mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Profile shape served by the external User service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub created_at: String,
    pub is_active: bool,
}

/// Collection-wide totals reported by `stats()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
    pub archived: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: usize, cell: Ptiblob) -> Vec<Vec<Ptiblob>> {
        vec![vec![cell; size]; size]
    }

    #[test]
    fn try_new_rejects_out_of_range_channels() {
        assert!(Ptiblob::try_new(0, 0, 0).is_ok());
        assert!(Ptiblob::try_new(255, 255, 255).is_ok());
        for (r, g, b) in [(-1, 0, 0), (0, 256, 0), (0, 0, 999)] {
            let err = Ptiblob::try_new(r, g, b).unwrap_err();
            assert!(matches!(err, DomainError::ChannelOutOfRange { .. }));
        }
    }

    #[test]
    fn to_hex_is_lowercase_and_padded() {
        assert_eq!(Ptiblob::new(255, 10, 0).to_hex(), "#ff0a00");
        assert_eq!(Ptiblob::new(0, 0, 0).to_hex(), "#000000");
    }

    #[test]
    fn brightness_is_channel_mean() {
        assert_eq!(Ptiblob::new(255, 255, 255).brightness(), 255.0);
        assert_eq!(Ptiblob::new(0, 0, 0).brightness(), 0.0);
        assert_eq!(Ptiblob::new(10, 20, 30).brightness(), 20.0);
    }

    #[test]
    fn cell_access_is_bounds_checked() {
        let peblob = Peblob::new(None, None, grid(2, Ptiblob::new(1, 2, 3)));
        assert!(peblob.cell(0, 0).is_some());
        assert!(peblob.cell(1, 1).is_some());
        assert!(peblob.cell(2, 0).is_none());
        assert!(peblob.cell(0, 2).is_none());
    }

    #[test]
    fn set_cell_out_of_bounds_leaves_record_untouched() {
        let mut peblob = Peblob::new(None, None, grid(2, Ptiblob::new(1, 2, 3)));
        let before = peblob.updated_at;
        let err = peblob.set_cell(5, 0, Ptiblob::new(9, 9, 9)).unwrap_err();
        assert!(matches!(err, DomainError::CellOutOfBounds { size: 2, .. }));
        assert_eq!(peblob.updated_at, before);
        assert_eq!(peblob.cell(0, 0), Some(&Ptiblob::new(1, 2, 3)));
    }

    #[test]
    fn set_cell_advances_updated_at() {
        let mut peblob = Peblob::new(None, None, grid(2, Ptiblob::new(1, 2, 3)));
        let before = peblob.updated_at;
        peblob.set_cell(1, 0, Ptiblob::new(9, 9, 9)).unwrap();
        assert_eq!(peblob.cell(1, 0), Some(&Ptiblob::new(9, 9, 9)));
        assert!(peblob.updated_at >= before);
    }

    #[test]
    fn clone_is_a_deep_copy() {
        let original = Peblob::new(None, None, grid(2, Ptiblob::new(1, 2, 3)));
        let mut copy = original.clone();
        copy.set_cell(0, 0, Ptiblob::new(200, 200, 200)).unwrap();
        assert_eq!(original.cell(0, 0), Some(&Ptiblob::new(1, 2, 3)));
        assert_eq!(copy.cell(0, 0), Some(&Ptiblob::new(200, 200, 200)));
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [
            PeblobStatus::Active,
            PeblobStatus::Inactive,
            PeblobStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<PeblobStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<PeblobStatus>().is_err());
    }

    #[test]
    fn peblob_serializes_camel_case() {
        let peblob = Peblob::new(
            Some("demo".into()),
            Some("user-1".into()),
            grid(1, Ptiblob::new(1, 2, 3)),
        );
        let json = serde_json::to_value(&peblob).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["structure"][0][0]["r"], 1);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }
}
