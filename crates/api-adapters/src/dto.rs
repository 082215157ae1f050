//! Wire shapes. Request bodies reject unknown fields and carry wide integers
//! so channel bounds surface as domain validation errors rather than decode
//! failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::{DomainError, Peblob, PeblobStatus, Ptiblob};
use services::{NewPeblob, PeblobPatch};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PtiblobDto {
    pub r: i64,
    pub g: i64,
    pub b: i64,
}

impl PtiblobDto {
    pub fn to_domain(self) -> Result<Ptiblob, DomainError> {
        Ptiblob::try_new(self.r, self.g, self.b)
    }
}

fn convert_structure(rows: Vec<Vec<PtiblobDto>>) -> Result<Vec<Vec<Ptiblob>>, DomainError> {
    rows.into_iter()
        .map(|row| row.into_iter().map(PtiblobDto::to_domain).collect())
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreatePeblobRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    pub structure: Vec<Vec<PtiblobDto>>,
}

impl CreatePeblobRequest {
    pub fn into_new_peblob(self) -> Result<NewPeblob, DomainError> {
        Ok(NewPeblob {
            name: self.name,
            user_id: self.user_id,
            structure: convert_structure(self.structure)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdatePeblobRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub structure: Option<Vec<Vec<PtiblobDto>>>,
    #[serde(default)]
    pub status: Option<PeblobStatus>,
}

impl UpdatePeblobRequest {
    pub fn into_patch(self) -> Result<PeblobPatch, DomainError> {
        Ok(PeblobPatch {
            name: self.name,
            user_id: self.user_id,
            structure: self.structure.map(convert_structure).transpose()?,
            status: self.status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    pub name: Option<String>,
    pub size: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BrightnessQuery {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Response entity; includes the derived `size` alongside the record fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeblobResponse {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub size: usize,
    pub structure: Vec<Vec<Ptiblob>>,
    pub status: PeblobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Peblob> for PeblobResponse {
    fn from(peblob: Peblob) -> Self {
        Self {
            id: peblob.id,
            name: peblob.name,
            user_id: peblob.user_id,
            size: peblob.structure.len(),
            structure: peblob.structure,
            status: peblob.status,
            created_at: peblob.created_at,
            updated_at: peblob.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DominantColorResponse {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub hex: String,
}

impl From<Ptiblob> for DominantColorResponse {
    fn from(color: Ptiblob) -> Self {
        Self {
            r: color.r,
            g: color.g,
            b: color.b,
            hex: color.to_hex(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedCountResponse {
    pub deleted_count: u64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}
