//! Postgres repository.
//!
//! The structure is persisted as a JSONB document column, matching the
//! document shape `{userId?, name?, structure, status, createdAt, updatedAt}`
//! split across columns for the indexable fields.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use domains::{DomainError, Peblob, PeblobRepository, Ptiblob, Result, StatusCounts};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS peblobs (
    id UUID PRIMARY KEY,
    user_id TEXT,
    name TEXT,
    structure JSONB NOT NULL,
    status TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)";

pub struct PostgresPeblobRepository {
    pool: PgPool,
}

impl PostgresPeblobRepository {
    /// Connects and ensures the `peblobs` table exists.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(storage)?;
        sqlx::query(SCHEMA).execute(&pool).await.map_err(storage)?;
        Ok(Self { pool })
    }

    async fn fetch_where(&self, predicate: &str, bind: Option<&str>) -> Result<Vec<Peblob>> {
        let sql = format!(
            "SELECT id, user_id, name, structure, status, created_at, updated_at \
             FROM peblobs WHERE {predicate} ORDER BY created_at"
        );
        let mut query = sqlx::query(&sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(storage)?;
        rows.into_iter().map(row_to_peblob).collect()
    }
}

fn storage(err: sqlx::Error) -> DomainError {
    DomainError::Storage(err.to_string())
}

fn row_to_peblob(row: PgRow) -> Result<Peblob> {
    let Json(structure): Json<Vec<Vec<Ptiblob>>> =
        row.try_get("structure").map_err(storage)?;
    let status: String = row.try_get("status").map_err(storage)?;
    let status = status
        .parse()
        .map_err(|_| DomainError::Storage(format!("corrupt status '{status}' in peblobs row")))?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(storage)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(storage)?;
    Ok(Peblob {
        id: row.try_get("id").map_err(storage)?,
        user_id: row.try_get("user_id").map_err(storage)?,
        name: row.try_get("name").map_err(storage)?,
        structure,
        status,
        created_at,
        updated_at,
    })
}

#[async_trait]
impl PeblobRepository for PostgresPeblobRepository {
    async fn insert(&self, peblob: Peblob) -> Result<Peblob> {
        sqlx::query(
            "INSERT INTO peblobs (id, user_id, name, structure, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(peblob.id)
        .bind(&peblob.user_id)
        .bind(&peblob.name)
        .bind(Json(&peblob.structure))
        .bind(peblob.status.as_str())
        .bind(peblob.created_at)
        .bind(peblob.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(peblob)
    }

    async fn find_all(&self) -> Result<Vec<Peblob>> {
        self.fetch_where("TRUE", None).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Peblob>> {
        let row = sqlx::query(
            "SELECT id, user_id, name, structure, status, created_at, updated_at \
             FROM peblobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        row.map(row_to_peblob).transpose()
    }

    async fn find_by_size(&self, size: usize) -> Result<Vec<Peblob>> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, structure, status, created_at, updated_at \
             FROM peblobs WHERE jsonb_array_length(structure) = $1 ORDER BY created_at",
        )
        .bind(size as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.into_iter().map(row_to_peblob).collect()
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Peblob>> {
        self.fetch_where("user_id = $1", Some(user_id)).await
    }

    async fn find_public(&self) -> Result<Vec<Peblob>> {
        self.fetch_where("user_id IS NULL", None).await
    }

    async fn replace(&self, peblob: Peblob) -> Result<Option<Peblob>> {
        let result = sqlx::query(
            "UPDATE peblobs SET user_id = $2, name = $3, structure = $4, status = $5, \
             updated_at = $6 WHERE id = $1",
        )
        .bind(peblob.id)
        .bind(&peblob.user_id)
        .bind(&peblob.name)
        .bind(Json(&peblob.structure))
        .bind(peblob.status.as_str())
        .bind(peblob.updated_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(peblob))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM peblobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_user(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM peblobs WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected())
    }

    async fn count_by_status(&self) -> Result<StatusCounts> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM peblobs GROUP BY status")
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        let mut counts = StatusCounts::default();
        for row in rows {
            let status: String = row.try_get("status").map_err(storage)?;
            let n: i64 = row.try_get("n").map_err(storage)?;
            let n = n as u64;
            counts.total += n;
            match status.as_str() {
                "active" => counts.active += n,
                "inactive" => counts.inactive += n,
                "archived" => counts.archived += n,
                other => {
                    return Err(DomainError::Storage(format!(
                        "corrupt status '{other}' in peblobs table"
                    )))
                }
            }
        }
        Ok(counts)
    }
}
