//! # Worker Repository
//!
//! Inert reference data: staff members that documents point at.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::Worker;

/// Repository for worker database operations.
#[derive(Debug, Clone)]
pub struct WorkerRepository {
    pool: SqlitePool,
}

impl WorkerRepository {
    /// Creates a new WorkerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        WorkerRepository { pool }
    }

    /// Inserts a new worker.
    pub async fn insert(&self, worker: &Worker) -> DbResult<()> {
        debug!(id = %worker.id, name = %worker.name, "Inserting worker");

        sqlx::query("INSERT INTO workers (id, name, phone, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(&worker.id)
            .bind(&worker.name)
            .bind(&worker.phone)
            .bind(worker.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Gets a worker by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Worker>> {
        let worker = sqlx::query_as::<_, Worker>(
            "SELECT id, name, phone, created_at FROM workers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(worker)
    }

    /// Lists workers sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Worker>> {
        let workers =
            sqlx::query_as::<_, Worker>("SELECT id, name, phone, created_at FROM workers ORDER BY name")
                .fetch_all(&self.pool)
                .await?;

        Ok(workers)
    }
}
