//! services/api/src/adapters/store.rs
//!
//! This module contains the store adapter, the concrete implementation of the
//! `CourseStore` port. The whole course list is kept as one JSON document in a
//! SQLite key-value table, replaced wholesale on every write.

use async_trait::async_trait;
use chrono::Utc;
use learning_path_core::domain::Course;
use learning_path_core::ports::{CourseStore, PortError, PortResult};
use sqlx::SqlitePool;
use tracing::{error, warn};

/// The record name the course list is stored under.
pub const COURSES_KEY: &str = "courses";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A store adapter that implements the `CourseStore` port.
#[derive(Clone)]
pub struct SqliteCourseStore {
    pool: SqlitePool,
}

impl SqliteCourseStore {
    /// Creates a new `SqliteCourseStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn read_raw(&self) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(COURSES_KEY)
            .fetch_optional(&self.pool)
            .await
    }
}

//=========================================================================================
// `CourseStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CourseStore for SqliteCourseStore {
    async fn read(&self) -> Vec<Course> {
        let raw = match self.read_raw().await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Failed to read the course list, starting empty: {}", e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Stored course list is not valid, starting empty: {}", e);
            Vec::new()
        })
    }

    async fn write(&self, courses: &[Course]) -> PortResult<()> {
        let value =
            serde_json::to_string(courses).map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(COURSES_KEY)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
