//! Preference repository for database operations

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use uuid::Uuid;

use super::PreferenceStore;
use crate::models::Preference;

/// Postgres-backed preference store
#[derive(Clone)]
pub struct PreferenceRepository {
    pool: PgPool,
}

impl PreferenceRepository {
    /// Create a new preference repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PreferenceRepository {
    async fn get_all(&self, user_id: Uuid) -> DatabaseResult<HashMap<String, String>> {
        let rows = sqlx::query_as::<_, Preference>(
            r#"
            SELECT user_id, preference_key, preference_value, updated_at
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows
            .into_iter()
            .map(|p| (p.preference_key, p.preference_value))
            .collect())
    }

    async fn upsert_all(
        &self,
        user_id: Uuid,
        preferences: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        // One transaction across all keys, so a failure mid-update never
        // leaves a partially applied preference set.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(DatabaseError::from_query)?;

        for (key, value) in preferences {
            sqlx::query(
                r#"
                INSERT INTO user_preferences (user_id, preference_key, preference_value, updated_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (user_id, preference_key)
                DO UPDATE SET preference_value = $3, updated_at = $4
                "#,
            )
            .bind(user_id)
            .bind(key)
            .bind(value)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_query)?;
        }

        tx.commit().await.map_err(DatabaseError::from_query)?;

        Ok(())
    }
}
