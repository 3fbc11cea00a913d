//! Session repository for database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::debug;

use super::SessionStore;
use crate::models::Session;

/// Postgres-backed session store
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn create(&self, session: Session) -> DatabaseResult<()> {
        debug!("Creating session for user: {}", session.user_id);

        sqlx::query(
            r#"
            INSERT INTO sessions (session_id, user_id, created_at, expires_at, last_activity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.session_id)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.last_activity)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn lookup(&self, session_id: &str) -> DatabaseResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT session_id, user_id, created_at, expires_at, last_activity
            FROM sessions
            WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(session)
    }

    async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> DatabaseResult<()> {
        // GREATEST keeps concurrent touches last-writer-wins without ever
        // moving the activity clock backward.
        sqlx::query(
            "UPDATE sessions SET last_activity = GREATEST(last_activity, $2) WHERE session_id = $1",
        )
        .bind(session_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(())
    }

    async fn delete(&self, session_id: &str) -> DatabaseResult<()> {
        debug!("Deleting session");

        sqlx::query("DELETE FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }
}
