//! User preference model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single user preference, unique per (user_id, key)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Preference {
    pub user_id: Uuid,
    pub preference_key: String,
    pub preference_value: String,
    pub updated_at: DateTime<Utc>,
}
