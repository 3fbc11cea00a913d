//! Storage abstractions and their implementations
//!
//! Each store is a trait so the Postgres backend can be swapped for the
//! in-memory one (used by tests and the `memory` backend mode) without
//! touching handlers or middleware.

pub mod memory;
pub mod preference;
pub mod session;
pub mod user;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::DatabaseResult;
use uuid::Uuid;

use crate::models::{NewUser, Session, User};

pub use memory::MemoryStore;
pub use preference::PreferenceRepository;
pub use session::SessionRepository;
pub use user::UserRepository;

/// Store of user records and their credential material
///
/// Username and email uniqueness is enforced by the store itself (unique
/// constraints), never by a read-then-write check in application code.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; a duplicate username or email surfaces as a
    /// uniqueness violation.
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User>;

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>>;

    /// Stamp the user's last successful login.
    async fn record_login(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<()>;
}

/// Store of server-side sessions keyed by opaque session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session; an id collision surfaces as a uniqueness violation
    /// and the caller regenerates the id and retries.
    async fn create(&self, session: Session) -> DatabaseResult<()>;

    async fn lookup(&self, session_id: &str) -> DatabaseResult<Option<Session>>;

    /// Advance `last_activity` to `now`. Monotonic: a stale writer never
    /// moves the timestamp backward.
    async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> DatabaseResult<()>;

    /// Remove a session. Idempotent; deleting a missing id is not an error.
    async fn delete(&self, session_id: &str) -> DatabaseResult<()>;
}

/// Store of per-user string preferences, unique per (user, key)
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_all(&self, user_id: Uuid) -> DatabaseResult<HashMap<String, String>>;

    /// Upsert every entry, atomically across keys.
    async fn upsert_all(
        &self,
        user_id: Uuid,
        preferences: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<()>;
}
