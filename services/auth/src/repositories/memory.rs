//! In-memory store implementations
//!
//! Backs the `memory` storage mode and the middleware/handler tests. Same
//! observable semantics as the Postgres repositories, including uniqueness
//! violations and monotonic activity updates.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{DatabaseError, DatabaseResult};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{PreferenceStore, SessionStore, UserStore};
use crate::models::{NewUser, Preference, Session, User};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    sessions: HashMap<String, Session>,
    preferences: HashMap<Uuid, HashMap<String, Preference>>,
}

/// Single in-memory backend implementing all three stores
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let mut inner = self.inner.lock().await;

        if inner
            .users
            .values()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(DatabaseError::UniqueViolation(
                "duplicate username or email".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            salt: new_user.salt,
            created_at: Utc::now(),
            last_login: None,
        };
        inner.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> DatabaseResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> DatabaseResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(user) = inner.users.get_mut(&id) {
            user.last_login = Some(now);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, session: Session) -> DatabaseResult<()> {
        let mut inner = self.inner.lock().await;

        if inner.sessions.contains_key(&session.session_id) {
            return Err(DatabaseError::UniqueViolation(
                "duplicate session id".to_string(),
            ));
        }

        inner.sessions.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn lookup(&self, session_id: &str) -> DatabaseResult<Option<Session>> {
        let inner = self.inner.lock().await;
        Ok(inner.sessions.get(session_id).cloned())
    }

    async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> DatabaseResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(session) = inner.sessions.get_mut(session_id) {
            session.last_activity = session.last_activity.max(now);
        }
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> DatabaseResult<()> {
        let mut inner = self.inner.lock().await;
        inner.sessions.remove(session_id);
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get_all(&self, user_id: Uuid) -> DatabaseResult<HashMap<String, String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .preferences
            .get(&user_id)
            .map(|prefs| {
                prefs
                    .values()
                    .map(|p| (p.preference_key.clone(), p.preference_value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn upsert_all(
        &self,
        user_id: Uuid,
        preferences: &HashMap<String, String>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        let mut inner = self.inner.lock().await;
        let user_prefs = inner.preferences.entry(user_id).or_default();
        for (key, value) in preferences {
            user_prefs.insert(
                key.clone(),
                Preference {
                    user_id,
                    preference_key: key.clone(),
                    preference_value: value.clone(),
                    updated_at: now,
                },
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            salt: "salt".to_string(),
        }
    }

    #[tokio::test]
    async fn test_user_uniqueness_enforced() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("alice", "alice@x.com"))
            .await
            .unwrap();

        let dup_name = UserStore::create(&store, new_user("alice", "other@x.com")).await;
        assert!(matches!(dup_name, Err(DatabaseError::UniqueViolation(_))));

        let dup_email = UserStore::create(&store, new_user("bob", "alice@x.com")).await;
        assert!(matches!(dup_email, Err(DatabaseError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_session_create_lookup_delete() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let session = Session::new("sid-1".to_string(), Uuid::new_v4(), now);

        SessionStore::create(&store, session.clone()).await.unwrap();
        let found = store.lookup("sid-1").await.unwrap().unwrap();
        assert_eq!(found.user_id, session.user_id);

        // Duplicate id is a uniqueness violation.
        let dup = SessionStore::create(&store, session).await;
        assert!(matches!(dup, Err(DatabaseError::UniqueViolation(_))));

        store.delete("sid-1").await.unwrap();
        assert!(store.lookup("sid-1").await.unwrap().is_none());

        // Deleting again is idempotent.
        store.delete("sid-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_touch_is_monotonic() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let session = Session::new("sid-2".to_string(), Uuid::new_v4(), now);
        SessionStore::create(&store, session).await.unwrap();

        let later = now + Duration::minutes(5);
        store.touch("sid-2", later).await.unwrap();

        // A stale writer must not move the clock backward.
        store.touch("sid-2", now).await.unwrap();

        let found = store.lookup("sid-2").await.unwrap().unwrap();
        assert_eq!(found.last_activity, later);
    }

    #[tokio::test]
    async fn test_concurrent_sessions_per_user() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        SessionStore::create(&store, Session::new("device-a".to_string(), user_id, now))
            .await
            .unwrap();
        SessionStore::create(&store, Session::new("device-b".to_string(), user_id, now))
            .await
            .unwrap();

        assert!(store.lookup("device-a").await.unwrap().is_some());
        assert!(store.lookup("device-b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_preferences_upsert_and_get() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let mut prefs = HashMap::new();
        prefs.insert("theme".to_string(), "dark".to_string());
        prefs.insert("country".to_string(), "us".to_string());
        store.upsert_all(user_id, &prefs, now).await.unwrap();

        let mut update = HashMap::new();
        update.insert("theme".to_string(), "light".to_string());
        store.upsert_all(user_id, &update, now).await.unwrap();

        let stored = store.get_all(user_id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored["theme"], "light");
        assert_eq!(stored["country"], "us");
    }
}
