//! Session model and related functionality

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How long a session may live regardless of activity.
pub const ABSOLUTE_TTL_HOURS: i64 = 24;

/// How long a session may sit idle before it is invalidated.
pub const INACTIVITY_TIMEOUT_MINUTES: i64 = 30;

/// Session entity
///
/// Bound to exactly one user; a user may hold any number of concurrent
/// sessions (one per device). The id is an opaque 32-byte random token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub session_id: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Why a looked-up session was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionRejection {
    /// Past the absolute 24h ceiling
    ExpiredAbsolute,
    /// Idle for longer than the inactivity window
    Inactive,
}

impl SessionRejection {
    /// Reason string surfaced to the client.
    ///
    /// Inactivity is deliberately distinguished; absolute expiry shares the
    /// generic message with lookup misses so the two are indistinguishable
    /// to a token holder.
    pub fn reason(&self) -> &'static str {
        match self {
            SessionRejection::ExpiredAbsolute => "Session expired or invalid",
            SessionRejection::Inactive => "Session timed out due to inactivity",
        }
    }
}

impl Session {
    /// Build a fresh session for a user, starting its absolute and
    /// inactivity clocks at `now`.
    pub fn new(session_id: String, user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            user_id,
            created_at: now,
            expires_at: now + Duration::hours(ABSOLUTE_TTL_HOURS),
            last_activity: now,
        }
    }

    /// A session is valid iff it is inside both the absolute window and the
    /// inactivity window.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.check(now).is_ok()
    }

    /// Classify the session at `now`, reporting why it is no longer usable.
    pub fn check(&self, now: DateTime<Utc>) -> Result<(), SessionRejection> {
        if now > self.expires_at {
            return Err(SessionRejection::ExpiredAbsolute);
        }
        if now - self.last_activity > Duration::minutes(INACTIVITY_TIMEOUT_MINUTES) {
            return Err(SessionRejection::Inactive);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_at(now: DateTime<Utc>) -> Session {
        Session::new("test-session".to_string(), Uuid::new_v4(), now)
    }

    #[test]
    fn test_fresh_session_is_valid() {
        let now = Utc::now();
        let session = session_at(now);
        assert!(session.is_valid(now));
        assert_eq!(session.expires_at, now + Duration::hours(24));
    }

    #[test]
    fn test_session_valid_just_inside_inactivity_window() {
        let now = Utc::now();
        let session = session_at(now);
        assert!(session.is_valid(now + Duration::minutes(30)));
    }

    #[test]
    fn test_session_invalid_after_inactivity_window() {
        let now = Utc::now();
        let session = session_at(now);
        let later = now + Duration::minutes(31);
        assert!(!session.is_valid(later));
        assert_eq!(session.check(later), Err(SessionRejection::Inactive));
    }

    #[test]
    fn test_session_invalid_after_absolute_expiry_despite_activity() {
        let now = Utc::now();
        let mut session = session_at(now);
        // Recent activity does not save a session past its absolute ceiling.
        session.last_activity = now + Duration::hours(24);
        let later = now + Duration::hours(24) + Duration::seconds(1);
        assert!(!session.is_valid(later));
        assert_eq!(session.check(later), Err(SessionRejection::ExpiredAbsolute));
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(
            SessionRejection::Inactive.reason(),
            "Session timed out due to inactivity"
        );
        assert_eq!(
            SessionRejection::ExpiredAbsolute.reason(),
            "Session expired or invalid"
        );
    }
}
