//! Session authentication middleware
//!
//! Two variants over the same per-request state machine: `require_auth`
//! rejects unauthenticated requests with 401, `optional_auth` lets them
//! through anonymously. Both evict dead sessions server-side and clear the
//! client cookie, and both refresh the activity clock on success.

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    error::AuthError,
    repositories::{SessionStore as _, UserStore as _},
    state::AppState,
};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session_id";

/// User identity attached to authenticated requests
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Outcome of resolving the session cookie, attached to request extensions
/// by `optional_auth` so handlers can classify absence without failing.
#[derive(Debug, Clone)]
pub enum SessionInfo {
    /// No session cookie was presented
    Anonymous,
    /// A cookie was presented but the session is gone, expired, or idle
    Invalid { reason: &'static str },
    /// The session is live; activity has been refreshed
    Authenticated(AuthUser),
}

/// Walk the session state machine for one request.
///
/// On any invalid outcome the server-side record has already been deleted
/// where one existed; the caller is responsible for clearing the cookie.
async fn resolve_session(state: &AppState, jar: &CookieJar) -> Result<SessionInfo, AuthError> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(SessionInfo::Anonymous);
    };
    let session_id = cookie.value();
    let now = Utc::now();

    let Some(session) = state.sessions.lookup(session_id).await? else {
        return Ok(SessionInfo::Invalid {
            reason: "Session expired or invalid",
        });
    };

    if let Err(rejection) = session.check(now) {
        // Expiry is expected lifecycle, not a failure.
        debug!("Evicting session for user {}: {:?}", session.user_id, rejection);
        state.sessions.delete(session_id).await?;
        return Ok(SessionInfo::Invalid {
            reason: rejection.reason(),
        });
    }

    state.sessions.touch(session_id, now).await?;

    let Some(user) = state.users.find_by_id(session.user_id).await? else {
        // Session points at a user that no longer exists; evict it.
        state.sessions.delete(session_id).await?;
        return Ok(SessionInfo::Invalid {
            reason: "Session expired or invalid",
        });
    };

    Ok(SessionInfo::Authenticated(AuthUser {
        id: user.id,
        username: user.username,
        email: user.email,
    }))
}

fn clear_session_cookie(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/"))
}

/// Reject the request unless it carries a valid session.
///
/// Attaches [`AuthUser`] to request extensions on success.
pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match resolve_session(&state, &jar).await {
        Ok(SessionInfo::Authenticated(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(SessionInfo::Anonymous) => AuthError::AuthRequired.into_response(),
        Ok(SessionInfo::Invalid { reason }) => (
            clear_session_cookie(jar),
            AuthError::SessionInvalid(reason),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Resolve the session if one is present, but never reject.
///
/// Attaches [`SessionInfo`] for every request and [`AuthUser`] when
/// authenticated. Invalid sessions get the same server-side cleanup as
/// `require_auth`; store failures degrade to anonymous.
pub async fn optional_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let (info, jar) = match resolve_session(&state, &jar).await {
        Ok(info @ SessionInfo::Invalid { .. }) => (info, clear_session_cookie(jar)),
        Ok(info) => (info, jar),
        Err(e) => {
            error!("Optional auth store error: {}", e);
            (SessionInfo::Anonymous, jar)
        }
    };

    if let SessionInfo::Authenticated(ref user) = info {
        req.extensions_mut().insert(user.clone());
    }
    req.extensions_mut().insert(info);

    (jar, next.run(req).await).into_response()
}
