//! Authentication service routes

use std::collections::HashMap;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::{
    csrf::csrf_protection,
    error::{AuthError, AuthResult},
    middleware::{AuthUser, SESSION_COOKIE, SessionInfo, optional_auth, require_auth},
    models::{NewUser, Session},
    password::{generate_session_id, hash_password, validate_password, verify_password},
    repositories::{PreferenceStore as _, SessionStore as _, UserStore as _},
    state::AppState,
    validation::validate_email,
};

/// How many times to regenerate the session id if creation hits a collision
const SESSION_CREATE_ATTEMPTS: u32 = 3;

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Request for preference updates
#[derive(Deserialize)]
pub struct UpdatePreferencesRequest {
    pub preferences: Option<HashMap<String, String>>,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/auth/logout", post(logout))
        .route(
            "/api/auth/preferences",
            get(get_preferences).put(update_preferences),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let session_aware = Router::new()
        .route("/api/auth/session", get(session_check))
        .route_layer(middleware::from_fn_with_state(state.clone(), optional_auth));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .merge(protected)
        .merge(session_aware)
        .layer(middleware::from_fn_with_state(state.clone(), csrf_protection))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse> {
    let (Some(username), Some(email), Some(password)) =
        (payload.username, payload.email, payload.password)
    else {
        return Err(AuthError::BadRequest(
            "Username, email, and password are required".to_string(),
        ));
    };

    validate_email(&email).map_err(AuthError::BadRequest)?;

    let check = validate_password(&password);
    if !check.valid {
        return Err(AuthError::PasswordPolicy(check.errors));
    }

    let (password_hash, salt) = hash_password(&password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AuthError::Internal
    })?;

    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
            salt,
        })
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                AuthError::Conflict
            } else {
                AuthError::Database(e)
            }
        })?;

    info!("Registered user: {}", user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "user": user.public(),
        })),
    ))
}

/// Authenticate a user and create a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AuthError::BadRequest(
            "Username and password are required".to_string(),
        ));
    };

    // Unknown user and wrong password produce the same response, so the
    // endpoint cannot be used to enumerate usernames.
    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let verified = verify_password(&password, &user.password_hash, &user.salt).map_err(|e| {
        error!("Failed to verify password: {}", e);
        AuthError::Internal
    })?;
    if !verified {
        return Err(AuthError::InvalidCredentials);
    }

    let now = Utc::now();
    let session_id = create_session_with_retry(&state, user.id).await?;

    state.users.record_login(user.id, now).await?;

    info!("Login successful for user: {}", user.username);

    let cookie = Cookie::build((SESSION_COOKIE, session_id.clone()))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/");

    Ok((
        jar.add(cookie),
        Json(json!({
            "success": true,
            "message": "Login successful",
            "user": {
                "id": user.id,
                "username": user.username,
                "email": user.email,
            },
            "sessionId": session_id,
        })),
    ))
}

/// Insert a fresh session, regenerating the id on the (negligible-probability)
/// collision with an existing one.
async fn create_session_with_retry(
    state: &AppState,
    user_id: uuid::Uuid,
) -> AuthResult<String> {
    for _ in 0..SESSION_CREATE_ATTEMPTS {
        let session_id = generate_session_id();
        let session = Session::new(session_id.clone(), user_id, Utc::now());
        match state.sessions.create(session).await {
            Ok(()) => return Ok(session_id),
            Err(e) if e.is_unique_violation() => continue,
            Err(e) => return Err(AuthError::Database(e)),
        }
    }
    error!("Session id collided {} times in a row", SESSION_CREATE_ATTEMPTS);
    Err(AuthError::Internal)
}

/// Log out the current user and destroy their session
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(user): Extension<AuthUser>,
) -> AuthResult<impl IntoResponse> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.delete(cookie.value()).await?;
    }

    info!("Logout successful for user: {}", user.username);

    Ok((
        jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/")),
        Json(json!({
            "success": true,
            "message": "Logout successful",
        })),
    ))
}

/// Report whether the request carries an active session
///
/// Optional-auth style: absence of a session is a normal answer here,
/// never an error.
pub async fn session_check(Extension(info): Extension<SessionInfo>) -> impl IntoResponse {
    match info {
        SessionInfo::Authenticated(user) => Json(json!({
            "success": true,
            "authenticated": true,
            "user": user,
        })),
        SessionInfo::Invalid { reason } => Json(json!({
            "success": true,
            "authenticated": false,
            "reason": reason,
        })),
        SessionInfo::Anonymous => Json(json!({
            "success": true,
            "authenticated": false,
        })),
    }
}

/// Get all preferences for the current user
pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AuthResult<impl IntoResponse> {
    let preferences = state.preferences.get_all(user.id).await?;

    Ok(Json(json!({
        "success": true,
        "preferences": preferences,
    })))
}

/// Upsert preferences for the current user
pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> AuthResult<impl IntoResponse> {
    let Some(preferences) = payload.preferences else {
        return Err(AuthError::BadRequest(
            "Preferences object is required".to_string(),
        ));
    };

    state
        .preferences
        .upsert_all(user.id, &preferences, Utc::now())
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Preferences updated successfully",
    })))
}
