//! Application state shared across handlers

use std::sync::Arc;

use crate::{
    config::AuthConfig,
    repositories::{PreferenceStore, SessionStore, UserStore},
};

/// Application state shared across handlers
///
/// Stores are held as trait objects so the Postgres and in-memory backends
/// are interchangeable.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub config: AuthConfig,
}
