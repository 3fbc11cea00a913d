//! Authentication service configuration

use anyhow::Result;

/// Deployment posture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }
}

/// Which storage backend to run against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Authentication service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Deployment posture; anything other than an explicit "development"
    /// is treated as production so the CSRF guard fails closed by default
    pub environment: Environment,
    /// Storage backend for users, sessions, and preferences
    pub storage: StorageBackend,
    /// Address the HTTP server binds to
    pub bind_addr: String,
}

impl AuthConfig {
    /// Create a new AuthConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ENVIRONMENT`: "development" or "production" (default: "production")
    /// - `AUTH_STORAGE`: "postgres" or "memory" (default: "postgres")
    /// - `AUTH_BIND_ADDR`: listen address (default: "0.0.0.0:3000")
    pub fn from_env() -> Result<Self> {
        let environment = match std::env::var("ENVIRONMENT").as_deref() {
            Ok("development") => Environment::Development,
            _ => Environment::Production,
        };

        let storage = match std::env::var("AUTH_STORAGE").as_deref() {
            Ok("memory") => StorageBackend::Memory,
            _ => StorageBackend::Postgres,
        };

        let bind_addr =
            std::env::var("AUTH_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        Ok(Self {
            environment,
            storage,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_are_production_postgres() {
        unsafe {
            std::env::remove_var("ENVIRONMENT");
            std::env::remove_var("AUTH_STORAGE");
            std::env::remove_var("AUTH_BIND_ADDR");
        }

        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    #[serial]
    fn test_development_must_be_explicit() {
        unsafe {
            std::env::set_var("ENVIRONMENT", "staging");
        }
        let config = AuthConfig::from_env().unwrap();
        assert_eq!(config.environment, Environment::Production);

        unsafe {
            std::env::set_var("ENVIRONMENT", "development");
        }
        let config = AuthConfig::from_env().unwrap();
        assert!(config.environment.is_development());

        unsafe {
            std::env::remove_var("ENVIRONMENT");
        }
    }
}
