//! Password policy, hashing, and session token generation
//!
//! Hashes are Argon2id over the password with an explicit 16-byte random
//! salt. The salt is generated and stored separately from the hash rather
//! than relying on the PHC string's embedded salt, so the scheme stays
//! auditable and swappable.

use anyhow::{Result, anyhow};
use argon2::{Argon2, password_hash::Output};
use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;

/// Symbols accepted by the password policy.
const PASSWORD_SYMBOLS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// Minimum password length in characters.
const MIN_PASSWORD_LENGTH: usize = 10;

/// Salt length in bytes.
const SALT_LENGTH: usize = 16;

/// Raw Argon2id output length in bytes.
const HASH_LENGTH: usize = 32;

/// Result of checking a password against the policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check a password against the policy.
///
/// Every rule is evaluated independently so the caller can report all
/// violations at once, in rule order.
pub fn validate_password(password: &str) -> PasswordCheck {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push("Password must be at least 10 characters long".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one number".to_string());
    }

    if !password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        errors.push(
            "Password must contain at least one symbol (!@#$%^&*()_+-=[]{};':\"|,.<>/?)"
                .to_string(),
        );
    }

    PasswordCheck {
        valid: errors.is_empty(),
        errors,
    }
}

/// Hash a password, returning `(hash, salt)` both base64 encoded.
pub fn hash_password(password: &str) -> Result<(String, String)> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let hash = compute_hash(password, &salt)?;

    Ok((
        general_purpose::STANDARD.encode(hash),
        general_purpose::STANDARD.encode(salt),
    ))
}

/// Verify a password against a stored hash and salt.
///
/// Recomputes the hash with the stored salt and compares through the
/// `password_hash` output type, whose equality is constant time.
pub fn verify_password(password: &str, hash_b64: &str, salt_b64: &str) -> Result<bool> {
    let salt = general_purpose::STANDARD
        .decode(salt_b64)
        .map_err(|e| anyhow!("Failed to decode stored salt: {}", e))?;
    let stored = general_purpose::STANDARD
        .decode(hash_b64)
        .map_err(|e| anyhow!("Failed to decode stored hash: {}", e))?;

    let computed = compute_hash(password, &salt)?;

    let stored = Output::new(&stored).map_err(|e| anyhow!("Invalid stored hash: {}", e))?;
    let computed = Output::new(&computed).map_err(|e| anyhow!("Invalid computed hash: {}", e))?;

    Ok(stored == computed)
}

fn compute_hash(password: &str, salt: &[u8]) -> Result<[u8; HASH_LENGTH]> {
    let mut out = [0u8; HASH_LENGTH];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt, &mut out)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(out)
}

/// Generate an opaque session id: 32 bytes of CSPRNG output, base64url
/// encoded without padding (43 characters).
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_password_passes_all_rules() {
        let check = validate_password("Str0ng!Pass");
        assert!(check.valid);
        assert!(check.errors.is_empty());
    }

    #[test]
    fn test_short_password_reports_length() {
        let check = validate_password("Sh0rt!");
        assert!(!check.valid);
        assert_eq!(check.errors.len(), 1);
        assert!(check.errors[0].contains("at least 10 characters"));
    }

    #[test]
    fn test_missing_digit_reported() {
        let check = validate_password("NoDigitsHere!");
        assert!(!check.valid);
        assert_eq!(check.errors.len(), 1);
        assert!(check.errors[0].contains("number"));
    }

    #[test]
    fn test_missing_symbol_reported() {
        let check = validate_password("NoSymbols123");
        assert!(!check.valid);
        assert_eq!(check.errors.len(), 1);
        assert!(check.errors[0].contains("symbol"));
    }

    #[test]
    fn test_all_violations_reported_together() {
        let check = validate_password("short");
        assert!(!check.valid);
        assert_eq!(check.errors.len(), 3);
    }

    #[test]
    fn test_hash_and_verify_round_trip() {
        let (hash, salt) = hash_password("Str0ng!Pass").unwrap();
        assert!(verify_password("Str0ng!Pass", &hash, &salt).unwrap());
        assert!(!verify_password("Wr0ng!Pass!", &hash, &salt).unwrap());
    }

    #[test]
    fn test_salt_is_16_bytes_and_random() {
        let (_, salt1) = hash_password("Str0ng!Pass").unwrap();
        let (_, salt2) = hash_password("Str0ng!Pass").unwrap();
        assert_ne!(salt1, salt2);
        let decoded = general_purpose::STANDARD.decode(&salt1).unwrap();
        assert_eq!(decoded.len(), 16);
    }

    #[test]
    fn test_same_password_different_salts_different_hashes() {
        let (hash1, _) = hash_password("Str0ng!Pass").unwrap();
        let (hash2, _) = hash_password("Str0ng!Pass").unwrap();
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_session_id_entropy_and_encoding() {
        let id1 = generate_session_id();
        let id2 = generate_session_id();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 43);
        assert!(
            id1.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }
}
