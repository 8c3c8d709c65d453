//! Administrator credentials loaded from environment variables.
//!
//! The storefront has a single administrator account. Its email and password are
//! read from `ADMIN_EMAIL` and `ADMIN_PASSWORD`, falling back to the demo account
//! shipped in `catalog.toml`.

use crate::errors::{Error, Result};
use std::env::{self, VarError};

const DEFAULT_ADMIN_EMAIL: &str = "admin@atelier.example";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Login credentials of the administrator account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    /// Email the admin logs in with
    pub email: String,
    /// Password the admin logs in with
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl AdminCredentials {
    /// Whether the given email belongs to the admin account (case-insensitive).
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.email.eq_ignore_ascii_case(email.trim())
    }

    /// Whether the pair matches the admin account.
    #[must_use]
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.is_admin_email(email) && self.password == password
    }
}

/// Reads the admin credentials from the environment, using the demo defaults for
/// any variable that is not set.
///
/// # Errors
/// Returns [`Error::EnvVar`] if a variable is set but not valid unicode.
pub fn get_admin_credentials() -> Result<AdminCredentials> {
    let defaults = AdminCredentials::default();

    Ok(AdminCredentials {
        email: or_default(env::var("ADMIN_EMAIL"), defaults.email)?,
        password: or_default(env::var("ADMIN_PASSWORD"), defaults.password)?,
    })
}

fn or_default(value: std::result::Result<String, VarError>, default: String) -> Result<String> {
    match value {
        Ok(value) => Ok(value),
        Err(VarError::NotPresent) => Ok(default),
        Err(e) => Err(Error::EnvVar(e)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_matches_requires_both_fields() {
        let creds = AdminCredentials::default();

        assert!(creds.matches("admin@atelier.example", "admin123"));
        assert!(creds.matches("ADMIN@atelier.example", "admin123"));
        assert!(!creds.matches("admin@atelier.example", "wrong"));
        assert!(!creds.matches("someone@atelier.example", "admin123"));
    }

    #[test]
    fn test_get_admin_credentials_returns_something() {
        // Depends on the environment, so only check that both fields are filled
        let creds = get_admin_credentials().unwrap();
        assert!(!creds.email.is_empty());
        assert!(!creds.password.is_empty());
    }

    #[test]
    fn test_unset_variable_falls_back_to_default() {
        let value = or_default(Err(VarError::NotPresent), "fallback".to_string()).unwrap();
        assert_eq!(value, "fallback");

        let value = or_default(Ok("set".to_string()), "fallback".to_string()).unwrap();
        assert_eq!(value, "set");
    }

    #[test]
    fn test_non_unicode_variable_is_an_error() {
        let raw = VarError::NotUnicode(std::ffi::OsString::from("admin"));
        let result = or_default(Err(raw), "fallback".to_string());
        assert!(matches!(result.unwrap_err(), Error::EnvVar(_)));
    }
}
