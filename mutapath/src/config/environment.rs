//! Environment variable handling for configuration overrides.
//!
//! This module provides support for MUTAPATH_* environment variables that
//! override configuration file values.

use crate::config::schema::PathDefaults;
use crate::error::{Error, Result};
use std::env;

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use mutapath::config::{EnvironmentConfig, PathDefaults};
///
/// let mut defaults = PathDefaults::default();
/// EnvironmentConfig::apply_overrides(&mut defaults).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to the defaults.
    ///
    /// Reads `MUTAPATH_POSIX`, `MUTAPATH_STRING_REPR` and
    /// `MUTAPATH_LOCK_TIMEOUT_MS`.
    ///
    /// # Errors
    ///
    /// Returns an error if any environment variable value is invalid
    /// (e.g., non-numeric timeout, invalid boolean).
    pub fn apply_overrides(defaults: &mut PathDefaults) -> Result<()> {
        if let Ok(val) = env::var("MUTAPATH_POSIX") {
            defaults.posix = Self::parse_bool("MUTAPATH_POSIX", &val)?;
        }

        if let Ok(val) = env::var("MUTAPATH_STRING_REPR") {
            defaults.string_repr = Self::parse_bool("MUTAPATH_STRING_REPR", &val)?;
        }

        if let Ok(millis) = env::var("MUTAPATH_LOCK_TIMEOUT_MS") {
            defaults.lock_timeout_ms = millis.trim().parse().map_err(|_| Error::Validation {
                field: "MUTAPATH_LOCK_TIMEOUT_MS".into(),
                message: "Must be a non-negative integer".into(),
            })?;
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }
}
