//! Configuration file discovery and loading.
//!
//! Path defaults can be stored in a `mutapath.yaml` file. The loader finds the
//! nearest such file walking up from a directory, parses it, and applies
//! environment overrides on top.

use crate::config::environment::EnvironmentConfig;
use crate::config::schema::PathDefaults;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for by [`ConfigLoader::discover`].
pub const CONFIG_FILE_NAME: &str = "mutapath.yaml";

/// Loads path defaults from YAML files and the environment.
///
/// # Examples
///
/// ```no_run
/// use mutapath::config::ConfigLoader;
/// use std::path::Path;
///
/// let defaults = ConfigLoader::load(Path::new(".")).unwrap();
/// defaults.install();
/// ```
pub struct ConfigLoader;

impl ConfigLoader {
    /// Discover, load and override defaults starting at `working_dir`.
    ///
    /// Precedence (highest first): environment variables, the nearest
    /// `mutapath.yaml`, built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a discovered file cannot be read or parsed, or an
    /// environment override is invalid.
    pub fn load(working_dir: &Path) -> Result<PathDefaults> {
        let mut defaults = match Self::discover(working_dir) {
            Some(path) => Self::load_file(&path)?,
            None => PathDefaults::default(),
        };
        EnvironmentConfig::apply_overrides(&mut defaults)?;
        Ok(defaults)
    }

    /// Find the nearest configuration file, walking up from `start_dir`.
    #[must_use]
    pub fn discover(start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load and parse a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load_file(path: &Path) -> Result<PathDefaults> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents).map_err(|e| Error::Validation {
            field: format!("{}", path.display()),
            message: format!("Invalid YAML: {e}"),
        })
    }

    /// Parse defaults from a YAML document.
    ///
    /// An empty document yields the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid.
    pub fn from_yaml_str(contents: &str) -> Result<PathDefaults> {
        if contents.trim().is_empty() {
            return Ok(PathDefaults::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }
}
