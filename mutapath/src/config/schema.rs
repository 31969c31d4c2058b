//! Configuration schema for path defaults.
//!
//! This module defines the settings consulted when a path is constructed
//! without explicit format flags, and the thread-local slot holding the
//! currently installed defaults.

use std::cell::RefCell;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default lock acquisition timeout, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;

thread_local! {
    static CURRENT: RefCell<PathDefaults> = RefCell::new(PathDefaults::default());
}

/// Defaults applied to paths constructed without explicit flags.
///
/// A value of this type can be threaded explicitly through construction
/// (see [`PathFormat::resolve`]) or installed as the current thread's
/// defaults with [`PathDefaults::install`].
///
/// # Examples
///
/// ```
/// use mutapath::config::PathDefaults;
///
/// let defaults: PathDefaults = serde_yaml::from_str("posix: true\n").unwrap();
/// assert!(defaults.posix);
/// assert!(!defaults.string_repr);
/// assert_eq!(defaults.lock_timeout_ms, 1000);
/// ```
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathDefaults {
    /// Render paths with forward slashes.
    pub posix: bool,

    /// Show the plain string instead of `Path('...')` in debug output.
    pub string_repr: bool,

    /// How long transactional operations wait for a lock.
    pub lock_timeout_ms: u64,
}

impl Default for PathDefaults {
    fn default() -> Self {
        Self {
            posix: false,
            string_repr: false,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl PathDefaults {
    /// Returns the defaults installed for the current thread.
    #[must_use]
    pub fn current() -> Self {
        CURRENT.with(|current| *current.borrow())
    }

    /// Installs these defaults for the current thread.
    pub fn install(self) {
        CURRENT.with(|current| *current.borrow_mut() = self);
    }

    /// Modifies the current thread's defaults in place.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::config::PathDefaults;
    ///
    /// PathDefaults::update(|d| d.posix = true);
    /// assert!(PathDefaults::current().posix);
    /// PathDefaults::reset();
    /// assert!(!PathDefaults::current().posix);
    /// ```
    pub fn update(f: impl FnOnce(&mut Self)) {
        CURRENT.with(|current| f(&mut current.borrow_mut()));
    }

    /// Restores the built-in defaults for the current thread.
    pub fn reset() {
        Self::default().install();
    }

    /// The lock timeout as a [`Duration`].
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// The format flags these defaults imply.
    #[must_use]
    pub fn format(&self) -> PathFormat {
        PathFormat {
            posix: self.posix,
            string_repr: self.string_repr,
        }
    }
}

/// The per-instance format flags of an `ImmutablePath`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PathFormat {
    /// Render with forward slashes.
    pub posix: bool,
    /// Plain-string debug representation.
    pub string_repr: bool,
}

impl PathFormat {
    /// Resolves optional flags against the given defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::config::{PathDefaults, PathFormat};
    ///
    /// let defaults = PathDefaults { posix: true, ..PathDefaults::default() };
    /// let format = PathFormat::resolve(None, Some(true), &defaults);
    /// assert!(format.posix);
    /// assert!(format.string_repr);
    /// ```
    #[must_use]
    pub fn resolve(posix: Option<bool>, string_repr: Option<bool>, defaults: &PathDefaults) -> Self {
        Self {
            posix: posix.unwrap_or(defaults.posix),
            string_repr: string_repr.unwrap_or(defaults.string_repr),
        }
    }

    /// Resolves optional flags against the current thread's defaults.
    #[must_use]
    pub fn from_current(posix: Option<bool>, string_repr: Option<bool>) -> Self {
        Self::resolve(posix, string_repr, &PathDefaults::current())
    }
}
