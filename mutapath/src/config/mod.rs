//! Configuration system for mutapath.
//!
//! Paths built without explicit format flags take them from a
//! [`PathDefaults`] value. The defaults come from (highest precedence first):
//!
//! 1. Explicit arguments (`PathFormat::resolve`, `ImmutablePath::with_format`)
//! 2. Defaults installed on the current thread (`PathDefaults::install`)
//! 3. Values loaded by [`ConfigLoader`]: `MUTAPATH_*` environment variables
//!    over the nearest `mutapath.yaml`
//! 4. Built-in defaults
//!
//! Installed defaults are thread-local; each thread starts from the built-in
//! defaults.
//!
//! # Examples
//!
//! ```
//! use mutapath::config::PathDefaults;
//! use mutapath::ImmutablePath;
//!
//! PathDefaults::update(|d| d.posix = true);
//! assert!(ImmutablePath::new("/A/B").posix_enabled());
//!
//! PathDefaults::reset();
//! assert!(!ImmutablePath::new("/A/B").posix_enabled());
//! ```

pub mod environment;
pub mod loader;
pub mod schema;

pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, CONFIG_FILE_NAME};
pub use schema::{PathDefaults, PathFormat, DEFAULT_LOCK_TIMEOUT_MS};
