//! Error types for the mutapath library.
//!
//! This module provides the error hierarchy for path derivation, configuration
//! and transactional filesystem operations, using `thiserror` for ergonomic
//! error handling.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for operations that may fail with a mutapath error.
///
/// # Examples
///
/// ```
/// use mutapath::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the mutapath library.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument was rejected before any work was done.
    #[error("invalid argument '{argument}': {reason}")]
    InvalidArgument {
        /// The offending argument, as given.
        argument: String,
        /// Why the argument was rejected.
        reason: String,
    },

    /// A transactional rename, move or copy failed.
    #[error(transparent)]
    Path(#[from] PathException),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file could not be parsed.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A configuration value failed validation.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// An advisory lock could not be acquired in time.
    #[error("lock timeout after {millis}ms: {}", lock_file.display())]
    LockTimeout {
        /// The lock sentinel that stayed occupied.
        lock_file: PathBuf,
        /// How long acquisition was attempted.
        millis: u128,
    },

    /// The home directory could not be determined for tilde expansion.
    #[error("cannot determine home directory to expand {}", path.display())]
    HomeDirectoryUnavailable {
        /// The path that needed expansion.
        path: PathBuf,
    },
}

/// The transactional operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// A renaming scope.
    Renaming,
    /// A moving scope.
    Moving,
    /// A copying scope.
    Copying,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Renaming => write!(f, "Renaming"),
            Self::Moving => write!(f, "Moving"),
            Self::Copying => write!(f, "Copying"),
        }
    }
}

/// Why a transactional operation failed.
#[derive(Debug)]
pub enum PathFailure {
    /// The source did not exist when the scope was opened.
    SourceMissing,
    /// The source lock could not be acquired within the timeout.
    SourceLockTimeout,
    /// The target lock could not be acquired within the timeout.
    TargetLockTimeout,
    /// A lock sentinel could not be created for a reason other than
    /// contention.
    LockFailed(std::io::Error),
    /// The target already existed.
    TargetExists,
    /// The operation reported success but its result can not be found.
    MissingAfterOperation,
    /// The underlying filesystem primitive returned an error.
    OperationFailed(std::io::Error),
}

/// A failed rename, move or copy.
///
/// Carries the operation name and both path values so that callers can tell
/// what was attempted and what the owner still points to.
#[derive(Debug, Error)]
pub struct PathException {
    /// The operation that failed.
    pub operation: Operation,
    /// The cause of the failure.
    pub failure: PathFailure,
    /// The path the operation tried to produce (or lock).
    pub attempted: PathBuf,
    /// The path the owner keeps after the failure.
    pub fallback: PathBuf,
}

impl PathException {
    /// Creates a new exception.
    #[must_use]
    pub fn new(
        operation: Operation,
        failure: PathFailure,
        attempted: impl Into<PathBuf>,
        fallback: impl Into<PathBuf>,
    ) -> Self {
        Self {
            operation,
            failure,
            attempted: attempted.into(),
            fallback: fallback.into(),
        }
    }
}

impl fmt::Display for PathException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = self.operation;
        let attempted = self.attempted.display();
        let fallback = self.fallback.display();
        match &self.failure {
            PathFailure::SourceMissing => {
                write!(f, "{op} {fallback} failed because the file does not exist.")
            }
            PathFailure::SourceLockTimeout => {
                write!(f, "{op} {fallback} failed because the file could not be locked.")
            }
            PathFailure::TargetLockTimeout => write!(
                f,
                "{op} {fallback} failed because the target {attempted} could not be locked."
            ),
            PathFailure::LockFailed(err) => write!(
                f,
                "{op} {fallback} failed because {attempted} could not be locked: {err}."
            ),
            PathFailure::TargetExists => write!(
                f,
                "{op} to {attempted} failed because the file already exists. \
                 Falling back to original value {fallback}."
            ),
            PathFailure::MissingAfterOperation => write!(
                f,
                "{op} to {attempted} failed because it can not be found. \
                 Falling back to original value {fallback}."
            ),
            PathFailure::OperationFailed(err) => write!(
                f,
                "{op} to {attempted} failed: {err}. Falling back to original value {fallback}."
            ),
        }
    }
}

impl Error {
    /// Check if error is a transactional path failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::error::{Error, Operation, PathException, PathFailure};
    ///
    /// let err: Error =
    ///     PathException::new(Operation::Renaming, PathFailure::TargetExists, "/b", "/a").into();
    /// assert!(err.is_path_exception());
    /// ```
    #[must_use]
    pub fn is_path_exception(&self) -> bool {
        matches!(self, Self::Path(_))
    }

    /// Check if error is a lock timeout, on its own or on either side of a
    /// transactional operation.
    #[must_use]
    pub fn is_lock_timeout(&self) -> bool {
        matches!(
            self,
            Self::LockTimeout { .. }
                | Self::Path(PathException {
                    failure: PathFailure::SourceLockTimeout | PathFailure::TargetLockTimeout,
                    ..
                })
        )
    }

    /// Check if error reports an already existing target.
    #[must_use]
    pub fn is_target_exists(&self) -> bool {
        matches!(
            self,
            Self::Path(PathException {
                failure: PathFailure::TargetExists,
                ..
            })
        )
    }

    /// Check if error is an invalid argument.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}
