//! The transactional scope protocol.
//!
//! A run goes through these steps in order, and stops at the first failure:
//!
//! 1. The source must exist.
//! 2. The source lock is acquired (if locking is enabled).
//! 3. Caller code edits a [`MutablePath`] view; its final value is the
//!    target.
//! 4. Renaming only: the target is locked and must not exist yet.
//! 5. The filesystem operation runs.
//! 6. The resulting path must exist.
//! 7. The owner is updated to the resulting path.
//!
//! The source lock is released whatever the outcome. On any failure the
//! owner keeps its previous value.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::PathDefaults;
use crate::error::{Error, Operation, PathException, PathFailure, Result};
use crate::lock::LockHandle;
use crate::path::mutable::{MutablePath, OwnerSlot};
use crate::path::normalize::NormalizedPath;
use crate::path::ImmutablePath;

use super::operation::{CopyFile, FileOperation, Move, Rename};

/// Runs a rename, move or copy as a scope over an [`ImmutablePath`].
///
/// # Examples
///
/// ```no_run
/// use mutapath::transaction::{Renames, TransactionRunner};
/// use mutapath::{Error, ImmutablePath};
/// use std::time::Duration;
///
/// let mut path = ImmutablePath::new("/tmp/folder/a.txt");
/// TransactionRunner::renaming()
///     .with_method(Renames)
///     .with_timeout(Duration::from_millis(200))
///     .run(&mut path, |m| {
///         m.set_parent("/tmp/other");
///         Ok::<_, Error>(())
///     })
///     .unwrap();
/// assert_eq!(path, "/tmp/other/a.txt");
/// ```
pub struct TransactionRunner {
    operation: Operation,
    method: Box<dyn FileOperation>,
    lock: bool,
    timeout: Duration,
}

impl TransactionRunner {
    fn new(operation: Operation, method: Box<dyn FileOperation>) -> Self {
        Self {
            operation,
            method,
            lock: true,
            timeout: PathDefaults::current().lock_timeout(),
        }
    }

    /// A renaming scope using [`Rename`].
    #[must_use]
    pub fn renaming() -> Self {
        Self::new(Operation::Renaming, Box::new(Rename))
    }

    /// A moving scope using [`Move`].
    #[must_use]
    pub fn moving() -> Self {
        Self::new(Operation::Moving, Box::new(Move))
    }

    /// A copying scope using [`CopyFile`].
    #[must_use]
    pub fn copying() -> Self {
        Self::new(Operation::Copying, Box::new(CopyFile))
    }

    /// Whether to lock the source (and, when renaming, the target).
    #[must_use]
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    /// How long to wait for each lock.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the filesystem primitive.
    #[must_use]
    pub fn with_method(mut self, method: impl FileOperation + 'static) -> Self {
        self.method = Box::new(method);
        self
    }

    /// The operation this runner performs.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Run the scope against `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`PathException`] (converted into `E`) if any step of the
    /// protocol fails, or the error of `f` unchanged. `path` is only updated
    /// on success.
    pub fn run<R, E, F>(&self, path: &mut ImmutablePath, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut MutablePath) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        let source = path.to_path_buf();
        if !path.exists() {
            log::debug!("{} {}: source does not exist", self.operation, source.display());
            return Err(self.failure(PathFailure::SourceMissing, &source, &source).into());
        }

        if self.lock {
            if let Err(e) = path.lock().acquire(self.timeout) {
                let err = self.lock_failure(e, PathFailure::SourceLockTimeout, &source, &source);
                return Err(err.into());
            }
        }

        let outcome = self.run_scope(path, &source, f);
        if self.lock {
            path.release_lock();
        }
        outcome
    }

    fn run_scope<R, E, F>(
        &self,
        path: &mut ImmutablePath,
        source: &Path,
        f: F,
    ) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut MutablePath) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        let slot = OwnerSlot::new(path);
        let mut view = slot.view();
        let value = match f(&mut view) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("{} {}: scope aborted", self.operation, source.display());
                return Err(e);
            }
        };

        let target = view.normalized().as_path().to_path_buf();
        let produced = self.execute(source, &target)?;
        if !produced.exists() {
            log::debug!(
                "{} {}: result {} is missing",
                self.operation,
                source.display(),
                produced.display()
            );
            return Err(self
                .failure(PathFailure::MissingAfterOperation, &produced, source)
                .into());
        }

        log::debug!(
            "{} {}: committing {}",
            self.operation,
            source.display(),
            produced.display()
        );
        view.set_normalized(NormalizedPath::new(&produced));
        slot.commit(view);
        Ok(value)
    }

    fn execute(&self, source: &Path, target: &Path) -> Result<PathBuf> {
        let _target_lock = self.lock_target(source, target)?;
        if self.operation == Operation::Renaming && target.exists() {
            log::debug!("renaming {}: {} exists", source.display(), target.display());
            return Err(self.failure(PathFailure::TargetExists, target, source));
        }

        log::debug!(
            "{} {} -> {}",
            self.operation,
            source.display(),
            target.display()
        );
        self.method.apply(source, target).map_err(|e| {
            let failure = if e.kind() == io::ErrorKind::AlreadyExists {
                PathFailure::TargetExists
            } else {
                PathFailure::OperationFailed(e)
            };
            self.failure(failure, target, source)
        })
    }

    // The returned handle releases the target lock when dropped. A target
    // whose parent directory does not exist yet cannot be raced for, so it
    // is not locked; the method may still create the directory.
    fn lock_target(&self, source: &Path, target: &Path) -> Result<Option<LockHandle>> {
        if self.operation != Operation::Renaming || !self.lock || !source.is_file() {
            return Ok(None);
        }
        let parent_missing = target
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .is_some_and(|p| !p.is_dir());
        if parent_missing {
            log::debug!(
                "renaming {}: not locking {}, its directory does not exist",
                source.display(),
                target.display()
            );
            return Ok(None);
        }

        let lock = LockHandle::soft(target);
        match lock.acquire(self.timeout) {
            Ok(()) => Ok(Some(lock)),
            Err(e) => Err(self.lock_failure(e, PathFailure::TargetLockTimeout, target, source)),
        }
    }

    fn lock_failure(
        &self,
        err: Error,
        on_timeout: PathFailure,
        attempted: &Path,
        fallback: &Path,
    ) -> Error {
        let failure = match err {
            e if e.is_lock_timeout() => on_timeout,
            Error::Io(e) => PathFailure::LockFailed(e),
            other => return other,
        };
        self.failure(failure, attempted, fallback)
    }

    fn failure(&self, failure: PathFailure, attempted: &Path, fallback: &Path) -> Error {
        PathException::new(self.operation, failure, attempted, fallback).into()
    }
}

impl fmt::Debug for TransactionRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionRunner")
            .field("operation", &self.operation)
            .field("lock", &self.lock)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ImmutablePath {
    /// Rename the file behind this path inside a scope.
    ///
    /// Uses [`TransactionRunner::renaming`] with locking and the default
    /// timeout.
    ///
    /// # Errors
    ///
    /// See [`TransactionRunner::run`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use mutapath::{Error, ImmutablePath};
    ///
    /// let mut path = ImmutablePath::new("/home/doe/folder/a.txt");
    /// path.renaming(|m| {
    ///     m.set_stem("b");
    ///     Ok::<_, Error>(())
    /// })
    /// .unwrap();
    /// assert_eq!(path, "/home/doe/folder/b.txt");
    /// ```
    pub fn renaming<R, E, F>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut MutablePath) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        TransactionRunner::renaming().run(self, f)
    }

    /// Move the file or directory behind this path inside a scope.
    ///
    /// # Errors
    ///
    /// See [`TransactionRunner::run`].
    pub fn moving<R, E, F>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut MutablePath) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        TransactionRunner::moving().run(self, f)
    }

    /// Copy the file behind this path inside a scope; the binding then
    /// points at the copy.
    ///
    /// # Errors
    ///
    /// See [`TransactionRunner::run`].
    pub fn copying<R, E, F>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut MutablePath) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        TransactionRunner::copying().run(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    type TestResult = std::result::Result<(), Error>;

    const SHORT: Duration = Duration::from_millis(100);

    #[test]
    fn test_defaults() {
        let runner = TransactionRunner::renaming();
        assert_eq!(runner.operation(), Operation::Renaming);
        assert!(runner.lock);
        assert_eq!(runner.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_timeout_follows_thread_defaults() {
        PathDefaults::update(|d| d.lock_timeout_ms = 250);
        let runner = TransactionRunner::copying();
        PathDefaults::reset();
        assert_eq!(runner.timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_renaming_releases_source_lock() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let mut path = ImmutablePath::new(&source);
        path.renaming(|m| -> TestResult {
            assert!(dir.path().join("a.txt.lock").exists());
            m.set_stem("b");
            Ok(())
        })
        .unwrap();

        assert_eq!(path, dir.path().join("b.txt"));
        assert!(!dir.path().join("a.txt.lock").exists());
        assert!(!dir.path().join("b.txt.lock").exists());
    }

    #[test]
    fn test_scope_error_releases_lock_and_keeps_owner() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let mut path = ImmutablePath::new(&source);
        let result = path.renaming(|m| -> TestResult {
            m.set_stem("b");
            Err(Error::InvalidArgument {
                argument: "b".to_string(),
                reason: "rejected".to_string(),
            })
        });

        assert!(result.unwrap_err().is_invalid_argument());
        assert_eq!(path, source);
        assert!(source.exists());
        assert!(!dir.path().join("a.txt.lock").exists());
    }

    #[test]
    fn test_operation_failure_is_reported() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let mut path = ImmutablePath::new(&source);
        let err = TransactionRunner::renaming()
            .with_method(|_: &Path, _: &Path| -> io::Result<PathBuf> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
            })
            .run(&mut path, |m| -> TestResult {
                m.set_stem("b");
                Ok(())
            })
            .unwrap_err();

        match err {
            Error::Path(PathException {
                failure: PathFailure::OperationFailed(e),
                ..
            }) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(path, source);
    }

    #[test]
    fn test_missing_result_is_reported() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let mut path = ImmutablePath::new(&source);
        let err = TransactionRunner::copying()
            .with_method(|_: &Path, target: &Path| -> io::Result<PathBuf> {
                Ok(target.to_path_buf())
            })
            .run(&mut path, |m| -> TestResult {
                m.set_stem("b");
                Ok(())
            })
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Path(PathException {
                failure: PathFailure::MissingAfterOperation,
                ..
            })
        ));
        assert_eq!(path, source);
    }

    #[test]
    fn test_custom_error_type() {
        #[derive(Debug)]
        enum AppError {
            Path(Error),
        }

        impl From<Error> for AppError {
            fn from(e: Error) -> Self {
                Self::Path(e)
            }
        }

        let mut path = ImmutablePath::new("/definitely/not/here.txt");
        let err = path
            .moving(|_| -> std::result::Result<(), AppError> { Ok(()) })
            .unwrap_err();
        let AppError::Path(inner) = err;
        assert!(inner.is_path_exception());
    }

    #[test]
    fn test_lock_io_error_becomes_path_exception() {
        let runner = TransactionRunner::renaming();
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err = runner.lock_failure(
            Error::Io(io_err),
            PathFailure::SourceLockTimeout,
            Path::new("/a.txt"),
            Path::new("/a.txt"),
        );
        match err {
            Error::Path(PathException {
                operation: Operation::Renaming,
                failure: PathFailure::LockFailed(e),
                ..
            }) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_target_in_missing_directory_is_not_locked() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let lock = TransactionRunner::renaming()
            .lock_target(&source, &dir.path().join("new/a.txt"))
            .unwrap();
        assert!(lock.is_none());
        assert!(!dir.path().join("new").exists());
    }

    #[test]
    fn test_debug_output() {
        let debug = format!("{:?}", TransactionRunner::moving().with_lock(false));
        assert!(debug.contains("Moving"));
        assert!(debug.contains("lock: false"));
    }
}
