//! Advisory file locking.
//!
//! A lock on `P` is the sentinel file `P.lock` (the suffix of `P` gains a
//! `.lock` extension). Holding the lock means having created the sentinel;
//! releasing it removes the sentinel again.
//!
//! The lock is cooperative only: it has no effect on processes or code paths
//! that do not check for the sentinel.
//!
//! # Examples
//!
//! ```no_run
//! use mutapath::lock::LockHandle;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! let lock = LockHandle::for_path(Path::new("/tmp/data.txt"));
//! {
//!     let _guard = lock.guard(Duration::from_secs(1)).unwrap();
//!     // /tmp/data.txt.lock exists while the guard lives
//! }
//! assert!(!lock.is_locked());
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

/// Interval between attempts to create the sentinel.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockKind {
    Soft,
    Dummy,
}

/// An advisory lock bound to one concrete path.
///
/// The handle is reentrant: nested acquisitions on the same handle only
/// count, and the sentinel is removed when the count drops back to zero.
/// Different handles on the same path exclude each other through the
/// sentinel only.
#[derive(Debug)]
pub struct LockHandle {
    lock_file: PathBuf,
    kind: LockKind,
    count: AtomicUsize,
}

impl LockHandle {
    /// Create the lock for `path`.
    ///
    /// Locking something that is not an existing regular file is a no-op
    /// success, so a dummy handle is returned in that case.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        if path.is_file() {
            Self::soft(path)
        } else {
            Self::new(path, LockKind::Dummy)
        }
    }

    /// Create a real lock for `path`, whether or not it exists.
    #[must_use]
    pub fn soft(path: &Path) -> Self {
        Self::new(path, LockKind::Soft)
    }

    fn new(path: &Path, kind: LockKind) -> Self {
        Self {
            lock_file: Self::lock_file_for(path),
            kind,
            count: AtomicUsize::new(0),
        }
    }

    /// The sentinel path used to lock `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::lock::LockHandle;
    /// use std::path::{Path, PathBuf};
    ///
    /// assert_eq!(
    ///     LockHandle::lock_file_for(Path::new("/A/a.txt")),
    ///     PathBuf::from("/A/a.txt.lock")
    /// );
    /// ```
    #[must_use]
    pub fn lock_file_for(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    /// The sentinel file of this lock.
    #[must_use]
    pub fn lock_file(&self) -> &Path {
        &self.lock_file
    }

    /// Whether this is the no-op lock of a path that was not a file.
    #[must_use]
    pub fn is_dummy(&self) -> bool {
        self.kind == LockKind::Dummy
    }

    /// Whether this handle currently holds the lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.count.load(Ordering::Acquire) > 0
    }

    /// Acquire the lock, polling until `timeout` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`] if the sentinel stays occupied, or an
    /// I/O error if the sentinel cannot be created for another reason.
    pub fn acquire(&self, timeout: Duration) -> Result<()> {
        if self.kind == LockKind::Dummy {
            return Ok(());
        }
        if self.count.load(Ordering::Acquire) > 0 {
            self.count.fetch_add(1, Ordering::AcqRel);
            return Ok(());
        }

        let start = Instant::now();
        loop {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.lock_file)
            {
                Ok(_) => {
                    self.count.store(1, Ordering::Release);
                    log::debug!("acquired lock {}", self.lock_file.display());
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    let elapsed = start.elapsed();
                    if elapsed >= timeout {
                        log::debug!(
                            "timed out after {}ms waiting for {}",
                            elapsed.as_millis(),
                            self.lock_file.display()
                        );
                        return Err(Error::LockTimeout {
                            lock_file: self.lock_file.clone(),
                            millis: timeout.as_millis(),
                        });
                    }
                    thread::sleep(POLL_INTERVAL.min(timeout - elapsed));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Release one level of the lock; the sentinel is removed at zero.
    pub fn release(&self) {
        let previous = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.remove_sentinel();
        }
    }

    /// Release the lock completely regardless of nesting.
    pub fn force_release(&self) {
        if self.count.swap(0, Ordering::AcqRel) > 0 {
            self.remove_sentinel();
        }
    }

    /// Acquire the lock for the lifetime of the returned guard.
    ///
    /// # Errors
    ///
    /// See [`LockHandle::acquire`].
    pub fn guard(&self, timeout: Duration) -> Result<LockGuard<'_>> {
        self.acquire(timeout)?;
        Ok(LockGuard { lock: self })
    }

    // Best effort: a sentinel that is already gone or not ours to delete
    // is left alone.
    fn remove_sentinel(&self) {
        match std::fs::remove_file(&self.lock_file) {
            Ok(()) => log::debug!("released lock {}", self.lock_file.display()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                ) =>
            {
                log::debug!(
                    "could not remove lock file {}: {e}",
                    self.lock_file.display()
                );
            }
            Err(e) => log::warn!(
                "failed to remove lock file {}: {e}",
                self.lock_file.display()
            ),
        }
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        self.force_release();
    }
}

/// Releases one level of a [`LockHandle`] when dropped.
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a LockHandle,
}

impl LockGuard<'_> {
    /// The lock held by this guard.
    #[must_use]
    pub fn lock(&self) -> &LockHandle {
        self.lock
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}
