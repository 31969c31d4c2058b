//! Scoped mutation of an [`ImmutablePath`] binding.
//!
//! A scope hands a [`MutablePath`] to caller code. The view is changed in
//! place; the owner binding only receives its final value if the scope body
//! returns `Ok`. An `Err` leaves the owner exactly as it was.

use std::env;
use std::fmt;
use std::path::Path;

use crate::config::PathFormat;
use crate::error::Result;
use crate::transaction::operation::{CopyFile, FileOperation, Move, Rename, Renames};

use super::immutable::ImmutablePath;
use super::normalize::{expand_tilde, NormalizedPath};

/// The write-back slot of one scope.
///
/// Borrowing the owner mutably for the whole scope keeps anything else from
/// observing it half-way; the single write happens in [`OwnerSlot::commit`].
pub(crate) struct OwnerSlot<'a> {
    owner: &'a mut ImmutablePath,
}

impl<'a> OwnerSlot<'a> {
    pub(crate) fn new(owner: &'a mut ImmutablePath) -> Self {
        Self { owner }
    }

    pub(crate) fn owner(&self) -> &ImmutablePath {
        self.owner
    }

    /// A fresh view holding the owner's current value and flags.
    pub(crate) fn view(&self) -> MutablePath {
        MutablePath {
            contained: self.owner.normalized().clone(),
            format: self.owner.format(),
        }
    }

    /// Write the view back into the owner.
    pub(crate) fn commit(self, view: MutablePath) {
        self.owner.replace(view.contained, view.format);
    }
}

/// A temporarily mutable view of a path, only reachable inside a scope.
///
/// Setters change the view in place and return it again for chaining.
/// Filesystem methods act on disk immediately and re-point the view at the
/// result.
///
/// # Examples
///
/// ```
/// use mutapath::ImmutablePath;
///
/// let mut path = ImmutablePath::new("/home/doe/folder/sub");
/// path.mutate(|m| {
///     m.set_name("top");
///     Ok::<_, mutapath::Error>(())
/// })
/// .unwrap();
/// assert_eq!(path, "/home/doe/folder/top");
/// ```
#[derive(Debug)]
pub struct MutablePath {
    contained: NormalizedPath,
    format: PathFormat,
}

impl MutablePath {
    /// An immutable copy of the current value, with the current flags.
    #[must_use]
    pub fn snapshot(&self) -> ImmutablePath {
        ImmutablePath::with_format(self.contained.as_path(), self.format)
    }

    /// The current value.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        self.contained.as_path()
    }

    /// The current format flags.
    #[must_use]
    pub fn format(&self) -> PathFormat {
        self.format
    }

    pub(crate) fn normalized(&self) -> &NormalizedPath {
        &self.contained
    }

    pub(crate) fn set_normalized(&mut self, contained: NormalizedPath) {
        self.contained = contained;
    }

    /// Replace the final component.
    pub fn set_name(&mut self, name: impl AsRef<Path>) -> &mut Self {
        self.contained = self.contained.with_name(name);
        self
    }

    /// Replace the stem, keeping the suffix.
    pub fn set_stem(&mut self, stem: impl AsRef<Path>) -> &mut Self {
        self.contained = self.contained.with_stem(stem);
        self
    }

    /// Replace the suffix; an empty suffix removes it.
    pub fn set_suffix(&mut self, suffix: &str) -> &mut Self {
        self.contained = self.contained.with_suffix(suffix);
        self
    }

    /// Move the final component under `parent`.
    pub fn set_parent(&mut self, parent: impl AsRef<Path>) -> &mut Self {
        self.contained = self.contained.with_parent(parent);
        self
    }

    /// Replace as many leading components as `base` has.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if this path is not longer than
    /// `base`. The view is unchanged in that case.
    pub fn set_base(&mut self, base: impl AsRef<Path>) -> Result<&mut Self> {
        self.set_base_stripped(base, 0)
    }

    /// Replace `strip_length + 1` leading components (root included) by
    /// `base`; `0` behaves like [`set_base`](Self::set_base).
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if too many components would be
    /// stripped. The view is unchanged in that case.
    pub fn set_base_stripped(
        &mut self,
        base: impl AsRef<Path>,
        strip_length: usize,
    ) -> Result<&mut Self> {
        self.contained = self.contained.with_base(base, strip_length)?;
        Ok(self)
    }

    /// Set the posix flag.
    pub fn set_posix_enabled(&mut self, enable: bool) -> &mut Self {
        self.format.posix = enable;
        self
    }

    /// Set the string representation flag.
    pub fn set_string_repr_enabled(&mut self, enable: bool) -> &mut Self {
        self.format.string_repr = enable;
        self
    }

    /// Join `component` onto the value.
    pub fn push(&mut self, component: impl AsRef<Path>) -> &mut Self {
        self.contained = self.contained.join([component]);
        self
    }

    /// Make the value absolute against the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn make_absolute(&mut self) -> Result<&mut Self> {
        if !self.contained.is_absolute() {
            let cwd = env::current_dir()?;
            self.contained = NormalizedPath::new(cwd.join(self.contained.as_path()));
        }
        Ok(self)
    }

    /// Make the value relative to `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn make_relative_to(&mut self, start: impl AsRef<Path>) -> Result<&mut Self> {
        let relative = self.snapshot().relative_to(start)?;
        self.contained = relative.normalized().clone();
        Ok(self)
    }

    /// Expand a leading `~` and normalize the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn normalize(&mut self) -> Result<&mut Self> {
        self.contained = NormalizedPath::new(expand_tilde(self.contained.as_path())?);
        Ok(self)
    }

    fn apply(&mut self, operation: &dyn FileOperation, target: &Path) -> Result<&mut Self> {
        let target = NormalizedPath::new(target);
        let result = operation.apply(self.contained.as_path(), target.as_path())?;
        self.contained = NormalizedPath::new(result);
        Ok(self)
    }

    /// Rename the file on disk and point the view at `target`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the rename fails; the view is unchanged.
    pub fn rename(&mut self, target: impl AsRef<Path>) -> Result<&mut Self> {
        self.apply(&Rename, target.as_ref())
    }

    /// Like [`rename`](Self::rename), creating missing target directories
    /// and removing source directories left empty.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the rename fails; the view is unchanged.
    pub fn renames(&mut self, target: impl AsRef<Path>) -> Result<&mut Self> {
        self.apply(&Renames, target.as_ref())
    }

    /// Copy the file on disk and point the view at the copy.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the copy fails; the view is unchanged.
    pub fn copy(&mut self, target: impl AsRef<Path>) -> Result<&mut Self> {
        self.apply(&CopyFile, target.as_ref())
    }

    /// Move the file or directory on disk and point the view at the result.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the move fails; the view is unchanged.
    pub fn move_to(&mut self, target: impl AsRef<Path>) -> Result<&mut Self> {
        self.apply(&Move, target.as_ref())
    }
}

impl fmt::Display for MutablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

impl AsRef<Path> for MutablePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl ImmutablePath {
    /// Run `f` against a mutable view of this path and commit the result.
    ///
    /// The binding is updated only if `f` returns `Ok`; on `Err` it keeps
    /// its previous value and the error is returned unchanged. Any lock
    /// held on the old value is released when a new value is committed.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::{Error, ImmutablePath};
    ///
    /// let mut path = ImmutablePath::new("/A/B/file.txt");
    /// let failed: Result<(), Error> = path.mutate(|m| {
    ///     m.set_stem("other");
    ///     m.set_base("/A/B/C/D/E")?;
    ///     Ok(())
    /// });
    /// assert!(failed.is_err());
    /// assert_eq!(path, "/A/B/file.txt");
    /// ```
    pub fn mutate<R, E, F>(&mut self, f: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut MutablePath) -> std::result::Result<R, E>,
    {
        let slot = OwnerSlot::new(self);
        let mut view = slot.view();
        match f(&mut view) {
            Ok(value) => {
                log::debug!("committing {} to {}", slot.owner(), view);
                slot.commit(view);
                Ok(value)
            }
            Err(e) => {
                log::debug!("mutation of {} aborted", slot.owner());
                Err(e)
            }
        }
    }
}
