//! Textual path normalization.
//!
//! This module provides [`NormalizedPath`], the string core every other path
//! type wraps. Normalization is purely textual:
//! - Duplicate separators are collapsed and trailing separators dropped
//! - `.` components are removed
//! - `..` components cancel the preceding normal component; at the root they
//!   are dropped, in relative paths with nothing to cancel they are kept
//!
//! The filesystem is never consulted, so symlinks are not resolved.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Expand tilde (~) to the home directory.
///
/// This function handles `~` and `~/path` but does not support `~user` syntax;
/// such paths are returned unchanged.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
///
/// # Examples
///
/// ```
/// use mutapath::path::normalize::expand_tilde;
/// use std::path::Path;
///
/// // Expands ~/path to home/path
/// let expanded = expand_tilde(Path::new("~/project")).unwrap();
/// assert!(expanded.is_absolute());
/// assert!(expanded.ends_with("project"));
///
/// // Leaves other paths unchanged
/// let expanded = expand_tilde(Path::new("/absolute")).unwrap();
/// assert_eq!(expanded, Path::new("/absolute"));
/// ```
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let Some(path_str) = path.to_str() else {
        return Ok(path.to_path_buf());
    };

    if path_str != "~" && !path_str.starts_with("~/") && !path_str.starts_with("~\\") {
        return Ok(path.to_path_buf());
    }

    let home = home::home_dir().ok_or_else(|| Error::HomeDirectoryUnavailable {
        path: path.to_path_buf(),
    })?;

    if path_str == "~" {
        Ok(home)
    } else {
        Ok(home.join(&path_str[2..]))
    }
}

/// Resolve `.` and `..` components textually.
///
/// Unlike a filesystem lookup this never fails: `..` at the root is dropped,
/// and leading `..` components of a relative path are preserved.
///
/// # Examples
///
/// ```
/// use mutapath::path::normalize::resolve_components;
/// use std::path::{Path, PathBuf};
///
/// let resolved = resolve_components(Path::new("/a/./b/../c"));
/// assert_eq!(resolved, PathBuf::from("/a/c"));
///
/// let resolved = resolve_components(Path::new("../a/b/.."));
/// assert_eq!(resolved, PathBuf::from("../a"));
/// ```
#[must_use]
pub fn resolve_components(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    let mut has_root = false;
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => {
                result.push(prefix.as_os_str());
            }
            Component::RootDir => {
                result.push(component);
                has_root = true;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    result.pop();
                    depth -= 1;
                } else if !has_root {
                    result.push(component);
                }
            }
            Component::Normal(c) => {
                result.push(c);
                depth += 1;
            }
        }
    }

    result
}

/// A path with redundant separators collapsed and `.`/`..` resolved.
///
/// The empty string is a valid normalized path and stays empty; any other
/// input that resolves to nothing becomes `.`.
///
/// # Examples
///
/// ```
/// use mutapath::NormalizedPath;
///
/// let path = NormalizedPath::new("/home//doe/./folder/../sub/");
/// assert_eq!(path.as_path(), std::path::Path::new("/home/doe/sub"));
/// assert_eq!(path.split_all(), vec!["/", "home", "doe", "sub"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    path: PathBuf,
}

impl NormalizedPath {
    /// Normalize any path-like input.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Self::default();
        }
        let mut resolved = resolve_components(path);
        if resolved.as_os_str().is_empty() {
            resolved.push(Component::CurDir);
        }
        Self { path: resolved }
    }

    /// Join `first` and `rest` onto `base` with the platform join rule.
    ///
    /// An absolute component replaces everything before it.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::NormalizedPath;
    ///
    /// let joined = NormalizedPath::join_path("/A/B", ["C/", "D", "other.txt"]);
    /// assert_eq!(joined, NormalizedPath::new("/A/B/C/D/other.txt"));
    /// ```
    #[must_use]
    pub fn join_path<I, P>(first: impl AsRef<Path>, rest: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut joined = first.as_ref().to_path_buf();
        for part in rest {
            joined.push(part);
        }
        Self::new(joined)
    }

    /// Join further components onto this path.
    #[must_use]
    pub fn join<I, P>(&self, rest: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::join_path(&self.path, rest)
    }

    /// Get a reference to the path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Convert into the underlying `PathBuf`.
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.path
    }

    /// Whether this is the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// The path in native form.
    #[must_use]
    pub fn to_native_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// The path with every backslash replaced by a forward slash.
    ///
    /// Escaped double backslashes count as a single separator. Drive letters
    /// are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::path::normalize::to_posix_string;
    ///
    /// assert_eq!(to_posix_string("\\A\\B/C"), "/A/B/C");
    /// assert_eq!(to_posix_string("C:\\\\Users\\doe"), "C:/Users/doe");
    /// ```
    #[must_use]
    pub fn to_posix_string(&self) -> String {
        to_posix_string(&self.to_native_string())
    }

    /// Split into the root followed by every component.
    ///
    /// The root is `""` for relative paths. A relative path starting with
    /// `..` has no separate root entry, and `""` and `.` split into
    /// themselves.
    #[must_use]
    pub fn split_all(&self) -> Vec<String> {
        let mut parts = Vec::new();
        let mut root = String::new();
        let mut rooted = false;

        for component in self.path.components() {
            match component {
                Component::Prefix(prefix) => {
                    root.push_str(&prefix.as_os_str().to_string_lossy());
                    rooted = true;
                }
                Component::RootDir => {
                    root.push_str(&component.as_os_str().to_string_lossy());
                    rooted = true;
                }
                other => parts.push(other.as_os_str().to_string_lossy().into_owned()),
            }
        }

        let leading_parent = !rooted && parts.first().is_some_and(|p| p == "..");
        let bare = !rooted && parts.len() == 1 && parts[0] == ".";
        if self.is_empty() || leading_parent || bare {
            if parts.is_empty() {
                parts.push(String::new());
            }
            return parts;
        }

        parts.insert(0, root);
        parts
    }

    /// The final component, or `""` for roots and the empty path.
    #[must_use]
    pub fn name(&self) -> String {
        match self.path.components().next_back() {
            Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
            Some(Component::ParentDir) => "..".to_string(),
            _ => String::new(),
        }
    }

    /// The final component without its suffix.
    #[must_use]
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The last suffix including its dot, or `""`.
    #[must_use]
    pub fn suffix(&self) -> String {
        self.path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default()
    }

    /// Every suffix of the final component, in order.
    #[must_use]
    pub fn suffixes(&self) -> Vec<String> {
        let name = self.name();
        let trimmed = name.trim_start_matches('.');
        if trimmed.ends_with('.') {
            return Vec::new();
        }
        trimmed
            .split('.')
            .skip(1)
            .map(|suffix| format!(".{suffix}"))
            .collect()
    }

    /// The containing directory; the empty path for a bare name and the path
    /// itself for a root.
    #[must_use]
    pub fn parent(&self) -> Self {
        match self.path.parent() {
            Some(parent) => Self::new(parent),
            None => self.clone(),
        }
    }

    /// The drive or UNC prefix; always empty on Unix.
    #[must_use]
    pub fn drive(&self) -> String {
        match self.path.components().next() {
            Some(Component::Prefix(prefix)) => prefix.as_os_str().to_string_lossy().into_owned(),
            _ => String::new(),
        }
    }

    /// Drive and root together.
    #[must_use]
    pub fn anchor(&self) -> String {
        let mut anchor = String::new();
        for component in self.path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => {
                    anchor.push_str(&component.as_os_str().to_string_lossy());
                }
                _ => break,
            }
        }
        anchor
    }

    /// Replace the final component.
    #[must_use]
    pub fn with_name(&self, name: impl AsRef<Path>) -> Self {
        self.parent().join([name])
    }

    /// Replace the suffix of the final component; an empty suffix removes it.
    ///
    /// The leading dot is optional.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        let mut path = self.path.clone();
        path.set_extension(suffix.strip_prefix('.').unwrap_or(suffix));
        Self::new(path)
    }

    /// Replace the stem of the final component, keeping its suffix.
    #[must_use]
    pub fn with_stem(&self, stem: impl AsRef<Path>) -> Self {
        self.parent().join([stem]).with_suffix(&self.suffix())
    }

    /// Move the final component under a new parent.
    #[must_use]
    pub fn with_parent(&self, parent: impl AsRef<Path>) -> Self {
        Self::new(parent).join([self.name()])
    }

    /// Replace leading components with `base`.
    ///
    /// With `strip_length == 0` as many leading components are stripped as
    /// `base` has; otherwise `strip_length + 1` (the root counts as one).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless this path has strictly more
    /// components than are stripped.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::NormalizedPath;
    ///
    /// let path = NormalizedPath::new("/home/doe/folder/sub");
    /// assert_eq!(
    ///     path.with_base("/home/joe", 0).unwrap(),
    ///     NormalizedPath::new("/home/joe/folder/sub")
    /// );
    /// assert_eq!(
    ///     path.with_base("/home/joe", 1).unwrap(),
    ///     NormalizedPath::new("/home/joe/doe/folder/sub")
    /// );
    /// ```
    pub fn with_base(&self, base: impl AsRef<Path>, strip_length: usize) -> Result<Self> {
        let base = Self::new(base);
        let strip = if strip_length == 0 {
            base.split_all().len()
        } else {
            strip_length + 1
        };

        let parts = self.split_all();
        if parts.len() <= strip {
            return Err(Error::InvalidArgument {
                argument: base.to_native_string(),
                reason: format!(
                    "the given base has more elements than {}",
                    self.to_native_string()
                ),
            });
        }
        Ok(base.join(&parts[strip..]))
    }

    /// Whether the path is absolute.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.path.is_absolute()
    }

    /// Textual relative path from `start` to this path.
    ///
    /// Both sides must be of the same kind (both absolute or both relative);
    /// callers make them absolute first.
    #[must_use]
    pub fn relative_to(&self, start: &Self) -> Self {
        let own: Vec<Component<'_>> = self.path.components().collect();
        let other: Vec<Component<'_>> = start.path.components().collect();
        let common = own
            .iter()
            .zip(other.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut relative = PathBuf::new();
        for _ in common..other.len() {
            relative.push(Component::ParentDir);
        }
        for component in &own[common..] {
            relative.push(component);
        }
        if relative.as_os_str().is_empty() {
            relative.push(Component::CurDir);
        }
        Self::new(relative)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl AsRef<OsStr> for NormalizedPath {
    fn as_ref(&self) -> &OsStr {
        self.path.as_os_str()
    }
}

impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Replace backslash separators with forward slashes.
#[must_use]
pub fn to_posix_string(s: &str) -> String {
    s.replace("\\\\", "\\").replace('\\', "/")
}
