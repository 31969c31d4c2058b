//! The immutable path value type.
//!
//! Every mutator-shaped operation on [`ImmutablePath`] returns a new value
//! carrying the same format flags. The only way to change a path held in a
//! binding is a scope: [`ImmutablePath::mutate`] or one of the transactional
//! scopes ([`ImmutablePath::renaming`], [`ImmutablePath::moving`],
//! [`ImmutablePath::copying`]).

use std::convert::Infallible;
use std::env;
use std::fmt;
use std::fs;
use std::ops::{Add, Div};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::config::{PathDefaults, PathFormat};
use crate::error::Result;
use crate::lock::LockHandle;

use super::normalize::{expand_tilde, NormalizedPath};

/// An immutable filesystem path with per-instance format flags.
///
/// - `posix`: [`Display`](fmt::Display) renders forward slashes
/// - `string_repr`: [`Debug`](fmt::Debug) renders the plain string instead
///   of `Path('...')`
///
/// Flags come from the current [`PathDefaults`] unless given explicitly, and
/// every derived path inherits them.
///
/// # Examples
///
/// ```
/// use mutapath::ImmutablePath;
///
/// let path = ImmutablePath::new("/home/doe/folder/sub");
/// let renamed = path.with_name("top");
/// assert_eq!(renamed, "/home/doe/folder/top");
/// assert_eq!(path, "/home/doe/folder/sub");
/// ```
pub struct ImmutablePath {
    contained: NormalizedPath,
    format: PathFormat,
    lock: OnceLock<LockHandle>,
}

impl ImmutablePath {
    /// Construct a path with the current thread's default flags.
    ///
    /// Passing another `ImmutablePath` copies its value but not its flags.
    #[must_use]
    pub fn new(source: impl AsRef<Path>) -> Self {
        Self::with_format(source, PathFormat::from_current(None, None))
    }

    /// Construct a path, falling back to the current defaults for any flag
    /// given as `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::ImmutablePath;
    ///
    /// let path = ImmutablePath::with_flags("\\A\\B", Some(true), None);
    /// assert_eq!(path.to_string(), "/A/B");
    /// ```
    #[must_use]
    pub fn with_flags(
        source: impl AsRef<Path>,
        posix: Option<bool>,
        string_repr: Option<bool>,
    ) -> Self {
        Self::with_format(source, PathFormat::from_current(posix, string_repr))
    }

    /// Construct a path with flags resolved against explicit defaults.
    #[must_use]
    pub fn with_defaults(source: impl AsRef<Path>, defaults: &PathDefaults) -> Self {
        Self::with_format(source, defaults.format())
    }

    /// Construct a path with exactly the given flags.
    #[must_use]
    pub fn with_format(source: impl AsRef<Path>, format: PathFormat) -> Self {
        Self::from_normalized(NormalizedPath::new(source), format)
    }

    pub(crate) fn from_normalized(contained: NormalizedPath, format: PathFormat) -> Self {
        Self {
            contained,
            format,
            lock: OnceLock::new(),
        }
    }

    fn derive(&self, contained: NormalizedPath) -> Self {
        Self::from_normalized(contained, self.format)
    }

    /// The current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn current_dir() -> Result<Self> {
        Ok(Self::new(env::current_dir()?))
    }

    /// Join any number of components onto `first`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::ImmutablePath;
    ///
    /// let joined = ImmutablePath::join_all("/A/B", ["C/", "D", "other.txt"]);
    /// assert_eq!(joined, "/A/B/C/D/other.txt");
    /// ```
    #[must_use]
    pub fn join_all<I, P>(first: impl AsRef<Path>, rest: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self::from_normalized(
            NormalizedPath::join_path(first, rest),
            PathFormat::from_current(None, None),
        )
    }

    // ---------------------------------------------------------------------
    // Format flags
    // ---------------------------------------------------------------------

    /// The format flags of this path.
    #[must_use]
    pub fn format(&self) -> PathFormat {
        self.format
    }

    /// Whether [`Display`](fmt::Display) renders forward slashes.
    #[must_use]
    pub fn posix_enabled(&self) -> bool {
        self.format.posix
    }

    /// Whether [`Debug`](fmt::Debug) renders the plain string.
    #[must_use]
    pub fn string_repr_enabled(&self) -> bool {
        self.format.string_repr
    }

    /// A copy with the posix flag set to `enable`.
    #[must_use]
    pub fn with_posix_enabled(&self, enable: bool) -> Self {
        Self::from_normalized(
            self.contained.clone(),
            PathFormat {
                posix: enable,
                ..self.format
            },
        )
    }

    /// A copy with the string representation flag set to `enable`.
    #[must_use]
    pub fn with_string_repr_enabled(&self, enable: bool) -> Self {
        Self::from_normalized(
            self.contained.clone(),
            PathFormat {
                string_repr: enable,
                ..self.format
            },
        )
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// The normalized value.
    #[must_use]
    pub fn normalized(&self) -> &NormalizedPath {
        &self.contained
    }

    /// The value as a standard library path.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        self.contained.as_path()
    }

    /// The value as an owned standard library path.
    #[must_use]
    pub fn to_path_buf(&self) -> PathBuf {
        self.contained.as_path().to_path_buf()
    }

    /// The value with forward slashes, regardless of the posix flag.
    #[must_use]
    pub fn posix_string(&self) -> String {
        self.contained.to_posix_string()
    }

    /// The root followed by every component.
    #[must_use]
    pub fn split_all(&self) -> Vec<String> {
        self.contained.split_all()
    }

    /// The `index`-th entry of [`split_all`](Self::split_all).
    #[must_use]
    pub fn component(&self, index: usize) -> Option<String> {
        self.split_all().into_iter().nth(index)
    }

    /// The final component.
    #[must_use]
    pub fn name(&self) -> Self {
        self.derive(NormalizedPath::new(self.contained.name()))
    }

    /// The final component without its suffix.
    #[must_use]
    pub fn stem(&self) -> String {
        self.contained.stem()
    }

    /// The last suffix including its dot, or `""`.
    #[must_use]
    pub fn suffix(&self) -> String {
        self.contained.suffix()
    }

    /// Alias of [`suffix`](Self::suffix).
    #[must_use]
    pub fn ext(&self) -> String {
        self.suffix()
    }

    /// Every suffix of the final component.
    #[must_use]
    pub fn suffixes(&self) -> Vec<String> {
        self.contained.suffixes()
    }

    /// The containing directory.
    #[must_use]
    pub fn parent(&self) -> Self {
        self.derive(self.contained.parent())
    }

    /// The base of the file, i.e. its containing directory.
    #[must_use]
    pub fn base(&self) -> Self {
        self.parent()
    }

    /// Alias of [`parent`](Self::parent).
    #[must_use]
    pub fn dirname(&self) -> Self {
        self.parent()
    }

    /// The drive or UNC prefix; empty on Unix.
    #[must_use]
    pub fn drive(&self) -> Self {
        self.derive(NormalizedPath::new(self.contained.drive()))
    }

    /// Drive and root together.
    #[must_use]
    pub fn anchor(&self) -> String {
        self.contained.anchor()
    }

    /// Every ancestor, nearest first.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::ImmutablePath;
    ///
    /// let parents: Vec<_> = ImmutablePath::new("/A/B/C/D").parents().collect();
    /// assert_eq!(parents, vec!["/A/B/C", "/A/B", "/A", "/"]);
    /// ```
    pub fn parents(&self) -> impl Iterator<Item = Self> + '_ {
        self.as_path()
            .ancestors()
            .skip(1)
            .map(|ancestor| self.derive(NormalizedPath::new(ancestor)))
    }

    /// The name of the top-level directory this path descends from.
    ///
    /// Paths with at most one entry in [`split_all`](Self::split_all) return
    /// their drive instead.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::ImmutablePath;
    ///
    /// assert_eq!(ImmutablePath::new("/home/doe/folder/sub").home(), "home");
    /// assert_eq!(ImmutablePath::new("/").home(), "");
    /// ```
    #[must_use]
    pub fn home(&self) -> Self {
        let split = self.split_all();
        if split.len() <= 1 {
            return self.drive();
        }
        self.parents()
            .map(|parent| parent.contained.name())
            .find(|name| *name == split[1])
            .map_or_else(|| self.drive(), |name| self.derive(NormalizedPath::new(name)))
    }

    /// Whether the path is absolute.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.contained.is_absolute()
    }

    // ---------------------------------------------------------------------
    // Derivations
    // ---------------------------------------------------------------------

    /// A copy holding `contained` with this path's flags.
    #[must_use]
    pub fn clone_with(&self, contained: impl AsRef<Path>) -> Self {
        self.derive(NormalizedPath::new(contained))
    }

    /// A copy with the final component replaced.
    #[must_use]
    pub fn with_name(&self, name: impl AsRef<Path>) -> Self {
        self.derive(self.contained.with_name(name))
    }

    /// A copy with the stem replaced and the suffix kept.
    #[must_use]
    pub fn with_stem(&self, stem: impl AsRef<Path>) -> Self {
        self.derive(self.contained.with_stem(stem))
    }

    /// A copy with the suffix replaced; an empty suffix removes it.
    #[must_use]
    pub fn with_suffix(&self, suffix: &str) -> Self {
        self.derive(self.contained.with_suffix(suffix))
    }

    /// A copy with the final component moved under `parent`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::ImmutablePath;
    ///
    /// let moved = ImmutablePath::new("/A/B/other.txt").with_parent("D");
    /// assert_eq!(moved, "D/other.txt");
    /// ```
    #[must_use]
    pub fn with_parent(&self, parent: impl AsRef<Path>) -> Self {
        self.derive(self.contained.with_parent(parent))
    }

    /// A copy with the leading components replaced by `base`.
    ///
    /// See [`NormalizedPath::with_base`] for the strip rule.
    ///
    /// # Errors
    ///
    /// Returns an invalid argument error if this path does not have more
    /// components than are stripped.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::ImmutablePath;
    ///
    /// let path = ImmutablePath::new("/home/doe/folder/sub");
    /// assert_eq!(path.with_base("/home/joe", 0).unwrap(), "/home/joe/folder/sub");
    /// assert_eq!(path.with_base("/home/joe", 1).unwrap(), "/home/joe/doe/folder/sub");
    /// assert!(ImmutablePath::new("/A/B/other.txt").with_base("/A/B/C", 0).is_err());
    /// ```
    pub fn with_base(&self, base: impl AsRef<Path>, strip_length: usize) -> Result<Self> {
        Ok(self.derive(self.contained.with_base(base, strip_length)?))
    }

    /// A copy with `rest` joined on.
    #[must_use]
    pub fn join_path<I, P>(&self, rest: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.derive(self.contained.join(rest))
    }

    /// A copy with one component joined on.
    #[must_use]
    pub fn join(&self, other: impl AsRef<Path>) -> Self {
        self.join_path([other])
    }

    /// A copy with a leading `~` expanded to the home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn expand_user(&self) -> Result<Self> {
        Ok(self.derive(NormalizedPath::new(expand_tilde(self.as_path())?)))
    }

    /// A copy made absolute against the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn absolute(&self) -> Result<Self> {
        if self.is_absolute() {
            return Ok(self.clone());
        }
        Ok(self.derive(NormalizedPath::new(env::current_dir()?.join(self.as_path()))))
    }

    /// A copy relative to `start`.
    ///
    /// Both sides are made absolute first, so relative inputs are taken
    /// against the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    ///
    /// # Examples
    ///
    /// ```
    /// use mutapath::ImmutablePath;
    ///
    /// let relative = ImmutablePath::new("/A/B/C").relative_to("/A").unwrap();
    /// assert_eq!(relative, "B/C");
    /// assert_eq!(relative.home(), "B");
    /// ```
    pub fn relative_to(&self, start: impl AsRef<Path>) -> Result<Self> {
        let own = self.absolute()?;
        let start = Self::with_format(start, self.format).absolute()?;
        Ok(self.derive(own.contained.relative_to(&start.contained)))
    }

    // ---------------------------------------------------------------------
    // Filesystem queries
    // ---------------------------------------------------------------------

    /// Whether anything exists at this path.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.as_path().exists()
    }

    /// Whether this path is an existing regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.as_path().is_file()
    }

    /// Whether this path is an existing directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.as_path().is_dir()
    }

    /// Size of the file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    pub fn size(&self) -> Result<u64> {
        Ok(fs::metadata(self.as_path())?.len())
    }

    /// Last modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read or the platform does
    /// not record the time.
    pub fn modified(&self) -> Result<DateTime<Utc>> {
        Ok(to_utc(fs::metadata(self.as_path())?.modified()?))
    }

    /// Last access time.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read or the platform does
    /// not record the time.
    pub fn accessed(&self) -> Result<DateTime<Utc>> {
        Ok(to_utc(fs::metadata(self.as_path())?.accessed()?))
    }

    /// Creation time.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read or the platform does
    /// not record the time.
    pub fn created(&self) -> Result<DateTime<Utc>> {
        Ok(to_utc(fs::metadata(self.as_path())?.created()?))
    }

    /// Read the whole file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_to_string(&self) -> Result<String> {
        Ok(fs::read_to_string(self.as_path())?)
    }

    /// Read the whole file as bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(self.as_path())?)
    }

    /// The entries of this directory, sorted, with this path's flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub fn read_dir(&self) -> Result<Vec<Self>> {
        let mut entries = fs::read_dir(self.as_path())?
            .map(|entry| entry.map(|e| self.derive(NormalizedPath::new(e.path()))))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();
        Ok(entries)
    }

    // ---------------------------------------------------------------------
    // Locking
    // ---------------------------------------------------------------------

    /// The advisory lock for the current value.
    ///
    /// The handle is created on first use and cached until the value
    /// changes. It is a dummy (no-op) lock if the path was not an existing
    /// regular file at that moment.
    pub fn lock(&self) -> &LockHandle {
        self.lock
            .get_or_init(|| LockHandle::for_path(self.contained.as_path()))
    }

    /// Release one level of the cached lock, without creating one.
    pub(crate) fn release_lock(&self) {
        if let Some(lock) = self.lock.get() {
            lock.release();
        }
    }

    /// Replace the value and flags in place.
    ///
    /// Any lock held on the old value is released and the cache is dropped
    /// before the new value is adopted. Observably this is the same as
    /// constructing a new path.
    pub(crate) fn replace(&mut self, contained: NormalizedPath, format: PathFormat) {
        if contained != self.contained {
            if let Some(lock) = self.lock.take() {
                lock.force_release();
            }
            self.contained = contained;
        }
        self.format = format;
    }
}

fn to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

impl Clone for ImmutablePath {
    fn clone(&self) -> Self {
        self.derive(self.contained.clone())
    }
}

impl Default for ImmutablePath {
    fn default() -> Self {
        Self::new("")
    }
}

impl fmt::Display for ImmutablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format.posix {
            f.write_str(&self.contained.to_posix_string())
        } else {
            f.write_str(&self.contained.to_native_string())
        }
    }
}

impl fmt::Debug for ImmutablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.format.string_repr {
            fmt::Display::fmt(self, f)
        } else {
            write!(f, "Path('{self}')")
        }
    }
}

impl AsRef<Path> for ImmutablePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl From<&str> for ImmutablePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ImmutablePath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Path> for ImmutablePath {
    fn from(value: &Path) -> Self {
        Self::new(value)
    }
}

impl From<PathBuf> for ImmutablePath {
    fn from(value: PathBuf) -> Self {
        Self::new(value)
    }
}

impl From<ImmutablePath> for PathBuf {
    fn from(value: ImmutablePath) -> Self {
        value.to_path_buf()
    }
}

impl FromStr for ImmutablePath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl<P: AsRef<Path>> Div<P> for &ImmutablePath {
    type Output = ImmutablePath;

    fn div(self, rhs: P) -> ImmutablePath {
        self.join(rhs)
    }
}

impl<P: AsRef<Path>> Div<P> for ImmutablePath {
    type Output = ImmutablePath;

    fn div(self, rhs: P) -> ImmutablePath {
        self.join(rhs)
    }
}

/// String concatenation with a normalized right-hand side.
impl Add<&str> for &ImmutablePath {
    type Output = String;

    fn add(self, rhs: &str) -> String {
        let rhs = ImmutablePath::with_format(rhs, self.format);
        format!("{self}{rhs}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_name() {
        let actual = ImmutablePath::new("/A/B/test1.txt").with_name("other");
        assert_eq!(actual, ImmutablePath::new("/A/B/other"));
    }

    #[test]
    fn test_with_stem() {
        let actual = ImmutablePath::new("/A/B/test1.txt").with_stem("other");
        assert_eq!(actual, ImmutablePath::new("/A/B/other.txt"));
    }

    #[test]
    fn test_with_parent_from_other_dirname() {
        let other = ImmutablePath::new("/A/D/other.txt");
        let actual = ImmutablePath::new("/A/B/other.txt").with_parent(other.dirname().name());
        assert_eq!(actual, ImmutablePath::new("D/other.txt"));
    }

    #[test]
    fn test_with_base() {
        let path = ImmutablePath::new("/home/doe/folder/sub");
        assert_eq!(
            path.with_base("/home/joe", 0).unwrap(),
            ImmutablePath::new("/home/joe/folder/sub")
        );
        assert_eq!(
            path.with_base("/home/joe", 1).unwrap(),
            ImmutablePath::new("/home/joe/doe/folder/sub")
        );
    }

    #[test]
    fn test_with_base_fail() {
        let err = ImmutablePath::new("/A/B/other.txt")
            .with_base("/A/B/C", 0)
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_derivations_keep_flags() {
        let path = ImmutablePath::with_flags("/A/B/other.txt", Some(true), Some(true));
        let derived = [
            path.with_name("x"),
            path.with_stem("x"),
            path.with_suffix(".md"),
            path.with_parent("/C"),
            path.with_base("/C", 0).unwrap(),
            path.join("x"),
            path.clone_with("/A/B/C/D/other.txt"),
            path.name(),
            path.parent(),
            path.clone(),
            &path / "x",
        ];
        for d in derived {
            assert!(d.posix_enabled(), "{d:?} lost posix flag");
            assert!(d.string_repr_enabled(), "{d:?} lost string repr flag");
        }
    }

    #[test]
    fn test_construct_from_other_ignores_flags() {
        let posix = ImmutablePath::with_flags("/A/B", Some(true), None);
        let copied = ImmutablePath::new(&posix);
        assert_eq!(copied, posix);
        assert!(!copied.posix_enabled());
    }

    #[test]
    fn test_flag_setters() {
        let path = ImmutablePath::new("/A/B");
        assert!(!path.posix_enabled());
        assert!(path.with_posix_enabled(true).posix_enabled());
        assert!(path.with_string_repr_enabled(true).string_repr_enabled());
        assert!(!path.with_string_repr_enabled(true).posix_enabled());
    }

    #[test]
    fn test_explicit_defaults() {
        let defaults = PathDefaults {
            posix: true,
            string_repr: true,
            ..PathDefaults::default()
        };
        let path = ImmutablePath::with_defaults("/A", &defaults);
        assert!(path.posix_enabled());
        assert!(path.string_repr_enabled());
    }

    #[test]
    fn test_display_and_debug() {
        let posix = ImmutablePath::with_flags("\\A\\B", Some(true), Some(false));
        assert_eq!(posix.to_string(), "/A/B");
        assert_eq!(format!("{posix:?}"), "Path('/A/B')");

        let plain = ImmutablePath::with_flags("\\A\\B", Some(true), Some(true));
        assert_eq!(format!("{plain:?}"), "/A/B");
    }

    #[test]
    fn test_posix_string_ignores_flag() {
        let path = ImmutablePath::with_flags("\\A\\B/C", Some(false), None);
        assert_eq!(path.posix_string(), "/A/B/C");
    }

    #[test]
    fn test_join_all() {
        let actual = ImmutablePath::join_all(
            "/A/B",
            [
                PathBuf::from("C/"),
                ImmutablePath::new("D").to_path_buf(),
                PathBuf::from("other.txt"),
            ],
        );
        assert_eq!(actual, ImmutablePath::new("/A/B/C/D/other.txt"));
    }

    #[test]
    fn test_div() {
        assert_eq!(ImmutablePath::new("/A/") / "B/other.txt", "/A/B/other.txt");
        let base = ImmutablePath::new("/A/");
        assert_eq!(&base / ImmutablePath::new("B") / "other.txt", "/A/B/other.txt");
    }

    #[test]
    fn test_add() {
        let path = ImmutablePath::with_flags("/A/", Some(true), None);
        let joined = &path + "/B/";
        assert_eq!(joined, "/A/B");
        assert_eq!(joined + "/other.txt", "/A/B/other.txt");
    }

    #[test]
    #[cfg(unix)]
    fn test_parents() {
        let parents: Vec<_> = ImmutablePath::new("/A/B/C/D").parents().collect();
        assert_eq!(
            parents,
            vec![
                ImmutablePath::new("/A/B/C"),
                ImmutablePath::new("/A/B"),
                ImmutablePath::new("/A"),
                ImmutablePath::new("/"),
            ]
        );
    }

    #[test]
    fn test_suffix_accessors() {
        let path = ImmutablePath::new("file.txt.bak");
        assert_eq!(path.suffix(), ".bak");
        assert_eq!(path.ext(), ".bak");
        assert_eq!(path.suffixes(), vec![".txt", ".bak"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_anchor_and_component() {
        let path = ImmutablePath::new("/A/B/");
        assert_eq!(path.anchor(), "/");
        assert_eq!(path.component(1).as_deref(), Some("A"));
        assert_eq!(ImmutablePath::new("/B/A/").name().to_string(), "A");
    }

    #[test]
    #[cfg(unix)]
    fn test_home() {
        let relative = ImmutablePath::new("/A/B/C").relative_to("/A").unwrap();
        assert_eq!(relative.home(), ImmutablePath::new("B"));
        assert_eq!(ImmutablePath::new("/").home(), ImmutablePath::new(""));
        assert_eq!(
            ImmutablePath::new("/home/doe/folder/sub").home(),
            ImmutablePath::new("home")
        );
    }

    #[test]
    fn test_current_dir() {
        let cwd = ImmutablePath::current_dir().unwrap();
        assert_eq!(cwd, env::current_dir().unwrap());
    }

    #[test]
    fn test_absolute() {
        let relative = ImmutablePath::new("some/where");
        let absolute = relative.absolute().unwrap();
        assert!(absolute.is_absolute());
        assert!(absolute.as_path().ends_with("some/where"));
    }

    #[test]
    fn test_expand_user() {
        let expanded = ImmutablePath::new("~/project").expand_user().unwrap();
        assert_eq!(expanded, home::home_dir().unwrap().join("project"));
    }

    #[test]
    fn test_from_str_and_conversions() {
        let parsed: ImmutablePath = "/A//B".parse().unwrap();
        assert_eq!(parsed, "/A/B");
        let buf: PathBuf = parsed.into();
        assert_eq!(buf, PathBuf::from("/A/B"));
        assert_eq!(ImmutablePath::default().to_string(), "");
    }

    #[test]
    fn test_lock_cache_reused() {
        let path = ImmutablePath::new("/definitely/not/here.txt");
        let first: *const LockHandle = path.lock();
        let second: *const LockHandle = path.lock();
        assert_eq!(first, second);
        assert!(path.lock().is_dummy());
    }

    #[test]
    fn test_clone_gets_fresh_lock_cache() {
        let path = ImmutablePath::new("/definitely/not/here.txt");
        let _ = path.lock();
        let copy = path.clone();
        let first: *const LockHandle = path.lock();
        let copied: *const LockHandle = copy.lock();
        assert_ne!(first, copied);
    }
}
