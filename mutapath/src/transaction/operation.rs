//! Filesystem primitives used by transactional scopes.
//!
//! Each primitive takes the source and the requested target and returns the
//! path that actually holds the result, which may differ from the request
//! (for example when copying into a directory).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A two-argument filesystem operation.
///
/// Any `Fn(&Path, &Path) -> io::Result<PathBuf>` is a `FileOperation`, so a
/// closure can stand in for the built-ins.
///
/// # Examples
///
/// ```
/// use mutapath::transaction::FileOperation;
/// use std::io;
/// use std::path::{Path, PathBuf};
///
/// fn hard_link(source: &Path, target: &Path) -> io::Result<PathBuf> {
///     std::fs::hard_link(source, target)?;
///     Ok(target.to_path_buf())
/// }
///
/// fn takes_operation(_op: &dyn FileOperation) {}
/// takes_operation(&hard_link);
/// ```
pub trait FileOperation {
    /// Apply the operation and return the resulting path.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn apply(&self, source: &Path, target: &Path) -> io::Result<PathBuf>;
}

impl<F> FileOperation for F
where
    F: Fn(&Path, &Path) -> io::Result<PathBuf>,
{
    fn apply(&self, source: &Path, target: &Path) -> io::Result<PathBuf> {
        self(source, target)
    }
}

/// Plain rename; fails across filesystems.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rename;

impl FileOperation for Rename {
    fn apply(&self, source: &Path, target: &Path) -> io::Result<PathBuf> {
        fs::rename(source, target)?;
        Ok(target.to_path_buf())
    }
}

/// Rename that creates missing target directories first and afterwards
/// removes source directories the rename left empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct Renames;

impl FileOperation for Renames {
    fn apply(&self, source: &Path, target: &Path) -> io::Result<PathBuf> {
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::rename(source, target)?;
        if let Some(parent) = source.parent() {
            prune_empty_dirs(parent);
        }
        Ok(target.to_path_buf())
    }
}

/// Move a file or directory, falling back to copy and delete when a rename
/// is not possible. Moving onto an existing directory moves inside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Move;

impl FileOperation for Move {
    fn apply(&self, source: &Path, target: &Path) -> io::Result<PathBuf> {
        let target = inside_if_dir(source, target)?;
        if target.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("destination {} already exists", target.display()),
            ));
        }

        if let Err(e) = fs::rename(source, &target) {
            log::debug!(
                "rename {} -> {} failed ({e}), copying instead",
                source.display(),
                target.display()
            );
            if source.is_dir() {
                copy_dir_all(source, &target)?;
                fs::remove_dir_all(source)?;
            } else {
                fs::copy(source, &target)?;
                fs::remove_file(source)?;
            }
        }
        Ok(target)
    }
}

/// Copy a file with its permissions. Copying onto an existing directory
/// copies inside it.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFile;

impl FileOperation for CopyFile {
    fn apply(&self, source: &Path, target: &Path) -> io::Result<PathBuf> {
        if source.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", source.display()),
            ));
        }
        let target = inside_if_dir(source, target)?;
        if target.exists() && fs::canonicalize(source)? == fs::canonicalize(&target)? {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} and {} are the same file", source.display(), target.display()),
            ));
        }
        fs::copy(source, &target)?;
        Ok(target)
    }
}

fn inside_if_dir(source: &Path, target: &Path) -> io::Result<PathBuf> {
    if !target.is_dir() {
        return Ok(target.to_path_buf());
    }
    let name = source.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no file name", source.display()),
        )
    })?;
    Ok(target.join(name))
}

/// Recursively copy the directory `source` to the new directory `target`.
///
/// Symbolic links are recreated as links rather than followed.
///
/// # Errors
///
/// Returns the first I/O error encountered, after removing the partial copy.
pub fn copy_dir_all(source: &Path, target: &Path) -> io::Result<()> {
    fs::create_dir(target)?;
    if let Err(e) = copy_tree(source, target) {
        if let Err(cleanup) = fs::remove_dir_all(target) {
            log::warn!("could not remove partial copy {}: {cleanup}", target.display());
        }
        return Err(e);
    }
    Ok(())
}

fn copy_tree(source: &Path, target: &Path) -> io::Result<()> {
    for entry in WalkDir::new(source).min_depth(1).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let destination = target.join(relative);

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            copy_symlink(entry.path(), &destination)?;
        } else if file_type.is_dir() {
            fs::create_dir(&destination)?;
        } else {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, destination: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(link)?, destination)
}

#[cfg(windows)]
fn copy_symlink(link: &Path, destination: &Path) -> io::Result<()> {
    let pointee = fs::read_link(link)?;
    if fs::metadata(link).is_ok_and(|m| m.is_dir()) {
        std::os::windows::fs::symlink_dir(pointee, destination)
    } else {
        std::os::windows::fs::symlink_file(pointee, destination)
    }
}

// Stops at the first directory that is not empty or cannot be removed.
fn prune_empty_dirs(start: &Path) {
    for dir in start.ancestors() {
        if dir.as_os_str().is_empty() || fs::remove_dir(dir).is_err() {
            break;
        }
        log::debug!("removed empty directory {}", dir.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_rename() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let result = Rename.apply(&source, &dir.path().join("b.txt")).unwrap();
        assert_eq!(result, dir.path().join("b.txt"));
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(result).unwrap(), "a");
    }

    #[test]
    fn test_renames_creates_and_prunes() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("x/y");
        fs::create_dir_all(&nested).unwrap();
        let source = nested.join("a.txt");
        fs::write(&source, "a").unwrap();

        let target = dir.path().join("p/q/a.txt");
        let result = Renames.apply(&source, &target).unwrap();
        assert_eq!(result, target);
        assert!(target.is_file());
        assert!(!dir.path().join("x").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_move_into_directory() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        let target_dir = dir.path().join("sub");
        fs::write(&source, "a").unwrap();
        fs::create_dir(&target_dir).unwrap();

        let result = Move.apply(&source, &target_dir).unwrap();
        assert_eq!(result, target_dir.join("a.txt"));
        assert!(result.is_file());
        assert!(!source.exists());
    }

    #[test]
    fn test_move_refuses_existing_destination() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        let target_dir = dir.path().join("sub");
        fs::write(&source, "a").unwrap();
        fs::create_dir(&target_dir).unwrap();
        fs::write(target_dir.join("a.txt"), "other").unwrap();

        let err = Move.apply(&source, &target_dir).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(source.exists());
    }

    #[test]
    fn test_copy_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let result = CopyFile.apply(&source, &dir.path().join("b.txt")).unwrap();
        assert!(source.exists());
        assert_eq!(fs::read_to_string(result).unwrap(), "a");
    }

    #[test]
    fn test_copy_rejects_directory_source() {
        let dir = tempdir().unwrap();
        let err = CopyFile
            .apply(dir.path(), &dir.path().join("copy"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_copy_onto_itself_is_rejected() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let err = CopyFile.apply(&source, &source).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(fs::read_to_string(&source).unwrap(), "a");
    }

    #[test]
    fn test_copy_dir_all() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        fs::create_dir_all(source.join("inner")).unwrap();
        fs::write(source.join("inner/a.txt"), "a").unwrap();

        copy_dir_all(&source, &dir.path().join("dst")).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("dst/inner/a.txt")).unwrap(),
            "a"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_all_keeps_directory_symlinks() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("src");
        fs::create_dir_all(source.join("real")).unwrap();
        fs::write(source.join("real/a.txt"), "a").unwrap();
        std::os::unix::fs::symlink(source.join("real"), source.join("link")).unwrap();

        let target = dir.path().join("dst");
        copy_dir_all(&source, &target).unwrap();

        assert_eq!(fs::read_to_string(target.join("real/a.txt")).unwrap(), "a");
        let link = target.join("link");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), source.join("real"));
    }

    #[test]
    fn test_copy_dir_all_removes_partial_copy() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("dst");

        let err = copy_dir_all(&dir.path().join("missing"), &target).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!target.exists());
    }

    #[test]
    fn test_closure_is_operation() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.txt");
        fs::write(&source, "a").unwrap();

        let op = |src: &Path, dst: &Path| -> io::Result<PathBuf> {
            fs::copy(src, dst)?;
            Ok(dst.to_path_buf())
        };
        let result = op.apply(&source, &dir.path().join("c.txt")).unwrap();
        assert!(result.exists());
    }
}
