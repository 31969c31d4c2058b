//! Transactional rename, move and copy scopes.
//!
//! A transactional scope only re-points its [`ImmutablePath`] binding once
//! the filesystem operation has fully succeeded. Failures are reported as
//! [`PathException`] and leave both the binding and, where the operation
//! did not start, the filesystem untouched.
//!
//! Locks taken by a scope are advisory: they only exclude code that checks
//! the same `.lock` sentinel.
//!
//! # Examples
//!
//! ```no_run
//! use mutapath::{Error, ImmutablePath};
//!
//! let mut path = ImmutablePath::new("/home/doe/folder/a.txt");
//! let result = path.copying(|m| {
//!     m.set_stem("backup");
//!     Ok::<_, Error>(())
//! });
//! match result {
//!     Ok(()) => assert_eq!(path, "/home/doe/folder/backup.txt"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! [`ImmutablePath`]: crate::ImmutablePath
//! [`PathException`]: crate::PathException

pub mod operation;
pub mod runner;

pub use operation::{copy_dir_all, CopyFile, FileOperation, Move, Rename, Renames};
pub use runner::TransactionRunner;
