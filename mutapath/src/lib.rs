#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # mutapath
//!
//! Immutable filesystem paths with scoped, transactional mutation.
//!
//! Paths are normalized on construction and never change in place. A path
//! held in a binding can be re-pointed through a scope that commits only on
//! success, optionally backed by a rename, move or copy on disk guarded by
//! an advisory lock.
//!
//! ## Core Types
//!
//! - [`ImmutablePath`]: The path value type
//! - [`MutablePath`]: The view handed to scope bodies
//! - [`TransactionRunner`]: Renaming, moving and copying scopes
//! - [`LockHandle`]: Advisory `.lock` sentinel locks
//! - [`PathDefaults`]: Default format flags and lock timeout
//! - [`Error`] and [`Result`]: Error handling types
//!
//! ## Examples
//!
//! ```
//! use mutapath::{Error, ImmutablePath};
//!
//! let path = ImmutablePath::new("/home/doe/folder/sub");
//! assert_eq!(path.with_base("/home/joe", 0).unwrap(), "/home/joe/folder/sub");
//!
//! let mut current = path.clone();
//! current
//!     .mutate(|m| {
//!         m.set_name("top");
//!         Ok::<_, Error>(())
//!     })
//!     .unwrap();
//! assert_eq!(current, "/home/doe/folder/top");
//! assert_eq!(path, "/home/doe/folder/sub");
//! ```
//!
//! Transactional scopes act on the filesystem:
//!
//! ```no_run
//! use mutapath::{Error, ImmutablePath};
//!
//! let mut path = ImmutablePath::new("/home/doe/folder/a.txt");
//! path.renaming(|m| {
//!     m.set_stem("b");
//!     Ok::<_, Error>(())
//! })
//! .unwrap();
//! assert_eq!(path, "/home/doe/folder/b.txt");
//! ```

pub mod config;
pub mod error;
pub mod lock;
pub mod path;
pub mod serialization;
pub mod transaction;

// Re-export key types at crate root for convenience
pub use config::{ConfigLoader, PathDefaults, PathFormat};
pub use error::{Error, Operation, PathException, PathFailure, Result};
pub use lock::{LockGuard, LockHandle};
pub use path::{ImmutablePath, MutablePath, NormalizedPath};
pub use transaction::{FileOperation, TransactionRunner};
