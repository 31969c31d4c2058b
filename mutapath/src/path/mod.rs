//! Immutable paths with scoped mutation.
//!
//! # Key Concepts
//!
//! ## Normalization
//!
//! Every input is normalized textually on construction:
//! - Duplicate separators and trailing separators are dropped
//! - `.` components are removed and `..` is resolved against the preceding
//!   component
//! - The empty string stays empty
//!
//! No filesystem access is involved, so symlinks are not followed.
//!
//! ## Format flags
//!
//! Each [`ImmutablePath`] carries two flags that only affect presentation
//! and comparison:
//!
//! - **posix**: `Display` uses forward slashes, and comparisons against this
//!   path use the forward-slash form of both sides
//! - **string representation**: `Debug` shows the plain string instead of
//!   `Path('...')`
//!
//! Every derived path inherits the flags of its origin.
//!
//! ## Scopes
//!
//! Values never change in place. A binding can be re-pointed through a
//! scope that works on a [`MutablePath`] view and commits only on success:
//!
//! ```
//! use mutapath::{Error, ImmutablePath};
//!
//! let mut path = ImmutablePath::new("/home/doe/folder/sub");
//! let derived = path.with_name("top");
//! assert_eq!(path, "/home/doe/folder/sub");
//!
//! path.mutate(|m| {
//!     m.set_name("top");
//!     Ok::<_, Error>(())
//! })
//! .unwrap();
//! assert_eq!(path, derived);
//! ```

mod compare;
pub mod immutable;
pub mod mutable;
pub mod normalize;

#[cfg(all(test, feature = "property-tests"))]
mod proptests;

pub use immutable::ImmutablePath;
pub use mutable::MutablePath;
pub use normalize::NormalizedPath;
