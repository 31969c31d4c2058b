//! Equality, ordering and hashing for [`ImmutablePath`].
//!
//! Paths compare by normalized value. If either side has the posix flag set,
//! both sides are compared in their forward-slash form instead, so
//! `\A\B` equals `/A/B` once posix rendering is enabled. Strings and standard
//! library paths on the other side are normalized with the flags of the
//! `ImmutablePath` before comparing.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Once;

use super::immutable::ImmutablePath;
use super::normalize::NormalizedPath;

static HASH_WARNING: Once = Once::new();

impl ImmutablePath {
    fn either_posix(&self, other: &Self) -> bool {
        self.posix_enabled() || other.posix_enabled()
    }

    // Rendering with forward slashes can introduce empty or `.` components
    // (`A\/B` becomes `A//B`), so the posix form is normalized again.
    fn posix_key(&self) -> NormalizedPath {
        NormalizedPath::new(self.posix_string())
    }

    fn sort_key(&self, posix: bool) -> Vec<String> {
        if posix {
            self.posix_key().split_all()
        } else {
            self.split_all()
        }
    }

    fn adopt(&self, other: impl AsRef<Path>) -> Self {
        Self::with_format(other, self.format())
    }
}

impl PartialEq for ImmutablePath {
    fn eq(&self, other: &Self) -> bool {
        if self.either_posix(other) {
            self.posix_key() == other.posix_key()
        } else {
            self.normalized() == other.normalized()
        }
    }
}

impl Eq for ImmutablePath {}

impl PartialOrd for ImmutablePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ImmutablePath {
    fn cmp(&self, other: &Self) -> Ordering {
        let posix = self.either_posix(other);
        self.sort_key(posix).cmp(&other.sort_key(posix))
    }
}

/// Hashes the forward-slash form so that equal paths hash alike.
///
/// The value of a path bound by `let mut` can change through a mutation
/// scope; a path changed while it is a key of a hashed collection is lost
/// to that collection. A warning is logged the first time a path is hashed.
impl Hash for ImmutablePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        HASH_WARNING.call_once(|| {
            log::warn!(
                "hashing a mutapath path: changing it inside a mutation scope \
                 while it is used as a key invalidates the hash"
            );
        });
        self.posix_key().to_posix_string().hash(state);
    }
}

macro_rules! impl_foreign_cmp {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PartialEq<$ty> for ImmutablePath {
                fn eq(&self, other: &$ty) -> bool {
                    *self == self.adopt(other)
                }
            }

            impl PartialEq<ImmutablePath> for $ty {
                fn eq(&self, other: &ImmutablePath) -> bool {
                    other == self
                }
            }

            impl PartialOrd<$ty> for ImmutablePath {
                fn partial_cmp(&self, other: &$ty) -> Option<Ordering> {
                    Some(self.cmp(&self.adopt(other)))
                }
            }
        )*
    };
}

impl_foreign_cmp!(str, &str, String, Path, PathBuf);
