//! Serde support for [`ImmutablePath`].
//!
//! Paths serialize as their normalized native string, independent of the
//! posix flag, and deserialize through plain construction with the current
//! thread's defaults.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::path::ImmutablePath;

/// The interchange form of `path`.
///
/// # Examples
///
/// ```
/// use mutapath::{serialization, ImmutablePath};
///
/// let path = ImmutablePath::with_flags("/A//B/", Some(true), None);
/// assert_eq!(serialization::serialize(&path), "/A/B");
/// ```
#[must_use]
pub fn serialize(path: &ImmutablePath) -> String {
    path.normalized().to_native_string()
}

/// Construct a path from its interchange form.
#[must_use]
pub fn deserialize(value: &str) -> ImmutablePath {
    ImmutablePath::new(value)
}

impl Serialize for ImmutablePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&serialize(self))
    }
}

struct PathVisitor;

impl Visitor<'_> for PathVisitor {
    type Value = ImmutablePath;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a path string")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(deserialize(value))
    }
}

impl<'de> Deserialize<'de> for ImmutablePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(PathVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Project {
        root: ImmutablePath,
        files: Vec<ImmutablePath>,
    }

    #[test]
    fn test_serialize_ignores_posix_flag() {
        let path = ImmutablePath::with_flags("/A/B/../C", Some(true), Some(true));
        assert_eq!(serialize(&path), "/A/C");
        assert_eq!(serde_json::to_string(&path).unwrap(), "\"/A/C\"");
    }

    #[test]
    fn test_deserialize_normalizes() {
        let path: ImmutablePath = serde_json::from_str("\"/A//B/./C/\"").unwrap();
        assert_eq!(path, "/A/B/C");
        assert_eq!(deserialize("/A//B"), "/A/B");
    }

    #[test]
    fn test_nested_round_trip() {
        let project = Project {
            root: ImmutablePath::new("/srv/app"),
            files: vec![
                ImmutablePath::new("/srv/app/main.rs"),
                ImmutablePath::new("/srv/app/lib.rs"),
            ],
        };
        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("\"/srv/app/main.rs\""));
        let back: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(back, project);
    }

    #[test]
    fn test_rejects_non_string() {
        assert!(serde_json::from_str::<ImmutablePath>("42").is_err());
    }

    #[test]
    fn test_yaml_config_field() {
        let path: ImmutablePath = serde_yaml::from_str("/data//cache\n").unwrap();
        assert_eq!(path, "/data/cache");
    }
}
