//! Property-based tests for immutable paths.
//!
//! Note: The normalize module already has property tests for component
//! resolution. This module focuses on flag preservation and construction.

use super::ImmutablePath;
use crate::config::PathFormat;
use proptest::prelude::*;

fn path_component_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9_-]{1,12}(\\.[a-z]{1,4})?"
}

fn messy_path_strategy() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        prop::collection::vec(
            prop_oneof![
                4 => path_component_strategy(),
                1 => path_component_strategy().prop_map(|c| format!("{c}\\")),
                1 => Just(".".to_string()),
                1 => Just("..".to_string()),
                1 => Just(String::new()),
            ],
            0..8,
        ),
    )
        .prop_map(|(absolute, parts)| {
            let joined = parts.join("/");
            if absolute {
                format!("/{joined}")
            } else {
                joined
            }
        })
}

fn format_strategy() -> impl Strategy<Value = PathFormat> {
    (any::<bool>(), any::<bool>()).prop_map(|(posix, string_repr)| PathFormat {
        posix,
        string_repr,
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 2000,
        .. ProptestConfig::default()
    })]

    // Constructing from a normalized value changes nothing
    #[test]
    fn construction_idempotent(raw in messy_path_strategy()) {
        let once = ImmutablePath::new(&raw);
        let twice = ImmutablePath::new(once.as_path());
        prop_assert_eq!(once.as_path(), twice.as_path());
    }

    // Display output constructs back into the same display output
    #[test]
    fn display_round_trip(raw in messy_path_strategy(), format in format_strategy()) {
        let path = ImmutablePath::with_format(&raw, format);
        let again = ImmutablePath::with_format(path.to_string(), format);
        prop_assert_eq!(path.to_string(), again.to_string());
    }

    // Derivations keep both format flags
    #[test]
    fn derivations_preserve_flags(
        raw in messy_path_strategy(),
        part in path_component_strategy(),
        format in format_strategy(),
    ) {
        let path = ImmutablePath::with_format(&raw, format);
        let derived = [
            path.with_name(&part),
            path.with_stem(&part),
            path.with_suffix(".md"),
            path.with_parent(&part),
            path.join(&part),
            path.clone_with(&part),
            path.clone(),
            path.parent(),
            path.name(),
            &path / &part,
        ];
        for d in &derived {
            prop_assert_eq!(d.format(), format);
        }
    }

    // Only the targeted flag changes
    #[test]
    fn flag_setters_are_independent(raw in messy_path_strategy(), format in format_strategy()) {
        let path = ImmutablePath::with_format(&raw, format);
        let flipped = path.with_posix_enabled(!format.posix);
        prop_assert_eq!(flipped.string_repr_enabled(), format.string_repr);
        prop_assert_eq!(flipped.posix_enabled(), !format.posix);
        prop_assert_eq!(&flipped, &path.with_posix_enabled(!format.posix));
    }

    // A committed scope equals the pure derivation
    #[test]
    fn mutate_matches_with_name(raw in messy_path_strategy(), part in path_component_strategy()) {
        let mut path = ImmutablePath::new(&raw);
        let expected = path.with_name(&part);
        path.mutate(|m| {
            m.set_name(&part);
            Ok::<_, crate::Error>(())
        }).unwrap();
        prop_assert_eq!(path, expected);
    }

    // Equality and ordering agree
    #[test]
    fn ord_consistent_with_eq(
        a in messy_path_strategy(),
        b in messy_path_strategy(),
        posix in any::<bool>(),
    ) {
        let a = ImmutablePath::new(&a);
        let b = ImmutablePath::new(&b).with_posix_enabled(posix);
        prop_assert_eq!(a == b, a.cmp(&b) == std::cmp::Ordering::Equal);
    }
}
