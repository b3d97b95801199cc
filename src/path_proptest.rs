//! Property-based tests for path translation.
//!
//! These tests use proptest to generate random repository layouts and verify
//! that tier translation invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{normalize, repository_dir_name, to_absolute, to_relative};
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            6 => "[a-zA-Z0-9_-]{1,8}",
            1 => Just(".".to_string()),
            1 => Just("..".to_string()),
        ]
    }

    fn build_path(root: &[String], rest: &[String]) -> PathBuf {
        let mut path = PathBuf::from("/");
        for s in root.iter().chain(rest) {
            path.push(s);
        }
        path
    }

    proptest! {
        /// Property: ToAbsolute(ToRelative(p, r), r) == normalize(p) for p under r
        #[test]
        fn relative_then_absolute_round_trips(
            root in prop::collection::vec("[a-z0-9]{1,6}", 1..4),
            rest in prop::collection::vec(segment(), 0..6),
        ) {
            let root_path = build_path(&root, &[]);
            let path = build_path(&root, &rest);
            prop_assume!(normalize(&path).starts_with(normalize(&root_path)));

            let relative = to_relative(&path, &root_path);
            prop_assert!(relative == "." || relative.starts_with("./"), "got {}", relative);
            prop_assert!(!relative.contains('\\'));
            prop_assert_eq!(to_absolute(&relative, &root_path), normalize(&path));
        }

        /// Property: paths outside the root come back unchanged
        #[test]
        fn outside_paths_are_unchanged(
            root in prop::collection::vec("[a-z]{1,6}", 1..3),
            other in prop::collection::vec("[A-Z]{1,6}", 1..3),
        ) {
            let root_path = build_path(&root, &[]);
            let outside = build_path(&other, &[]);
            prop_assert_eq!(to_relative(&outside, &root_path), outside.to_string_lossy().into_owned());
        }

        /// Property: normalize is idempotent
        #[test]
        fn normalize_is_idempotent(rest in prop::collection::vec(segment(), 0..8)) {
            let path = build_path(&[], &rest);
            let once = normalize(&path);
            prop_assert_eq!(normalize(&once), once);
        }

        /// Property: a derived clone directory name never contains separators
        #[test]
        fn repository_dir_name_has_no_separators(url in ".*") {
            if let Ok(name) = repository_dir_name(&url) {
                prop_assert!(!name.contains('/') && !name.contains('\\'));
                prop_assert!(name != "." && name != ".." && !name.trim().is_empty());
            }
        }
    }
}
