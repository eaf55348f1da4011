//! Property-based tests for kind ordering and template rendering.
//!
//! These tests use proptest to generate random batches and values and verify
//! that ordering and rendering invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::assets::AssetName;
    use crate::manifest::{self, Manifest};
    use crate::phases::ordering::{execute, KindOrder, STANDARD_KINDS_ORDER};
    use crate::template::compile;
    use crate::values::ValuesDocument;
    use proptest::prelude::*;
    use std::path::PathBuf;

    fn kind_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::sample::select(STANDARD_KINDS_ORDER).prop_map(str::to_string),
            "[A-Z][a-z]{2,8}",
        ]
    }

    fn batch(kinds: &[String]) -> Vec<Manifest> {
        let asset = AssetName::new(PathBuf::from("batch.yaml"), PathBuf::from("batch.yaml"));
        let text: String = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| format!("---\nkind: \"{}\"\nmetadata:\n  name: m{}\n", kind, i))
            .collect();
        manifest::split(&asset, text.as_bytes()).unwrap()
    }

    // ============================================================================
    // Kind ordering property tests
    // ============================================================================

    proptest! {
        /// Property: ordering is a permutation of the batch
        #[test]
        fn ordering_is_permutation(kinds in prop::collection::vec(kind_strategy(), 0..24)) {
            let manifests = batch(&kinds);
            let mut before: Vec<_> = manifests.iter().map(|m| m.name.clone()).collect();
            let mut after: Vec<_> = execute(manifests, KindOrder::Standard)
                .iter()
                .map(|m| m.name.clone())
                .collect();
            before.sort();
            after.sort();
            prop_assert_eq!(before, after);
        }

        /// Property: ranks never decrease along the ordered batch
        #[test]
        fn ordering_ranks_are_monotonic(kinds in prop::collection::vec(kind_strategy(), 0..24)) {
            let ordered = execute(batch(&kinds), KindOrder::Standard);
            for pair in ordered.windows(2) {
                prop_assert!(
                    KindOrder::Standard.rank(&pair[0].kind) <= KindOrder::Standard.rank(&pair[1].kind),
                    "{} ordered before {}",
                    pair[0],
                    pair[1]
                );
            }
        }

        /// Property: manifests of equal rank keep their discovery order
        #[test]
        fn ordering_is_stable(kinds in prop::collection::vec(kind_strategy(), 0..24)) {
            let ordered = execute(batch(&kinds), KindOrder::Standard);
            for pair in ordered.windows(2) {
                if KindOrder::Standard.rank(&pair[0].kind) == KindOrder::Standard.rank(&pair[1].kind) {
                    prop_assert!(pair[0].index < pair[1].index);
                }
            }
        }

        /// Property: opting out of kind ordering keeps the batch untouched
        #[test]
        fn no_create_update_kinds_is_identity(kinds in prop::collection::vec(kind_strategy(), 0..24)) {
            let manifests = batch(&kinds);
            let ordered = execute(manifests.clone(), KindOrder::NoCreateUpdateKinds);
            prop_assert_eq!(manifests, ordered);
        }
    }

    // ============================================================================
    // Template property tests
    // ============================================================================

    proptest! {
        /// Property: text without actions renders unchanged
        #[test]
        fn plain_text_is_unchanged(text in "[^{}]*") {
            let rendered = compile(&text, &ValuesDocument::new()).unwrap();
            prop_assert_eq!(rendered, text);
        }

        /// Property: rendering is deterministic for identical inputs
        #[test]
        fn rendering_is_deterministic(name in "[a-z][a-z0-9-]{0,20}") {
            let values = ValuesDocument::parse(format!("Name: \"{}\"\n", name).as_bytes()).unwrap();
            let text = "metadata:\n  name: {{ .Name }}\n";
            let first = compile(text, &values).unwrap();
            let second = compile(text, &values).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first, format!("metadata:\n  name: {}\n", name));
        }
    }
}
