/// Property-based tests using proptest
/// Tests invariants of the UBO key schema that should hold for all slot counts
use proptest::prelude::*;
use std::collections::HashSet;
use ubo_sync::ubo_keys::{generate_ubo_keys, parse_ubo_field_code, UboField};

// Property: every slot gets the full set of field codes
proptest! {
    #[test]
    fn schema_has_one_entry_per_slot(max_ubos in 1u32..=64) {
        let schema = generate_ubo_keys(max_ubos).unwrap();
        prop_assert_eq!(schema.max_ubos(), max_ubos);

        let slots: Vec<u32> = schema.slots().map(|(n, _)| n).collect();
        let expected: Vec<u32> = (1..=max_ubos).collect();
        prop_assert_eq!(slots, expected);

        for (_, keys) in schema.slots() {
            prop_assert_eq!(keys.len(), UboField::ALL.len());
        }
    }

    #[test]
    fn generated_codes_are_unique_and_parse_back(max_ubos in 1u32..=64) {
        let schema = generate_ubo_keys(max_ubos).unwrap();
        let mut seen = HashSet::new();

        for (ubo_number, keys) in schema.slots() {
            for (field, code) in keys {
                prop_assert!(seen.insert(code.clone()), "duplicate code {}", code);
                prop_assert_eq!(parse_ubo_field_code(code), Some((ubo_number, *field)));
            }
        }
    }
}

// Property: field code parsing never panics
proptest! {
    #[test]
    fn parse_never_panics(code in "\\PC*") {
        let _ = parse_ubo_field_code(&code);
    }

    #[test]
    fn unknown_suffixes_are_rejected(ubo_number in 1u32..=99, suffix in "[a-z]{1,12}") {
        let code = format!("adyen-ubo{}-{}", ubo_number, suffix);
        let known = UboField::from_suffix(&suffix).is_some();
        prop_assert_eq!(parse_ubo_field_code(&code).is_some(), known);
    }
}
