#![allow(missing_docs)]

use proptest::prelude::*;
use tan_filter::{CompiledQuery, DEFAULT_LIMIT, MAX_LIMIT, Predicate, compile};
use tan_model::FilterSpec;

fn predicate_count(q: &CompiledQuery) -> usize {
    q.predicates.len()
}

proptest! {
    /// Any spec with every categorical set empty compiles without
    /// categorical predicates, whatever the pagination asks for.
    #[test]
    fn prop_empty_categorical_sets_are_unconstrained(
        page in -10i64..10_000,
        limit in -10i64..20_000,
    ) {
        let spec = FilterSpec { page, limit, ..FilterSpec::default() };
        let q = compile(&spec).unwrap();
        prop_assert_eq!(predicate_count(&q), 1);
        prop_assert_eq!(&q.predicates[0], &Predicate::NotDeleted);
    }

    /// The compiled limit always lands in [1, MAX_LIMIT] and the offset
    /// is consistent with the clamped page for any representable page
    /// number, saturating instead of overflowing.
    #[test]
    fn prop_limit_and_page_clamps(
        page in proptest::num::i64::ANY,
        limit in proptest::num::i64::ANY,
    ) {
        let spec = FilterSpec { page, limit, ..FilterSpec::default() };
        let q = compile(&spec).unwrap();
        prop_assert!(q.limit >= 1 && q.limit <= MAX_LIMIT);
        if limit < 1 {
            prop_assert_eq!(q.limit, DEFAULT_LIMIT);
        }
        prop_assert!(q.page >= 1);
        prop_assert_eq!(q.offset, (q.page - 1).saturating_mul(q.limit));
        prop_assert!(q.offset >= 0);
    }

    /// Adding values to a categorical set only ever adds predicates;
    /// the unconstrained compile stays a (strict) prefix.
    #[test]
    fn prop_non_empty_set_extends_unconstrained_compile(
        trials in proptest::collection::btree_set("[A-Za-z ]{1,12}", 1..4),
    ) {
        let unconstrained = compile(&FilterSpec::default()).unwrap();
        let spec = FilterSpec { trials, ..FilterSpec::default() };
        let q = compile(&spec).unwrap();
        prop_assert_eq!(predicate_count(&q), predicate_count(&unconstrained) + 1);
        prop_assert_eq!(&q.predicates[0], &Predicate::NotDeleted);
        prop_assert!(matches!(q.predicates[1], Predicate::TrialIn(_)));
    }

    /// Every parameter a predicate references exists in the flattened
    /// parameter list.
    #[test]
    fn prop_predicate_params_are_always_in_bounds(
        search in "[a-z]{0,8}",
        start_day in 1u32..28,
    ) {
        let spec = FilterSpec {
            search_term: search,
            date_range: tan_model::DateRange {
                start: Some(format!("2024-02-{start_day:02}")),
                end: None,
            },
            ..FilterSpec::default()
        };
        let q = compile(&spec).unwrap();
        for predicate in &q.predicates {
            if let Some(param) = predicate.param() {
                prop_assert!(param.0 < q.params.len());
            }
        }
    }
}
