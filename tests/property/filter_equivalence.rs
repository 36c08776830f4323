use proptest::prelude::*;
use testorch::filter::{Condition, FilterExpression, Operation, PropertyValue};

// Small alphabet so generated values collide with the sampled values often.
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-cA-C]{1,3}"
}

/// The tree a parser would build for `name=v1|name=v2|...` without the
/// set-membership shortcut.
fn or_tree(name: &str, values: &[String]) -> FilterExpression {
    let mut leaves = values
        .iter()
        .map(|v| FilterExpression::Leaf(Condition::new(name, Operation::Equal, v.as_str())));
    let first = leaves.next().expect("at least one value");
    leaves.fold(first, |left, right| FilterExpression::Binary {
        left: Box::new(left),
        right: Box::new(right),
        is_and: false,
    })
}

proptest! {
    #[test]
    fn fast_set_matches_the_or_tree(
        values in proptest::collection::vec(value_strategy(), 1..6),
        sampled in proptest::collection::vec(value_strategy(), 0..3),
    ) {
        let filter = values
            .iter()
            .map(|v| format!("Category={v}"))
            .collect::<Vec<_>>()
            .join("|");
        let fast = FilterExpression::parse(&filter).expect("generated filter parses");
        prop_assert!(fast.is_fast_path());

        let tree = or_tree("Category", &values);
        let provider = |name: &str| {
            (name == "Category" && !sampled.is_empty())
                .then(|| PropertyValue::Multiple(sampled.clone()))
        };

        prop_assert_eq!(fast.evaluate(&provider, None), tree.evaluate(&provider, None));
    }

    #[test]
    fn parenthesised_or_chain_keeps_the_fast_path(
        values in proptest::collection::vec(value_strategy(), 2..5),
    ) {
        let (head, tail) = values.split_at(1);
        let inner = tail
            .iter()
            .map(|v| format!("Category={v}"))
            .collect::<Vec<_>>()
            .join("|");
        let filter = format!("Category={}|({inner})", head[0]);

        let parsed = FilterExpression::parse(&filter).expect("generated filter parses");
        let fast = parsed.fast_filter().expect("fast path");
        prop_assert_eq!(fast.values().len(), values.iter().collect::<std::collections::HashSet<_>>().len());
    }

    #[test]
    fn display_output_reparses_to_the_same_expression(
        a in value_strategy(),
        b in value_strategy(),
        c in value_strategy(),
    ) {
        let filter = format!("(Name={a}|Owner!={b})&Tag~{c}");
        let parsed = FilterExpression::parse(&filter).expect("generated filter parses");
        let reparsed = FilterExpression::parse(&parsed.to_string()).expect("display reparses");
        prop_assert_eq!(parsed, reparsed);
    }
}
