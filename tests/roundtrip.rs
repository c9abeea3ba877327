//! Round-trip properties of the flatten/unflatten codec.

use harfnegar::{flatten, unflatten, Key, Node, PathKey, Record};
use indexmap::IndexMap;
use proptest::prelude::*;

fn mapping(entries: Vec<(&str, Node)>) -> Node {
    Node::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (Key::name(k), v))
            .collect::<IndexMap<_, _>>(),
    )
}

#[test]
fn json_scenario_flattens_to_one_record() {
    let node = mapping(vec![("a", mapping(vec![("b", Node::scalar("1"))]))]);
    let records = flatten(&node);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path.to_string(), "a.b");
    assert_eq!(records[0].value, "1");
}

#[test]
fn json_scenario_unflattens_to_string_leaf() {
    let records = vec![Record::new(PathKey::parse("a.b").unwrap(), "1")];
    let node = unflatten(&records).unwrap();
    // the leaf is string-typed; scalar types do not survive the flat form
    assert_eq!(node, mapping(vec![("a", mapping(vec![("b", Node::scalar("1"))]))]));
}

#[test]
fn mixed_tree_roundtrip() {
    let node = mapping(vec![
        ("title", Node::scalar("حرف‌نگار")),
        (
            "menu",
            Node::Sequence(vec![
                mapping(vec![
                    ("label", Node::scalar("پرونده")),
                    ("items", Node::Sequence(vec![Node::scalar("جدید")])),
                ]),
                mapping(vec![("label", Node::scalar("ابزارها"))]),
            ]),
        ),
        ("empty", Node::scalar("")),
    ]);
    let rebuilt = unflatten(&flatten(&node)).unwrap();
    assert_eq!(rebuilt, node);
}

// Strategy for trees whose containers are never empty: an empty mapping
// or sequence has no leaves, so nothing in the flat form can bring it
// back.
fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = "[a-z]{0,8}".prop_map(Node::Scalar);
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Node::Sequence),
            prop::collection::btree_map("[a-z]{1,6}", inner, 1..4).prop_map(|map| {
                Node::Mapping(
                    map.into_iter()
                        .map(|(k, v)| (Key::name(k), v))
                        .collect::<IndexMap<_, _>>(),
                )
            }),
        ]
    })
}

proptest! {
    #[test]
    fn unflatten_inverts_flatten(node in node_strategy()) {
        let records = flatten(&node);
        let rebuilt = unflatten(&records).unwrap();
        // compare through the flat form: equality there is ordered
        prop_assert_eq!(flatten(&rebuilt), records);
    }

    #[test]
    fn flatten_inverts_unflatten(node in node_strategy()) {
        let records = flatten(&node);
        let rebuilt = unflatten(&records).unwrap();
        prop_assert_eq!(rebuilt, node);
    }

    #[test]
    fn path_strings_reparse(node in node_strategy()) {
        for record in flatten(&node) {
            let text = record.path.to_string();
            prop_assert_eq!(PathKey::parse(&text).unwrap(), record.path);
        }
    }
}

proptest! {
    // keys drawn from a hostile alphabet: dots, brackets, quotes, spaces
    #[test]
    fn hostile_keys_roundtrip_through_the_grammar(key in "[-a-z.\\[\\]\"\\\\ ]{0,10}") {
        let node = mapping(vec![(key.as_str(), Node::scalar("v"))]);
        let records = flatten(&node);
        let text = records[0].path.to_string();
        let reparsed = PathKey::parse(&text).unwrap();
        prop_assert_eq!(reparsed, records[0].path.clone());
        prop_assert_eq!(flatten(&unflatten(&records).unwrap()), records);
    }
}
