//! Routing-table behavior: configured kinds, callables, named operations,
//! aliases, virtual keys, and serialization through all of them.

use std::rc::Rc;

use routed_tree::{Entry, Error, Node, Route, Router, Segment, TreeKind, Value, value};
use routed_tree_testhelpers::setup;

/// Named operations backing the `Route::op` registrations below.
struct Ops;

impl TreeKind for Ops {
    fn invoke(&self, op: &str, _node: &Node, _keys: &[Segment]) -> Result<Option<Value>, Error> {
        Ok(match op {
            "compute_tag" => Some(value!("tag result")),
            "compute_deep_tag" => Some(value!("deep tag result")),
            "build_map" => Some(value!({ "a": "A", "b": "B" })),
            "build_list" => Some(value!(["x", "y", "z"])),
            "build_nothing" => None,
            _ => return Err(Error::unknown_operation(op)),
        })
    }
}

struct Kinds {
    detail: Rc<Router>,
    measure: Rc<Router>,
    main: Rc<Router>,
}

fn kinds() -> Kinds {
    setup();
    let measure = Router::builder().label("measure").build();
    let detail = Router::builder()
        .label("detail")
        .route("branch3", Route::kind(&measure))
        .build();
    let main = Router::builder()
        .label("main")
        .kind(Ops)
        .route("branch1/sub2", Route::kind(&detail))
        .route("custom/op_route", Route::op("build_map").wrap(&detail))
        .route(
            "custom/alias_route",
            Route::alias_any(["non/existent", "branch1/sub2"]).wrap(&detail),
        )
        .route_fn("lambda", |_| Ok(Entry::Value(value!("results"))))
        .route_fn("deeper/lambda", |_| Ok(Entry::Value(value!("deeper"))))
        .route("tag", Route::op("compute_tag"))
        .route("deeper/tag", Route::op("compute_deep_tag"))
        .route("map/tag", Route::op("build_map"))
        .route("list/tag", Route::op("build_list"))
        .route("branch1/virtual", Route::alias("branch1/sub2"))
        .route(
            "branch1/virtual2",
            Route::alias_any(["branch1/sub2", "branch1/list_two/0"]),
        )
        .route(
            "branch1/virtual3",
            Route::alias_any(["branch1/nonexistent", "branch1/sub2/branch3"]),
        )
        .route(
            "branch1/virtual4",
            Route::alias_any(["branch1/non/existent", "branch1/sub2/branch3"]),
        )
        .route("ghost", Route::alias_any(["nope/a", "also/missing"]))
        .build();
    Kinds {
        detail,
        measure,
        main,
    }
}

fn routed_root(kinds: &Kinds) -> Node {
    kinds.main.root(value!({
        "map_one": { "a": "A", "b": "B" },
        "list_one": ["a", "b", "c"],
        "branch1": {
            "sub2": { "c": "C", "d": "D", "branch3": [1, 2, 3] },
            "list_two": ["d", "e", "f"],
        },
        "deeper_list": [
            { "c": "C", "d": "D" },
            ["d", "e", "f"],
        ],
    }))
}

fn node_at(root: &Node, path: &str) -> Node {
    root.get_path(path)
        .unwrap()
        .into_node()
        .unwrap_or_else(|| panic!("expected a node at {path}"))
}

fn sorted_keys(node: &Node) -> Vec<String> {
    let mut keys: Vec<String> = node.keys().unwrap().iter().map(|k| k.to_string()).collect();
    keys.sort();
    keys
}

#[test]
fn knows_its_keys_including_virtual_ones() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let mut expected: Vec<String> = [
        "map_one",
        "list_one",
        "branch1",
        "deeper_list",
        "lambda",
        "deeper",
        "tag",
        "map",
        "list",
        "custom",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    expected.sort();
    assert_eq!(sorted_keys(&root), expected);
}

#[test]
fn unresolvable_aliases_stay_out_of_keys() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert!(root.get("ghost").unwrap().is_absent());
    assert!(!root.contains_key("ghost").unwrap());
}

#[test]
fn virtual_branches_expose_only_real_keys() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    // `deeper` exists purely in the routing table; its keys are its
    // configured children, nothing else.
    assert_eq!(sorted_keys(&node_at(&root, "deeper")), ["lambda", "tag"]);
    // an aliased branch enumerates the destination's content keys
    assert_eq!(
        sorted_keys(&node_at(&root, "branch1/virtual")),
        ["branch3", "c", "d"]
    );
}

#[test]
fn wraps_members_in_configured_kind() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let sub2 = node_at(&root, "branch1/sub2");
    assert!(Rc::ptr_eq(sub2.router(), &kinds.detail));
    assert_eq!(sub2.get("c").unwrap(), Entry::Value(value!("C")));
}

#[test]
fn wraps_sub_members_in_configured_kind() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let branch3 = node_at(&root, "branch1/sub2").get("branch3").unwrap();
    let branch3 = branch3.into_node().unwrap();
    assert!(Rc::ptr_eq(branch3.router(), &kinds.measure));
    assert_eq!(branch3.get(0usize).unwrap(), Entry::Value(value!(1)));
}

#[test]
fn kind_boundaries_reset_route_accumulation() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let sub2 = node_at(&root, "branch1/sub2");
    assert!(sub2.route().is_empty());
    assert!(sub2.full_route().is_empty());
    // within one kind, routes accumulate root to leaf
    let virtual2 = node_at(&root, "branch1/virtual2");
    assert_eq!(virtual2.full_route(), Segment::parse_path("branch1/virtual2"));
}

#[test]
fn iterates_lists_in_configured_kinds() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let branch3 = node_at(&root, "branch1/sub2")
        .get("branch3")
        .unwrap()
        .into_node()
        .unwrap();
    let rendered: Vec<String> = branch3
        .iter()
        .unwrap()
        .map(|item| format!("{:?}", item.unwrap().1.value().unwrap()))
        .collect();
    assert_eq!(rendered, ["1", "2", "3"]);
}

#[test]
fn calls_configured_callable_for_its_key() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert_eq!(root.get("lambda").unwrap(), Entry::Value(value!("results")));
}

#[test]
fn calls_configured_callable_for_nested_key() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let deeper = node_at(&root, "deeper");
    assert_eq!(deeper.get("lambda").unwrap(), Entry::Value(value!("deeper")));
}

#[test]
fn dispatches_named_operations() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert_eq!(root.get("tag").unwrap(), Entry::Value(value!("tag result")));
    let deeper = node_at(&root, "deeper");
    assert_eq!(
        deeper.get("tag").unwrap(),
        Entry::Value(value!("deep tag result"))
    );
}

#[test]
fn wraps_structured_operation_results() {
    let kinds = kinds();
    let root = routed_root(&kinds);

    let map_tag = node_at(&root, "map/tag");
    assert!(map_tag.same_kind(&root));
    assert_eq!(map_tag.get("a").unwrap(), Entry::Value(value!("A")));

    let list_tag = node_at(&root, "list/tag");
    assert_eq!(list_tag.get(1usize).unwrap(), Entry::Value(value!("y")));
}

#[test]
fn wraps_operation_results_in_configured_kind() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let op_route = node_at(&root, "custom/op_route");
    assert!(Rc::ptr_eq(op_route.router(), &kinds.detail));
    assert_eq!(op_route.get("a").unwrap(), Entry::Value(value!("A")));
    // crossing into another kind resets the accumulated route
    assert!(op_route.full_route().is_empty());
}

#[test]
fn returns_aliased_content() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert_eq!(
        node_at(&root, "branch1/virtual").get("c").unwrap(),
        Entry::Value(value!("C"))
    );
}

#[test]
fn alias_takes_first_resolving_candidate() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert_eq!(
        node_at(&root, "branch1/virtual2").get("c").unwrap(),
        Entry::Value(value!("C"))
    );
}

#[test]
fn alias_falls_back_after_missing_candidate() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert_eq!(
        node_at(&root, "branch1/virtual3").get(0usize).unwrap(),
        Entry::Value(value!(1))
    );
}

#[test]
fn alias_falls_back_after_deep_non_match() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert_eq!(
        node_at(&root, "branch1/virtual4").get(0usize).unwrap(),
        Entry::Value(value!(1))
    );
}

#[test]
fn alias_nodes_report_the_requester_route() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let branch1 = node_at(&root, "branch1");
    let virtual_node = branch1.get("virtual").unwrap().into_node().unwrap();
    // the node carries its own route, not the destination's
    assert_eq!(virtual_node.route(), Segment::parse_path("virtual"));
    assert_eq!(
        virtual_node.full_route(),
        Segment::parse_path("branch1/virtual")
    );
    assert!(virtual_node.parent().unwrap().ptr_eq(&branch1));
    // but mirrors the destination's content
    assert_eq!(
        virtual_node.contents(),
        Some(&value!({ "c": "C", "d": "D", "branch3": [1, 2, 3] }))
    );
}

#[test]
fn wraps_aliased_content_in_configured_kind() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let alias_route = node_at(&root, "custom/alias_route");
    assert!(Rc::ptr_eq(alias_route.router(), &kinds.detail));
    assert_eq!(alias_route.get("c").unwrap(), Entry::Value(value!("C")));
}

#[test]
fn scalar_alias_destinations_return_raw_values() {
    setup();
    let router = Router::builder()
        .route("nickname", Route::alias_any(["missing", "profile/name"]))
        .build();
    let root = router.root(value!({ "profile": { "name": "ada" } }));
    assert_eq!(root.get("nickname").unwrap(), Entry::Value(value!("ada")));
}

#[test]
fn alias_treats_stored_false_as_a_hit() {
    setup();
    let router = Router::builder()
        .route("flag", Route::alias_any(["settings/missing", "settings/enabled"]))
        .build();
    let root = router.root(value!({ "settings": { "enabled": false } }));
    assert_eq!(root.get("flag").unwrap(), Entry::Value(value!(false)));
}

#[test]
fn alias_skips_explicit_null_destinations() {
    setup();
    let router = Router::builder()
        .route("pick", Route::alias_any(["slots/empty", "slots/real"]))
        .build();
    let root = router.root(value!({ "slots": { "empty": null, "real": 7 } }));
    assert_eq!(root.get("pick").unwrap(), Entry::Value(value!(7)));
}

#[test]
fn operations_producing_nothing_resolve_absent() {
    setup();
    let router = Router::builder()
        .kind(Ops)
        .route("void", Route::op("build_nothing"))
        .build();
    let root = router.root(value!({}));
    assert!(root.get("void").unwrap().is_absent());
}

#[test]
fn wrapper_override_beats_the_target_kind() {
    setup();
    let a = Router::builder().label("a").build();
    let b = Router::builder().label("b").build();
    let router = Router::builder()
        .route("x", Route::kind(&a).wrap(&b))
        .build();
    let root = router.root(value!({ "x": { "y": 1 } }));
    let x = root.get("x").unwrap().into_node().unwrap();
    assert!(Rc::ptr_eq(x.router(), &b));
}

#[test]
fn bare_branches_materialize_default_kind_nodes() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let custom = node_at(&root, "custom");
    assert!(custom.same_kind(&root));
    assert!(custom.contents().is_none());
    assert!(custom.is_map_like().unwrap());
}

#[test]
fn routed_factories_are_memoized_too() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    let a = node_at(&root, "map/tag");
    let b = node_at(&root, "map/tag");
    assert!(a.ptr_eq(&b));
}

#[test]
fn factory_lookup_is_exposed() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    // a routed path resolves to a factory, an unrouted one does not
    assert!(kinds
        .main
        .factory_for(&Segment::parse_path("branch1/virtual"))
        .is_some());
    assert!(kinds.main.factory_for(&Segment::parse_path("map_one")).is_none());

    let factory = kinds
        .main
        .factory_for(&Segment::parse_path("lambda"))
        .unwrap();
    let keys = [Segment::from("lambda")];
    let entry = factory(&routed_tree::Access {
        keys: &keys,
        parent: &root,
    })
    .unwrap();
    assert_eq!(entry, Entry::Value(value!("results")));
}

fn expected_serialized_root() -> Value {
    value!({
        "branch1": {
            "sub2": { "c": "C", "d": "D", "branch3": [1, 2, 3] },
            "list_two": ["d", "e", "f"],
            "virtual": { "c": "C", "d": "D", "branch3": [1, 2, 3] },
            "virtual2": { "c": "C", "d": "D", "branch3": [1, 2, 3] },
            "virtual3": [1, 2, 3],
            "virtual4": [1, 2, 3],
        },
        "custom": {
            "op_route": { "a": "A", "b": "B" },
            "alias_route": { "c": "C", "d": "D", "branch3": [1, 2, 3] },
        },
        "lambda": "results",
        "deeper": { "lambda": "deeper", "tag": "deep tag result" },
        "tag": "tag result",
        "map": { "tag": { "a": "A", "b": "B" } },
        "list": { "tag": ["x", "y", "z"] },
        "map_one": { "a": "A", "b": "B" },
        "list_one": ["a", "b", "c"],
        "deeper_list": [
            { "c": "C", "d": "D" },
            ["d", "e", "f"],
        ],
    })
}

#[test]
fn serializes_through_the_routing_table() {
    let kinds = kinds();
    let root = routed_root(&kinds);
    assert_eq!(root.serialize().unwrap(), expected_serialized_root());
}
