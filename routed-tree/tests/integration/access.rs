//! Raw access, wrapping, memoization, and route tracking — no routing
//! table involved.

use routed_tree::{Entry, Node, Router, Segment, value};
use routed_tree_testhelpers::setup;

fn sample_root() -> Node {
    setup();
    Router::builder().label("sample").build().root(value!({
        "one": 1,
        "two": 2,
        "three": 3,
        "map_one": { "a": "A", "b": "B" },
        "list_one": ["a", "b", "c"],
        "deeper_map": {
            "map_two": { "c": "C", "d": "D" },
            "list_two": ["d", "e", "f"],
        },
        "deeper_list": [
            { "c": "C", "d": "D" },
            ["d", "e", "f"],
        ],
    }))
}

#[test]
fn provides_access_to_map_contents() {
    let root = sample_root();
    assert_eq!(root.get("one").unwrap(), Entry::Value(value!(1)));
    assert_eq!(root.get("two").unwrap(), Entry::Value(value!(2)));
    assert_eq!(root.get("three").unwrap(), Entry::Value(value!(3)));
}

#[test]
fn wraps_member_maps_in_same_kind_nodes() {
    let root = sample_root();
    let map_one = root.get("map_one").unwrap().into_node().unwrap();
    assert!(map_one.same_kind(&root));
    let first = root
        .get("deeper_list")
        .unwrap()
        .into_node()
        .unwrap()
        .get(0usize)
        .unwrap()
        .into_node()
        .unwrap();
    assert!(first.same_kind(&root));
}

#[test]
fn wraps_member_lists_in_same_kind_nodes() {
    let root = sample_root();
    let list_one = root.get("list_one").unwrap().into_node().unwrap();
    assert!(list_one.same_kind(&root));
    assert!(list_one.is_sequence_like());
}

#[test]
fn provides_access_to_list_elements() {
    let root = sample_root();
    let list_one = root.get("list_one").unwrap().into_node().unwrap();
    assert_eq!(list_one.get(0usize).unwrap(), Entry::Value(value!("a")));
}

#[test]
fn knows_what_route_it_came_from() {
    let root = sample_root();
    assert!(root.full_route().is_empty());

    let map_two = root
        .get("deeper_map")
        .unwrap()
        .into_node()
        .unwrap()
        .get("map_two")
        .unwrap()
        .into_node()
        .unwrap();
    assert_eq!(map_two.full_route(), Segment::parse_path("deeper_map/map_two"));
    assert_eq!(map_two.route(), Segment::parse_path("map_two"));

    let second = root
        .get("deeper_list")
        .unwrap()
        .into_node()
        .unwrap()
        .get(1usize)
        .unwrap()
        .into_node()
        .unwrap();
    assert_eq!(second.full_route(), Segment::parse_path("deeper_list/1"));
}

#[test]
fn allows_multi_key_tuples() {
    let root = sample_root();
    let tuple = root
        .get_at(&Segment::parse_path("deeper_map/list_two/0"))
        .unwrap();
    let chained = root
        .get("deeper_map")
        .unwrap()
        .into_node()
        .unwrap()
        .get("list_two")
        .unwrap()
        .into_node()
        .unwrap()
        .get(0usize)
        .unwrap();
    assert_eq!(tuple, Entry::Value(value!("d")));
    assert_eq!(tuple, chained);

    // get_path is the same tuple access
    assert_eq!(root.get_path("deeper_map/list_two/0").unwrap(), tuple);
}

#[test]
fn memoizes_everything() {
    let root = sample_root();
    let a = root.get("map_one").unwrap().into_node().unwrap();
    let b = root.get("map_one").unwrap().into_node().unwrap();
    assert!(a.ptr_eq(&b));

    let deeper = root.get("deeper_map").unwrap().into_node().unwrap();
    let x = deeper.get("list_two").unwrap().into_node().unwrap();
    let y = deeper.get("list_two").unwrap().into_node().unwrap();
    assert!(x.ptr_eq(&y));
}

#[test]
fn memoizes_absent_and_null_results() {
    let root = Router::builder().build().root(value!({ "gone": null }));
    assert!(root.get("missing").unwrap().is_absent());
    assert!(root.get("missing").unwrap().is_absent());
    assert_eq!(root.get("gone").unwrap(), Entry::Value(value!(null)));
    assert_eq!(root.get("gone").unwrap(), Entry::Value(value!(null)));
}

#[test]
fn knows_its_parent() {
    let root = sample_root();
    let map_one = root.get("map_one").unwrap().into_node().unwrap();
    assert!(map_one.parent().unwrap().ptr_eq(&root));

    let deeper = root.get("deeper_map").unwrap().into_node().unwrap();
    let list_two = deeper.get("list_two").unwrap().into_node().unwrap();
    assert!(list_two.parent().unwrap().ptr_eq(&deeper));
}

#[test]
fn iterates_lists() {
    let root = sample_root();
    let list_one = root.get("list_one").unwrap().into_node().unwrap();
    let items: Vec<String> = list_one
        .iter()
        .unwrap()
        .map(|item| {
            let (_, entry) = item.unwrap();
            entry.value().unwrap().as_str().unwrap().to_owned()
        })
        .collect();
    assert_eq!(items, ["a", "b", "c"]);
}

#[test]
fn iterates_maps_as_key_value_pairs() {
    let root = sample_root();
    let map_one = root.get("map_one").unwrap().into_node().unwrap();
    let pairs: Vec<String> = map_one
        .iter()
        .unwrap()
        .map(|item| {
            let (key, entry) = item.unwrap();
            format!("{key}:{}", entry.value().unwrap().as_str().unwrap())
        })
        .collect();
    assert_eq!(pairs, ["a:A", "b:B"]);
}

#[test]
fn wraps_members_while_iterating() {
    let root = sample_root();
    let deeper = root.get("deeper_map").unwrap().into_node().unwrap();
    for item in deeper.iter().unwrap() {
        let (_, entry) = item.unwrap();
        assert!(entry.node().unwrap().same_kind(&root));
    }

    let deeper_list = root.get("deeper_list").unwrap().into_node().unwrap();
    let wrapped: Vec<bool> = deeper_list
        .iter()
        .unwrap()
        .map(|item| item.unwrap().1.node().is_some())
        .collect();
    assert_eq!(wrapped, [true, true]);
}

#[test]
fn iteration_results_are_memoized_handles() {
    let root = sample_root();
    let deeper = root.get("deeper_map").unwrap().into_node().unwrap();
    let from_iter = deeper
        .iter()
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .1
        .into_node()
        .unwrap();
    let direct = deeper.get("map_two").unwrap().into_node().unwrap();
    assert!(from_iter.ptr_eq(&direct));
}

#[test]
fn keys_and_membership() {
    let root = sample_root();
    let keys: Vec<String> = root.keys().unwrap().iter().map(|k| k.to_string()).collect();
    assert_eq!(
        keys,
        ["one", "two", "three", "map_one", "list_one", "deeper_map", "deeper_list"]
    );
    assert!(root.contains_key("map_one").unwrap());
    assert!(!root.contains_key("absent").unwrap());
}

#[test]
fn len_and_emptiness_reflect_raw_content() {
    let root = sample_root();
    assert_eq!(root.len(), Some(7));
    assert_eq!(root.is_empty(), Some(false));
    let list_one = root.get("list_one").unwrap().into_node().unwrap();
    assert_eq!(list_one.len(), Some(3));
}

#[test]
fn serializes_to_plain_data() {
    let root = Router::builder()
        .build()
        .root(value!({ "a": [1, 2, 3], "b": { "c": 4 } }));
    let plain = root.serialize().unwrap();
    assert_eq!(plain, value!({ "a": [1, 2, 3], "b": { "c": 4 } }));
}

#[test]
fn serializes_nested_wrappers_away() {
    let root = sample_root();
    let plain = root.serialize().unwrap();
    assert_eq!(
        plain.get("deeper_list").unwrap(),
        &value!([{ "c": "C", "d": "D" }, ["d", "e", "f"]])
    );
}
