#![allow(clippy::unwrap_used, clippy::float_cmp)]

use ts_cbor::{ErrorCode, Limits, NodeType, Tree, Value, DEFAULT_MAX_BRANCHES};

#[test]
fn scalar_fields_roundtrip_through_accessors() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    tree.set_int(msg, "i", -7).unwrap();
    tree.set_float(msg, "f", 2.5).unwrap();
    tree.set_bool(msg, "b", true).unwrap();
    tree.set_str(msg, "s", "hello").unwrap();
    tree.set_cert(msg, "c", "-----BEGIN CERTIFICATE-----").unwrap();
    tree.set_null(msg, "n").unwrap();

    assert_eq!(tree.get_int(msg, "i").unwrap(), -7);
    assert_eq!(tree.get_float(msg, "f").unwrap(), 2.5);
    assert!(tree.get_bool(msg, "b").unwrap());
    assert_eq!(tree.get_str(msg, "s").unwrap(), "hello");
    assert_eq!(
        tree.get_cert(msg, "c").unwrap(),
        "-----BEGIN CERTIFICATE-----"
    );
    let n = tree.get(msg, "n").unwrap();
    assert_eq!(tree.node_type(n).unwrap(), NodeType::Null);
    assert_eq!(tree.size(msg).unwrap(), 6);
}

#[test]
fn numeric_reads_promote_between_int_and_float() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    tree.set_float(msg, "pos", 3.9).unwrap();
    tree.set_float(msg, "neg", -3.9).unwrap();
    tree.set_int(msg, "int", 7).unwrap();

    assert_eq!(tree.get_int(msg, "pos").unwrap(), 3);
    assert_eq!(tree.get_int(msg, "neg").unwrap(), -3);
    assert_eq!(tree.get_float(msg, "int").unwrap(), 7.0);
}

#[test]
fn type_mismatch_is_precondition_failed() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    tree.set_int(msg, "i", 1).unwrap();
    tree.set_str(msg, "s", "x").unwrap();

    assert_eq!(
        tree.get_str(msg, "i").unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(
        tree.get_bool(msg, "s").unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(
        tree.get_int(msg, "s").unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    // A plain string is not a certificate and vice versa.
    assert_eq!(
        tree.get_cert(msg, "s").unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(
        tree.get_message(msg, "i").unwrap_err().code,
        ErrorCode::PreconditionFailed
    );

    let leaf = tree.get(msg, "i").unwrap();
    assert_eq!(
        tree.set_int(leaf, "x", 1).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(
        tree.push(msg, Value::Null).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
}

#[test]
fn missing_field_is_not_found() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    assert!(!tree.has(msg, "absent").unwrap());
    let err = tree.get_int(msg, "absent").unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert!(err.is_not_found());
}

#[test]
fn set_replaces_in_place_and_keeps_slot_order() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    tree.set_int(msg, "a", 1).unwrap();
    tree.set_int(msg, "b", 2).unwrap();
    tree.set_int(msg, "c", 3).unwrap();

    tree.set_str(msg, "b", "two").unwrap();

    let names: Vec<&str> = tree.fields(msg).unwrap().map(|(name, _)| name).collect();
    assert_eq!(names, ["a", "b", "c"]);
    assert_eq!(tree.get_str(msg, "b").unwrap(), "two");
    assert_eq!(tree.size(msg).unwrap(), 3);
    assert_eq!(tree.live_nodes(), 4);
}

#[test]
fn full_message_rejects_new_names_but_accepts_replacement() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    for i in 0..DEFAULT_MAX_BRANCHES {
        tree.set_int(msg, &format!("f{i}"), 0).unwrap();
    }
    let err = tree.set_int(msg, "overflow", 1).unwrap_err();
    assert_eq!(err.code, ErrorCode::PayloadTooLarge);
    assert!(!tree.has(msg, "overflow").unwrap());

    tree.set_int(msg, "f3", 33).unwrap();
    assert_eq!(tree.get_int(msg, "f3").unwrap(), 33);
    assert_eq!(tree.size(msg).unwrap(), DEFAULT_MAX_BRANCHES);
}

#[test]
fn name_and_string_limits_are_enforced() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();

    tree.set_int(msg, &"n".repeat(24), 1).unwrap();
    assert_eq!(
        tree.set_int(msg, &"n".repeat(25), 1).unwrap_err().code,
        ErrorCode::PayloadTooLarge
    );

    tree.set_str(msg, "s", &"x".repeat(512)).unwrap();
    assert_eq!(
        tree.set_str(msg, "s", &"x".repeat(513)).unwrap_err().code,
        ErrorCode::PayloadTooLarge
    );
    // The failed write left the previous value in place.
    assert_eq!(tree.get_str(msg, "s").unwrap().len(), 512);

    tree.set_cert(msg, "c", &"x".repeat(4096)).unwrap();
    assert_eq!(
        tree.set_cert(msg, "c", &"x".repeat(4097)).unwrap_err().code,
        ErrorCode::PayloadTooLarge
    );
}

#[test]
fn custom_limits_shrink_containers() {
    let limits = Limits::default().with_max_branches(2).unwrap();
    let mut tree = Tree::with_limits(limits);
    let arr = tree.create_root(Value::Array).unwrap();
    tree.push(arr, Value::Integer(1)).unwrap();
    tree.push(arr, Value::Integer(2)).unwrap();
    assert_eq!(
        tree.push(arr, Value::Integer(3)).unwrap_err().code,
        ErrorCode::PayloadTooLarge
    );
}

#[test]
fn invalid_limits_are_rejected() {
    assert_eq!(
        Limits::new(0, 16, 512, 4096, 8).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(
        Limits::new(24, 16, 512, 100, 8).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(
        Limits::default().with_max_depth(0).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(Limits::new(24, 16, 512, 4096, 8).unwrap(), Limits::default());
}

#[test]
fn array_writes_never_open_gaps() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    let arr = tree.set_array(msg, "values").unwrap();

    tree.set_at(arr, 0, Value::Integer(10)).unwrap();
    tree.set_at(arr, 1, Value::Float(1.5)).unwrap();
    assert_eq!(
        tree.set_at(arr, 3, Value::Integer(30)).unwrap_err().code,
        ErrorCode::IndexOutOfRange
    );
    assert_eq!(tree.size(arr).unwrap(), 2);

    tree.set_at(arr, 0, Value::String("ten")).unwrap();
    assert_eq!(tree.get_str_at(arr, 0).unwrap(), "ten");
    assert_eq!(tree.get_float_at(arr, 1).unwrap(), 1.5);
    assert_eq!(tree.get_int_at(arr, 1).unwrap(), 1);
    assert_eq!(tree.size(arr).unwrap(), 2);

    assert_eq!(
        tree.get_at(arr, 2).unwrap_err().code,
        ErrorCode::NotFound
    );
    let elem = tree.get_at(arr, 0).unwrap();
    assert_eq!(tree.node(elem).unwrap().name(), "");
}

#[test]
fn only_the_last_element_can_be_removed() {
    let mut tree = Tree::new();
    let arr = tree.create_root(Value::Array).unwrap();
    for v in [true, false, true] {
        tree.push(arr, v.into()).unwrap();
    }

    assert_eq!(
        tree.remove_at(arr, 0).unwrap_err().code,
        ErrorCode::BadRequest
    );
    assert_eq!(
        tree.remove_at(arr, 3).unwrap_err().code,
        ErrorCode::NotFound
    );

    tree.remove_at(arr, 2).unwrap();
    assert_eq!(tree.size(arr).unwrap(), 2);
    assert!(!tree.get_bool_at(arr, 1).unwrap());
    assert_eq!(tree.live_nodes(), 3);
}

#[test]
fn nested_containers_are_populated_in_place() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    let fields = tree.set_message(msg, "fields").unwrap();
    tree.set_float(fields, "temperature", 30.2).unwrap();
    let list = tree.set_array(fields, "list").unwrap();
    let inner = tree.push(list, Value::Message).unwrap();
    tree.set_str(inner, "k", "v").unwrap();

    let fields = tree.get_message(msg, "fields").unwrap();
    assert_eq!(tree.get_float(fields, "temperature").unwrap(), 30.2);
    let list = tree.get_array(fields, "list").unwrap();
    let inner = tree.get_at(list, 0).unwrap();
    assert_eq!(tree.get_str(inner, "k").unwrap(), "v");

    let elems: Vec<_> = tree.elements(list).unwrap().collect();
    assert_eq!(elems, [inner]);
}

#[test]
fn storing_a_node_deep_copies_it() {
    let mut tree = Tree::new();
    let src = tree.create().unwrap();
    tree.set_int(src, "a", 1).unwrap();
    let sub = tree.set_message(src, "sub").unwrap();
    tree.set_str(sub, "k", "v").unwrap();
    assert_eq!(tree.live_nodes(), 4);

    let dst = tree.create().unwrap();
    let copy = tree.set_node(dst, "copy", src).unwrap();
    assert_eq!(tree.live_nodes(), 9);
    assert_eq!(tree.node(copy).unwrap().name(), "copy");

    // Mutating the original does not reach the copy.
    tree.set_int(src, "a", 2).unwrap();
    tree.set_str(sub, "k", "changed").unwrap();
    assert_eq!(tree.get_int(copy, "a").unwrap(), 1);
    let copied_sub = tree.get_message(copy, "sub").unwrap();
    assert_ne!(copied_sub, sub);
    assert_eq!(tree.get_str(copied_sub, "k").unwrap(), "v");

    // The caller still owns the original.
    tree.destroy(src).unwrap();
    assert_eq!(tree.get_str(copied_sub, "k").unwrap(), "v");
    tree.destroy(dst).unwrap();
    assert_eq!(tree.live_nodes(), 0);
}

#[test]
fn copying_into_an_array_names_the_element_empty() {
    let mut tree = Tree::new();
    let src = tree.create().unwrap();
    tree.set_int(src, "a", 1).unwrap();
    let arr = tree.create_root(Value::Array).unwrap();
    let elem = tree.push(arr, Value::Node(src)).unwrap();
    assert_eq!(tree.node(elem).unwrap().name(), "");
    assert_eq!(tree.get_int(elem, "a").unwrap(), 1);
}
