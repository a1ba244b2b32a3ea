#![allow(clippy::unwrap_used)]

use ts_cbor::{ErrorCode, Format, HeapAlloc, Limits, PoolAlloc, Tree, Value, ROOT_NAME};

#[test]
fn create_and_destroy_balance() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    assert_eq!(tree.live_nodes(), 1);
    assert_eq!(tree.node(msg).unwrap().name(), ROOT_NAME);
    assert_eq!(tree.node(msg).unwrap().refs(), 1);

    tree.destroy(msg).unwrap();
    assert_eq!(tree.live_nodes(), 0);
}

#[test]
fn destroy_releases_the_whole_subtree() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    tree.set_int(msg, "a", 1).unwrap();
    let sub = tree.set_message(msg, "sub").unwrap();
    let arr = tree.set_array(sub, "arr").unwrap();
    tree.push(arr, Value::String("x")).unwrap();
    tree.push(arr, Value::Null).unwrap();
    assert_eq!(tree.live_nodes(), 6);

    tree.destroy(msg).unwrap();
    assert_eq!(tree.live_nodes(), 0);
}

#[test]
fn replacing_a_field_releases_the_old_subtree() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    let sub = tree.set_message(msg, "m").unwrap();
    tree.set_int(sub, "x", 1).unwrap();
    tree.set_int(sub, "y", 2).unwrap();
    assert_eq!(tree.live_nodes(), 4);

    tree.set_int(msg, "m", 5).unwrap();
    assert_eq!(tree.live_nodes(), 2);
    assert_eq!(
        tree.node(sub).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
}

#[test]
fn retain_defers_release() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    tree.retain(msg).unwrap();
    assert_eq!(tree.node(msg).unwrap().refs(), 2);

    tree.destroy(msg).unwrap();
    assert_eq!(tree.node(msg).unwrap().refs(), 1);
    assert_eq!(tree.live_nodes(), 1);

    tree.destroy(msg).unwrap();
    assert_eq!(tree.live_nodes(), 0);
}

#[test]
fn retained_child_outlives_its_parent() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    let child = tree.set_message(msg, "keep").unwrap();
    tree.set_str(child, "k", "v").unwrap();
    tree.retain(child).unwrap();

    tree.destroy(msg).unwrap();
    assert_eq!(tree.live_nodes(), 2);
    assert_eq!(tree.get_str(child, "k").unwrap(), "v");

    tree.destroy(child).unwrap();
    assert_eq!(tree.live_nodes(), 0);
}

#[test]
fn stale_handles_are_detected_after_slot_reuse() {
    let mut tree = Tree::new();
    let old = tree.create().unwrap();
    tree.destroy(old).unwrap();

    let new = tree.create().unwrap();
    assert_ne!(old, new);
    assert_eq!(
        tree.destroy(old).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(
        tree.set_int(old, "a", 1).unwrap_err().code,
        ErrorCode::PreconditionFailed
    );
    assert_eq!(tree.live_nodes(), 1);
    assert!(tree.node(new).is_ok());
}

#[test]
fn create_copy_is_independent() {
    let mut tree = Tree::new();
    let msg = tree.create().unwrap();
    tree.set_str(msg, "s", "one").unwrap();
    let copy = tree.create_copy(msg).unwrap();
    assert_eq!(tree.node(copy).unwrap().name(), ROOT_NAME);
    assert_eq!(tree.live_nodes(), 4);

    tree.set_str(msg, "s", "two").unwrap();
    assert_eq!(tree.get_str(copy, "s").unwrap(), "one");

    tree.destroy(msg).unwrap();
    tree.destroy(copy).unwrap();
    assert_eq!(tree.live_nodes(), 0);
}

#[test]
fn pool_exhaustion_is_out_of_memory() {
    let mut tree = Tree::<PoolAlloc>::with_pool(3, Limits::default()).unwrap();
    let msg = tree.create().unwrap();
    tree.set_int(msg, "a", 1).unwrap();
    tree.set_int(msg, "b", 2).unwrap();

    let err = tree.set_int(msg, "c", 3).unwrap_err();
    assert_eq!(err.code, ErrorCode::OutOfMemory);
    assert_eq!(tree.size(msg).unwrap(), 2);

    // Replacing still needs a fresh node before the old one goes.
    assert_eq!(
        tree.set_int(msg, "a", 10).unwrap_err().code,
        ErrorCode::OutOfMemory
    );
    assert_eq!(tree.get_int(msg, "a").unwrap(), 1);

    tree.destroy(msg).unwrap();
    assert_eq!(tree.live_nodes(), 0);
    let again = tree.create().unwrap();
    tree.set_int(again, "x", 1).unwrap();
    tree.set_int(again, "y", 2).unwrap();
    assert_eq!(tree.live_nodes(), 3);
}

#[test]
fn failed_copy_leaves_nothing_behind() {
    let mut tree = Tree::<PoolAlloc>::with_pool(4, Limits::default()).unwrap();
    let msg = tree.create().unwrap();
    tree.set_int(msg, "a", 1).unwrap();
    tree.set_int(msg, "b", 2).unwrap();

    let err = tree.create_copy(msg).unwrap_err();
    assert_eq!(err.code, ErrorCode::OutOfMemory);
    assert_eq!(tree.live_nodes(), 3);
}

#[test]
fn zero_sized_pool_is_rejected() {
    let err = Tree::<PoolAlloc>::with_pool(0, Limits::default()).unwrap_err();
    assert_eq!(err.code, ErrorCode::PreconditionFailed);
}

#[test]
fn pooled_tree_roundtrips_every_codec() {
    let mut tree = Tree::<PoolAlloc>::with_pool(32, Limits::default()).unwrap();
    let root = tree
        .decode(br#"{"a":1,"b":[1,2,3],"c":{"d":true}}"#, Format::Json)
        .unwrap();
    assert_eq!(tree.live_nodes(), 8);

    for format in [Format::Json, Format::Cbor, Format::TsCbor] {
        let bytes = tree.encode_to_vec(root, format).unwrap();
        let back = tree.decode(&bytes, format).unwrap();
        assert_eq!(tree.encode_to_vec(back, format).unwrap(), bytes);
        tree.destroy(back).unwrap();
        assert_eq!(tree.live_nodes(), 8);
    }
    tree.destroy(root).unwrap();
    assert_eq!(tree.live_nodes(), 0);
}

#[test]
fn pool_exhaustion_mid_decode_releases_the_partial_tree() {
    let json = br#"{"a":1,"b":[1,2,3],"c":2}"#;
    // Same document: {"a": 1, "b": [1, 2, 3], "c": 2}
    let cbor = [
        0xa3, 0x61, b'a', 0x01, 0x61, b'b', 0x83, 0x01, 0x02, 0x03, 0x61, b'c', 0x02,
    ];
    let cases: [(&[u8], Format); 3] = [
        (json, Format::Json),
        (&cbor, Format::Cbor),
        (&cbor, Format::TsCbor),
    ];
    for (bytes, format) in cases {
        let mut tree = Tree::<PoolAlloc>::with_pool(4, Limits::default()).unwrap();
        let err = tree.decode(bytes, format).unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfMemory, "{format}");
        assert_eq!(tree.live_nodes(), 0, "{format}");

        // The pool is whole again afterwards.
        let msg = tree.create().unwrap();
        for name in ["x", "y", "z"] {
            tree.set_int(msg, name, 0).unwrap();
        }
        tree.destroy(msg).unwrap();
    }
}

#[test]
fn tree_over_a_supplied_allocator() {
    let limits = Limits::default().with_max_branches(4).unwrap();
    let mut heap = Tree::from_store(HeapAlloc::new(), limits);
    assert_eq!(heap.limits().max_branches, 4);
    let msg = heap.create().unwrap();
    for name in ["a", "b", "c", "d"] {
        heap.set_int(msg, name, 1).unwrap();
    }
    assert_eq!(
        heap.set_int(msg, "e", 1).unwrap_err().code,
        ErrorCode::PayloadTooLarge
    );

    let mut pooled = Tree::from_store(PoolAlloc::with_capacity(2).unwrap(), Limits::default());
    let root = pooled.create().unwrap();
    pooled.set_bool(root, "on", true).unwrap();
    assert_eq!(
        pooled.set_bool(root, "off", false).unwrap_err().code,
        ErrorCode::OutOfMemory
    );
    assert_eq!(pooled.encode_to_vec(root, Format::Json).unwrap(), br#"{"on":true}"#);
}
