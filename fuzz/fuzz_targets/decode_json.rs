#![no_main]

use libfuzzer_sys::fuzz_target;

use ts_cbor::{Format, Limits, PoolAlloc, Tree};

fuzz_target!(|data: &[u8]| {
    // A small pool keeps pathological inputs from growing the arena.
    let mut tree = Tree::<PoolAlloc>::with_pool(256, Limits::default()).expect("pool");
    if let Ok(root) = tree.decode(data, Format::Json) {
        // Anything accepted must re-encode, and the re-encoding must be a fixed point.
        let once = tree.encode_to_vec(root, Format::Json).expect("re-encode");
        let mut other = Tree::new();
        let again = other.decode(&once, Format::Json).expect("re-decode");
        let twice = other.encode_to_vec(again, Format::Json).expect("re-encode");
        assert_eq!(once, twice);
        tree.destroy(root).expect("destroy");
    }
    // Failed decodes leave nothing behind.
    assert_eq!(tree.live_nodes(), 0);
});
