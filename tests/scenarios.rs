//! Integration tests pinning the literal end-to-end scenarios and the
//! dual-path (typed / type-erased) interoperability demonstration.

use robin_map::{erased, CellInfo, MapInfo, RawMap, RobinMap, SystemAllocator};

// Scenario 1: fresh container, insert keys 0..63, growth at the 48th insert,
// final len/cap, all keys lookup-able.
#[test]
fn scenario_1_sequential_inserts_and_growth_point() {
    let mut map: RobinMap<u64, u64> = RobinMap::new();

    for k in 0u64..47 {
        map.insert(k, k).unwrap();
    }
    assert_eq!(map.cap(), 64, "cap should not have grown yet at 47 entries");

    map.insert(47, 47).unwrap();
    assert_eq!(map.cap(), 128, "the 48th insert crosses floor(64*0.75)=48");

    for k in 48u64..64 {
        map.insert(k, k).unwrap();
    }

    assert_eq!(map.len(), 64);
    assert_eq!(map.cap(), 128);
    for k in 0u64..64 {
        assert_eq!(map.get(&k), Some(&k));
    }
}

// Scenario 2: 1000 keys, erase evens, reinsert evens.
#[test]
fn scenario_2_thousand_keys_erase_evens_reinsert() {
    let mut map: RobinMap<u64, u64> = RobinMap::new();
    for k in 0u64..1000 {
        map.insert(k, k).unwrap();
    }
    assert_eq!(map.len(), 1000);

    for k in (0u64..1000).step_by(2) {
        assert!(map.remove(&k).is_some());
    }
    assert_eq!(map.len(), 500);

    for k in 0u64..1000 {
        if k % 2 == 0 {
            assert!(map.get(&k).is_none());
        } else {
            assert_eq!(map.get(&k), Some(&k));
        }
    }

    for k in (0u64..1000).step_by(2) {
        map.insert(k, k).unwrap();
    }
    assert_eq!(map.len(), 1000);
    for k in 0u64..1000 {
        assert_eq!(map.get(&k), Some(&k));
    }
}

// Scenario 3: string key "abc" with value 7.
#[test]
fn scenario_3_string_key() {
    let mut map: RobinMap<&'static str, u64> = RobinMap::new();
    map.insert("abc", 7).unwrap();
    assert_eq!(map.get(&"abc"), Some(&7));
}

// Scenario 4: reserve(10_000) on a fresh container lands at MIN_LOG2, the
// documented bug-compatible first-allocation exception (spec.md §8 #4, §9).
#[test]
fn scenario_4_reserve_on_fresh_container_hits_min_log2() {
    let mut map: RobinMap<u64, u64> = RobinMap::new();
    map.reserve(10_000).unwrap();
    assert_eq!(map.cap(), 64);

    // Reserving again, now that the container is allocated, uses the
    // requested size as normal.
    map.reserve(10_000).unwrap();
    assert_eq!(map.cap(), 16_384);
}

// Scenario 5: insert K, clear, insert K twice.
#[test]
fn scenario_5_insert_clear_insert_twice() {
    let mut map: RobinMap<u64, u64> = RobinMap::new();
    map.insert(9, 1).unwrap();
    map.clear();
    assert_eq!(map.len(), 0);

    map.insert(9, 100).unwrap();
    map.insert(9, 200).unwrap();
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&9), Some(&200));
}

// Scenario 6: a 65-byte key type gets elements_per_cell == 1, cell size 128.
#[test]
fn scenario_6_oversized_key_cell_layout() {
    #[derive(Clone, Copy)]
    #[allow(dead_code)]
    struct Big65([u8; 65]);

    let info = CellInfo::of::<Big65>();
    assert_eq!(info.elements_per_cell, 1);
    assert_eq!(info.size_of_cell, 128);
}

// Reserving a capacity <= current cap is a no-op.
#[test]
fn reserve_leq_current_cap_is_noop() {
    let mut map: RobinMap<u64, u64> = RobinMap::new();
    map.reserve(10).unwrap(); // lands at MIN_LOG2 == 64
    let cap_before = map.cap();
    map.reserve(10).unwrap();
    assert_eq!(map.cap(), cap_before);
}

// Shrink refuses when the load factor at half capacity would be exceeded.
#[test]
fn shrink_is_noop_below_min_log2() {
    let mut map: RobinMap<u64, u64> = RobinMap::new();
    map.insert(1, 1).unwrap();
    let cap_before = map.cap();
    map.shrink().unwrap();
    // MIN_LOG2 (64 slots) is the smallest representable capacity.
    assert_eq!(map.cap(), cap_before);
}

// Lookup on a never-allocated container is a miss, not a panic.
#[test]
fn lookup_on_empty_container_misses() {
    let map: RobinMap<u64, u64> = RobinMap::new();
    assert_eq!(map.get(&42), None);
    assert!(!map.contains_key(&42));
}

// Dual-path interoperability: construct via the typed API, operate via the
// erased API, and observe the mutation through the typed handle again
// (spec.md §4.7, §9 "Shared layout, dual API").
#[test]
fn dual_path_typed_construct_erased_operate() {
    let mut map: RobinMap<u64, u64> = RobinMap::new();
    map.insert(1, 10).unwrap();
    map.insert(2, 20).unwrap();

    {
        let (raw, info) = map.as_raw();
        let key = 3u64;
        let value = 30u64;
        unsafe {
            erased::insert(
                raw,
                info,
                &key as *const u64 as *const u8,
                &value as *const u64 as *const u8,
            )
            .unwrap();
            assert!(erased::erase(raw, info, &(1u64) as *const u64 as *const u8));
        }
    }

    assert_eq!(map.len(), 2);
    assert_eq!(map.get(&1), None);
    assert_eq!(map.get(&2), Some(&20));
    assert_eq!(map.get(&3), Some(&30));
}

// Dual-path interoperability, the other direction: construct via the
// erased API, wrap in a typed handle, and operate via the typed API.
#[test]
fn dual_path_erased_construct_typed_operate() {
    // Must match RobinMap<u64, u64>'s own internal descriptor exactly, or
    // the stored hash words (computed by whichever hasher allocated the
    // region) won't agree with the hasher the typed wrapper recomputes with
    // on lookup.
    let info: MapInfo = RobinMap::<u64, u64>::descriptor_for();

    let mut raw: RawMap<SystemAllocator> =
        erased::allocate(&info, 6, SystemAllocator).unwrap();

    let key = 5u64;
    let value = 50u64;
    unsafe {
        erased::add(
            &mut raw,
            &info,
            &key as *const u64 as *const u8,
            &value as *const u64 as *const u8,
        )
        .unwrap();
    }

    let mut typed: RobinMap<u64, u64> = unsafe { RobinMap::from_raw_parts(raw) };
    assert_eq!(typed.get(&5), Some(&50));
    typed.insert(6, 60).unwrap();
    assert_eq!(typed.len(), 2);

    let (mut raw_back, info_back) = typed.into_raw_parts();
    assert_eq!(erased::len(&raw_back), 2);
    erased::free(&mut raw_back, &info_back);
}
