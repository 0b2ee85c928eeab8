//! Randomized mixed-operation stress test exercising spec.md §8's universal
//! invariants (load factor bound, insert/lookup/erase agreement with a
//! reference model) across a long sequence of random operations, the way
//! `ChainSafe-forest`'s test suites use `rand` to drive randomized op
//! sequences against a reference model rather than a fixed literal script.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use robin_map::RobinMap;

#[test]
fn random_mixed_ops_agree_with_reference_hashmap() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut map: RobinMap<u64, u64> = RobinMap::new();
    let mut model: HashMap<u64, u64> = HashMap::new();

    for step in 0u64..20_000 {
        let key = rng.gen_range(0..500u64);
        match rng.gen_range(0..3) {
            0 => {
                let value = step;
                let prev = map.insert(key, value).unwrap();
                let model_prev = model.insert(key, value);
                assert_eq!(prev, model_prev, "insert mismatch at step {step}");
            }
            1 => {
                let got = map.get(&key).copied();
                let want = model.get(&key).copied();
                assert_eq!(got, want, "lookup mismatch at step {step}");
            }
            _ => {
                let removed = map.remove(&key);
                let model_removed = model.remove(&key);
                assert_eq!(removed, model_removed, "erase mismatch at step {step}");
            }
        }

        assert_eq!(map.len(), model.len());
        // spec.md §8: 0 <= len <= floor(cap * 75 / 100) after every op.
        if map.cap() > 0 {
            assert!(map.len() <= (map.cap() * 75) / 100);
        }
    }

    for (k, v) in &model {
        assert_eq!(map.get(k), Some(v));
    }
}

#[test]
fn random_u64_keys_survive_growth_and_shrink() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut map: RobinMap<u64, u64> = RobinMap::new();

    let keys: Vec<u64> = (0..2000).map(|_| rng.gen()).collect();
    for (i, &k) in keys.iter().enumerate() {
        map.insert(k, i as u64).unwrap();
    }
    map.shrink().unwrap(); // likely a no-op at this load factor; must not corrupt state.

    for (i, &k) in keys.iter().enumerate() {
        assert_eq!(map.get(&k), Some(&(i as u64)));
    }
}
