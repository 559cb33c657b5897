#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can audit
// structural invariants (bucket placement, reachable-node count) that the
// public surface does not expose.

use crate::chain_hash_map::{ChainHashMap, MIN_TABLE_SIZE};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys and op lists shrink in length. A small key pool plus identity
// hashing keeps chains busy with collisions.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Contains(usize),
    Find(usize),
    Get(usize),
    GetOrInsertAdd(usize, i32),
    Resize(usize),
    SetExpand(bool),
    SetShrink(bool),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<u64>, Vec<OpI>)> {
    proptest::collection::btree_set(0u64..200, 1..=10).prop_flat_map(|pool| {
        let pool: Vec<u64> = pool.into_iter().collect();
        let idx = 0..pool.len();
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Contains),
            idx.clone().prop_map(OpI::Find),
            idx.clone().prop_map(OpI::Get),
            (idx.clone(), -8i32..8).prop_map(|(i, d)| OpI::GetOrInsertAdd(i, d)),
            (MIN_TABLE_SIZE..=64usize).prop_map(OpI::Resize),
            any::<bool>().prop_map(OpI::SetExpand),
            any::<bool>().prop_map(OpI::SetShrink),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `count()` equals the number of distinct live keys after every op.
// - Every reachable node sits in the bucket its stored hash selects, for
//   the current bucket-array size (checked after every op).
// - `size()` never drops below the minimum.
// - `get` cache-fills absent keys exactly like the model's entry-or-default;
//   `find`/`contains` never mutate.
// - `remove` reports presence exactly like the model.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainHashMap<u64, i32> = ChainHashMap::new();
        let mut model: HashMap<u64, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i];
                    sut.insert(k, v);
                    model.insert(k, v);
                }
                OpI::Remove(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.remove(&k), model.remove(&k));
                }
                OpI::Contains(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.contains(&k), model.contains_key(&k));
                }
                OpI::Find(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.find(&k), model.get(&k));
                }
                OpI::Get(i) => {
                    let k = pool[i];
                    // Cache-fill contract: both sides insert a default on miss.
                    let expected = *model.entry(k).or_insert(0);
                    prop_assert_eq!(sut.get(k), expected);
                }
                OpI::GetOrInsertAdd(i, d) => {
                    let k = pool[i];
                    *sut.get_or_insert_default(k) += d;
                    *model.entry(k).or_insert(0) += d;
                }
                OpI::Resize(n) => {
                    sut.resize(n);
                    prop_assert_eq!(sut.size(), n);
                }
                OpI::SetExpand(on) => sut.set_auto_expand(on),
                OpI::SetShrink(on) => sut.set_auto_shrink(on),
                OpI::Iterate => {
                    let seen: BTreeSet<u64> = sut.iter().map(|(k, _)| *k).collect();
                    let expected: BTreeSet<u64> = model.keys().copied().collect();
                    prop_assert_eq!(seen, expected);
                }
            }

            sut.assert_invariants();
            prop_assert_eq!(sut.count(), model.len());
            prop_assert!(sut.size() >= MIN_TABLE_SIZE);
        }
    }
}

// Property: with only automatic resizes in play, every size the table
// takes is a power of two reached by doubling or halving from 4.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_auto_sizes_are_powers_of_two(ops in proptest::collection::vec((any::<bool>(), 0u64..64), 1..200)) {
        let mut sut: ChainHashMap<u64, u64> = ChainHashMap::new();
        let mut last = sut.size();
        for (is_insert, k) in ops {
            if is_insert {
                sut.insert(k, k);
            } else {
                sut.remove(&k);
            }
            let size = sut.size();
            prop_assert!(size.is_power_of_two());
            prop_assert!(size >= MIN_TABLE_SIZE);
            prop_assert!(
                size == last || size == last * 2 || size == last / 2,
                "size moved {} -> {} without doubling or halving", last, size
            );
            last = size;
        }
    }
}
