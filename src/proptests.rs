use super::*;

use core::hash::BuildHasher;
use core::hash::BuildHasherDefault;
use core::hash::Hasher;
use proptest::prelude::*;
use siphasher::sip::SipHasher;
use std::collections::HashSet as StdHashSet;
use std::vec::Vec;

/// Hashes a `u64` to itself so generated keys control directory slots.
#[derive(Default)]
struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 = (self.0 << 8) | u64::from(*byte);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

type Identity = BuildHasherDefault<IdentityHasher>;
type Sip = BuildHasherDefault<SipHasher>;

#[derive(Debug, Clone)]
enum Op {
    Insert(u64),
    Remove(u64),
    Find(u64),
    Clear,
}

fn op(key: impl Strategy<Value = u64> + Clone) -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => key.clone().prop_map(Op::Insert),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.prop_map(Op::Find),
        1 => Just(Op::Clear),
    ]
}

/// Keys sharing their low `shift` bits, so buckets overflow in clusters and
/// the directory has to expand repeatedly.
fn clustered_key(shift: u32) -> impl Strategy<Value = u64> + Clone {
    (0u64..64).prop_map(move |k| k << shift)
}

fn run_against_model<S, const N: usize>(
    set: &mut HashSet<u64, S, N>,
    ops: &[Op],
    rehash: impl Fn(&u64) -> u64,
) where
    S: BuildHasher,
{
    let mut model = StdHashSet::new();
    for op in ops {
        match *op {
            Op::Insert(k) => assert_eq!(set.insert(k), model.insert(k)),
            Op::Remove(k) => assert_eq!(set.remove(&k), model.remove(&k)),
            Op::Find(k) => {
                assert_eq!(set.count(&k), usize::from(model.contains(&k)));
                let found = set.find(&k).next().copied();
                assert_eq!(found, model.get(&k).copied());
            }
            Op::Clear => {
                set.clear();
                model.clear();
            }
        }
        assert_eq!(set.len(), model.len());
        set.raw_table().validate(&rehash);
    }

    let listed: Vec<u64> = set.iter().copied().collect();
    assert_eq!(listed.len(), model.len(), "iteration yielded duplicates");
    assert_eq!(listed.into_iter().collect::<StdHashSet<_>>(), model);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn matches_std_with_siphash(ops in prop::collection::vec(op(0u64..512), 0..200)) {
        let mut set: HashSet<u64, Sip, 3> = HashSet::new();
        let builder = Sip::default();
        run_against_model(&mut set, &ops, |v| builder.hash_one(v));
    }

    #[test]
    fn matches_std_with_clustered_hashes(
        shift in 0u32..6,
        ops in prop::collection::vec(op(0u64..64), 0..200),
    ) {
        let ops: Vec<Op> = ops
            .into_iter()
            .map(|op| match op {
                Op::Insert(k) => Op::Insert(k << shift),
                Op::Remove(k) => Op::Remove(k << shift),
                Op::Find(k) => Op::Find(k << shift),
                Op::Clear => Op::Clear,
            })
            .collect();
        let mut set: HashSet<u64, Identity, 2> = HashSet::new();
        run_against_model(&mut set, &ops, |&v| v);
    }

    #[test]
    fn clone_is_equal_and_independent(keys in prop::collection::vec(clustered_key(4), 0..100)) {
        let original: HashSet<u64, Identity, 2> = keys.iter().copied().collect();
        let mut copy = original.clone();
        prop_assert_eq!(&copy, &original);
        copy.raw_table().validate(|&v| v);

        let before: StdHashSet<u64> = original.iter().copied().collect();
        copy.insert(u64::MAX);
        for k in &keys {
            copy.remove(k);
        }
        let after: StdHashSet<u64> = original.iter().copied().collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(copy.len(), 1);
    }

    #[test]
    fn cursor_from_find_resumes_iteration(keys in prop::collection::vec(0u64..1024, 1..200)) {
        let set: HashSet<u64, Identity, 4> = keys.iter().copied().collect();
        let order: Vec<u64> = set.iter().copied().collect();
        for (position, key) in order.iter().enumerate() {
            let rest: Vec<u64> = set.find(key).copied().collect();
            prop_assert_eq!(&rest[..], &order[position..]);
        }
    }
}
