use core::hash::BuildHasherDefault;
use core::hash::Hash;
use core::hint::black_box;
use std::collections::HashSet as StdHashSet;

use criterion::AxisScale;
use criterion::BatchSize;
use criterion::Criterion;
use criterion::PlotConfiguration;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use extendible_hash::HashSet as ExtendibleHashSet;
use hashbrown::HashSet as HashbrownHashSet;
use rand::Rng;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::distr;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand_distr::Zipf;
use siphasher::sip::SipHasher;

type Sip = BuildHasherDefault<SipHasher>;

trait TestKey: Clone + Hash + Eq {
    fn new(key: u64) -> Self;
}

#[derive(Clone, Hash, PartialEq, Eq)]
struct SmallKey(u64);

impl TestKey for SmallKey {
    fn new(key: u64) -> Self {
        black_box(Self(key))
    }
}

#[derive(Clone, Hash, PartialEq, Eq)]
struct StringKey(String);

impl TestKey for StringKey {
    fn new(key: u64) -> Self {
        black_box(Self(format!("key_{:016X}", key)))
    }
}

const SIZES: &[usize] = &[
    (1 << 10),
    (1 << 12),
    (1 << 14),
    (1 << 16),
    (1 << 18),
];

const KEY_SPACE_MULTIPLIER: usize = 4;

fn random_keys<K: TestKey>(count: usize) -> Vec<K> {
    let mut rng = OsRng;
    (0..count)
        .map(|_| K::new(rng.try_next_u64().unwrap()))
        .collect()
}

fn shuffled<K: Clone>(keys: &[K]) -> Vec<K> {
    let mut keys = keys.to_vec();
    keys.shuffle(&mut SmallRng::from_os_rng());
    keys
}

fn bench_insert_random<K: TestKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("insert_random_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("extendible_hash/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut set = ExtendibleHashSet::<K, Sip>::new();
                    for key in keys {
                        black_box(set.insert(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("extendible_hash_n4/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut set = ExtendibleHashSet::<K, Sip, 4>::new();
                    for key in keys {
                        black_box(set.insert(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut set = HashbrownHashSet::<K, Sip>::default();
                    for key in keys {
                        black_box(set.insert(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || shuffled(&keys),
                |keys| {
                    let mut set = StdHashSet::<K, Sip>::default();
                    for key in keys {
                        black_box(set.insert(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_find_hit_miss<K: TestKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("find_hit_miss_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let mut probes = keys[..size / 2].to_vec();
        probes.extend(random_keys::<K>(size / 2));
        probes.shuffle(&mut SmallRng::from_os_rng());

        let extendible: ExtendibleHashSet<K, Sip> = keys.iter().cloned().collect();
        let hashbrown: HashbrownHashSet<K, Sip> = keys.iter().cloned().collect();
        let std_set: StdHashSet<K, Sip> = keys.iter().cloned().collect();

        group.throughput(Throughput::Elements(probes.len() as u64));

        group.bench_function(format!("extendible_hash/{size}"), |b| {
            b.iter(|| {
                let mut hits = 0;
                for probe in probes.iter() {
                    hits += extendible.count(probe);
                }
                black_box(hits)
            })
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| {
                let mut hits = 0;
                for probe in probes.iter() {
                    hits += usize::from(hashbrown.contains(probe));
                }
                black_box(hits)
            })
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| {
                let mut hits = 0;
                for probe in probes.iter() {
                    hits += usize::from(std_set.contains(probe));
                }
                black_box(hits)
            })
        });
    }

    group.finish();
}

fn bench_remove<K: TestKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("remove_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let extendible: ExtendibleHashSet<K, Sip> = keys.iter().cloned().collect();
        let hashbrown: HashbrownHashSet<K, Sip> = keys.iter().cloned().collect();
        let std_set: StdHashSet<K, Sip> = keys.iter().cloned().collect();

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("extendible_hash/{size}"), |b| {
            b.iter_batched(
                || (extendible.clone(), shuffled(&keys)),
                |(mut set, keys)| {
                    for key in keys.iter() {
                        black_box(set.remove(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || (hashbrown.clone(), shuffled(&keys)),
                |(mut set, keys)| {
                    for key in keys.iter() {
                        black_box(set.remove(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || (std_set.clone(), shuffled(&keys)),
                |(mut set, keys)| {
                    for key in keys.iter() {
                        black_box(set.remove(key));
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_iteration<K: TestKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("iteration_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let keys = random_keys::<K>(size);
        let extendible: ExtendibleHashSet<K, Sip> = keys.iter().cloned().collect();
        let hashbrown: HashbrownHashSet<K, Sip> = keys.iter().cloned().collect();
        let std_set: StdHashSet<K, Sip> = keys.iter().cloned().collect();

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("extendible_hash/{size}"), |b| {
            b.iter(|| black_box(extendible.iter().count()))
        });
        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter(|| black_box(hashbrown.iter().count()))
        });
        group.bench_function(format!("std/{size}"), |b| {
            b.iter(|| black_box(std_set.iter().count()))
        });
    }

    group.finish();
}

#[derive(Clone, Copy)]
enum Op {
    Insert(u64),
    Find(u64),
    Remove(u64),
}

/// Builds a workload of inserts drawn from a Zipf distribution over the
/// first `size` keys, with finds and removes over a larger key space so a
/// share of them miss.
fn zipf_workload(size: usize) -> Vec<Op> {
    let mut rng = SmallRng::from_os_rng();
    let insert_distr = Zipf::new(size as f32 - 1.0, 1.0).unwrap();
    let find_remove_distr =
        Zipf::new(size as f32 * KEY_SPACE_MULTIPLIER as f32 - 1.0, 1.0).unwrap();

    (0..size * 2)
        .map(|_| {
            let op_choice: f64 = rng.sample(distr::Uniform::new(0.0, 1.0).unwrap());
            if op_choice < 0.5 {
                Op::Insert(rng.sample(insert_distr) as u64)
            } else if op_choice < 0.8 {
                Op::Find(rng.sample(find_remove_distr) as u64)
            } else {
                Op::Remove(rng.sample(find_remove_distr) as u64)
            }
        })
        .collect()
}

fn bench_mixed_zipf<K: TestKey, const MAX_SIZE: usize>(c: &mut Criterion) {
    let mut group = c.benchmark_group(format!("mixed_zipf_{}", core::any::type_name::<K>()));
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for &size in SIZES[..=MAX_SIZE].iter() {
        let ops: Vec<(Op, K)> = zipf_workload(size)
            .into_iter()
            .map(|op| match op {
                Op::Insert(k) | Op::Find(k) | Op::Remove(k) => (op, K::new(k)),
            })
            .collect();

        group.throughput(Throughput::Elements(ops.len() as u64));

        group.bench_function(format!("extendible_hash/{size}"), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut set = ExtendibleHashSet::<K, Sip>::new();
                    for (op, key) in ops {
                        match op {
                            Op::Insert(_) => {
                                black_box(set.insert(key));
                            }
                            Op::Find(_) => {
                                black_box(set.contains(&key));
                            }
                            Op::Remove(_) => {
                                black_box(set.remove(&key));
                            }
                        }
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{size}"), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut set = HashbrownHashSet::<K, Sip>::default();
                    for (op, key) in ops {
                        match op {
                            Op::Insert(_) => {
                                black_box(set.insert(key));
                            }
                            Op::Find(_) => {
                                black_box(set.contains(&key));
                            }
                            Op::Remove(_) => {
                                black_box(set.remove(&key));
                            }
                        }
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("std/{size}"), |b| {
            b.iter_batched(
                || ops.clone(),
                |ops| {
                    let mut set = StdHashSet::<K, Sip>::default();
                    for (op, key) in ops {
                        match op {
                            Op::Insert(_) => {
                                black_box(set.insert(key));
                            }
                            Op::Find(_) => {
                                black_box(set.contains(&key));
                            }
                            Op::Remove(_) => {
                                black_box(set.remove(&key));
                            }
                        }
                    }
                    black_box(set)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert_random::<SmallKey, 4>,
    bench_insert_random::<StringKey, 3>,
    bench_find_hit_miss::<SmallKey, 4>,
    bench_find_hit_miss::<StringKey, 3>,
    bench_remove::<SmallKey, 4>,
    bench_remove::<StringKey, 3>,
    bench_iteration::<SmallKey, 4>,
    bench_iteration::<StringKey, 3>,
    bench_mixed_zipf::<SmallKey, 4>,
    bench_mixed_zipf::<StringKey, 3>,
);

criterion_main!(benches);
