use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ordtree::{Position, RbMultiSet, SetTree};
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha20Rng;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn shuffled_keys(n: usize, rng: &mut ChaCha20Rng) -> Vec<u64> {
    let mut keys: Vec<u64> = (0..n as u64).collect();
    keys.shuffle(rng);
    keys
}

fn filled_tree(keys: &[u64]) -> SetTree<u64> {
    let mut tree = SetTree::new();
    for &key in keys {
        tree.insert_unique(key).unwrap();
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let mut rng = ChaCha20Rng::seed_from_u64(0x5EED);

    for n in SIZES {
        let random = shuffled_keys(n, &mut rng);

        group
            .bench_function(BenchmarkId::new("sequential", n), |b| {
                b.iter(|| {
                    let mut tree = SetTree::new();
                    for key in 0..n as u64 {
                        tree.insert_unique(key).unwrap();
                    }
                    black_box(tree.len())
                })
            })
            .bench_function(BenchmarkId::new("random", n), |b| {
                b.iter(|| black_box(filled_tree(&random).len()))
            })
            .bench_function(BenchmarkId::new("hinted-end", n), |b| {
                b.iter(|| {
                    let mut tree = SetTree::new();
                    for key in 0..n as u64 {
                        tree.insert_unique_hint(Position::END, key).unwrap();
                    }
                    black_box(tree.len())
                })
            })
            .bench_function(BenchmarkId::new("multi-duplicates", n), |b| {
                b.iter(|| {
                    let mut bag = RbMultiSet::new();
                    for &key in &random {
                        bag.insert(key % 64).unwrap();
                    }
                    black_box(bag.len())
                })
            });
    }
    group.finish();
}

fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");
    let mut rng = ChaCha20Rng::seed_from_u64(0xF1ED);

    for n in SIZES {
        let keys = shuffled_keys(n, &mut rng);
        let tree = filled_tree(&keys);
        let queries: Vec<u64> = (0..1_000).map(|_| rng.gen_range(0..2 * n as u64)).collect();

        group
            .bench_function(BenchmarkId::new("find", n), |b| {
                b.iter(|| {
                    for key in &queries {
                        black_box(tree.find(key));
                    }
                })
            })
            .bench_function(BenchmarkId::new("lower_bound", n), |b| {
                b.iter(|| {
                    for key in &queries {
                        black_box(tree.lower_bound(key));
                    }
                })
            })
            .bench_function(BenchmarkId::new("iterate", n), |b| {
                b.iter(|| black_box(tree.iter().sum::<u64>()))
            });
    }
    group.finish();
}

fn bench_erase(c: &mut Criterion) {
    let mut group = c.benchmark_group("erase");
    let mut rng = ChaCha20Rng::seed_from_u64(0xE4A5E);

    for n in SIZES {
        let keys = shuffled_keys(n, &mut rng);
        let tree = filled_tree(&keys);
        let order = shuffled_keys(n, &mut rng);

        group
            .bench_function(BenchmarkId::new("by-key", n), |b| {
                b.iter_batched(
                    || tree.clone(),
                    |mut tree| {
                        for key in &order {
                            tree.erase_unique(key);
                        }
                        black_box(tree.is_empty())
                    },
                    criterion::BatchSize::LargeInput,
                )
            })
            .bench_function(BenchmarkId::new("pop-front", n), |b| {
                b.iter_batched(
                    || tree.clone(),
                    |mut tree| {
                        while !tree.is_empty() {
                            let first = tree.begin();
                            tree.erase(first);
                        }
                        black_box(tree.len())
                    },
                    criterion::BatchSize::LargeInput,
                )
            });
    }
    group.finish();
}

criterion_group!(benches, bench_insert, bench_find, bench_erase);
criterion_main!(benches);
