//! Compare one-by-one inserts with the prefetching bulk insert.
use std::{hint::black_box, time::Instant};

use clap::Parser;
use dupcount::{hash::*, reduce::*, set::FixedSet, Key};
use rand::{thread_rng, Rng};
use rayon::prelude::*;

#[derive(clap::Parser)]
struct Args {
    /// Number of keys; drawn from [0, n) so that roughly a third are duplicates.
    #[arg(short, default_value_t = 10_000_000)]
    n: usize,
}

type Set = FixedSet<MixHash, FastMod64>;

fn bench(name: &str, n: usize, f: impl FnOnce(&mut Set) -> u64) {
    let mut set = Set::new(n).unwrap();
    let start = Instant::now();
    let duplicates = black_box(f(&mut set));
    let ns = start.elapsed().as_nanos() as f64 / n as f64;
    eprintln!("{name:>12}: {ns:>6.1}ns/key  ({duplicates} duplicates)");
}

fn main() {
    let Args { n } = Args::parse();
    let keys: Vec<Key> = (0..n)
        .into_par_iter()
        .map_init(thread_rng, |rng, _| rng.gen_range(0..n as Key))
        .collect();
    let hasher = Set::new(n).unwrap().slot_hasher();
    let mut homes = vec![];
    hasher.slots_into(&keys, &mut homes);

    bench("insert", n, |set| {
        keys.iter().filter(|&&key| !set.insert(key)).count() as u64
    });
    bench("insert_at", n, |set| {
        let mut d = 0;
        for (&key, &home) in keys.iter().zip(&homes) {
            d += (set.insert_at(key, home) == dupcount::Insert::Duplicate) as u64;
        }
        d
    });
    bench("bulk 1", n, |set| set.bulk_insert(&keys, &homes).duplicates);
    bench("bulk 4", n, |set| {
        set.bulk_insert_ahead::<4>(&keys, &homes).duplicates
    });
    bench("bulk 16", n, |set| {
        set.bulk_insert_ahead::<16>(&keys, &homes).duplicates
    });
}
