//! Synthetic input files of random integers.
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    time::Instant,
};

use anyhow::{ensure, Context, Result};
use itertools::Itertools;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::{util::log_duration, Key};

/// Generated integers are drawn uniformly from `[-MAX_ABS, MAX_ABS]`, i.e. have up to 10 digits.
pub const MAX_ABS: Key = 9_999_999_999;

/// Integers per chunk. Each chunk gets its own rng stream.
const CHUNK: usize = 1 << 16;
/// Chunks generated in parallel before they are written out.
const CHUNKS_PER_ROUND: usize = 64;

/// The `n` integers that [`write_test_file`] writes for `seed`.
pub fn generate_ints(n: usize, seed: u64) -> Vec<Key> {
    (0..n.div_ceil(CHUNK))
        .into_par_iter()
        .flat_map_iter(|chunk| chunk_ints(n, seed, chunk))
        .collect()
}

fn chunk_ints(n: usize, seed: u64, chunk: usize) -> impl Iterator<Item = Key> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(chunk as u64);
    let len = CHUNK.min(n - chunk * CHUNK);
    (0..len).map(move |_| rng.gen_range(-MAX_ABS..=MAX_ABS))
}

/// Write `n` random integers separated by spaces to `path`.
/// The output only depends on `n` and `seed`.
pub fn write_test_file(path: impl AsRef<Path>, n: usize, seed: u64) -> Result<()> {
    ensure!(n > 0, "n must be positive");
    let path = path.as_ref();
    let start = Instant::now();
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    let chunks = n.div_ceil(CHUNK);
    for round in (0..chunks).step_by(CHUNKS_PER_ROUND) {
        let texts: Vec<String> = (round..chunks.min(round + CHUNKS_PER_ROUND))
            .into_par_iter()
            .map(|chunk| chunk_ints(n, seed, chunk).join(" "))
            .collect();
        for text in texts {
            w.write_all(text.as_bytes())?;
            w.write_all(b" ")?;
        }
    }
    w.flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    log_duration("write file", start);
    Ok(())
}
