//! Pipelined loading of an integer file into a [`FixedSet`].
//!
//! Two buffer pairs (keys and their home slots) alternate. While a helper
//! thread inserts the batch in the back pair, the producer reads and hashes
//! the next batch into the front pair. The producer joins the helper before
//! the pairs are swapped again, so at most one batch is in flight and only
//! one thread ever mutates the set.
use std::{
    fmt::{Display, Formatter},
    fs::File,
    io::Read,
    mem,
    panic,
    path::Path,
    thread,
    time::Instant,
};

use anyhow::{ensure, Context, Result};

use crate::{
    hash::{Hasher, MixHash},
    reduce::{FastMod64, Reduce},
    set::{BulkStats, FixedSet, SlotHasher, DEFAULT_FACTOR},
    stream::{IntStream, READ_SIZE},
    util::log_duration,
    Key,
};

/// Number of integers per batch.
pub const BATCH_SIZE: usize = 100_000;

/// Parameters for a deduplication run.
#[derive(Clone, Copy, Debug)]
pub struct DedupParams {
    /// Slots per expected integer; at least 2.
    pub factor: usize,
    /// Integers per pipelined batch.
    pub batch_size: usize,
    /// Bytes per read from the input.
    pub read_size: usize,
    /// Print table geometry and timings to stderr.
    pub print_stats: bool,
}

impl Default for DedupParams {
    fn default() -> Self {
        Self {
            factor: DEFAULT_FACTOR,
            batch_size: BATCH_SIZE,
            read_size: READ_SIZE,
            print_stats: false,
        }
    }
}

/// Result of a deduplication run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DedupSummary {
    /// Integers that were already present when they were inserted.
    pub duplicates: u64,
    /// Integers read from the input.
    pub total: u64,
    /// Distinct integers stored.
    pub distinct: u64,
    /// Integers equal to the empty-slot sentinel; neither duplicate nor distinct.
    pub reserved: u64,
    /// Integers dropped because the table was full.
    pub full: u64,
}

impl Display for DedupSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} duplicates found from {} integers.",
            self.duplicates, self.total
        )
    }
}

/// One of the two ping-pong buffer pairs.
struct Batch {
    keys: Vec<Key>,
    homes: Vec<usize>,
}

impl Batch {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            homes: Vec::with_capacity(capacity),
        }
    }

    /// Read up to `max` integers and compute their home slots.
    fn fill<Rd: Read, Hx: Hasher, R: Reduce>(
        &mut self,
        stream: &mut IntStream<Rd>,
        max: usize,
        hasher: &SlotHasher<Hx, R>,
    ) -> Result<usize> {
        let read = stream
            .next_batch(&mut self.keys, max)
            .context("failed to read integers")?;
        hasher.slots_into(&self.keys, &mut self.homes);
        Ok(read)
    }
}

/// Loads at most `n` integers from a reader into a set sized for `n`, counting duplicates.
pub struct PipelinedLoader<Hx: Hasher = MixHash, R: Reduce = FastMod64> {
    set: FixedSet<Hx, R>,
    params: DedupParams,
    /// Declared number of integers.
    n: usize,
}

impl<Hx: Hasher, R: Reduce> PipelinedLoader<Hx, R> {
    /// Validate `n` and `params` and allocate the set.
    pub fn new(n: usize, params: DedupParams) -> Result<Self> {
        ensure!(
            (1..=u32::MAX as usize).contains(&n),
            "n must satisfy 1 <= n < 2^32, got {n}"
        );
        ensure!(params.batch_size > 0, "batch size must be positive");
        ensure!(params.read_size > 0, "read size must be positive");

        let start = Instant::now();
        let set = FixedSet::with_factor(n, params.factor)?;
        if params.print_stats {
            eprintln!("        keys: {n:>10}");
            eprintln!("       slots: {:>10}", set.capacity());
            eprintln!("       batch: {:>10}", params.batch_size);
            log_duration("alloc", start);
        }
        Ok(Self { set, params, n })
    }

    pub fn set(&self) -> &FixedSet<Hx, R> {
        &self.set
    }

    pub fn into_set(self) -> FixedSet<Hx, R> {
        self.set
    }

    /// Read integers from `reader` until it is exhausted or `n` integers were
    /// read, inserting each into the set in file order.
    pub fn load<Rd: Read>(&mut self, reader: Rd) -> Result<DedupSummary> {
        let DedupParams {
            batch_size,
            read_size,
            print_stats,
            ..
        } = self.params;
        let start = Instant::now();

        let mut stream = IntStream::with_read_size(reader, read_size);
        let hasher = self.set.slot_hasher();
        let mut stats = BulkStats::default();
        let mut remaining = self.n;

        let mut front = Batch::with_capacity(batch_size);
        let mut back = Batch::with_capacity(batch_size);

        // With an odd count, the first integer is inserted on its own, before
        // any batch, so that the pipelined part has even length.
        if self.n % 2 == 1 {
            let read = front.fill(&mut stream, 1, &hasher)?;
            for &key in &front.keys {
                stats.record(self.set.try_insert(key));
            }
            remaining -= read;
        }

        let mut read = front.fill(&mut stream, batch_size.min(remaining), &hasher)?;
        remaining -= read;
        let mut batches = 0;

        while read > 0 {
            mem::swap(&mut front, &mut back);
            let set = &mut self.set;
            let (inserted, next) = thread::scope(|scope| {
                let worker = scope.spawn(|| set.bulk_insert(&back.keys, &back.homes));
                let next = front.fill(&mut stream, batch_size.min(remaining), &hasher);
                (worker.join(), next)
            });
            stats += inserted.unwrap_or_else(|e| panic::resume_unwind(e));
            read = next?;
            remaining -= read;
            batches += 1;
        }

        let summary = DedupSummary {
            duplicates: stats.duplicates,
            total: stats.total(),
            distinct: self.set.len() as u64,
            reserved: stats.reserved,
            full: stats.full,
        };

        if print_stats {
            eprintln!("     batches: {batches:>10}");
            eprintln!("    integers: {:>10}", summary.total);
            eprintln!("  duplicates: {:>10}", summary.duplicates);
            eprintln!(" load factor: {:>13.2}", self.set.load_factor());
            log_duration("dedup", start);
        }
        Ok(summary)
    }
}

/// Count the integers in the file at `path` that appeared earlier in the same
/// file, reading at most `n` integers.
pub fn run_deduplication(path: impl AsRef<Path>, n: usize) -> Result<DedupSummary> {
    run_deduplication_with_params(path, n, DedupParams::default())
}

pub fn run_deduplication_with_params(
    path: impl AsRef<Path>,
    n: usize,
    params: DedupParams,
) -> Result<DedupSummary> {
    let path = path.as_ref();
    let mut loader = PipelinedLoader::<MixHash, FastMod64>::new(n, params)?;
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    loader.load(file)
}
