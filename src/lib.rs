//! Count duplicate integers in a large file.
//!
//! Integers are inserted into a [`FixedSet`]: a fixed-capacity open-addressing
//! hash set with linear probing. [`PipelinedLoader`] overlaps tokenizing and
//! hashing one batch of input with inserting the previous batch on a helper
//! thread, and prefetches the slot of the next key while probing for the
//! current one.
//!
//! ```no_run
//! let summary = dupcount::run_deduplication("ints.txt", 1_000_000)?;
//! println!("{summary}");
//! # Ok::<(), anyhow::Error>(())
//! ```
#![allow(clippy::needless_range_loop)]

/// Customizable Hasher trait.
pub mod hash;
/// Random input files.
pub mod gen;
/// Pipelined bulk loading.
pub mod pipeline;
/// Hash to slot reduction.
pub mod reduce;
/// The hash set itself.
pub mod set;
/// Integer tokenizer.
pub mod stream;
/// Some logging and prefetching utilities.
pub mod util;


pub use pipeline::{
    run_deduplication, run_deduplication_with_params, DedupParams, DedupSummary,
    PipelinedLoader,
};
pub use set::{BulkStats, FixedSet, Insert};

/// The key type stored in the set.
pub type Key = i64;

/// Marks an empty slot. Never a valid key, and never produced by the tokenizer.
pub const EMPTY: Key = i64::MIN;
