//! Non-repeating random numbers per range
//!
//! Each `(min, max)` range owns one shuffled permutation and a cursor. Every
//! scheme that uses the same range draws from the same entry, so within any
//! `max - min + 1` consecutive draws each number appears exactly once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Largest range a sequence will shuffle
pub const MAX_SEQUENCE_LEN: u64 = 1 << 20;

/// Sequence errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// `max < min`
    #[error("empty number range: {min}..={max}")]
    EmptyRange {
        /// Lower bound
        min: i32,
        /// Upper bound
        max: i32,
    },

    /// More than [`MAX_SEQUENCE_LEN`] numbers
    #[error("number range {min}..={max} exceeds {} entries", MAX_SEQUENCE_LEN)]
    RangeTooLarge {
        /// Lower bound
        min: i32,
        /// Upper bound
        max: i32,
    },
}

/// Inclusive number range used as cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NumberRange {
    /// Lower bound
    pub min: i32,
    /// Upper bound
    pub max: i32,
}

impl NumberRange {
    /// Count of numbers in the range, zero when `max < min`
    pub fn len(self) -> u64 {
        u64::try_from(i64::from(self.max) - i64::from(self.min) + 1).unwrap_or(0)
    }

    /// Whether the range holds no numbers
    pub const fn is_empty(self) -> bool {
        self.max < self.min
    }
}

/// One shuffled range and its cursor
#[derive(Debug)]
struct SequenceEntry {
    permutation: Vec<i32>,
    cursor: usize,
}

impl SequenceEntry {
    fn next(&mut self) -> i32 {
        let value = self.permutation[self.cursor];
        self.cursor = (self.cursor + 1) % self.permutation.len();
        value
    }
}

/// Cache of shuffled sequences keyed by range
///
/// Integration code shares [`SequenceCache::global`]; tests build isolated
/// caches with [`SequenceCache::with_seed`].
#[derive(Debug)]
pub struct SequenceCache {
    entries: Mutex<HashMap<NumberRange, Arc<Mutex<SequenceEntry>>>>,
    rng: Mutex<StdRng>,
}

impl SequenceCache {
    /// Create an empty cache seeded from system entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create an empty cache with a deterministic shuffle
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
        }
    }

    /// Process-wide cache
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<SequenceCache> = OnceLock::new();
        GLOBAL.get_or_init(Self::new)
    }

    /// Draw the next number of the `[min, max]` sequence
    ///
    /// The offset is added only when `offset_enabled` is set and saturates at
    /// the `i32` bounds.
    pub fn draw(&self, min: i32, max: i32, offset_enabled: bool, offset: i32) -> Result<i32, SequenceError> {
        let entry = self.entry(NumberRange { min, max })?;
        let value = entry.lock().unwrap().next();
        Ok(if offset_enabled { value.saturating_add(offset) } else { value })
    }

    fn entry(&self, range: NumberRange) -> Result<Arc<Mutex<SequenceEntry>>, SequenceError> {
        if range.is_empty() {
            return Err(SequenceError::EmptyRange { min: range.min, max: range.max });
        }
        if range.len() > MAX_SEQUENCE_LEN {
            return Err(SequenceError::RangeTooLarge { min: range.min, max: range.max });
        }

        let mut entries = self.entries.lock().unwrap();
        if let Some(entry) = entries.get(&range) {
            return Ok(Arc::clone(entry));
        }

        let mut permutation: Vec<i32> = (range.min..=range.max).collect();
        permutation.shuffle(&mut *self.rng.lock().unwrap());
        log::debug!(
            "Created number sequence {}..={} ({} entries)",
            range.min,
            range.max,
            permutation.len()
        );

        let entry = Arc::new(Mutex::new(SequenceEntry { permutation, cursor: 0 }));
        entries.insert(range, Arc::clone(&entry));
        Ok(entry)
    }

    /// Drop every sequence, e.g. after schemes are reloaded
    pub fn invalidate(&self) {
        let mut entries = self.entries.lock().unwrap();
        log::info!("Invalidating {} cached number sequences", entries.len());
        entries.clear();
    }

    /// Number of cached ranges
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    /// Whether no range has been drawn from yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SequenceCache {
    fn default() -> Self {
        Self::new()
    }
}
