//! Sharded string interner for field identifiers.
//!
//! Binding workers intern field names concurrently, so each shard sits behind
//! its own `RwLock`. Interned text is kept as `Arc<str>` so that shape keys can
//! hold the text without borrowing the interner.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// Shard exceeded the 28-bit local index space.
    ShardOverflow { shard_idx: usize, count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::ShardOverflow { shard_idx, count } => write!(
                f,
                "interner shard {shard_idx} exceeded capacity: {count} strings, max is {}",
                Name::MAX_LOCAL
            ),
        }
    }
}

impl std::error::Error for InternError {}

#[derive(Default)]
struct InternShard {
    map: FxHashMap<Arc<str>, u32>,
    strings: Vec<Arc<str>>,
}

/// Sharded string interner for concurrent access.
pub struct StringInterner {
    shards: [RwLock<InternShard>; Name::NUM_SHARDS],
}

impl StringInterner {
    pub fn new() -> Self {
        let interner = Self {
            shards: std::array::from_fn(|_| RwLock::new(InternShard::default())),
        };
        // Keeps `Name::EMPTY` pointing at "" (shard 0, local 0).
        let mut shard = interner.shards[0].write();
        let empty: Arc<str> = Arc::from("");
        shard.map.insert(empty.clone(), 0);
        shard.strings.push(empty);
        drop(shard);
        interner
    }

    #[inline]
    fn shard_for(s: &str) -> usize {
        if s.is_empty() {
            return 0;
        }
        let mut hash = 0u32;
        for byte in s.bytes().take(8) {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        (hash as usize) % Name::NUM_SHARDS
    }

    /// Intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        let shard_idx = Self::shard_for(s);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "shard_idx is bounded by NUM_SHARDS (16)"
        )]
        let shard_idx_u32 = shard_idx as u32;
        let shard = &self.shards[shard_idx];

        if let Some(&local) = shard.read().map.get(s) {
            return Ok(Name::new(shard_idx_u32, local));
        }

        let mut guard = shard.write();
        // Another worker may have won between the read and write lock.
        if let Some(&local) = guard.map.get(s) {
            return Ok(Name::new(shard_idx_u32, local));
        }

        let count = guard.strings.len();
        let local = u32::try_from(count)
            .ok()
            .filter(|&local| local <= Name::MAX_LOCAL)
            .ok_or(InternError::ShardOverflow { shard_idx, count })?;
        let text: Arc<str> = Arc::from(s);
        guard.strings.push(text.clone());
        guard.map.insert(text, local);
        Ok(Name::new(shard_idx_u32, local))
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if a shard exceeds capacity. Use `try_intern` for fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the text for a Name.
    pub fn lookup(&self, name: Name) -> Arc<str> {
        self.shards[name.shard()].read().strings[name.local()].clone()
    }

    /// Total number of interned strings, including the empty string.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().strings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}
