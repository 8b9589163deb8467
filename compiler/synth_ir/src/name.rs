//! Identifiers handed out by [`StringInterner`](crate::StringInterner).

use std::fmt;

const SHARD_SHIFT: u32 = 28;

/// An interned identifier such as a field name.
///
/// The top four bits select the interner shard, the low 28 bits index into
/// it. Comparing two names compares identity, not spelling order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// The empty string, interned up front in shard 0.
    pub const EMPTY: Name = Name(0);

    /// Largest slot index a shard can hand out.
    pub const MAX_LOCAL: u32 = (1 << SHARD_SHIFT) - 1;

    pub const NUM_SHARDS: usize = 1 << (32 - SHARD_SHIFT);

    #[inline]
    pub const fn new(shard: u32, local: u32) -> Self {
        debug_assert!((shard as usize) < Self::NUM_SHARDS);
        debug_assert!(local <= Self::MAX_LOCAL);
        Name(shard << SHARD_SHIFT | local)
    }

    #[inline]
    pub const fn shard(self) -> usize {
        (self.0 >> SHARD_SHIFT) as usize
    }

    #[inline]
    pub const fn local(self) -> usize {
        (self.0 & Self::MAX_LOCAL) as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({}:{})", self.shard(), self.local())
    }
}
