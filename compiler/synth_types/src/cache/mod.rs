//! Concurrent synthesis cache shared by shape and delegate templates.
//!
//! # Race policy
//!
//! Binding workers never block on each other. A miss constructs a candidate
//! template outside of any lock, then inserts it only if the key is still
//! vacant. The loser of a race drops its candidate and returns the winner, so
//! construction must be a pure function of the key.
//!
//! # Generations
//!
//! A derived generation's cache overlays its predecessor's: lookups fall
//! through to the ancestor chain, inserts only ever touch the local map.
//! Inherited entries are shared read-only and never receive location updates.
//! Ancestor entries that were never named are not inherited.

use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
#[cfg(debug_assertions)]
use dashmap::DashSet;
use rustc_hash::FxBuildHasher;
use synth_ir::SourceLocation;

use crate::generation::GenerationId;
use crate::SynthError;

/// A template that can live in a [`SynthCache`].
pub(crate) trait CacheEntry: Send + Sync + Sized {
    type Key: Clone + Eq + Hash + fmt::Display + Send + Sync;

    /// Human-readable entry kind for logs and errors.
    const KIND: &'static str;

    /// Build the template for `key`. Must depend on nothing but its inputs.
    fn synthesize(key: &Self::Key, owner: GenerationId) -> Self;

    /// Record a use site. Only called on entries owned by the cache's generation.
    fn note_use(&self, _location: SourceLocation) {}

    /// Whether finalization has committed an identity for this entry.
    fn is_named(&self) -> bool;
}

/// Counters describing cache population.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CacheStats {
    /// Templates inserted into this generation's map.
    pub created: usize,
    /// Candidates dropped after losing an insert race.
    pub discarded: usize,
    /// Requests answered by an existing local or inherited entry.
    pub hits: usize,
}

pub(crate) struct SynthCache<T: CacheEntry> {
    generation: GenerationId,
    local: DashMap<T::Key, Arc<T>, FxBuildHasher>,
    parent: Option<Arc<SynthCache<T>>>,
    sealed: AtomicBool,
    seals: bool,
    created: AtomicUsize,
    discarded: AtomicUsize,
    hits: AtomicUsize,
    /// Every location that requested an entry before sealing.
    #[cfg(debug_assertions)]
    audit: DashSet<SourceLocation, FxBuildHasher>,
}

impl<T: CacheEntry> SynthCache<T> {
    /// Create a cache for `generation`, overlaying `parent` if given.
    ///
    /// With `seals` false, [`SynthCache::seal`] is a no-op.
    pub(crate) fn new(
        generation: GenerationId,
        parent: Option<Arc<SynthCache<T>>>,
        seals: bool,
    ) -> Self {
        SynthCache {
            generation,
            local: DashMap::with_hasher(FxBuildHasher),
            parent,
            sealed: AtomicBool::new(false),
            seals,
            created: AtomicUsize::new(0),
            discarded: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
            #[cfg(debug_assertions)]
            audit: DashSet::with_hasher(FxBuildHasher),
        }
    }

    /// Return the entry bound to `key`, creating it on first demand.
    pub(crate) fn get_or_create(
        &self,
        key: &T::Key,
        location: Option<SourceLocation>,
    ) -> Result<Arc<T>, SynthError> {
        if let Some(existing) = self.local.get(key).map(|entry| Arc::clone(entry.value())) {
            self.audit_hit(location);
            self.hits.fetch_add(1, Ordering::Relaxed);
            if let Some(location) = location {
                existing.note_use(location);
            }
            return Ok(existing);
        }

        if let Some(inherited) = self.lookup_inherited(key) {
            self.audit_hit(location);
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(kind = T::KIND, %key, "reusing inherited template");
            return Ok(inherited);
        }

        if self.is_sealed() {
            return Err(SynthError::InsertAfterSeal {
                kind: T::KIND,
                key: key.to_string(),
            });
        }
        self.audit_record(location);

        let candidate = Arc::new(T::synthesize(key, self.generation));
        let winner = match self.local.entry(key.clone()) {
            Entry::Occupied(occupied) => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(kind = T::KIND, %key, "lost insert race, discarding candidate");
                Arc::clone(occupied.get())
            }
            Entry::Vacant(vacant) => {
                self.created.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(kind = T::KIND, %key, generation = %self.generation, "created template");
                vacant.insert(Arc::clone(&candidate));
                candidate
            }
        };
        if let Some(location) = location {
            winner.note_use(location);
        }
        Ok(winner)
    }

    /// Look up `key` locally, then along the ancestor chain.
    pub(crate) fn lookup(&self, key: &T::Key) -> Option<Arc<T>> {
        self.local
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .or_else(|| self.lookup_inherited(key))
    }

    /// Look up `key` in ancestors only.
    ///
    /// Only named entries are inherited. An ancestor entry created after its
    /// generation was finalized (metadata-only output never seals) has no
    /// identity and never will, so descendants synthesize their own.
    pub(crate) fn lookup_inherited(&self, key: &T::Key) -> Option<Arc<T>> {
        self.parent
            .as_ref()
            .and_then(|parent| parent.lookup(key))
            .filter(|entry| entry.is_named())
    }

    /// Snapshot of entries owned by this generation, in no particular order.
    pub(crate) fn local_entries(&self) -> Vec<Arc<T>> {
        self.local
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// This cache followed by its ancestors, nearest first.
    pub(crate) fn chain(&self) -> impl Iterator<Item = &SynthCache<T>> {
        std::iter::successors(Some(self), |cache| cache.parent.as_deref())
    }

    pub(crate) fn local_len(&self) -> usize {
        self.local.len()
    }

    /// Refuse further inserts. Lookups of existing keys keep working.
    pub(crate) fn seal(&self) {
        if self.seals {
            self.sealed.store(true, Ordering::Release);
            tracing::debug!(kind = T::KIND, generation = %self.generation, "sealed cache");
        }
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            created: self.created.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
        }
    }

    #[cfg(debug_assertions)]
    fn audit_record(&self, location: Option<SourceLocation>) {
        if let Some(location) = location {
            self.audit.insert(location);
        }
    }

    #[cfg(not(debug_assertions))]
    fn audit_record(&self, _location: Option<SourceLocation>) {}

    /// After sealing, every hit must come from a location seen before sealing;
    /// a new one means some binding ran after finalization.
    #[cfg(debug_assertions)]
    fn audit_hit(&self, location: Option<SourceLocation>) {
        let Some(location) = location else { return };
        if self.is_sealed() {
            debug_assert!(
                self.audit.contains(&location),
                "{} requested from {location:?} after finalization",
                T::KIND
            );
        } else {
            self.audit.insert(location);
        }
    }

    #[cfg(not(debug_assertions))]
    fn audit_hit(&self, _location: Option<SourceLocation>) {}
}
