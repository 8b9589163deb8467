//! Compilation generations and their synthesis caches.
//!
//! A generation owns one shape cache and one delegate cache. A generation
//! derived from a finalized predecessor overlays the predecessor's caches, so
//! templates named earlier keep their identity and are never recreated.

use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, OnceLock};

use synth_ir::{SourceLocation, StringInterner, TypeId};

use crate::cache::{CacheStats, SynthCache};
use crate::config::GenerationConfig;
use crate::delegate::{DelegateKey, DelegateTemplate, ParamPassing};
use crate::descriptor::ShapeDescriptors;
use crate::finalize::NumberingState;
use crate::shape::{instantiate, ConstructedType, ShapeTemplate};
use crate::shape_key::ShapeKey;
use crate::SynthError;

/// Position of a generation in its chain. The root is 0.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct GenerationId(u32);

impl GenerationId {
    pub const ROOT: GenerationId = GenerationId(0);

    #[must_use]
    pub const fn next(self) -> GenerationId {
        GenerationId(self.0 + 1)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

/// One compilation in a chain of incremental or submission compilations.
pub struct Generation {
    pub(crate) id: GenerationId,
    pub(crate) config: GenerationConfig,
    pub(crate) shapes: Arc<SynthCache<ShapeTemplate>>,
    pub(crate) delegates: Arc<SynthCache<DelegateTemplate>>,
    pub(crate) predecessor: Option<Arc<Generation>>,
    /// Set when finalization starts; guards against a second run.
    pub(crate) finalizing: AtomicBool,
    /// Counter state after finalization completed.
    pub(crate) finalized: OnceLock<NumberingState>,
}

impl Generation {
    /// Start a new chain.
    pub fn root(config: GenerationConfig) -> Arc<Generation> {
        Arc::new(Self::with_parent(GenerationId::ROOT, config, None))
    }

    /// Start the next generation after `predecessor`.
    ///
    /// The predecessor must be finalized: its templates are inherited with
    /// their names, and its numbering is where this generation continues.
    pub fn derive(
        predecessor: &Arc<Generation>,
        config: GenerationConfig,
    ) -> Result<Arc<Generation>, SynthError> {
        if !predecessor.is_finalized() {
            return Err(SynthError::UnfinalizedPredecessor {
                generation: predecessor.id,
            });
        }
        let id = predecessor.id.next();
        tracing::debug!(generation = %id, predecessor = %predecessor.id, "derived generation");
        Ok(Arc::new(Self::with_parent(
            id,
            config,
            Some(Arc::clone(predecessor)),
        )))
    }

    fn with_parent(
        id: GenerationId,
        config: GenerationConfig,
        predecessor: Option<Arc<Generation>>,
    ) -> Generation {
        let seals = config.seals_caches();
        let shapes = SynthCache::new(
            id,
            predecessor.as_ref().map(|p| Arc::clone(&p.shapes)),
            seals,
        );
        let delegates = SynthCache::new(
            id,
            predecessor.as_ref().map(|p| Arc::clone(&p.delegates)),
            seals,
        );
        Generation {
            id,
            config,
            shapes: Arc::new(shapes),
            delegates: Arc::new(delegates),
            predecessor,
            finalizing: AtomicBool::new(false),
            finalized: OnceLock::new(),
        }
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn predecessor(&self) -> Option<&Arc<Generation>> {
        self.predecessor.as_ref()
    }

    /// The template for `key`, created on first demand.
    ///
    /// `location` is the requesting construction site; it feeds the
    /// deterministic naming order.
    pub fn shape_template(
        &self,
        key: &ShapeKey,
        location: Option<SourceLocation>,
    ) -> Result<Arc<ShapeTemplate>, SynthError> {
        self.shapes.get_or_create(key, location)
    }

    /// The template for `key` instantiated with `type_args`.
    pub fn construct_shape(
        &self,
        key: &ShapeKey,
        type_args: &[TypeId],
        location: Option<SourceLocation>,
    ) -> Result<ConstructedType, SynthError> {
        let template = self.shape_template(key, location)?;
        instantiate(&template, type_args)
    }

    /// Construct the shape described by `descriptors`.
    ///
    /// Erroneous fields take part under their placeholder names and the error
    /// type, so downstream binding still sees one field per initializer.
    pub fn construct_from_descriptors(
        &self,
        descriptors: &ShapeDescriptors,
        interner: &StringInterner,
    ) -> Result<ConstructedType, SynthError> {
        let key = descriptors.shape_key(interner);
        let type_args = descriptors.field_types();
        self.construct_shape(&key, &type_args, Some(descriptors.location))
    }

    /// The synthesized delegate for `key`, created on first demand.
    pub fn delegate_template(
        &self,
        key: &DelegateKey,
        location: Option<SourceLocation>,
    ) -> Result<Arc<DelegateTemplate>, SynthError> {
        self.delegates.get_or_create(key, location)
    }

    /// The synthesized delegate for a call-site signature, or `None` when a
    /// canonical generic delegate already covers it.
    pub fn delegate_for_signature(
        &self,
        params: &[ParamPassing],
        returns_void: bool,
        location: Option<SourceLocation>,
    ) -> Result<Option<Arc<DelegateTemplate>>, SynthError> {
        let key = DelegateKey::new(params, returns_void);
        if key.has_canonical_form() {
            return Ok(None);
        }
        self.delegate_template(&key, location).map(Some)
    }

    /// Existing template for `key` in this generation or its ancestors.
    pub fn lookup_shape(&self, key: &ShapeKey) -> Option<Arc<ShapeTemplate>> {
        self.shapes.lookup(key)
    }

    pub fn lookup_delegate(&self, key: &DelegateKey) -> Option<Arc<DelegateTemplate>> {
        self.delegates.lookup(key)
    }

    /// Number of shape templates created in this generation.
    pub fn local_shape_count(&self) -> usize {
        self.shapes.local_len()
    }

    pub fn local_delegate_count(&self) -> usize {
        self.delegates.local_len()
    }

    pub fn shape_stats(&self) -> CacheStats {
        self.shapes.stats()
    }

    pub fn delegate_stats(&self) -> CacheStats {
        self.delegates.stats()
    }

    pub fn is_sealed(&self) -> bool {
        self.shapes.is_sealed() && self.delegates.is_sealed()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.get().is_some()
    }

    /// Counter state this generation's finalization left behind.
    pub fn numbering_after(&self) -> Option<NumberingState> {
        self.finalized.get().copied()
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generation")
            .field("id", &self.id)
            .field("module", &self.config.module_name)
            .field("shapes", &self.shapes.local_len())
            .field("delegates", &self.delegates.local_len())
            .field("finalized", &self.finalized.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
