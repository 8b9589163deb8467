//! The run-once finalization pass.
//!
//! Runs single-threaded after all binding is complete:
//!
//! 1. Carry forward identities recorded in the previous output's map.
//! 2. Order this generation's unnamed shape templates by earliest use site,
//!    then canonical key.
//! 3. Name them from the shape counter, and name new delegates (ordered by
//!    their content-addressed name) from the delegate counter.
//! 4. Seal both caches.
//! 5. Hand the named templates to the [`EmitHook`].

use std::sync::atomic::Ordering;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::delegate::DelegateTemplate;
use crate::emit::{EmitHook, EmittedKind, EmittedType};
use crate::generation::Generation;
use crate::naming::{shape_type_name, NameAndIndex};
use crate::persist::EmittedShapeMap;
use crate::shape::ShapeTemplate;
use crate::shape_key::ShapeKey;
use crate::SynthError;

/// Next unused indices. Never restarts at zero within a chain.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct NumberingState {
    pub next_shape_index: u32,
    pub next_delegate_index: u32,
}

impl NumberingState {
    pub fn new(next_shape_index: u32, next_delegate_index: u32) -> Self {
        NumberingState {
            next_shape_index,
            next_delegate_index,
        }
    }

    /// Component-wise maximum.
    #[must_use]
    pub fn max(self, other: NumberingState) -> NumberingState {
        NumberingState {
            next_shape_index: self.next_shape_index.max(other.next_shape_index),
            next_delegate_index: self.next_delegate_index.max(other.next_delegate_index),
        }
    }
}

/// State handed in from earlier outputs.
#[derive(Copy, Clone, Debug, Default)]
pub struct FinalizeInput<'a> {
    pub numbering: NumberingState,
    /// Identity map persisted by the previous output, if any.
    pub previous: Option<&'a EmittedShapeMap>,
}

impl<'a> FinalizeInput<'a> {
    #[must_use]
    pub fn with_numbering(mut self, numbering: NumberingState) -> Self {
        self.numbering = numbering;
        self
    }

    #[must_use]
    pub fn with_previous(mut self, previous: &'a EmittedShapeMap) -> Self {
        self.previous = Some(previous);
        self
    }
}

/// Result of finalizing one generation.
#[derive(Clone, Debug)]
pub struct FinalizeOutput {
    pub numbering: NumberingState,
    /// Identity map of every named shape visible in the generation.
    pub map: EmittedShapeMap,
    /// Number of types handed to the emit hook.
    pub emitted: usize,
}

impl Generation {
    /// Name, seal, and emit this generation's synthesized types.
    ///
    /// Numbering continues from the largest of `input.numbering`, the
    /// predecessor's final state, and the previous map's counters.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(generation = %self.id, module = %self.config.module_name)
    )]
    pub fn finalize(
        &self,
        input: FinalizeInput<'_>,
        hook: &mut dyn EmitHook,
    ) -> Result<FinalizeOutput, SynthError> {
        if self.finalizing.swap(true, Ordering::AcqRel) {
            return Err(SynthError::AlreadyFinalized {
                generation: self.id,
            });
        }

        let mut numbering = input.numbering;
        if let Some(state) = self.predecessor.as_ref().and_then(|p| p.numbering_after()) {
            numbering = numbering.max(state);
        }
        if let Some(previous) = input.previous {
            numbering = numbering.max(previous.numbering());
        }

        let carried = self.carry_forward(input.previous)?;
        self.name_shapes(&mut numbering)?;
        self.name_delegates(&mut numbering)?;

        self.shapes.seal();
        self.delegates.seal();

        let types = self.emitted_types(&carried);
        let emitted = types.len();
        tracing::debug!(emitted, carried = carried.len(), "handing templates to emit hook");
        hook.emit(types);

        let map = self.identity_map(input.previous, numbering);
        // `finalizing` admits one caller, so the cell is still empty here.
        let stored = self.finalized.set(numbering);
        debug_assert!(stored.is_ok(), "generation {} finalized twice", self.id);
        Ok(FinalizeOutput {
            numbering,
            map,
            emitted,
        })
    }

    /// Re-establish every identity recorded by the previous output.
    ///
    /// Returns the keys whose local templates received a carried identity.
    fn carry_forward(
        &self,
        previous: Option<&EmittedShapeMap>,
    ) -> Result<FxHashSet<ShapeKey>, SynthError> {
        let mut carried = FxHashSet::default();
        let Some(previous) = previous else {
            return Ok(carried);
        };
        for (key, identity) in previous.iter() {
            if let Some(inherited) = self.shapes.lookup_inherited(key) {
                // Owned by an ancestor; the recorded name must agree with it.
                inherited.assign_identity(identity.clone())?;
                continue;
            }
            let template = self.shapes.get_or_create(key, None)?;
            template.assign_identity(identity.clone())?;
            carried.insert(key.clone());
        }
        tracing::debug!(carried = carried.len(), "carried forward shape identities");
        Ok(carried)
    }

    fn name_shapes(&self, numbering: &mut NumberingState) -> Result<(), SynthError> {
        let mut unnamed: Vec<Arc<ShapeTemplate>> = self
            .shapes
            .local_entries()
            .into_iter()
            .filter(|template| template.identity().is_none())
            .collect();
        unnamed.sort_by(|a, b| a.finalization_order().cmp(&b.finalization_order()));

        let fragment = self.config.module_fragment();
        for template in unnamed {
            let index = numbering.next_shape_index;
            let name = shape_type_name(index, self.config.submission_slot, &fragment);
            tracing::debug!(key = %template.key(), %name, "named shape template");
            template.assign_identity(NameAndIndex::new(name, index))?;
            numbering.next_shape_index += 1;
        }
        Ok(())
    }

    fn name_delegates(&self, numbering: &mut NumberingState) -> Result<(), SynthError> {
        let mut unnamed: Vec<Arc<DelegateTemplate>> = self
            .delegates
            .local_entries()
            .into_iter()
            .filter(|template| template.identity().is_none())
            .collect();
        unnamed.sort_by(|a, b| a.name().cmp(b.name()));

        for template in unnamed {
            template.assign_identity(numbering.next_delegate_index)?;
            tracing::debug!(name = template.name(), "named delegate template");
            numbering.next_delegate_index += 1;
        }
        Ok(())
    }

    /// Named local templates: shapes by index, then delegates by index.
    fn emitted_types(&self, carried: &FxHashSet<ShapeKey>) -> Vec<EmittedType> {
        let mut shapes: Vec<(NameAndIndex, Arc<ShapeTemplate>)> = self
            .shapes
            .local_entries()
            .into_iter()
            .filter_map(|t| t.identity().cloned().map(|identity| (identity, t)))
            .collect();
        shapes.sort_by_key(|(identity, _)| identity.index);

        let mut delegates: Vec<(NameAndIndex, Arc<DelegateTemplate>)> = self
            .delegates
            .local_entries()
            .into_iter()
            .filter_map(|t| t.identity().cloned().map(|identity| (identity, t)))
            .collect();
        delegates.sort_by_key(|(identity, _)| identity.index);

        let shapes = shapes.into_iter().map(|(identity, template)| EmittedType {
            identity,
            kind: EmittedKind::Shape(template.key().clone()),
            type_params: template.type_params().to_vec(),
            members: template.members().to_vec(),
            is_new_definition: !carried.contains(template.key()),
        });
        let delegates = delegates.into_iter().map(|(identity, template)| EmittedType {
            identity,
            kind: EmittedKind::Delegate(template.key().clone()),
            type_params: template.type_params().to_vec(),
            members: template.members().to_vec(),
            is_new_definition: true,
        });
        shapes.chain(delegates).collect()
    }

    /// The previous map extended with every named shape along the chain.
    fn identity_map(
        &self,
        previous: Option<&EmittedShapeMap>,
        numbering: NumberingState,
    ) -> EmittedShapeMap {
        let mut map = previous.cloned().unwrap_or_default();
        for cache in self.shapes.chain() {
            for template in cache.local_entries() {
                if let Some(identity) = template.identity() {
                    map.insert(template.key().clone(), identity.clone());
                }
            }
        }
        map.set_numbering(numbering);
        map
    }
}
