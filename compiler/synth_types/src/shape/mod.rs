//! Shape templates and their instantiation.
//!
//! A template is the one generic definition shared by every shape with the
//! same [`ShapeKey`]: one generic parameter per field, a constructor, one
//! accessor per field, equality, hashing, and display. Use sites substitute
//! their concrete field types with [`instantiate`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;
use synth_ir::{SourceLocation, TypeId};

use crate::cache::CacheEntry;
use crate::emit::SynthesizedMember;
use crate::generation::GenerationId;
use crate::naming::{NameAndIndex, NameSlot};
use crate::shape_key::ShapeKey;
use crate::SynthError;

/// Stored in place of a location until the first use site is recorded.
const NO_LOCATION: u64 = u64::MAX;

/// The generic definition shared by all shapes with one key.
pub struct ShapeTemplate {
    key: ShapeKey,
    owner: GenerationId,
    type_params: Vec<Arc<str>>,
    members: Vec<SynthesizedMember>,
    /// Packed `SourceLocation::order_key` of the earliest use site.
    smallest_location: AtomicU64,
    identity: NameSlot,
}

impl ShapeTemplate {
    pub(crate) fn new(key: ShapeKey, owner: GenerationId) -> Self {
        let arity = key.field_count();
        let type_params = (0..arity)
            .map(|ordinal| Arc::from(format!("T{ordinal}")))
            .collect();

        let mut members = Vec::with_capacity(arity + 4);
        members.push(SynthesizedMember::Constructor { arity });
        members.extend(key.fields().iter().enumerate().map(|(ordinal, name)| {
            SynthesizedMember::Accessor {
                name: Arc::clone(name),
                ordinal,
            }
        }));
        members.extend([
            SynthesizedMember::Equals,
            SynthesizedMember::HashCode,
            SynthesizedMember::Display,
        ]);

        ShapeTemplate {
            key,
            owner,
            type_params,
            members,
            smallest_location: AtomicU64::new(NO_LOCATION),
            identity: NameSlot::default(),
        }
    }

    pub fn key(&self) -> &ShapeKey {
        &self.key
    }

    /// Generation that created this template.
    pub fn owner(&self) -> GenerationId {
        self.owner
    }

    pub fn arity(&self) -> usize {
        self.type_params.len()
    }

    /// Zero-field shapes are a non-generic specialization.
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    pub fn type_params(&self) -> &[Arc<str>] {
        &self.type_params
    }

    pub fn members(&self) -> &[SynthesizedMember] {
        &self.members
    }

    pub fn accessor_count(&self) -> usize {
        self.members
            .iter()
            .filter(|member| matches!(member, SynthesizedMember::Accessor { .. }))
            .count()
    }

    /// Ordering key of the earliest recorded use site; `None` for templates
    /// that were only ever synthesized without a location.
    pub fn smallest_location_key(&self) -> Option<u64> {
        match self.smallest_location.load(Ordering::Acquire) {
            NO_LOCATION => None,
            key => Some(key),
        }
    }

    pub fn identity(&self) -> Option<&NameAndIndex> {
        self.identity.get()
    }

    pub(crate) fn assign_identity(&self, identity: NameAndIndex) -> Result<bool, SynthError> {
        self.identity
            .assign(identity, || format!("shape `{}`", self.key))
    }

    /// Sort key used by finalization: earliest use site, then canonical key.
    pub(crate) fn finalization_order(&self) -> (Option<u64>, &str) {
        (self.smallest_location_key(), self.key.canonical())
    }
}

impl CacheEntry for ShapeTemplate {
    type Key = ShapeKey;
    const KIND: &'static str = "shape";

    fn synthesize(key: &ShapeKey, owner: GenerationId) -> Self {
        ShapeTemplate::new(key.clone(), owner)
    }

    fn note_use(&self, location: SourceLocation) {
        // `fetch_min` is atomic, so concurrent updates commute and none is lost.
        self.smallest_location
            .fetch_min(location.order_key(), Ordering::AcqRel);
    }

    fn is_named(&self) -> bool {
        self.identity.get().is_some()
    }
}

impl fmt::Debug for ShapeTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeTemplate")
            .field("key", &self.key)
            .field("owner", &self.owner)
            .field("identity", &self.identity.get())
            .field("smallest_location", &self.smallest_location_key())
            .finish_non_exhaustive()
    }
}

/// A shape template applied to concrete field types.
#[derive(Clone, Debug)]
pub struct ConstructedType {
    template: Arc<ShapeTemplate>,
    type_args: SmallVec<[TypeId; 4]>,
}

impl ConstructedType {
    pub fn template(&self) -> &Arc<ShapeTemplate> {
        &self.template
    }

    pub fn type_args(&self) -> &[TypeId] {
        &self.type_args
    }

    /// Whether this is the template itself (zero-field shapes).
    pub fn is_definition(&self) -> bool {
        self.type_args.is_empty()
    }

    /// Concrete type of the named field.
    pub fn field_type(&self, name: &str) -> Option<TypeId> {
        self.template
            .key()
            .position(name)
            .map(|ordinal| self.type_args[ordinal])
    }

    /// `(field name, concrete type)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, TypeId)> + '_ {
        self.template
            .key()
            .fields()
            .iter()
            .map(|name| &**name)
            .zip(self.type_args.iter().copied())
    }
}

impl PartialEq for ConstructedType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.template, &other.template) && self.type_args == other.type_args
    }
}

impl Eq for ConstructedType {}

/// Substitute `type_args` positionally into `template`.
///
/// A zero-field template takes no arguments and comes back unchanged.
pub fn instantiate(
    template: &Arc<ShapeTemplate>,
    type_args: &[TypeId],
) -> Result<ConstructedType, SynthError> {
    if type_args.len() != template.arity() {
        return Err(SynthError::ArityMismatch {
            key: template.key().to_string(),
            expected: template.arity(),
            found: type_args.len(),
        });
    }
    Ok(ConstructedType {
        template: Arc::clone(template),
        type_args: SmallVec::from_slice(type_args),
    })
}

#[cfg(test)]
mod tests;
