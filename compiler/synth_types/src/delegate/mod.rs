//! Synthesized function-pointer shapes.
//!
//! Call sites whose signature has no canonical generic delegate (by-ref
//! parameters, or more parameters than the canonical family covers) get a
//! generic delegate template keyed by parameter count, by-ref pattern, and
//! void-ness.
//!
//! The template name is content-addressed: `Ac` (void) or `Fn` (value), the
//! by-ref bit-set as `{XXXXXXXX_...}` hex words when any bit is set, then
//! `` `arity``. The same key always yields the same name, independent of
//! creation order, so names are stable across recompilations.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::cache::CacheEntry;
use crate::emit::SynthesizedMember;
use crate::generation::GenerationId;
use crate::naming::{NameAndIndex, NameSlot};
use crate::SynthError;

/// Largest parameter count covered by the canonical delegate family.
pub const MAX_CANONICAL_PARAMS: usize = 16;

const WORD_BITS: usize = 32;

/// How a parameter is passed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ParamPassing {
    ByValue,
    ByRef,
}

/// Structural identity of a function-pointer shape.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct DelegateKey {
    parameter_count: usize,
    /// One bit per parameter, 32 per word, lowest parameter in the lowest bit.
    /// Always exactly `ceil(parameter_count / 32)` words.
    by_ref: SmallVec<[u32; 2]>,
    returns_void: bool,
}

impl DelegateKey {
    pub fn new(params: &[ParamPassing], returns_void: bool) -> Self {
        let mut by_ref: SmallVec<[u32; 2]> =
            SmallVec::from_elem(0, params.len().div_ceil(WORD_BITS));
        for (i, passing) in params.iter().enumerate() {
            if *passing == ParamPassing::ByRef {
                by_ref[i / WORD_BITS] |= 1 << (i % WORD_BITS);
            }
        }
        DelegateKey {
            parameter_count: params.len(),
            by_ref,
            returns_void,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn returns_void(&self) -> bool {
        self.returns_void
    }

    pub fn is_by_ref(&self, param: usize) -> bool {
        param < self.parameter_count && self.by_ref[param / WORD_BITS] & (1 << (param % WORD_BITS)) != 0
    }

    pub fn has_by_ref(&self) -> bool {
        self.by_ref.iter().any(|word| *word != 0)
    }

    /// Generic parameters: one per parameter, plus the result unless void.
    pub fn generic_arity(&self) -> usize {
        self.parameter_count + usize::from(!self.returns_void)
    }

    /// Whether the canonical delegate family already covers this signature,
    /// in which case nothing needs to be synthesized.
    pub fn has_canonical_form(&self) -> bool {
        !self.has_by_ref() && self.parameter_count <= MAX_CANONICAL_PARAMS
    }

    /// Content-addressed type name.
    pub fn type_name(&self) -> String {
        let mut name = String::from(if self.returns_void { "Ac" } else { "Fn" });
        if self.has_by_ref() {
            name.push('{');
            for (i, word) in self.by_ref.iter().enumerate() {
                if i > 0 {
                    name.push('_');
                }
                let _ = write!(name, "{word:08X}");
            }
            name.push('}');
        }
        let _ = write!(name, "`{}", self.generic_arity());
        name
    }
}

impl fmt::Debug for DelegateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DelegateKey({})", self.type_name())
    }
}

impl fmt::Display for DelegateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name())
    }
}

/// Generic function-pointer-shape definition.
pub struct DelegateTemplate {
    key: DelegateKey,
    name: Arc<str>,
    owner: GenerationId,
    type_params: Vec<Arc<str>>,
    members: Vec<SynthesizedMember>,
    identity: NameSlot,
}

impl DelegateTemplate {
    fn new(key: DelegateKey, owner: GenerationId) -> Self {
        let mut type_params: Vec<Arc<str>> = (1..=key.parameter_count)
            .map(|ordinal| Arc::from(format!("T{ordinal}")))
            .collect();
        if !key.returns_void {
            type_params.push(Arc::from("TResult"));
        }
        let members = vec![
            // Target object and function pointer.
            SynthesizedMember::Constructor { arity: 2 },
            SynthesizedMember::Invoke {
                by_ref: (0..key.parameter_count).map(|i| key.is_by_ref(i)).collect(),
                returns_void: key.returns_void,
            },
        ];
        DelegateTemplate {
            name: Arc::from(key.type_name()),
            key,
            owner,
            type_params,
            members,
            identity: NameSlot::default(),
        }
    }

    pub fn key(&self) -> &DelegateKey {
        &self.key
    }

    /// Content-addressed name, fixed at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> GenerationId {
        self.owner
    }

    pub fn type_params(&self) -> &[Arc<str>] {
        &self.type_params
    }

    pub fn members(&self) -> &[SynthesizedMember] {
        &self.members
    }

    pub fn identity(&self) -> Option<&NameAndIndex> {
        self.identity.get()
    }

    pub(crate) fn assign_identity(&self, index: u32) -> Result<bool, SynthError> {
        self.identity.assign(NameAndIndex::new(&*self.name, index), || {
            format!("delegate `{}`", self.name)
        })
    }
}

impl CacheEntry for DelegateTemplate {
    type Key = DelegateKey;
    const KIND: &'static str = "delegate";

    fn synthesize(key: &DelegateKey, owner: GenerationId) -> Self {
        DelegateTemplate::new(key.clone(), owner)
    }

    fn is_named(&self) -> bool {
        self.identity.get().is_some()
    }
}

impl fmt::Debug for DelegateTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateTemplate")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .field("identity", &self.identity.get())
            .finish_non_exhaustive()
    }
}
