//! Hand-off of named templates to the method-body compiler.
//!
//! Finalization calls [`EmitHook::emit`] exactly once with every named
//! template owned by the generation, shapes first (by index) and delegates
//! after (by index). Body generation happens on the other side of the hook.

use std::sync::Arc;

use crate::delegate::DelegateKey;
use crate::naming::NameAndIndex;
use crate::shape_key::ShapeKey;

/// A member the method-body compiler must generate.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum SynthesizedMember {
    /// Constructor taking one argument per generic parameter it initializes.
    Constructor { arity: usize },
    /// Read-only accessor of field `ordinal`, typed by generic parameter `ordinal`.
    Accessor { name: Arc<str>, ordinal: usize },
    /// Structural equality over all fields.
    Equals,
    /// Hash combining all fields.
    HashCode,
    /// Display form listing field names and values.
    Display,
    /// Delegate invocation; `by_ref[i]` marks parameter `i` as passed by reference.
    Invoke { by_ref: Vec<bool>, returns_void: bool },
}

/// What kind of definition an emitted type is.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EmittedKind {
    Shape(ShapeKey),
    Delegate(DelegateKey),
}

/// One named template ready for body generation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmittedType {
    pub identity: NameAndIndex,
    pub kind: EmittedKind,
    /// Generic parameter names, in declaration order.
    pub type_params: Vec<Arc<str>>,
    pub members: Vec<SynthesizedMember>,
    /// False when the identity was carried forward from an earlier generation
    /// whose output already defines the type.
    pub is_new_definition: bool,
}

/// Receiver of the finalized template list.
pub trait EmitHook {
    fn emit(&mut self, types: Vec<EmittedType>);
}

impl<F: FnMut(Vec<EmittedType>)> EmitHook for F {
    fn emit(&mut self, types: Vec<EmittedType>) {
        self(types);
    }
}
