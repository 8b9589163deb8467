//! Resolved types as seen by the synthesis engine.
//!
//! The full type model lives in the type checker. The engine only needs to
//! tell field-eligible types apart from `void`, pointers, and stack-only types,
//! and to carry opaque type ids through instantiation. [`TypePool`] interns the
//! subset of type structure that matters for that.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

use crate::Name;

/// Interned type identifier.
///
/// Primitives have fixed indices; compound types are interned on first use.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const INT: TypeId = TypeId(0);
    pub const FLOAT: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const STR: TypeId = TypeId(3);
    pub const CHAR: TypeId = TypeId(4);
    pub const VOID: TypeId = TypeId(5);
    /// Stands in for a type that failed to resolve; already diagnosed.
    pub const ERROR: TypeId = TypeId(6);

    /// First index for compound types.
    pub const FIRST_COMPOUND: u32 = 7;

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_primitive(self) -> bool {
        self.0 < Self::FIRST_COMPOUND
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INT => write!(f, "TypeId::INT"),
            Self::FLOAT => write!(f, "TypeId::FLOAT"),
            Self::BOOL => write!(f, "TypeId::BOOL"),
            Self::STR => write!(f, "TypeId::STR"),
            Self::CHAR => write!(f, "TypeId::CHAR"),
            Self::VOID => write!(f, "TypeId::VOID"),
            Self::ERROR => write!(f, "TypeId::ERROR"),
            _ => write!(f, "TypeId({})", self.0),
        }
    }
}

/// Structure of a type, as far as field eligibility is concerned.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    Int,
    Float,
    Bool,
    Str,
    Char,
    Void,
    Error,

    /// Raw pointer to another type (unsafe code only).
    Pointer(TypeId),

    /// Stack-only type that may never be boxed or stored in a heap object.
    Restricted(Name),

    /// Named nominal type with type arguments.
    Named { name: Name, args: Vec<TypeId> },

    /// List type: [T]
    List(TypeId),

    /// Function type: (params) -> ret
    Function { params: Vec<TypeId>, ret: TypeId },
}

impl TypeKind {
    /// Whether a value of this type may be stored in a synthesized record field.
    pub fn is_field_eligible(&self) -> bool {
        !matches!(
            self,
            TypeKind::Void | TypeKind::Pointer(_) | TypeKind::Restricted(_)
        )
    }
}

/// Concurrent type interner.
pub struct TypePool {
    type_to_id: DashMap<TypeKind, TypeId, FxBuildHasher>,
    id_to_type: DashMap<u32, TypeKind, FxBuildHasher>,
    next_id: AtomicU32,
}

impl TypePool {
    pub fn new() -> Self {
        let pool = Self {
            type_to_id: DashMap::with_hasher(FxBuildHasher),
            id_to_type: DashMap::with_hasher(FxBuildHasher),
            next_id: AtomicU32::new(TypeId::FIRST_COMPOUND),
        };
        let primitives = [
            (TypeId::INT, TypeKind::Int),
            (TypeId::FLOAT, TypeKind::Float),
            (TypeId::BOOL, TypeKind::Bool),
            (TypeId::STR, TypeKind::Str),
            (TypeId::CHAR, TypeKind::Char),
            (TypeId::VOID, TypeKind::Void),
            (TypeId::ERROR, TypeKind::Error),
        ];
        for (id, kind) in primitives {
            pool.type_to_id.insert(kind.clone(), id);
            pool.id_to_type.insert(id.raw(), kind);
        }
        pool
    }

    /// Intern a type, returning its id.
    pub fn intern(&self, kind: TypeKind) -> TypeId {
        if let Some(id) = self.type_to_id.get(&kind) {
            return *id;
        }
        // The entry guard keeps the id allocation and both inserts atomic
        // with respect to other interners of the same kind.
        *self
            .type_to_id
            .entry(kind.clone())
            .or_insert_with(|| {
                let id = TypeId(self.next_id.fetch_add(1, Ordering::Relaxed));
                self.id_to_type.insert(id.raw(), kind);
                id
            })
            .value()
    }

    /// Look up a type by id.
    pub fn kind(&self, id: TypeId) -> Option<TypeKind> {
        self.id_to_type.get(&id.raw()).map(|r| r.clone())
    }

    pub fn pointer_to(&self, pointee: TypeId) -> TypeId {
        self.intern(TypeKind::Pointer(pointee))
    }

    pub fn restricted(&self, name: Name) -> TypeId {
        self.intern(TypeKind::Restricted(name))
    }

    pub fn named(&self, name: Name, args: Vec<TypeId>) -> TypeId {
        self.intern(TypeKind::Named { name, args })
    }

    pub fn list(&self, elem: TypeId) -> TypeId {
        self.intern(TypeKind::List(elem))
    }

    pub fn function(&self, params: Vec<TypeId>, ret: TypeId) -> TypeId {
        self.intern(TypeKind::Function { params, ret })
    }

    /// Whether `id` may be stored in a synthesized record field.
    ///
    /// Unknown ids are treated as eligible; the binder owns their validity.
    pub fn is_field_eligible(&self, id: TypeId) -> bool {
        self.kind(id).map_or(true, |kind| kind.is_field_eligible())
    }

    pub fn len(&self) -> usize {
        self.id_to_type.len()
    }

    /// Check if only primitives are interned.
    pub fn is_empty(&self) -> bool {
        self.len() <= TypeId::FIRST_COMPOUND as usize
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}
