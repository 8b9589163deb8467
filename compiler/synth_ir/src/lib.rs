//! Shared IR primitives for the shape synthesis engine.
//!
//! Everything here is consumed by both the binder-side descriptor builder and
//! the synthesis caches:
//!
//! - [`Span`], [`FileId`], [`SourceLocation`]: where a shape was requested
//! - [`Name`], [`StringInterner`]: interned field identifiers
//! - [`TypeId`], [`TypeKind`], [`TypePool`]: resolved field types
//! - [`FieldInit`], [`FieldExpr`]: field initializer syntax handed over by the parser

mod field;
mod interner;
mod location;
mod name;
mod span;
mod ty;

pub use field::{FieldExpr, FieldExprKind, FieldInit};
pub use interner::{InternError, StringInterner};
pub use location::{FileId, SourceLocation};
pub use name::Name;
pub use span::Span;
pub use ty::{TypeId, TypeKind, TypePool};
