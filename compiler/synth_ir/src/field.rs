//! Field initializer syntax of an anonymous shape construction.
//!
//! `new { x, p.y, total = a + b }` parses into three [`FieldInit`]s. The
//! expression shapes are reduced to what field-name inference and the
//! "no static type" rules need to see; everything else is `Other`.

use crate::{Name, SourceLocation};

/// Expression forms distinguished by shape construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldExprKind {
    /// Bare identifier reference: `x`.
    Ident(Name),
    /// Simple member access: `receiver.member`.
    Member { receiver: Box<FieldExpr>, member: Name },
    /// Lambda that has not been converted to a delegate type.
    Lambda,
    /// Reference to a method group without invocation.
    MethodGroup(Name),
    /// The `null` literal.
    NullLiteral,
    /// Any other expression; only its bound type matters.
    Other,
}

/// A field initializer expression with its location.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldExpr {
    pub kind: FieldExprKind,
    pub location: SourceLocation,
}

impl FieldExpr {
    pub fn new(kind: FieldExprKind, location: SourceLocation) -> Self {
        FieldExpr { kind, location }
    }

    /// The field name implied by the expression when none is written.
    ///
    /// Only identifiers and simple member accesses project a name.
    pub fn inferred_name(&self) -> Option<Name> {
        match &self.kind {
            FieldExprKind::Ident(name) => Some(*name),
            FieldExprKind::Member { member, .. } => Some(*member),
            FieldExprKind::Lambda
            | FieldExprKind::MethodGroup(_)
            | FieldExprKind::NullLiteral
            | FieldExprKind::Other => None,
        }
    }
}

/// One `(explicit_name?, expression)` entry of a shape construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldInit {
    pub explicit_name: Option<Name>,
    pub expr: FieldExpr,
}

impl FieldInit {
    pub fn named(name: Name, expr: FieldExpr) -> Self {
        FieldInit {
            explicit_name: Some(name),
            expr,
        }
    }

    pub fn projected(expr: FieldExpr) -> Self {
        FieldInit {
            explicit_name: None,
            expr,
        }
    }

    /// Explicit name, falling back to the inferred one.
    pub fn candidate_name(&self) -> Option<Name> {
        self.explicit_name.or_else(|| self.expr.inferred_name())
    }
}
