//! Field descriptors of one shape construction site.
//!
//! [`DescriptorBuilder::build`] turns the `(explicit_name?, expression)` list
//! of a construction into one [`FieldDescriptor`] per entry, in order. Errors
//! are reported as diagnostics and never drop or reorder fields: an invalid
//! entry keeps its position under a placeholder name or the error type, so the
//! rest of the construction still binds.

use std::fmt;

use rustc_hash::FxHashMap;
use synth_diagnostic::{Diagnostic, ErrorCode};
use synth_ir::{FieldExpr, FieldInit, Name, SourceLocation, StringInterner, TypeId, TypePool};

use crate::shape_key::ShapeKey;

/// Syntactic context of a shape construction.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShapeContext {
    /// Ordinary function or method body.
    FunctionBody,
    /// Non-constant field or member initializer.
    MemberInitializer,
    /// Top-level code of an interactive or script unit.
    ScriptTopLevel,
    ConstantInitializer,
    AttributeArgument,
    ParameterDefault,
}

impl ShapeContext {
    pub fn allows_shapes(self) -> bool {
        matches!(
            self,
            ShapeContext::FunctionBody | ShapeContext::MemberInitializer | ShapeContext::ScriptTopLevel
        )
    }

    fn describe(self) -> &'static str {
        match self {
            ShapeContext::FunctionBody => "a function body",
            ShapeContext::MemberInitializer => "a member initializer",
            ShapeContext::ScriptTopLevel => "script top-level code",
            ShapeContext::ConstantInitializer => "a constant initializer",
            ShapeContext::AttributeArgument => "an attribute argument",
            ShapeContext::ParameterDefault => "a parameter default value",
        }
    }
}

/// Expressions the binder cannot give a static type on their own.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Typeless {
    Lambda,
    MethodGroup,
    NullLiteral,
}

impl Typeless {
    fn describe(self) -> &'static str {
        match self {
            Typeless::Lambda => "a lambda expression",
            Typeless::MethodGroup => "a method group",
            Typeless::NullLiteral => "`null`",
        }
    }
}

/// Outcome of binding a field initializer expression.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Binding {
    Typed(TypeId),
    Typeless(Typeless),
}

/// The binder collaborator that resolves initializer expressions.
pub trait ExprBinder {
    fn bind(&self, expr: &FieldExpr) -> Binding;
}

impl<F: Fn(&FieldExpr) -> Binding> ExprBinder for F {
    fn bind(&self, expr: &FieldExpr) -> Binding {
        self(expr)
    }
}

/// Name of a field: the source identifier, or a placeholder standing in for
/// a missing or duplicate one.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FieldName {
    Named(Name),
    /// `$ordinal`, which no source identifier can spell.
    Placeholder(u32),
}

impl FieldName {
    pub fn is_placeholder(self) -> bool {
        matches!(self, FieldName::Placeholder(_))
    }

    pub fn resolve(self, interner: &StringInterner) -> String {
        match self {
            FieldName::Named(name) => interner.lookup(name).to_string(),
            FieldName::Placeholder(ordinal) => format!("${ordinal}"),
        }
    }
}

/// One field of a shape, at the ordinal of its initializer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldDescriptor {
    pub name: FieldName,
    /// `TypeId::ERROR` when the initializer was rejected.
    pub ty: TypeId,
    pub location: SourceLocation,
    pub is_erroneous: bool,
}

/// Ordered field descriptors of one construction site.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShapeDescriptors {
    pub fields: Vec<FieldDescriptor>,
    pub has_error: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// The construction site.
    pub location: SourceLocation,
}

impl ShapeDescriptors {
    pub fn shape_key(&self, interner: &StringInterner) -> ShapeKey {
        ShapeKey::new(self.fields.iter().map(|field| field.name.resolve(interner)))
    }

    pub fn field_types(&self) -> Vec<TypeId> {
        self.fields.iter().map(|field| field.ty).collect()
    }
}

/// Builds [`ShapeDescriptors`] against one binder and type pool.
pub struct DescriptorBuilder<'a, B: ExprBinder> {
    interner: &'a StringInterner,
    types: &'a TypePool,
    binder: &'a B,
}

impl<'a, B: ExprBinder> DescriptorBuilder<'a, B> {
    pub fn new(interner: &'a StringInterner, types: &'a TypePool, binder: &'a B) -> Self {
        DescriptorBuilder {
            interner,
            types,
            binder,
        }
    }

    pub fn build(
        &self,
        context: ShapeContext,
        location: SourceLocation,
        inits: &[FieldInit],
    ) -> ShapeDescriptors {
        let mut diagnostics = Vec::new();
        let mut has_error = false;

        if !context.allows_shapes() {
            diagnostics.push(
                Diagnostic::error(ErrorCode::E2104)
                    .with_message(format!(
                        "anonymous shapes cannot be created in {}",
                        context.describe()
                    ))
                    .with_label(location, "shape constructed here"),
            );
            has_error = true;
        }

        let mut first_use: FxHashMap<Name, SourceLocation> = FxHashMap::default();
        let mut fields = Vec::with_capacity(inits.len());
        for (ordinal, init) in (0u32..).zip(inits) {
            let expr_location = init.expr.location;
            let (ty, mut is_erroneous) = self.bind_field(init, &mut diagnostics);

            let name = match init.candidate_name() {
                None => {
                    diagnostics.push(
                        Diagnostic::error(ErrorCode::E2105)
                            .with_message("cannot infer a field name from this expression")
                            .with_label(expr_location, "name this field explicitly")
                            .with_note("only identifiers and member accesses project a field name"),
                    );
                    is_erroneous = true;
                    FieldName::Placeholder(ordinal)
                }
                Some(name) => match first_use.get(&name) {
                    Some(first) => {
                        diagnostics.push(
                            Diagnostic::error(ErrorCode::E2101)
                                .with_message(format!(
                                    "field `{}` is declared more than once",
                                    self.interner.lookup(name)
                                ))
                                .with_label(expr_location, "duplicate field")
                                .with_secondary_label(*first, "first declared here"),
                        );
                        is_erroneous = true;
                        FieldName::Placeholder(ordinal)
                    }
                    None => {
                        first_use.insert(name, expr_location);
                        FieldName::Named(name)
                    }
                },
            };

            has_error |= is_erroneous;
            fields.push(FieldDescriptor {
                name,
                ty,
                location: expr_location,
                is_erroneous,
            });
        }

        tracing::trace!(
            fields = fields.len(),
            has_error,
            diagnostics = diagnostics.len(),
            "built shape descriptors"
        );
        ShapeDescriptors {
            fields,
            has_error,
            diagnostics,
            location,
        }
    }

    /// Bind one initializer, returning its field type and whether it failed.
    fn bind_field(&self, init: &FieldInit, diagnostics: &mut Vec<Diagnostic>) -> (TypeId, bool) {
        let location = init.expr.location;
        match self.binder.bind(&init.expr) {
            // Already reported where the error type was produced.
            Binding::Typed(ty) if ty.is_error() => (TypeId::ERROR, true),
            Binding::Typed(ty) if self.types.is_field_eligible(ty) => (ty, false),
            Binding::Typed(ty) => {
                diagnostics.push(
                    Diagnostic::error(ErrorCode::E2102)
                        .with_message(format!(
                            "a shape field cannot hold a value of type {}",
                            TypeDisplay(self.types, ty)
                        ))
                        .with_label(location, "invalid field type"),
                );
                (TypeId::ERROR, true)
            }
            Binding::Typeless(what) => {
                diagnostics.push(
                    Diagnostic::error(ErrorCode::E2103)
                        .with_message(format!("cannot assign {} to a shape field", what.describe()))
                        .with_label(location, "expression has no type"),
                );
                (TypeId::ERROR, true)
            }
        }
    }
}

/// Short description of a rejected field type.
struct TypeDisplay<'a>(&'a TypePool, TypeId);

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use synth_ir::TypeKind;
        match self.0.kind(self.1) {
            Some(TypeKind::Void) => f.write_str("`void`"),
            Some(TypeKind::Pointer(_)) => f.write_str("pointer"),
            Some(TypeKind::Restricted(_)) => f.write_str("restricted stack-only"),
            _ => write!(f, "#{}", self.1.raw()),
        }
    }
}

#[cfg(test)]
mod tests;
