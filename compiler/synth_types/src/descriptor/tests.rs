use pretty_assertions::assert_eq;
use synth_ir::{FieldExprKind, FileId, Span};

use super::*;

fn loc(offset: u32) -> SourceLocation {
    SourceLocation::new(FileId::new(0), Span::new(offset, offset + 1))
}

/// Binds every expression by the start offset of its location.
fn by_offset(table: &[(u32, Binding)]) -> impl Fn(&FieldExpr) -> Binding + '_ {
    move |expr: &FieldExpr| {
        table
            .iter()
            .find(|(offset, _)| *offset == expr.location.span.start)
            .map_or(Binding::Typed(TypeId::INT), |(_, binding)| *binding)
    }
}

fn ident(interner: &StringInterner, name: &str, offset: u32) -> FieldExpr {
    FieldExpr::new(FieldExprKind::Ident(interner.intern(name)), loc(offset))
}

fn other(offset: u32) -> FieldExpr {
    FieldExpr::new(FieldExprKind::Other, loc(offset))
}

fn codes(descriptors: &ShapeDescriptors) -> Vec<ErrorCode> {
    descriptors.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn test_duplicate_name_becomes_placeholder() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let binder = by_offset(&[]);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);
    let a = interner.intern("a");

    let shape = builder.build(
        ShapeContext::FunctionBody,
        loc(0),
        &[FieldInit::named(a, other(10)), FieldInit::named(a, other(20))],
    );

    assert_eq!(shape.fields.len(), 2);
    assert_eq!(shape.fields[0].name, FieldName::Named(a));
    assert!(!shape.fields[0].is_erroneous);
    assert_eq!(shape.fields[1].name, FieldName::Placeholder(1));
    assert!(shape.fields[1].is_erroneous);
    assert!(shape.has_error);
    assert_eq!(codes(&shape), vec![ErrorCode::E2101]);
    assert_eq!(shape.diagnostics[0].primary_location(), Some(loc(20)));
    assert_eq!(shape.shape_key(&interner).canonical(), "|a|$1");
}

#[test]
fn test_names_inferred_from_identifiers_and_members() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let table = [(5, Binding::Typed(TypeId::STR))];
    let binder = by_offset(&table);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);
    let member = FieldExpr::new(
        FieldExprKind::Member {
            receiver: Box::new(ident(&interner, "p", 4)),
            member: interner.intern("name"),
        },
        loc(5),
    );

    let shape = builder.build(
        ShapeContext::FunctionBody,
        loc(0),
        &[FieldInit::projected(ident(&interner, "x", 1)), FieldInit::projected(member)],
    );

    assert!(!shape.has_error);
    assert!(shape.diagnostics.is_empty());
    assert_eq!(shape.shape_key(&interner).canonical(), "|x|name");
    assert_eq!(shape.field_types(), vec![TypeId::INT, TypeId::STR]);
}

#[test]
fn test_unnamed_expression_reports_missing_name() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let binder = by_offset(&[]);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);

    let shape = builder.build(ShapeContext::FunctionBody, loc(0), &[FieldInit::projected(other(3))]);

    assert_eq!(shape.fields[0].name, FieldName::Placeholder(0));
    assert_eq!(shape.fields[0].ty, TypeId::INT);
    assert_eq!(codes(&shape), vec![ErrorCode::E2105]);
}

#[test]
fn test_ineligible_types_rejected_in_place() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let pointer = types.pointer_to(TypeId::INT);
    let span_like = types.restricted(interner.intern("SpanRef"));
    let table = [
        (1, Binding::Typed(TypeId::VOID)),
        (2, Binding::Typed(pointer)),
        (3, Binding::Typed(TypeId::BOOL)),
        (4, Binding::Typed(span_like)),
    ];
    let binder = by_offset(&table);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);
    let inits: Vec<FieldInit> = ["a", "b", "c", "d"]
        .iter()
        .zip(1..)
        .map(|(name, offset)| FieldInit::named(interner.intern(name), other(offset)))
        .collect();

    let shape = builder.build(ShapeContext::FunctionBody, loc(0), &inits);

    assert_eq!(
        shape.field_types(),
        vec![TypeId::ERROR, TypeId::ERROR, TypeId::BOOL, TypeId::ERROR]
    );
    assert_eq!(codes(&shape), vec![ErrorCode::E2102; 3]);
    assert_eq!(shape.shape_key(&interner).canonical(), "|a|b|c|d");
    assert!(shape.diagnostics[0].message.contains("`void`"));
}

#[test]
fn test_typeless_expressions_rejected() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let table = [
        (1, Binding::Typeless(Typeless::Lambda)),
        (2, Binding::Typeless(Typeless::NullLiteral)),
    ];
    let binder = by_offset(&table);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);
    let f = interner.intern("f");
    let n = interner.intern("n");

    let shape = builder.build(
        ShapeContext::MemberInitializer,
        loc(0),
        &[
            FieldInit::named(f, FieldExpr::new(FieldExprKind::Lambda, loc(1))),
            FieldInit::named(n, FieldExpr::new(FieldExprKind::NullLiteral, loc(2))),
        ],
    );

    assert_eq!(codes(&shape), vec![ErrorCode::E2103, ErrorCode::E2103]);
    assert!(shape.fields.iter().all(|field| field.is_erroneous));
    assert!(shape.diagnostics[1].message.contains("`null`"));
}

#[test]
fn test_error_type_flags_without_new_diagnostic() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let table = [(1, Binding::Typed(TypeId::ERROR))];
    let binder = by_offset(&table);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);

    let shape = builder.build(
        ShapeContext::FunctionBody,
        loc(0),
        &[FieldInit::named(interner.intern("a"), other(1))],
    );

    assert!(shape.has_error);
    assert!(shape.fields[0].is_erroneous);
    assert_eq!(shape.fields[0].name, FieldName::Named(interner.intern("a")));
    assert!(shape.diagnostics.is_empty());
}

#[test]
fn test_illegal_context_keeps_building() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let binder = by_offset(&[]);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);
    let a = interner.intern("a");

    for context in [
        ShapeContext::ConstantInitializer,
        ShapeContext::AttributeArgument,
        ShapeContext::ParameterDefault,
    ] {
        let shape = builder.build(
            context,
            loc(0),
            &[FieldInit::named(a, other(1)), FieldInit::named(a, other(2))],
        );
        assert_eq!(codes(&shape), vec![ErrorCode::E2104, ErrorCode::E2101]);
        assert_eq!(shape.fields.len(), 2);
        assert_eq!(shape.diagnostics[0].primary_location(), Some(loc(0)));
    }
}

#[test]
fn test_legal_contexts() {
    assert!(ShapeContext::FunctionBody.allows_shapes());
    assert!(ShapeContext::MemberInitializer.allows_shapes());
    assert!(ShapeContext::ScriptTopLevel.allows_shapes());
    assert!(!ShapeContext::ConstantInitializer.allows_shapes());
}

#[test]
fn test_zero_fields() {
    let interner = StringInterner::new();
    let types = TypePool::new();
    let binder = by_offset(&[]);
    let builder = DescriptorBuilder::new(&interner, &types, &binder);

    let shape = builder.build(ShapeContext::ScriptTopLevel, loc(0), &[]);
    assert!(shape.fields.is_empty());
    assert!(!shape.has_error);
    assert!(shape.shape_key(&interner).is_empty());
}
