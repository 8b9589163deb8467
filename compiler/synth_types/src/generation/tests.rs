use pretty_assertions::assert_eq;
use synth_ir::{FileId, Span};

use super::*;
use crate::config::EmitMode;
use crate::emit::EmittedType;
use crate::finalize::FinalizeInput;

fn key(names: &[&str]) -> ShapeKey {
    ShapeKey::new(names.iter().copied())
}

fn at(offset: u32) -> Option<SourceLocation> {
    Some(SourceLocation::new(FileId::new(0), Span::new(offset, offset + 1)))
}

fn finalize(generation: &Generation) -> NumberingState {
    let mut sink = |_: Vec<EmittedType>| {};
    generation
        .finalize(FinalizeInput::default(), &mut sink)
        .unwrap_or_else(|e| panic!("{e}"))
        .numbering
}

#[test]
fn test_generation_ids_count_up() {
    assert_eq!(GenerationId::ROOT.raw(), 0);
    assert_eq!(GenerationId::ROOT.next().next().raw(), 2);
    assert_eq!(GenerationId::ROOT.next().to_string(), "G1");
}

#[test]
fn test_shapes_share_template_across_types() {
    let generation = Generation::root(GenerationConfig::default());
    let ints = generation
        .construct_shape(&key(&["a"]), &[TypeId::INT], at(1))
        .unwrap_or_else(|e| panic!("{e}"));
    let strs = generation
        .construct_shape(&key(&["a"]), &[TypeId::STR], at(9))
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(Arc::ptr_eq(ints.template(), strs.template()));
    assert_eq!(generation.local_shape_count(), 1);
    assert_eq!(ints.template().smallest_location_key(), at(1).map(SourceLocation::order_key));
}

#[test]
fn test_field_order_distinguishes_shapes() {
    let generation = Generation::root(GenerationConfig::default());
    let ab = generation
        .shape_template(&key(&["a", "b"]), None)
        .unwrap_or_else(|e| panic!("{e}"));
    let ba = generation
        .shape_template(&key(&["b", "a"]), None)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(!Arc::ptr_eq(&ab, &ba));
}

#[test]
fn test_derive_requires_finalized_predecessor() {
    let root = Generation::root(GenerationConfig::default());
    match Generation::derive(&root, GenerationConfig::default()) {
        Err(SynthError::UnfinalizedPredecessor { generation }) => {
            assert_eq!(generation, GenerationId::ROOT);
        }
        other => panic!("expected UnfinalizedPredecessor, got {other:?}"),
    }
}

#[test]
fn test_derived_generation_inherits_templates() {
    let root = Generation::root(GenerationConfig::default());
    let inherited = root
        .shape_template(&key(&["x"]), at(3))
        .unwrap_or_else(|e| panic!("{e}"));
    finalize(&root);

    let next = Generation::derive(&root, GenerationConfig::default()).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(next.id(), GenerationId::ROOT.next());
    let reused = next
        .shape_template(&key(&["x"]), at(0))
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(Arc::ptr_eq(&inherited, &reused));
    assert_eq!(reused.owner(), GenerationId::ROOT);
    assert_eq!(next.local_shape_count(), 0);
    // Inherited templates keep the location they were named with.
    assert_eq!(reused.smallest_location_key(), at(3).map(SourceLocation::order_key));
}

#[test]
fn test_sealed_generation_rejects_new_keys() {
    let generation = Generation::root(GenerationConfig::default());
    let _ = generation.shape_template(&key(&["a"]), at(1));
    finalize(&generation);
    assert!(generation.is_sealed());

    assert!(generation.shape_template(&key(&["a"]), at(1)).is_ok());
    match generation.shape_template(&key(&["b"]), at(2)) {
        Err(SynthError::InsertAfterSeal { kind, key }) => {
            assert_eq!(kind, "shape");
            assert_eq!(key, "|b");
        }
        other => panic!("expected InsertAfterSeal, got {other:?}"),
    }
}

#[test]
fn test_metadata_only_never_seals() {
    let config = GenerationConfig::default().with_emit_mode(EmitMode::MetadataOnly);
    let generation = Generation::root(config);
    finalize(&generation);
    assert!(generation.is_finalized());
    assert!(!generation.is_sealed());
    assert!(generation.shape_template(&key(&["late"]), None).is_ok());
}

#[test]
fn test_canonical_signatures_need_no_delegate() {
    let generation = Generation::root(GenerationConfig::default());
    let canonical = generation
        .delegate_for_signature(&[ParamPassing::ByValue; 3], false, None)
        .unwrap_or_else(|e| panic!("{e}"));
    assert!(canonical.is_none());

    let synthesized = generation
        .delegate_for_signature(&[ParamPassing::ByRef], true, at(4))
        .unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(synthesized.map(|d| d.name().to_owned()), Some("Ac{00000001}`1".to_owned()));
    assert_eq!(generation.local_delegate_count(), 1);
}

#[test]
fn test_lookup_does_not_create() {
    let generation = Generation::root(GenerationConfig::default());
    assert!(generation.lookup_shape(&key(&["a"])).is_none());
    assert_eq!(generation.local_shape_count(), 0);
    let _ = generation.shape_template(&key(&["a"]), None);
    assert!(generation.lookup_shape(&key(&["a"])).is_some());
}
