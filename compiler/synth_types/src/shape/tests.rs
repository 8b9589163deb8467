use pretty_assertions::assert_eq;
use synth_ir::{FileId, Span};

use super::*;

fn template(names: &[&str]) -> Arc<ShapeTemplate> {
    Arc::new(ShapeTemplate::new(
        ShapeKey::new(names.iter().copied()),
        GenerationId::ROOT,
    ))
}

fn at(file: u32, offset: u32) -> SourceLocation {
    SourceLocation::new(FileId::new(file), Span::new(offset, offset + 2))
}

#[test]
fn test_members_follow_fields() {
    let t = template(&["x", "y"]);
    assert!(t.is_generic());
    assert_eq!(t.arity(), 2);
    assert_eq!(&*t.type_params()[1], "T1");
    assert_eq!(
        t.members(),
        &[
            SynthesizedMember::Constructor { arity: 2 },
            SynthesizedMember::Accessor {
                name: Arc::from("x"),
                ordinal: 0
            },
            SynthesizedMember::Accessor {
                name: Arc::from("y"),
                ordinal: 1
            },
            SynthesizedMember::Equals,
            SynthesizedMember::HashCode,
            SynthesizedMember::Display,
        ]
    );
}

#[test]
fn test_zero_field_template_is_not_generic() {
    let t = template(&[]);
    assert!(!t.is_generic());
    assert_eq!(t.accessor_count(), 0);
    assert_eq!(t.members().len(), 4);

    let constructed = instantiate(&t, &[]).unwrap_or_else(|e| panic!("{e}"));
    assert!(constructed.is_definition());
    assert!(Arc::ptr_eq(constructed.template(), &t));
}

#[test]
fn test_instantiate_substitutes_positionally() {
    let t = template(&["name", "age"]);
    let constructed =
        instantiate(&t, &[TypeId::STR, TypeId::INT]).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(constructed.field_type("age"), Some(TypeId::INT));
    assert_eq!(constructed.field_type("missing"), None);
    assert_eq!(
        constructed.fields().collect::<Vec<_>>(),
        vec![("name", TypeId::STR), ("age", TypeId::INT)]
    );

    let other = instantiate(&t, &[TypeId::STR, TypeId::BOOL]).unwrap_or_else(|e| panic!("{e}"));
    assert_ne!(constructed, other);
    assert!(Arc::ptr_eq(constructed.template(), other.template()));
}

#[test]
fn test_instantiate_rejects_wrong_arity() {
    let t = template(&["a"]);
    match instantiate(&t, &[TypeId::INT, TypeId::INT]) {
        Err(SynthError::ArityMismatch {
            key,
            expected,
            found,
        }) => {
            assert_eq!(key, "|a");
            assert_eq!((expected, found), (1, 2));
        }
        other => panic!("expected ArityMismatch, got {other:?}"),
    }
}

#[test]
fn test_location_tracks_earliest_use() {
    let t = template(&["a"]);
    assert_eq!(t.smallest_location_key(), None);
    t.note_use(at(1, 30));
    t.note_use(at(2, 0));
    t.note_use(at(1, 8));
    assert_eq!(t.smallest_location_key(), Some(at(1, 8).order_key()));
}

#[test]
fn test_identity_assigned_once() {
    let t = template(&["a"]);
    assert!(t.identity().is_none());
    let id = NameAndIndex::new("<m>f__Shape0", 0);
    assert!(matches!(t.assign_identity(id.clone()), Ok(true)));
    assert!(matches!(t.assign_identity(id), Ok(false)));
    assert!(matches!(
        t.assign_identity(NameAndIndex::new("<m>f__Shape1", 1)),
        Err(SynthError::NameReassignmentConflict { .. })
    ));
}
