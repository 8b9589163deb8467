use super::*;

#[test]
fn test_span_basic() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(Span::DUMMY.is_empty());
}

#[test]
fn test_span_merge() {
    let merged = Span::new(10, 20).merge(Span::new(15, 30));
    assert_eq!(merged, Span::new(10, 30));
}

#[test]
fn test_span_orders_by_start_first() {
    assert!(Span::new(3, 100) < Span::new(4, 5));
    assert!(Span::new(3, 4) < Span::new(3, 5));
}

#[test]
fn test_span_debug_display() {
    let span = Span::new(100, 200);
    assert_eq!(format!("{span:?}"), "100..200");
    assert_eq!(format!("{span}"), "100..200");
}
