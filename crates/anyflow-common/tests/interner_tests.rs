use super::*;

#[test]
fn test_intern_deduplicates() {
    let interner = Interner::new();
    let a = interner.intern("Promise");
    let b = interner.intern("Promise");
    let c = interner.intern("Map");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(&*interner.resolve(a), "Promise");
}

#[test]
fn test_empty_string_is_none_atom() {
    let interner = Interner::new();
    assert_eq!(interner.intern(""), Atom::NONE);
    assert!(interner.is_empty());
}

#[test]
fn test_resolve_out_of_bounds_is_empty() {
    let interner = Interner::new();
    assert_eq!(&*interner.resolve(Atom(999)), "");
    assert!(interner.try_resolve(Atom(999)).is_none());
}

#[test]
fn test_intern_common_is_idempotent() {
    let interner = Interner::new();
    interner.intern_common();
    let len = interner.len();
    interner.intern_common();
    assert_eq!(interner.len(), len);
    assert_eq!(&*interner.resolve(interner.intern("Array")), "Array");
}

#[test]
fn test_span_helpers() {
    let span = Span::at(10, 5);
    assert_eq!(span.end, 15);
    assert_eq!(span.len(), 5);
    assert!(span.contains(10));
    assert!(!span.contains(15));
    assert!(Span::DUMMY.is_empty());
}
