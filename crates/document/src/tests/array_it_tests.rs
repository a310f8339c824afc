use crate::array_it::Element;
use crate::document::Document;
use crate::key::KeyKind;
use colbin_field::FieldType;

#[test]
fn fresh_document_array_is_empty() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut it = doc.iterator_open().unwrap();
    assert!(!it.has_next().unwrap());
    assert_eq!(it.field_type().unwrap(), FieldType::ArrayEnd);
}

#[test]
fn push_scalars_and_walk_them_back() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut it = doc.iterator_open().unwrap();
    it.insert_u32(7).unwrap();
    it.insert_string("hi").unwrap();
    it.insert_bool(true).unwrap();
    it.insert_null().unwrap();

    let mut it = doc.iterator_open().unwrap();
    it.rewind().unwrap();
    assert!(matches!(it.current().unwrap(), Element::U32(7)));
    assert!(it.next().unwrap());
    match it.current().unwrap() {
        Element::Str(s) => assert_eq!(s, "hi"),
        _ => panic!("expected string"),
    }
    assert!(it.next().unwrap());
    assert!(matches!(it.current().unwrap(), Element::Bool(true)));
    assert!(it.next().unwrap());
    assert!(matches!(it.current().unwrap(), Element::Null));
    assert!(!it.next().unwrap());
}

#[test]
fn remove_element_shifts_tail_left() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut it = doc.iterator_open().unwrap();
    it.insert_u8(1).unwrap();
    it.insert_u8(2).unwrap();
    it.insert_u8(3).unwrap();

    let mut it = doc.iterator_open().unwrap();
    it.rewind().unwrap();
    assert!(it.next().unwrap()); // now on element 2
    it.remove().unwrap();

    let mut it = doc.iterator_open().unwrap();
    it.rewind().unwrap();
    assert!(matches!(it.current().unwrap(), Element::U8(1)));
    assert!(it.next().unwrap());
    assert!(matches!(it.current().unwrap(), Element::U8(3)));
    assert!(!it.next().unwrap());
}

#[test]
fn nested_array_round_trips() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut outer = doc.iterator_open().unwrap();
    outer.insert_array().unwrap();
    {
        let mut inner = outer.open_nested_array().unwrap();
        inner.insert_u16(100).unwrap();
        inner.insert_u16(200).unwrap();
    }

    let mut outer = doc.iterator_open().unwrap();
    outer.rewind().unwrap();
    assert_eq!(outer.field_type().unwrap(), FieldType::Array);
    let mut inner = outer.open_nested_array().unwrap();
    inner.rewind().unwrap();
    assert!(matches!(inner.current().unwrap(), Element::U16(100)));
    assert!(inner.next().unwrap());
    assert!(matches!(inner.current().unwrap(), Element::U16(200)));
    assert!(!inner.next().unwrap());
}

#[test]
fn binary_element_round_trips() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut it = doc.iterator_open().unwrap();
    it.insert_binary(7, b"blob").unwrap();

    let mut it = doc.iterator_open().unwrap();
    it.rewind().unwrap();
    match it.current().unwrap() {
        Element::Binary { mime, bytes } => {
            assert_eq!(mime, 7);
            assert_eq!(bytes, b"blob");
        }
        _ => panic!("expected binary"),
    }
}
