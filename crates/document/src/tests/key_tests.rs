use crate::document::Document;
use crate::key::{generate_object_id, KeyKind, KeyValue};

#[test]
fn auto_key_document_starts_at_revision_zero() {
    let doc = Document::new(KeyKind::AutoKey).unwrap();
    assert_eq!(doc.revision(), 0);
    assert!(doc.is_latest());
}

#[test]
fn nokey_document_has_no_revision_offset() {
    let doc = Document::new(KeyKind::NoKey).unwrap();
    assert!(doc.header().revision_offset.is_none());
    assert_eq!(doc.revision(), 0);
}

#[test]
fn generated_object_ids_are_strictly_positive_and_increasing() {
    let a = generate_object_id();
    let b = generate_object_id();
    assert!(a > 0);
    assert!(b > a);
}

#[test]
fn open_read_only_roundtrips_through_as_bytes() {
    let doc = Document::new(KeyKind::UKey).unwrap();
    let bytes = doc.as_bytes().to_vec();
    let reopened = Document::open_read_only(bytes).unwrap();
    assert_eq!(reopened.key_kind(), KeyKind::UKey);
    assert_eq!(reopened.header().value, KeyValue::Unsigned(0));
}

#[test]
fn open_read_only_rejects_truncated_buffer() {
    let err = Document::open_read_only(vec![0x40]).unwrap_err();
    assert!(matches!(err, crate::error::DocError::Corrupted(_)));
}
