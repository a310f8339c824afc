use crate::document::Document;
use crate::key::KeyKind;
use crate::object_it::PropKey;
use colbin_field::FieldType;

#[test]
fn object_roundtrips_inline_and_id_keys() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut arr = doc.iterator_open().unwrap();
    arr.insert_object().unwrap();
    {
        let mut obj = arr.open_nested_object().unwrap();
        obj.insert_u64(PropKey::Inline("age".into()), 42).unwrap();
        obj.insert_string(PropKey::Id(7), "hello").unwrap();
    }

    let mut arr = doc.iterator_open().unwrap();
    arr.rewind().unwrap();
    let mut obj = arr.open_nested_object().unwrap();
    obj.rewind().unwrap();

    assert_eq!(obj.prop_key().unwrap(), PropKey::Inline("age".into()));
    assert_eq!(obj.prop_type().unwrap(), FieldType::U64);
    assert!(obj.next().unwrap());
    assert_eq!(obj.prop_key().unwrap(), PropKey::Id(7));
    assert_eq!(obj.prop_type().unwrap(), FieldType::String);
    assert!(!obj.next().unwrap());
}

#[test]
fn remove_property_drops_key_and_value_together() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut arr = doc.iterator_open().unwrap();
    arr.insert_object().unwrap();
    {
        let mut obj = arr.open_nested_object().unwrap();
        obj.insert_u64(PropKey::Inline("a".into()), 1).unwrap();
        obj.insert_u64(PropKey::Inline("b".into()), 2).unwrap();
    }

    let mut arr = doc.iterator_open().unwrap();
    arr.rewind().unwrap();
    let mut obj = arr.open_nested_object().unwrap();
    obj.rewind().unwrap();
    obj.remove().unwrap();

    let mut arr = doc.iterator_open().unwrap();
    arr.rewind().unwrap();
    let mut obj = arr.open_nested_object().unwrap();
    obj.rewind().unwrap();
    assert_eq!(obj.prop_key().unwrap(), PropKey::Inline("b".into()));
    assert!(!obj.next().unwrap());
}

#[test]
fn nested_object_in_object_round_trips() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    let mut arr = doc.iterator_open().unwrap();
    arr.insert_object().unwrap();
    {
        let mut outer = arr.open_nested_object().unwrap();
        outer.insert_object(PropKey::Inline("nested".into())).unwrap();
        let mut inner = outer.open_nested_object().unwrap();
        inner.insert_bool(PropKey::Inline("flag".into()), true).unwrap();
    }

    let mut arr = doc.iterator_open().unwrap();
    arr.rewind().unwrap();
    let mut outer = arr.open_nested_object().unwrap();
    outer.rewind().unwrap();
    assert_eq!(outer.prop_type().unwrap(), FieldType::Object);
    let mut inner = outer.open_nested_object().unwrap();
    inner.rewind().unwrap();
    assert_eq!(inner.prop_key().unwrap(), PropKey::Inline("flag".into()));
    assert_eq!(inner.prop_type().unwrap(), FieldType::True);
}
