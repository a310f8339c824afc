use crate::document::Document;
use crate::key::{KeyKind, KeyValue};
use crate::revise::{revise_begin, revise_try_begin};
use colbin_field::ColumnType;

#[test]
fn try_begin_fails_while_a_revision_is_open_and_succeeds_after_abort() {
    let mut doc = Document::new(KeyKind::UKey).unwrap();
    let held_lock = doc.lock.clone();
    let ctx = revise_try_begin(&mut doc).unwrap();

    // `ctx` borrows `doc` mutably, so contention is observed through the
    // lock handle captured before the revision opened rather than a second
    // `revise_try_begin(&mut doc)` call.
    assert!(!held_lock.write_lock.try_acquire());

    ctx.abort();
    assert!(held_lock.write_lock.try_acquire());
    held_lock.write_lock.release();

    let ctx2 = revise_try_begin(&mut doc).unwrap();
    ctx2.abort();
}

#[test]
fn set_unsigned_persists_through_end() {
    let mut doc = Document::new(KeyKind::UKey).unwrap();
    let mut ctx = revise_begin(&mut doc).unwrap();
    ctx.set_unsigned(77).unwrap();
    ctx.end().unwrap();

    assert_eq!(doc.header().value, KeyValue::Unsigned(77));
    assert_eq!(doc.revision(), 1);
}

#[test]
fn set_string_persists_and_shifts_trailing_offsets() {
    let mut doc = Document::new(KeyKind::SKey).unwrap();
    let mut ctx = revise_begin(&mut doc).unwrap();
    ctx.set_string("a much longer key than the empty default").unwrap();
    ctx.end().unwrap();

    assert_eq!(
        doc.header().value,
        KeyValue::Str("a much longer key than the empty default".into())
    );
    // The array payload must still be reachable after the key grew.
    let mut arr = doc.iterator_open().unwrap();
    arr.insert_u32(1).unwrap();
}

#[test]
fn abort_leaves_source_document_untouched() {
    let mut doc = Document::new(KeyKind::UKey).unwrap();
    {
        let mut ctx = revise_begin(&mut doc).unwrap();
        ctx.set_unsigned(999).unwrap();
        ctx.abort();
    }
    assert_eq!(doc.header().value, KeyValue::Unsigned(0));
    assert_eq!(doc.revision(), 0);
}

#[test]
fn end_bumps_revision_and_end_installs_a_fresh_unsuperseded_lock() {
    let mut doc = Document::new(KeyKind::AutoKey).unwrap();
    assert!(doc.is_latest());
    let ctx = revise_begin(&mut doc).unwrap();
    ctx.end().unwrap();
    assert_eq!(doc.revision(), 1);
    assert!(doc.is_latest());
}

#[test]
fn remove_one_drops_a_single_top_level_element() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    {
        let mut arr = doc.iterator_open().unwrap();
        arr.insert_u32(1).unwrap();
        arr.insert_u32(2).unwrap();
        arr.insert_u32(3).unwrap();
    }
    let mut ctx = revise_begin(&mut doc).unwrap();
    ctx.remove_one(1).unwrap();
    ctx.end().unwrap();

    let mut arr = doc.iterator_open().unwrap();
    arr.rewind().unwrap();
    let vals: Vec<u32> = (0..2)
        .map(|_| {
            let v = match arr.current().unwrap() {
                crate::array_it::Element::U32(v) => v,
                _ => panic!("unexpected element type"),
            };
            arr.next().unwrap();
            v
        })
        .collect();
    assert_eq!(vals, vec![1, 3]);
}

#[test]
fn remove_multiple_applies_highest_index_first() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    {
        let mut arr = doc.iterator_open().unwrap();
        for i in 0..5u32 {
            arr.insert_u32(i).unwrap();
        }
    }
    let mut ctx = revise_begin(&mut doc).unwrap();
    ctx.remove(&[1, 3]).unwrap();
    ctx.end().unwrap();

    let mut arr = doc.iterator_open().unwrap();
    arr.rewind().unwrap();
    let mut vals = Vec::new();
    loop {
        if let crate::array_it::Element::U32(v) = arr.current().unwrap() {
            vals.push(v);
        }
        if !arr.next().unwrap() {
            break;
        }
    }
    assert_eq!(vals, vec![0, 2, 4]);
}

#[test]
fn pack_recurses_into_nested_arrays_objects_and_columns() {
    let mut doc = Document::new(KeyKind::NoKey).unwrap();
    {
        let mut arr = doc.iterator_open().unwrap();
        arr.insert_column(ColumnType::U8, 8).unwrap();
        {
            let mut col = arr.open_nested_column().unwrap();
            col.append_u8(1).unwrap();
            col.append_u8(2).unwrap();
        }
        arr.insert_object().unwrap();
        {
            let mut obj = arr.open_nested_object().unwrap();
            obj.insert_column(crate::object_it::PropKey::Inline("c".into()), ColumnType::U16, 6)
                .unwrap();
            let mut col = obj.open_nested_column().unwrap();
            col.append_u16(10).unwrap();
        }
    }

    let mut ctx = revise_begin(&mut doc).unwrap();
    ctx.pack().unwrap();
    ctx.end().unwrap();

    let mut arr = doc.iterator_open().unwrap();
    arr.rewind().unwrap();
    let col = arr.open_nested_column().unwrap();
    assert_eq!(col.capacity(), 2);
    drop(col);
    assert!(arr.next().unwrap());
    let mut obj = arr.open_nested_object().unwrap();
    obj.rewind().unwrap();
    let inner_col = obj.open_nested_column().unwrap();
    assert_eq!(inner_col.capacity(), 1);
}
