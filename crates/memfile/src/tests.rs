use super::*;

// -------------------- construction / basic read-write --------------------

#[test]
fn write_then_read_back() {
    let mut f = MemFile::new_read_write();
    f.write(b"hello").unwrap();
    assert_eq!(f.size(), 5);
    assert_eq!(f.tell(), 5);
    f.seek(0).unwrap();
    assert_eq!(f.read(5).unwrap(), b"hello");
    assert_eq!(f.tell(), 5);
}

#[test]
fn peek_does_not_advance_cursor() {
    let mut f = MemFile::new_read_write();
    f.write(b"hello").unwrap();
    f.seek(1).unwrap();
    assert_eq!(f.peek(2).unwrap(), b"el");
    assert_eq!(f.tell(), 1);
}

#[test]
fn read_out_of_bounds_fails() {
    let mut f = MemFile::from_vec_read_write(vec![1, 2, 3]);
    assert!(matches!(f.read(10), Err(MemError::OutOfBounds { .. })));
}

#[test]
fn write_on_read_only_fails() {
    let mut f = MemFile::from_vec_read_only(vec![1, 2, 3]);
    assert_eq!(f.write(b"x"), Err(MemError::WriteProt));
}

#[test]
fn write_past_tail_grows_geometrically() {
    let mut f = MemFile::new_read_write();
    f.write(&[0u8; 4]).unwrap();
    let cap_before = f.as_bytes().len();
    f.seek(0).unwrap();
    f.write(&[1u8; 100]).unwrap();
    assert_eq!(f.size(), 100);
    assert!(f.as_bytes().len() >= cap_before);
}

// -------------------- save / restore position --------------------

#[test]
fn save_restore_roundtrips() {
    let mut f = MemFile::from_vec_read_write(vec![0; 10]);
    f.seek(3).unwrap();
    f.save_position();
    f.seek(7).unwrap();
    f.restore_position().unwrap();
    assert_eq!(f.tell(), 3);
}

#[test]
fn restore_without_save_fails() {
    let mut f = MemFile::new_read_write();
    assert_eq!(f.restore_position(), Err(MemError::NoSavedPosition));
}

// -------------------- move_left / move_right / cut --------------------

#[test]
fn move_left_deletes_at_cursor() {
    let mut f = MemFile::from_vec_read_write(b"abcdef".to_vec());
    f.seek(2).unwrap();
    f.move_left(2).unwrap(); // delete "cd"
    assert_eq!(f.as_bytes(), b"abef");
    assert_eq!(f.tell(), 2);
}

#[test]
fn move_right_opens_zeroed_gap() {
    let mut f = MemFile::from_vec_read_write(b"abef".to_vec());
    f.seek(2).unwrap();
    f.move_right(2).unwrap();
    assert_eq!(f.as_bytes(), &[b'a', b'b', 0, 0, b'e', b'f']);
    assert_eq!(f.tell(), 2);
}

#[test]
fn cut_truncates_tail() {
    let mut f = MemFile::from_vec_read_write(b"abcdef".to_vec());
    f.cut(2).unwrap();
    assert_eq!(f.as_bytes(), b"abcd");
}

#[test]
fn cut_clamps_cursor_past_new_end() {
    let mut f = MemFile::from_vec_read_write(b"abcdef".to_vec());
    f.seek(6).unwrap();
    f.cut(4).unwrap();
    assert_eq!(f.tell(), 2);
}

// -------------------- varuint on MemFile --------------------

#[test]
fn varuint_write_read_roundtrip() {
    let mut f = MemFile::new_read_write();
    f.write_varuint(300).unwrap();
    f.seek(0).unwrap();
    assert_eq!(f.read_varuint().unwrap(), 300);
}

#[test]
fn update_varuint_same_width_succeeds() {
    let mut f = MemFile::new_read_write();
    f.write_varuint(200).unwrap(); // 2 bytes
    f.seek(0).unwrap();
    f.update_varuint(5).unwrap(); // 1 byte of data, padded to 2
    f.seek(0).unwrap();
    assert_eq!(f.read_varuint().unwrap(), 5);
}

#[test]
fn update_varuint_too_wide_fails() {
    let mut f = MemFile::new_read_write();
    f.write_varuint(1).unwrap(); // 1 byte
    f.seek(0).unwrap();
    assert!(matches!(
        f.update_varuint(1_000_000),
        Err(MemError::VarUintWontFit { .. })
    ));
}

// -------------------- typed scalar accessors --------------------

#[test]
fn typed_scalar_roundtrip() {
    let mut f = MemFile::new_read_write();
    f.write_u32(0xDEADBEEF).unwrap();
    f.write_i64(-1).unwrap();
    f.write_f32(1.5).unwrap();
    f.seek(0).unwrap();
    assert_eq!(f.read_u32().unwrap(), 0xDEADBEEF);
    assert_eq!(f.read_i64().unwrap(), -1);
    assert_eq!(f.read_f32().unwrap(), 1.5);
}

#[test]
fn clone_for_revision_resets_cursor_and_mode() {
    let mut f = MemFile::from_vec_read_only(b"abc".to_vec());
    f.seek(2).unwrap();
    let revised = f.clone_for_revision();
    assert_eq!(revised.tell(), 0);
    assert_eq!(revised.mode(), Mode::ReadWrite);
    assert_eq!(revised.as_bytes(), b"abc");
}
