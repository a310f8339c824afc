//! Skips the payload of a scalar (non-container) field. The caller has
//! already consumed the one-byte marker; container markers (array, object,
//! column) are skipped by `colbin-document`, which has the iterators needed
//! to fast-forward without duplicating the length logic here.

use crate::marker::FieldType;
use colbin_memfile::{MemFile, MemResult};

pub fn skip_payload(file: &mut MemFile, marker: FieldType) -> MemResult<()> {
    use FieldType::*;
    match marker {
        Null | True | False => Ok(()),
        U8 | I8 => file.skip(1),
        U16 | I16 => file.skip(2),
        U32 | I32 | Float => file.skip(4),
        U64 | I64 => file.skip(8),
        String => skip_string(file),
        Binary => skip_binary(file),
        BinaryCustom => skip_binary_custom(file),
        Array | ArrayEnd | Object | ObjectEnd => Err(colbin_memfile::MemError::Internal(
            "skip_payload called on a container marker".into(),
        )),
        _ if marker.is_column() => Err(colbin_memfile::MemError::Internal(
            "skip_payload called on a column marker".into(),
        )),
        _ => unreachable!("exhaustive match above covers all FieldType variants"),
    }
}

fn skip_string(file: &mut MemFile) -> MemResult<()> {
    let len = file.read_varuint()? as usize;
    file.skip(len)
}

fn skip_binary(file: &mut MemFile) -> MemResult<()> {
    file.skip_varuint()?; // mime type id
    let len = file.read_varuint()? as usize;
    file.skip(len)
}

fn skip_binary_custom(file: &mut MemFile) -> MemResult<()> {
    let type_name_len = file.read_varuint()? as usize;
    file.skip(type_name_len)?;
    let len = file.read_varuint()? as usize;
    file.skip(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use colbin_memfile::string::write_string;

    #[test]
    fn skip_scalar_widths() {
        let mut f = MemFile::new_read_write();
        f.write_u32(7).unwrap();
        f.seek(0).unwrap();
        skip_payload(&mut f, FieldType::U32).unwrap();
        assert_eq!(f.tell(), 4);
    }

    #[test]
    fn skip_string_consumes_length_and_bytes() {
        let mut f = MemFile::new_read_write();
        write_string(&mut f, "hello world").unwrap();
        let end = f.tell();
        f.seek(0).unwrap();
        skip_payload(&mut f, FieldType::String).unwrap();
        assert_eq!(f.tell(), end);
    }

    #[test]
    fn skip_binary_consumes_mime_and_bytes() {
        let mut f = MemFile::new_read_write();
        f.write_varuint(3).unwrap(); // mime id
        f.write_varuint(4).unwrap(); // blob len
        f.write(b"blob").unwrap();
        let end = f.tell();
        f.seek(0).unwrap();
        skip_payload(&mut f, FieldType::Binary).unwrap();
        assert_eq!(f.tell(), end);
    }
}
