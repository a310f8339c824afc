//! Length-prefixed UTF-8 strings: a VarUInt byte length followed by the
//! string's raw bytes, no terminator.

use crate::{MemError, MemFile, MemResult};

pub fn write_string(file: &mut MemFile, s: &str) -> MemResult<()> {
    file.write_varuint(s.len() as u64)?;
    file.write(s.as_bytes())
}

pub fn read_string(file: &mut MemFile) -> MemResult<String> {
    let len = file.read_varuint()? as usize;
    let bytes = file.read(len)?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| MemError::Internal(format!("non-utf8 string payload: {e}")))
}

pub fn peek_string(file: &mut MemFile) -> MemResult<String> {
    file.save_position();
    let result = read_string(file);
    file.restore_position()?;
    result
}

/// Number of bytes `write_string` would occupy for `s`.
pub fn encoded_length(s: &str) -> usize {
    crate::varuint::encoded_length(s.len() as u64) + s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_ascii_and_unicode() {
        for s in ["", "hello", "columnar binary json \u{1F9B0}"] {
            let mut f = MemFile::new_read_write();
            write_string(&mut f, s).unwrap();
            assert_eq!(f.size(), encoded_length(s));
            f.seek(0).unwrap();
            let out = read_string(&mut f).unwrap();
            assert_eq!(out, s);
        }
    }

    #[test]
    fn peek_does_not_advance() {
        let mut f = MemFile::new_read_write();
        write_string(&mut f, "abc").unwrap();
        f.seek(0).unwrap();
        let peeked = peek_string(&mut f).unwrap();
        assert_eq!(peeked, "abc");
        assert_eq!(f.tell(), 0);
    }
}
