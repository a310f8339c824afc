//! The document's primary-key descriptor: marker byte, key payload, and
//! (for every kind but `NoKey`) the revision counter that immediately
//! follows it.

use crate::error::{DocError, DocResult};
use colbin_memfile::{string, MemFile};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    NoKey,
    AutoKey,
    UKey,
    IKey,
    SKey,
}

impl KeyKind {
    const NOKEY_MARKER: u8 = 0x40;
    const AUTOKEY_MARKER: u8 = 0x41;
    const UKEY_MARKER: u8 = 0x42;
    const IKEY_MARKER: u8 = 0x43;
    const SKEY_MARKER: u8 = 0x44;

    fn marker(self) -> u8 {
        match self {
            KeyKind::NoKey => Self::NOKEY_MARKER,
            KeyKind::AutoKey => Self::AUTOKEY_MARKER,
            KeyKind::UKey => Self::UKEY_MARKER,
            KeyKind::IKey => Self::IKEY_MARKER,
            KeyKind::SKey => Self::SKEY_MARKER,
        }
    }

    fn from_marker(b: u8) -> DocResult<KeyKind> {
        Ok(match b {
            Self::NOKEY_MARKER => KeyKind::NoKey,
            Self::AUTOKEY_MARKER => KeyKind::AutoKey,
            Self::UKEY_MARKER => KeyKind::UKey,
            Self::IKEY_MARKER => KeyKind::IKey,
            Self::SKEY_MARKER => KeyKind::SKey,
            other => return Err(DocError::Corrupted(format!("unknown key marker 0x{other:02x}"))),
        })
    }

    /// Every kind but `NoKey` carries a revision counter.
    pub fn has_revision(self) -> bool {
        !matches!(self, KeyKind::NoKey)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    None,
    Auto(u64),
    Unsigned(u64),
    Signed(i64),
    Str(String),
}

/// Parsed key header plus enough position bookkeeping to update it in place.
#[derive(Debug, Clone)]
pub struct KeyHeader {
    pub kind: KeyKind,
    pub value: KeyValue,
    pub value_offset: usize,
    pub revision_offset: Option<usize>,
    pub revision: u64,
}

static OBJECT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generates a new, process-unique, strictly positive object id for
/// `AutoKey` documents.
pub fn generate_object_id() -> u64 {
    OBJECT_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Writes a fresh key header (marker + a zeroed/empty payload + revision 0)
/// at the current cursor, which must be 0 for a new document.
pub fn write_key_header(file: &mut MemFile, kind: KeyKind) -> DocResult<KeyHeader> {
    file.write(&[kind.marker()])?;
    let value_offset = file.tell();
    let value = match kind {
        KeyKind::NoKey => KeyValue::None,
        KeyKind::AutoKey => {
            file.write_u64(0)?;
            KeyValue::Auto(0)
        }
        KeyKind::UKey => {
            file.write_u64(0)?;
            KeyValue::Unsigned(0)
        }
        KeyKind::IKey => {
            file.write_i64(0)?;
            KeyValue::Signed(0)
        }
        KeyKind::SKey => {
            string::write_string(file, "")?;
            KeyValue::Str(String::new())
        }
    };
    let revision_offset = if kind.has_revision() {
        let offset = file.tell();
        file.write_varuint(0)?;
        Some(offset)
    } else {
        None
    };
    Ok(KeyHeader {
        kind,
        value,
        value_offset,
        revision_offset,
        revision: 0,
    })
}

/// Parses the key header at the front of `file`, leaving the cursor
/// positioned right after it (at the top-level array's marker).
pub fn read_key_header(file: &mut MemFile) -> DocResult<KeyHeader> {
    let marker = file.read_u8()?;
    let kind = KeyKind::from_marker(marker)?;
    let value_offset = file.tell();
    let value = match kind {
        KeyKind::NoKey => KeyValue::None,
        KeyKind::AutoKey => KeyValue::Auto(file.read_u64()?),
        KeyKind::UKey => KeyValue::Unsigned(file.read_u64()?),
        KeyKind::IKey => KeyValue::Signed(file.read_i64()?),
        KeyKind::SKey => KeyValue::Str(string::read_string(file)?),
    };
    let (revision_offset, revision) = if kind.has_revision() {
        let offset = file.tell();
        let revision = file.read_varuint()?;
        (Some(offset), revision)
    } else {
        (None, 0)
    };
    Ok(KeyHeader {
        kind,
        value,
        value_offset,
        revision_offset,
        revision,
    })
}

/// Bumps the revision counter in place. No-op for `NoKey`, matching the
/// source: only keyed documents carry a revision at all.
pub fn bump_revision(file: &mut MemFile, header: &mut KeyHeader) -> DocResult<()> {
    let Some(offset) = header.revision_offset else {
        return Ok(());
    };
    file.save_position();
    file.seek(offset)?;
    let next = header.revision + 1;
    match file.update_varuint(next) {
        Ok(()) => {
            header.revision = next;
            file.restore_position()?;
            Ok(())
        }
        Err(e) => {
            file.restore_position()?;
            Err(e.into())
        }
    }
}

fn set_fixed_value(
    file: &mut MemFile,
    header: &mut KeyHeader,
    expected: KeyKind,
    write: impl FnOnce(&mut MemFile) -> colbin_memfile::MemResult<()>,
) -> DocResult<()> {
    if header.kind != expected {
        return Err(DocError::TypeMismatch {
            expected: format!("{expected:?}"),
            found: format!("{:?}", header.kind),
        });
    }
    file.save_position();
    file.seek(header.value_offset)?;
    let result = write(file);
    file.restore_position()?;
    result.map_err(Into::into)
}

pub fn set_unsigned(file: &mut MemFile, header: &mut KeyHeader, v: u64) -> DocResult<()> {
    set_fixed_value(file, header, KeyKind::UKey, |f| f.write_u64(v))?;
    header.value = KeyValue::Unsigned(v);
    Ok(())
}

pub fn set_signed(file: &mut MemFile, header: &mut KeyHeader, v: i64) -> DocResult<()> {
    set_fixed_value(file, header, KeyKind::IKey, |f| f.write_i64(v))?;
    header.value = KeyValue::Signed(v);
    Ok(())
}

pub fn set_auto(file: &mut MemFile, header: &mut KeyHeader, v: u64) -> DocResult<()> {
    set_fixed_value(file, header, KeyKind::AutoKey, |f| f.write_u64(v))?;
    header.value = KeyValue::Auto(v);
    Ok(())
}

/// Overwrites the string key's payload. Unlike the fixed-width setters this
/// may change the header's total byte length: the revision offset (and
/// everything after it) shifts by the same delta.
pub fn set_string(file: &mut MemFile, header: &mut KeyHeader, s: &str) -> DocResult<()> {
    if header.kind != KeyKind::SKey {
        return Err(DocError::TypeMismatch {
            expected: "SKey".into(),
            found: format!("{:?}", header.kind),
        });
    }
    file.seek(header.value_offset)?;
    let old_len = string::read_string(file).map(|s| s.len())?;
    let old_encoded = colbin_memfile::varuint::encoded_length(old_len as u64) + old_len;
    let new_encoded = string::encoded_length(s);

    file.seek(header.value_offset)?;
    if new_encoded > old_encoded {
        file.move_right(new_encoded - old_encoded)?;
    } else if new_encoded < old_encoded {
        file.move_left(old_encoded - new_encoded)?;
    }
    file.seek(header.value_offset)?;
    string::write_string(file, s)?;

    let delta = new_encoded as i64 - old_encoded as i64;
    if let Some(off) = header.revision_offset.as_mut() {
        *off = (*off as i64 + delta) as usize;
    }
    header.value = KeyValue::Str(s.to_string());
    Ok(())
}
