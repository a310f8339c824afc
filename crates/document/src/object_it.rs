//! Forward cursor over key/value properties. Structurally the array
//! iterator with each element prefixed by an encoded key.

use crate::array_it::ArrayIterator;
use crate::column_it::ColumnIterator;
use crate::error::{DocError, DocResult};
use crate::skip;
use colbin_field::FieldType;
use colbin_memfile::{string, MemFile};

/// One-byte discriminator preceding a property key, distinct from both
/// field markers and the zero-byte slack run so key parsing never confuses
/// the two.
const KEY_TAG_INLINE: u8 = 0x50;
const KEY_TAG_ID: u8 = 0x51;

#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Inline(String),
    Id(u64),
}

pub struct ObjectIterator<'a> {
    pub(crate) file: &'a mut MemFile,
    pub(crate) payload_start: usize,
}

impl<'a> ObjectIterator<'a> {
    pub fn open(file: &'a mut MemFile, offset: usize) -> DocResult<ObjectIterator<'a>> {
        file.seek(offset)?;
        let marker = file.read_u8()?;
        if FieldType::from_byte(marker) != Some(FieldType::Object) {
            return Err(DocError::Corrupted(format!(
                "expected OBJECT marker at {offset}, found 0x{marker:02x}"
            )));
        }
        let payload_start = file.tell();
        Ok(ObjectIterator { file, payload_start })
    }

    pub fn rewind(&mut self) -> DocResult<()> {
        self.file.seek(self.payload_start)?;
        Ok(())
    }

    pub fn tell(&self) -> usize {
        self.file.tell()
    }

    fn skip_slack(&mut self) -> DocResult<()> {
        loop {
            let b = self.file.peek_u8()?;
            if b != 0 {
                return Ok(());
            }
            self.file.skip(1)?;
        }
    }

    fn at_end(&mut self) -> DocResult<bool> {
        self.skip_slack()?;
        let b = self.file.peek_u8()?;
        Ok(FieldType::from_byte(b) == Some(FieldType::ObjectEnd))
    }

    pub fn has_next(&mut self) -> DocResult<bool> {
        Ok(!self.at_end()?)
    }

    fn read_key(&mut self) -> DocResult<PropKey> {
        let tag = self.file.read_u8()?;
        match tag {
            KEY_TAG_INLINE => Ok(PropKey::Inline(string::read_string(self.file)?)),
            KEY_TAG_ID => Ok(PropKey::Id(self.file.read_varuint()?)),
            other => Err(DocError::Corrupted(format!("unknown key tag 0x{other:02x}"))),
        }
    }

    fn skip_key(&mut self) -> DocResult<()> {
        let tag = self.file.read_u8()?;
        match tag {
            KEY_TAG_INLINE => {
                let len = self.file.read_varuint()? as usize;
                self.file.skip(len)?;
                Ok(())
            }
            KEY_TAG_ID => {
                self.file.skip_varuint()?;
                Ok(())
            }
            other => Err(DocError::Corrupted(format!("unknown key tag 0x{other:02x}"))),
        }
    }

    /// The current property's key, without advancing.
    pub fn prop_key(&mut self) -> DocResult<PropKey> {
        self.skip_slack()?;
        let start = self.file.tell();
        let key = self.read_key()?;
        self.file.seek(start)?;
        Ok(key)
    }

    /// The current property's value field type, without advancing.
    pub fn prop_type(&mut self) -> DocResult<FieldType> {
        self.skip_slack()?;
        let start = self.file.tell();
        self.skip_key()?;
        let b = self.file.peek_u8()?;
        let ft = FieldType::from_byte(b)
            .ok_or_else(|| DocError::Corrupted(format!("unknown field marker 0x{b:02x}")))?;
        self.file.seek(start)?;
        Ok(ft)
    }

    /// Advances past key + value to the next property (or `OBJECT_END`).
    pub fn next(&mut self) -> DocResult<bool> {
        if self.at_end()? {
            return Ok(false);
        }
        self.skip_key()?;
        let marker = {
            let b = self.file.read_u8()?;
            FieldType::from_byte(b)
                .ok_or_else(|| DocError::Corrupted(format!("unknown field marker 0x{b:02x}")))?
        };
        skip::skip_field(self.file, marker)?;
        Ok(!self.at_end()?)
    }

    pub fn fast_forward(&mut self) -> DocResult<()> {
        loop {
            if self.at_end()? {
                self.file.skip(1)?; // consume OBJECT_END
                return Ok(());
            }
            self.skip_key()?;
            let marker = {
                let b = self.file.read_u8()?;
                FieldType::from_byte(b)
                    .ok_or_else(|| DocError::Corrupted(format!("unknown field marker 0x{b:02x}")))?
            };
            skip::skip_field(self.file, marker)?;
        }
    }

    /// Removes the current key+value pair atomically.
    pub fn remove(&mut self) -> DocResult<()> {
        let start = self.file.tell();
        if self.at_end()? {
            return Err(DocError::OutOfBounds("remove at OBJECT_END".into()));
        }
        self.skip_key()?;
        let marker = {
            let b = self.file.read_u8()?;
            FieldType::from_byte(b)
                .ok_or_else(|| DocError::Corrupted(format!("unknown field marker 0x{b:02x}")))?
        };
        skip::skip_field(self.file, marker)?;
        let end = self.file.tell();
        self.file.seek(start)?;
        self.file.move_left(end - start)?;
        Ok(())
    }

    fn write_key(&mut self, key: &PropKey) -> DocResult<()> {
        match key {
            PropKey::Inline(s) => {
                self.file.write(&[KEY_TAG_INLINE])?;
                string::write_string(self.file, s)?;
            }
            PropKey::Id(id) => {
                self.file.write(&[KEY_TAG_ID])?;
                self.file.write_varuint(*id)?;
            }
        }
        Ok(())
    }

    fn key_encoded_len(key: &PropKey) -> usize {
        match key {
            PropKey::Inline(s) => 1 + string::encoded_length(s),
            PropKey::Id(id) => 1 + colbin_memfile::varuint::encoded_length(*id),
        }
    }

    /// Inserts a null-valued property at the cursor.
    pub fn insert_null(&mut self, key: PropKey) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let at = self.file.tell();
        self.file.move_right(klen + 1)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&[FieldType::Null.to_byte()])?;
        Ok(())
    }

    pub fn insert_bool(&mut self, key: PropKey, v: bool) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let at = self.file.tell();
        self.file.move_right(klen + 1)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        let marker = if v { FieldType::True } else { FieldType::False };
        self.file.write(&[marker.to_byte()])?;
        Ok(())
    }

    pub fn insert_string(&mut self, key: PropKey, s: &str) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let vlen = 1 + string::encoded_length(s);
        let at = self.file.tell();
        self.file.move_right(klen + vlen)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&[FieldType::String.to_byte()])?;
        string::write_string(self.file, s)?;
        Ok(())
    }

    pub fn insert_u64(&mut self, key: PropKey, v: u64) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let at = self.file.tell();
        self.file.move_right(klen + 1 + 8)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&[FieldType::U64.to_byte()])?;
        self.file.write_u64(v)?;
        Ok(())
    }

    pub fn insert_i64(&mut self, key: PropKey, v: i64) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let at = self.file.tell();
        self.file.move_right(klen + 1 + 8)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&[FieldType::I64.to_byte()])?;
        self.file.write_i64(v)?;
        Ok(())
    }

    pub fn insert_float(&mut self, key: PropKey, v: f32) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let at = self.file.tell();
        self.file.move_right(klen + 1 + 4)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&[FieldType::Float.to_byte()])?;
        self.file.write_f32(v)?;
        Ok(())
    }

    pub fn insert_array(&mut self, key: PropKey) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let at = self.file.tell();
        self.file.move_right(klen + 2)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&[FieldType::Array.to_byte(), FieldType::ArrayEnd.to_byte()])?;
        self.file.seek(at + klen)?;
        Ok(())
    }

    pub fn insert_object(&mut self, key: PropKey) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let at = self.file.tell();
        self.file.move_right(klen + 2)?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&[FieldType::Object.to_byte(), FieldType::ObjectEnd.to_byte()])?;
        self.file.seek(at + klen)?;
        Ok(())
    }

    pub fn insert_column(
        &mut self,
        key: PropKey,
        column_type: colbin_field::ColumnType,
        capacity: u64,
    ) -> DocResult<()> {
        let klen = Self::key_encoded_len(&key);
        let mut scratch = vec![column_type.to_field_type().to_byte()];
        colbin_memfile::varuint::encode_varuint(capacity, &mut scratch);
        let count_width = colbin_memfile::varuint::encoded_length(capacity);
        colbin_memfile::varuint::encode_varuint_padded(0, count_width, &mut scratch);
        let null_pattern = crate::column_it::null_bytes_for(column_type);
        for _ in 0..capacity {
            scratch.extend_from_slice(&null_pattern);
        }
        let at = self.file.tell();
        self.file.move_right(klen + scratch.len())?;
        self.file.seek(at)?;
        self.write_key(&key)?;
        self.file.write(&scratch)?;
        self.file.seek(at + klen)?;
        Ok(())
    }

    pub fn open_nested_array(&mut self) -> DocResult<ArrayIterator<'_>> {
        self.skip_slack()?;
        self.skip_key()?;
        let at = self.file.tell();
        ArrayIterator::open(self.file, at)
    }

    pub fn open_nested_object(&mut self) -> DocResult<ObjectIterator<'_>> {
        self.skip_slack()?;
        self.skip_key()?;
        let at = self.file.tell();
        ObjectIterator::open(self.file, at)
    }

    pub fn open_nested_column(&mut self) -> DocResult<ColumnIterator<'_>> {
        self.skip_slack()?;
        self.skip_key()?;
        let at = self.file.tell();
        ColumnIterator::open(self.file, at)
    }
}
