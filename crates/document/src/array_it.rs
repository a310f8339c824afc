//! Forward cursor over heterogeneous array contents.

use crate::column_it::ColumnIterator;
use crate::error::{DocError, DocResult};
use crate::object_it::ObjectIterator;
use crate::skip;
use byteorder::{ByteOrder, LittleEndian};
use colbin_field::FieldType;
use colbin_memfile::MemFile;

/// A lazily-resolved view of the element currently under the cursor.
pub enum Element<'a> {
    Null,
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Float(f32),
    Str(String),
    Binary { mime: u64, bytes: Vec<u8> },
    BinaryCustom { type_name: String, bytes: Vec<u8> },
    Array(ArrayIterator<'a>),
    Object(ObjectIterator<'a>),
    Column(ColumnIterator<'a>),
}

pub struct ArrayIterator<'a> {
    pub(crate) file: &'a mut MemFile,
    pub(crate) payload_start: usize,
}

impl<'a> ArrayIterator<'a> {
    /// Opens an iterator at `offset`, which must point at an `ARRAY` marker.
    pub fn open(file: &'a mut MemFile, offset: usize) -> DocResult<ArrayIterator<'a>> {
        file.seek(offset)?;
        let marker = file.read_u8()?;
        if FieldType::from_byte(marker) != Some(FieldType::Array) {
            return Err(DocError::Corrupted(format!(
                "expected ARRAY marker at {offset}, found 0x{marker:02x}"
            )));
        }
        let payload_start = file.tell();
        Ok(ArrayIterator { file, payload_start })
    }

    pub fn rewind(&mut self) -> DocResult<()> {
        self.file.seek(self.payload_start)?;
        Ok(())
    }

    pub fn tell(&self) -> usize {
        self.file.tell()
    }

    fn current_marker(&mut self) -> DocResult<FieldType> {
        self.skip_slack()?;
        let b = self.file.peek_u8()?;
        FieldType::from_byte(b)
            .ok_or_else(|| DocError::Corrupted(format!("unknown field marker 0x{b:02x}")))
    }

    /// Slack is a run of zero bytes preceding `ARRAY_END`; skip over it so
    /// the cursor always rests on a real marker.
    fn skip_slack(&mut self) -> DocResult<()> {
        loop {
            let b = self.file.peek_u8()?;
            if b != 0 {
                return Ok(());
            }
            // A zero byte that is itself the ARRAY_END marker (0x10) never
            // matches this branch, so any 0x00 run here is genuine slack.
            self.file.skip(1)?;
        }
    }

    pub fn field_type(&mut self) -> DocResult<FieldType> {
        self.current_marker()
    }

    /// Resolves the element under the cursor without advancing past it.
    /// Scalars are read by value; containers are returned as nested
    /// iterators borrowing this one's buffer.
    pub fn current(&mut self) -> DocResult<Element<'_>> {
        let ft = self.current_marker()?;
        let marker_at = self.file.tell();
        Ok(match ft {
            FieldType::Null => Element::Null,
            FieldType::True => Element::Bool(true),
            FieldType::False => Element::Bool(false),
            FieldType::U8 => Element::U8(self.file.peek_at(marker_at + 1, 1)?[0]),
            FieldType::I8 => Element::I8(self.file.peek_at(marker_at + 1, 1)?[0] as i8),
            FieldType::U16 => {
                Element::U16(LittleEndian::read_u16(self.file.peek_at(marker_at + 1, 2)?))
            }
            FieldType::I16 => {
                Element::I16(LittleEndian::read_i16(self.file.peek_at(marker_at + 1, 2)?))
            }
            FieldType::U32 => {
                Element::U32(LittleEndian::read_u32(self.file.peek_at(marker_at + 1, 4)?))
            }
            FieldType::I32 => {
                Element::I32(LittleEndian::read_i32(self.file.peek_at(marker_at + 1, 4)?))
            }
            FieldType::U64 => {
                Element::U64(LittleEndian::read_u64(self.file.peek_at(marker_at + 1, 8)?))
            }
            FieldType::I64 => {
                Element::I64(LittleEndian::read_i64(self.file.peek_at(marker_at + 1, 8)?))
            }
            FieldType::Float => {
                Element::Float(LittleEndian::read_f32(self.file.peek_at(marker_at + 1, 4)?))
            }
            FieldType::String => {
                self.file.seek(marker_at + 1)?;
                let s = colbin_memfile::string::read_string(self.file)?;
                self.file.seek(marker_at)?;
                Element::Str(s)
            }
            FieldType::Binary => {
                self.file.seek(marker_at + 1)?;
                let mime = self.file.read_varuint()?;
                let len = self.file.read_varuint()? as usize;
                let bytes = self.file.read(len)?.to_vec();
                self.file.seek(marker_at)?;
                Element::Binary { mime, bytes }
            }
            FieldType::BinaryCustom => {
                self.file.seek(marker_at + 1)?;
                let name_len = self.file.read_varuint()? as usize;
                let type_name = String::from_utf8_lossy(self.file.read(name_len)?).into_owned();
                let len = self.file.read_varuint()? as usize;
                let bytes = self.file.read(len)?.to_vec();
                self.file.seek(marker_at)?;
                Element::BinaryCustom { type_name, bytes }
            }
            FieldType::Array => Element::Array(self.open_nested_array()?),
            FieldType::Object => Element::Object(self.open_nested_object()?),
            col if col.is_column() => Element::Column(self.open_nested_column()?),
            other => {
                return Err(DocError::Corrupted(format!(
                    "unexpected marker in current(): {other:?}"
                )))
            }
        })
    }

    pub fn has_next(&mut self) -> DocResult<bool> {
        Ok(self.current_marker()? != FieldType::ArrayEnd)
    }

    /// Advances past the current element to the next marker (or `ARRAY_END`).
    /// Returns `false` once positioned on `ARRAY_END`.
    pub fn next(&mut self) -> DocResult<bool> {
        let marker = self.current_marker()?;
        if marker == FieldType::ArrayEnd {
            return Ok(false);
        }
        self.file.skip(1)?; // consume the marker
        skip::skip_field(self.file, marker)?;
        Ok(self.current_marker()? != FieldType::ArrayEnd)
    }

    /// Seeks past this array's `ARRAY_END` marker, resuming the parent's
    /// cursor right after it.
    pub fn fast_forward(&mut self) -> DocResult<()> {
        loop {
            let marker = self.current_marker()?;
            if marker == FieldType::ArrayEnd {
                self.file.skip(1)?;
                return Ok(());
            }
            self.file.skip(1)?;
            skip::skip_field(self.file, marker)?;
        }
    }

    /// Removes the element under the cursor. Leaves the cursor on what is
    /// now the next element (slack or `ARRAY_END`).
    pub fn remove(&mut self) -> DocResult<()> {
        let start = self.file.tell();
        let marker = self.current_marker()?;
        if marker == FieldType::ArrayEnd {
            return Err(DocError::OutOfBounds("remove at ARRAY_END".into()));
        }
        self.file.skip(1)?;
        skip::skip_field(self.file, marker)?;
        let end = self.file.tell();
        self.file.seek(start)?;
        self.file.move_left(end - start)?;
        Ok(())
    }

    fn insert_tag_and(&mut self, marker: FieldType, body: impl FnOnce(&mut MemFile) -> DocResult<()>) -> DocResult<()> {
        let at = self.file.tell();
        self.file.move_right(1)?;
        self.file.seek(at)?;
        self.file.update_u8(marker.to_byte())?;
        self.file.seek(at + 1)?;
        body(self.file)
    }

    pub fn insert_null(&mut self) -> DocResult<()> {
        self.insert_tag_and(FieldType::Null, |_| Ok(()))
    }

    pub fn insert_bool(&mut self, v: bool) -> DocResult<()> {
        let marker = if v { FieldType::True } else { FieldType::False };
        self.insert_tag_and(marker, |_| Ok(()))
    }

    pub fn insert_u8(&mut self, v: u8) -> DocResult<()> {
        self.insert_fixed(FieldType::U8, 1, move |f, at| f.update_u8_at(at, v))
    }

    pub fn insert_i8(&mut self, v: i8) -> DocResult<()> {
        self.insert_fixed(FieldType::I8, 1, move |f, at| f.update_u8_at(at, v as u8))
    }

    pub fn insert_u16(&mut self, v: u16) -> DocResult<()> {
        self.insert_fixed(FieldType::U16, 2, move |f, at| f.update_u16_at(at, v))
    }

    pub fn insert_i16(&mut self, v: i16) -> DocResult<()> {
        self.insert_fixed(FieldType::I16, 2, move |f, at| f.update_i16_at(at, v))
    }

    pub fn insert_i32(&mut self, v: i32) -> DocResult<()> {
        self.insert_fixed(FieldType::I32, 4, move |f, at| f.update_i32_at(at, v))
    }

    pub fn insert_u32(&mut self, v: u32) -> DocResult<()> {
        self.insert_fixed(FieldType::U32, 4, move |f, at| f.update_u32_at(at, v))
    }

    pub fn insert_u64(&mut self, v: u64) -> DocResult<()> {
        self.insert_fixed(FieldType::U64, 8, move |f, at| f.update_u64_at(at, v))
    }

    pub fn insert_i64(&mut self, v: i64) -> DocResult<()> {
        self.insert_fixed(FieldType::I64, 8, move |f, at| f.update_i64_at(at, v))
    }

    pub fn insert_float(&mut self, v: f32) -> DocResult<()> {
        self.insert_fixed(FieldType::Float, 4, move |f, at| f.update_f32_at(at, v))
    }

    fn insert_fixed(
        &mut self,
        marker: FieldType,
        width: usize,
        write: impl FnOnce(&mut MemFile, usize) -> colbin_memfile::MemResult<()>,
    ) -> DocResult<()> {
        let tag_at = self.file.tell();
        self.file.move_right(1 + width)?;
        self.file.seek(tag_at)?;
        self.file.update_u8(marker.to_byte())?;
        write(self.file, tag_at + 1)?;
        self.file.seek(tag_at + 1 + width)?;
        Ok(())
    }

    pub fn insert_string(&mut self, s: &str) -> DocResult<()> {
        let encoded = colbin_memfile::string::encoded_length(s);
        let tag_at = self.file.tell();
        self.file.move_right(1 + encoded)?;
        self.file.seek(tag_at)?;
        self.file.update_u8(FieldType::String.to_byte())?;
        self.file.skip(1)?;
        colbin_memfile::string::write_string(self.file, s)?;
        Ok(())
    }

    pub fn insert_binary(&mut self, mime: u64, bytes: &[u8]) -> DocResult<()> {
        let mut scratch = Vec::new();
        colbin_memfile::varuint::encode_varuint(mime, &mut scratch);
        colbin_memfile::varuint::encode_varuint(bytes.len() as u64, &mut scratch);
        scratch.extend_from_slice(bytes);
        let tag_at = self.file.tell();
        self.file.move_right(1 + scratch.len())?;
        self.file.seek(tag_at)?;
        self.file.update_u8(FieldType::Binary.to_byte())?;
        self.file.skip(1)?;
        self.file.write(&scratch)?;
        Ok(())
    }

    /// Inserts an empty array at the cursor and returns a nested iterator
    /// open on it.
    pub fn insert_array(&mut self) -> DocResult<()> {
        let tag_at = self.file.tell();
        self.file.move_right(2)?;
        self.file.seek(tag_at)?;
        self.file.update_u8(FieldType::Array.to_byte())?;
        self.file.update_u8_at(tag_at + 1, FieldType::ArrayEnd.to_byte())?;
        self.file.seek(tag_at)?;
        Ok(())
    }

    pub fn insert_object(&mut self) -> DocResult<()> {
        let tag_at = self.file.tell();
        self.file.move_right(2)?;
        self.file.seek(tag_at)?;
        self.file.update_u8(FieldType::Object.to_byte())?;
        self.file.update_u8_at(tag_at + 1, FieldType::ObjectEnd.to_byte())?;
        self.file.seek(tag_at)?;
        Ok(())
    }

    /// Inserts a column of `capacity` slots, all NULL, of `column_type`.
    /// Leaves the cursor at the column's own marker so the caller can
    /// immediately open it for writes.
    pub fn insert_column(&mut self, column_type: colbin_field::ColumnType, capacity: u64) -> DocResult<()> {
        let mut scratch = vec![column_type.to_field_type().to_byte()];
        colbin_memfile::varuint::encode_varuint(capacity, &mut scratch);
        let count_width = colbin_memfile::varuint::encoded_length(capacity);
        colbin_memfile::varuint::encode_varuint_padded(0, count_width, &mut scratch);
        let null_pattern = crate::column_it::null_bytes_for(column_type);
        for _ in 0..capacity {
            scratch.extend_from_slice(&null_pattern);
        }
        let tag_at = self.file.tell();
        self.file.move_right(scratch.len())?;
        self.file.seek(tag_at)?;
        self.file.write(&scratch)?;
        self.file.seek(tag_at)?;
        Ok(())
    }

    pub fn open_nested_array(&mut self) -> DocResult<ArrayIterator<'_>> {
        let at = self.file.tell();
        ArrayIterator::open(self.file, at)
    }

    pub fn open_nested_object(&mut self) -> DocResult<ObjectIterator<'_>> {
        let at = self.file.tell();
        ObjectIterator::open(self.file, at)
    }

    pub fn open_nested_column(&mut self) -> DocResult<ColumnIterator<'_>> {
        let at = self.file.tell();
        ColumnIterator::open(self.file, at)
    }
}
