//! Forward cursor over a homogeneous, fixed-width element column.
//!
//! Wire layout after the column's own marker:
//! `[capacity: varuint][count: varuint][capacity * element_size bytes]`.
//! `capacity >= count`; the tail beyond `count` is unused but reserved
//! slots, always zero-filled. The count field is written padded out to
//! `capacity`'s own encoded width, since count can only grow up to
//! capacity: that guarantees `append_*`'s in-place `update_varuint_at`
//! never runs out of room as count climbs past a 7-bit boundary.

use crate::error::{DocError, DocResult};
use colbin_field::{BooleanColumnValue, ColumnElement, ColumnType, FieldType};
use colbin_memfile::MemFile;

/// The NULL sentinel byte pattern for one element of `column_type`, used to
/// initialize freshly-reserved column capacity.
pub fn null_bytes_for(column_type: ColumnType) -> Vec<u8> {
    match column_type {
        ColumnType::Boolean => vec![BooleanColumnValue::NULL_BYTE],
        ColumnType::U8 => vec![colbin_field::U8_NULL],
        ColumnType::I8 => vec![colbin_field::I8_NULL as u8],
        ColumnType::U16 => colbin_field::U16_NULL.to_le_bytes().to_vec(),
        ColumnType::I16 => colbin_field::I16_NULL.to_le_bytes().to_vec(),
        ColumnType::U32 => colbin_field::U32_NULL.to_le_bytes().to_vec(),
        ColumnType::I32 => colbin_field::I32_NULL.to_le_bytes().to_vec(),
        ColumnType::U64 => colbin_field::U64_NULL.to_le_bytes().to_vec(),
        ColumnType::I64 => colbin_field::I64_NULL.to_le_bytes().to_vec(),
        ColumnType::Float => colbin_field::FLOAT_NULL_BITS.to_le_bytes().to_vec(),
    }
}

pub struct ColumnIterator<'a> {
    file: &'a mut MemFile,
    header_start: usize,
    payload_start: usize,
    column_type: ColumnType,
    capacity: u64,
    count: u64,
}

impl<'a> ColumnIterator<'a> {
    pub fn open(file: &'a mut MemFile, offset: usize) -> DocResult<ColumnIterator<'a>> {
        file.seek(offset)?;
        let marker_byte = file.read_u8()?;
        let marker = FieldType::from_byte(marker_byte)
            .ok_or_else(|| DocError::Corrupted(format!("unknown field marker 0x{marker_byte:02x}")))?;
        let column_type = ColumnType::from_field_type(marker)
            .ok_or_else(|| DocError::TypeMismatch {
                expected: "column marker".into(),
                found: format!("{marker:?}"),
            })?;
        let capacity = file.read_varuint()?;
        let count = file.read_varuint()?;
        if count > capacity {
            return Err(DocError::Corrupted("column count exceeds capacity".into()));
        }
        let payload_start = file.tell();
        Ok(ColumnIterator {
            file,
            header_start: offset,
            payload_start,
            column_type,
            capacity,
            count,
        })
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    fn element_size(&self) -> usize {
        self.column_type.element_size()
    }

    fn element_offset(&self, idx: u64) -> usize {
        self.payload_start + (idx as usize) * self.element_size()
    }

    fn payload_end(&self) -> usize {
        self.payload_start + (self.capacity as usize) * self.element_size()
    }

    /// Seeks the parent's cursor past this column's reserved payload.
    pub fn fast_forward(&mut self) -> DocResult<()> {
        self.file.seek(self.payload_end())?;
        Ok(())
    }

    fn check_bounds(&self, idx: u64) -> DocResult<()> {
        if idx >= self.count {
            return Err(DocError::OutOfBounds(format!(
                "column index {idx} >= count {}",
                self.count
            )));
        }
        Ok(())
    }

    /// Typed read at `idx`. `None` only if the slot holds the type's NULL
    /// sentinel; out-of-range indices are an error, not `None`.
    pub fn get<T: ColumnElement>(&mut self, idx: u64) -> DocResult<Option<T>> {
        self.check_bounds(idx)?;
        if T::COLUMN_TYPE != self.column_type {
            return Err(DocError::TypeMismatch {
                expected: format!("{:?}", self.column_type),
                found: format!("{:?}", T::COLUMN_TYPE),
            });
        }
        let at = self.element_offset(idx);
        let bytes = self.file.peek_at(at, T::SIZE)?;
        let v = T::read_le(bytes);
        Ok(if v.is_null() { None } else { Some(v) })
    }

    pub fn get_bool(&mut self, idx: u64) -> DocResult<BooleanColumnValue> {
        self.check_bounds(idx)?;
        if self.column_type != ColumnType::Boolean {
            return Err(DocError::TypeMismatch {
                expected: "Boolean".into(),
                found: format!("{:?}", self.column_type),
            });
        }
        let at = self.element_offset(idx);
        let b = self.file.peek_at(at, 1)?[0];
        Ok(BooleanColumnValue::from_byte(b))
    }

    pub fn is_null(&mut self, idx: u64) -> DocResult<bool> {
        self.check_bounds(idx)?;
        if self.column_type == ColumnType::Boolean {
            Ok(self.get_bool(idx)?.is_null())
        } else {
            let at = self.element_offset(idx);
            let width = self.element_size();
            let bytes = self.file.peek_at(at, width)?.to_vec();
            Ok(match self.column_type {
                ColumnType::U8 => u8::read_le(&bytes).is_null(),
                ColumnType::U16 => u16::read_le(&bytes).is_null(),
                ColumnType::U32 => u32::read_le(&bytes).is_null(),
                ColumnType::U64 => u64::read_le(&bytes).is_null(),
                ColumnType::I8 => i8::read_le(&bytes).is_null(),
                ColumnType::I16 => i16::read_le(&bytes).is_null(),
                ColumnType::I32 => i32::read_le(&bytes).is_null(),
                ColumnType::I64 => i64::read_le(&bytes).is_null(),
                ColumnType::Float => f32::read_le(&bytes).is_null(),
                ColumnType::Boolean => unreachable!(),
            })
        }
    }

    fn write_element(&mut self, idx: u64, bytes: &[u8]) -> DocResult<()> {
        let at = self.element_offset(idx);
        self.file.write_at(at, bytes)?;
        Ok(())
    }

    pub fn update_set_null(&mut self, idx: u64) -> DocResult<()> {
        self.check_bounds(idx)?;
        let bytes = self.null_bytes();
        self.write_element(idx, &bytes)
    }

    /// Sets `idx` to a boolean value. On a non-Boolean column this is a
    /// type-conflicting update: rather than error, the column is promoted
    /// to a plain array with `idx`'s value replaced by the bool, matching
    /// every other live value's prefix unchanged.
    pub fn update_set_true(mut self, idx: u64) -> DocResult<()> {
        self.check_bounds(idx)?;
        if self.column_type != ColumnType::Boolean {
            return self.promote_with_override(idx, vec![FieldType::True.to_byte()]);
        }
        self.write_element(idx, &[BooleanColumnValue::TRUE_BYTE])
    }

    pub fn update_set_false(mut self, idx: u64) -> DocResult<()> {
        self.check_bounds(idx)?;
        if self.column_type != ColumnType::Boolean {
            return self.promote_with_override(idx, vec![FieldType::False.to_byte()]);
        }
        self.write_element(idx, &[BooleanColumnValue::FALSE_BYTE])
    }

    fn set_typed<T: ColumnElement>(mut self, idx: u64, v: T) -> DocResult<()> {
        self.check_bounds(idx)?;
        if T::COLUMN_TYPE != self.column_type {
            let scalar = T::COLUMN_TYPE
                .promoted_scalar_type()
                .expect("non-boolean column types have a scalar marker");
            let mut encoded = vec![scalar.to_byte()];
            let mut buf = vec![0u8; T::SIZE];
            v.write_le(&mut buf);
            encoded.extend_from_slice(&buf);
            return self.promote_with_override(idx, encoded);
        }
        let mut buf = vec![0u8; T::SIZE];
        v.write_le(&mut buf);
        self.write_element(idx, &buf)
    }

    pub fn update_set_u8(self, idx: u64, v: u8) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_i8(self, idx: u64, v: i8) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_u16(self, idx: u64, v: u16) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_i16(self, idx: u64, v: i16) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_u32(self, idx: u64, v: u32) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_i32(self, idx: u64, v: i32) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_u64(self, idx: u64, v: u64) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_i64(self, idx: u64, v: i64) -> DocResult<()> {
        self.set_typed(idx, v)
    }
    pub fn update_set_float(self, idx: u64, v: f32) -> DocResult<()> {
        self.set_typed(idx, v)
    }

    fn check_room(&self) -> DocResult<()> {
        if self.count >= self.capacity {
            return Err(DocError::OutOfBounds(format!(
                "column at capacity {}, cannot append",
                self.capacity
            )));
        }
        Ok(())
    }

    fn bump_count(&mut self) -> DocResult<()> {
        self.count += 1;
        self.file.update_varuint_at(self.count_offset(), self.count)
    }

    /// Appends a NULL element, consuming one reserved capacity slot.
    pub fn append_null(&mut self) -> DocResult<()> {
        self.check_room()?;
        let idx = self.count;
        let bytes = self.null_bytes();
        self.write_element(idx, &bytes)?;
        self.bump_count()
    }

    /// Appends a boolean element, consuming one reserved capacity slot.
    pub fn append_bool(&mut self, v: bool) -> DocResult<()> {
        self.check_room()?;
        if self.column_type != ColumnType::Boolean {
            return Err(DocError::TypeMismatch {
                expected: "Boolean".into(),
                found: format!("{:?}", self.column_type),
            });
        }
        let idx = self.count;
        let byte = if v { BooleanColumnValue::TRUE_BYTE } else { BooleanColumnValue::FALSE_BYTE };
        self.write_element(idx, &[byte])?;
        self.bump_count()
    }

    fn append_typed<T: ColumnElement>(&mut self, v: T) -> DocResult<()> {
        self.check_room()?;
        if T::COLUMN_TYPE != self.column_type {
            return Err(DocError::TypeMismatch {
                expected: format!("{:?}", self.column_type),
                found: format!("{:?}", T::COLUMN_TYPE),
            });
        }
        let idx = self.count;
        let mut buf = vec![0u8; T::SIZE];
        v.write_le(&mut buf);
        self.write_element(idx, &buf)?;
        self.bump_count()
    }

    pub fn append_u8(&mut self, v: u8) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_i8(&mut self, v: i8) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_u16(&mut self, v: u16) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_i16(&mut self, v: i16) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_u32(&mut self, v: u32) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_i32(&mut self, v: i32) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_u64(&mut self, v: u64) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_i64(&mut self, v: i64) -> DocResult<()> {
        self.append_typed(v)
    }
    pub fn append_float(&mut self, v: f32) -> DocResult<()> {
        self.append_typed(v)
    }

    /// Removes the element at `idx`: shifts everything above it down by one
    /// slot and pads the newly-vacated tail slot back to NULL, preserving
    /// `capacity`.
    pub fn remove(&mut self, idx: u64) -> DocResult<()> {
        self.check_bounds(idx)?;
        let width = self.element_size();
        let from = self.element_offset(idx + 1);
        let to = self.element_offset(idx);
        let shift_len = (self.count as usize - idx as usize - 1) * width;
        if shift_len > 0 {
            let chunk = self.file.peek_at(from, shift_len)?.to_vec();
            self.file.write_at(to, &chunk)?;
        }
        let tail_at = self.element_offset(self.count - 1);
        let null_bytes = self.null_bytes();
        self.file.write_at(tail_at, &null_bytes)?;
        self.count -= 1;
        self.file.update_varuint_at(self.count_offset(), self.count)?;
        Ok(())
    }

    fn count_offset(&self) -> usize {
        // The capacity varuint's width is fixed once written; walk past the
        // marker byte and that one varuint to find where count starts.
        let after_marker = self.header_start + 1;
        let remaining = self.file.peek_at(after_marker, self.file.size() - after_marker)
            .expect("header bytes in bounds");
        let (_, cap_len) = colbin_memfile::varuint::decode_varuint(remaining)
            .expect("capacity varuint well-formed");
        after_marker + cap_len
    }

    fn null_bytes(&self) -> Vec<u8> {
        null_bytes_for(self.column_type)
    }

    /// Rewrites the enclosing array element in place, replacing this column
    /// with a plain heterogeneous array holding the same live values (each
    /// promoted to its own scalar marker; NULL slots become `Null`).
    ///
    /// Resolves the column into an array by rewriting the full element
    /// extent at its original offset rather than appending at the array's
    /// tail, so the parent array never observes a half-written element.
    pub fn promote_to_array(mut self) -> DocResult<()> {
        let values = self.encode_promoted_values()?;
        self.rewrite_as_array(values)
    }

    /// Same as [`promote_to_array`](Self::promote_to_array) but with the
    /// value at `idx` replaced by an already-encoded scalar (marker byte
    /// plus payload) instead of the column's own value there. Used when a
    /// type-conflicting `update_set_*` call forces promotion.
    fn promote_with_override(mut self, idx: u64, encoded: Vec<u8>) -> DocResult<()> {
        let mut values = self.encode_promoted_values()?;
        values[idx as usize] = encoded;
        self.rewrite_as_array(values)
    }

    fn encode_promoted_values(&mut self) -> DocResult<Vec<Vec<u8>>> {
        let column_type = self.column_type;
        let count = self.count;
        let mut values: Vec<Vec<u8>> = Vec::with_capacity(count as usize);
        for idx in 0..count {
            if column_type == ColumnType::Boolean {
                let v = self.get_bool(idx)?;
                values.push(vec![match v {
                    BooleanColumnValue::True => FieldType::True.to_byte(),
                    BooleanColumnValue::False => FieldType::False.to_byte(),
                    BooleanColumnValue::Null => FieldType::Null.to_byte(),
                }]);
                continue;
            }
            if self.is_null(idx)? {
                values.push(vec![FieldType::Null.to_byte()]);
                continue;
            }
            let at = self.element_offset(idx);
            let width = self.element_size();
            let raw = self.file.peek_at(at, width)?.to_vec();
            let scalar = column_type
                .promoted_scalar_type()
                .expect("non-boolean column types have a scalar marker");
            let mut encoded = vec![scalar.to_byte()];
            encoded.extend_from_slice(&raw);
            values.push(encoded);
        }
        Ok(values)
    }

    fn rewrite_as_array(self, values: Vec<Vec<u8>>) -> DocResult<()> {
        let header_start = self.header_start;
        let old_end = self.payload_end();
        let mut new_bytes = vec![FieldType::Array.to_byte()];
        for v in &values {
            new_bytes.extend_from_slice(v);
        }
        new_bytes.push(FieldType::ArrayEnd.to_byte());

        let old_len = old_end - header_start;
        let new_len = new_bytes.len();
        self.file.seek(header_start)?;
        if new_len > old_len {
            self.file.move_right(new_len - old_len)?;
        } else if new_len < old_len {
            self.file.seek(header_start + new_len)?;
            self.file.move_left(old_len - new_len)?;
        }
        self.file.seek(header_start)?;
        self.file.write(&new_bytes)?;
        self.file.seek(header_start)?;
        Ok(())
    }

    /// Shrinks `capacity` down to `count`, recovering the reserved-but-dead
    /// tail slots. Leaves the cursor at the new extent's end so a caller
    /// walking a parent array or object can resume from exactly where this
    /// column now ends, rather than from an offset computed against the
    /// pre-pack capacity.
    pub fn pack(&mut self) -> DocResult<()> {
        let header_start = self.header_start;
        let old_end = self.payload_end();
        if self.capacity == self.count {
            self.file.seek(old_end)?;
            return Ok(());
        }
        let width = self.element_size();
        let live_len = self.count as usize * width;
        let live_bytes = self.file.peek_at(self.payload_start, live_len)?.to_vec();

        let mut new_bytes = vec![self.column_type.to_field_type().to_byte()];
        colbin_memfile::varuint::encode_varuint(self.count, &mut new_bytes);
        colbin_memfile::varuint::encode_varuint(self.count, &mut new_bytes);
        let new_header_len = new_bytes.len();
        new_bytes.extend_from_slice(&live_bytes);

        let old_len = old_end - header_start;
        let new_len = new_bytes.len();
        self.file.seek(header_start)?;
        if new_len > old_len {
            self.file.move_right(new_len - old_len)?;
        } else if new_len < old_len {
            self.file.seek(header_start + new_len)?;
            self.file.move_left(old_len - new_len)?;
        }
        self.file.seek(header_start)?;
        self.file.write(&new_bytes)?;

        self.capacity = self.count;
        self.payload_start = header_start + new_header_len;
        self.file.seek(header_start + new_len)?;
        Ok(())
    }
}
