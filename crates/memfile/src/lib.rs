//! Growable byte buffer with cursor semantics, the substrate every other
//! layer of the document store is built on. Read-only buffers reject writes;
//! read-write buffers grow geometrically as the cursor crosses the tail.

pub mod error;
pub mod string;
pub mod varuint;

pub use error::{MemError, MemResult};

use byteorder::{ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    ReadOnly,
    ReadWrite,
}

macro_rules! typed_rw {
    ($read:ident, $peek:ident, $write:ident, $update:ident, $ty:ty, $width:expr, $get:path, $put:path) => {
        pub fn $read(&mut self) -> MemResult<$ty> {
            let bytes = self.read($width)?;
            Ok($get(bytes))
        }

        pub fn $peek(&self) -> MemResult<$ty> {
            let bytes = self.peek($width)?;
            Ok($get(bytes))
        }

        pub fn $write(&mut self, v: $ty) -> MemResult<()> {
            let mut tmp = [0u8; $width];
            $put(&mut tmp, v);
            self.write(&tmp)
        }

        pub fn $update(&mut self, v: $ty) -> MemResult<()> {
            if self.pos + $width > self.buffer.len() {
                return Err(MemError::OutOfBounds {
                    at: self.pos,
                    requested: $width,
                    size: self.buffer.len(),
                });
            }
            let mut tmp = [0u8; $width];
            $put(&mut tmp, v);
            self.buffer[self.pos..self.pos + $width].copy_from_slice(&tmp);
            Ok(())
        }
    };
}

#[derive(Debug, Clone)]
pub struct MemFile {
    buffer: Vec<u8>,
    pos: usize,
    mode: Mode,
    saved_pos: Option<usize>,
}

impl MemFile {
    /// Opens an empty, growable read-write buffer.
    pub fn new_read_write() -> Self {
        MemFile {
            buffer: Vec::new(),
            pos: 0,
            mode: Mode::ReadWrite,
            saved_pos: None,
        }
    }

    /// Wraps an existing byte vector as a mutable buffer, cursor at 0.
    pub fn from_vec_read_write(buffer: Vec<u8>) -> Self {
        MemFile {
            buffer,
            pos: 0,
            mode: Mode::ReadWrite,
            saved_pos: None,
        }
    }

    /// Wraps an existing byte vector as an immutable buffer, cursor at 0.
    pub fn from_vec_read_only(buffer: Vec<u8>) -> Self {
        MemFile {
            buffer,
            pos: 0,
            mode: Mode::ReadOnly,
            saved_pos: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_read_only(&self) -> bool {
        self.mode == Mode::ReadOnly
    }

    /// Returns a read-write clone of this buffer's bytes, cursor reset to 0.
    /// Used by the revision engine to implement copy-on-write.
    pub fn clone_for_revision(&self) -> Self {
        MemFile {
            buffer: self.buffer.clone(),
            pos: 0,
            mode: Mode::ReadWrite,
            saved_pos: None,
        }
    }

    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn tell(&self) -> usize {
        self.pos
    }

    pub fn remain_size(&self) -> usize {
        self.buffer.len() - self.pos
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn seek(&mut self, pos: usize) -> MemResult<()> {
        if pos > self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at: pos,
                requested: 0,
                size: self.buffer.len(),
            });
        }
        self.pos = pos;
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> MemResult<()> {
        self.seek(self.pos + n)
    }

    /// Single-slot position stack: `save_position` remembers the current
    /// cursor, `restore_position` returns to it. Used by code that must peek
    /// elsewhere in the buffer and resume.
    pub fn save_position(&mut self) {
        self.saved_pos = Some(self.pos);
    }

    pub fn restore_position(&mut self) -> MemResult<()> {
        let saved = self.saved_pos.take().ok_or(MemError::NoSavedPosition)?;
        self.pos = saved;
        Ok(())
    }

    pub fn peek(&self, n: usize) -> MemResult<&[u8]> {
        if self.pos + n > self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at: self.pos,
                requested: n,
                size: self.buffer.len(),
            });
        }
        Ok(&self.buffer[self.pos..self.pos + n])
    }

    pub fn read(&mut self, n: usize) -> MemResult<&[u8]> {
        if self.pos + n > self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at: self.pos,
                requested: n,
                size: self.buffer.len(),
            });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buffer[start..start + n])
    }

    pub fn read_u8(&mut self) -> MemResult<u8> {
        Ok(self.read(1)?[0])
    }

    pub fn peek_u8(&self) -> MemResult<u8> {
        Ok(self.peek(1)?[0])
    }

    typed_rw!(
        read_u16,
        peek_u16,
        write_u16,
        update_u16,
        u16,
        2,
        LittleEndian::read_u16,
        LittleEndian::write_u16
    );
    typed_rw!(
        read_u32,
        peek_u32,
        write_u32,
        update_u32,
        u32,
        4,
        LittleEndian::read_u32,
        LittleEndian::write_u32
    );
    typed_rw!(
        read_u64,
        peek_u64,
        write_u64,
        update_u64,
        u64,
        8,
        LittleEndian::read_u64,
        LittleEndian::write_u64
    );
    typed_rw!(
        read_i16,
        peek_i16,
        write_i16,
        update_i16,
        i16,
        2,
        LittleEndian::read_i16,
        LittleEndian::write_i16
    );
    typed_rw!(
        read_i32,
        peek_i32,
        write_i32,
        update_i32,
        i32,
        4,
        LittleEndian::read_i32,
        LittleEndian::write_i32
    );
    typed_rw!(
        read_i64,
        peek_i64,
        write_i64,
        update_i64,
        i64,
        8,
        LittleEndian::read_i64,
        LittleEndian::write_i64
    );
    typed_rw!(
        read_f32,
        peek_f32,
        write_f32,
        update_f32,
        f32,
        4,
        LittleEndian::read_f32,
        LittleEndian::write_f32
    );

    pub fn write_i8(&mut self, v: i8) -> MemResult<()> {
        self.write(&[v as u8])
    }

    pub fn read_i8(&mut self) -> MemResult<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn peek_i8(&self) -> MemResult<i8> {
        Ok(self.peek_u8()? as i8)
    }

    pub fn update_u8(&mut self, v: u8) -> MemResult<()> {
        if self.pos >= self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at: self.pos,
                requested: 1,
                size: self.buffer.len(),
            });
        }
        self.buffer[self.pos] = v;
        Ok(())
    }

    /// Overwrites a value at an absolute offset without disturbing the
    /// cursor. Convenient for constructors that reserve space with
    /// `move_right` and then fill it in at known offsets.
    pub fn update_u8_at(&mut self, at: usize, v: u8) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_u8(v);
        self.pos = saved;
        r
    }

    pub fn update_u16_at(&mut self, at: usize, v: u16) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_u16(v);
        self.pos = saved;
        r
    }

    pub fn update_i16_at(&mut self, at: usize, v: i16) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_i16(v);
        self.pos = saved;
        r
    }

    pub fn update_i32_at(&mut self, at: usize, v: i32) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_i32(v);
        self.pos = saved;
        r
    }

    pub fn update_u32_at(&mut self, at: usize, v: u32) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_u32(v);
        self.pos = saved;
        r
    }

    pub fn update_u64_at(&mut self, at: usize, v: u64) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_u64(v);
        self.pos = saved;
        r
    }

    pub fn update_i64_at(&mut self, at: usize, v: i64) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_i64(v);
        self.pos = saved;
        r
    }

    pub fn update_f32_at(&mut self, at: usize, v: f32) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_f32(v);
        self.pos = saved;
        r
    }

    /// Reads `n` bytes at an absolute offset without disturbing the cursor.
    pub fn peek_at(&self, at: usize, n: usize) -> MemResult<&[u8]> {
        if at + n > self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at,
                requested: n,
                size: self.buffer.len(),
            });
        }
        Ok(&self.buffer[at..at + n])
    }

    /// Overwrites `bytes.len()` bytes at an absolute offset without
    /// disturbing the cursor or growing the buffer; the target range must
    /// already exist.
    pub fn write_at(&mut self, at: usize, bytes: &[u8]) -> MemResult<()> {
        if self.mode == Mode::ReadOnly {
            return Err(MemError::WriteProt);
        }
        if at + bytes.len() > self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at,
                requested: bytes.len(),
                size: self.buffer.len(),
            });
        }
        self.buffer[at..at + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// `update_varuint` at an absolute offset, cursor unchanged.
    pub fn update_varuint_at(&mut self, at: usize, v: u64) -> MemResult<()> {
        let saved = self.pos;
        self.seek(at)?;
        let r = self.update_varuint(v);
        self.pos = saved;
        r
    }

    /// Writes `bytes` at the cursor, growing the buffer geometrically if the
    /// cursor plus the write would cross the current tail. Fails with
    /// `WriteProt` in read-only mode.
    pub fn write(&mut self, bytes: &[u8]) -> MemResult<()> {
        if self.mode == Mode::ReadOnly {
            return Err(MemError::WriteProt);
        }
        let end = self.pos + bytes.len();
        if end > self.buffer.len() {
            self.grow_to(end);
        }
        self.buffer[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    fn grow_to(&mut self, min_len: usize) {
        if min_len <= self.buffer.len() {
            return;
        }
        let doubled = self.buffer.len().saturating_mul(2);
        let target_cap = doubled.max(min_len);
        if self.buffer.capacity() < target_cap {
            self.buffer.reserve(target_cap - self.buffer.len());
        }
        self.buffer.resize(min_len, 0);
    }

    /// Shifts bytes `[pos, end)` left by `n`, deleting the `n` bytes at the
    /// cursor. Used for in-place removal.
    pub fn move_left(&mut self, n: usize) -> MemResult<()> {
        if n == 0 {
            return Ok(());
        }
        if self.pos + n > self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at: self.pos,
                requested: n,
                size: self.buffer.len(),
            });
        }
        self.buffer.drain(self.pos..self.pos + n);
        Ok(())
    }

    /// Shifts bytes `[pos, end)` right by `n`, opening `n` zeroed bytes at
    /// the cursor. Used for in-place insertion.
    pub fn move_right(&mut self, n: usize) -> MemResult<()> {
        if n == 0 {
            return Ok(());
        }
        if self.mode == Mode::ReadOnly {
            return Err(MemError::WriteProt);
        }
        let insert_at = self.pos.min(self.buffer.len());
        let zeros = std::iter::repeat(0u8).take(n);
        self.buffer.splice(insert_at..insert_at, zeros);
        Ok(())
    }

    /// Truncates the tail by `n` bytes.
    pub fn cut(&mut self, n: usize) -> MemResult<()> {
        if n > self.buffer.len() {
            return Err(MemError::OutOfBounds {
                at: self.buffer.len(),
                requested: n,
                size: self.buffer.len(),
            });
        }
        let new_len = self.buffer.len() - n;
        self.buffer.truncate(new_len);
        if self.pos > new_len {
            self.pos = new_len;
        }
        Ok(())
    }

    pub fn read_varuint(&mut self) -> MemResult<u64> {
        let (value, consumed) = self.peek_varuint_with_len()?;
        self.pos += consumed;
        Ok(value)
    }

    pub fn peek_varuint(&self) -> MemResult<u64> {
        Ok(self.peek_varuint_with_len()?.0)
    }

    pub fn skip_varuint(&mut self) -> MemResult<()> {
        let (_, consumed) = self.peek_varuint_with_len()?;
        self.pos += consumed;
        Ok(())
    }

    fn peek_varuint_with_len(&self) -> MemResult<(u64, usize)> {
        let available = &self.buffer[self.pos..];
        varuint::decode_varuint(available).ok_or(MemError::OutOfBounds {
            at: self.pos,
            requested: 1,
            size: self.buffer.len(),
        })
    }

    pub fn write_varuint(&mut self, v: u64) -> MemResult<()> {
        let mut tmp = Vec::new();
        varuint::encode_varuint(v, &mut tmp);
        self.write(&tmp)
    }

    /// Overwrites the VarUInt at the cursor with `v`, keeping the existing
    /// encoded width. Fails if `v` needs more bytes than the existing
    /// encoding occupies; the cursor does not move.
    pub fn update_varuint(&mut self, v: u64) -> MemResult<()> {
        let (_, old_len) = self.peek_varuint_with_len()?;
        let needed = varuint::encoded_length(v);
        if needed > old_len {
            return Err(MemError::VarUintWontFit {
                needed,
                available: old_len,
            });
        }
        let padded = encode_varuint_padded(v, old_len);
        self.buffer[self.pos..self.pos + old_len].copy_from_slice(&padded);
        Ok(())
    }
}

/// Used by `update_varuint` to preserve the on-disk width of a VarUInt field.
fn encode_varuint_padded(v: u64, len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len);
    varuint::encode_varuint_padded(v, len, &mut out);
    out
}

#[cfg(test)]
mod tests;
