//! The `Document`: a key header followed by a top-level array, held in a
//! [`MemFile`], plus the versioning metadata that lets the revision engine
//! implement copy-on-write.

use crate::array_it::ArrayIterator;
use crate::error::{DocError, DocResult};
use crate::key::{self, KeyHeader, KeyKind};
use crate::lock::RevisionLock;
use colbin_field::FieldType;
use colbin_memfile::MemFile;
use std::sync::Arc;

pub struct Document {
    pub(crate) buffer: MemFile,
    pub(crate) header: KeyHeader,
    pub(crate) lock: Arc<RevisionLock>,
    pub(crate) last_error: Option<DocError>,
}

impl Document {
    /// Creates a new, empty document: a key header of `kind` followed by an
    /// empty top-level array.
    pub fn new(kind: KeyKind) -> DocResult<Document> {
        let mut buffer = MemFile::new_read_write();
        let header = key::write_key_header(&mut buffer, kind)?;
        buffer.write(&[FieldType::Array.to_byte()])?;
        buffer.write(&[FieldType::ArrayEnd.to_byte()])?;
        Ok(Document {
            buffer,
            header,
            lock: Arc::new(RevisionLock::new()),
            last_error: None,
        })
    }

    /// Parses an existing byte stream (as produced by [`Document::as_bytes`])
    /// into a read-only document.
    pub fn open_read_only(bytes: Vec<u8>) -> DocResult<Document> {
        let mut buffer = MemFile::from_vec_read_only(bytes);
        if buffer.size() < 2 {
            return Err(DocError::Corrupted("buffer shorter than a bare header".into()));
        }
        let header = key::read_key_header(&mut buffer)?;
        Ok(Document {
            buffer,
            header,
            lock: Arc::new(RevisionLock::new()),
            last_error: None,
        })
    }

    pub fn key_kind(&self) -> KeyKind {
        self.header.kind
    }

    pub fn header(&self) -> &KeyHeader {
        &self.header
    }

    pub fn revision(&self) -> u64 {
        self.header.revision
    }

    pub fn is_latest(&self) -> bool {
        self.lock.is_latest()
    }

    /// Offset of the top-level array's marker byte, just past the key header.
    pub fn payload_start(&self) -> usize {
        // Re-derive from whichever offset was recorded last: the revision
        // VarUInt (if any) is immediately followed by the payload, and for
        // NoKey the value offset itself is the payload start.
        match self.header.revision_offset {
            Some(rev_off) => {
                let mut probe = self.buffer.clone();
                probe.seek(rev_off).expect("recorded offset in bounds");
                probe.skip_varuint().expect("revision varuint well-formed");
                probe.tell()
            }
            None => self.header.value_offset,
        }
    }

    /// Opens a read/write cursor on the top-level array. Mutating through it
    /// bypasses the revision engine entirely; prefer [`revise_begin`](crate::revise::revise_begin)
    /// for anything that should bump the revision counter or respect the
    /// write lock.
    pub fn iterator_open(&mut self) -> DocResult<ArrayIterator<'_>> {
        let at = self.payload_start();
        ArrayIterator::open(&mut self.buffer, at)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    pub fn last_error(&self) -> Option<&DocError> {
        self.last_error.as_ref()
    }

    pub fn set_last_error(&mut self, err: DocError) {
        self.last_error = Some(err);
    }
}
