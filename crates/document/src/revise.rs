//! Copy-on-write revision engine: a revision opens its own private copy of
//! the buffer, mutates it through the regular iterators, then either
//! commits (`end`, installing the copy back on the source and bumping its
//! revision counter) or discards it (`abort`).
//!
//! Dot-path navigation (`find_open`/`find_close`) is out of scope; the
//! surface exists so callers have somewhere to migrate to if that ever
//! changes, but both return [`DocError::NotImplemented`].

use crate::array_it::ArrayIterator;
use crate::document::Document;
use crate::error::{DocError, DocResult};
use crate::key::{self, KeyHeader};
use crate::lock::RevisionLock;
use crate::object_it::ObjectIterator;
use colbin_field::FieldType;
use colbin_memfile::MemFile;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub struct RevisionContext<'doc> {
    source: &'doc mut Document,
    old_lock: Arc<RevisionLock>,
    new_lock: Arc<RevisionLock>,
    buffer: MemFile,
    header: KeyHeader,
}

/// Blocks until the document's write lock is free, then opens a revision
/// against a private copy of its current contents.
pub fn revise_begin(doc: &mut Document) -> DocResult<RevisionContext<'_>> {
    let old_lock = doc.lock.clone();
    old_lock.write_lock.acquire();
    Ok(open_context(doc, old_lock))
}

/// Non-blocking variant of [`revise_begin`]: fails immediately, rather than
/// spinning, if another revision is already in progress.
pub fn revise_try_begin(doc: &mut Document) -> DocResult<RevisionContext<'_>> {
    let old_lock = doc.lock.clone();
    if !old_lock.write_lock.try_acquire() {
        return Err(DocError::IllegalState(
            "a revision is already in progress on this document".into(),
        ));
    }
    Ok(open_context(doc, old_lock))
}

fn open_context(doc: &mut Document, old_lock: Arc<RevisionLock>) -> RevisionContext<'_> {
    let buffer = doc.buffer.clone_for_revision();
    let header = doc.header.clone();
    RevisionContext {
        source: doc,
        old_lock,
        new_lock: Arc::new(RevisionLock::new()),
        buffer,
        header,
    }
}

impl<'doc> RevisionContext<'doc> {
    pub fn header(&self) -> &KeyHeader {
        &self.header
    }

    pub fn payload_start(&self) -> usize {
        match self.header.revision_offset {
            Some(off) => {
                let mut probe = self.buffer.clone();
                probe.seek(off).expect("revision offset in bounds");
                probe.skip_varuint().expect("revision varuint well formed");
                probe.tell()
            }
            None => self.header.value_offset,
        }
    }

    pub fn iterator_open(&mut self) -> DocResult<ArrayIterator<'_>> {
        let at = self.payload_start();
        ArrayIterator::open(&mut self.buffer, at)
    }

    /// Closes an iterator previously opened with [`iterator_open`]; the
    /// iterator's own `Drop` already releases its borrow, so this only
    /// exists to mirror the source's named lifecycle calls.
    pub fn iterator_close(&mut self, _it: ArrayIterator<'_>) {}

    pub fn find_open(&mut self, _dot_path: &str) -> DocResult<()> {
        Err(DocError::NotImplemented(
            "dot-path navigation is out of scope".into(),
        ))
    }

    pub fn find_close(&mut self) -> DocResult<()> {
        Err(DocError::NotImplemented(
            "dot-path navigation is out of scope".into(),
        ))
    }

    pub fn set_unsigned(&mut self, v: u64) -> DocResult<()> {
        key::set_unsigned(&mut self.buffer, &mut self.header, v)
    }

    pub fn set_signed(&mut self, v: i64) -> DocResult<()> {
        key::set_signed(&mut self.buffer, &mut self.header, v)
    }

    pub fn set_auto(&mut self, v: u64) -> DocResult<()> {
        key::set_auto(&mut self.buffer, &mut self.header, v)
    }

    pub fn set_string(&mut self, s: &str) -> DocResult<()> {
        key::set_string(&mut self.buffer, &mut self.header, s)
    }

    /// Removes the `idx`-th element of the top-level array.
    pub fn remove_one(&mut self, idx: usize) -> DocResult<()> {
        let mut it = self.iterator_open()?;
        it.rewind()?;
        for _ in 0..idx {
            if !it.next()? {
                return Err(DocError::OutOfBounds(format!("index {idx} out of range")));
            }
        }
        it.remove()
    }

    /// Removes several top-level elements in one pass; indices are applied
    /// highest-first so earlier removals never shift a not-yet-processed
    /// index out from under it.
    pub fn remove(&mut self, indices: &[usize]) -> DocResult<()> {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        for idx in sorted.into_iter().rev() {
            self.remove_one(idx)?;
        }
        Ok(())
    }

    /// Recursively compacts every column's reserved capacity down to its
    /// live count, recovering slack left behind by earlier removals.
    pub fn pack(&mut self) -> DocResult<()> {
        let start = self.payload_start();
        let mut root = ArrayIterator::open(&mut self.buffer, start)?;
        pack_array(&mut root)
    }

    /// The buffer's allocation is a plain `Vec<u8>` sized to its logical
    /// content already (no separate over-allocation surfaces through
    /// `MemFile`'s API); `pack` is what actually recovers space here.
    pub fn shrink(&mut self) -> DocResult<()> {
        self.pack()
    }

    /// Commits the revision: installs the private buffer back on the
    /// source document, bumps its revision counter, and supersedes the lock
    /// this revision started from so readers holding the old snapshot see
    /// `is_latest() == false`.
    pub fn end(self) -> DocResult<()> {
        let RevisionContext {
            source,
            old_lock,
            new_lock,
            mut buffer,
            mut header,
        } = self;
        key::bump_revision(&mut buffer, &mut header)?;
        source.buffer = buffer;
        source.header = header;
        old_lock.superseded.store(true, Ordering::Release);
        source.lock = new_lock;
        old_lock.write_lock.release();
        Ok(())
    }

    /// Discards the revision's private buffer; the source document is left
    /// exactly as it was before [`revise_begin`]/[`revise_try_begin`].
    pub fn abort(self) {
        self.old_lock.write_lock.release();
    }
}

/// Packs every nested column and child array/object, then collapses the
/// trailing slack run (if any) between the last live element and `ARRAY_END`
/// by `move_left`-ing it out of the buffer.
fn pack_array(it: &mut ArrayIterator<'_>) -> DocResult<()> {
    it.rewind()?;
    let mut last_live_end = it.tell();
    loop {
        if !it.has_next()? {
            break;
        }
        let ft = it.field_type()?;
        if ft.is_column() {
            let mut col = it.open_nested_column()?;
            col.pack()?;
            last_live_end = it.tell();
            continue;
        }
        if ft == FieldType::Array {
            let mut sub = it.open_nested_array()?;
            pack_array(&mut sub)?;
            sub.fast_forward()?;
            last_live_end = it.tell();
            continue;
        }
        if ft == FieldType::Object {
            let mut sub = it.open_nested_object()?;
            pack_object(&mut sub)?;
            sub.fast_forward()?;
            last_live_end = it.tell();
            continue;
        }
        if !it.next()? {
            break;
        }
        last_live_end = it.tell();
    }
    let end_marker = it.tell();
    collapse_slack(it.file, last_live_end, end_marker)
}

fn pack_object(it: &mut ObjectIterator<'_>) -> DocResult<()> {
    it.rewind()?;
    let mut last_live_end = it.tell();
    loop {
        if !it.has_next()? {
            break;
        }
        let ft = it.prop_type()?;
        if ft.is_column() {
            let mut col = it.open_nested_column()?;
            col.pack()?;
            last_live_end = it.tell();
            continue;
        }
        if ft == FieldType::Array {
            let mut sub = it.open_nested_array()?;
            pack_array(&mut sub)?;
            sub.fast_forward()?;
            last_live_end = it.tell();
            continue;
        }
        if ft == FieldType::Object {
            let mut sub = it.open_nested_object()?;
            pack_object(&mut sub)?;
            sub.fast_forward()?;
            last_live_end = it.tell();
            continue;
        }
        if !it.next()? {
            break;
        }
        last_live_end = it.tell();
    }
    let end_marker = it.tell();
    collapse_slack(it.file, last_live_end, end_marker)
}

/// Removes the `[last_live_end, end_marker)` slack run, leaving the cursor on
/// the end marker at its new, shifted-down position.
fn collapse_slack(file: &mut MemFile, last_live_end: usize, end_marker: usize) -> DocResult<()> {
    if end_marker > last_live_end {
        file.seek(last_live_end)?;
        file.move_left(end_marker - last_live_end)?;
    }
    Ok(())
}
