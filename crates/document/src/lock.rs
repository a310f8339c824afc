//! Identity-level locking shared between a document snapshot and whatever
//! revision engine state is currently contending for it. A fresh
//! `RevisionLock` is created for every new revision, so "is this the latest
//! revision" reduces to "has nobody superseded *this* lock".

use colbin_spinlock::SpinFlag;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct RevisionLock {
    pub(crate) write_lock: SpinFlag,
    pub(crate) revision_lock: AtomicBool,
    pub(crate) superseded: AtomicBool,
}

impl RevisionLock {
    pub fn new() -> Self {
        RevisionLock {
            write_lock: SpinFlag::new(),
            revision_lock: AtomicBool::new(false),
            superseded: AtomicBool::new(false),
        }
    }

    pub fn is_latest(&self) -> bool {
        !self.superseded.load(Ordering::Acquire)
    }

    pub fn revision_lock_set(&self) -> bool {
        self.revision_lock.load(Ordering::Acquire)
    }
}
