//! Columnar binary document store: a key header, a top-level array, and
//! nested arrays/objects/columns reached through forward-only iterators,
//! plus a copy-on-write revision engine for mutating a snapshot safely.

pub mod array_it;
pub mod column_it;
pub mod document;
pub mod error;
pub mod key;
pub mod lock;
pub mod object_it;
pub mod revise;
mod skip;

pub use array_it::{ArrayIterator, Element};
pub use column_it::ColumnIterator;
pub use document::Document;
pub use error::{DocError, DocResult};
pub use key::{KeyHeader, KeyKind, KeyValue};
pub use lock::RevisionLock;
pub use object_it::{ObjectIterator, PropKey};
pub use revise::{revise_begin, revise_try_begin, RevisionContext};

#[cfg(test)]
mod tests;
