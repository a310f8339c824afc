use thiserror::Error;

/// Failure modes raised directly by [`crate::MemFile`] primitives.
///
/// These are the bottom of the error taxonomy; higher layers (field, column,
/// revision engine) wrap this error and add their own kinds.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MemError {
    #[error("read/peek of {requested} bytes at offset {at} exceeds buffer size {size}")]
    OutOfBounds {
        at: usize,
        requested: usize,
        size: usize,
    },

    #[error("write attempted on a read-only buffer")]
    WriteProt,

    #[error("update_varuint: new value needs {needed} bytes but only {available} were reserved")]
    VarUintWontFit { needed: usize, available: usize },

    #[error("internal invariant violated: {0}")]
    Internal(String),

    #[error("restore_position called with no matching save_position")]
    NoSavedPosition,
}

pub type MemResult<T> = Result<T, MemError>;
