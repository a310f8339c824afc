use colbin_memfile::MemError;
use thiserror::Error;

/// The full error taxonomy surfaced by the document store. `MemError` covers
/// the bottom layer (buffer bounds, write protection); everything above
/// that is a document, iterator, or revision-engine concern.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocError {
    #[error("required argument missing")]
    NullPtr,

    #[error("position out of bounds: {0}")]
    OutOfBounds(String),

    #[error("field type does not match operation: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("wire format violates invariants: {0}")]
    Corrupted(String),

    #[error("write attempted on a read-only document")]
    WriteProt,

    #[error("operation attempted on a non-latest revision")]
    Outdated,

    #[error("operation not valid in current state: {0}")]
    IllegalOp(String),

    #[error("illegal state: {0}")]
    IllegalState(String),

    #[error("container type does not admit this operation: {0}")]
    UnsuppContainer(String),

    #[error("operation intentionally unimplemented: {0}")]
    NotImplemented(String),

    #[error("internal invariant violated: {0}")]
    InternalErr(String),
}

impl From<MemError> for DocError {
    fn from(e: MemError) -> Self {
        match e {
            MemError::OutOfBounds { at, requested, size } => DocError::OutOfBounds(format!(
                "offset {at} + {requested} bytes exceeds buffer size {size}"
            )),
            MemError::WriteProt => DocError::WriteProt,
            MemError::VarUintWontFit { needed, available } => DocError::InternalErr(format!(
                "varuint update needs {needed} bytes, only {available} reserved"
            )),
            MemError::Internal(msg) => DocError::InternalErr(msg),
            MemError::NoSavedPosition => {
                DocError::IllegalState("restore_position with no matching save_position".into())
            }
        }
    }
}

pub type DocResult<T> = Result<T, DocError>;
