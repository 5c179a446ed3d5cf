//! Index errors.

use crate::storage::buffer::BufferPoolError;

/// Errors from hash index operations.
///
/// The index has no failure modes of its own beyond the buffer pool it
/// stores itself in; a full pool or a disk fault surfaces here.
#[derive(Debug)]
pub enum IndexError {
    /// The buffer pool could not serve a page the index needed.
    BufferPool(BufferPoolError),
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::BufferPool(e) => write!(f, "buffer pool error: {}", e),
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::BufferPool(e) => Some(e),
        }
    }
}

impl From<BufferPoolError> for IndexError {
    fn from(e: BufferPoolError) -> Self {
        IndexError::BufferPool(e)
    }
}
