//! Disk layer errors.

use crate::storage::PageId;

/// Errors produced by `DiskManager` implementations.
#[derive(Debug)]
pub enum DiskError {
    /// The page has not been allocated, or has been deallocated.
    PageNotFound(PageId),

    /// A buffer passed to read_page/write_page was not exactly PAGE_SIZE.
    InvalidBufferSize {
        /// Expected buffer size (PAGE_SIZE).
        expected: usize,
        /// Actual buffer size provided.
        actual: usize,
    },

    /// I/O error from the underlying file system.
    Io(std::io::Error),

    /// The backing file has an invalid format or size.
    Corrupted(String),
}

impl std::fmt::Display for DiskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiskError::PageNotFound(id) => write!(f, "page not found: {:?}", id),
            DiskError::InvalidBufferSize { expected, actual } => {
                write!(f, "invalid buffer size: expected {}, got {}", expected, actual)
            }
            DiskError::Io(e) => write!(f, "I/O error: {}", e),
            DiskError::Corrupted(msg) => write!(f, "data corruption: {}", msg),
        }
    }
}

impl std::error::Error for DiskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DiskError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DiskError {
    fn from(e: std::io::Error) -> Self {
        DiskError::Io(e)
    }
}
