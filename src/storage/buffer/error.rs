//! Buffer pool errors.

use crate::storage::{DiskError, PageId};

/// Errors from buffer pool operations.
#[derive(Debug)]
pub enum BufferPoolError {
    /// Every frame is pinned and the free list is empty.
    ///
    /// This is the miss case of fetch/new: the pool cannot make room
    /// without evicting, and nothing is evictable.
    NoFreeFrames,

    /// The requested page does not exist on disk.
    PageNotFound(PageId),

    /// Underlying disk I/O failure.
    Disk(DiskError),
}

impl std::fmt::Display for BufferPoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferPoolError::NoFreeFrames => {
                write!(f, "no free frames available and all pages are pinned")
            }
            BufferPoolError::PageNotFound(page_id) => {
                write!(f, "page not found: {:?}", page_id)
            }
            BufferPoolError::Disk(e) => write!(f, "disk error: {}", e),
        }
    }
}

impl std::error::Error for BufferPoolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BufferPoolError::Disk(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DiskError> for BufferPoolError {
    fn from(e: DiskError) -> Self {
        match e {
            DiskError::PageNotFound(id) => BufferPoolError::PageNotFound(id),
            other => BufferPoolError::Disk(other),
        }
    }
}
