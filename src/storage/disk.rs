//! Page-level disk I/O backends.
//!
//! The `DiskManager` trait is the boundary between the buffer pool and
//! persistent storage: fixed-size block reads and writes plus page-id
//! allocation. Two implementations are provided, `MemoryDiskManager` for
//! tests and `FileDiskManager` for a real database file.

mod file;
mod memory;

pub use file::FileDiskManager;
pub use memory::MemoryDiskManager;

use super::error::DiskError;
use super::page::PageId;

/// Page I/O backend.
///
/// All I/O is page-sized: `buf` must be exactly `PAGE_SIZE` bytes for both
/// reads and writes. The disk manager does not cache and does not interpret
/// page contents; caching is the buffer pool's job, interpretation is the
/// job of whoever formats the page.
///
/// # Allocation
///
/// `allocate_page` grows the storage by one zeroed page and returns its id;
/// the first allocation on empty storage returns page 0. `deallocate_page`
/// releases a page id. Ids are never reused.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`; the buffer pool calls them from
/// multiple threads and relies on each call being internally consistent.
pub trait DiskManager: Send + Sync {
    /// Reads a page into a caller-provided buffer.
    ///
    /// # Errors
    ///
    /// `DiskError::PageNotFound` if the page was never allocated (or has
    /// been deallocated), `DiskError::InvalidBufferSize` if
    /// `buf.len() != PAGE_SIZE`.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), DiskError>;

    /// Writes a page from a caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DiskManager::read_page`].
    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), DiskError>;

    /// Allocates a new zeroed page and returns its id.
    fn allocate_page(&self) -> Result<PageId, DiskError>;

    /// Releases a page id.
    ///
    /// Subsequent reads and writes of the page fail with `PageNotFound`
    /// where the backend can track it.
    fn deallocate_page(&self, page_id: PageId) -> Result<(), DiskError>;

    /// Total number of pages ever allocated.
    fn page_count(&self) -> usize;

    /// Forces pending writes to physical storage.
    ///
    /// A no-op for in-memory backends.
    fn sync_all(&self) -> Result<(), DiskError>;
}

// The buffer pool takes its disk manager by value; a shared handle keeps
// the disk observable from outside (tests, checkpointing).
impl<D: DiskManager + ?Sized> DiskManager for std::sync::Arc<D> {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), DiskError> {
        (**self).read_page(page_id, buf)
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), DiskError> {
        (**self).write_page(page_id, buf)
    }

    fn allocate_page(&self) -> Result<PageId, DiskError> {
        (**self).allocate_page()
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), DiskError> {
        (**self).deallocate_page(page_id)
    }

    fn page_count(&self) -> usize {
        (**self).page_count()
    }

    fn sync_all(&self) -> Result<(), DiskError> {
        (**self).sync_all()
    }
}
