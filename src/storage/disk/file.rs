//! File-backed disk manager.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use super::DiskManager;
use crate::storage::error::DiskError;
use crate::storage::page::{PageId, PAGE_SIZE};

/// Disk manager over a single database file.
///
/// Pages are stored as contiguous `PAGE_SIZE` blocks:
///
/// ```text
/// +------------------+------------------+------------------+
/// | Page 0 (8KB)     | Page 1 (8KB)     | Page 2 (8KB)     | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ offset 8192      ^ offset 16384
/// ```
///
/// A mutex around the file handle serializes seeks against reads/writes.
/// `deallocate_page` does not shrink the file; the id is retired and its
/// block left in place, and later access fails with `PageNotFound`. The
/// retired set is in-memory only, so it resets on reopen.
pub struct FileDiskManager {
    path: PathBuf,
    file: Mutex<File>,
    page_count: AtomicU64,
    deallocated: Mutex<HashSet<PageId>>,
}

impl FileDiskManager {
    /// Opens or creates a database file at the given path.
    ///
    /// An existing file's page count is derived from its length.
    ///
    /// # Errors
    ///
    /// `DiskError::Corrupted` if the file length is not a multiple of
    /// `PAGE_SIZE`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DiskError> {
        let path = path.into();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let len = file.metadata()?.len();
        if len % PAGE_SIZE as u64 != 0 {
            return Err(DiskError::Corrupted(format!(
                "file length {} is not a multiple of page size {}",
                len, PAGE_SIZE
            )));
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
            page_count: AtomicU64::new(len / PAGE_SIZE as u64),
            deallocated: Mutex::new(HashSet::new()),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_bounds(&self, page_id: PageId, buf: &[u8]) -> Result<(), DiskError> {
        if buf.len() != PAGE_SIZE {
            return Err(DiskError::InvalidBufferSize {
                expected: PAGE_SIZE,
                actual: buf.len(),
            });
        }
        if page_id.page_num() >= self.page_count.load(Ordering::Acquire) {
            return Err(DiskError::PageNotFound(page_id));
        }
        if self.deallocated.lock().contains(&page_id) {
            return Err(DiskError::PageNotFound(page_id));
        }
        Ok(())
    }
}

impl DiskManager for FileDiskManager {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), DiskError> {
        self.check_bounds(page_id, buf)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), DiskError> {
        self.check_bounds(page_id, buf)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        file.write_all(buf)?;
        Ok(())
    }

    fn allocate_page(&self) -> Result<PageId, DiskError> {
        let mut file = self.file.lock();

        let page_id = PageId::new(self.page_count.load(Ordering::Acquire));
        file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        file.write_all(&[0u8; PAGE_SIZE])?;
        self.page_count.store(page_id.page_num() + 1, Ordering::Release);
        Ok(page_id)
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), DiskError> {
        if page_id.page_num() >= self.page_count.load(Ordering::Acquire) {
            return Err(DiskError::PageNotFound(page_id));
        }
        // The block stays in the file; reclaiming space would need a
        // free-page map, which this backend does not keep. Retiring the id
        // is enough to make later access fail.
        self.deallocated.lock().insert(page_id);
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.page_count.load(Ordering::Acquire) as usize
    }

    fn sync_all(&self) -> Result<(), DiskError> {
        self.file.lock().sync_all()?;
        Ok(())
    }
}
