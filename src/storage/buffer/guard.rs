//! RAII guards for page access.
//!
//! A guard is a pin made visible to the borrow checker: holding one keeps
//! the page resident, and dropping it unpins on every exit path. Write
//! guards additionally carry the dirtiness that the drop-time unpin reports
//! to the pool.

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use super::frame::FrameId;
use super::pool::BufferPoolManager;
use crate::storage::disk::DiskManager;
use crate::storage::{PageData, PageId};

/// Shared, read-only access to a resident page.
///
/// Dropping the guard unpins the page clean.
pub struct PageReadGuard<'a, D: DiskManager> {
    pool: &'a BufferPoolManager<D>,
    frame_id: FrameId,
    page_id: PageId,
    data: RwLockReadGuard<'a, PageData>,
    unpin_on_drop: bool,
}

impl<'a, D: DiskManager> PageReadGuard<'a, D> {
    pub(super) fn new(
        pool: &'a BufferPoolManager<D>,
        frame_id: FrameId,
        page_id: PageId,
        data: RwLockReadGuard<'a, PageData>,
    ) -> Self {
        Self {
            pool,
            frame_id,
            page_id,
            data,
            unpin_on_drop: true,
        }
    }

    /// The id of the guarded page.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// The page bytes.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Releases the guard without unpinning.
    ///
    /// The caller takes over the pin and must balance it with
    /// `BufferPoolManager::unpin_page`. Returns the page id.
    pub fn detach(mut self) -> PageId {
        self.unpin_on_drop = false;
        self.page_id
    }
}

impl<'a, D: DiskManager> std::ops::Deref for PageReadGuard<'a, D> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data.as_slice()
    }
}

impl<'a, D: DiskManager> Drop for PageReadGuard<'a, D> {
    fn drop(&mut self) {
        if self.unpin_on_drop {
            self.pool.unpin_frame(self.frame_id, false);
        }
    }
}

/// Exclusive, mutable access to a resident page.
///
/// Mutation does not implicitly dirty the page: callers that changed bytes
/// must say so with [`PageWriteGuard::mark_dirty`] before the guard drops,
/// so a probe that merely inspected a page can release it clean.
pub struct PageWriteGuard<'a, D: DiskManager> {
    pool: &'a BufferPoolManager<D>,
    frame_id: FrameId,
    page_id: PageId,
    data: RwLockWriteGuard<'a, PageData>,
    dirty: bool,
}

impl<'a, D: DiskManager> PageWriteGuard<'a, D> {
    pub(super) fn new(
        pool: &'a BufferPoolManager<D>,
        frame_id: FrameId,
        page_id: PageId,
        data: RwLockWriteGuard<'a, PageData>,
    ) -> Self {
        Self {
            pool,
            frame_id,
            page_id,
            data,
            dirty: false,
        }
    }

    /// The id of the guarded page.
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// The page bytes.
    pub fn data(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// The page bytes, mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.data.as_mut_slice()
    }

    /// Records that the page bytes were modified.
    ///
    /// The drop-time unpin reports the page dirty, which keeps the write
    /// alive until eviction or an explicit flush.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

impl<'a, D: DiskManager> std::ops::Deref for PageWriteGuard<'a, D> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.data.as_slice()
    }
}

impl<'a, D: DiskManager> Drop for PageWriteGuard<'a, D> {
    fn drop(&mut self) {
        self.pool.unpin_frame(self.frame_id, self.dirty);
    }
}
