//! Frames: the in-memory slots that host pages.

use parking_lot::RwLock;

use crate::storage::{PageData, PageId};

/// Identifier for a frame in the buffer pool.
///
/// Distinct from `PageId`: a page id names a logical page on disk, a frame
/// id names a physical memory slot. Frame ids are only meaningful within one
/// `BufferPoolManager` and range over `0..pool_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(usize);

impl FrameId {
    /// Creates a new `FrameId`.
    pub const fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the frame id as an index.
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

/// A buffer pool frame.
///
/// The frame holds only the page bytes, behind its own reader/writer lock so
/// that guards on different frames never contend. Bookkeeping about what the
/// frame currently hosts lives in [`FrameMetadata`] under the pool's state
/// mutex.
pub struct Frame {
    /// The page content. Read lock for inspection, write lock for loading,
    /// eviction write-back and mutation through a write guard.
    pub(super) data: RwLock<PageData>,
}

impl Frame {
    /// Creates an empty (zeroed) frame.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(PageData::new()),
        }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

/// Bookkeeping for one frame.
///
/// # Lifecycle
///
/// 1. **Free**: `page_id == None`, the frame id is on the free list
/// 2. **Resident**: a page is loaded, `page_id == Some(..)`
/// 3. **Pinned**: `pin_count > 0`, the frame cannot be evicted
/// 4. **Evictable**: `pin_count == 0`, the frame is in the replacer
///
/// Invariant: `page_id == None` implies `pin_count == 0 && !is_dirty`.
#[derive(Debug)]
pub struct FrameMetadata {
    /// The page currently hosted by this frame, if any.
    pub(super) page_id: Option<PageId>,

    /// Number of outstanding users. Each fetch increments it, each unpin
    /// (usually a guard drop) decrements it.
    pub(super) pin_count: u32,

    /// True if the in-memory copy differs from disk. Sticky until a flush
    /// or eviction writes the page back.
    pub(super) is_dirty: bool,
}

impl FrameMetadata {
    /// Creates metadata for a free frame.
    pub fn new() -> Self {
        Self {
            page_id: None,
            pin_count: 0,
            is_dirty: false,
        }
    }

    /// Marks the frame as hosting `page_id`, pinned once and clean.
    pub(super) fn reset(&mut self, page_id: PageId) {
        self.page_id = Some(page_id);
        self.pin_count = 1;
        self.is_dirty = false;
    }

    /// Returns the frame to the free state.
    pub(super) fn clear(&mut self) {
        self.page_id = None;
        self.pin_count = 0;
        self.is_dirty = false;
    }

    /// True if the frame is in use.
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }
}

impl Default for FrameMetadata {
    fn default() -> Self {
        Self::new()
    }
}
