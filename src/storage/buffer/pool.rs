//! The buffer pool manager.
//!
//! The pool owns a fixed array of page-sized frames and mediates every
//! access to the paged disk: fetching pins a page into a frame, unpinning
//! releases it, and a clock replacer picks which resident page gives up its
//! frame when the pool is full.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, trace};

use super::error::BufferPoolError;
use super::frame::{Frame, FrameId, FrameMetadata};
use super::guard::{PageReadGuard, PageWriteGuard};
use super::replacer::{ClockReplacer, Replacer};
use crate::storage::disk::DiskManager;
use crate::storage::log::LogManager;
use crate::storage::{PageId, INVALID_PAGE_ID};

/// Phase of an observed buffer pool operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPhase {
    /// Fired on entry, before the operation touches pool state.
    Before,
    /// Fired on exit, after the operation completed or failed.
    After,
}

/// Observer hook invoked around every public pool operation.
///
/// Used by tests to watch the pool's externally visible behavior (which
/// pages get touched, in what order) without reaching into its internals.
/// Operations that have no single page id (`new_page` before allocation,
/// `flush_all`) report `INVALID_PAGE_ID`.
pub trait PoolObserver: Send + Sync {
    /// Called with the phase and the page id the operation concerns.
    fn observe(&self, phase: AccessPhase, page_id: PageId);
}

/// Point-in-time frame accounting.
///
/// At any quiescent point `pinned + evictable + free` equals the pool size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Frames hosting a page with pin_count > 0.
    pub pinned: usize,
    /// Frames hosting a page with pin_count == 0 (replacer candidates).
    pub evictable: usize,
    /// Frames on the free list.
    pub free: usize,
}

/// Caches disk pages in a fixed set of in-memory frames.
///
/// # Structure
///
/// ```text
/// +----------------------+      +--------------------------+
/// | fetch / new / unpin  |----->| state: Mutex             |
/// | flush / delete       |      |   page_table             |
/// +----------------------+      |   metadata  (per frame)  |
///            |                  |   free_list              |
///            v                  |   replacer (boxed)       |
/// +----------------------+      +--------------------------+
/// | frames: Vec<Frame>   |
/// |   data: RwLock each  |
/// +----------------------+
///            |
///            v
/// +----------------------+
/// | DiskManager          |
/// +----------------------+
/// ```
///
/// Every state transition (page table, pin counts, dirty flags, free list,
/// replacer) happens under the single state mutex, which linearizes the
/// public operations. Page bytes sit behind per-frame reader/writer locks
/// so that guards can outlive the call that produced them.
///
/// # Lock discipline
///
/// A thread holding the state mutex never *waits* on a frame data lock;
/// data locks are taken either before the state mutex (guard drop, verified
/// flush) or while the frame is unreachable from other threads (loads and
/// eviction write-back, which run on frames that are absent from the page
/// table or past their victim selection). This keeps the two lock levels
/// acyclic.
pub struct BufferPoolManager<D: DiskManager> {
    disk: D,
    frames: Vec<Frame>,
    state: Mutex<PoolState>,
    pool_size: usize,
    log: Option<Arc<LogManager>>,
    observer: Option<Arc<dyn PoolObserver>>,
}

/// Mutable bookkeeping behind the state mutex.
struct PoolState {
    /// PageId -> FrameId for resident pages.
    page_table: HashMap<PageId, FrameId>,
    /// Per-frame metadata, indexed by FrameId.
    metadata: Vec<FrameMetadata>,
    /// Frames hosting no page.
    free_list: Vec<FrameId>,
    /// Eviction policy.
    replacer: Box<dyn Replacer>,
}

impl<D: DiskManager> BufferPoolManager<D> {
    /// Creates a buffer pool with `pool_size` frames and the default clock
    /// replacement policy.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` is 0.
    pub fn new(disk: D, pool_size: usize) -> Self {
        Self::with_replacer(disk, pool_size, Box::new(ClockReplacer::new(pool_size)))
    }

    /// Creates a buffer pool with an explicit replacement policy.
    pub fn with_replacer(disk: D, pool_size: usize, replacer: Box<dyn Replacer>) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Vec<_> = (0..pool_size).map(|_| Frame::new()).collect();
        let metadata: Vec<_> = (0..pool_size).map(|_| FrameMetadata::new()).collect();
        let free_list: Vec<_> = (0..pool_size).map(FrameId::new).collect();

        Self {
            disk,
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::with_capacity(pool_size),
                metadata,
                free_list,
                replacer,
            }),
            pool_size,
            log: None,
            observer: None,
        }
    }

    /// Attaches a log manager handle.
    ///
    /// The pool forwards no calls to it yet; a WAL integration will need it
    /// to enforce flush-before-evict.
    pub fn with_log_manager(mut self, log: Arc<LogManager>) -> Self {
        self.log = Some(log);
        self
    }

    /// Attaches an observer invoked around every public operation.
    pub fn with_observer(mut self, observer: Arc<dyn PoolObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Number of frames in the pool.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Number of pages currently resident.
    pub fn page_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    /// The attached log manager, if any.
    pub fn log_manager(&self) -> Option<&Arc<LogManager>> {
        self.log.as_ref()
    }

    /// Snapshot of the frame accounting.
    pub fn stats(&self) -> PoolStats {
        let state = self.state.lock();
        let pinned = state.metadata.iter().filter(|m| m.is_pinned()).count();
        PoolStats {
            pinned,
            evictable: state.replacer.size(),
            free: state.free_list.len(),
        }
    }

    fn notify(&self, phase: AccessPhase, page_id: PageId) {
        if let Some(observer) = &self.observer {
            observer.observe(phase, page_id);
        }
    }

    /// Fetches a page for reading.
    ///
    /// A hit pins the resident frame; a miss loads the page from disk into
    /// a free frame, evicting a victim if none is free. The returned guard
    /// holds the pin until dropped.
    ///
    /// # Errors
    ///
    /// - `BufferPoolError::NoFreeFrames` if every frame is pinned
    /// - `BufferPoolError::PageNotFound` if the page was never allocated
    /// - `BufferPoolError::Disk` for I/O failures
    pub fn fetch_page(&self, page_id: PageId) -> Result<PageReadGuard<'_, D>, BufferPoolError> {
        self.notify(AccessPhase::Before, page_id);
        let result = self.pin_or_load(page_id).map(|frame_id| {
            let data = self.frames[frame_id.as_usize()].data.read();
            PageReadGuard::new(self, frame_id, page_id, data)
        });
        self.notify(AccessPhase::After, page_id);
        result
    }

    /// Fetches a page for writing.
    ///
    /// Same residency semantics as [`BufferPoolManager::fetch_page`]; the
    /// returned guard gives exclusive access to the bytes and reports the
    /// dirtiness recorded with `mark_dirty` when it drops.
    pub fn fetch_page_mut(
        &self,
        page_id: PageId,
    ) -> Result<PageWriteGuard<'_, D>, BufferPoolError> {
        self.notify(AccessPhase::Before, page_id);
        let result = self.pin_or_load(page_id).map(|frame_id| {
            let data = self.frames[frame_id.as_usize()].data.write();
            PageWriteGuard::new(self, frame_id, page_id, data)
        });
        self.notify(AccessPhase::After, page_id);
        result
    }

    /// Allocates a new page on disk and pins it into the pool.
    ///
    /// The frame is acquired before the disk allocation so a full pool
    /// cannot leak page ids. The page starts zeroed; no disk read happens.
    pub fn new_page(&self) -> Result<PageWriteGuard<'_, D>, BufferPoolError> {
        self.notify(AccessPhase::Before, INVALID_PAGE_ID);
        let result = self.new_page_inner();
        let after_id = match &result {
            Ok(guard) => guard.page_id(),
            Err(_) => INVALID_PAGE_ID,
        };
        self.notify(AccessPhase::After, after_id);
        result
    }

    fn new_page_inner(&self) -> Result<PageWriteGuard<'_, D>, BufferPoolError> {
        let frame_id = self.acquire_frame()?;

        let page_id = match self.disk.allocate_page() {
            Ok(id) => id,
            Err(e) => {
                self.state.lock().free_list.push(frame_id);
                return Err(e.into());
            }
        };

        // Take the data lock before publishing the page so that a racing
        // fetch blocks until the buffer is zeroed. The frame is not in the
        // page table yet, so the lock is uncontended.
        let mut data = self.frames[frame_id.as_usize()].data.write();
        data.zero();

        {
            let mut state = self.state.lock();
            state.page_table.insert(page_id, frame_id);
            state.metadata[frame_id.as_usize()].reset(page_id);
        }

        Ok(PageWriteGuard::new(self, frame_id, page_id, data))
    }

    /// Explicitly unpins a page.
    ///
    /// Guards do this automatically; this entry point exists for callers
    /// that took over a pin with `PageReadGuard::detach`.
    ///
    /// Returns false if the page is not resident or its pin count is
    /// already zero; in that case nothing changes, not even the dirty flag.
    /// Otherwise the dirty flag is OR-ed sticky with `is_dirty` and the pin
    /// count decremented, handing the frame to the replacer at zero.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        self.notify(AccessPhase::Before, page_id);
        let ok = {
            let mut state = self.state.lock();
            let state = &mut *state;
            match state.page_table.get(&page_id).copied() {
                None => false,
                Some(frame_id) => {
                    let meta = &mut state.metadata[frame_id.as_usize()];
                    if meta.pin_count == 0 {
                        false
                    } else {
                        meta.is_dirty |= is_dirty;
                        meta.pin_count -= 1;
                        if meta.pin_count == 0 {
                            state.replacer.unpin(frame_id);
                        }
                        true
                    }
                }
            }
        };
        self.notify(AccessPhase::After, page_id);
        ok
    }

    /// Writes a page back to disk if it is dirty.
    ///
    /// Returns `Ok(false)` for `INVALID_PAGE_ID` or a non-resident page.
    /// A successful write clears the dirty flag. Pin state is untouched;
    /// flushing a pinned page is allowed.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool, BufferPoolError> {
        self.notify(AccessPhase::Before, page_id);
        let result = self.flush_page_inner(page_id);
        self.notify(AccessPhase::After, page_id);
        result
    }

    fn flush_page_inner(&self, page_id: PageId) -> Result<bool, BufferPoolError> {
        if page_id.is_invalid() {
            return Ok(false);
        }

        let frame_id = match self.state.lock().page_table.get(&page_id).copied() {
            Some(frame_id) => frame_id,
            None => return Ok(false),
        };

        // Re-validate under the data lock: the frame may have been evicted
        // or re-used between the lookup and here. Holding data + state
        // across the write makes check-write-clear atomic.
        let data = self.frames[frame_id.as_usize()].data.read();
        let mut state = self.state.lock();
        let meta = &mut state.metadata[frame_id.as_usize()];
        if meta.page_id != Some(page_id) {
            // The page left the pool meanwhile; eviction already wrote it.
            return Ok(true);
        }
        if meta.is_dirty {
            self.disk.write_page(page_id, data.as_slice())?;
            meta.is_dirty = false;
        }
        Ok(true)
    }

    /// Flushes every resident page.
    pub fn flush_all(&self) -> Result<(), BufferPoolError> {
        self.notify(AccessPhase::Before, INVALID_PAGE_ID);
        let result = self.flush_all_inner();
        self.notify(AccessPhase::After, INVALID_PAGE_ID);
        result
    }

    fn flush_all_inner(&self) -> Result<(), BufferPoolError> {
        let pages: Vec<PageId> = {
            let state = self.state.lock();
            state.page_table.keys().copied().collect()
        };
        debug!(pages = pages.len(), "flushing all resident pages");

        for page_id in pages {
            self.flush_page_inner(page_id)?;
        }
        self.disk.sync_all()?;
        Ok(())
    }

    /// Removes a page from the pool and deallocates it on disk.
    ///
    /// Returns `Ok(true)` if the page was absent (nothing to do) or was
    /// deleted; `Ok(false)` if it is pinned. A dirty page is written back
    /// before its id is released.
    pub fn delete_page(&self, page_id: PageId) -> Result<bool, BufferPoolError> {
        self.notify(AccessPhase::Before, page_id);
        let result = self.delete_page_inner(page_id);
        self.notify(AccessPhase::After, page_id);
        result
    }

    fn delete_page_inner(&self, page_id: PageId) -> Result<bool, BufferPoolError> {
        let frame_id = {
            let state = self.state.lock();
            match state.page_table.get(&page_id).copied() {
                None => return Ok(true),
                Some(frame_id) => {
                    if state.metadata[frame_id.as_usize()].is_pinned() {
                        return Ok(false);
                    }
                    frame_id
                }
            }
        };

        // Same data-then-state order as flush; the pin check re-runs under
        // the locks because a fetch may have raced the lookup above.
        let data = self.frames[frame_id.as_usize()].data.read();
        let mut state = self.state.lock();
        let state = &mut *state;
        let meta = &mut state.metadata[frame_id.as_usize()];
        if meta.page_id != Some(page_id) {
            return Ok(true);
        }
        if meta.is_pinned() {
            return Ok(false);
        }
        if meta.is_dirty {
            self.disk.write_page(page_id, data.as_slice())?;
        }
        self.disk.deallocate_page(page_id)?;

        trace!(page = page_id.page_num(), "deleted page");
        state.page_table.remove(&page_id);
        state.metadata[frame_id.as_usize()].clear();
        // Take the frame out of the candidate set before free-listing it,
        // or the replacer could hand it out a second time.
        state.replacer.pin(frame_id);
        state.free_list.push(frame_id);
        Ok(true)
    }

    /// Pins a resident page or loads it from disk.
    fn pin_or_load(&self, page_id: PageId) -> Result<FrameId, BufferPoolError> {
        {
            let mut state = self.state.lock();
            let state = &mut *state;
            if let Some(frame_id) = state.page_table.get(&page_id).copied() {
                let meta = &mut state.metadata[frame_id.as_usize()];
                meta.pin_count += 1;
                if meta.pin_count == 1 {
                    state.replacer.pin(frame_id);
                }
                return Ok(frame_id);
            }
        }

        let frame_id = self.acquire_frame()?;

        // Load outside the state mutex; the frame is invisible to other
        // threads until the page table insert below.
        let read_result = {
            let mut data = self.frames[frame_id.as_usize()].data.write();
            self.disk.read_page(page_id, data.as_mut_slice())
        };
        if let Err(e) = read_result {
            self.state.lock().free_list.push(frame_id);
            return Err(e.into());
        }

        let mut state = self.state.lock();
        let state = &mut *state;
        if let Some(existing) = state.page_table.get(&page_id).copied() {
            // Another thread loaded the page while we did I/O; use its
            // frame and return ours.
            state.free_list.push(frame_id);
            let meta = &mut state.metadata[existing.as_usize()];
            meta.pin_count += 1;
            if meta.pin_count == 1 {
                state.replacer.pin(existing);
            }
            return Ok(existing);
        }

        state.page_table.insert(page_id, frame_id);
        state.metadata[frame_id.as_usize()].reset(page_id);
        Ok(frame_id)
    }

    /// Produces a frame that hosts no page and is absent from the page
    /// table: the free list first, otherwise an evicted victim.
    ///
    /// A dirty victim is written back before its page-table entry goes
    /// away; if the write fails, the victim is re-registered with the
    /// replacer and the error propagates with the dirty flag intact.
    fn acquire_frame(&self) -> Result<FrameId, BufferPoolError> {
        {
            let mut state = self.state.lock();
            if let Some(frame_id) = state.free_list.pop() {
                return Ok(frame_id);
            }
        }

        loop {
            let victim = {
                let mut state = self.state.lock();
                match state.replacer.victim() {
                    Some(frame_id) => frame_id,
                    None => return Err(BufferPoolError::NoFreeFrames),
                }
            };

            let (old_page_id, is_dirty) = {
                let state = self.state.lock();
                let meta = &state.metadata[victim.as_usize()];
                (meta.page_id, meta.is_dirty)
            };

            if let Some(old_page_id) = old_page_id {
                if is_dirty {
                    let data = self.frames[victim.as_usize()].data.read();
                    trace!(
                        page = old_page_id.page_num(),
                        frame = victim.as_usize(),
                        "evicting dirty page"
                    );
                    if let Err(e) = self.disk.write_page(old_page_id, data.as_slice()) {
                        drop(data);
                        self.state.lock().replacer.unpin(victim);
                        return Err(e.into());
                    }
                }
            }

            let mut state = self.state.lock();
            let state = &mut *state;
            if state.metadata[victim.as_usize()].is_pinned() {
                // Re-pinned during the write-back; pick another victim.
                continue;
            }
            if let Some(old_page_id) = state.metadata[victim.as_usize()].page_id {
                state.page_table.remove(&old_page_id);
            }
            state.metadata[victim.as_usize()].clear();
            return Ok(victim);
        }
    }

    /// Drop-time unpin used by the guards.
    pub(super) fn unpin_frame(&self, frame_id: FrameId, is_dirty: bool) {
        let mut state = self.state.lock();
        let state = &mut *state;
        let meta = &mut state.metadata[frame_id.as_usize()];
        if meta.pin_count > 0 {
            meta.pin_count -= 1;
            if is_dirty {
                meta.is_dirty = true;
            }
            if meta.pin_count == 0 {
                state.replacer.unpin(frame_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryDiskManager;

    fn pool(pool_size: usize) -> BufferPoolManager<MemoryDiskManager> {
        BufferPoolManager::new(MemoryDiskManager::new(), pool_size)
    }

    #[test]
    fn test_new_pool_is_empty() {
        let bpm = pool(10);
        assert_eq!(bpm.pool_size(), 10);
        assert_eq!(bpm.page_count(), 0);
        assert_eq!(
            bpm.stats(),
            PoolStats {
                pinned: 0,
                evictable: 0,
                free: 10
            }
        );
    }

    #[test]
    fn test_new_page_pins_a_frame() {
        let bpm = pool(10);

        let page_id = {
            let guard = bpm.new_page().unwrap();
            assert_eq!(bpm.stats().pinned, 1);
            guard.page_id()
        };

        assert_eq!(page_id, PageId::new(0));
        assert_eq!(bpm.page_count(), 1);
        assert_eq!(bpm.stats().pinned, 0);
        assert_eq!(bpm.stats().evictable, 1);
    }

    #[test]
    fn test_fetch_hit_returns_cached_bytes() {
        let bpm = pool(10);

        let page_id = {
            let mut guard = bpm.new_page().unwrap();
            guard.data_mut()[0] = 99;
            guard.mark_dirty();
            guard.page_id()
        };

        let guard = bpm.fetch_page(page_id).unwrap();
        assert_eq!(guard.data()[0], 99);
        assert_eq!(bpm.page_count(), 1);
    }

    #[test]
    fn test_fetch_miss_loads_from_disk() {
        let disk = MemoryDiskManager::new();
        let page_id = disk.allocate_page().unwrap();
        let mut buf = vec![0u8; crate::storage::PAGE_SIZE];
        buf[7] = 42;
        disk.write_page(page_id, &buf).unwrap();

        let bpm = BufferPoolManager::new(disk, 4);
        let guard = bpm.fetch_page(page_id).unwrap();
        assert_eq!(guard.data()[7], 42);
    }

    #[test]
    fn test_fetch_unknown_page_fails() {
        let bpm = pool(4);
        assert!(matches!(
            bpm.fetch_page(PageId::new(12)),
            Err(BufferPoolError::PageNotFound(_))
        ));
        // The miss must not leak the frame it borrowed.
        assert_eq!(bpm.stats().free, 4);
    }

    #[test]
    fn test_no_free_frames_when_all_pinned() {
        let bpm = pool(2);
        let _g0 = bpm.new_page().unwrap();
        let _g1 = bpm.new_page().unwrap();

        assert!(matches!(
            bpm.new_page(),
            Err(BufferPoolError::NoFreeFrames)
        ));
    }

    #[test]
    fn test_unpin_page_explicit() {
        let bpm = pool(4);
        let guard = bpm.new_page().unwrap();
        let page_id = guard.page_id();
        drop(guard);

        // Pin again through a read guard and take over the pin.
        let read = bpm.fetch_page(page_id).unwrap();
        let detached_id = read.detach();
        assert_eq!(detached_id, page_id);
        assert_eq!(bpm.stats().pinned, 1);

        assert!(bpm.unpin_page(page_id, false));
        assert_eq!(bpm.stats().pinned, 0);

        // Already unpinned: refused.
        assert!(!bpm.unpin_page(page_id, false));
        // Not resident at all: refused.
        assert!(!bpm.unpin_page(PageId::new(4096), false));
    }

    #[test]
    fn test_dirty_flag_is_sticky() {
        let bpm = pool(4);
        let page_id = {
            let mut guard = bpm.new_page().unwrap();
            guard.data_mut()[0] = 1;
            guard.mark_dirty();
            guard.page_id()
        };

        // A clean unpin after the dirty one must not wash the flag out:
        // evicting now must still write the page back.
        {
            let _read = bpm.fetch_page(page_id).unwrap();
        }
        for _ in 0..4 {
            let _g = bpm.new_page().unwrap();
        }
        // page_id was evicted; its byte must have reached disk.
        let guard = bpm.fetch_page(page_id).unwrap();
        assert_eq!(guard.data()[0], 1);
    }

    #[test]
    fn test_flush_clears_dirty_flag() {
        let bpm = pool(4);
        let page_id = {
            let mut guard = bpm.new_page().unwrap();
            guard.data_mut()[0] = 5;
            guard.mark_dirty();
            guard.page_id()
        };

        assert!(bpm.flush_page(page_id).unwrap());
        {
            let state = bpm.state.lock();
            let frame_id = state.page_table[&page_id];
            assert!(!state.metadata[frame_id.as_usize()].is_dirty);
        }
        // Flushing a clean page is a no-op but still succeeds.
        assert!(bpm.flush_page(page_id).unwrap());
    }

    #[test]
    fn test_flush_invalid_and_absent() {
        let bpm = pool(4);
        assert!(!bpm.flush_page(INVALID_PAGE_ID).unwrap());
        assert!(!bpm.flush_page(PageId::new(3)).unwrap());
    }

    #[test]
    fn test_delete_page() {
        let bpm = pool(4);
        let page_id = {
            let guard = bpm.new_page().unwrap();
            guard.page_id()
        };

        assert!(bpm.delete_page(page_id).unwrap());
        assert_eq!(bpm.page_count(), 0);
        assert_eq!(bpm.stats().free, 4);

        // Deleting an absent page is idempotent.
        assert!(bpm.delete_page(page_id).unwrap());
    }

    #[test]
    fn test_delete_pinned_page_refused() {
        let bpm = pool(4);
        let guard = bpm.new_page().unwrap();
        let page_id = guard.page_id();

        assert!(!bpm.delete_page(page_id).unwrap());
        drop(guard);
        assert!(bpm.delete_page(page_id).unwrap());
    }

    #[test]
    fn test_eviction_prefers_free_frames() {
        let bpm = pool(3);
        // Two resident unpinned pages, one free frame left.
        let p0 = {
            let g = bpm.new_page().unwrap();
            g.page_id()
        };
        let _p1 = {
            let g = bpm.new_page().unwrap();
            g.page_id()
        };

        let _g2 = bpm.new_page().unwrap();
        // All three frames occupied now, p0 still resident (free frame was
        // used, nothing evicted).
        assert!(bpm.state.lock().page_table.contains_key(&p0));
    }

    #[test]
    fn test_accounting_invariant_holds() {
        let bpm = pool(3);
        let g0 = bpm.new_page().unwrap();
        let _g1 = bpm.new_page().unwrap();

        let check = |bpm: &BufferPoolManager<MemoryDiskManager>| {
            let s = bpm.stats();
            assert_eq!(s.pinned + s.evictable + s.free, 3);
        };

        check(&bpm);
        drop(g0);
        check(&bpm);
        let _g2 = bpm.new_page().unwrap();
        let _g3 = bpm.new_page().unwrap();
        check(&bpm);
    }

    #[test]
    fn test_pool_size_zero_panics() {
        let result = std::panic::catch_unwind(|| pool(0));
        assert!(result.is_err());
    }
}
