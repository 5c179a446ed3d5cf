//! Integration tests for the buffer pool manager.
//!
//! Exercises both disk backends, eviction write-back, the replacer seam,
//! the observer hook, and the pin/unpin accounting the pool guarantees.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use strata::storage::buffer::{
    AccessPhase, BufferPoolError, BufferPoolManager, FrameId, PoolObserver, Replacer,
};
use strata::storage::{
    DiskError, DiskManager, FileDiskManager, MemoryDiskManager, PageId, INVALID_PAGE_ID, PAGE_SIZE,
};
use tempfile::tempdir;

/// DiskManager wrapper that counts page writes, shared with the test via
/// `Arc` so writes stay observable while the pool owns the handle.
struct CountingDisk {
    inner: MemoryDiskManager,
    writes: AtomicUsize,
    written_pages: Mutex<Vec<PageId>>,
}

impl CountingDisk {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryDiskManager::new(),
            writes: AtomicUsize::new(0),
            written_pages: Mutex::new(Vec::new()),
        })
    }

    fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn wrote_page(&self, page_id: PageId) -> bool {
        self.written_pages.lock().unwrap().contains(&page_id)
    }
}

impl DiskManager for CountingDisk {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), DiskError> {
        self.inner.read_page(page_id, buf)
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), DiskError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.written_pages.lock().unwrap().push(page_id);
        self.inner.write_page(page_id, buf)
    }

    fn allocate_page(&self) -> Result<PageId, DiskError> {
        self.inner.allocate_page()
    }

    fn deallocate_page(&self, page_id: PageId) -> Result<(), DiskError> {
        self.inner.deallocate_page(page_id)
    }

    fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    fn sync_all(&self) -> Result<(), DiskError> {
        self.inner.sync_all()
    }
}

/// Generic smoke test run against both disk backends.
fn buffer_pool_basic<D: DiskManager>(disk: D) {
    let pool = BufferPoolManager::new(disk, 10);

    let page_id = {
        let mut guard = pool.new_page().unwrap();
        let page_id = guard.page_id();
        assert_eq!(guard.data().len(), PAGE_SIZE);

        guard.data_mut()[0..4].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        guard.mark_dirty();
        page_id
    };

    assert!(pool.flush_page(page_id).unwrap());

    let guard = pool.fetch_page(page_id).unwrap();
    assert_eq!(&guard.data()[0..4], &[0xDE, 0xAD, 0xBE, 0xEF]);
}

#[test]
fn test_basic_with_memory_disk() {
    buffer_pool_basic(MemoryDiskManager::new());
}

#[test]
fn test_basic_with_file_disk() {
    let dir = tempdir().unwrap();
    buffer_pool_basic(FileDiskManager::open(dir.path().join("test.db")).unwrap());
}

/// Eviction must write dirty pages back before the frame is reused.
fn eviction_writes_back<D: DiskManager>(disk: D) {
    let pool = BufferPoolManager::new(disk, 2);

    let mut page_ids = Vec::new();
    for i in 0..3u8 {
        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = 100 + i;
        guard.mark_dirty();
        page_ids.push(guard.page_id());
    }

    // Page 0 was evicted to make room for page 2; its bytes must survive.
    for (i, &page_id) in page_ids.iter().enumerate() {
        let guard = pool.fetch_page(page_id).unwrap();
        assert_eq!(guard.data()[0], 100 + i as u8);
    }
}

#[test]
fn test_eviction_with_memory_disk() {
    eviction_writes_back(MemoryDiskManager::new());
}

#[test]
fn test_eviction_with_file_disk() {
    let dir = tempdir().unwrap();
    eviction_writes_back(FileDiskManager::open(dir.path().join("test.db")).unwrap());
}

/// Scenario: a pool of three frames hands out exactly three pages while
/// all are pinned, then refuses the fourth.
#[test]
fn test_free_list_exhaustion() {
    let pool = BufferPoolManager::new(MemoryDiskManager::new(), 3);

    let g0 = pool.new_page().unwrap();
    let _g1 = pool.new_page().unwrap();
    let _g2 = pool.new_page().unwrap();

    assert!(matches!(pool.new_page(), Err(BufferPoolError::NoFreeFrames)));

    // Unpinning one page makes the next allocation succeed again.
    let p0 = g0.page_id();
    drop(g0);
    let g3 = pool.new_page().unwrap();
    assert_ne!(g3.page_id(), p0);
}

/// Scenario: after unpinning a dirty page, a new allocation reuses its
/// frame and the disk manager observes the write-back.
#[test]
fn test_eviction_write_observed_by_disk() {
    let disk = CountingDisk::new();
    let pool = BufferPoolManager::new(Arc::clone(&disk), 3);

    let p0 = {
        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = 77;
        guard.mark_dirty();
        guard.page_id()
    };
    let _g1 = pool.new_page().unwrap();
    let _g2 = pool.new_page().unwrap();
    assert_eq!(disk.write_count(), 0);

    // p0 is the only unpinned page; this allocation evicts it.
    let _g3 = pool.new_page().unwrap();
    assert_eq!(disk.write_count(), 1);
    assert!(disk.wrote_page(p0));

    // The evicted bytes come back from disk intact.
    drop(_g1);
    let guard = pool.fetch_page(p0).unwrap();
    assert_eq!(guard.data()[0], 77);
}

/// Scenario: two fetches of the same page share a frame; the pin count
/// balances out over two releases and a third unpin is refused.
#[test]
fn test_fetch_hit_refcount() {
    let pool = BufferPoolManager::new(MemoryDiskManager::new(), 3);
    let p0 = {
        let guard = pool.new_page().unwrap();
        guard.page_id()
    };

    let first = pool.fetch_page(p0).unwrap();
    let second = pool.fetch_page(p0).unwrap();
    assert_eq!(first.page_id(), second.page_id());
    assert_eq!(pool.stats().pinned, 1);
    assert_eq!(pool.page_count(), 1);

    // Hand both pins over and release them explicitly.
    first.detach();
    second.detach();
    assert!(pool.unpin_page(p0, false));
    assert!(pool.unpin_page(p0, false));

    // Pin count is zero: the frame is back with the replacer.
    assert_eq!(pool.stats().evictable, 1);
    assert!(!pool.unpin_page(p0, false));
}

/// A clean fetch/unpin cycle leaves nothing for eviction to write.
#[test]
fn test_clean_fetch_is_invisible() {
    let disk = CountingDisk::new();
    let pool = BufferPoolManager::new(Arc::clone(&disk), 2);

    let p0 = {
        let guard = pool.new_page().unwrap();
        guard.page_id()
    };

    {
        let _read = pool.fetch_page(p0).unwrap();
    }

    // Evicting the clean page must not write anything.
    let _g1 = pool.new_page().unwrap();
    let _g2 = pool.new_page().unwrap();
    assert_eq!(disk.write_count(), 0);
}

/// Unpin(dirty) followed by Unpin(clean) keeps the page dirty: the later
/// eviction still writes it out.
#[test]
fn test_dirty_flag_survives_clean_unpin() {
    let disk = CountingDisk::new();
    let pool = BufferPoolManager::new(Arc::clone(&disk), 2);

    let p0 = {
        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = 9;
        guard.mark_dirty();
        guard.page_id()
    };
    {
        let _clean = pool.fetch_page(p0).unwrap();
    }

    let _g1 = pool.new_page().unwrap();
    let _g2 = pool.new_page().unwrap();
    assert_eq!(disk.write_count(), 1);
    assert!(disk.wrote_page(p0));
}

/// Flush clears the dirty flag: a second flush and a later eviction write
/// nothing more.
#[test]
fn test_flush_clears_dirty() {
    let disk = CountingDisk::new();
    let pool = BufferPoolManager::new(Arc::clone(&disk), 2);

    let p0 = {
        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = 4;
        guard.mark_dirty();
        guard.page_id()
    };

    assert!(pool.flush_page(p0).unwrap());
    assert_eq!(disk.write_count(), 1);

    assert!(pool.flush_page(p0).unwrap());
    assert_eq!(disk.write_count(), 1);

    // Eviction of the now-clean page writes nothing either.
    let _g1 = pool.new_page().unwrap();
    let _g2 = pool.new_page().unwrap();
    assert_eq!(disk.write_count(), 1);
}

/// Flush refuses the invalid sentinel and unknown pages.
#[test]
fn test_flush_refusals() {
    let pool = BufferPoolManager::new(MemoryDiskManager::new(), 2);
    assert!(!pool.flush_page(INVALID_PAGE_ID).unwrap());
    assert!(!pool.flush_page(PageId::new(5)).unwrap());
}

/// flush_all persists every dirty page; reopening the file proves it.
#[test]
fn test_flush_all_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("flush_all.db");

    {
        let pool = BufferPoolManager::new(FileDiskManager::open(&path).unwrap(), 10);
        for i in 0..5u8 {
            let mut guard = pool.new_page().unwrap();
            guard.data_mut()[0] = i;
            guard.data_mut()[1] = i.wrapping_mul(3);
            guard.mark_dirty();
        }
        pool.flush_all().unwrap();
    }

    let pool = BufferPoolManager::new(FileDiskManager::open(&path).unwrap(), 10);
    for i in 0..5u8 {
        let guard = pool.fetch_page(PageId::new(i as u64)).unwrap();
        assert_eq!(guard.data()[0], i, "page {} byte 0", i);
        assert_eq!(guard.data()[1], i.wrapping_mul(3), "page {} byte 1", i);
    }
}

/// A custom replacement policy drops in through the Replacer trait.
struct FifoReplacer {
    queue: VecDeque<FrameId>,
}

impl FifoReplacer {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl Replacer for FifoReplacer {
    fn victim(&mut self) -> Option<FrameId> {
        self.queue.pop_front()
    }

    fn pin(&mut self, frame_id: FrameId) {
        self.queue.retain(|&id| id != frame_id);
    }

    fn unpin(&mut self, frame_id: FrameId) {
        if !self.queue.contains(&frame_id) {
            self.queue.push_back(frame_id);
        }
    }

    fn size(&self) -> usize {
        self.queue.len()
    }
}

#[test]
fn test_custom_replacer() {
    let pool = BufferPoolManager::with_replacer(
        MemoryDiskManager::new(),
        3,
        Box::new(FifoReplacer::new()),
    );

    let mut page_ids = Vec::new();
    for i in 0..3u8 {
        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = i;
        guard.mark_dirty();
        page_ids.push(guard.page_id());
    }

    // Fourth page evicts the first-unpinned frame (FIFO order).
    {
        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = 3;
        guard.mark_dirty();
    }

    let guard = pool.fetch_page(page_ids[0]).unwrap();
    assert_eq!(guard.data()[0], 0);
}

/// Observer that records every (phase, page_id) event.
struct RecordingObserver {
    events: Mutex<Vec<(AccessPhase, PageId)>>,
}

impl PoolObserver for RecordingObserver {
    fn observe(&self, phase: AccessPhase, page_id: PageId) {
        self.events.lock().unwrap().push((phase, page_id));
    }
}

#[test]
fn test_observer_sees_operations() {
    let observer = Arc::new(RecordingObserver {
        events: Mutex::new(Vec::new()),
    });
    let pool = BufferPoolManager::new(MemoryDiskManager::new(), 4)
        .with_observer(Arc::clone(&observer) as Arc<dyn PoolObserver>);

    let page_id = {
        let guard = pool.new_page().unwrap();
        guard.page_id()
    };
    {
        let _guard = pool.fetch_page(page_id).unwrap();
    }
    pool.flush_page(page_id).unwrap();

    let events = observer.events.lock().unwrap();
    // new_page: Before with the invalid sentinel, After with the real id.
    assert_eq!(events[0], (AccessPhase::Before, INVALID_PAGE_ID));
    assert_eq!(events[1], (AccessPhase::After, page_id));
    // fetch and flush bracket the page id on both sides.
    assert!(events[2..].contains(&(AccessPhase::Before, page_id)));
    let befores = events
        .iter()
        .filter(|(p, _)| *p == AccessPhase::Before)
        .count();
    let afters = events
        .iter()
        .filter(|(p, _)| *p == AccessPhase::After)
        .count();
    assert_eq!(befores, afters);
}

/// The accounting identity pinned + evictable + free == pool_size holds
/// through a mixed workload.
#[test]
fn test_accounting_identity() {
    let pool = BufferPoolManager::new(MemoryDiskManager::new(), 5);
    let check = |pool: &BufferPoolManager<MemoryDiskManager>| {
        let s = pool.stats();
        assert_eq!(s.pinned + s.evictable + s.free, 5, "stats: {:?}", s);
    };

    check(&pool);

    let g0 = pool.new_page().unwrap();
    let g1 = pool.new_page().unwrap();
    check(&pool);

    let p0 = g0.page_id();
    drop(g0);
    check(&pool);

    pool.delete_page(p0).unwrap();
    check(&pool);

    drop(g1);
    for _ in 0..6 {
        let _g = pool.new_page().unwrap();
        check(&pool);
    }
    check(&pool);
}

/// Deleting a page deallocates it on disk and recycles the frame.
#[test]
fn test_delete_reaches_disk() {
    let pool = BufferPoolManager::new(MemoryDiskManager::new(), 4);

    let page_id = {
        let guard = pool.new_page().unwrap();
        guard.page_id()
    };
    assert!(pool.delete_page(page_id).unwrap());
    assert!(matches!(
        pool.fetch_page(page_id),
        Err(BufferPoolError::PageNotFound(_))
    ));
}

/// Concurrent readers on a shared pool all see consistent bytes.
#[test]
fn test_concurrent_readers() {
    let pool = Arc::new(BufferPoolManager::new(MemoryDiskManager::new(), 8));

    let mut page_ids = Vec::new();
    for i in 0..8u8 {
        let mut guard = pool.new_page().unwrap();
        guard.data_mut()[0] = i;
        guard.mark_dirty();
        page_ids.push(guard.page_id());
    }
    let page_ids = Arc::new(page_ids);

    let mut handles = Vec::new();
    for t in 0..8usize {
        let pool = Arc::clone(&pool);
        let page_ids = Arc::clone(&page_ids);
        handles.push(std::thread::spawn(move || {
            for round in 0..200 {
                let i = (t + round) % page_ids.len();
                let guard = pool.fetch_page(page_ids[i]).unwrap();
                assert_eq!(guard.data()[0], i as u8);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
