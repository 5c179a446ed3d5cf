//! Buffer pool: page caching with pin/unpin accounting and clock eviction.
//!
//! # Example
//!
//! ```no_run
//! use strata::storage::buffer::BufferPoolManager;
//! use strata::storage::MemoryDiskManager;
//!
//! let pool = BufferPoolManager::new(MemoryDiskManager::new(), 64);
//!
//! // Allocate and write a new page.
//! let page_id = {
//!     let mut guard = pool.new_page().unwrap();
//!     guard.data_mut()[0..5].copy_from_slice(b"hello");
//!     guard.mark_dirty();
//!     guard.page_id()
//! }; // dropping the guard unpins the page dirty
//!
//! // Read it back.
//! let guard = pool.fetch_page(page_id).unwrap();
//! assert_eq!(&guard.data()[0..5], b"hello");
//! ```

mod error;
mod frame;
mod guard;
mod pool;
mod replacer;

pub use error::BufferPoolError;
pub use frame::FrameId;
pub use guard::{PageReadGuard, PageWriteGuard};
pub use pool::{AccessPhase, BufferPoolManager, PoolObserver, PoolStats};
pub use replacer::{ClockReplacer, LruReplacer, Replacer};
