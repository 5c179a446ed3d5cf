//! Disk-resident linear-probing hash table.
//!
//! The table stores itself entirely in pages obtained from the buffer pool:
//! one directory (header) page naming the logical size and the block pages,
//! and block pages holding the slots. Every operation follows the same
//! motion: compute a slot index, ask the directory which block owns it,
//! fetch that block, act on the slot, release both pages with the right
//! dirtiness.
//!
//! Probing is linear with wrap-around: from the home slot `hash % size`,
//! advance by one until the visit resolves or the probe returns home. A
//! removed entry leaves a tombstone (occupied, not readable) so chains stay
//! walkable; lookups pass through tombstones, inserts re-use them.

use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::block_page::BlockPage;
use super::codec::{FixedCodec, KeyHasher};
use super::error::IndexError;
use super::header_page::HeaderPage;
use crate::storage::buffer::BufferPoolManager;
use crate::storage::disk::DiskManager;
use crate::storage::PageId;
use crate::tx::Transaction;

/// Outcome of an insert attempt at one slot.
enum SlotWrite {
    /// The pair was written into an empty slot or a tombstone.
    Inserted,
    /// The identical pair already lives here; the insert is a no-op.
    Duplicate,
    /// A different live entry holds the slot; the probe advances.
    Taken,
}

/// Outcome of a remove attempt at one slot.
enum SlotErase {
    /// The pair was found and tombstoned.
    Removed,
    /// The slot was never occupied; the chain ends here.
    Vacant,
    /// Occupied by something else (or a tombstone); the probe advances.
    Skip,
}

/// A linear-probing hash index over fixed-width keys and values.
///
/// Generic over the key and value encodings, the disk backend of the buffer
/// pool it lives in, and the hash function. Key equality is `Eq`; the hash
/// is a parameter so tests can force collisions.
///
/// # Concurrency
///
/// A reader/writer latch guards the table. Lookup, insert and remove take
/// it shared: slot updates are safe under the per-block write locks the
/// page guards provide. Resize takes it exclusive, because it replaces the
/// directory wholesale. The latch owns the header page id, so the pointer
/// is re-read under the latch on every operation and can never be seen
/// stale across a resize.
pub struct LinearProbeHashTable<K, V, D: DiskManager, H> {
    name: String,
    pool: Arc<BufferPoolManager<D>>,
    hasher: H,
    /// The index latch and the one datum it protects.
    header_page_id: RwLock<PageId>,
    _marker: PhantomData<(K, V)>,
}

impl<K, V, D, H> LinearProbeHashTable<K, V, D, H>
where
    K: FixedCodec + Eq,
    V: FixedCodec + Eq,
    D: DiskManager,
    H: KeyHasher<K>,
{
    /// Creates a new index with room for at least `num_buckets` entries.
    ///
    /// Bootstraps an empty directory page and grows it through the regular
    /// resize path, which leaves the table with a logical size of
    /// `2 * (num_buckets / 2 + 1)`.
    pub fn new(
        name: impl Into<String>,
        pool: Arc<BufferPoolManager<D>>,
        num_buckets: usize,
        hasher: H,
    ) -> Result<Self, IndexError> {
        let header_page_id = {
            let mut guard = pool.new_page()?;
            let id = guard.page_id();
            {
                let mut header = HeaderPage::new(guard.data_mut());
                header.init(id);
            }
            guard.mark_dirty();
            id
        };

        let table = Self {
            name: name.into(),
            pool,
            hasher,
            header_page_id: RwLock::new(header_page_id),
            _marker: PhantomData,
        };
        table.resize(num_buckets / 2 + 1)?;
        Ok(table)
    }

    /// The index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current directory page id.
    pub fn header_page_id(&self) -> PageId {
        *self.header_page_id.read()
    }

    /// The current logical slot count.
    pub fn size(&self) -> Result<usize, IndexError> {
        let header_id = self.header_page_id.read();
        self.table_size(*header_id)
    }

    /// Collects every value stored under `key`.
    ///
    /// Probes from the home slot until a never-occupied slot or a full
    /// wrap; tombstones are stepped over, not stopped at.
    pub fn get_value(&self, _tx: &Transaction, key: &K) -> Result<Vec<V>, IndexError> {
        let header_id = self.header_page_id.read();
        let size = self.table_size(*header_id)?;

        let home = self.home_slot(key, size);
        let mut probe = home;
        let mut values = Vec::new();
        loop {
            if !self.probe_slot(*header_id, probe, key, &mut values)? {
                break;
            }
            probe = (probe + 1) % size;
            if probe == home {
                break;
            }
        }
        Ok(values)
    }

    /// Inserts `(key, value)`.
    ///
    /// Returns false if the identical pair is already present. If the probe
    /// wraps without finding a free slot the table resizes itself (doubling
    /// its logical size) and the insert retries from scratch.
    pub fn insert(&self, _tx: &Transaction, key: &K, value: &V) -> Result<bool, IndexError> {
        loop {
            let (outcome, size) = {
                let header_id = self.header_page_id.read();
                let size = self.table_size(*header_id)?;

                let home = self.home_slot(key, size);
                let mut probe = home;
                let outcome = loop {
                    match self.try_insert_slot(*header_id, probe, key, value)? {
                        SlotWrite::Inserted => break Some(true),
                        SlotWrite::Duplicate => break Some(false),
                        SlotWrite::Taken => {
                            probe = (probe + 1) % size;
                            if probe == home {
                                break None;
                            }
                        }
                    }
                };
                (outcome, size)
            };
            match outcome {
                Some(inserted) => return Ok(inserted),
                // Chain completely full: grow, then try again. The shared
                // latch is already released here; resize takes it exclusive.
                None => self.resize(size)?,
            }
        }
    }

    /// Removes `(key, value)` if present, leaving a tombstone.
    ///
    /// Returns false when the pair is not in the table.
    pub fn remove(&self, _tx: &Transaction, key: &K, value: &V) -> Result<bool, IndexError> {
        let header_id = self.header_page_id.read();
        let size = self.table_size(*header_id)?;

        let home = self.home_slot(key, size);
        let mut probe = home;
        loop {
            match self.try_remove_slot(*header_id, probe, key, value)? {
                SlotErase::Removed => return Ok(true),
                SlotErase::Vacant => return Ok(false),
                SlotErase::Skip => {
                    probe = (probe + 1) % size;
                    if probe == home {
                        return Ok(false);
                    }
                }
            }
        }
    }

    /// Rebuilds the table with a logical size of `2 * initial_size`.
    ///
    /// Builds a fresh directory with zeroed blocks, switches the live
    /// header pointer under the exclusive latch, re-inserts every readable
    /// pair from the old blocks under the new size, then deletes the old
    /// pages through the buffer pool.
    ///
    /// # Panics
    ///
    /// Panics if `initial_size` is 0.
    pub fn resize(&self, initial_size: usize) -> Result<(), IndexError> {
        assert!(initial_size > 0, "resize requires a non-zero size");

        let mut header_id = self.header_page_id.write();
        let new_size = 2 * initial_size;
        let capacity = Self::block_capacity();
        debug!(name = %self.name, new_size, "resizing hash index");

        // New directory first: size, then enough zeroed blocks to cover it.
        let new_header_id = {
            let mut hguard = self.pool.new_page()?;
            let id = hguard.page_id();
            {
                let mut header = HeaderPage::new(hguard.data_mut());
                header.init(id);
                header.set_size(new_size);
                while header.num_blocks() * capacity < new_size {
                    let mut bguard = self.pool.new_page()?;
                    bguard.mark_dirty();
                    header.add_block_page_id(bguard.page_id());
                }
            }
            hguard.mark_dirty();
            id
        };

        // Switch the live pointer. Readers are excluded by the latch; any
        // operation that starts after this sees only the new directory.
        let old_header_id = std::mem::replace(&mut *header_id, new_header_id);

        let old_blocks: Vec<PageId> = {
            let hguard = self.pool.fetch_page(old_header_id)?;
            let header = HeaderPage::new(hguard.data());
            (0..header.num_blocks())
                .map(|i| header.block_page_id(i))
                .collect()
        };

        for &old_block_id in &old_blocks {
            // Copy the live pairs out before re-inserting, so at most one
            // block page is pinned alongside the header at any time.
            let entries: Vec<(K, V)> = {
                let bguard = self.pool.fetch_page(old_block_id)?;
                let block = BlockPage::<K, V, _>::new(bguard.data());
                (0..capacity)
                    .filter(|&i| block.is_readable(i))
                    .map(|i| (block.key_at(i), block.value_at(i)))
                    .collect()
            };

            for (key, value) in entries {
                // Same collision walk as insert; the source is duplicate-
                // free and the new table has room, so this terminates.
                let home = self.home_slot(&key, new_size);
                let mut probe = home;
                loop {
                    match self.try_insert_slot(new_header_id, probe, &key, &value)? {
                        SlotWrite::Inserted | SlotWrite::Duplicate => break,
                        SlotWrite::Taken => probe = (probe + 1) % new_size,
                    }
                }
            }

            self.pool.delete_page(old_block_id)?;
        }
        self.pool.delete_page(old_header_id)?;

        Ok(())
    }

    /// Slots per block page for this key/value encoding.
    fn block_capacity() -> usize {
        BlockPage::<K, V, &'static [u8]>::capacity()
    }

    fn home_slot(&self, key: &K, size: usize) -> usize {
        (self.hasher.hash_key(key) % size as u64) as usize
    }

    /// Reads the logical size from the directory page.
    fn table_size(&self, header_id: PageId) -> Result<usize, IndexError> {
        let guard = self.pool.fetch_page(header_id)?;
        let header = HeaderPage::new(guard.data());
        Ok(header.size())
    }

    /// Resolves a global slot to its block page and in-block index.
    fn block_location(&self, header_id: PageId, slot: usize) -> Result<(PageId, usize), IndexError> {
        let capacity = Self::block_capacity();
        let block_id = {
            let guard = self.pool.fetch_page(header_id)?;
            let header = HeaderPage::new(guard.data());
            header.block_page_id(slot / capacity)
        };
        Ok((block_id, slot % capacity))
    }

    /// Visits one slot for a lookup. Returns false when the chain ends.
    fn probe_slot(
        &self,
        header_id: PageId,
        slot: usize,
        key: &K,
        values: &mut Vec<V>,
    ) -> Result<bool, IndexError> {
        let (block_id, index) = self.block_location(header_id, slot)?;
        let guard = self.pool.fetch_page(block_id)?;
        let block = BlockPage::<K, V, _>::new(guard.data());

        if !block.is_occupied(index) {
            return Ok(false);
        }
        if block.is_readable(index) && block.key_at(index) == *key {
            values.push(block.value_at(index));
        }
        Ok(true)
    }

    /// Attempts to insert at one slot.
    fn try_insert_slot(
        &self,
        header_id: PageId,
        slot: usize,
        key: &K,
        value: &V,
    ) -> Result<SlotWrite, IndexError> {
        let (block_id, index) = self.block_location(header_id, slot)?;
        let mut guard = self.pool.fetch_page_mut(block_id)?;

        let outcome = {
            let mut block = BlockPage::<K, V, _>::new(guard.data_mut());
            if block.is_readable(index)
                && block.key_at(index) == *key
                && block.value_at(index) == *value
            {
                SlotWrite::Duplicate
            } else if block.insert(index, key, value) {
                SlotWrite::Inserted
            } else {
                SlotWrite::Taken
            }
        };
        if matches!(outcome, SlotWrite::Inserted) {
            guard.mark_dirty();
        }
        Ok(outcome)
    }

    /// Attempts to remove at one slot.
    fn try_remove_slot(
        &self,
        header_id: PageId,
        slot: usize,
        key: &K,
        value: &V,
    ) -> Result<SlotErase, IndexError> {
        let (block_id, index) = self.block_location(header_id, slot)?;
        let mut guard = self.pool.fetch_page_mut(block_id)?;

        let outcome = {
            let mut block = BlockPage::<K, V, _>::new(guard.data_mut());
            if !block.is_occupied(index) {
                SlotErase::Vacant
            } else if block.is_readable(index)
                && block.key_at(index) == *key
                && block.value_at(index) == *value
            {
                block.remove(index);
                SlotErase::Removed
            } else {
                SlotErase::Skip
            }
        };
        if matches!(outcome, SlotErase::Removed) {
            guard.mark_dirty();
        }
        Ok(outcome)
    }
}
