//! Slot-array page of a hash index.
//!
//! A block page packs three parallel arrays into one page:
//!
//! ```text
//! +--------------------+ offset 0
//! | occupied bitmap    |  (capacity + 7) / 8 bytes
//! +--------------------+
//! | readable bitmap    |  (capacity + 7) / 8 bytes
//! +--------------------+
//! | slots              |  capacity x (key ++ value)
//! +--------------------+
//! ```
//!
//! Bit `i` of bitmap byte `b` addresses slot `8*b + i`. A slot's life:
//! never touched (`!occupied`), live (`occupied && readable`), tombstone
//! (`occupied && !readable`). Tombstones keep probe chains intact after a
//! removal; inserts may re-use them.
//!
//! Mutation happens under the frame's write lock held by the caller's page
//! guard, which stands in for per-byte atomics: one writer per block at a
//! time, readers excluded while it runs.

use std::marker::PhantomData;

use super::codec::FixedCodec;
use crate::storage::PAGE_SIZE;

/// View over the bytes of a block page, typed by its key/value encoding.
pub struct BlockPage<K, V, T> {
    data: T,
    _marker: PhantomData<(K, V)>,
}

impl<K: FixedCodec, V: FixedCodec, T> BlockPage<K, V, T> {
    const SLOT_LEN: usize = K::ENCODED_LEN + V::ENCODED_LEN;

    /// Number of slots a block page of this key/value type holds.
    ///
    /// Two bitmap bits plus one slot per entry must fit the page:
    /// `capacity <= 4 * PAGE_SIZE / (4 * slot_len + 1)`, nudged down when
    /// bitmap byte rounding would spill past the page end.
    pub fn capacity() -> usize {
        let mut cap = 4 * PAGE_SIZE / (4 * Self::SLOT_LEN + 1);
        while 2 * ((cap + 7) / 8) + cap * Self::SLOT_LEN > PAGE_SIZE {
            cap -= 1;
        }
        cap
    }

    fn bitmap_len() -> usize {
        (Self::capacity() + 7) / 8
    }

    fn slot_offset(index: usize) -> usize {
        2 * Self::bitmap_len() + index * Self::SLOT_LEN
    }
}

impl<K: FixedCodec, V: FixedCodec, T: AsRef<[u8]>> BlockPage<K, V, T> {
    /// Creates a view over `data`.
    ///
    /// # Panics
    ///
    /// Panics if `data` is not exactly `PAGE_SIZE` bytes.
    pub fn new(data: T) -> Self {
        assert_eq!(data.as_ref().len(), PAGE_SIZE, "block page must span a full page");
        Self {
            data,
            _marker: PhantomData,
        }
    }

    fn test_bit(&self, bitmap_offset: usize, index: usize) -> bool {
        let byte = self.data.as_ref()[bitmap_offset + index / 8];
        byte & (1 << (index % 8)) != 0
    }

    /// True if the slot has ever held an entry (live or tombstone).
    pub fn is_occupied(&self, index: usize) -> bool {
        debug_assert!(index < Self::capacity());
        self.test_bit(0, index)
    }

    /// True if the slot holds a live entry.
    pub fn is_readable(&self, index: usize) -> bool {
        if !self.is_occupied(index) {
            return false;
        }
        self.test_bit(Self::bitmap_len(), index)
    }

    /// Decodes the key stored at `index`.
    ///
    /// Only meaningful for readable slots.
    pub fn key_at(&self, index: usize) -> K {
        let offset = Self::slot_offset(index);
        K::decode_from(&self.data.as_ref()[offset..offset + K::ENCODED_LEN])
    }

    /// Decodes the value stored at `index`.
    ///
    /// Only meaningful for readable slots.
    pub fn value_at(&self, index: usize) -> V {
        let offset = Self::slot_offset(index) + K::ENCODED_LEN;
        V::decode_from(&self.data.as_ref()[offset..offset + V::ENCODED_LEN])
    }
}

impl<K: FixedCodec, V: FixedCodec, T: AsRef<[u8]> + AsMut<[u8]>> BlockPage<K, V, T> {
    fn set_bit(&mut self, bitmap_offset: usize, index: usize) {
        self.data.as_mut()[bitmap_offset + index / 8] |= 1 << (index % 8);
    }

    fn clear_bit(&mut self, bitmap_offset: usize, index: usize) {
        self.data.as_mut()[bitmap_offset + index / 8] &= !(1 << (index % 8));
    }

    /// Stores `(key, value)` at `index` if the slot is not live.
    ///
    /// Returns false (and changes nothing beyond the occupied bit) when the
    /// slot is already readable; the caller advances its probe. Writing
    /// into a tombstone succeeds.
    pub fn insert(&mut self, index: usize, key: &K, value: &V) -> bool {
        debug_assert!(index < Self::capacity());
        self.set_bit(0, index);
        if self.test_bit(Self::bitmap_len(), index) {
            return false;
        }
        self.set_bit(Self::bitmap_len(), index);

        let offset = Self::slot_offset(index);
        let slot = &mut self.data.as_mut()[offset..offset + Self::SLOT_LEN];
        key.encode_to(&mut slot[..K::ENCODED_LEN]);
        value.encode_to(&mut slot[K::ENCODED_LEN..]);
        true
    }

    /// Tombstones the slot at `index`: clears readable, keeps occupied.
    ///
    /// A slot that was never occupied stays untouched.
    pub fn remove(&mut self, index: usize) {
        debug_assert!(index < Self::capacity());
        if self.is_occupied(index) {
            self.clear_bit(Self::bitmap_len(), index);
        }
    }

    /// Resets both bitmaps; slot bytes are left behind as garbage.
    pub fn clear(&mut self) {
        let bitmaps = 2 * Self::bitmap_len();
        self.data.as_mut()[..bitmaps].fill(0);
    }
}
