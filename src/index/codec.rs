//! Fixed-width key/value encodings and the hash seam.

use std::hash::{Hash, Hasher};

use crate::storage::PageId;

/// A type with a fixed-width byte encoding, usable as an index key or value.
///
/// Encodings are packed little-endian; slots in a block page are laid out
/// as `ENCODED_LEN` key bytes followed by `ENCODED_LEN` value bytes with no
/// padding, so the trait fully determines the on-disk slot size.
pub trait FixedCodec: Copy {
    /// Encoded width in bytes.
    const ENCODED_LEN: usize;

    /// Writes the encoding into `buf[..ENCODED_LEN]`.
    fn encode_to(&self, buf: &mut [u8]);

    /// Reads a value back from `buf[..ENCODED_LEN]`.
    fn decode_from(buf: &[u8]) -> Self;
}

macro_rules! int_codec {
    ($($ty:ty),*) => {
        $(
            impl FixedCodec for $ty {
                const ENCODED_LEN: usize = std::mem::size_of::<$ty>();

                fn encode_to(&self, buf: &mut [u8]) {
                    buf[..Self::ENCODED_LEN].copy_from_slice(&self.to_le_bytes());
                }

                fn decode_from(buf: &[u8]) -> Self {
                    let mut bytes = [0u8; std::mem::size_of::<$ty>()];
                    bytes.copy_from_slice(&buf[..Self::ENCODED_LEN]);
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

int_codec!(i32, i64, u32, u64);

/// Record identifier: a page and a slot within it.
///
/// The value type a table index stores; a lookup returns the rids of the
/// matching heap records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rid {
    page_id: PageId,
    slot: u16,
}

impl Rid {
    /// Creates a record identifier.
    pub const fn new(page_id: PageId, slot: u16) -> Self {
        Self { page_id, slot }
    }

    /// The page holding the record.
    pub const fn page_id(&self) -> PageId {
        self.page_id
    }

    /// The slot within the page.
    pub const fn slot(&self) -> u16 {
        self.slot
    }
}

impl FixedCodec for Rid {
    const ENCODED_LEN: usize = 10;

    fn encode_to(&self, buf: &mut [u8]) {
        buf[0..8].copy_from_slice(&self.page_id.page_num().to_le_bytes());
        buf[8..10].copy_from_slice(&self.slot.to_le_bytes());
    }

    fn decode_from(buf: &[u8]) -> Self {
        let mut page = [0u8; 8];
        page.copy_from_slice(&buf[0..8]);
        let mut slot = [0u8; 2];
        slot.copy_from_slice(&buf[8..10]);
        Self {
            page_id: PageId::new(u64::from_le_bytes(page)),
            slot: u16::from_le_bytes(slot),
        }
    }
}

/// Hash function over index keys.
///
/// A constructor parameter of the hash table rather than a hard-wired
/// algorithm, so tests can force collisions and callers can pick a seeded
/// hash.
pub trait KeyHasher<K>: Send + Sync {
    /// Hashes a key to a 64-bit value; the table reduces it modulo its
    /// logical size.
    fn hash_key(&self, key: &K) -> u64;
}

/// Default hash: std's SipHash via `DefaultHasher`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKeyHasher;

impl<K: Hash> KeyHasher<K> for DefaultKeyHasher {
    fn hash_key(&self, key: &K) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_roundtrip() {
        let mut buf = [0u8; 8];
        (-123456i64).encode_to(&mut buf);
        assert_eq!(i64::decode_from(&buf), -123456);

        let mut buf = [0u8; 4];
        42i32.encode_to(&mut buf);
        assert_eq!(i32::decode_from(&buf), 42);
        assert_eq!(buf, 42i32.to_le_bytes());
    }

    #[test]
    fn test_rid_roundtrip() {
        let rid = Rid::new(PageId::new(77), 19);
        let mut buf = [0u8; Rid::ENCODED_LEN];
        rid.encode_to(&mut buf);
        assert_eq!(Rid::decode_from(&buf), rid);
    }

    #[test]
    fn test_default_hasher_is_stable() {
        let hasher = DefaultKeyHasher;
        let a = KeyHasher::<i32>::hash_key(&hasher, &7);
        let b = KeyHasher::<i32>::hash_key(&hasher, &7);
        assert_eq!(a, b);
        // Not a guarantee, but these should essentially never collide.
        let c = KeyHasher::<i32>::hash_key(&hasher, &8);
        assert_ne!(a, c);
    }
}
