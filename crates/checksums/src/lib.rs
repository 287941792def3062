#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Adler-32 checksum used to address partitions in a [partitioned
//! list](../partlist/index.html).
//!
//! # Design
//!
//! This is the textbook, whole-buffer Adler-32 checksum — not a rolling
//! checksum. The comparator relies on exactly one property: equal byte
//! strings hash to equal values, so that two partitioned lists built
//! independently (one by the catalog dump producer, one by the namespace
//! scanner) always place the same item in the same partition index.
//! Collisions across distinct items are harmless; the three-way comparator
//! still does an exact membership test within each partition.
//!
//! # Invariants
//!
//! - [`adler32`] matches the standard Adler-32 definition (modulus 65521,
//!   `a` initialized to 1, `b` initialized to 0) bit-for-bit.
//! - [`partition_of`] returns `0` for `nparts <= 1` without computing a
//!   checksum at all, matching the convention partitioned-list producers
//!   rely on for the degenerate single-partition case.
//!
//! # Examples
//!
//! ```
//! use checksums::{adler32, partition_of};
//!
//! assert_eq!(adler32(b""), 1);
//! assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
//!
//! // Two identical items always land in the same partition.
//! assert_eq!(partition_of(8, b"/store/mc/file.root"), partition_of(8, b"/store/mc/file.root"));
//! assert_eq!(partition_of(1, b"/anything"), 0);
//! ```

const MOD_ADLER: u32 = 65521;

/// Computes the standard Adler-32 checksum of `data`.
///
/// The checksum is accumulated as two running sums, `a` and `b`, each
/// reduced modulo 65521 after every 5552-byte block — the largest block
/// size for which neither sum can overflow a `u32` before the reduction,
/// matching the reference algorithm used by zlib and every other
/// standard-conforming Adler-32 implementation.
#[must_use]
pub fn adler32(data: &[u8]) -> u32 {
    let mut a: u32 = 1;
    let mut b: u32 = 0;

    for chunk in data.chunks(5552) {
        for &byte in chunk {
            a += u32::from(byte);
            b += a;
        }
        a %= MOD_ADLER;
        b %= MOD_ADLER;
    }

    (b << 16) | a
}

/// Returns the partition index for `item` out of `nparts` partitions.
///
/// `nparts <= 1` always yields partition `0` without touching the
/// checksum, per the partitioned-list convention documented in the crate
/// root.
#[must_use]
pub fn partition_of(nparts: u32, item: &[u8]) -> u32 {
    if nparts <= 1 {
        return 0;
    }
    adler32(item) % nparts
}

#[cfg(test)]
mod tests {
    use super::{adler32, partition_of};
    use proptest::prelude::*;

    #[test]
    fn empty_input_is_one() {
        assert_eq!(adler32(b""), 1);
    }

    #[test]
    fn matches_known_vector() {
        // Reference value taken from the Adler-32 Wikipedia article.
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn nparts_one_or_zero_is_always_partition_zero() {
        assert_eq!(partition_of(1, b"/store/a"), 0);
        assert_eq!(partition_of(0, b"/store/a"), 0);
        assert_eq!(partition_of(1, b""), 0);
    }

    proptest! {
        #[test]
        fn partition_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..256), nparts in 1u32..64) {
            prop_assert_eq!(partition_of(nparts, &bytes), partition_of(nparts, &bytes));
        }

        #[test]
        fn partition_is_always_in_range(bytes in proptest::collection::vec(any::<u8>(), 0..256), nparts in 2u32..64) {
            prop_assert!(partition_of(nparts, &bytes) < nparts);
        }
    }
}
