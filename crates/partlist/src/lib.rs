#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! On-disk partitioned list: the shared primitive the namespace scanner and
//! the three-way comparator both build on.
//!
//! # Overview
//!
//! A partitioned list is an ordered sequence of `N` partition files named
//! `<prefix>.NNNNN` (zero-padded to five digits, optionally suffixed
//! `.gz`). Every item — a newline-free UTF-8 string, conceptually a file
//! path — is routed to partition `checksums::partition_of(N, item)`
//! ([`checksums::partition_of`]), so two lists built independently with the
//! same `N` always place equal items in matching partition indices. That
//! is the only property the three-way comparator in the sibling `compare`
//! crate depends on; everything else about an item is opaque to this
//! crate.
//!
//! # Invariants
//!
//! - Across any two lists built with the same `N`, identical items land in
//!   partitions with the same index ([`checksums::partition_of`]).
//! - A reader opened from a prefix enumerates partitions in ascending
//!   index order.
//! - A writer is append-only; [`PartitionedListWriter::close`] must be
//!   called to guarantee every partition file has been flushed.
//!
//! # Examples
//!
//! ```
//! use partlist::PartitionedList;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let prefix = dir.path().join("scan");
//!
//! let mut writer = PartitionedList::create(4, &prefix, false).unwrap();
//! writer.add("/a/b").unwrap();
//! writer.add("/a/c").unwrap();
//! writer.add("/d").unwrap();
//! writer.close().unwrap();
//!
//! let reader = PartitionedList::open(&prefix).unwrap();
//! let mut items: Vec<_> = reader.items().map(Result::unwrap).collect();
//! items.sort();
//! assert_eq!(items, vec!["/a/b", "/a/c", "/d"]);
//! ```

mod error;
mod naming;
mod reader;
mod writer;

pub use error::PartListError;
pub use reader::{Partition, PartitionedListReader};
pub use writer::PartitionedListWriter;

use std::path::Path;

/// Entry point for creating or opening a partitioned list.
///
/// This is a namespacing type only — [`PartitionedList::create`] returns a
/// [`PartitionedListWriter`] and [`PartitionedList::open`] returns a
/// [`PartitionedListReader`]; the two modes are represented as distinct
/// types rather than one type with a runtime mode flag, so a write-mode
/// method can never be called on a list opened for reading (and vice
/// versa).
pub struct PartitionedList;

impl PartitionedList {
    /// Creates a new partitioned list with `nparts` partitions at `prefix`.
    ///
    /// Fails if any of the `nparts` partition files cannot be created.
    pub fn create(nparts: u32, prefix: impl AsRef<Path>, compressed: bool) -> Result<PartitionedListWriter, PartListError> {
        PartitionedListWriter::create(nparts, prefix.as_ref(), compressed)
    }

    /// Opens an existing partitioned list by discovering every file
    /// matching `<prefix>.*`, sorted in ascending partition-index order.
    ///
    /// The partition count is inferred from how many files are found; it
    /// is not supplied by the caller.
    pub fn open(prefix: impl AsRef<Path>) -> Result<PartitionedListReader, PartListError> {
        PartitionedListReader::open(prefix.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::PartitionedList;
    use tempfile::tempdir;

    #[test]
    fn round_trip_preserves_multiset() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("list");

        let mut writer = PartitionedList::create(4, &prefix, false).unwrap();
        for item in ["/a/b", "/a/c", "/d"] {
            writer.add(item).unwrap();
        }
        writer.close().unwrap();

        let reader = PartitionedList::open(&prefix).unwrap();
        let mut items: Vec<_> = reader.items().map(|r| r.unwrap()).collect();
        items.sort();
        assert_eq!(items, vec!["/a/b", "/a/c", "/d"]);
    }

    #[test]
    fn identical_items_land_in_same_partition_across_independent_lists() {
        let dir = tempdir().unwrap();
        let prefix_a = dir.path().join("a");
        let prefix_b = dir.path().join("b");

        let mut writer_a = PartitionedList::create(8, &prefix_a, false).unwrap();
        let mut writer_b = PartitionedList::create(8, &prefix_b, false).unwrap();
        for item in ["/store/x", "/store/y", "/store/z"] {
            writer_a.add(item).unwrap();
            writer_b.add(item).unwrap();
        }
        writer_a.close().unwrap();
        writer_b.close().unwrap();

        let reader_a = PartitionedList::open(&prefix_a).unwrap();
        let reader_b = PartitionedList::open(&prefix_b).unwrap();
        for (part_a, part_b) in reader_a.partitions().into_iter().zip(reader_b.partitions()) {
            let items_a: Vec<_> = part_a.map(|r| r.unwrap()).collect();
            let items_b: Vec<_> = part_b.map(|r| r.unwrap()).collect();
            assert_eq!(items_a, items_b);
        }
    }

    #[test]
    fn partitions_are_independently_rewindable() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("list");
        let mut writer = PartitionedList::create(2, &prefix, false).unwrap();
        writer.add("/a").unwrap();
        writer.add("/b").unwrap();
        writer.close().unwrap();

        let reader = PartitionedList::open(&prefix).unwrap();
        let mut partitions = reader.partitions();
        for partition in &mut partitions {
            let first_pass: Vec<_> = partition.by_ref().map(|r| r.unwrap()).collect();
            partition.rewind();
            let second_pass: Vec<_> = partition.by_ref().map(|r| r.unwrap()).collect();
            assert_eq!(first_pass, second_pass);
        }
    }

    #[test]
    fn whitespace_is_stripped_on_write_and_read() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("list");
        let mut writer = PartitionedList::create(1, &prefix, false).unwrap();
        writer.add("  /a/b  \n").unwrap();
        writer.close().unwrap();

        let reader = PartitionedList::open(&prefix).unwrap();
        let items: Vec<_> = reader.items().map(|r| r.unwrap()).collect();
        assert_eq!(items, vec!["/a/b"]);
    }

    #[test]
    fn compressed_round_trip() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("list");
        let mut writer = PartitionedList::create(2, &prefix, true).unwrap();
        writer.add("/a").unwrap();
        writer.add("/very/different/path").unwrap();
        writer.close().unwrap();

        let paths: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert!(paths.iter().all(|p| p.ends_with(".gz")));

        let reader = PartitionedList::open(&prefix).unwrap();
        let mut items: Vec<_> = reader.items().map(|r| r.unwrap()).collect();
        items.sort();
        assert_eq!(items, vec!["/a", "/very/different/path"]);
    }

    #[test]
    fn opening_missing_prefix_fails() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("nope");
        assert!(PartitionedList::open(&prefix).is_err());
    }
}
