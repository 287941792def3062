#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Three-way consistency comparison between a site scan and two catalog
//! dumps.
//!
//! # Design
//!
//! Given three sets of paths —
//!
//! - `r`: what the site scan actually found on storage,
//! - `a`: the catalog dump taken *after* the scan,
//! - `b`: the catalog dump taken *before* the scan —
//!
//! this crate computes two derived sets:
//!
//! - `dark = r - a - b`: files the scan found that neither catalog dump
//!   knows about.
//! - `missing = (a ∩ b) - r`: files both catalog dumps agree should exist
//!   but the scan did not find.
//!
//! The result is symmetric in `a`/`b` — swapping the two catalog dumps
//! does not change `dark` or `missing`.
//!
//! # Invariants
//!
//! - [`cmp3`], [`cmp3_dark`], and [`cmp3_missing`] agree with each other:
//!   running all three over the same inputs yields `cmp3` results equal to
//!   `(cmp3_dark, cmp3_missing)`.
//! - [`compare_lists`] requires all three input lists to share the same
//!   partition count, and compares partition by partition so peak memory
//!   is bounded by the largest single partition rather than the whole
//!   list ([`checksums::partition_of`](checksums::partition_of) is what
//!   guarantees matching items land in the same partition index across
//!   the three lists).
//!
//! # Examples
//!
//! ```
//! use compare::cmp3;
//!
//! let a = vec!["/keep".to_string(), "/gone-from-scan".to_string()];
//! let r = vec!["/keep".to_string(), "/dark".to_string()];
//! let b = vec!["/keep".to_string(), "/gone-from-scan".to_string()];
//!
//! let (mut dark, mut missing) = cmp3(a.into_iter(), r.into_iter(), b.into_iter());
//! dark.sort();
//! missing.sort();
//! assert_eq!(dark, vec!["/dark".to_string()]);
//! assert_eq!(missing, vec!["/gone-from-scan".to_string()]);
//! ```

mod error;

pub use error::CompareError;

use partlist::PartitionedListReader;
use rustc_hash::FxHashSet;

/// Which output stream(s) a comparison should produce.
///
/// Mirrors the original scanner's `d`/`m`/both stream selection: when only
/// one side is needed, skipping the other's bookkeeping roughly halves the
/// memory a per-partition comparison needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Compute both dark and missing.
    Both,
    /// Compute only dark (`r - a - b`).
    DarkOnly,
    /// Compute only missing (`(a ∩ b) - r`).
    MissingOnly,
}

/// Result of comparing one partition, or an entire partitioned list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompareResult {
    /// Items present in `r` but absent from both `a` and `b`.
    pub dark: Vec<String>,
    /// Items present in both `a` and `b` but absent from `r`.
    pub missing: Vec<String>,
}

impl CompareResult {
    fn extend(&mut self, other: Self) {
        self.dark.extend(other.dark);
        self.missing.extend(other.missing);
    }
}

/// Computes `dark = r - a - b` and `missing = (a ∩ b) - r` in a single pass
/// over `r`, bookkeeping `a - r` as a side effect to avoid building both
/// `a` and `b` as full sets at once.
#[must_use]
pub fn cmp3(a: impl Iterator<Item = String>, r: impl Iterator<Item = String>, b: impl Iterator<Item = String>) -> (Vec<String>, Vec<String>) {
    let mut a_minus_r: FxHashSet<String> = a.collect();
    let mut r_minus_a: FxHashSet<String> = FxHashSet::default();
    for item in r {
        if !a_minus_r.remove(&item) {
            r_minus_a.insert(item);
        }
    }
    let mut dark = r_minus_a;
    let mut missing = FxHashSet::default();
    for item in b {
        dark.remove(&item);
        if a_minus_r.contains(&item) {
            missing.insert(item);
        }
    }
    (dark.into_iter().collect(), missing.into_iter().collect())
}

/// Computes `dark = r - a - b` only.
#[must_use]
pub fn cmp3_dark(a: impl Iterator<Item = String>, r: impl Iterator<Item = String>, b: impl Iterator<Item = String>) -> Vec<String> {
    let mut dark: FxHashSet<String> = r.collect();
    for item in a {
        dark.remove(&item);
    }
    for item in b {
        dark.remove(&item);
    }
    dark.into_iter().collect()
}

/// Computes `missing = (a ∩ b) - r` only.
#[must_use]
pub fn cmp3_missing(a: impl Iterator<Item = String>, r: impl Iterator<Item = String>, b: impl Iterator<Item = String>) -> Vec<String> {
    let a_set: FxHashSet<String> = a.collect();
    let mut missing = FxHashSet::default();
    for item in b {
        if a_set.contains(&item) {
            missing.insert(item);
        }
    }
    drop(a_set);
    for item in r {
        missing.remove(&item);
    }
    missing.into_iter().collect()
}

fn collect_partition(partition: partlist::Partition) -> Result<Vec<String>, CompareError> {
    partition.collect::<Result<Vec<String>, _>>().map_err(CompareError::from)
}

/// Compares one triple of same-index partitions, selecting which stream(s)
/// to compute.
pub fn compare_partition(
    a: partlist::Partition,
    r: partlist::Partition,
    b: partlist::Partition,
    stream: Stream,
) -> Result<CompareResult, CompareError> {
    let a = collect_partition(a)?;
    let r = collect_partition(r)?;
    let b = collect_partition(b)?;

    let result = match stream {
        Stream::Both => {
            let (dark, missing) = cmp3(a.into_iter(), r.into_iter(), b.into_iter());
            CompareResult { dark, missing }
        }
        Stream::DarkOnly => CompareResult {
            dark: cmp3_dark(a.into_iter(), r.into_iter(), b.into_iter()),
            missing: Vec::new(),
        },
        Stream::MissingOnly => CompareResult {
            dark: Vec::new(),
            missing: cmp3_missing(a.into_iter(), r.into_iter(), b.into_iter()),
        },
    };
    Ok(result)
}

/// Compares three partitioned lists — the post-scan catalog dump `a`, the
/// site-scan result `r`, and the pre-scan catalog dump `b` — partition by
/// partition.
///
/// # Errors
///
/// Returns [`CompareError::InconsistentPartitioning`] if the three lists
/// don't share a partition count, or [`CompareError::List`] if reading any
/// partition fails.
pub fn compare_lists(a: &PartitionedListReader, r: &PartitionedListReader, b: &PartitionedListReader, stream: Stream) -> Result<CompareResult, CompareError> {
    if a.nparts() != r.nparts() || r.nparts() != b.nparts() {
        return Err(CompareError::InconsistentPartitioning {
            r: r.nparts(),
            a: a.nparts(),
            b: b.nparts(),
        });
    }

    let mut total = CompareResult::default();
    let partitions = a.partitions().into_iter().zip(r.partitions()).zip(b.partitions());
    for (index, ((a_part, r_part), b_part)) in partitions.enumerate() {
        let result = compare_partition(a_part, r_part, b_part, stream)?;
        tracing::info!(
            partition = index,
            dark = result.dark.len(),
            missing = result.missing.len(),
            "partition compared"
        );
        total.extend(result);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn cmp3_finds_dark_and_missing() {
        let a = strings(&["/keep", "/gone"]);
        let r = strings(&["/keep", "/dark"]);
        let b = strings(&["/keep", "/gone"]);

        let (mut dark, mut missing) = cmp3(a.into_iter(), r.into_iter(), b.into_iter());
        dark.sort();
        missing.sort();
        assert_eq!(dark, strings(&["/dark"]));
        assert_eq!(missing, strings(&["/gone"]));
    }

    #[test]
    fn cmp3_is_symmetric_in_a_and_b() {
        let a = strings(&["/keep", "/only-in-a"]);
        let b = strings(&["/keep", "/only-in-b"]);
        let r = strings(&["/keep", "/dark"]);

        let (mut dark1, mut missing1) = cmp3(a.clone().into_iter(), r.clone().into_iter(), b.clone().into_iter());
        let (mut dark2, mut missing2) = cmp3(b.into_iter(), r.into_iter(), a.into_iter());
        dark1.sort();
        dark2.sort();
        missing1.sort();
        missing2.sort();
        assert_eq!(dark1, dark2);
        assert_eq!(missing1, missing2);
    }

    #[test]
    fn cmp3_dark_and_cmp3_missing_agree_with_cmp3() {
        let a = strings(&["/a1", "/both"]);
        let r = strings(&["/both", "/r-only", "/a1"]);
        let b = strings(&["/b1", "/both"]);

        let (mut dark, mut missing) = cmp3(a.clone().into_iter(), r.clone().into_iter(), b.clone().into_iter());
        let mut dark_only = cmp3_dark(a.clone().into_iter(), r.clone().into_iter(), b.clone().into_iter());
        let mut missing_only = cmp3_missing(a.into_iter(), r.into_iter(), b.into_iter());
        dark.sort();
        missing.sort();
        dark_only.sort();
        missing_only.sort();
        assert_eq!(dark, dark_only);
        assert_eq!(missing, missing_only);
    }

    #[test]
    fn empty_inputs_produce_empty_results() {
        let (dark, missing) = cmp3(std::iter::empty(), std::iter::empty(), std::iter::empty());
        assert!(dark.is_empty());
        assert!(missing.is_empty());
    }

    #[test]
    fn disjoint_r_is_entirely_dark() {
        let a = strings(&["/a"]);
        let b = strings(&["/b"]);
        let r = strings(&["/only-in-r"]);
        let (dark, missing) = cmp3(a.into_iter(), r.into_iter(), b.into_iter());
        assert_eq!(dark, strings(&["/only-in-r"]));
        assert!(missing.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn cmp3_matches_naive_set_arithmetic(
            a in proptest::collection::vec("[a-e]", 0..8),
            r in proptest::collection::vec("[a-e]", 0..8),
            b in proptest::collection::vec("[a-e]", 0..8),
        ) {
            use std::collections::BTreeSet;
            let a_set: BTreeSet<_> = a.iter().cloned().collect();
            let r_set: BTreeSet<_> = r.iter().cloned().collect();
            let b_set: BTreeSet<_> = b.iter().cloned().collect();

            let expected_dark: BTreeSet<_> = r_set.difference(&a_set).cloned().collect::<BTreeSet<_>>()
                .difference(&b_set).cloned().collect();
            let expected_missing: BTreeSet<_> = a_set.intersection(&b_set).cloned().collect::<BTreeSet<_>>()
                .difference(&r_set).cloned().collect();

            let (dark, missing) = cmp3(a.into_iter(), r.into_iter(), b.into_iter());
            let dark_set: BTreeSet<_> = dark.into_iter().collect();
            let missing_set: BTreeSet<_> = missing.into_iter().collect();

            proptest::prop_assert_eq!(dark_set, expected_dark);
            proptest::prop_assert_eq!(missing_set, expected_missing);
        }
    }
}
