use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::PartListError;
use crate::naming::discover_partitions;

enum Source {
    Plain(BufReader<File>),
    Gzip(BufReader<GzDecoder<File>>),
}

impl Source {
    fn open(path: &Path) -> Result<Self, PartListError> {
        let file = File::open(path).map_err(|source| PartListError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            Ok(Self::Gzip(BufReader::new(GzDecoder::new(file))))
        } else {
            Ok(Self::Plain(BufReader::new(file)))
        }
    }

    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize> {
        match self {
            Self::Plain(r) => r.read_line(buf),
            Self::Gzip(r) => r.read_line(buf),
        }
    }
}

/// One shard of a partitioned list open for reading.
///
/// A `Partition` is restartable: [`Partition::rewind`] reopens the
/// underlying file from the beginning, so the same partition can be
/// scanned more than once (the three-way comparator reads each input
/// partition exactly once per comparison, but callers composing multiple
/// passes need the ability to rewind).
pub struct Partition {
    path: PathBuf,
    source: Option<Source>,
    exhausted: bool,
}

impl Partition {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            source: None,
            exhausted: false,
        }
    }

    /// Path of the partition file backing this iterator.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewinds the partition so the next call to [`Iterator::next`]
    /// yields the first item again.
    pub fn rewind(&mut self) {
        self.source = None;
        self.exhausted = false;
    }
}

impl Iterator for Partition {
    type Item = Result<String, PartListError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if self.source.is_none() {
            match Source::open(&self.path) {
                Ok(source) => self.source = Some(source),
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
        let source = self.source.as_mut().expect("just populated above");
        let mut line = String::new();
        match source.read_line(&mut line) {
            Ok(0) => {
                self.exhausted = true;
                None
            }
            Ok(_) => Some(Ok(line.trim().to_string())),
            Err(source) => {
                self.exhausted = true;
                Some(Err(PartListError::Read {
                    path: self.path.clone(),
                    source,
                }))
            }
        }
    }
}

/// A partitioned list open for reading, built by
/// [`crate::PartitionedList::open`].
pub struct PartitionedListReader {
    paths: Vec<PathBuf>,
}

impl PartitionedListReader {
    pub(crate) fn open(prefix: &Path) -> Result<Self, PartListError> {
        let paths = discover_partitions(prefix)?;
        Ok(Self { paths })
    }

    /// Number of partitions inferred from the files found on disk.
    #[must_use]
    pub fn nparts(&self) -> u32 {
        self.paths.len() as u32
    }

    /// Returns one independently rewindable [`Partition`] iterator per
    /// shard, in ascending index order.
    #[must_use]
    pub fn partitions(&self) -> Vec<Partition> {
        self.paths.iter().cloned().map(Partition::new).collect()
    }

    /// Returns an iterator over every item across all partitions, in
    /// partition order.
    pub fn items(&self) -> impl Iterator<Item = Result<String, PartListError>> + '_ {
        self.paths.iter().cloned().flat_map(Partition::new)
    }
}
