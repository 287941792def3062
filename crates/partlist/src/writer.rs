use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::PartListError;
use crate::naming::partition_filename;

enum Sink {
    Plain(BufWriter<File>),
    Gzip(Box<GzEncoder<BufWriter<File>>>),
}

impl Sink {
    fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        match self {
            Self::Plain(w) => {
                w.write_all(line.as_bytes())?;
                w.write_all(b"\n")
            }
            Self::Gzip(w) => {
                w.write_all(line.as_bytes())?;
                w.write_all(b"\n")
            }
        }
    }

    fn finish(self) -> std::io::Result<()> {
        match self {
            Self::Plain(mut w) => w.flush(),
            Self::Gzip(w) => w.finish().map(|_| ()),
        }
    }
}

/// A partitioned list open for writing.
///
/// Created with [`crate::PartitionedList::create`]. Writing is append-only;
/// [`PartitionedListWriter::close`] must be called to guarantee every
/// partition file has been flushed — dropping the writer without closing
/// it is a logic error the caller is responsible for avoiding (mirroring
/// the original scanner's append-only output discipline).
pub struct PartitionedListWriter {
    paths: Vec<PathBuf>,
    sinks: Vec<Sink>,
    written: u64,
    closed: bool,
}

impl PartitionedListWriter {
    pub(crate) fn create(nparts: u32, prefix: &Path, compressed: bool) -> Result<Self, PartListError> {
        let nparts = nparts.max(1);
        let mut paths = Vec::with_capacity(nparts as usize);
        let mut sinks = Vec::with_capacity(nparts as usize);
        for index in 0..nparts {
            let path = partition_filename(prefix, index, compressed);
            let file = File::create(&path).map_err(|source| PartListError::Create {
                path: path.clone(),
                source,
            })?;
            let sink = if compressed {
                Sink::Gzip(Box::new(GzEncoder::new(BufWriter::new(file), Compression::default())))
            } else {
                Sink::Plain(BufWriter::new(file))
            };
            paths.push(path);
            sinks.push(sink);
        }
        Ok(Self {
            paths,
            sinks,
            written: 0,
            closed: false,
        })
    }

    /// Number of partitions this writer was created with.
    #[must_use]
    pub fn nparts(&self) -> u32 {
        self.sinks.len() as u32
    }

    /// Adds `item` to the list, placing it in the partition determined by
    /// [`checksums::partition_of`] over its trimmed UTF-8 bytes.
    ///
    /// Leading/trailing whitespace is stripped before the checksum is
    /// computed and before the item is written, per the partitioned-list
    /// contract.
    pub fn add(&mut self, item: &str) -> Result<(), PartListError> {
        let trimmed = item.trim();
        let index = checksums::partition_of(self.nparts(), trimmed.as_bytes()) as usize;
        self.sinks[index]
            .write_line(trimmed)
            .map_err(|source| PartListError::Write {
                path: self.paths[index].clone(),
                source,
            })?;
        self.written += 1;
        Ok(())
    }

    /// Total number of items written so far across all partitions.
    #[must_use]
    pub const fn written(&self) -> u64 {
        self.written
    }

    /// Flushes and closes every partition file. Idempotent: calling this
    /// more than once is a no-op after the first call succeeds.
    pub fn close(&mut self) -> Result<(), PartListError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let sinks = std::mem::take(&mut self.sinks);
        for (sink, path) in sinks.into_iter().zip(self.paths.iter()) {
            sink.finish().map_err(|source| PartListError::Close {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Drop for PartitionedListWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
