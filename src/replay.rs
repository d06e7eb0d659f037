//! Replays a bounded, gzip-compressed dataset as an endless row stream.

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecordsIntoIter};
use flate2::read::MultiGzDecoder;

use crate::decoder::DELIMITER;
use crate::{Error, Result};

pub trait DatasetOpener {
    type Reader: Read;

    fn open(&self) -> Result<Self::Reader>;

    fn describe(&self) -> String;
}

pub struct GzipFile {
    path: PathBuf,
}

impl GzipFile {
    pub fn new(path: impl AsRef<Path>) -> GzipFile {
        GzipFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DatasetOpener for GzipFile {
    type Reader = MultiGzDecoder<File>;

    fn open(&self) -> Result<Self::Reader> {
        let file = File::open(&self.path).map_err(|source| Error::Dataset {
            path: self.path.clone(),
            source,
        })?;
        Ok(MultiGzDecoder::new(file))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct InMemory {
    bytes: Vec<u8>,
}

impl InMemory {
    pub fn new(bytes: impl Into<Vec<u8>>) -> InMemory {
        InMemory {
            bytes: bytes.into(),
        }
    }
}

impl DatasetOpener for InMemory {
    type Reader = Cursor<Vec<u8>>;

    fn open(&self) -> Result<Self::Reader> {
        Ok(Cursor::new(self.bytes.clone()))
    }

    fn describe(&self) -> String {
        format!("<memory, {} bytes>", self.bytes.len())
    }
}

/// Yields the dataset's rows forever, header excluded.
///
/// On end of data, on a read error and on a row shorter than `min_fields`
/// the dataset is reopened and reading resumes at the first row. A pass
/// that produces no row at all ends in [`Error::EmptyDataset`].
pub struct ReplaySource<O: DatasetOpener> {
    opener: O,
    min_fields: usize,
    records: Option<StringRecordsIntoIter<O::Reader>>,
    rows_since_restart: u64,
    restarts: u64,
}

impl<O: DatasetOpener> ReplaySource<O> {
    /// Opens the dataset right away so an unreadable one fails at startup.
    pub fn open(opener: O, min_fields: usize) -> Result<ReplaySource<O>> {
        let records = Some(reader(opener.open()?));
        Ok(ReplaySource {
            opener,
            min_fields,
            records,
            rows_since_restart: 0,
            restarts: 0,
        })
    }

    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    fn rewind(&mut self) -> Result<()> {
        if self.rows_since_restart == 0 {
            return Err(Error::EmptyDataset(self.opener.describe()));
        }
        self.records = Some(reader(self.opener.open()?));
        self.rows_since_restart = 0;
        self.restarts += 1;
        log::info!(
            "end of dataset {}, looping (restart #{})",
            self.opener.describe(),
            self.restarts
        );
        Ok(())
    }
}

fn reader<R: Read>(source: R) -> StringRecordsIntoIter<R> {
    ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(source)
        .into_records()
}

impl<O: DatasetOpener> Iterator for ReplaySource<O> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = match self.records.as_mut() {
                Some(records) => records.next(),
                None => None,
            };

            match next {
                Some(Ok(record)) if record.len() >= self.min_fields => {
                    self.rows_since_restart += 1;
                    return Some(Ok(record.iter().map(str::to_owned).collect()));
                }
                Some(Ok(record)) => {
                    log::debug!("short row with {} fields, rewinding", record.len());
                }
                Some(Err(e)) => {
                    log::warn!("failed to read {}: {}, rewinding", self.opener.describe(), e);
                }
                None => {}
            }

            if let Err(e) = self.rewind() {
                self.records = None;
                return Some(Err(e));
            }
        }
    }
}
