//! Durable file-backed key-value store
//!
//! - Append-only: a put never rewrites earlier bytes
//! - fsync after every put; a put is durable or it errors
//! - Latest record for a key wins
//! - Startup scans the whole file into an in-memory key → offset index
//! - Every get is one positional read with checksum verification

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{KvError, KvResult};
use super::reader::KvReader;
use super::record::KvRecord;
use super::KvStore;

/// File name of the record log inside `<data_dir>/data/`.
pub const STORE_FILE_NAME: &str = "nodes.kv";

/// Key-value store persisted to `<data_dir>/data/nodes.kv`.
pub struct FileKvStore {
    path: PathBuf,
    /// Append handle
    file: File,
    /// Positional reader; gets take `&self`, the index is single-threaded
    reader: RefCell<KvReader>,
    /// Bytes durably written
    current_offset: u64,
    /// Key → offset of its latest record
    offsets: HashMap<String, u64>,
}

impl FileKvStore {
    /// Opens or creates the store under `data_dir`.
    ///
    /// Creates `<data_dir>/data/` if missing. A damaged record anywhere in the
    /// file fails the open with CHRONO_STORE_CORRUPTION.
    pub fn open(data_dir: &Path) -> KvResult<Self> {
        let data_subdir = data_dir.join("data");
        let path = data_subdir.join(STORE_FILE_NAME);

        if !data_subdir.exists() {
            fs::create_dir_all(&data_subdir).map_err(|e| {
                KvError::write_failed(
                    format!("Failed to create data directory: {}", data_subdir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                KvError::write_failed(format!("Failed to open store file: {}", path.display()), e)
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| KvError::io_error("Failed to read file metadata", e))?
            .len();

        let mut reader = KvReader::open(&path)?;
        let offsets = Self::build_offset_index(&mut reader)?;

        Ok(Self {
            path,
            file,
            reader: RefCell::new(reader),
            current_offset,
            offsets,
        })
    }

    fn build_offset_index(reader: &mut KvReader) -> KvResult<HashMap<String, u64>> {
        let mut offsets = HashMap::new();
        loop {
            let offset = reader.current_offset();
            match reader.read_next()? {
                Some(record) => {
                    offsets.insert(record.key, offset);
                }
                None => break,
            }
        }
        Ok(offsets)
    }

    /// Returns the path to the record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of bytes written so far.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns true if nothing was ever stored.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Drop whatever a failed put left past `current_offset`.
    ///
    /// If the file cannot be truncated, the torn bytes are skipped instead
    /// so the next record's offset matches where it lands.
    fn discard_tail(&mut self) {
        if self.file.set_len(self.current_offset).is_ok() {
            return;
        }
        if let Ok(metadata) = self.file.metadata() {
            self.current_offset = metadata.len();
            self.reader.get_mut().extend_to(self.current_offset);
        }
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let offset = match self.offsets.get(key) {
            Some(offset) => *offset,
            None => return Ok(None),
        };

        let record = self.reader.borrow_mut().read_at(offset)?;
        if record.key != key {
            return Err(KvError::corruption_at_offset(
                offset,
                format!("Expected key {}, found {}", key, record.key),
            ));
        }
        Ok(Some(record.value))
    }

    fn put(&mut self, key: &str, value: &str) -> KvResult<()> {
        let bytes = KvRecord::new(key, value).serialize();
        let offset = self.current_offset;

        let written = self
            .file
            .write_all(&bytes)
            .map_err(|e| KvError::write_failed(format!("Failed to write key: {}", key), e))
            .and_then(|()| {
                self.file.sync_all().map_err(|e| {
                    KvError::write_failed(format!("fsync failed after writing key: {}", key), e)
                })
            });
        if let Err(e) = written {
            self.discard_tail();
            return Err(e);
        }

        self.current_offset += bytes.len() as u64;
        self.reader.get_mut().extend_to(self.current_offset);
        self.offsets.insert(key.to_string(), offset);
        Ok(())
    }
}
