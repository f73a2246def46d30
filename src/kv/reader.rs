//! Record reader with strict corruption detection
//!
//! - Every read validates length and checksum
//! - Used for the startup scan and for positional lookups
//! - Any corruption is reported as CHRONO_STORE_CORRUPTION (FATAL)

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::errors::{KvError, KvResult};
use super::record::{KvRecord, MIN_RECORD_SIZE};

/// Reader over a record file that may still be growing.
pub struct KvReader {
    reader: BufReader<File>,
    /// Current byte offset
    current_offset: u64,
    /// Bytes known to be fully written
    file_size: u64,
}

impl KvReader {
    /// Opens the record file for reading.
    pub fn open(path: &Path) -> KvResult<Self> {
        let file = File::open(path).map_err(|e| {
            KvError::read_failed(format!("Failed to open store file: {}", path.display()), e)
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| KvError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Makes bytes appended by the writer visible to this reader.
    pub fn extend_to(&mut self, file_size: u64) {
        self.file_size = file_size;
    }

    /// Reads the next record.
    ///
    /// - `Ok(Some(record))` if a record was read
    /// - `Ok(None)` at end of file
    /// - `Err(CHRONO_STORE_CORRUPTION)` on a truncated or checksum-failing record
    pub fn read_next(&mut self) -> KvResult<Option<KvRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(KvError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated store: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            KvError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 || record_length > remaining {
            return Err(KvError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Invalid record length {} ({} bytes remaining)",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            KvError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = KvRecord::deserialize(&record_buf)
            .map_err(|e| KvError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;
        Ok(Some(record))
    }

    /// Reads the record stored at `offset`.
    pub fn read_at(&mut self, offset: u64) -> KvResult<KvRecord> {
        self.reader.seek(SeekFrom::Start(offset)).map_err(|e| {
            KvError::read_failed(format!("Failed to seek to offset {}", offset), e)
        })?;
        self.current_offset = offset;

        match self.read_next()? {
            Some(record) => Ok(record),
            None => Err(KvError::corruption_at_offset(
                offset,
                "No record at specified offset",
            )),
        }
    }
}
