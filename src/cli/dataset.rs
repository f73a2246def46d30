//! Row datasets for `load` and `bench`
//!
//! CSV layout, one header line then `key,title,comment,version`. The row is
//! split into at most four fields, so the version column may carry extra
//! characters (quotes, commas); only its digits are kept. A blank version
//! column means "unchecked".

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::errors::{CliError, CliResult};

/// Payload stored for every dataset row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub title: String,
    pub comment: String,
    /// Version the dataset expects this row to be assigned
    pub timestamp: Option<u64>,
}

/// One keyed row, in append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRow {
    pub key: String,
    pub row: Row,
    /// 1-based line number in the source file
    pub line: usize,
}

/// Read every row of the CSV file at `path`.
pub fn read_csv(path: &Path) -> CliResult<Vec<DatasetRow>> {
    let file = File::open(path).map_err(|e| {
        CliError::io_error(format!("Failed to open dataset {}: {}", path.display(), e))
    })?;
    parse_csv(BufReader::new(file))
}

pub fn parse_csv<R: BufRead>(reader: R) -> CliResult<Vec<DatasetRow>> {
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate().skip(1) {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.splitn(4, ',');
        let key = fields.next().unwrap_or_default();
        let (title, comment) = match (fields.next(), fields.next()) {
            (Some(title), Some(comment)) => (title, comment),
            _ => return Err(CliError::dataset_error(number, "expected key,title,comment")),
        };
        if key.is_empty() {
            return Err(CliError::dataset_error(number, "empty key"));
        }

        let timestamp = match fields.next() {
            Some(raw) => parse_version(raw).map_err(|e| CliError::dataset_error(number, e))?,
            None => None,
        };

        rows.push(DatasetRow {
            key: key.to_string(),
            row: Row {
                title: title.to_string(),
                comment: comment.to_string(),
                timestamp,
            },
            line: number,
        });
    }

    Ok(rows)
}

fn parse_version(raw: &str) -> Result<Option<u64>, String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse::<u64>()
        .map(Some)
        .map_err(|e| format!("invalid version '{}': {}", raw, e))
}

/// Generate `rows` appends spread over `keys` keys.
///
/// The same seed yields the same dataset. Keys are `KEY` plus a zero-padded
/// index; expected versions are the arrival order.
pub fn synthetic(rows: usize, keys: usize, seed: u64) -> Vec<DatasetRow> {
    let keys = keys.max(1);
    let width = keys.to_string().len().max(3);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut changes = vec![0u64; keys];

    (0..rows)
        .map(|i| {
            let k = rng.gen_range(0..keys);
            changes[k] += 1;
            let key = format!("KEY{:0width$}", k + 1, width = width);
            DatasetRow {
                row: Row {
                    title: format!("Some Title for {}", key),
                    comment: format!("Change {} for key {}", changes[k], key),
                    timestamp: Some(i as u64 + 1),
                },
                key,
                line: i + 2,
            }
        })
        .collect()
}
