//! CLI command implementations
//!
//! Every command opens the index described by the configuration file,
//! performs one operation and returns the JSON body of its response.
//! Opening replays the record log, so each invocation sees every earlier
//! `load`.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};

use crate::chain::{LadderFactory, LinearFactory};
use crate::codec::JsonSerializer;
use crate::index::{KeyRange, MultiVersionIndex, Rows, TemporalIndex};
use crate::kv::FileKvStore;
use crate::mvcc::Version;
use crate::node::{BackedNodeStore, NodeStore};
use crate::observability::{Logger, ObservationScope, Severity};
use crate::weaver::{WeaverConfig, WeaverIndex};

use super::args::{Cli, Command};
use super::bench::run_bench;
use super::config::{Config, Strategy};
use super::dataset::{self, Row};
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Index over the dataset rows, whichever strategy backs it.
pub type RowIndex<'a> = Box<dyn TemporalIndex<String, Row> + 'a>;

/// Parse arguments, run the command and print its response.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }

    let response = execute(cli.command)?;
    write_response(response)
}

/// Run one command and return its response body.
pub fn execute(command: Command) -> CliResult<Value> {
    match command {
        Command::Load { config, csv } => load_command(&config, &csv),
        Command::Get { config, key, at } => get_command(&config, key, at),
        Command::Range {
            config,
            from,
            to,
            from_exclusive,
            to_exclusive,
            at,
        } => {
            let range = KeyRange::new(from, !from_exclusive, to, !to_exclusive);
            range_command(&config, &range, at)
        }
        Command::Snapshot { config, at } => snapshot_command(&config, at),
        Command::Bench {
            csv,
            runs,
            probes,
            rows,
            keys,
            seed,
        } => {
            let dataset = match csv {
                Some(path) => dataset::read_csv(&path)?,
                None => dataset::synthetic(rows, keys, seed),
            };
            let report = run_bench(&dataset, runs, &probes, WeaverConfig::default())?;
            Ok(serde_json::to_value(report)?)
        }
    }
}

/// Build or reopen an index of `strategy` over `store`.
pub fn build_index<'a, N>(
    strategy: Strategy,
    store: N,
    prefix: &str,
    weaver: WeaverConfig,
) -> CliResult<RowIndex<'a>>
where
    N: NodeStore<Row> + 'a,
{
    let index: RowIndex<'a> = match strategy {
        Strategy::Linear => Box::new(MultiVersionIndex::<String, Row, _, _>::open(
            store,
            LinearFactory,
            prefix,
        )?),
        Strategy::Ladder => Box::new(MultiVersionIndex::<String, Row, _, _>::open(
            store,
            LadderFactory,
            prefix,
        )?),
        Strategy::Weaver => Box::new(WeaverIndex::<String, Row, _>::open(store, prefix, weaver)?),
    };
    Ok(index)
}

/// Open the file-backed index the configuration describes.
pub fn open_index(config: &Config) -> CliResult<RowIndex<'static>> {
    let store = FileKvStore::open(config.data_path())?;
    let nodes = BackedNodeStore::<_, _, Row>::new(store, JsonSerializer::<Row>::new());
    build_index(config.strategy, nodes, &config.namespace, config.weaver)
}

/// Append every CSV row in file order, checking the version column.
pub fn load_command(config_path: &Path, csv: &Path) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let rows = dataset::read_csv(csv)?;
    let mut index = open_index(&config)?;

    let csv_field = csv.display().to_string();
    let scope = ObservationScope::with_fields(
        "LOAD",
        &[("csv", &csv_field), ("strategy", config.strategy.as_str())],
    );

    let mut last = None;
    for entry in rows.iter() {
        let assigned = match append_checked(index.as_mut(), entry) {
            Ok(version) => version,
            Err(err) => {
                scope.fail(err.message(), err.is_fatal());
                return Err(err);
            }
        };
        last = Some(assigned);
    }

    scope.complete_with_fields(&[("rows", &rows.len().to_string())]);

    Ok(json!({
        "rows": rows.len(),
        "strategy": index.strategy(),
        "keys": index.key_count(),
        "latest_version": index.latest_version(),
        "last_assigned": last,
        "metrics": index.metrics(),
    }))
}

fn append_checked<I>(index: &mut I, entry: &dataset::DatasetRow) -> CliResult<Version>
where
    I: TemporalIndex<String, Row> + ?Sized,
{
    let assigned = index.append(entry.key.clone(), entry.row.clone())?;
    if let Some(expected) = entry.row.timestamp {
        if expected != assigned.value() {
            return Err(CliError::version_mismatch(
                entry.line,
                expected,
                assigned.value(),
            ));
        }
    }
    Ok(assigned)
}

pub fn get_command(config_path: &Path, key: String, at: u64) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let index = open_index(&config)?;

    let value = index.get(&key, Version::new(at))?;
    Ok(json!({
        "key": key,
        "at": at,
        "found": value.is_some(),
        "value": value,
        "metrics": index.metrics(),
    }))
}

pub fn range_command(config_path: &Path, range: &KeyRange<String>, at: u64) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let index = open_index(&config)?;

    let rows = collect_rows(index.range_snapshot(range, Version::new(at)))?;
    Ok(json!({
        "from": range.from,
        "to": range.to,
        "at": at,
        "rows": rows,
        "metrics": index.metrics(),
    }))
}

pub fn snapshot_command(config_path: &Path, at: u64) -> CliResult<Value> {
    let config = Config::load(config_path)?;
    let index = open_index(&config)?;

    let rows = collect_rows(index.snapshot(Version::new(at)))?;
    Ok(json!({
        "at": at,
        "rows": rows,
        "metrics": index.metrics(),
    }))
}

#[derive(Debug, Serialize)]
struct KeyedRow {
    key: String,
    value: Row,
}

fn collect_rows(rows: Rows<'_, String, Row>) -> CliResult<Vec<KeyedRow>> {
    rows.map(|row| {
        let (key, value) = row?;
        Ok(KeyedRow { key, value })
    })
    .collect()
}
