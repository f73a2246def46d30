//! In-memory benchmark of the three chain strategies
//!
//! Every run starts from an emptied store, appends the whole dataset, then
//! drains a full snapshot at each probe version. Strategies share one
//! physical store under distinct namespaces.

use serde::Serialize;

use crate::codec::JsonSerializer;
use crate::kv::{MemoryKvStore, Namespaced};
use crate::mvcc::Version;
use crate::node::BackedNodeStore;
use crate::observability::{log_event_with_fields, Event, Timer};
use crate::weaver::WeaverConfig;

use super::commands::build_index;
use super::config::Strategy;
use super::dataset::{DatasetRow, Row};
use super::errors::{CliError, CliResult};

/// Index prefix used inside each strategy's namespace
const BENCH_PREFIX: &str = "bench";

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub rows: usize,
    pub runs: usize,
    pub probes: Vec<u64>,
    pub strategies: Vec<StrategyReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyReport {
    pub strategy: Strategy,
    pub namespace: &'static str,
    /// Mean wall time to append every row
    pub insert_ms_avg: f64,
    /// Mean wall time to drain every probe's snapshot
    pub snapshot_ms_avg: f64,
    /// Rows one run's probes yielded in total
    pub rows_emitted: u64,
    /// Chain nodes one run's probes resolved in total
    pub hops: u64,
}

pub fn run_bench(
    dataset: &[DatasetRow],
    runs: usize,
    probes: &[u64],
    weaver: WeaverConfig,
) -> CliResult<BenchReport> {
    if runs == 0 {
        return Err(CliError::config_error("runs must be > 0"));
    }

    let rows_field = dataset.len().to_string();
    let runs_field = runs.to_string();
    log_event_with_fields(
        Event::BenchBegin,
        &[("rows", &rows_field), ("runs", &runs_field)],
    );

    let mut store = MemoryKvStore::new();
    let mut strategies = Vec::with_capacity(Strategy::ALL.len());

    for strategy in Strategy::ALL {
        let mut insert_ms = Vec::with_capacity(runs);
        let mut snapshot_ms = Vec::with_capacity(runs);
        let mut rows_emitted = 0;
        let mut hops = 0;

        for run in 0..runs {
            store.clear();
            let nodes = BackedNodeStore::<_, _, Row>::new(
                Namespaced::new(&mut store, strategy.bench_namespace()),
                JsonSerializer::<Row>::new(),
            );
            let mut index = build_index(strategy, nodes, BENCH_PREFIX, weaver)?;

            let timer = Timer::new();
            for entry in dataset {
                index.append(entry.key.clone(), entry.row.clone())?;
            }
            insert_ms.push(millis(&timer));

            let before = index.metrics().hops;
            let timer = Timer::new();
            let mut emitted = 0u64;
            for probe in probes {
                for row in index.snapshot(Version::new(*probe)) {
                    row?;
                    emitted += 1;
                }
            }
            snapshot_ms.push(millis(&timer));

            rows_emitted = emitted;
            hops = index.metrics().hops - before;

            log_event_with_fields(
                Event::BenchRun,
                &[
                    ("run", &run.to_string()),
                    ("strategy", strategy.as_str()),
                    ("rows_emitted", &emitted.to_string()),
                ],
            );
        }

        let report = StrategyReport {
            strategy,
            namespace: strategy.bench_namespace(),
            insert_ms_avg: average(&insert_ms),
            snapshot_ms_avg: average(&snapshot_ms),
            rows_emitted,
            hops,
        };
        log_event_with_fields(
            Event::BenchComplete,
            &[
                ("strategy", strategy.as_str()),
                ("insert_ms_avg", &format!("{:.3}", report.insert_ms_avg)),
                ("snapshot_ms_avg", &format!("{:.3}", report.snapshot_ms_avg)),
            ],
        );
        strategies.push(report);
    }

    Ok(BenchReport {
        rows: dataset.len(),
        runs,
        probes: probes.to_vec(),
        strategies,
    })
}

fn millis(timer: &Timer) -> f64 {
    timer.elapsed().as_secs_f64() * 1000.0
}

fn average(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}
