use std::time::Duration;

use chrono::Local;
use tokio::time::Instant;

use pdp_core::{ResultRow, RowStatus, WorkItem};

use crate::process::{ProcessItem, TIMESTAMP_FORMAT};
use crate::report::ReportSink;

/// The externally tunable job bounds; everything else is a fixed parameter
/// on its settings struct.
#[derive(Debug, Clone)]
pub struct ScheduleSettings {
    /// Wall-clock budget per pass.
    pub time_budget: Duration,
    /// Maximum number of passes over the queue.
    pub max_passes: u32,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            time_budget: Duration::from_secs(5400),
            max_passes: 3,
        }
    }
}

impl ScheduleSettings {
    /// Reads `TIME_BUDGET_SECONDS` and `MAX_LOOPS`, keeping defaults for
    /// absent or unparseable values.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(raw) = std::env::var("TIME_BUDGET_SECONDS") {
            match raw.parse::<f64>() {
                Ok(secs) if secs >= 0.0 && secs.is_finite() => {
                    settings.time_budget = Duration::from_secs_f64(secs);
                }
                _ => log::warn!("ignoring unparseable TIME_BUDGET_SECONDS='{raw}'"),
            }
        }
        if let Ok(raw) = std::env::var("MAX_LOOPS") {
            match raw.parse::<u32>() {
                Ok(passes) => settings.max_passes = passes,
                Err(_) => log::warn!("ignoring unparseable MAX_LOOPS='{raw}'"),
            }
        }
        settings
    }
}

/// Final job state: everything processed plus whatever the pass budget
/// left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub rows: Vec<ResultRow>,
    pub pending: Vec<WorkItem>,
    pub passes_run: u32,
}

/// Drives bounded passes over the work queue.
///
/// Each pass processes items in order until its wall-clock budget runs
/// out; the remainder is carried into the next pass. The accumulated row
/// set is persisted through `sink` after every pass, so progress survives
/// a kill between passes. Items left after the final pass come back in
/// `JobOutcome::pending` — deferred, never dropped.
pub async fn run_passes(
    items: Vec<WorkItem>,
    processor: &mut dyn ProcessItem,
    sink: &dyn ReportSink,
    settings: &ScheduleSettings,
) -> JobOutcome {
    let mut rows: Vec<ResultRow> = Vec::new();
    let mut pending = items;
    let mut passes_run = 0;

    for pass in 1..=settings.max_passes {
        if pending.is_empty() {
            break;
        }
        passes_run = pass;
        let total = pending.len();
        log::info!(
            "pass {pass}/{}: {total} items pending",
            settings.max_passes
        );

        let pass_start = Instant::now();
        let mut leftover: Vec<WorkItem> = Vec::new();

        for (index, item) in pending.iter().enumerate() {
            let elapsed = pass_start.elapsed();
            if elapsed >= settings.time_budget {
                log::warn!(
                    "pass {pass} budget exhausted after {:.0}s; deferring {} items",
                    elapsed.as_secs_f64(),
                    total - index
                );
                leftover = pending[index..].to_vec();
                break;
            }

            // One bad item must not abort the pass or lose progress.
            let row = match processor.process(item).await {
                Ok(row) => row,
                Err(err) => failure_row(item, &err.to_string()),
            };
            log::info!(
                "[pass {pass}] [{}/{total}] {} -> {}",
                index + 1,
                item.raw_id(),
                row.status
            );
            rows.push(row);
        }

        if let Err(err) = sink.persist(&rows) {
            log::error!("failed to persist report after pass {pass}: {err}");
        }
        pending = leftover;
    }

    JobOutcome {
        rows,
        pending,
        passes_run,
    }
}

fn failure_row(item: &WorkItem, message: &str) -> ResultRow {
    ResultRow {
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        item_key: item.key().to_string(),
        url: item.resolved_url(),
        fields: None,
        status: RowStatus::Failed(message.to_string()),
    }
}
