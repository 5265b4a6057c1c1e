use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use pdp_core::{PacingPlanner, PushbackWindow, ResultRow, RowStatus, WorkItem};

use crate::extract::Extractor;
use crate::fetch::{FetchError, Fetcher};
use crate::types::FetchOutcome;

pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// One work item in, one result row out.
#[async_trait::async_trait]
pub trait ProcessItem: Send {
    async fn process(&mut self, item: &WorkItem) -> Result<ResultRow, ProcessError>;
}

/// Production processor: pacing sleep, fetch, classification, extraction,
/// and exactly one pushback observation per item regardless of how many
/// retry attempts the fetch took.
pub struct Processor {
    fetcher: Box<dyn Fetcher>,
    extractor: Box<dyn Extractor>,
    pacing: PacingPlanner,
    window: PushbackWindow,
    rng: StdRng,
}

impl Processor {
    pub fn new(
        fetcher: Box<dyn Fetcher>,
        extractor: Box<dyn Extractor>,
        pacing: PacingPlanner,
        window: PushbackWindow,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            pacing,
            window,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Current pushback ratio, for logging and assertions.
    pub fn pushback_ratio(&self) -> f64 {
        self.window.ratio()
    }
}

#[async_trait::async_trait]
impl ProcessItem for Processor {
    async fn process(&mut self, item: &WorkItem) -> Result<ResultRow, ProcessError> {
        let ratio = self.window.ratio();
        let delay = self.pacing.plan_delay(&mut self.rng, ratio);
        log::info!(
            "waiting {:.1}s before '{}' (recent pushback ratio {ratio:.2})",
            delay.as_secs_f64(),
            item.raw_id()
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let url = item.resolved_url();
        let report = self.fetcher.fetch(&url).await?;

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let (fields, status) = match report.outcome {
            FetchOutcome::Success { body } => match self.extractor.extract(&body) {
                Some(fields) => (Some(fields), RowStatus::Ok),
                None => (None, RowStatus::UnknownFormat),
            },
            FetchOutcome::NotFound => (None, RowStatus::NotFound),
            FetchOutcome::Failed { .. } => (None, RowStatus::HttpError),
        };

        self.window.record(report.pushback);

        Ok(ResultRow {
            timestamp,
            item_key: item.key().to_string(),
            url,
            fields,
            status,
        })
    }
}
