//! Harvester engine: resilient fetching, pass scheduling and report output.
mod extract;
mod fetch;
mod notify;
mod process;
mod report;
mod schedule;
mod types;

pub use extract::{Extractor, NextDataExtractor};
pub use fetch::{
    network_retry_wait, pushback_backoff, transient_retry_wait, FetchError, FetchSettings,
    Fetcher, PdpFetcher,
};
pub use notify::{send_report, MailSettings, NotifyError};
pub use process::{ProcessError, ProcessItem, Processor};
pub use report::{
    write_pending, FileReportSink, ReportError, ReportSink, CSV_FILENAME, PENDING_FILENAME,
    XLSX_FILENAME,
};
pub use schedule::{run_passes, JobOutcome, ScheduleSettings};
pub use types::{FetchOutcome, FetchReport};
