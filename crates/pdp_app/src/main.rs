//! PDP harvest job binary: wires the engine components, runs the bounded
//! pass loop, externalizes pending work and mails the report files.

use std::path::{Path, PathBuf};

use anyhow::Context;

use pdp_core::{PacingPlanner, PushbackWindow, WorkItem};
use pdp_engine::{
    run_passes, send_report, write_pending, FetchSettings, FileReportSink, MailSettings,
    NextDataExtractor, PdpFetcher, Processor, ScheduleSettings,
};

const DEFAULT_INPUT: &str = "codes.txt";

fn main() -> anyhow::Result<()> {
    job_logging::initialize(job_logging::LogDestination::Terminal);

    let input = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_INPUT.to_string());
    let items = load_items(Path::new(&input))?;
    let output_dir = PathBuf::from(".");
    log::info!("processing {} items from {input}", items.len());

    let settings = ScheduleSettings::from_env();
    let sink = FileReportSink::new(output_dir.clone());

    let runtime = tokio::runtime::Runtime::new().context("tokio runtime")?;
    let outcome = runtime.block_on(async {
        let fetcher = PdpFetcher::new(FetchSettings::default())?;
        let mut processor = Processor::new(
            Box::new(fetcher),
            Box::new(NextDataExtractor),
            PacingPlanner::default(),
            PushbackWindow::default(),
        );
        anyhow::Ok(run_passes(items, &mut processor, &sink, &settings).await)
    })?;

    if outcome.pending.is_empty() {
        log::info!(
            "no pending items left after {} passes ({} rows)",
            outcome.passes_run,
            outcome.rows.len()
        );
    } else {
        let path = write_pending(&output_dir, &outcome.pending)?;
        log::warn!(
            "{} items still pending; saved to {}",
            outcome.pending.len(),
            path.display()
        );
    }

    match MailSettings::from_env() {
        Some(mail) => {
            let attachments = vec![sink.csv_path(), sink.xlsx_path()];
            if let Err(err) = send_report(&mail, &attachments) {
                log::error!("report mail failed: {err}");
            }
        }
        None => log::info!("EMAIL_SENDER / EMAIL_PASSWORD / EMAIL_TO not set; skipping mail"),
    }

    println!("Harvest finished.");
    Ok(())
}

fn load_items(path: &Path) -> anyhow::Result<Vec<WorkItem>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading input list {}", path.display()))?;
    Ok(WorkItem::parse_list(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_items_parses_codes_and_urls() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "123\n# skip\nhttps://example.com/pdp/9").unwrap();

        let items = load_items(file.path()).unwrap();
        assert_eq!(
            items,
            vec![
                WorkItem::Code("123".to_string()),
                WorkItem::DirectUrl("https://example.com/pdp/9".to_string()),
            ]
        );
    }

    #[test]
    fn load_items_fails_on_missing_file() {
        assert!(load_items(Path::new("definitely-missing.txt")).is_err());
    }
}
