//! Binary entry point: wires the session, walker, and sinks together.
//!
//! The run body lives in [`run`]; `main` owns the single log-and-cleanup
//! boundary. Whatever happens inside the run, the browser session is closed
//! before the process reports its outcome.

use clap::Parser;
use news_harvest::category::{self, CategoryOutcome};
use news_harvest::cli::{load_work_item, Cli, RunConfig};
use news_harvest::outputs::images::{FsImageSink, NullImageSink};
use news_harvest::outputs::table;
use news_harvest::session::LiteSession;
use news_harvest::walker::{probe_results, ProbeOutcome, ResultPageWalker};
use news_harvest::window::calculate_cutoff;
use news_harvest::{BrowserSession, HarvestError, Selectors};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

/// Bound on the initial "are there any results" probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(15);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_harvest starting up");

    let args = Cli::parse();
    let work_item = match &args.work_item {
        Some(path) => Some(load_work_item(path).await?),
        None => None,
    };
    let config = RunConfig::resolve(&args, work_item);
    info!(
        phrase = %config.search_phrase,
        category = %config.news_category,
        months = config.number_of_months,
        portal = %args.portal_url,
        "Resolved harvest inputs"
    );

    let mut session = LiteSession::open(&args.portal_url, &config.search_phrase).await?;

    // Single cleanup boundary: the session is closed however the run ends.
    let outcome = run(&mut session, &config, &args).await;
    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close session cleanly");
    }

    let elapsed = start_time.elapsed();
    match outcome {
        Ok(count) => {
            info!(records = count, ?elapsed, "Execution complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, ?elapsed, "Harvest failed");
            Err(e.into())
        }
    }
}

/// Probe, select the category, compute the cutoff, walk, write outputs.
#[instrument(level = "info", skip_all)]
async fn run(
    session: &mut LiteSession,
    config: &RunConfig,
    args: &Cli,
) -> Result<usize, HarvestError> {
    let selectors = Selectors::default();

    if probe_results(session, &selectors, PROBE_TIMEOUT).await? == ProbeOutcome::NotFound {
        return Err(HarvestError::NoResultsFound {
            phrase: config.search_phrase.clone(),
        });
    }

    if config.news_category.is_empty() {
        info!("No category requested; continuing without selection");
    } else {
        match category::apply_category(session, &selectors, &config.news_category).await? {
            CategoryOutcome::Selected => {}
            CategoryOutcome::NotMatched => {
                // Not an error; the walk proceeds unfiltered.
            }
        }
    }

    let cutoff = calculate_cutoff(config.number_of_months);
    let out_dir = PathBuf::from(&args.output_dir);

    let records = if args.skip_images {
        let mut sink = NullImageSink;
        ResultPageWalker::new(session, &mut sink, &selectors, cutoff, &config.search_phrase)
            .run()
            .await?
    } else {
        let mut sink = FsImageSink::new(&out_dir).with_base(session.current_url().clone());
        ResultPageWalker::new(session, &mut sink, &selectors, cutoff, &config.search_phrase)
            .run()
            .await?
    };

    let path = table::write_records(&records, &out_dir).await?;
    info!(
        records = records.len(),
        table = %path.display(),
        "Harvest outputs written"
    );
    Ok(records.len())
}
