//! Detect command: list repeated phrases in a file.

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::{OwoColorize, Stream};
use tracing::{debug, instrument};

use reprise_core::{Config, RepetitionReport, detect_repetitions};

use super::DetectionArgs;

/// Arguments for the `detect` subcommand.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// File to analyze.
    pub file: Utf8PathBuf,

    #[command(flatten)]
    pub detection: DetectionArgs,
}

/// Find repeated phrases in a file and print the top results.
#[instrument(name = "cmd_detect", skip_all, fields(file = %args.file))]
pub fn cmd_detect(
    args: DetectArgs,
    global_json: bool,
    quiet: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let params = args.detection.params(config);
    let max_results = args.detection.max_results(config);
    debug!(?params, max_results, "executing detect command");

    let document = super::load_document(
        &args.file,
        args.detection.input_format(config),
        config.input_limit(),
    )?;

    let spinner = spinner(!global_json && !quiet);
    let records = detect_repetitions(&document.raw_text(), &params);
    spinner.finish_and_clear();

    let report = RepetitionReport::new(records, params, Some(max_results));

    if global_json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "{}",
        args.file
            .as_str()
            .if_supports_color(Stream::Stdout, |t| t.bold())
    );
    if report.records.is_empty() {
        println!("  no repeated phrases");
        return Ok(());
    }

    for (rank, record) in report.records.iter().enumerate() {
        println!(
            "{:>4}. {} : {}",
            rank + 1,
            record.sequence,
            record.hits.if_supports_color(Stream::Stdout, |t| t.cyan()),
        );
    }
    if report.shown < report.total {
        println!(
            "{}",
            format!("  ({} of {} shown)", report.shown, report.total)
                .if_supports_color(Stream::Stdout, |t| t.dimmed())
        );
    }

    Ok(())
}

/// A stderr spinner while detection runs, hidden when not wanted or not a TTY.
fn spinner(wanted: bool) -> ProgressBar {
    if !wanted || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message("looking for repeated phrases");
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
