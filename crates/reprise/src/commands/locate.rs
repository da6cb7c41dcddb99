//! Locate command: highlight every occurrence of a phrase in a file.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, instrument};

use reprise_core::{
    Config, Document, Highlight, RepetitionReport, Span, detect_repetitions, locate,
};

use super::DetectionArgs;

/// Arguments for the `locate` subcommand.
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// File to search.
    pub file: Utf8PathBuf,

    /// Phrase to highlight.
    #[arg(required_unless_present = "rank")]
    pub phrase: Option<String>,

    /// Highlight the N-th phrase from `detect` instead (1-based).
    #[arg(long, value_name = "N", conflicts_with = "phrase")]
    pub rank: Option<usize>,

    #[command(flatten)]
    pub detection: DetectionArgs,
}

/// One highlighted occurrence.
#[derive(Debug, Serialize)]
struct Occurrence<'a> {
    #[serde(flatten)]
    span: Span,
    text: &'a str,
}

/// JSON shape of a locate run.
#[derive(Debug, Serialize)]
struct LocateReport<'a> {
    file: &'a str,
    sequence: &'a str,
    total_matches: usize,
    selected: Option<Span>,
    matches: Vec<Occurrence<'a>>,
}

/// Mark every occurrence of a phrase, select the first, and print the result.
#[instrument(name = "cmd_locate", skip_all, fields(file = %args.file))]
pub fn cmd_locate(args: LocateArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(phrase = ?args.phrase, rank = ?args.rank, "executing locate command");

    let mut document = super::load_document(
        &args.file,
        args.detection.input_format(config),
        config.input_limit(),
    )?;

    let sequence = match (args.phrase, args.rank) {
        (Some(phrase), _) => phrase,
        (None, Some(rank)) => phrase_at_rank(&document, &args.detection, config, rank)?,
        (None, None) => bail!("give a phrase or --rank"),
    };

    let outcome = locate(&sequence, &mut document)
        .with_context(|| format!("failed to locate {sequence:?} in {}", args.file))?;

    if global_json {
        let report = LocateReport {
            file: args.file.as_str(),
            sequence: &outcome.sequence,
            total_matches: outcome.matches.len(),
            selected: outcome.selected,
            matches: outcome
                .matches
                .iter()
                .map(|span| Occurrence {
                    span: *span,
                    text: document.slice(span).unwrap_or_default(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    for paragraph in document.render(paint) {
        println!("{paragraph}");
        println!();
    }

    match outcome.selected {
        Some(span) => println!(
            "{} occurrence(s) of \"{}\"; selected paragraph {}, bytes {}..{}",
            outcome.matches.len().if_supports_color(Stream::Stdout, |t| t.cyan()),
            outcome.sequence,
            span.paragraph + 1,
            span.start,
            span.end,
        ),
        None => println!(
            "{}",
            format!("no occurrences of \"{}\"", outcome.sequence)
                .if_supports_color(Stream::Stdout, |t| t.yellow())
        ),
    }

    Ok(())
}

/// The phrase shown at `rank` (1-based) by the same detection `detect` runs.
fn phrase_at_rank(
    document: &Document,
    detection: &DetectionArgs,
    config: &Config,
    rank: usize,
) -> anyhow::Result<String> {
    let params = detection.params(config);
    let records = detect_repetitions(&document.raw_text(), &params);
    let report = RepetitionReport::new(records, params, Some(detection.max_results(config)));

    let Some(record) = rank
        .checked_sub(1)
        .and_then(|index| report.records.into_iter().nth(index))
    else {
        bail!(
            "rank {rank} is out of range: {} repeated phrase(s) shown",
            report.shown
        );
    };
    debug!(rank, sequence = %record.sequence, "picked ranked phrase");
    Ok(record.sequence)
}

fn paint(text: &str, highlight: Highlight) -> String {
    match highlight {
        Highlight::Plain => text.to_string(),
        Highlight::Marked => text
            .if_supports_color(Stream::Stdout, |t| t.black().on_yellow().to_string())
            .to_string(),
        Highlight::Selected => text
            .if_supports_color(Stream::Stdout, |t| {
                t.black().on_yellow().bold().underline().to_string()
            })
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), contents).unwrap();
        tmp
    }

    fn args(tmp: &tempfile::NamedTempFile, phrase: Option<&str>, rank: Option<usize>) -> LocateArgs {
        LocateArgs {
            file: Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap(),
            phrase: phrase.map(str::to_string),
            rank,
            detection: DetectionArgs::default(),
        }
    }

    #[test]
    fn locate_phrase_succeeds() {
        let tmp = write_tmp("the quick fox ran. a quick fox hid.");
        assert!(cmd_locate(args(&tmp, Some("quick fox"), None), false, &Config::default()).is_ok());
    }

    #[test]
    fn missing_phrase_is_not_an_error() {
        let tmp = write_tmp("the quick fox ran.");
        assert!(cmd_locate(args(&tmp, Some("zzz"), None), true, &Config::default()).is_ok());
    }

    #[test]
    fn empty_phrase_fails() {
        let tmp = write_tmp("the quick fox ran.");
        assert!(cmd_locate(args(&tmp, Some(""), None), false, &Config::default()).is_err());
    }

    #[test]
    fn rank_picks_ranked_phrase() {
        let tmp = write_tmp("the quick fox the quick fox the quick fox.");
        let document = Document::from_paragraphs(vec![
            std::fs::read_to_string(tmp.path()).unwrap(),
        ]);
        let phrase =
            phrase_at_rank(&document, &DetectionArgs::default(), &Config::default(), 1).unwrap();
        // Longer windows overlap themselves, so they only match once.
        assert_eq!(phrase, "the quick fox");
        assert!(cmd_locate(args(&tmp, None, Some(1)), true, &Config::default()).is_ok());
    }

    #[test]
    fn rank_out_of_range_fails() {
        let tmp = write_tmp("a b c.");
        let err = cmd_locate(args(&tmp, None, Some(1)), false, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let tmp = write_tmp("the quick fox the quick fox the quick fox.");
        assert!(cmd_locate(args(&tmp, None, Some(0)), false, &Config::default()).is_err());
    }

    #[test]
    fn plain_highlight_is_untouched() {
        assert_eq!(paint("quick fox", Highlight::Plain), "quick fox");
    }
}
