//! Repeated phrase detection.
//!
//! Candidate phrases are runs of consecutive words inside a sentence. Each
//! distinct candidate is counted against the whole text with a
//! case-insensitive, whole-word match, and kept when it occurs often enough.
//! The surviving records are ranked longest phrase first, then most frequent.

use std::collections::HashSet;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AnalysisError, AnalysisResult};
use crate::text;

/// The numeric knobs of [`detect_repetitions`].
///
/// No validation happens here. Degenerate combinations such as
/// `min_word_count > max_word_count` simply produce no records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionParams {
    /// Shortest phrase to consider, in words.
    pub min_word_count: usize,
    /// Longest phrase to consider, in words.
    pub max_word_count: usize,
    /// Minimum number of occurrences for a phrase to be reported.
    pub min_occurrences: usize,
}

impl DetectionParams {
    /// Create a parameter set.
    pub const fn new(min_word_count: usize, max_word_count: usize, min_occurrences: usize) -> Self {
        Self {
            min_word_count,
            max_word_count,
            min_occurrences,
        }
    }
}

/// A phrase that repeats, with its length and how often it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RepetitionRecord {
    /// The phrase exactly as it first appeared.
    pub sequence: String,
    /// Number of words in the phrase.
    pub word_count: usize,
    /// Case-insensitive whole-word occurrences in the full text.
    pub hits: usize,
}

/// Ranked repetitions, capped for display.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RepetitionReport {
    /// Records found before the cap was applied.
    pub total: usize,
    /// Records kept after the cap.
    pub shown: usize,
    /// The cap that was applied, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    /// Parameters the detection ran with.
    pub params: DetectionParams,
    /// The ranked records, longest and most frequent first.
    pub records: Vec<RepetitionRecord>,
}

impl RepetitionReport {
    /// Build a report from ranked records, keeping at most `max_results`.
    pub fn new(
        mut records: Vec<RepetitionRecord>,
        params: DetectionParams,
        max_results: Option<usize>,
    ) -> Self {
        let total = records.len();
        if let Some(max) = max_results {
            records.truncate(max);
        }
        Self {
            total,
            shown: records.len(),
            max_results,
            params,
            records,
        }
    }
}

/// Compiled whole-word, case-insensitive matcher for one literal phrase.
///
/// Word boundaries are ASCII-only, like the classic `\b` of most regex
/// dialects.
#[derive(Debug, Clone)]
pub struct PhrasePattern {
    regex: Regex,
}

impl PhrasePattern {
    /// Compile a matcher for `phrase`.
    pub fn new(phrase: &str) -> AnalysisResult<Self> {
        Self::build(phrase, None)
    }

    /// Compile a matcher with an explicit compiled-size limit in bytes.
    pub fn with_size_limit(phrase: &str, limit: usize) -> AnalysisResult<Self> {
        Self::build(phrase, Some(limit))
    }

    fn build(phrase: &str, size_limit: Option<usize>) -> AnalysisResult<Self> {
        let pattern = format!(r"(?-u:\b){}(?-u:\b)", regex::escape(phrase));
        let mut builder = RegexBuilder::new(&pattern);
        builder.case_insensitive(true);
        if let Some(limit) = size_limit {
            builder.size_limit(limit);
        }
        let regex = builder.build().map_err(|source| AnalysisError::Pattern {
            phrase: phrase.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// Count non-overlapping matches in `haystack`.
    pub fn count(&self, haystack: &str) -> usize {
        self.regex.find_iter(haystack).count()
    }

    /// Byte ranges of non-overlapping matches in `haystack`, in order.
    pub fn find_ranges<'h>(&'h self, haystack: &'h str) -> impl Iterator<Item = Range<usize>> + 'h {
        self.regex.find_iter(haystack).map(|m| m.range())
    }
}

/// Count case-insensitive whole-word occurrences of `phrase` in `text`.
pub fn count_occurrences(text: &str, phrase: &str) -> AnalysisResult<usize> {
    Ok(PhrasePattern::new(phrase)?.count(text))
}

/// Find phrases that occur at least `min_occurrences` times.
///
/// For every sentence (text between `.` characters) and every phrase length
/// in `min_word_count..=max_word_count`, windows start at each index `i`
/// with `i < words.len() - word_count`. The final window of each length is
/// never considered, so a sentence of exactly `word_count` words yields no
/// candidate of that length.
///
/// Counts are taken over the whole `text`, not the sentence the phrase came
/// from. Records are keyed by their exact string: the first candidate with a
/// given spelling wins, and phrases differing only in case are separate
/// records even though their counts are case-insensitive.
///
/// A candidate whose pattern cannot be compiled is logged and skipped.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn detect_repetitions(text: &str, params: &DetectionParams) -> Vec<RepetitionRecord> {
    detect_with(text, params, PhrasePattern::new)
}

fn detect_with<F>(text: &str, params: &DetectionParams, compile: F) -> Vec<RepetitionRecord>
where
    F: Fn(&str) -> AnalysisResult<PhrasePattern>,
{
    let mut records: Vec<RepetitionRecord> = Vec::new();
    let mut evaluated: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;

    for sentence in text::split_sentences(text) {
        let words = text::split_words(sentence);

        for word_count in params.min_word_count..=params.max_word_count {
            let Some(end) = words.len().checked_sub(word_count) else {
                continue;
            };

            for start in 0..end {
                let sequence = words[start..start + word_count].join(" ").trim().to_string();

                // A spelling always counts the same, so each is evaluated once.
                if !evaluated.insert(sequence.clone()) {
                    continue;
                }

                let hits = match compile(&sequence) {
                    Ok(pattern) => pattern.count(text),
                    Err(err) => {
                        warn!(error = %err, "skipping candidate phrase");
                        skipped += 1;
                        continue;
                    }
                };

                if hits > 0 && hits >= params.min_occurrences {
                    records.push(RepetitionRecord {
                        sequence,
                        word_count,
                        hits,
                    });
                }
            }
        }
    }

    records.sort_by(|a, b| {
        b.word_count
            .cmp(&a.word_count)
            .then_with(|| b.hits.cmp(&a.hits))
    });

    debug!(
        candidates = evaluated.len(),
        records = records.len(),
        skipped,
        "repetition detection finished"
    );
    records
}

/// The first `max_results` records, clamping non-positive caps to zero.
pub fn cap_results(records: &[RepetitionRecord], max_results: i64) -> &[RepetitionRecord] {
    let cap = if max_results <= 0 {
        0
    } else {
        usize::try_from(max_results).unwrap_or(usize::MAX)
    };
    &records[..cap.min(records.len())]
}
