//! Occurrence location and highlighting.
//!
//! [`locate`] owns the policy only: wipe previous marks, search, mark every
//! hit, select the first. Searching and marking belong to a [`TextSource`],
//! which is whatever holds the document (an editor session, or the
//! in-memory [`Document`](crate::document::Document)).

use serde::Serialize;
use tracing::debug;

use crate::error::LocateError;

/// A document that can be searched and highlighted.
///
/// Implementations report ranges in document order.
pub trait TextSource {
    /// A location inside the document.
    type Range: Clone;
    /// Failure of a round trip to the document.
    type Error: std::error::Error + 'static;

    /// Remove every highlight in the document.
    fn clear_marks(&mut self) -> Result<(), Self::Error>;

    /// Find every case-insensitive whole-word occurrence of `needle`.
    fn find_all(&mut self, needle: &str) -> Result<Vec<Self::Range>, Self::Error>;

    /// Highlight all of `ranges`.
    fn mark_all(&mut self, ranges: &[Self::Range]) -> Result<(), Self::Error>;

    /// Make `range` the active selection.
    fn select(&mut self, range: &Self::Range) -> Result<(), Self::Error>;
}

/// What a call to [`locate`] found and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocateOutcome<R> {
    /// The phrase that was located.
    pub sequence: String,
    /// Every match, in document order. All of them are marked.
    pub matches: Vec<R>,
    /// The match that became the selection, if there was one.
    pub selected: Option<R>,
}

impl<R> LocateOutcome<R> {
    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Mark every occurrence of `sequence` in `source` and select the first.
///
/// Prior marks are cleared before anything new is marked. When nothing
/// matches, the selection is left alone and the call still succeeds.
#[tracing::instrument(skip(source))]
pub fn locate<S>(
    sequence: &str,
    source: &mut S,
) -> Result<LocateOutcome<S::Range>, LocateError<S::Error>>
where
    S: TextSource,
{
    if sequence.is_empty() {
        return Err(LocateError::EmptySequence);
    }

    source.clear_marks().map_err(LocateError::Source)?;
    let matches = source.find_all(sequence).map_err(LocateError::Source)?;

    let Some(first) = matches.first().cloned() else {
        debug!("no occurrences found");
        return Ok(LocateOutcome {
            sequence: sequence.to_string(),
            matches,
            selected: None,
        });
    };

    source.mark_all(&matches).map_err(LocateError::Source)?;
    source.select(&first).map_err(LocateError::Source)?;

    debug!(matches = matches.len(), "occurrences marked");
    Ok(LocateOutcome {
        sequence: sequence.to_string(),
        matches,
        selected: Some(first),
    })
}
