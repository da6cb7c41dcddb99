//! In-memory document with highlight state.
//!
//! A [`Document`] is an ordered list of paragraphs plus the marks and
//! selection a [`locate`](crate::locate::locate) call leaves behind. It is
//! the [`TextSource`] the CLI and MCP server use.

use camino::Utf8Path;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::DocumentError;
use crate::locate::TextSource;
use crate::markdown;
use crate::repetition::PhrasePattern;
use crate::text;

/// How to turn a file's contents into paragraphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum InputFormat {
    /// Markdown for `.md`/`.markdown` files, plain text otherwise.
    #[default]
    Auto,
    /// Paragraphs separated by blank lines.
    Text,
    /// CommonMark, keeping only prose.
    Markdown,
}

impl InputFormat {
    /// Resolve [`InputFormat::Auto`] using the file extension, if any.
    pub fn resolve(self, path: Option<&Utf8Path>) -> Self {
        match self {
            Self::Auto => match path.and_then(Utf8Path::extension) {
                Some(ext) if ext.eq_ignore_ascii_case("md") => Self::Markdown,
                Some(ext) if ext.eq_ignore_ascii_case("markdown") => Self::Markdown,
                _ => Self::Text,
            },
            other => other,
        }
    }

    /// Returns the format name as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Text => "text",
            Self::Markdown => "markdown",
        }
    }
}

/// A byte range inside one paragraph.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Span {
    /// Index of the paragraph.
    pub paragraph: usize,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Span {
    /// Create a span.
    pub const fn new(paragraph: usize, start: usize, end: usize) -> Self {
        Self {
            paragraph,
            start,
            end,
        }
    }
}

/// How a piece of paragraph text is highlighted when rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    /// Not highlighted.
    Plain,
    /// One of the marked occurrences.
    Marked,
    /// The marked occurrence that is also the selection.
    Selected,
}

/// Paragraphs of text with marks and a selection.
#[derive(Debug, Clone, Default)]
pub struct Document {
    paragraphs: Vec<String>,
    marks: Vec<Span>,
    selection: Option<Span>,
}

impl Document {
    /// Create a document from paragraphs in order.
    pub fn from_paragraphs(paragraphs: Vec<String>) -> Self {
        Self {
            paragraphs,
            marks: Vec::new(),
            selection: None,
        }
    }

    /// Split `source` into paragraphs according to `format`.
    ///
    /// [`InputFormat::Auto`] is treated as plain text here; resolve it
    /// against a path first with [`InputFormat::resolve`].
    pub fn from_source(source: &str, format: InputFormat) -> Self {
        let paragraphs = match format {
            InputFormat::Markdown => markdown::paragraphs(source),
            InputFormat::Auto | InputFormat::Text => text::split_paragraphs(source),
        };
        Self::from_paragraphs(paragraphs)
    }

    /// The paragraphs, in document order.
    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// All paragraph text joined with single spaces.
    pub fn raw_text(&self) -> String {
        text::join_paragraphs(&self.paragraphs)
    }

    /// Whether the document has no paragraphs.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Currently marked spans, in the order they were marked.
    pub fn marks(&self) -> &[Span] {
        &self.marks
    }

    /// The current selection.
    pub fn selection(&self) -> Option<&Span> {
        self.selection.as_ref()
    }

    /// The text covered by `span`, if the span is valid.
    pub fn slice(&self, span: &Span) -> Option<&str> {
        self.paragraphs
            .get(span.paragraph)
            .and_then(|p| p.get(span.start..span.end))
    }

    fn check(&self, span: &Span) -> Result<(), DocumentError> {
        if span.start <= span.end && self.slice(span).is_some() {
            Ok(())
        } else {
            Err(DocumentError::SpanOutOfBounds {
                paragraph: span.paragraph,
                start: span.start,
                end: span.end,
            })
        }
    }

    /// Render each paragraph, passing every piece of text through `style`.
    ///
    /// Overlapping marks are drawn once, earliest start first.
    pub fn render<F>(&self, mut style: F) -> Vec<String>
    where
        F: FnMut(&str, Highlight) -> String,
    {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(index, paragraph)| {
                let mut spans: Vec<&Span> =
                    self.marks.iter().filter(|s| s.paragraph == index).collect();
                spans.sort();

                let mut out = String::with_capacity(paragraph.len());
                let mut cursor = 0;
                for span in spans {
                    if span.start < cursor {
                        continue;
                    }
                    out.push_str(&style(&paragraph[cursor..span.start], Highlight::Plain));
                    let highlight = if self.selection.as_ref() == Some(span) {
                        Highlight::Selected
                    } else {
                        Highlight::Marked
                    };
                    out.push_str(&style(&paragraph[span.start..span.end], highlight));
                    cursor = span.end;
                }
                out.push_str(&style(&paragraph[cursor..], Highlight::Plain));
                out
            })
            .collect()
    }
}

impl TextSource for Document {
    type Range = Span;
    type Error = DocumentError;

    fn clear_marks(&mut self) -> Result<(), Self::Error> {
        self.marks.clear();
        Ok(())
    }

    fn find_all(&mut self, needle: &str) -> Result<Vec<Span>, Self::Error> {
        let pattern = PhrasePattern::new(needle).map_err(|e| DocumentError::Search {
            phrase: needle.to_string(),
            reason: e.to_string(),
        })?;

        Ok(self
            .paragraphs
            .iter()
            .enumerate()
            .flat_map(|(index, paragraph)| {
                pattern
                    .find_ranges(paragraph)
                    .map(move |r| Span::new(index, r.start, r.end))
                    .collect::<Vec<_>>()
            })
            .collect())
    }

    fn mark_all(&mut self, ranges: &[Span]) -> Result<(), Self::Error> {
        // One bad span rejects the whole batch.
        for span in ranges {
            self.check(span)?;
        }
        self.marks.extend_from_slice(ranges);
        Ok(())
    }

    fn select(&mut self, range: &Span) -> Result<(), Self::Error> {
        self.check(range)?;
        self.selection = Some(*range);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brackets(text: &str, highlight: Highlight) -> String {
        match highlight {
            Highlight::Plain => text.to_string(),
            Highlight::Marked => format!("[{text}]"),
            Highlight::Selected => format!("<{text}>"),
        }
    }

    fn doc(paragraphs: &[&str]) -> Document {
        Document::from_paragraphs(paragraphs.iter().map(|p| (*p).to_string()).collect())
    }

    #[test]
    fn auto_format_follows_extension() {
        let md = Utf8Path::new("notes/draft.md");
        let upper = Utf8Path::new("README.MARKDOWN");
        let txt = Utf8Path::new("notes/draft.txt");
        assert_eq!(InputFormat::Auto.resolve(Some(md)), InputFormat::Markdown);
        assert_eq!(InputFormat::Auto.resolve(Some(upper)), InputFormat::Markdown);
        assert_eq!(InputFormat::Auto.resolve(Some(txt)), InputFormat::Text);
        assert_eq!(InputFormat::Auto.resolve(None), InputFormat::Text);
        assert_eq!(InputFormat::Text.resolve(Some(md)), InputFormat::Text);
    }

    #[test]
    fn raw_text_joins_paragraphs() {
        let document = Document::from_source("One two.\n\nThree four.", InputFormat::Text);
        assert_eq!(document.paragraphs().len(), 2);
        assert_eq!(document.raw_text(), "One two. Three four.");
    }

    #[test]
    fn markdown_source_drops_headings() {
        let document = Document::from_source("# Title\n\nBody text.", InputFormat::Markdown);
        assert_eq!(document.paragraphs(), ["Body text."]);
    }

    #[test]
    fn find_all_is_per_paragraph_and_case_insensitive() {
        let mut document = doc(&["the Quick fox", "quick fox, QUICK FOX"]);
        let spans = document.find_all("quick fox").unwrap();
        assert_eq!(
            spans,
            vec![Span::new(0, 4, 13), Span::new(1, 0, 9), Span::new(1, 11, 20)]
        );
    }

    #[test]
    fn find_all_does_not_cross_paragraphs() {
        let mut document = doc(&["the quick", "fox ran"]);
        assert!(document.find_all("quick fox").unwrap().is_empty());
    }

    #[test]
    fn mark_rejects_out_of_bounds_spans() {
        let mut document = doc(&["short"]);
        let err = document
            .mark_all(&[Span::new(0, 0, 5), Span::new(0, 2, 99)])
            .unwrap_err();
        assert_eq!(
            err,
            DocumentError::SpanOutOfBounds {
                paragraph: 0,
                start: 2,
                end: 99
            }
        );
        assert!(document.marks().is_empty());
        assert!(document.select(&Span::new(3, 0, 1)).is_err());
    }

    #[test]
    fn mark_rejects_spans_inside_a_character() {
        let mut document = doc(&["café"]);
        // "é" occupies bytes 3..5
        assert!(document.mark_all(&[Span::new(0, 0, 3)]).is_ok());
        assert!(document.mark_all(&[Span::new(0, 0, 4)]).is_err());
    }

    #[test]
    fn clear_keeps_selection() {
        let mut document = doc(&["a b a"]);
        let spans = document.find_all("a").unwrap();
        document.mark_all(&spans).unwrap();
        document.select(&spans[0]).unwrap();
        document.clear_marks().unwrap();
        assert!(document.marks().is_empty());
        assert_eq!(document.selection(), Some(&spans[0]));
    }

    #[test]
    fn render_decorates_marks_and_selection() {
        let mut document = doc(&["the quick fox and the quick fox", "no match here"]);
        let spans = document.find_all("quick fox").unwrap();
        document.mark_all(&spans).unwrap();
        document.select(&spans[0]).unwrap();

        let rendered = document.render(brackets);
        assert_eq!(
            rendered,
            vec!["the <quick fox> and the [quick fox]", "no match here"]
        );
    }

    #[test]
    fn render_skips_overlapping_marks() {
        let mut document = doc(&["abcdef"]);
        document
            .mark_all(&[Span::new(0, 2, 4), Span::new(0, 0, 3)])
            .unwrap();
        assert_eq!(document.render(brackets), vec!["[abc]def"]);
    }

    #[test]
    fn slice_returns_marked_text() {
        let document = doc(&["hello world"]);
        assert_eq!(document.slice(&Span::new(0, 6, 11)), Some("world"));
        assert_eq!(document.slice(&Span::new(1, 0, 1)), None);
    }
}
