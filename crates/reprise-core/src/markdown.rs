//! Markdown processing utilities.
//!
//! Uses pulldown-cmark for proper CommonMark parsing rather than regex-based
//! stripping. This handles edge cases (nested code blocks, HTML entities,
//! reference links) that regex approaches miss.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

/// Extract the prose paragraphs of a markdown document, in order.
///
/// Each paragraph, tight list item and blockquote paragraph becomes one
/// entry, with soft and hard breaks turned into single spaces.
///
/// Skipped entirely:
/// - Code blocks (fenced and indented)
/// - HTML
/// - YAML frontmatter
/// - Headings (section titles are not prose)
/// - Tables
///
/// Link text, emphasized text and inline code are kept without their
/// markers, so a sentence reads the same as in the source.
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn paragraphs(text: &str) -> Vec<String> {
    let text = strip_frontmatter(text);

    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_FOOTNOTES;
    let parser = Parser::new_ext(&text, options);

    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut skip_depth: usize = 0;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_) | Tag::Heading { .. } | Tag::Table(_)) => {
                skip_depth += 1;
            }
            Event::End(TagEnd::CodeBlock | TagEnd::Heading(_) | TagEnd::Table) => {
                skip_depth = skip_depth.saturating_sub(1);
            }

            Event::Text(t) | Event::Code(t) if skip_depth == 0 => {
                current.push_str(&t);
            }
            Event::SoftBreak | Event::HardBreak if skip_depth == 0 => {
                current.push(' ');
            }

            // A nested list starts inside its parent's tight item text.
            Event::End(TagEnd::Paragraph | TagEnd::Item) | Event::Start(Tag::List(_))
                if skip_depth == 0 =>
            {
                flush(&mut current, &mut paragraphs);
            }

            _ => {}
        }
    }
    flush(&mut current, &mut paragraphs);

    paragraphs
}

/// Strip markdown formatting, returning plain prose on a single line.
///
/// Paragraphs from [`paragraphs`] joined with single spaces.
pub fn strip_to_prose(text: &str) -> String {
    crate::text::join_paragraphs(&paragraphs(text))
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    let paragraph = current.trim();
    if !paragraph.is_empty() {
        paragraphs.push(paragraph.to_string());
    }
    current.clear();
}

/// Strip YAML frontmatter delimited by `---` lines.
fn strip_frontmatter(text: &str) -> String {
    let trimmed = text.trim_start();
    if !trimmed.starts_with("---") {
        return text.to_string();
    }

    let after_opening = &trimmed[3..];
    let Some(close_pos) = after_opening.find("\n---") else {
        return text.to_string();
    };

    // Skip past the closing `---` and its newline
    let remainder = &after_opening[close_pos + 4..];
    remainder
        .strip_prefix('\n')
        .unwrap_or(remainder)
        .to_string()
}
