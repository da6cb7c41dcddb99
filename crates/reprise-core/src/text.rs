//! Text processing utilities.
//!
//! Sentences end at every `.` and words are separated by exactly one space.
//! Abbreviations, decimals and runs of whitespace get no special treatment.

/// Split text into sentences on every `.`.
///
/// The pieces are returned untrimmed; rejoining them with `.` gives back the
/// input. A text without any `.` is a single sentence, and an empty text is a
/// single empty sentence.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split('.')
}

/// Split a sentence into words on single spaces after trimming it.
///
/// Consecutive spaces produce empty words, which are kept.
pub fn split_words(sentence: &str) -> Vec<&str> {
    sentence.trim().split(' ').collect()
}

/// Split text into paragraphs (separated by blank lines).
///
/// Line breaks inside a paragraph become single spaces, so a paragraph is
/// always one line of prose.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(|p| p.trim().lines().map(str::trim).collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .collect()
}

/// Concatenate paragraphs into one body of text, separated by single spaces.
pub fn join_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> String {
    paragraphs
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}
