//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use reprise_core::{Config, DetectionParams, Document, InputFormat};

pub mod detect;
pub mod info;
pub mod locate;
#[cfg(feature = "mcp")]
pub mod serve;

/// Detection flags shared by `detect` and `locate`.
///
/// Each flag overrides the matching config value when given.
#[derive(Args, Debug, Default, Clone)]
pub struct DetectionArgs {
    /// Shortest phrase to report, in words.
    #[arg(long, value_name = "N")]
    pub min_words: Option<usize>,

    /// Longest phrase to report, in words.
    #[arg(long, value_name = "N")]
    pub max_words: Option<usize>,

    /// Minimum occurrences for a phrase to be reported.
    #[arg(long, value_name = "N")]
    pub min_occurrences: Option<usize>,

    /// How many ranked phrases to show.
    #[arg(long, value_name = "N")]
    pub max_results: Option<usize>,

    /// How to read the file (auto picks markdown for .md files).
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub input_format: Option<InputFormat>,
}

impl DetectionArgs {
    /// Detection parameters, flags first, then config.
    pub fn params(&self, config: &Config) -> DetectionParams {
        DetectionParams::new(
            self.min_words.unwrap_or(config.min_word_count),
            self.max_words.unwrap_or(config.max_word_count),
            self.min_occurrences.unwrap_or(config.min_occurrences),
        )
    }

    /// Result cap, flag first, then config.
    pub fn max_results(&self, config: &Config) -> usize {
        self.max_results.unwrap_or(config.max_results)
    }

    /// Input format, flag first, then config.
    pub fn input_format(&self, config: &Config) -> InputFormat {
        self.input_format.unwrap_or(config.input_format)
    }
}

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Read a file into a [`Document`], resolving `auto` from its extension.
pub fn load_document(
    path: &Utf8Path,
    format: InputFormat,
    max_bytes: Option<usize>,
) -> anyhow::Result<Document> {
    let content = read_input_file(path, max_bytes)?;
    let format = format.resolve(Some(path));
    tracing::debug!(%path, format = format.as_str(), "loading document");
    Ok(Document::from_source(&content, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn flags_override_config() {
        let config = Config::default();
        let args = DetectionArgs {
            min_words: Some(3),
            max_results: Some(4),
            ..Default::default()
        };
        assert_eq!(args.params(&config), DetectionParams::new(3, 5, 2));
        assert_eq!(args.max_results(&config), 4);
        assert_eq!(args.input_format(&config), InputFormat::Auto);
    }

    #[test]
    fn oversize_input_is_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "0123456789").unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        let err = read_input_file(&path, Some(5)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
        assert!(read_input_file(&path, None).is_ok());
    }

    #[test]
    fn markdown_files_load_as_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Title\n\nBody one.\n\nBody two.").unwrap();
        let path = Utf8PathBuf::try_from(path).unwrap();

        let document = load_document(&path, InputFormat::Auto, None).unwrap();
        assert_eq!(document.paragraphs(), ["Body one.", "Body two."]);
    }
}
