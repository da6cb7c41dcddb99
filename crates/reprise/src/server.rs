//! MCP (Model Context Protocol) server implementation.
//!
//! Exposes repetition detection and phrase location to AI assistants over
//! stdio. The server wraps the same core library the CLI commands use; tool
//! methods only translate parameters, enforce the input limit, and serialize
//! results.

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::schemars;
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Serialize;

use reprise_core::{
    Config, DetectionParams, Document, InputFormat, LocateError, RepetitionReport, Span,
    cap_results, detect_repetitions, locate,
};

/// Parameters for the `get_info` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetInfoParams {
    /// Output format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "text".to_string()
}

/// Parameters for the `detect_repetitions` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct DetectRepetitionsParams {
    /// The text to scan.
    pub text: String,
    /// Shortest phrase to report, in words.
    pub min_word_count: Option<usize>,
    /// Longest phrase to report, in words.
    pub max_word_count: Option<usize>,
    /// Minimum occurrences for a phrase to be reported.
    pub min_occurrences: Option<usize>,
    /// How many ranked phrases to return. Zero or negative returns none.
    pub max_results: Option<i64>,
    /// Whether to strip markdown formatting before analysis.
    #[serde(default)]
    pub strip_markdown: bool,
}

/// Parameters for the `locate_sequence` tool.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LocateSequenceParams {
    /// The text to search.
    pub text: String,
    /// The phrase to find. Matching is literal and case-insensitive.
    pub sequence: String,
    /// Whether to strip markdown formatting before searching.
    #[serde(default)]
    pub strip_markdown: bool,
}

#[derive(Debug, Serialize)]
struct LocatedMatch<'a> {
    #[serde(flatten)]
    span: Span,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct LocateResponse<'a> {
    sequence: &'a str,
    total_matches: usize,
    selected: Option<Span>,
    matches: Vec<LocatedMatch<'a>>,
}

/// MCP server exposing repetition detection to AI assistants.
///
/// Tool defaults come from the [`Config`] the server was started with.
#[derive(Clone)]
pub struct ProjectServer {
    tool_router: rmcp::handler::server::router::tool::ToolRouter<Self>,
    config: Config,
}

impl Default for ProjectServer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

fn serialization_error(e: serde_json::Error) -> McpError {
    McpError::internal_error(format!("serialization error: {e}"), None)
}

#[tool_router]
impl ProjectServer {
    /// Create a server whose tools default to `config`.
    pub fn new(config: Config) -> Self {
        Self {
            tool_router: Self::tool_router(),
            config,
        }
    }

    fn check_input_size(&self, text: &str) -> Result<(), McpError> {
        match self.config.input_limit() {
            Some(max) if text.len() > max => Err(McpError::invalid_params(
                format!("input too large: {} bytes (limit: {max} bytes)", text.len()),
                None,
            )),
            _ => Ok(()),
        }
    }

    fn document(text: &str, strip_markdown: bool) -> Document {
        let format = if strip_markdown {
            InputFormat::Markdown
        } else {
            InputFormat::Text
        };
        Document::from_source(text, format)
    }

    /// Get project information.
    #[tool(description = "Get project name, version, and description")]
    #[tracing::instrument(skip(self), fields(otel.kind = "server"))]
    fn get_info(
        &self,
        Parameters(params): Parameters<GetInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(tool = "get_info", format = %params.format, "executing MCP tool");

        let info = serde_json::json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION"),
        });

        let text = if params.format == "json" {
            serde_json::to_string_pretty(&info).map_err(serialization_error)?
        } else {
            format!(
                "{} v{}\n{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION"),
                env!("CARGO_PKG_DESCRIPTION"),
            )
        };

        tracing::info!(tool = "get_info", "MCP tool completed");
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    /// List repeated phrases, longest and most frequent first.
    #[tool(
        description = "Find phrases of several words that repeat in a text. Returns ranked phrases with word counts and hit counts, longest and most frequent first."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn detect_repetitions(
        &self,
        Parameters(params): Parameters<DetectRepetitionsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "detect_repetitions",
            strip_md = params.strip_markdown,
            max_results = ?params.max_results,
            "executing MCP tool"
        );
        self.check_input_size(&params.text)?;

        let detection = DetectionParams::new(
            params.min_word_count.unwrap_or(self.config.min_word_count),
            params.max_word_count.unwrap_or(self.config.max_word_count),
            params.min_occurrences.unwrap_or(self.config.min_occurrences),
        );
        let max_results = params
            .max_results
            .unwrap_or_else(|| i64::try_from(self.config.max_results).unwrap_or(i64::MAX));

        let text = Self::document(&params.text, params.strip_markdown).raw_text();
        let records = detect_repetitions(&text, &detection);
        let shown = cap_results(&records, max_results).to_vec();
        let report = RepetitionReport {
            total: records.len(),
            shown: shown.len(),
            max_results: Some(usize::try_from(max_results.max(0)).unwrap_or(usize::MAX)),
            params: detection,
            records: shown,
        };

        let json = serde_json::to_string_pretty(&report).map_err(serialization_error)?;

        tracing::info!(
            tool = "detect_repetitions",
            total = report.total,
            shown = report.shown,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }

    /// Mark every occurrence of a phrase and select the first.
    #[tool(
        description = "Find every whole-word, case-insensitive occurrence of a phrase. Returns the match spans (paragraph and byte range), the selected first match, and the total."
    )]
    #[tracing::instrument(skip(self, params), fields(otel.kind = "server"))]
    fn locate_sequence(
        &self,
        Parameters(params): Parameters<LocateSequenceParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::debug!(
            tool = "locate_sequence",
            sequence = %params.sequence,
            strip_md = params.strip_markdown,
            "executing MCP tool"
        );
        self.check_input_size(&params.text)?;

        let mut document = Self::document(&params.text, params.strip_markdown);
        let outcome = locate(&params.sequence, &mut document).map_err(|e| match e {
            LocateError::EmptySequence => McpError::invalid_params(e.to_string(), None),
            LocateError::Source(_) => McpError::internal_error(e.to_string(), None),
        })?;

        let response = LocateResponse {
            sequence: &outcome.sequence,
            total_matches: outcome.matches.len(),
            selected: outcome.selected,
            matches: outcome
                .matches
                .iter()
                .map(|span| LocatedMatch {
                    span: *span,
                    text: document.slice(span).unwrap_or_default(),
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&response).map_err(serialization_error)?;

        tracing::info!(
            tool = "locate_sequence",
            matches = response.total_matches,
            "MCP tool completed"
        );
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl ServerHandler for ProjectServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: Default::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(format!(
                "{} MCP server. Use detect_repetitions to list repeated phrases, then locate_sequence to find where one occurs.",
                env!("CARGO_PKG_NAME"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    /// Extract text from the first content item in a `CallToolResult`.
    fn extract_text(result: &CallToolResult) -> Option<&str> {
        result.content.first().and_then(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
    }

    fn json_of(result: &CallToolResult) -> serde_json::Value {
        let text = extract_text(result).expect("should have text content");
        serde_json::from_str(text).expect("output should be valid JSON")
    }

    fn detect_params(text: &str) -> DetectRepetitionsParams {
        DetectRepetitionsParams {
            text: text.to_string(),
            min_word_count: None,
            max_word_count: None,
            min_occurrences: None,
            max_results: None,
            strip_markdown: false,
        }
    }

    #[test]
    fn server_info_has_correct_name() {
        let server = ProjectServer::default();
        let info = ServerHandler::get_info(&server);

        assert_eq!(info.server_info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.server_info.version, env!("CARGO_PKG_VERSION"));
        assert!(info.capabilities.tools.is_some());
    }

    #[test]
    fn server_has_instructions() {
        let server = ProjectServer::default();
        let info = ServerHandler::get_info(&server);

        let instructions = info.instructions.expect("server should have instructions");
        assert!(instructions.contains(env!("CARGO_PKG_NAME")));
    }

    #[test]
    fn get_info_tool_returns_text_by_default() {
        let server = ProjectServer::default();
        let params = Parameters(GetInfoParams {
            format: "text".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");
        assert!(!result.is_error.unwrap_or(false));

        let text = extract_text(&result).expect("should have text content");
        assert!(text.contains(env!("CARGO_PKG_NAME")));
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn get_info_tool_returns_json_when_requested() {
        let server = ProjectServer::default();
        let params = Parameters(GetInfoParams {
            format: "json".to_string(),
        });

        let result = server.get_info(params).expect("get_info should succeed");
        let json = json_of(&result);
        assert_eq!(json["name"], env!("CARGO_PKG_NAME"));
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn detect_repetitions_ranks_phrases() {
        let server = ProjectServer::default();
        let result = server
            .detect_repetitions(Parameters(detect_params(
                "the quick fox the quick fox the quick fox.",
            )))
            .expect("detect_repetitions should succeed");
        assert!(!result.is_error.unwrap_or(false));

        let json = json_of(&result);
        assert_eq!(json["records"][0]["sequence"], "the quick fox");
        assert_eq!(json["records"][0]["hits"], 3);
        assert_eq!(json["params"]["min_word_count"], 2);
    }

    #[test]
    fn detect_repetitions_clamps_negative_max_results() {
        let server = ProjectServer::default();
        let mut params = detect_params("the quick fox the quick fox the quick fox.");
        params.max_results = Some(-3);

        let result = server
            .detect_repetitions(Parameters(params))
            .expect("detect_repetitions should succeed");
        let json = json_of(&result);
        assert_eq!(json["shown"], 0);
        assert_eq!(json["max_results"], 0);
        assert!(json["total"].as_u64().unwrap() > 0);
        assert!(json["records"].as_array().unwrap().is_empty());
    }

    #[test]
    fn detect_repetitions_reports_requested_cap() {
        let server = ProjectServer::default();
        let mut params = detect_params("the quick fox the quick fox the quick fox.");
        params.max_results = Some(100);

        let result = server
            .detect_repetitions(Parameters(params))
            .expect("detect_repetitions should succeed");
        let json = json_of(&result);
        assert_eq!(json["max_results"], 100);
        assert_eq!(json["shown"], json["total"]);
    }

    #[test]
    fn detect_repetitions_uses_server_config_defaults() {
        let config = Config {
            max_results: 1,
            ..Config::default()
        };
        let server = ProjectServer::new(config);
        let result = server
            .detect_repetitions(Parameters(detect_params(
                "the quick fox the quick fox the quick fox.",
            )))
            .expect("detect_repetitions should succeed");
        assert_eq!(json_of(&result)["shown"], 1);
    }

    #[test]
    fn detect_repetitions_rejects_oversize_input() {
        let config = Config {
            max_input_bytes: Some(4),
            ..Config::default()
        };
        let server = ProjectServer::new(config);
        let err = server
            .detect_repetitions(Parameters(detect_params("far too long")))
            .unwrap_err();
        assert!(err.message.contains("input too large"));
    }

    #[test]
    fn locate_sequence_reports_spans() {
        let server = ProjectServer::default();
        let params = Parameters(LocateSequenceParams {
            text: "The quick fox ran.\n\nA quick fox hid.".to_string(),
            sequence: "quick fox".to_string(),
            strip_markdown: false,
        });

        let result = server
            .locate_sequence(params)
            .expect("locate_sequence should succeed");
        let json = json_of(&result);
        assert_eq!(json["total_matches"], 2);
        assert_eq!(json["selected"]["paragraph"], 0);
        assert_eq!(json["selected"]["start"], 4);
        assert_eq!(json["matches"][1]["paragraph"], 1);
        assert_eq!(json["matches"][1]["text"], "quick fox");
    }

    #[test]
    fn locate_sequence_without_match_succeeds() {
        let server = ProjectServer::default();
        let params = Parameters(LocateSequenceParams {
            text: "The quick fox ran.".to_string(),
            sequence: "zzz".to_string(),
            strip_markdown: false,
        });

        let result = server
            .locate_sequence(params)
            .expect("locate_sequence should succeed");
        let json = json_of(&result);
        assert_eq!(json["total_matches"], 0);
        assert!(json["selected"].is_null());
    }

    #[test]
    fn locate_sequence_rejects_empty_sequence() {
        let server = ProjectServer::default();
        let params = Parameters(LocateSequenceParams {
            text: "The quick fox ran.".to_string(),
            sequence: String::new(),
            strip_markdown: true,
        });
        assert!(server.locate_sequence(params).is_err());
    }
}
