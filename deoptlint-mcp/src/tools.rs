//! MCP tool implementations.
//!
//! Every tool returns the same JSON the CLI prints with `--format json`, or
//! the fix outcome for `fix_code`.

use deoptlint::analyzer::DeoptLint;
use deoptlint::commands::fix_source;
use deoptlint::config::Config;
use rmcp::{
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use std::path::{Path, PathBuf};

/// Request parameters for the `analyze_path` tool.
#[derive(Debug, serde::Deserialize, JsonSchema)]
pub struct AnalyzePathRequest {
    /// Path to the JavaScript file or directory to analyze.
    #[schemars(description = "Path to the JavaScript file or directory to analyze")]
    pub path: String,
}

/// Request parameters for the `analyze_code` and `fix_code` tools.
#[derive(Debug, serde::Deserialize, JsonSchema)]
pub struct CodeRequest {
    /// The JavaScript source.
    #[schemars(description = "The JavaScript source to analyze")]
    pub code: String,
    /// Virtual filename for the code (default: "snippet.js").
    #[schemars(description = "Virtual filename for the code snippet")]
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_filename() -> String {
    "snippet.js".to_owned()
}

fn json_result<T: serde::Serialize>(value: &T) -> CallToolResult {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "Serialization error: {e}"}}"#));
    CallToolResult::success(vec![Content::text(json)])
}

/// The MCP server for deoptlint.
#[derive(Debug, Clone)]
pub struct DeoptLintServer {
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

impl DeoptLintServer {
    /// Creates a new server instance.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }
}

impl Default for DeoptLintServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
#[allow(clippy::unused_self, clippy::unnecessary_wraps)]
impl DeoptLintServer {
    /// Analyze JavaScript files under a path.
    ///
    /// # Errors
    ///
    /// Never fails at the protocol level; problems are reported as tool errors.
    #[tool(
        description = "Find object literals that define functions under computed keys in a \
        JavaScript file or directory. Such properties push V8 objects into slow dictionary \
        mode. Returns JSON findings with line/column and, when safe, a fix."
    )]
    pub fn analyze_path(
        &self,
        params: Parameters<AnalyzePathRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let path_buf = PathBuf::from(&req.path);

        if !path_buf.exists() {
            return Ok(CallToolResult::error(vec![Content::text(format!(
                "Path does not exist: {}",
                req.path
            ))]));
        }

        let mut analyzer = DeoptLint::new(Config::load_from_path(&path_buf));
        match analyzer.analyze_paths(&[path_buf]) {
            Ok(result) => Ok(json_result(&result)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Analysis error: {e:#}"
            ))])),
        }
    }

    /// Analyze a JavaScript snippet.
    ///
    /// # Errors
    ///
    /// Never fails at the protocol level.
    #[tool(
        description = "Analyze a JavaScript snippet for object literals with computed-key \
        inline functions. Returns JSON findings; parse failures appear under parse_errors."
    )]
    pub fn analyze_code(&self, params: Parameters<CodeRequest>) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let result = DeoptLint::default().analyze_code(&req.code, PathBuf::from(&req.filename));
        Ok(json_result(&result))
    }

    /// Rewrite a JavaScript snippet with every applicable fix.
    ///
    /// # Errors
    ///
    /// Never fails at the protocol level; unparsable input is a tool error.
    #[tool(
        description = "Rewrite a JavaScript snippet so functions under computed keys are \
        assigned after the object literal (`obj[key] = function...;`). Returns the fixed \
        source, the number of fixes applied and the findings that could not be fixed."
    )]
    pub fn fix_code(&self, params: Parameters<CodeRequest>) -> Result<CallToolResult, McpError> {
        let req = params.0;
        match fix_source(&DeoptLint::default(), &req.code, Path::new(&req.filename)) {
            Ok(outcome) => Ok(json_result(&outcome)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(format!(
                "Fix error: {e:#}"
            ))])),
        }
    }
}

#[rmcp::tool_handler]
impl ServerHandler for DeoptLintServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "deoptlint finds JavaScript object literals whose properties pair a computed \
                 key with an inline function, and moves those functions out of the literal.\n\n\
                 TOOLS:\n\
                 • analyze_path - lint files or directories\n\
                 • analyze_code - lint a snippet\n\
                 • fix_code - return a snippet with fixes applied"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
