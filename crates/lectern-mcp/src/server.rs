//! The Lectern MCP server.

use std::sync::Arc;

use lectern_core::{ContentType, EndpointId, Error};
use lectern_router::{Hints, Orchestrator, SearchMode, SearchOptions};
use rmcp::{
    ErrorData as McpError, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, info};

use crate::render::{render_classification, render_search};

const INSTRUCTIONS: &str = "Searches a religious publisher's document library. \
Call classify_and_search with a natural-language query; it picks the best search \
endpoint (scripture verses, conference talks, the archive, manuals, media, magazines) \
and falls back to broader endpoints when nothing is found. Call analyze_query to see \
how a query would be routed without searching.";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a library error to an MCP error.
fn to_mcp_error(error: Error) -> McpError {
    if error.is_invalid_input() {
        McpError::invalid_params(error.to_string(), None)
    } else {
        McpError::internal_error(error.to_string(), None)
    }
}

/// Parse an optional string argument with `FromStr`.
fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>, McpError>
where
    T: std::str::FromStr<Err = Error>,
{
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(to_mcp_error))
        .transpose()
}

// ---------------------------------------------------------------------------
// Argument types
// ---------------------------------------------------------------------------

/// Arguments for the classify_and_search tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ClassifyAndSearchArgs {
    /// Natural-language search query.
    pub query: String,
    /// `smart` (default), `comprehensive` or `specific`.
    #[serde(default)]
    pub search_mode: Option<String>,
    /// Endpoint to use instead of the classifier's choice, e.g. `archive`,
    /// `scripture-verses` or `manual-filtered:come-follow-me`.
    #[serde(default)]
    pub force_endpoint: Option<String>,
    /// Content type to route as: scripture, conference, manual, media,
    /// magazine, handbook or unknown.
    #[serde(default)]
    pub content_hint: Option<String>,
    /// Maximum results per endpoint.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ClassifyAndSearchArgs {
    fn options(&self) -> Result<SearchOptions, McpError> {
        Ok(SearchOptions {
            mode: parse_opt::<SearchMode>(self.search_mode.as_deref())?.unwrap_or_default(),
            force_endpoint: parse_opt::<EndpointId>(self.force_endpoint.as_deref())?,
            content_hint: parse_opt::<ContentType>(self.content_hint.as_deref())?,
            limit: self.limit,
        })
    }
}

/// Arguments for the analyze_query tool.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct AnalyzeQueryArgs {
    /// Query to classify.
    pub query: String,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// MCP server routing queries through an [`Orchestrator`].
#[derive(Clone)]
pub struct LecternMcp {
    tool_router: ToolRouter<Self>,
    orchestrator: Arc<Orchestrator>,
}

#[tool_router]
impl LecternMcp {
    /// Create a server around `orchestrator`.
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            orchestrator,
        }
    }

    /// Names of the tools this server exposes.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect()
    }

    #[tool(
        description = "Classify a query, search the best-matching endpoint with fallbacks, \
                       and return the results as markdown"
    )]
    pub async fn classify_and_search(
        &self,
        Parameters(args): Parameters<ClassifyAndSearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let options = args.options()?;
        debug!(query = %args.query, mode = %options.mode, "classify_and_search");
        let search = self
            .orchestrator
            .classify_and_search(&args.query, &options)
            .await
            .map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(render_search(
            &search,
        ))]))
    }

    #[tool(description = "Show how a query would be routed (analysis and intent) without searching")]
    pub async fn analyze_query(
        &self,
        Parameters(args): Parameters<AnalyzeQueryArgs>,
    ) -> Result<CallToolResult, McpError> {
        if args.query.trim().is_empty() {
            return Err(to_mcp_error(Error::invalid_input("Query must not be empty")));
        }
        let classification = self.orchestrator.classify(&args.query, &Hints::default());
        let json = render_classification(&classification).map_err(to_mcp_error)?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_handler]
impl rmcp::ServerHandler for LecternMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "lectern".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

/// Serve `orchestrator` over stdin/stdout until the client disconnects.
pub async fn serve_stdio(orchestrator: Arc<Orchestrator>) -> Result<(), McpError> {
    let server = LecternMcp::new(orchestrator);
    info!(tools = ?server.tool_names(), "Starting MCP server on stdio");
    let running = server
        .serve(stdio())
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    running
        .waiting()
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    info!("MCP client disconnected");
    Ok(())
}
