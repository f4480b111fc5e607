//! The Lectern CLI application.
//!
//! Wires config into an [`HttpExecutor`] and an [`Orchestrator`], then
//! dispatches the parsed command.

use std::sync::Arc;

use chrono::Local;
use lectern_client::HttpExecutor;
use lectern_core::{ContentType, EndpointId, Error, Result};
use lectern_mcp::{render_classification, render_search, serve_stdio};
use lectern_router::{ExecutorRegistry, Hints, Orchestrator, SearchMode, SearchOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{CliArgs, Command, SearchArgs};
use crate::config::LecternConfig;
use crate::config_handlers;

/// Initialise tracing-based logging on stderr.
///
/// Uses `RUST_LOG` if set, otherwise defaults based on verbosity flags.
/// Stdout is left clean for command output and the MCP stdio channel.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Ignore error if a subscriber is already set (e.g. in tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

// ============================================================================
// LecternApp
// ============================================================================

/// The CLI application: config plus a ready orchestrator.
pub struct LecternApp {
    config: LecternConfig,
    executor: Arc<HttpExecutor>,
    orchestrator: Arc<Orchestrator>,
}

impl LecternApp {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        Self::new(LecternConfig::load(args.config.as_deref())?)
    }

    /// Build the executor and orchestrator described by `config`.
    pub fn new(config: LecternConfig) -> Result<Self> {
        config.validate()?;
        let executor = Arc::new(HttpExecutor::new(
            config.api.base_url.clone(),
            &config.api.user_agent,
            config.http_timeout(),
        )?);
        let registry = ExecutorRegistry::with_default(executor.clone());
        let orchestrator = Orchestrator::new(registry, Local::now().date_naive())
            .with_settings(config.orchestrator_settings());
        Ok(Self {
            config,
            executor,
            orchestrator: Arc::new(orchestrator),
        })
    }

    /// The loaded configuration.
    pub fn config(&self) -> &LecternConfig {
        &self.config
    }

    /// Run a command that needs the orchestrator.
    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Search(search) => println!("{}", self.search(&search).await?),
            Command::Classify { query, json } => println!("{}", self.classify(&query, json)?),
            Command::Serve => {
                info!(api = %self.config.api.base_url, "Serving MCP on stdio");
                serve_stdio(self.orchestrator.clone())
                    .await
                    .map_err(|e| Error::transport(format!("MCP server failed: {e}")))?;
            }
            Command::Health => println!("{}", self.health().await?),
            Command::Version => println!("{}", version_line()),
            Command::Config(_) => {
                return Err(Error::invalid_input(
                    "config commands are handled before the app is built",
                ));
            }
        }
        Ok(())
    }

    /// Classify and search; markdown or JSON.
    pub async fn search(&self, args: &SearchArgs) -> Result<String> {
        let options = search_options(args)?;
        let search = self
            .orchestrator
            .classify_and_search(&args.query, &options)
            .await?;
        if args.json {
            serde_json::to_string_pretty(&search)
                .map_err(|e| Error::decode(format!("Failed to serialize search: {e}")))
        } else {
            Ok(render_search(&search))
        }
    }

    /// Classify without searching; a short summary or JSON.
    pub fn classify(&self, query: &str, json: bool) -> Result<String> {
        if query.trim().is_empty() {
            return Err(Error::invalid_input("Query must not be empty"));
        }
        let classification = self.orchestrator.classify(query, &Hints::default());
        if json {
            return render_classification(&classification);
        }

        let intent = &classification.intent;
        let fallbacks: Vec<String> = intent
            .fallback_endpoints
            .iter()
            .map(ToString::to_string)
            .collect();
        Ok(format!(
            "content type: {}\nendpoint:     {}\nconfidence:   {:.2}\nfallbacks:    {}\nreasoning:    {}",
            intent.content_type,
            intent.primary_endpoint,
            intent.confidence,
            if fallbacks.is_empty() {
                "(none)".to_string()
            } else {
                fallbacks.join(", ")
            },
            intent.reasoning
        ))
    }

    /// Report whether the document API answers.
    pub async fn health(&self) -> Result<String> {
        let status = self.executor.health_check().await?;
        Ok(format!(
            "lectern: healthy (API at {} answered {status})",
            self.executor.base_url()
        ))
    }
}

/// `lectern <version>`.
pub fn version_line() -> String {
    format!("lectern {}", env!("CARGO_PKG_VERSION"))
}

/// Parse the string options of `lectern search`.
fn search_options(args: &SearchArgs) -> Result<SearchOptions> {
    Ok(SearchOptions {
        mode: args.mode.parse::<SearchMode>()?,
        force_endpoint: args
            .endpoint
            .as_deref()
            .map(str::parse::<EndpointId>)
            .transpose()?,
        content_hint: args
            .hint
            .as_deref()
            .map(str::parse::<ContentType>)
            .transpose()?,
        limit: args.limit,
    })
}

/// Entry point shared by `main`.
pub async fn run(args: CliArgs) -> Result<()> {
    init_logging(args.verbose, args.quiet);

    match args.command {
        Some(Command::Config(config_cmd)) => {
            config_handlers::handle_config_command(args.config.as_deref(), config_cmd.command)
        }
        Some(Command::Version) => {
            println!("{}", version_line());
            Ok(())
        }
        Some(command) => {
            LecternApp::new(LecternConfig::load(args.config.as_deref())?)?
                .run(command)
                .await
        }
        None => {
            println!("{}; use --help for usage", version_line());
            Ok(())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Parser;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app(base_url: &str) -> LecternApp {
        let mut config = LecternConfig::default();
        config.api.base_url = base_url.to_string();
        config.search.call_timeout_secs = 5;
        LecternApp::new(config).unwrap()
    }

    fn search_args(argv: &[&str]) -> SearchArgs {
        let mut full = vec!["lectern", "search"];
        full.extend_from_slice(argv);
        match CliArgs::parse_from(full).command {
            Some(Command::Search(search)) => search,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = LecternConfig::default();
        config.api.base_url = String::new();
        assert!(LecternApp::new(config).is_err());
    }

    #[test]
    fn test_settings_flow_from_config() {
        let mut config = LecternConfig::default();
        config.search.max_limit = 7;
        let app = LecternApp::new(config).unwrap();
        assert_eq!(app.orchestrator.settings().max_limit, 7);
        assert_eq!(app.config().search.max_limit, 7);
    }

    #[test]
    fn test_search_options_parsing() {
        let options = search_options(&search_args(&[
            "faith",
            "--mode",
            "comprehensive",
            "--endpoint",
            "archive",
            "--hint",
            "conference",
            "--limit",
            "4",
        ]))
        .unwrap();
        assert_eq!(options.mode, SearchMode::Comprehensive);
        assert_eq!(options.force_endpoint, Some(EndpointId::Archive));
        assert_eq!(options.content_hint, Some(ContentType::Conference));
        assert_eq!(options.limit, Some(4));

        let err = search_options(&search_args(&["faith", "--mode", "everything"])).unwrap_err();
        assert!(err.is_invalid_input());
        let err = search_options(&search_args(&["faith", "--endpoint", "nowhere"])).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_classify_summary() {
        let app = app("http://127.0.0.1:9");
        let out = app.classify("Alma 32:21", false).unwrap();
        assert!(out.contains("endpoint:     scripture-verses"));
        assert!(out.contains("confidence:   0.90"));
        assert!(out.contains("fallbacks:    archive"));

        let json: serde_json::Value =
            serde_json::from_str(&app.classify("Alma 32:21", true).unwrap()).unwrap();
        assert_eq!(json["analysis"]["has_scripture_references"], true);

        assert!(app.classify("  ", false).unwrap_err().is_invalid_input());
    }

    #[tokio::test]
    async fn test_search_against_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/scriptures"))
            .and(query_param("q", "Alma 32:21"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{"title": "Alma 32", "url": "/scriptures/bofm/alma/32"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let app = app(&server.uri());
        let out = app.search(&search_args(&["Alma 32:21"])).await.unwrap();
        assert!(out.contains("[Alma 32](/scriptures/bofm/alma/32)"));

        let out = app.search(&search_args(&["Alma 32:21", "--json"])).await;
        let json: serde_json::Value = serde_json::from_str(&out.unwrap()).unwrap();
        assert_eq!(json["results_by_source"][0]["endpoint"], "scripture-verses");
    }

    #[tokio::test]
    async fn test_search_api_down_is_exhausted_not_error() {
        let app = app("http://127.0.0.1:9");
        let out = app.search(&search_args(&["Alma 32:21"])).await.unwrap();
        assert!(out.contains("## Errors"));
        assert!(out.contains("No results found"));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        Mock::given(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let out = app(&server.uri()).health().await.unwrap();
        assert!(out.contains("healthy"));
        assert!(out.contains("200"));

        assert!(app("http://127.0.0.1:9").health().await.is_err());
    }

    #[tokio::test]
    async fn test_run_version_and_no_command() {
        assert!(run(CliArgs::parse_from(["lectern", "version"])).await.is_ok());
        assert!(run(CliArgs::parse_from(["lectern"])).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_config_path() {
        let args = CliArgs::parse_from(["lectern", "--config", "/tmp/lectern.toml", "config", "path"]);
        assert!(run(args).await.is_ok());
    }

    #[test]
    fn test_version_line() {
        assert!(version_line().starts_with("lectern "));
    }
}
