//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Route natural-language queries to the right document search endpoint.
#[derive(Parser, Debug)]
#[command(name = "lectern", author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a query and search the document API.
    Search(SearchArgs),

    /// Show how a query would be routed, without searching.
    Classify {
        /// Query text.
        query: String,

        /// Print JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Start the MCP server on stdin/stdout.
    Serve,

    /// Print version information.
    Version,

    /// Check that the document API is reachable.
    Health,

    /// Configuration operations.
    Config(ConfigCommand),
}

/// Arguments for `lectern search`.
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Query text.
    pub query: String,

    /// Search mode: smart, comprehensive or specific.
    #[arg(short, long, default_value = "smart")]
    pub mode: String,

    /// Endpoint to use instead of the classifier's choice.
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Content type to route as.
    #[arg(long)]
    pub hint: Option<String>,

    /// Maximum results per endpoint.
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print JSON instead of markdown.
    #[arg(long)]
    pub json: bool,
}

/// Config-specific subcommands.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    /// Config subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigAction,
}

/// Available config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Get a configuration value by dotted key.
    Get {
        /// Dotted key (e.g., "search.max_limit").
        key: String,
    },

    /// Set a configuration value by dotted key.
    Set {
        /// Dotted key (e.g., "api.base_url").
        key: String,

        /// Value to set.
        value: String,
    },

    /// Create a default configuration file.
    Init {
        /// Output file path (defaults to XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Overwrite existing file.
        #[arg(long)]
        force: bool,
    },

    /// Export configuration as environment variables.
    Export {
        /// Format as Docker --env flags.
        #[arg(long)]
        docker_env: bool,
    },
}

// ============================================================================
// Tests
// ============================================================================
