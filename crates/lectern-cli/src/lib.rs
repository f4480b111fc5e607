//! Command-line interface for Lectern.
//!
//! - [`cli`]: clap argument types
//! - [`config`]: [`LecternConfig`] loading from file, environment and defaults
//! - [`config_handlers`]: `lectern config ...` subcommands
//! - [`app`]: logging setup, wiring, and command dispatch

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;

pub use app::{LecternApp, init_logging, run};
pub use cli::{CliArgs, Command, ConfigAction, SearchArgs};
pub use config::LecternConfig;
