//! MCP tool layer for Lectern.
//!
//! [`LecternMcp`] is an rmcp server with two tools:
//!
//! - `classify_and_search`: route a query, search, and render the results
//!   as markdown.
//! - `analyze_query`: show the routing decision for a query as JSON without
//!   searching.

pub mod render;
pub mod server;

pub use render::{render_classification, render_search};
pub use server::{LecternMcp, serve_stdio};
