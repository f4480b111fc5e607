//! Shared types, traits and errors for Lectern.
//!
//! This crate provides the vocabulary every other Lectern crate speaks.
//! It has no internal Lectern dependencies.
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`types`]: Endpoint ids, content types, and the search parameter bag
//! - [`outcome`]: The uniform result contract returned by every endpoint
//! - [`traits`]: The [`SearchExecutor`] extension point

pub mod error;
pub mod outcome;
pub mod traits;
pub mod types;

// Re-export key types at crate root for convenience
pub use error::{Error, Result};
pub use outcome::{ResultRecord, SearchOutcome};
pub use traits::{EndpointRequest, SearchExecutor};
pub use types::{
    Collection, ContentType, DateRange, EndpointId, ManualFamily, MediaKind, SearchParams,
    SourceCategory, Testament, YearRange,
};
