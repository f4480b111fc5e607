//! Search intelligence for Lectern.
//!
//! Given a free-text query, this crate decides which specialized search
//! endpoint is most likely to satisfy it, with what parameters, and what to
//! try next when it comes back empty.
//!
//! # Pipeline
//!
//! ```text
//! query ─► QueryAnalyzer ─► IntentResolver ─► Orchestrator ─► SearchExecutor(s)
//!           (analysis)        (intent)          PRIMARY → FALLBACK(i) → EXHAUSTED
//! ```
//!
//! The analyzer and resolver are pure: the only clock they see is the date
//! injected at construction. All I/O happens in the orchestrator, through
//! the executors held by an [`ExecutorRegistry`].

pub mod analyzer;
pub mod orchestrator;
pub mod params;
pub mod patterns;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod suggest;

pub use analyzer::{QueryAnalysis, QueryAnalyzer, RelativeDate, SuggestedFilters};
pub use orchestrator::{
    Attempt, AttemptStatus, ClassifiedSearch, Classification, MAX_COMPREHENSIVE_FANOUT,
    Orchestrator, OrchestratorSettings, SearchMode, SearchOptions, SourcedOutcome,
};
pub use params::{ParamMapper, author_slug};
pub use reference::{ScriptureReference, find_reference};
pub use registry::ExecutorRegistry;
pub use resolver::{Hints, IntentResolver, SearchIntent, fallback_chain};
pub use suggest::reformulation_suggestions;
