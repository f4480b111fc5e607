//! Search orchestration.
//!
//! The orchestrator classifies a query and then walks the intent's endpoint
//! chain:
//!
//! ```text
//! PRIMARY ──empty/error──► FALLBACK(0) ──► FALLBACK(1) ──► … ──► EXHAUSTED
//!    │                         │               │
//!    └──────── results ────────┴───────────────┴──► done
//! ```
//!
//! Executor failures never escape as errors: they are recorded as failed
//! [`Attempt`]s and the walk moves on. Only invalid input is returned as
//! `Err`, and always before any executor is called.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use futures::future::join_all;
use lectern_core::{
    ContentType, EndpointId, EndpointRequest, Error, Result, SearchOutcome, SearchParams,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analyzer::{QueryAnalysis, QueryAnalyzer};
use crate::registry::ExecutorRegistry;
use crate::resolver::{Hints, IntentResolver, SearchIntent};
use crate::suggest::reformulation_suggestions;

/// Most fallbacks comprehensive mode calls alongside the primary.
pub const MAX_COMPREHENSIVE_FANOUT: usize = 2;

// ============================================================================
// Modes and options
// ============================================================================

/// How many endpoints a search may touch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Primary, then fallbacks one at a time until something is found.
    #[default]
    Smart,
    /// Primary and the first fallbacks concurrently; merge everything found.
    Comprehensive,
    /// Exactly the forced endpoint.
    Specific,
}

impl SearchMode {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::Comprehensive => "comprehensive",
            Self::Specific => "specific",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "smart" => Ok(Self::Smart),
            "comprehensive" => Ok(Self::Comprehensive),
            "specific" => Ok(Self::Specific),
            _ => Err(Error::invalid_input(format!(
                "Unknown search mode: {s} (expected smart, comprehensive or specific)"
            ))),
        }
    }
}

/// Per-call options for [`Orchestrator::classify_and_search`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Search mode.
    #[serde(default)]
    pub mode: SearchMode,
    /// Endpoint to use instead of the classifier's choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_endpoint: Option<EndpointId>,
    /// Content type to route as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hint: Option<ContentType>,
    /// Maximum records per endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchOptions {
    /// Set the mode.
    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    /// Force an endpoint.
    pub fn with_force_endpoint(mut self, endpoint: EndpointId) -> Self {
        self.force_endpoint = Some(endpoint);
        self
    }

    /// Hint a content type.
    pub fn with_content_hint(mut self, content_type: ContentType) -> Self {
        self.content_hint = Some(content_type);
        self
    }

    /// Set the per-endpoint record limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Routing hints carried by these options.
    pub fn hints(&self) -> Hints {
        Hints {
            content_hint: self.content_hint,
            force_endpoint: self.force_endpoint,
        }
    }
}

/// Limits applied to every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Records requested when the caller gives no limit.
    pub default_limit: usize,
    /// Upper bound on any requested limit.
    pub max_limit: usize,
    /// Bound on each executor call; `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
    /// Fallbacks run alongside the primary in comprehensive mode, capped at
    /// [`MAX_COMPREHENSIVE_FANOUT`].
    pub comprehensive_fanout: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 50,
            call_timeout: Some(Duration::from_secs(30)),
            comprehensive_fanout: 2,
        }
    }
}

// ============================================================================
// Results
// ============================================================================

/// What happened when one endpoint was called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptStatus {
    /// Records came back.
    Found {
        /// Records returned.
        count: usize,
    },
    /// The endpoint answered with nothing.
    Empty,
    /// The call failed.
    Failed {
        /// Stable error code.
        code: String,
        /// Error message.
        message: String,
    },
}

impl From<&SearchOutcome> for AttemptStatus {
    fn from(outcome: &SearchOutcome) -> Self {
        match outcome {
            SearchOutcome::Results { records, .. } if !records.is_empty() => Self::Found {
                count: records.len(),
            },
            SearchOutcome::Results { .. } | SearchOutcome::NoResults => Self::Empty,
            SearchOutcome::Error { message, code } => Self::Failed {
                code: code.clone(),
                message: message.clone(),
            },
        }
    }
}

/// One executor call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Endpoint called.
    pub endpoint: EndpointId,
    /// Whether the endpoint came from the fallback chain.
    pub fallback: bool,
    /// Result of the call.
    #[serde(flatten)]
    pub status: AttemptStatus,
}

/// A nonempty outcome tagged with where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcedOutcome {
    /// Endpoint that produced the records.
    pub endpoint: EndpointId,
    /// Confidence attached to this endpoint by the intent.
    pub confidence: f64,
    /// Whether the endpoint came from the fallback chain.
    pub fallback: bool,
    /// The records.
    pub outcome: SearchOutcome,
}

/// Everything [`Orchestrator::classify_and_search`] learned about a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedSearch {
    /// The query as given.
    pub query: String,
    /// Mode the search ran in.
    pub mode: SearchMode,
    /// Routing signals.
    pub analysis: QueryAnalysis,
    /// Routing decision.
    pub intent: SearchIntent,
    /// Nonempty outcomes, in chain order.
    pub results_by_source: Vec<SourcedOutcome>,
    /// Every executor call, in chain order.
    pub attempts: Vec<Attempt>,
    /// Reformulation hints; only filled when nothing was found.
    pub suggestions: Vec<String>,
}

impl ClassifiedSearch {
    /// True when no endpoint returned records.
    pub fn is_exhausted(&self) -> bool {
        self.results_by_source.is_empty()
    }

    /// True when records were found but the primary endpoint contributed none.
    pub fn used_fallback(&self) -> bool {
        !self.results_by_source.is_empty() && self.results_by_source.iter().all(|s| s.fallback)
    }

    /// Records across all sources.
    pub fn record_count(&self) -> usize {
        self.results_by_source
            .iter()
            .map(|s| s.outcome.records().len())
            .sum()
    }
}

/// Analysis and intent for a query, without searching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// The query as given.
    pub query: String,
    /// Routing signals.
    pub analysis: QueryAnalysis,
    /// Routing decision.
    pub intent: SearchIntent,
}

// ============================================================================
// Orchestrator
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Primary,
    Fallback(usize),
    Exhausted,
}

impl Step {
    fn advance(self, fallbacks: usize) -> Self {
        let next = match self {
            Self::Primary => 0,
            Self::Fallback(i) => i + 1,
            Self::Exhausted => return Self::Exhausted,
        };
        if next < fallbacks {
            Self::Fallback(next)
        } else {
            Self::Exhausted
        }
    }
}

/// Classifies queries and runs them against the registered executors.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    analyzer: QueryAnalyzer,
    resolver: IntentResolver,
    registry: ExecutorRegistry,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    /// Create an orchestrator that treats `today` as the current date.
    pub fn new(registry: ExecutorRegistry, today: NaiveDate) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(today.year()),
            resolver: IntentResolver::new(today),
            registry,
            settings: OrchestratorSettings::default(),
        }
    }

    /// Replace the default limits.
    pub fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Current limits.
    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Analyze and resolve `query` without calling any executor.
    pub fn classify(&self, query: &str, hints: &Hints) -> Classification {
        let analysis = self.analyzer.analyze(query);
        let intent = self.resolver.resolve(query, &analysis, hints);
        Classification {
            query: query.to_string(),
            analysis,
            intent,
        }
    }

    /// Classify `query` and search according to `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty query, or for specific
    /// mode without a forced endpoint. Executor failures are recorded in
    /// [`ClassifiedSearch::attempts`] instead.
    pub async fn classify_and_search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<ClassifiedSearch> {
        if query.trim().is_empty() {
            return Err(Error::invalid_input("Query must not be empty"));
        }
        if options.mode == SearchMode::Specific && options.force_endpoint.is_none() {
            return Err(Error::invalid_input(
                "Specific mode requires a forced endpoint",
            ));
        }

        let Classification {
            query,
            analysis,
            intent,
        } = self.classify(query, &options.hints());
        let limit = options
            .limit
            .unwrap_or(self.settings.default_limit)
            .clamp(1, self.settings.max_limit.max(1));

        let (results_by_source, attempts) = match options.mode {
            SearchMode::Smart => self.run_chain(&query, &analysis, &intent, limit, true).await,
            SearchMode::Specific => self.run_chain(&query, &analysis, &intent, limit, false).await,
            SearchMode::Comprehensive => {
                self.run_concurrent(&query, &analysis, &intent, limit).await
            }
        };

        let suggestions = if results_by_source.is_empty() {
            reformulation_suggestions(&analysis)
        } else {
            Vec::new()
        };

        info!(
            query = %query,
            mode = %options.mode,
            primary = %intent.primary_endpoint,
            attempts = attempts.len(),
            sources = results_by_source.len(),
            exhausted = results_by_source.is_empty(),
            "Search complete"
        );

        Ok(ClassifiedSearch {
            query,
            mode: options.mode,
            analysis,
            intent,
            results_by_source,
            attempts,
            suggestions,
        })
    }

    /// Walk primary then fallbacks, stopping at the first nonempty outcome.
    async fn run_chain(
        &self,
        query: &str,
        analysis: &QueryAnalysis,
        intent: &SearchIntent,
        limit: usize,
        with_fallbacks: bool,
    ) -> (Vec<SourcedOutcome>, Vec<Attempt>) {
        let fallbacks = if with_fallbacks {
            intent.fallback_endpoints.len()
        } else {
            0
        };
        let mut attempts = Vec::new();
        let mut step = Step::Primary;

        loop {
            let (endpoint, fallback) = match step {
                Step::Primary => (intent.primary_endpoint, false),
                Step::Fallback(i) => (intent.fallback_endpoints[i], true),
                Step::Exhausted => break,
            };

            let params = self.params_for(endpoint, fallback, analysis, intent);
            let outcome = self.call(endpoint, params, query, limit).await;
            attempts.push(Attempt {
                endpoint,
                fallback,
                status: AttemptStatus::from(&outcome),
            });

            if outcome.has_results() {
                let sourced = SourcedOutcome {
                    endpoint,
                    confidence: intent.confidence_for(endpoint),
                    fallback,
                    outcome,
                };
                return (vec![sourced], attempts);
            }
            step = step.advance(fallbacks);
        }

        debug!(query, attempts = attempts.len(), "Endpoint chain exhausted");
        (Vec::new(), attempts)
    }

    /// Call the primary and the first fallbacks concurrently and keep every
    /// nonempty outcome.
    async fn run_concurrent(
        &self,
        query: &str,
        analysis: &QueryAnalysis,
        intent: &SearchIntent,
        limit: usize,
    ) -> (Vec<SourcedOutcome>, Vec<Attempt>) {
        let endpoints: Vec<(EndpointId, bool)> = std::iter::once((intent.primary_endpoint, false))
            .chain(
                intent
                    .fallback_endpoints
                    .iter()
                    .take(self.settings.comprehensive_fanout.min(MAX_COMPREHENSIVE_FANOUT))
                    .map(|e| (*e, true)),
            )
            .collect();

        let calls = endpoints.iter().map(|&(endpoint, fallback)| {
            let params = self.params_for(endpoint, fallback, analysis, intent);
            async move {
                let outcome = self.call(endpoint, params, query, limit).await;
                (endpoint, fallback, outcome)
            }
        });

        let mut results = Vec::new();
        let mut attempts = Vec::new();
        for (endpoint, fallback, outcome) in join_all(calls).await {
            attempts.push(Attempt {
                endpoint,
                fallback,
                status: AttemptStatus::from(&outcome),
            });
            if outcome.has_results() {
                results.push(SourcedOutcome {
                    endpoint,
                    confidence: intent.confidence_for(endpoint),
                    fallback,
                    outcome,
                });
            }
        }
        (results, attempts)
    }

    fn params_for(
        &self,
        endpoint: EndpointId,
        fallback: bool,
        analysis: &QueryAnalysis,
        intent: &SearchIntent,
    ) -> SearchParams {
        if fallback {
            self.resolver
                .mapper()
                .params_for(endpoint, analysis, intent.content_type)
        } else {
            intent.suggested_params.clone()
        }
    }

    /// One bounded executor call; every failure is folded into the outcome.
    async fn call(
        &self,
        endpoint: EndpointId,
        params: SearchParams,
        query: &str,
        limit: usize,
    ) -> SearchOutcome {
        let executor = match self.registry.get(endpoint) {
            Ok(executor) => executor,
            Err(err) => {
                warn!(endpoint = %endpoint, error = %err, "No executor for endpoint");
                return SearchOutcome::from_error(&err);
            }
        };

        let request = EndpointRequest::new(endpoint, query)
            .with_params(params)
            .with_limit(limit);
        debug!(
            endpoint = %endpoint,
            executor = executor.name(),
            limit,
            "Calling endpoint"
        );

        let result = match self.settings.call_timeout {
            Some(bound) => tokio::time::timeout(bound, executor.execute(&request))
                .await
                .unwrap_or_else(|_| Err(Error::Timeout(bound))),
            None => executor.execute(&request).await,
        };

        match result {
            Ok(outcome) => {
                debug!(
                    endpoint = %endpoint,
                    records = outcome.records().len(),
                    "Endpoint answered"
                );
                outcome
            }
            Err(err) => {
                warn!(endpoint = %endpoint, code = err.code(), error = %err, "Endpoint call failed");
                SearchOutcome::from_error(&err)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
