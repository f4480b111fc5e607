//! The executor extension point.
//!
//! Each specialized search backend is reached through a [`SearchExecutor`].
//! Lectern's router only ever talks to this trait, so HTTP clients, stubs,
//! and anything else can be swapped without touching routing code.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::outcome::SearchOutcome;
use crate::types::{EndpointId, SearchParams};
use crate::Result;

/// One normalized call to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRequest {
    /// Target endpoint.
    pub endpoint: EndpointId,
    /// Free-text query as the user typed it.
    pub query: String,
    /// Parameters built for this endpoint's schema.
    pub params: SearchParams,
    /// Maximum records to return.
    pub limit: usize,
}

impl EndpointRequest {
    /// Create a request with no parameters and a limit of 10.
    pub fn new(endpoint: EndpointId, query: impl Into<String>) -> Self {
        Self {
            endpoint,
            query: query.into(),
            params: SearchParams::default(),
            limit: 10,
        }
    }

    /// Set the parameter bag.
    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    /// Set the result limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A callable search backend.
///
/// Implementations must return [`SearchOutcome::NoResults`] for an ordinary
/// empty search and reserve `Err` for transport or protocol failures.
///
/// # Example
///
/// ```rust,ignore
/// struct Fixed;
///
/// #[async_trait]
/// impl SearchExecutor for Fixed {
///     async fn execute(&self, request: &EndpointRequest) -> Result<SearchOutcome> {
///         Ok(SearchOutcome::NoResults)
///     }
/// }
/// ```
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Run one search against `request.endpoint`.
    async fn execute(&self, request: &EndpointRequest) -> Result<SearchOutcome>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "executor"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::outcome::ResultRecord;

    struct EchoExecutor;

    #[async_trait]
    impl SearchExecutor for EchoExecutor {
        async fn execute(&self, request: &EndpointRequest) -> Result<SearchOutcome> {
            Ok(SearchOutcome::from_records(
                vec![ResultRecord::new(request.query.clone(), request.endpoint.to_string())],
                None,
            ))
        }
    }

    #[test]
    fn test_endpoint_request_builder() {
        let request = EndpointRequest::new(EndpointId::Archive, "faith")
            .with_limit(25)
            .with_params(SearchParams {
                source: Some(1),
                ..Default::default()
            });
        assert_eq!(request.limit, 25);
        assert_eq!(request.params.source, Some(1));
        assert_eq!(request.query, "faith");
    }

    #[tokio::test]
    async fn test_executor_trait_object() {
        let executor: Box<dyn SearchExecutor> = Box::new(EchoExecutor);
        let outcome = executor
            .execute(&EndpointRequest::new(EndpointId::MultiType, "hope"))
            .await
            .unwrap();
        assert_eq!(outcome.records()[0].locator, "multi-type");
        assert_eq!(executor.name(), "executor");
    }

    #[test]
    fn test_executor_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EchoExecutor>();
    }
}
