//! Stub executor for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lectern_core::{
    EndpointId, EndpointRequest, Error, Result, ResultRecord, SearchExecutor, SearchOutcome,
};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
enum Canned {
    Outcome(SearchOutcome),
    Failure(String),
}

/// Executor that returns canned outcomes and records every request.
///
/// Endpoints without a canned response answer [`SearchOutcome::NoResults`].
/// Clones share the same call log.
///
/// # Examples
///
/// ```
/// use lectern_client::StubExecutor;
/// use lectern_core::{EndpointId, ResultRecord};
///
/// let stub = StubExecutor::new()
///     .with_results(EndpointId::Archive, vec![ResultRecord::new("Faith", "/faith")])
///     .with_failure(EndpointId::MultiType, "connection refused");
/// ```
#[derive(Debug, Clone)]
pub struct StubExecutor {
    name: String,
    canned: HashMap<EndpointId, Canned>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<EndpointRequest>>>,
}

impl Default for StubExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl StubExecutor {
    /// Creates a stub that finds nothing anywhere.
    pub fn new() -> Self {
        Self {
            name: "stub".to_string(),
            canned: HashMap::new(),
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Sets the name reported in logs.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Answers `endpoint` with `outcome`.
    pub fn with_outcome(mut self, endpoint: EndpointId, outcome: SearchOutcome) -> Self {
        self.canned.insert(endpoint, Canned::Outcome(outcome));
        self
    }

    /// Answers `endpoint` with `records`.
    pub fn with_results(self, endpoint: EndpointId, records: Vec<ResultRecord>) -> Self {
        self.with_outcome(endpoint, SearchOutcome::from_records(records, None))
    }

    /// Fails every call to `endpoint` with a transport error.
    pub fn with_failure(mut self, endpoint: EndpointId, message: impl Into<String>) -> Self {
        self.canned.insert(endpoint, Canned::Failure(message.into()));
        self
    }

    /// Sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every request received so far, in arrival order.
    pub async fn calls(&self) -> Vec<EndpointRequest> {
        self.calls.lock().await.clone()
    }

    /// Number of requests received.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Endpoints called, in arrival order.
    pub async fn called_endpoints(&self) -> Vec<EndpointId> {
        self.calls.lock().await.iter().map(|r| r.endpoint).collect()
    }
}

#[async_trait]
impl SearchExecutor for StubExecutor {
    async fn execute(&self, request: &EndpointRequest) -> Result<SearchOutcome> {
        self.calls.lock().await.push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.canned.get(&request.endpoint) {
            Some(Canned::Outcome(outcome)) => Ok(outcome.clone()),
            Some(Canned::Failure(message)) => Err(Error::transport(message.clone())),
            None => Ok(SearchOutcome::NoResults),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_endpoint_finds_nothing() {
        let stub = StubExecutor::new();
        let request = EndpointRequest::new(EndpointId::Archive, "faith");
        assert_eq!(stub.execute(&request).await.unwrap(), SearchOutcome::NoResults);
    }

    #[tokio::test]
    async fn test_canned_results_and_failures() {
        let stub = StubExecutor::new()
            .with_results(EndpointId::Archive, vec![ResultRecord::new("Faith", "/faith")])
            .with_failure(EndpointId::MultiType, "boom");

        let found = stub
            .execute(&EndpointRequest::new(EndpointId::Archive, "faith"))
            .await
            .unwrap();
        assert_eq!(found.records()[0].title, "Faith");

        let err = stub
            .execute(&EndpointRequest::new(EndpointId::MultiType, "faith"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "transport");
    }

    #[tokio::test]
    async fn test_calls_are_recorded_across_clones() {
        let stub = StubExecutor::new();
        let clone = stub.clone();
        clone
            .execute(&EndpointRequest::new(EndpointId::ScriptureVerses, "Alma 32").with_limit(3))
            .await
            .unwrap();
        stub.execute(&EndpointRequest::new(EndpointId::Archive, "Alma 32"))
            .await
            .unwrap();

        assert_eq!(stub.call_count().await, 2);
        assert_eq!(
            stub.called_endpoints().await,
            vec![EndpointId::ScriptureVerses, EndpointId::Archive]
        );
        assert_eq!(stub.calls().await[0].limit, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay() {
        let stub = StubExecutor::new().with_delay(Duration::from_secs(10));
        let started = tokio::time::Instant::now();
        stub.execute(&EndpointRequest::new(EndpointId::Archive, "x"))
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_secs(10));
    }

    #[test]
    fn test_name() {
        assert_eq!(StubExecutor::new().name(), "stub");
        assert_eq!(StubExecutor::new().named("archive").name(), "archive");
    }
}
