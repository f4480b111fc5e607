//! Endpoint → executor dispatch table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use lectern_core::{EndpointId, Error, Result, SearchExecutor};

/// Maps each [`EndpointId`] to the executor that serves it.
///
/// Endpoints without an explicit entry go to the default executor, when one
/// is set.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    executors: HashMap<EndpointId, Arc<dyn SearchExecutor>>,
    default: Option<Arc<dyn SearchExecutor>>,
}

impl ExecutorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that sends every endpoint to `executor`.
    pub fn with_default(executor: Arc<dyn SearchExecutor>) -> Self {
        Self {
            executors: HashMap::new(),
            default: Some(executor),
        }
    }

    /// Register `executor` for `endpoint`, replacing any previous entry.
    pub fn register(&mut self, endpoint: EndpointId, executor: Arc<dyn SearchExecutor>) {
        self.executors.insert(endpoint, executor);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, endpoint: EndpointId, executor: Arc<dyn SearchExecutor>) -> Self {
        self.register(endpoint, executor);
        self
    }

    /// Executor for `endpoint`.
    pub fn get(&self, endpoint: EndpointId) -> Result<Arc<dyn SearchExecutor>> {
        self.executors
            .get(&endpoint)
            .or(self.default.as_ref())
            .cloned()
            .ok_or(Error::NotRegistered(endpoint))
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut endpoints: Vec<String> = self.executors.keys().map(|e| e.to_string()).collect();
        endpoints.sort();
        f.debug_struct("ExecutorRegistry")
            .field("endpoints", &endpoints)
            .field("default", &self.default.as_ref().map(|e| e.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lectern_client::StubExecutor;

    #[test]
    fn test_empty_registry_reports_not_registered() {
        let registry = ExecutorRegistry::new();
        let err = registry.get(EndpointId::Archive).err().unwrap();
        assert_eq!(err.code(), "not_registered");
    }

    #[test]
    fn test_specific_entry_wins_over_default() {
        let fallback = Arc::new(StubExecutor::new().named("default"));
        let archive = Arc::new(StubExecutor::new().named("archive"));
        let registry =
            ExecutorRegistry::with_default(fallback).with(EndpointId::Archive, archive);

        assert_eq!(registry.get(EndpointId::Archive).unwrap().name(), "archive");
        assert_eq!(registry.get(EndpointId::MultiType).unwrap().name(), "default");
        assert_eq!(registry.get(EndpointId::ScriptureVerses).unwrap().name(), "default");
    }

    #[test]
    fn test_debug_lists_endpoints() {
        let registry = ExecutorRegistry::new()
            .with(EndpointId::MultiType, Arc::new(StubExecutor::new()))
            .with(EndpointId::Archive, Arc::new(StubExecutor::new()));
        let rendered = format!("{registry:?}");
        assert!(rendered.contains("archive"));
        assert!(rendered.contains("multi-type"));
    }
}
