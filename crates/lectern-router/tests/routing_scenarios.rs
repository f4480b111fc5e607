//! End-to-end routing scenarios against stub executors.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::NaiveDate;
use lectern_client::StubExecutor;
use lectern_core::{Collection, EndpointId, ManualFamily, ResultRecord};
use lectern_router::{ExecutorRegistry, Orchestrator, SearchMode, SearchOptions};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

fn records(prefix: &str) -> Vec<ResultRecord> {
    vec![
        ResultRecord::new(format!("{prefix} one"), format!("/{prefix}/1")),
        ResultRecord::new(format!("{prefix} two"), format!("/{prefix}/2")),
    ]
}

#[tokio::test]
async fn speaker_query_routes_to_archive_by_author() {
    let stub = Arc::new(StubExecutor::new().with_results(EndpointId::Archive, records("nelson")));
    let orchestrator = Orchestrator::new(ExecutorRegistry::with_default(stub.clone()), today());

    let search = orchestrator
        .classify_and_search("Russell M. Nelson faith", &SearchOptions::default())
        .await
        .unwrap();

    assert_eq!(search.intent.primary_endpoint, EndpointId::Archive);
    assert_eq!(search.intent.confidence, 0.9);
    assert_eq!(
        search.intent.suggested_params.author.as_deref(),
        Some("russell-m-nelson")
    );
    assert_eq!(search.results_by_source[0].endpoint, EndpointId::Archive);
    assert_eq!(stub.call_count().await, 1);
}

#[tokio::test]
async fn verse_reference_routes_to_scripture_search() {
    let stub = Arc::new(StubExecutor::new());
    let orchestrator = Orchestrator::new(ExecutorRegistry::with_default(stub.clone()), today());

    let search = orchestrator
        .classify_and_search("Alma 32:21", &SearchOptions::default())
        .await
        .unwrap();

    assert!(search.analysis.has_scripture_references);
    assert_eq!(search.intent.primary_endpoint, EndpointId::ScriptureVerses);
    assert_eq!(
        search.intent.suggested_params.collection,
        Some(Collection::BookOfMormon)
    );
}

#[test]
fn reference_shapes_all_route_to_scripture() {
    let orchestrator = Orchestrator::new(ExecutorRegistry::new(), today());
    for query in ["Alma 32:21", "1 Nephi 3", "D&C 76"] {
        let classification = orchestrator.classify(query, &Default::default());
        assert!(
            classification.analysis.has_scripture_references,
            "{query} should match a reference shape"
        );
        assert_eq!(
            classification.intent.primary_endpoint,
            EndpointId::ScriptureVerses,
            "{query}"
        );
    }
}

#[test]
fn come_follow_me_routes_to_manual_family() {
    let orchestrator = Orchestrator::new(ExecutorRegistry::new(), today());
    let classification = orchestrator.classify("come follow me lesson 5", &Default::default());
    assert_eq!(
        classification.intent.primary_endpoint,
        EndpointId::ManualFiltered(ManualFamily::ComeFollowMe)
    );
    assert_eq!(classification.intent.confidence, 0.8);
}

#[tokio::test]
async fn empty_query_never_reaches_an_executor() {
    let stub = Arc::new(StubExecutor::new());
    let orchestrator = Orchestrator::new(ExecutorRegistry::with_default(stub.clone()), today());

    for query in ["", " \t\n"] {
        let err = orchestrator
            .classify_and_search(query, &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_invalid_input());
    }
    assert_eq!(stub.call_count().await, 0);
}

#[tokio::test]
async fn fallback_progression_stops_at_last_fallback() {
    // Primary and first fallback empty, second fallback finds records.
    let archive = Arc::new(StubExecutor::new().named("archive"));
    let conference = Arc::new(StubExecutor::new().named("conference"));
    let multi = Arc::new(
        StubExecutor::new()
            .named("multi")
            .with_results(EndpointId::MultiType, records("multi")),
    );
    let registry = ExecutorRegistry::new()
        .with(EndpointId::Archive, archive.clone())
        .with(EndpointId::ConferenceTalks, conference.clone())
        .with(EndpointId::MultiType, multi.clone());
    let orchestrator = Orchestrator::new(registry, today());

    let search = orchestrator
        .classify_and_search("Russell M. Nelson faith", &SearchOptions::default())
        .await
        .unwrap();

    let fallbacks = search.intent.fallback_endpoints.len();
    assert_eq!(fallbacks, 2);
    assert_eq!(search.attempts.len(), fallbacks + 1);
    assert_eq!(
        search.attempts.iter().map(|a| a.endpoint).collect::<Vec<_>>(),
        vec![
            EndpointId::Archive,
            EndpointId::ConferenceTalks,
            EndpointId::MultiType
        ]
    );
    assert_eq!(archive.call_count().await, 1);
    assert_eq!(conference.call_count().await, 1);
    assert_eq!(multi.call_count().await, 1);

    assert_eq!(search.results_by_source.len(), 1);
    let source = &search.results_by_source[0];
    assert_eq!(source.endpoint, EndpointId::MultiType);
    assert!(source.fallback);
    assert_eq!(source.outcome.records()[0].title, "multi one");
    assert!(search.suggestions.is_empty());
}

#[tokio::test]
async fn comprehensive_mode_merges_every_source() {
    let stub = Arc::new(
        StubExecutor::new()
            .with_results(EndpointId::Archive, records("archive"))
            .with_results(EndpointId::ConferenceTalks, records("conference"))
            .with_results(EndpointId::MultiType, records("multi")),
    );
    let orchestrator = Orchestrator::new(ExecutorRegistry::with_default(stub.clone()), today());
    let options = SearchOptions::default().with_mode(SearchMode::Comprehensive);

    let search = orchestrator
        .classify_and_search("Russell M. Nelson faith", &options)
        .await
        .unwrap();

    let sources: Vec<_> = search.results_by_source.iter().map(|s| s.endpoint).collect();
    assert_eq!(
        sources,
        vec![
            EndpointId::Archive,
            EndpointId::ConferenceTalks,
            EndpointId::MultiType
        ]
    );
    for source in &search.results_by_source {
        assert_eq!(source.confidence, search.intent.confidence_for(source.endpoint));
        let prefix = source.outcome.records()[0].locator.split('/').nth(1).unwrap();
        assert_eq!(
            prefix,
            match source.endpoint {
                EndpointId::Archive => "archive",
                EndpointId::ConferenceTalks => "conference",
                _ => "multi",
            }
        );
    }
    assert_eq!(search.record_count(), 6);
    assert_eq!(stub.call_count().await, 3);
}

#[tokio::test]
async fn comprehensive_mode_respects_fanout() {
    let stub = Arc::new(StubExecutor::new());
    let orchestrator = Orchestrator::new(ExecutorRegistry::with_default(stub.clone()), today())
        .with_settings(lectern_router::OrchestratorSettings {
            comprehensive_fanout: 1,
            ..Default::default()
        });
    let options = SearchOptions::default().with_mode(SearchMode::Comprehensive);

    let search = orchestrator
        .classify_and_search("Russell M. Nelson faith", &options)
        .await
        .unwrap();
    assert_eq!(search.attempts.len(), 2);
    assert!(search.is_exhausted());
    assert!(!search.suggestions.is_empty());
}

#[tokio::test]
async fn forced_endpoint_keeps_cascade_as_fallbacks() {
    let stub = Arc::new(StubExecutor::new());
    let orchestrator = Orchestrator::new(ExecutorRegistry::with_default(stub.clone()), today());
    let options = SearchOptions::default().with_force_endpoint(EndpointId::MultiType);

    let search = orchestrator
        .classify_and_search("Alma 32:21", &options)
        .await
        .unwrap();
    assert_eq!(search.intent.confidence, 1.0);
    assert_eq!(
        stub.called_endpoints().await,
        vec![
            EndpointId::MultiType,
            EndpointId::ScriptureVerses,
            EndpointId::Archive
        ]
    );
}
