//! Markdown and JSON rendering for tool responses.

use std::fmt;

use lectern_core::{Error, Result, SearchOutcome};
use lectern_router::{AttemptStatus, ClassifiedSearch, Classification};

/// Render a search as markdown.
///
/// The layout is a heading, a routing summary, one section per source with
/// results, then either a fallback note or the suggestion list when nothing
/// was found. Attempts that failed are listed so an outage never reads as an
/// empty search.
pub fn render_search(search: &ClassifiedSearch) -> String {
    SearchMarkdown(search).to_string()
}

struct SearchMarkdown<'a>(&'a ClassifiedSearch);

impl fmt::Display for SearchMarkdown<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let search = self.0;
        let intent = &search.intent;

        writeln!(f, "# Search: {}\n", search.query)?;
        writeln!(f, "**Mode:** {}", search.mode)?;
        writeln!(f, "**Content type:** {}", intent.content_type)?;
        writeln!(
            f,
            "**Routed to:** `{}` (confidence {:.2})",
            intent.primary_endpoint, intent.confidence
        )?;
        writeln!(f, "**Reasoning:** {}", intent.reasoning)?;
        if !intent.fallback_endpoints.is_empty() {
            let chain: Vec<String> = intent
                .fallback_endpoints
                .iter()
                .map(|e| format!("`{e}`"))
                .collect();
            writeln!(f, "**Fallbacks:** {}", chain.join(", "))?;
        }

        for source in &search.results_by_source {
            writeln!(
                f,
                "\n## {} (confidence {:.2})\n",
                source.endpoint, source.confidence
            )?;
            if let SearchOutcome::Results { records, total } = &source.outcome {
                for record in records {
                    write!(
                        f,
                        "- [{}]({})",
                        escape_link_text(&record.title),
                        escape_link_target(&record.locator)
                    )?;
                    match &record.snippet {
                        Some(snippet) => writeln!(f, ": {snippet}")?,
                        None => writeln!(f)?,
                    }
                }
                if *total > records.len() {
                    writeln!(f, "\n_Showing {} of {} matches._", records.len(), total)?;
                }
            }
        }

        if search.used_fallback() {
            writeln!(
                f,
                "\n> `{}` found nothing; results above come from a fallback endpoint.",
                intent.primary_endpoint
            )?;
        }

        let mut failures = search.attempts.iter().filter_map(|a| match &a.status {
            AttemptStatus::Failed { code, message } => Some((a.endpoint, code, message)),
            AttemptStatus::Found { .. } | AttemptStatus::Empty => None,
        });
        if let Some(first) = failures.next() {
            writeln!(f, "\n## Errors\n")?;
            for (endpoint, code, message) in std::iter::once(first).chain(failures) {
                writeln!(f, "- `{endpoint}` failed ({code}): {message}")?;
            }
        }

        if search.is_exhausted() {
            let tried: Vec<String> = search
                .attempts
                .iter()
                .map(|a| format!("`{}`", a.endpoint))
                .collect();
            writeln!(f, "\nNo results found. Tried: {}.", tried.join(", "))?;
            if !search.suggestions.is_empty() {
                writeln!(f, "\n## Suggestions\n")?;
                for suggestion in &search.suggestions {
                    writeln!(f, "- {suggestion}")?;
                }
            }
        }
        Ok(())
    }
}

/// Backslash-escape the brackets that would end a markdown link label.
fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Percent-encode the characters that would end a markdown link target.
fn escape_link_target(locator: &str) -> String {
    locator
        .replace('(', "%28")
        .replace(')', "%29")
        .replace(' ', "%20")
}

/// Render a classification as pretty JSON.
pub fn render_classification(classification: &Classification) -> Result<String> {
    serde_json::to_string_pretty(classification)
        .map_err(|e| Error::decode(format!("Failed to serialize classification: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lectern_client::StubExecutor;
    use lectern_core::{EndpointId, ResultRecord};
    use lectern_router::{ExecutorRegistry, Hints, Orchestrator, SearchMode, SearchOptions};
    use std::sync::Arc;

    fn orchestrator(stub: StubExecutor) -> Orchestrator {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        Orchestrator::new(ExecutorRegistry::with_default(Arc::new(stub)), today)
    }

    #[tokio::test]
    async fn test_render_results_with_snippets() {
        let stub = StubExecutor::new().with_outcome(
            EndpointId::ScriptureVerses,
            SearchOutcome::from_records(
                vec![
                    ResultRecord::new("Alma 32", "/scriptures/bofm/alma/32")
                        .with_snippet("faith is not to have a perfect knowledge"),
                    ResultRecord::new("Alma 33", "/scriptures/bofm/alma/33"),
                ],
                Some(12),
            ),
        );
        let search = orchestrator(stub)
            .classify_and_search("Alma 32:21", &SearchOptions::default())
            .await
            .unwrap();

        let text = render_search(&search);
        assert!(text.starts_with("# Search: Alma 32:21"));
        assert!(text.contains("**Routed to:** `scripture-verses` (confidence 0.90)"));
        assert!(text.contains(
            "- [Alma 32](/scriptures/bofm/alma/32): faith is not to have a perfect knowledge"
        ));
        assert!(text.contains("- [Alma 33](/scriptures/bofm/alma/33)\n"));
        assert!(text.contains("_Showing 2 of 12 matches._"));
        assert!(!text.contains("fallback endpoint"));
        assert!(!text.contains("Suggestions"));
    }

    #[tokio::test]
    async fn test_render_fallback_note() {
        let stub = StubExecutor::new()
            .with_results(EndpointId::Archive, vec![ResultRecord::new("Alma 32", "/alma/32")]);
        let search = orchestrator(stub)
            .classify_and_search("Alma 32:21", &SearchOptions::default())
            .await
            .unwrap();

        let text = render_search(&search);
        assert!(text.contains("## archive (confidence 0.7"));
        assert!(text.contains("`scripture-verses` found nothing"));
    }

    #[tokio::test]
    async fn test_render_comprehensive_with_primary_results() {
        let stub = StubExecutor::new()
            .with_results(EndpointId::Archive, vec![ResultRecord::new("A", "/a")])
            .with_results(EndpointId::ConferenceTalks, vec![ResultRecord::new("C", "/c")]);
        let options = SearchOptions::default().with_mode(SearchMode::Comprehensive);
        let search = orchestrator(stub)
            .classify_and_search("Russell M. Nelson faith", &options)
            .await
            .unwrap();

        let text = render_search(&search);
        assert!(text.contains("## archive (confidence 0.90)\n\n- [A](/a)"));
        assert!(text.contains("## conference-talks"));
        assert!(!text.contains("found nothing"));
    }

    #[tokio::test]
    async fn test_render_escapes_links() {
        let stub = StubExecutor::new().with_results(
            EndpointId::ScriptureVerses,
            vec![ResultRecord::new("Alma 32 [Faith]", "/alma/32 (study)")],
        );
        let search = orchestrator(stub)
            .classify_and_search("Alma 32:21", &SearchOptions::default())
            .await
            .unwrap();

        let text = render_search(&search);
        assert!(text.contains(r"- [Alma 32 \[Faith\]](/alma/32%20%28study%29)"));
    }

    #[test]
    fn test_escape_helpers() {
        assert_eq!(escape_link_text(r"a]b[c\d"), r"a\]b\[c\\d");
        assert_eq!(escape_link_target("/x(1)"), "/x%281%29");
        assert_eq!(escape_link_target("/plain/path"), "/plain/path");
    }

    #[tokio::test]
    async fn test_render_exhausted_with_errors_and_suggestions() {
        let stub = StubExecutor::new().with_failure(EndpointId::ScriptureVerses, "refused");
        let search = orchestrator(stub)
            .classify_and_search("Alma 32:21", &SearchOptions::default())
            .await
            .unwrap();

        let text = render_search(&search);
        assert!(text.contains("## Errors"));
        assert!(text.contains("`scripture-verses` failed (transport)"));
        assert!(text.contains("No results found. Tried: `scripture-verses`"));
        assert!(text.contains("## Suggestions"));
    }

    #[test]
    fn test_render_classification_json() {
        let classification =
            orchestrator(StubExecutor::new()).classify("Russell M. Nelson faith", &Hints::default());
        let json = render_classification(&classification).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["intent"]["primary_endpoint"], "archive");
        assert_eq!(value["analysis"]["has_speaker_terms"], true);
    }
}
