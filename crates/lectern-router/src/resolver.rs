//! Intent resolution.
//!
//! [`IntentResolver::resolve`] runs a fixed cascade of routing rules over a
//! [`QueryAnalysis`]; the first rule that applies picks the primary endpoint,
//! its confidence and the fallback chain. A forced endpoint hint replaces the
//! primary but keeps the cascade's chain as fallbacks.

use chrono::NaiveDate;
use lectern_core::{ContentType, EndpointId, ManualFamily, MediaKind, SearchParams};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzer::QueryAnalysis;
use crate::params::ParamMapper;

// ============================================================================
// Calibration
// ============================================================================

/// A scripture reference shape or book name.
pub const SCRIPTURE_CONFIDENCE: f64 = 0.9;
/// A known speaker.
pub const SPEAKER_CONFIDENCE: f64 = 0.9;
/// Conference vocabulary without a speaker.
pub const CONFERENCE_CONFIDENCE: f64 = 0.85;
/// A named manual family.
pub const MANUAL_FAMILY_CONFIDENCE: f64 = 0.8;
/// Manual vocabulary without a family.
pub const MANUAL_CONFIDENCE: f64 = 0.7;
/// Media vocabulary.
pub const MEDIA_CONFIDENCE: f64 = 0.75;
/// Magazine vocabulary.
pub const MAGAZINE_CONFIDENCE: f64 = 0.7;
/// Nothing matched.
pub const DEFAULT_CONFIDENCE: f64 = 0.6;
/// The caller chose the endpoint.
pub const FORCED_CONFIDENCE: f64 = 1.0;
/// Confidence decay per fallback position.
pub const FALLBACK_DECAY: f64 = 0.85;

// ============================================================================
// Types
// ============================================================================

/// Caller-provided routing hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hints {
    /// Overrides the analyzed content type for the cascade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hint: Option<ContentType>,

    /// Replaces the primary endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_endpoint: Option<EndpointId>,
}

impl Hints {
    /// Hint a content type.
    pub fn with_content_hint(mut self, content_type: ContentType) -> Self {
        self.content_hint = Some(content_type);
        self
    }

    /// Force an endpoint.
    pub fn with_force_endpoint(mut self, endpoint: EndpointId) -> Self {
        self.force_endpoint = Some(endpoint);
        self
    }
}

/// A routing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIntent {
    /// Endpoint to try first.
    pub primary_endpoint: EndpointId,
    /// Confidence in the primary, in `[0, 1]`.
    pub confidence: f64,
    /// Parameters for the primary.
    pub suggested_params: SearchParams,
    /// Endpoints to try, in order, when the primary comes back empty.
    pub fallback_endpoints: Vec<EndpointId>,
    /// Content type the cascade ran with.
    pub content_type: ContentType,
    /// Human-readable explanation.
    pub reasoning: String,
}

impl SearchIntent {
    /// Confidence attached to results from `endpoint`.
    ///
    /// The primary gets [`confidence`](Self::confidence); fallback `i` gets
    /// `confidence × 0.85^(i+1)`; anything else gets zero.
    pub fn confidence_for(&self, endpoint: EndpointId) -> f64 {
        if endpoint == self.primary_endpoint {
            return self.confidence;
        }
        self.fallback_endpoints
            .iter()
            .position(|e| *e == endpoint)
            .map_or(0.0, |i| {
                self.confidence * FALLBACK_DECAY.powi(i as i32 + 1)
            })
    }

    /// Primary followed by every fallback.
    pub fn endpoint_chain(&self) -> Vec<EndpointId> {
        std::iter::once(self.primary_endpoint)
            .chain(self.fallback_endpoints.iter().copied())
            .collect()
    }
}

/// Ordered, duplicate-free fallback list that never contains `primary`.
pub fn fallback_chain(
    primary: EndpointId,
    candidates: impl IntoIterator<Item = EndpointId>,
) -> Vec<EndpointId> {
    let mut chain = Vec::new();
    for endpoint in candidates {
        if endpoint != primary && !chain.contains(&endpoint) {
            chain.push(endpoint);
        }
    }
    chain
}

// ============================================================================
// Resolver
// ============================================================================

/// Maps a query analysis to a [`SearchIntent`].
#[derive(Debug, Clone, Copy)]
pub struct IntentResolver {
    mapper: ParamMapper,
}

impl IntentResolver {
    /// Create a resolver that treats `today` as the current date.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mapper: ParamMapper::new(today),
        }
    }

    /// The parameter mapper used for primaries and fallbacks.
    pub fn mapper(&self) -> &ParamMapper {
        &self.mapper
    }

    /// Resolve a routing decision for `query`.
    pub fn resolve(&self, query: &str, analysis: &QueryAnalysis, hints: &Hints) -> SearchIntent {
        let content_type = hints.content_hint.unwrap_or(analysis.content_type);
        let intent = self.cascade(analysis, content_type);

        let intent = match hints.force_endpoint {
            Some(forced) => SearchIntent {
                primary_endpoint: forced,
                confidence: FORCED_CONFIDENCE,
                suggested_params: self.mapper.params_for(forced, analysis, content_type),
                fallback_endpoints: fallback_chain(forced, intent.endpoint_chain()),
                content_type,
                reasoning: format!(
                    "Endpoint {forced} forced by caller (classifier suggested {})",
                    intent.primary_endpoint
                ),
            },
            None => intent,
        };

        debug!(
            query,
            primary = %intent.primary_endpoint,
            confidence = intent.confidence,
            fallbacks = intent.fallback_endpoints.len(),
            "Resolved search intent"
        );
        intent
    }

    fn cascade(&self, analysis: &QueryAnalysis, content_type: ContentType) -> SearchIntent {
        let speaker = analysis.suggested_filters.speaker.as_deref();

        // Scripture: a reference shape always wins; book names only without a speaker.
        if analysis.has_scripture_references
            || (speaker.is_none()
                && (content_type == ContentType::Scripture || analysis.has_book_names))
        {
            let reasoning = match &analysis.scripture_reference {
                Some(reference) => format!("Scripture reference {reference}"),
                None => match analysis.collection {
                    Some(collection) => format!("Mentions {collection}"),
                    None => "Scripture content".to_string(),
                },
            };
            return self.intent(
                EndpointId::ScriptureVerses,
                SCRIPTURE_CONFIDENCE,
                [EndpointId::Archive],
                analysis,
                content_type,
                reasoning,
            );
        }

        // Conference
        if content_type == ContentType::Conference
            || analysis.has_speaker_terms
            || (analysis.has_date_terms && analysis.has_conference_terms)
        {
            return match speaker {
                Some(name) => self.intent(
                    EndpointId::Archive,
                    SPEAKER_CONFIDENCE,
                    [EndpointId::ConferenceTalks, EndpointId::MultiType],
                    analysis,
                    content_type,
                    format!("Known speaker {name}; archive search by author"),
                ),
                None => self.intent(
                    EndpointId::ConferenceTalks,
                    CONFERENCE_CONFIDENCE,
                    [EndpointId::Archive, EndpointId::MultiType],
                    analysis,
                    content_type,
                    "Conference vocabulary".to_string(),
                ),
            };
        }

        // Manuals and handbooks
        if matches!(content_type, ContentType::Manual | ContentType::Handbook) {
            let family = analysis.manual_family.or(match content_type {
                ContentType::Handbook => Some(ManualFamily::GeneralHandbook),
                _ => None,
            });
            let (endpoint, confidence, reasoning) = match family {
                Some(family) => (
                    EndpointId::ManualFiltered(family),
                    MANUAL_FAMILY_CONFIDENCE,
                    format!("Names the {} manual family", family.slug()),
                ),
                None => (
                    EndpointId::ManualFiltered(ManualFamily::Manuals),
                    MANUAL_CONFIDENCE,
                    "Manual vocabulary; searching all manuals".to_string(),
                ),
            };
            return self.intent(
                endpoint,
                confidence,
                [EndpointId::Archive, EndpointId::MultiType],
                analysis,
                content_type,
                reasoning,
            );
        }

        if content_type == ContentType::Media {
            let kind = analysis.media_kind.unwrap_or(MediaKind::Video);
            return self.intent(
                EndpointId::MediaFiltered(kind),
                MEDIA_CONFIDENCE,
                [EndpointId::Archive],
                analysis,
                content_type,
                format!("Media vocabulary ({})", kind.slug()),
            );
        }

        if content_type == ContentType::Magazine {
            return self.intent(
                EndpointId::MagazineArticles,
                MAGAZINE_CONFIDENCE,
                [EndpointId::Archive],
                analysis,
                content_type,
                "Magazine vocabulary".to_string(),
            );
        }

        self.intent(
            EndpointId::Archive,
            DEFAULT_CONFIDENCE,
            [EndpointId::MultiType],
            analysis,
            content_type,
            format!("No strong signal ({content_type}); general archive search"),
        )
    }

    fn intent<const N: usize>(
        &self,
        primary: EndpointId,
        confidence: f64,
        fallbacks: [EndpointId; N],
        analysis: &QueryAnalysis,
        content_type: ContentType,
        reasoning: String,
    ) -> SearchIntent {
        SearchIntent {
            primary_endpoint: primary,
            confidence,
            suggested_params: self.mapper.params_for(primary, analysis, content_type),
            fallback_endpoints: fallback_chain(primary, fallbacks),
            content_type,
            reasoning,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::analyzer::QueryAnalyzer;
    use lectern_core::Collection;

    fn resolve_with(query: &str, hints: Hints) -> SearchIntent {
        let analysis = QueryAnalyzer::new(2025).analyze(query);
        IntentResolver::new(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
            .resolve(query, &analysis, &hints)
    }

    fn resolve(query: &str) -> SearchIntent {
        resolve_with(query, Hints::default())
    }

    #[test]
    fn test_speaker_routes_to_archive() {
        let intent = resolve("Russell M. Nelson faith");
        assert_eq!(intent.primary_endpoint, EndpointId::Archive);
        assert_eq!(intent.confidence, SPEAKER_CONFIDENCE);
        assert_eq!(
            intent.suggested_params.author.as_deref(),
            Some("russell-m-nelson")
        );
        assert_eq!(
            intent.fallback_endpoints,
            vec![EndpointId::ConferenceTalks, EndpointId::MultiType]
        );
    }

    #[test]
    fn test_reference_routes_to_scripture() {
        let intent = resolve("Alma 32:21");
        assert_eq!(intent.primary_endpoint, EndpointId::ScriptureVerses);
        assert_eq!(intent.confidence, SCRIPTURE_CONFIDENCE);
        assert_eq!(
            intent.suggested_params.collection,
            Some(Collection::BookOfMormon)
        );
        assert_eq!(intent.fallback_endpoints, vec![EndpointId::Archive]);
    }

    #[test]
    fn test_reference_outranks_speaker() {
        let intent = resolve("Elder Holland on Ether 12:27");
        assert_eq!(intent.primary_endpoint, EndpointId::ScriptureVerses);
    }

    #[test]
    fn test_speaker_outranks_book_name() {
        let intent = resolve("Ezra Taft Benson pride");
        assert_eq!(intent.primary_endpoint, EndpointId::Archive);
        assert_eq!(
            intent.suggested_params.author.as_deref(),
            Some("ezra-taft-benson")
        );
    }

    #[test]
    fn test_conference_without_speaker() {
        let intent = resolve("october conference 2019");
        assert_eq!(intent.primary_endpoint, EndpointId::ConferenceTalks);
        assert_eq!(intent.confidence, CONFERENCE_CONFIDENCE);
        assert_eq!(
            intent.suggested_params.year_range,
            Some(lectern_core::YearRange::single(2019))
        );
        assert_eq!(
            intent.fallback_endpoints,
            vec![EndpointId::Archive, EndpointId::MultiType]
        );
    }

    #[test]
    fn test_manual_families() {
        let intent = resolve("come follow me lesson 5");
        assert_eq!(
            intent.primary_endpoint,
            EndpointId::ManualFiltered(ManualFamily::ComeFollowMe)
        );
        assert_eq!(intent.confidence, MANUAL_FAMILY_CONFIDENCE);

        let intent = resolve("gospel principles lesson");
        assert_eq!(
            intent.primary_endpoint,
            EndpointId::ManualFiltered(ManualFamily::Manuals)
        );
        assert_eq!(intent.confidence, MANUAL_CONFIDENCE);

        let intent = resolve("missionary policy");
        assert_eq!(
            intent.primary_endpoint,
            EndpointId::ManualFiltered(ManualFamily::GeneralHandbook)
        );
    }

    #[test]
    fn test_media_and_magazine() {
        let intent = resolve("hymns audio");
        assert_eq!(
            intent.primary_endpoint,
            EndpointId::MediaFiltered(MediaKind::Music)
        );
        assert_eq!(intent.confidence, MEDIA_CONFIDENCE);

        let intent = resolve("liahona");
        assert_eq!(intent.primary_endpoint, EndpointId::MagazineArticles);
        assert_eq!(intent.fallback_endpoints, vec![EndpointId::Archive]);
    }

    #[test]
    fn test_default_route() {
        let intent = resolve("faith and hope");
        assert_eq!(intent.primary_endpoint, EndpointId::Archive);
        assert_eq!(intent.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(intent.suggested_params.source, None);
        assert_eq!(intent.fallback_endpoints, vec![EndpointId::MultiType]);
    }

    #[test]
    fn test_content_hint_overrides_analysis() {
        let hints = Hints::default().with_content_hint(ContentType::Magazine);
        let intent = resolve_with("faith and hope", hints);
        assert_eq!(intent.primary_endpoint, EndpointId::MagazineArticles);
        assert_eq!(intent.content_type, ContentType::Magazine);
    }

    #[test]
    fn test_forced_endpoint() {
        let hints = Hints::default().with_force_endpoint(EndpointId::ConferenceTalks);
        let intent = resolve_with("Russell M. Nelson faith", hints);
        assert_eq!(intent.primary_endpoint, EndpointId::ConferenceTalks);
        assert_eq!(intent.confidence, FORCED_CONFIDENCE);
        assert_eq!(
            intent.fallback_endpoints,
            vec![EndpointId::Archive, EndpointId::MultiType]
        );
        assert_eq!(intent.suggested_params.author, None);
        assert_eq!(
            intent.suggested_params.speaker.as_deref(),
            Some("Russell M. Nelson")
        );
    }

    #[test]
    fn test_confidence_for_decays() {
        let intent = resolve("faith and hope");
        assert_eq!(intent.confidence_for(EndpointId::Archive), 0.6);
        let fallback = intent.confidence_for(EndpointId::MultiType);
        assert!((fallback - 0.6 * 0.85).abs() < 1e-9);
        assert_eq!(intent.confidence_for(EndpointId::ScriptureVerses), 0.0);
    }

    #[test]
    fn test_fallback_chain_dedups() {
        let chain = fallback_chain(
            EndpointId::Archive,
            [
                EndpointId::MultiType,
                EndpointId::Archive,
                EndpointId::MultiType,
                EndpointId::ConferenceTalks,
            ],
        );
        assert_eq!(chain, vec![EndpointId::MultiType, EndpointId::ConferenceTalks]);
    }
}
