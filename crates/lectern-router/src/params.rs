//! Per-endpoint parameter mapping.
//!
//! The same function builds parameters for the primary endpoint and for
//! every fallback, so a fallback never inherits filters its schema does not
//! understand.

use chrono::{Datelike, NaiveDate};
use lectern_core::{ContentType, DateRange, EndpointId, SearchParams, SourceCategory};

use crate::analyzer::QueryAnalysis;

/// Months covered by an archive speaker search without explicit dates.
pub const SPEAKER_LOOKBACK_MONTHS: u32 = 12;

/// Builds [`SearchParams`] for an endpoint from a query analysis.
#[derive(Debug, Clone, Copy)]
pub struct ParamMapper {
    today: NaiveDate,
}

impl ParamMapper {
    /// Create a mapper that treats `today` as the current date.
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Parameters for `endpoint`, given the analysis and the effective
    /// content type.
    pub fn params_for(
        &self,
        endpoint: EndpointId,
        analysis: &QueryAnalysis,
        content_type: ContentType,
    ) -> SearchParams {
        match endpoint {
            EndpointId::ScriptureVerses => SearchParams {
                collection: analysis.collection,
                testament: analysis.collection.and_then(|c| c.testament()),
                ..Default::default()
            },
            EndpointId::Archive => self.archive_params(analysis, content_type),
            EndpointId::ConferenceTalks => SearchParams {
                year_range: analysis.year_range(self.today.year()),
                speaker: analysis.suggested_filters.speaker.clone(),
                ..Default::default()
            },
            EndpointId::MagazineArticles => SearchParams {
                date_range: self.detected_date_range(analysis),
                ..Default::default()
            },
            EndpointId::ManualFiltered(family) => SearchParams {
                manual: Some(family),
                site_path: Some(family.site_path().to_string()),
                ..Default::default()
            },
            EndpointId::MediaFiltered(kind) => SearchParams {
                media: Some(kind),
                ..Default::default()
            },
            EndpointId::MultiType => SearchParams::default(),
        }
    }

    fn archive_params(&self, analysis: &QueryAnalysis, content_type: ContentType) -> SearchParams {
        let speaker = analysis.suggested_filters.speaker.as_deref();
        let source = match speaker {
            Some(_) => Some(SourceCategory::GeneralConference),
            None => SourceCategory::for_content_type(content_type),
        };
        let date_range = self.detected_date_range(analysis).or_else(|| {
            speaker.map(|_| DateRange::past_months(self.today, SPEAKER_LOOKBACK_MONTHS))
        });

        SearchParams {
            source: source.map(|s| s.id()),
            author: speaker.map(author_slug),
            date_range,
            ..Default::default()
        }
    }

    /// Date window implied by the query's year or relative date term,
    /// clamped so it never ends after today.
    fn detected_date_range(&self, analysis: &QueryAnalysis) -> Option<DateRange> {
        let years = analysis.year_range(self.today.year())?;
        let mut range = DateRange::from_year_range(years);
        if range.to > self.today {
            range.to = self.today;
        }
        Some(range)
    }
}

/// Author slug as used by the archive: lowercase, periods stripped, words
/// joined with hyphens.
///
/// ```
/// use lectern_router::params::author_slug;
///
/// assert_eq!(author_slug("Russell M. Nelson"), "russell-m-nelson");
/// ```
pub fn author_slug(name: &str) -> String {
    name.to_lowercase()
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
