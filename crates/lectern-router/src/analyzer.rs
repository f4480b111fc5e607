//! Query analysis.
//!
//! [`QueryAnalyzer::analyze`] extracts every routing signal from a query in
//! one pass. It is pure and total: the empty string yields an analysis with
//! every flag cleared and an `unknown` content type.

use std::sync::LazyLock;

use lectern_core::{Collection, ContentType, ManualFamily, MediaKind, YearRange};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::patterns::{
    self, CONFERENCE_KEYWORDS, CONFERENCE_MONTHS, EARLIEST_YEAR, HANDBOOK_POLICY_KEYWORDS,
    MAGAZINE_KEYWORDS, MANUAL_KEYWORDS, RelativePhrase, contains_any,
};
use crate::reference::{self, ScriptureReference};

static YEAR_TOKEN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").ok());

/// A relative date term found in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeDate {
    /// `recent`, `latest`, `current`.
    Recent,
    /// `this year`.
    ThisYear,
    /// `last year`.
    LastYear,
}

impl RelativeDate {
    /// Years this term covers, relative to `current_year`.
    pub fn year_range(&self, current_year: i32) -> YearRange {
        match self {
            Self::Recent => YearRange::new(current_year - 2, current_year),
            Self::ThisYear => YearRange::single(current_year),
            Self::LastYear => YearRange::single(current_year - 1),
        }
    }
}

impl From<RelativePhrase> for RelativeDate {
    fn from(phrase: RelativePhrase) -> Self {
        match phrase {
            RelativePhrase::Recent => Self::Recent,
            RelativePhrase::ThisYear => Self::ThisYear,
            RelativePhrase::LastYear => Self::LastYear,
        }
    }
}

/// Filters suggested directly by the query text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFilters {
    /// First plausible four-digit year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Canonical full name of the matched speaker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

/// Routing signals extracted from a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Detected content category.
    pub content_type: ContentType,
    /// The raw query contains a double quote.
    pub has_quotes: bool,
    /// A year, relative date phrase or conference month is present.
    pub has_date_terms: bool,
    /// A roster speaker is mentioned.
    pub has_speaker_terms: bool,
    /// The query matches a scripture reference shape.
    pub has_scripture_references: bool,
    /// A book name, abbreviation or volume title is mentioned.
    pub has_book_names: bool,
    /// A conference keyword is present.
    pub has_conference_terms: bool,
    /// Filters lifted from the text.
    pub suggested_filters: SuggestedFilters,
    /// First matched scripture reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripture_reference: Option<ScriptureReference>,
    /// Volume of the reference, or of the earliest book name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,
    /// Relative date term.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_date: Option<RelativeDate>,
    /// Media subtype named in the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<MediaKind>,
    /// Manual family named in the query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_family: Option<ManualFamily>,
}

impl QueryAnalysis {
    /// Years named by the query: an explicit year wins over a relative term.
    pub fn year_range(&self, current_year: i32) -> Option<YearRange> {
        self.suggested_filters
            .year
            .map(YearRange::single)
            .or_else(|| self.relative_date.map(|d| d.year_range(current_year)))
    }
}

/// Extracts [`QueryAnalysis`] from query text.
#[derive(Debug, Clone, Copy)]
pub struct QueryAnalyzer {
    current_year: i32,
}

impl QueryAnalyzer {
    /// Create an analyzer that treats `current_year` as "now".
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    /// The year this analyzer considers current.
    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    /// Analyze `query`.
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        let normalized = patterns::normalize(query);

        let speaker = patterns::find_speaker(&normalized);
        let scripture_reference = reference::find_reference(query);
        let book_collection = patterns::find_collection(&normalized);
        let year = self.find_year(query);
        let relative_date = patterns::find_relative_date(&normalized).map(RelativeDate::from);
        let has_month = contains_any(&normalized, CONFERENCE_MONTHS);
        let has_conference_terms = contains_any(&normalized, CONFERENCE_KEYWORDS);
        let media_kind = patterns::find_media_kind(&normalized);
        let manual_family = patterns::find_manual_family(&normalized);

        let has_speaker_terms = speaker.is_some();
        let has_scripture_references = scripture_reference.is_some();
        let has_book_names = book_collection.is_some();

        let content_type = if has_speaker_terms || has_conference_terms {
            ContentType::Conference
        } else if has_book_names || has_scripture_references {
            ContentType::Scripture
        } else if contains_any(&normalized, MANUAL_KEYWORDS) {
            ContentType::Manual
        } else if media_kind.is_some() {
            ContentType::Media
        } else if contains_any(&normalized, MAGAZINE_KEYWORDS) {
            ContentType::Magazine
        } else if contains_any(&normalized, HANDBOOK_POLICY_KEYWORDS) {
            ContentType::Handbook
        } else {
            ContentType::Unknown
        };

        QueryAnalysis {
            content_type,
            has_quotes: query.contains('"'),
            has_date_terms: year.is_some() || relative_date.is_some() || has_month,
            has_speaker_terms,
            has_scripture_references,
            has_book_names,
            has_conference_terms,
            suggested_filters: SuggestedFilters {
                year,
                speaker: speaker.map(|s| s.name.to_string()),
            },
            collection: scripture_reference
                .as_ref()
                .map(|r| r.collection)
                .or(book_collection),
            scripture_reference,
            relative_date,
            media_kind,
            manual_family,
        }
    }

    fn find_year(&self, query: &str) -> Option<i32> {
        let pattern = YEAR_TOKEN.as_ref()?;
        pattern
            .captures_iter(query)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok())
            .find(|year| (EARLIEST_YEAR..=self.current_year).contains(year))
    }
}
