//! Routing vocabulary shared across Lectern crates.
//!
//! The endpoint set is closed: [`EndpointId`] is an enum, so adding or
//! removing a backend is a compile-time change everywhere it is matched.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// Content types
// ============================================================================

/// Coarse content category detected in (or hinted for) a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// General conference talks and addresses.
    Conference,
    /// Scripture text.
    Scripture,
    /// Lesson manuals and study guides.
    Manual,
    /// Church magazines.
    Magazine,
    /// Video, music, images, PDFs.
    Media,
    /// Policy handbooks.
    Handbook,
    /// Deliberately broad; search everything.
    Mixed,
    /// No recognizable signal.
    Unknown,
}

impl ContentType {
    /// All tags, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Conference,
        Self::Scripture,
        Self::Manual,
        Self::Magazine,
        Self::Media,
        Self::Handbook,
        Self::Mixed,
        Self::Unknown,
    ];

    /// Lowercase tag as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conference => "conference",
            Self::Scripture => "scripture",
            Self::Manual => "manual",
            Self::Magazine => "magazine",
            Self::Media => "media",
            Self::Handbook => "handbook",
            Self::Mixed => "mixed",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|ct| ct.as_str() == wanted)
            .ok_or_else(|| Error::invalid_input(format!("Unknown content type: {s}")))
    }
}

// ============================================================================
// Endpoint variants
// ============================================================================

/// Manual families with a dedicated filtered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManualFamily {
    /// The weekly home-study curriculum.
    ComeFollowMe,
    /// The General Handbook of policy.
    GeneralHandbook,
    /// Any manual; text search scoped to the manuals directory.
    Manuals,
}

impl ManualFamily {
    /// All families.
    pub const ALL: [Self; 3] = [Self::ComeFollowMe, Self::GeneralHandbook, Self::Manuals];

    /// Kebab-case identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::ComeFollowMe => "come-follow-me",
            Self::GeneralHandbook => "general-handbook",
            Self::Manuals => "manuals",
        }
    }

    /// Site directory the search is restricted to.
    pub fn site_path(&self) -> &'static str {
        match self {
            Self::ComeFollowMe => "/study/manual/come-follow-me",
            Self::GeneralHandbook => "/study/manual/general-handbook",
            Self::Manuals => "/study/manual",
        }
    }
}

/// Media subtypes with a dedicated filtered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Video.
    Video,
    /// Music and audio recordings.
    Music,
    /// Images and artwork.
    Image,
    /// PDF documents.
    Pdf,
}

impl MediaKind {
    /// All subtypes.
    pub const ALL: [Self; 4] = [Self::Video, Self::Music, Self::Image, Self::Pdf];

    /// Lowercase identifier.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Music => "music",
            Self::Image => "image",
            Self::Pdf => "pdf",
        }
    }
}

// ============================================================================
// EndpointId
// ============================================================================

/// The closed set of search backends Lectern can route to.
///
/// Rendered as `conference-talks`, `scripture-verses`, `archive`,
/// `multi-type`, `magazine-articles`, `manual-filtered:<family>` and
/// `media-filtered:<kind>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EndpointId {
    /// Dedicated general conference talk search (year-range filter).
    ConferenceTalks,
    /// Verse-level scripture search (collection filter).
    ScriptureVerses,
    /// General archive search (source id, author, date range).
    Archive,
    /// Generic search across all content types.
    MultiType,
    /// Magazine article search (date range).
    MagazineArticles,
    /// Manual search for one family.
    ManualFiltered(ManualFamily),
    /// Media search for one subtype.
    MediaFiltered(MediaKind),
}

impl EndpointId {
    /// Every endpoint id, variants expanded.
    pub fn all() -> Vec<Self> {
        let mut ids = vec![
            Self::ConferenceTalks,
            Self::ScriptureVerses,
            Self::Archive,
            Self::MultiType,
            Self::MagazineArticles,
        ];
        ids.extend(ManualFamily::ALL.into_iter().map(Self::ManualFiltered));
        ids.extend(MediaKind::ALL.into_iter().map(Self::MediaFiltered));
        ids
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConferenceTalks => f.write_str("conference-talks"),
            Self::ScriptureVerses => f.write_str("scripture-verses"),
            Self::Archive => f.write_str("archive"),
            Self::MultiType => f.write_str("multi-type"),
            Self::MagazineArticles => f.write_str("magazine-articles"),
            Self::ManualFiltered(family) => write!(f, "manual-filtered:{}", family.slug()),
            Self::MediaFiltered(kind) => write!(f, "media-filtered:{}", kind.slug()),
        }
    }
}

impl FromStr for EndpointId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        let (base, variant) = match normalized.split_once(':') {
            Some((base, variant)) => (base, Some(variant)),
            None => (normalized.as_str(), None),
        };
        let unknown = || Error::invalid_input(format!("Unknown endpoint: {s}"));

        match (base, variant) {
            ("conference-talks", None) => Ok(Self::ConferenceTalks),
            ("scripture-verses", None) => Ok(Self::ScriptureVerses),
            ("archive", None) => Ok(Self::Archive),
            ("multi-type", None) => Ok(Self::MultiType),
            ("magazine-articles", None) => Ok(Self::MagazineArticles),
            ("manual-filtered", None) => Ok(Self::ManualFiltered(ManualFamily::Manuals)),
            ("manual-filtered", Some(v)) => ManualFamily::ALL
                .into_iter()
                .find(|family| family.slug() == v)
                .map(Self::ManualFiltered)
                .ok_or_else(unknown),
            ("media-filtered", Some(v)) => MediaKind::ALL
                .into_iter()
                .find(|kind| kind.slug() == v)
                .map(Self::MediaFiltered)
                .ok_or_else(unknown),
            ("media-filtered", None) => Err(Error::invalid_input(
                "media-filtered requires a subtype: video, music, image or pdf",
            )),
            _ => Err(unknown()),
        }
    }
}

impl TryFrom<String> for EndpointId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<EndpointId> for String {
    fn from(id: EndpointId) -> Self {
        id.to_string()
    }
}

// ============================================================================
// Scripture collections
// ============================================================================

/// The five volumes of scripture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    /// The Old Testament.
    #[serde(rename = "The Old Testament")]
    OldTestament,
    /// The New Testament.
    #[serde(rename = "The New Testament")]
    NewTestament,
    /// The Book of Mormon.
    #[serde(rename = "The Book of Mormon")]
    BookOfMormon,
    /// The Doctrine and Covenants.
    #[serde(rename = "The Doctrine and Covenants")]
    DoctrineAndCovenants,
    /// The Pearl of Great Price.
    #[serde(rename = "The Pearl of Great Price")]
    PearlOfGreatPrice,
}

impl Collection {
    /// Display title, as the scripture endpoint expects it.
    pub fn title(&self) -> &'static str {
        match self {
            Self::OldTestament => "The Old Testament",
            Self::NewTestament => "The New Testament",
            Self::BookOfMormon => "The Book of Mormon",
            Self::DoctrineAndCovenants => "The Doctrine and Covenants",
            Self::PearlOfGreatPrice => "The Pearl of Great Price",
        }
    }

    /// Testament, for Bible volumes only.
    pub fn testament(&self) -> Option<Testament> {
        match self {
            Self::OldTestament => Some(Testament::Old),
            Self::NewTestament => Some(Testament::New),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Bible testament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    /// Old Testament.
    Old,
    /// New Testament.
    New,
}

impl Testament {
    /// Lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
        }
    }
}

// ============================================================================
// Archive source categories
// ============================================================================

/// Numeric source categories understood by the archive endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceCategory {
    /// General conference.
    GeneralConference,
    /// Magazines.
    Magazines,
    /// Scriptures.
    Scriptures,
    /// Handbooks.
    Handbooks,
    /// Manuals.
    Manuals,
    /// Media library.
    Media,
}

impl SourceCategory {
    /// Numeric id sent to the archive endpoint.
    pub fn id(&self) -> u32 {
        match self {
            Self::GeneralConference => 1,
            Self::Magazines => 2,
            Self::Scriptures => 3,
            Self::Handbooks => 4,
            Self::Manuals => 5,
            Self::Media => 6,
        }
    }

    /// Best-guess source for a content type; `None` searches every source.
    pub fn for_content_type(content_type: ContentType) -> Option<Self> {
        match content_type {
            ContentType::Conference => Some(Self::GeneralConference),
            ContentType::Scripture => Some(Self::Scriptures),
            ContentType::Magazine => Some(Self::Magazines),
            ContentType::Media => Some(Self::Media),
            ContentType::Handbook => Some(Self::Handbooks),
            ContentType::Manual => Some(Self::Manuals),
            ContentType::Mixed | ContentType::Unknown => None,
        }
    }
}

// ============================================================================
// Date and year ranges
// ============================================================================

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included.
    pub from: NaiveDate,
    /// Last day included.
    pub to: NaiveDate,
}

impl DateRange {
    /// The `months` months ending on `today`.
    pub fn past_months(today: NaiveDate, months: u32) -> Self {
        let from = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// January 1st of `start` through December 31st of `end`.
    ///
    /// Falls back to the minimum/maximum representable dates for years
    /// chrono cannot represent.
    pub fn from_years(start: i32, end: i32) -> Self {
        let from = NaiveDate::from_ymd_opt(start, 1, 1).unwrap_or(NaiveDate::MIN);
        let to = NaiveDate::from_ymd_opt(end, 12, 31).unwrap_or(NaiveDate::MAX);
        Self { from, to }
    }

    /// Whole-year range covering a [`YearRange`].
    pub fn from_year_range(range: YearRange) -> Self {
        Self::from_years(range.start, range.end)
    }

    /// Years touched by this range.
    pub fn years(&self) -> YearRange {
        YearRange::new(self.from.year(), self.to.year())
    }
}

/// Inclusive range of calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    /// First year included.
    pub start: i32,
    /// Last year included.
    pub end: i32,
}

impl YearRange {
    /// Create a range, swapping the bounds if given backwards.
    pub fn new(start: i32, end: i32) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A single year.
    pub fn single(year: i32) -> Self {
        Self::new(year, year)
    }
}

// ============================================================================
// SearchParams
// ============================================================================

/// Endpoint-specific parameter bag.
///
/// Every field is optional; each endpoint reads the fields its schema knows
/// and ignores the rest. Absent fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Scripture volume to search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<Collection>,

    /// Bible testament guess.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub testament: Option<Testament>,

    /// Archive source-category id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<u32>,

    /// Author slug (`russell-m-nelson`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Publication date window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,

    /// Conference year window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_range: Option<YearRange>,

    /// Speaker display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    /// Manual family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual: Option<ManualFamily>,

    /// Site directory a text search is restricted to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_path: Option<String>,

    /// Media subtype.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaKind>,
}

impl SearchParams {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Flatten into `key=value` pairs for a query string.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(collection) = self.collection {
            pairs.push(("collection", collection.title().to_string()));
        }
        if let Some(testament) = self.testament {
            pairs.push(("testament", testament.as_str().to_string()));
        }
        if let Some(source) = self.source {
            pairs.push(("source", source.to_string()));
        }
        if let Some(author) = &self.author {
            pairs.push(("author", author.clone()));
        }
        if let Some(range) = self.date_range {
            pairs.push(("date_from", range.from.format("%Y-%m-%d").to_string()));
            pairs.push(("date_to", range.to.format("%Y-%m-%d").to_string()));
        }
        if let Some(range) = self.year_range {
            pairs.push(("year_start", range.start.to_string()));
            pairs.push(("year_end", range.end.to_string()));
        }
        if let Some(speaker) = &self.speaker {
            pairs.push(("speaker", speaker.clone()));
        }
        if let Some(manual) = self.manual {
            pairs.push(("manual", manual.slug().to_string()));
        }
        if let Some(path) = &self.site_path {
            pairs.push(("site_path", path.clone()));
        }
        if let Some(media) = self.media {
            pairs.push(("media", media.slug().to_string()));
        }
        pairs
    }
}

// ============================================================================
// Tests
// ============================================================================
