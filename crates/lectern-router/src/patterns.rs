//! Static vocabulary used by the query analyzer.
//!
//! Every table here is built once on first use and never mutated. Phrases
//! are stored in the same normalized form [`normalize`] produces for
//! queries, so matching is a plain whole-word substring search.

use std::collections::HashMap;
use std::sync::LazyLock;

use lectern_core::{Collection, ManualFamily, MediaKind};

// ============================================================================
// Normalization and matching
// ============================================================================

/// Lowercase `text`, turn punctuation into spaces and collapse runs of
/// whitespace.
///
/// `&` and `'` survive so that `D&C` and `women's` keep their shape.
pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() || c == '&' || c == '\'' {
                c
            } else {
                ' '
            }
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte offset of the first whole-word occurrence of `needle` in
/// `haystack`. Both sides are expected to be [`normalize`]d.
pub fn find_phrase(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    let bytes = haystack.as_bytes();
    let mut from = 0;
    while let Some(offset) = haystack[from..].find(needle) {
        let start = from + offset;
        let end = start + needle.len();
        let before_ok = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after_ok = end == haystack.len() || !bytes[end].is_ascii_alphanumeric();
        if before_ok && after_ok {
            return Some(start);
        }
        from = start + haystack[start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

/// Whole-word containment.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    find_phrase(haystack, needle).is_some()
}

/// Whether any phrase in `phrases` appears in `haystack`.
pub fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_phrase(haystack, p))
}

/// The earliest match among `(phrase, value)` pairs; ties go to the longer
/// phrase.
fn earliest<'a, T: Copy>(
    haystack: &str,
    candidates: impl IntoIterator<Item = (&'a str, T)>,
) -> Option<T> {
    candidates
        .into_iter()
        .filter_map(|(phrase, value)| {
            find_phrase(haystack, phrase).map(|pos| (pos, phrase.len(), value))
        })
        .min_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
        .map(|(_, _, value)| value)
}

// ============================================================================
// Scripture books
// ============================================================================

/// A canonical scripture book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Book {
    /// Canonical name (`1 Nephi`).
    pub name: &'static str,
    /// Volume the book belongs to.
    pub collection: Collection,
    /// Accepted abbreviations (`1 Ne`).
    pub abbreviations: &'static [&'static str],
}

const fn book(
    name: &'static str,
    collection: Collection,
    abbreviations: &'static [&'static str],
) -> Book {
    Book {
        name,
        collection,
        abbreviations,
    }
}

use Collection::{
    BookOfMormon as BOM, DoctrineAndCovenants as DC, NewTestament as NT, OldTestament as OT,
    PearlOfGreatPrice as PGP,
};

/// All canonical books in volume order.
///
/// Abbreviations that collide with everyday words (`Song`, `Dan`, `Mal`)
/// are left out.
pub static BOOKS: &[Book] = &[
    // Old Testament
    book("Genesis", OT, &["Gen"]),
    book("Exodus", OT, &["Exod"]),
    book("Leviticus", OT, &["Lev"]),
    book("Numbers", OT, &[]),
    book("Deuteronomy", OT, &["Deut"]),
    book("Joshua", OT, &["Josh"]),
    book("Judges", OT, &["Judg"]),
    book("Ruth", OT, &[]),
    book("1 Samuel", OT, &["1 Sam"]),
    book("2 Samuel", OT, &["2 Sam"]),
    book("1 Kings", OT, &["1 Kgs"]),
    book("2 Kings", OT, &["2 Kgs"]),
    book("1 Chronicles", OT, &["1 Chr"]),
    book("2 Chronicles", OT, &["2 Chr"]),
    book("Ezra", OT, &[]),
    book("Nehemiah", OT, &["Neh"]),
    book("Esther", OT, &["Esth"]),
    book("Job", OT, &[]),
    book("Psalms", OT, &["Psalm", "Ps"]),
    book("Proverbs", OT, &["Prov"]),
    book("Ecclesiastes", OT, &["Eccl"]),
    book("Song of Solomon", OT, &["Song of Songs"]),
    book("Isaiah", OT, &["Isa"]),
    book("Jeremiah", OT, &["Jer"]),
    book("Lamentations", OT, &[]),
    book("Ezekiel", OT, &["Ezek"]),
    book("Daniel", OT, &[]),
    book("Hosea", OT, &[]),
    book("Joel", OT, &[]),
    book("Amos", OT, &[]),
    book("Obadiah", OT, &["Obad"]),
    book("Jonah", OT, &[]),
    book("Micah", OT, &[]),
    book("Nahum", OT, &[]),
    book("Habakkuk", OT, &[]),
    book("Zephaniah", OT, &["Zeph"]),
    book("Haggai", OT, &[]),
    book("Zechariah", OT, &["Zech"]),
    book("Malachi", OT, &[]),
    // New Testament
    book("Matthew", NT, &["Matt"]),
    book("Mark", NT, &[]),
    book("Luke", NT, &[]),
    book("John", NT, &[]),
    book("Acts", NT, &[]),
    book("Romans", NT, &["Rom"]),
    book("1 Corinthians", NT, &["1 Cor"]),
    book("2 Corinthians", NT, &["2 Cor"]),
    book("Galatians", NT, &["Gal"]),
    book("Ephesians", NT, &["Eph"]),
    book("Philippians", NT, &["Philip"]),
    book("Colossians", NT, &["Col"]),
    book("1 Thessalonians", NT, &["1 Thes"]),
    book("2 Thessalonians", NT, &["2 Thes"]),
    book("1 Timothy", NT, &["1 Tim"]),
    book("2 Timothy", NT, &["2 Tim"]),
    book("Titus", NT, &[]),
    book("Philemon", NT, &["Philem"]),
    book("Hebrews", NT, &["Heb"]),
    book("James", NT, &[]),
    book("1 Peter", NT, &["1 Pet"]),
    book("2 Peter", NT, &["2 Pet"]),
    book("1 John", NT, &["1 Jn"]),
    book("2 John", NT, &["2 Jn"]),
    book("3 John", NT, &["3 Jn"]),
    book("Jude", NT, &[]),
    book("Revelation", NT, &["Rev"]),
    // Book of Mormon
    book("1 Nephi", BOM, &["1 Ne"]),
    book("2 Nephi", BOM, &["2 Ne"]),
    book("Jacob", BOM, &[]),
    book("Enos", BOM, &[]),
    book("Jarom", BOM, &[]),
    book("Omni", BOM, &[]),
    book("Words of Mormon", BOM, &["W of M"]),
    book("Mosiah", BOM, &[]),
    book("Alma", BOM, &[]),
    book("Helaman", BOM, &["Hel"]),
    book("3 Nephi", BOM, &["3 Ne"]),
    book("4 Nephi", BOM, &["4 Ne"]),
    book("Mormon", BOM, &["Morm"]),
    book("Ether", BOM, &[]),
    book("Moroni", BOM, &["Moro"]),
    // Doctrine and Covenants
    book("Doctrine and Covenants", DC, &["D&C"]),
    // Pearl of Great Price
    book("Moses", PGP, &[]),
    book("Abraham", PGP, &["Abr"]),
    book(
        "Joseph Smith—Matthew",
        PGP,
        &["JS—M", "JS-M", "Joseph Smith Matthew"],
    ),
    book(
        "Joseph Smith—History",
        PGP,
        &["JS—H", "JS-H", "Joseph Smith History"],
    ),
    book("Articles of Faith", PGP, &["A of F"]),
];

/// Volume titles that count as book-name signals on their own.
pub static COLLECTION_TITLES: &[(&str, Collection)] = &[
    ("old testament", OT),
    ("new testament", NT),
    ("book of mormon", BOM),
    ("doctrine and covenants", DC),
    ("pearl of great price", PGP),
];

/// Normalized book name or abbreviation → book.
pub static BOOK_LOOKUP: LazyLock<HashMap<String, &'static Book>> = LazyLock::new(|| {
    let mut lookup = HashMap::new();
    for entry in BOOKS {
        for form in std::iter::once(&entry.name).chain(entry.abbreviations) {
            lookup.insert(normalize(form), entry);
        }
    }
    lookup
});

/// Every normalized book form, longest first.
pub static BOOK_FORMS: LazyLock<Vec<(String, &'static Book)>> = LazyLock::new(|| {
    let mut forms: Vec<_> = BOOK_LOOKUP
        .iter()
        .map(|(form, entry)| (form.clone(), *entry))
        .collect();
    forms.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));
    forms
});

/// Resolve a book name or abbreviation as written in a query.
pub fn lookup_book(text: &str) -> Option<&'static Book> {
    BOOK_LOOKUP.get(&normalize(text)).copied()
}

/// The collection of the earliest book name or volume title in a normalized
/// query.
pub fn find_collection(normalized: &str) -> Option<Collection> {
    let books = BOOK_FORMS
        .iter()
        .map(|(form, entry)| (form.as_str(), entry.collection));
    let titles = COLLECTION_TITLES.iter().map(|(title, c)| (*title, *c));
    earliest(normalized, books.chain(titles))
}

// ============================================================================
// Speaker roster
// ============================================================================

/// A known conference speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speaker {
    /// Canonical full name.
    pub name: &'static str,
    /// Surname used with honorifics.
    pub surname: &'static str,
    /// Honorifics the speaker is commonly addressed with.
    pub honorifics: &'static [&'static str],
    /// Whether the bare surname is distinctive enough to match alone.
    pub surname_alone: bool,
}

const fn speaker(
    name: &'static str,
    surname: &'static str,
    honorifics: &'static [&'static str],
    surname_alone: bool,
) -> Speaker {
    Speaker {
        name,
        surname,
        honorifics,
        surname_alone,
    }
}

const PRES: &[&str] = &["president"];
const ELDER: &[&str] = &["elder"];
const PRES_ELDER: &[&str] = &["president", "elder"];
const SISTER: &[&str] = &["sister", "president"];

/// Frequently searched general conference speakers.
pub static SPEAKERS: &[Speaker] = &[
    speaker("Russell M. Nelson", "Nelson", PRES_ELDER, true),
    speaker("Dallin H. Oaks", "Oaks", PRES_ELDER, true),
    speaker("Henry B. Eyring", "Eyring", PRES_ELDER, true),
    speaker("Jeffrey R. Holland", "Holland", PRES_ELDER, true),
    speaker("Dieter F. Uchtdorf", "Uchtdorf", PRES_ELDER, true),
    speaker("David A. Bednar", "Bednar", ELDER, true),
    speaker("Quentin L. Cook", "Cook", ELDER, false),
    speaker("D. Todd Christofferson", "Christofferson", ELDER, true),
    speaker("Neil L. Andersen", "Andersen", ELDER, true),
    speaker("Ronald A. Rasband", "Rasband", ELDER, true),
    speaker("Gary E. Stevenson", "Stevenson", ELDER, true),
    speaker("Dale G. Renlund", "Renlund", ELDER, true),
    speaker("Gerrit W. Gong", "Gong", ELDER, true),
    speaker("Ulisses Soares", "Soares", ELDER, true),
    speaker("Patrick Kearon", "Kearon", ELDER, true),
    speaker("M. Russell Ballard", "Ballard", PRES_ELDER, true),
    speaker("Thomas S. Monson", "Monson", PRES, true),
    speaker("Gordon B. Hinckley", "Hinckley", PRES, true),
    speaker("Boyd K. Packer", "Packer", PRES_ELDER, true),
    speaker("Neal A. Maxwell", "Maxwell", ELDER, true),
    speaker("Joseph B. Wirthlin", "Wirthlin", ELDER, true),
    speaker("Robert D. Hales", "Hales", ELDER, true),
    speaker("James E. Faust", "Faust", PRES, true),
    speaker("L. Tom Perry", "Perry", ELDER, false),
    speaker("Richard G. Scott", "Scott", ELDER, false),
    speaker("Spencer W. Kimball", "Kimball", PRES, true),
    speaker("Ezra Taft Benson", "Benson", PRES, true),
    speaker("Howard W. Hunter", "Hunter", PRES, false),
    speaker("Jean B. Bingham", "Bingham", SISTER, true),
    speaker("Camille N. Johnson", "Johnson", SISTER, false),
    speaker("Emily Belle Freeman", "Freeman", SISTER, false),
];

/// Normalized variant → speaker, longest variant first.
pub static SPEAKER_VARIANTS: LazyLock<Vec<(String, &'static Speaker)>> = LazyLock::new(|| {
    let mut variants = Vec::new();
    for entry in SPEAKERS {
        let full = normalize(entry.name);
        let surname = normalize(entry.surname);
        if let Some(first) = full.split(' ').next() {
            variants.push((format!("{first} {surname}"), entry));
        }
        variants.push((full, entry));
        for honorific in entry.honorifics {
            variants.push((format!("{honorific} {surname}"), entry));
        }
        if entry.surname_alone {
            variants.push((surname, entry));
        }
    }
    variants.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(&b.0)));
    variants.dedup_by(|a, b| a.0 == b.0);
    variants
});

/// The earliest roster speaker mentioned in a normalized query.
pub fn find_speaker(normalized: &str) -> Option<&'static Speaker> {
    earliest(
        normalized,
        SPEAKER_VARIANTS.iter().map(|(v, s)| (v.as_str(), *s)),
    )
}

// ============================================================================
// Keyword sets
// ============================================================================

/// Conference vocabulary.
pub const CONFERENCE_KEYWORDS: &[&str] = &[
    "general conference",
    "conference",
    "conferences",
    "talk",
    "talks",
    "address",
    "addresses",
    "sermon",
    "sermons",
    "devotional",
    "devotionals",
    "priesthood session",
    "women's session",
    "general session",
];

/// Manual, lesson and handbook vocabulary.
pub const MANUAL_KEYWORDS: &[&str] = &[
    "manual",
    "manuals",
    "lesson",
    "lessons",
    "come follow me",
    "cfm",
    "handbook",
    "general handbook",
    "study guide",
    "curriculum",
    "teachings of presidents",
    "gospel principles",
    "preach my gospel",
    "seminary",
    "institute",
    "sunday school",
];

/// Handbook policy vocabulary.
pub const HANDBOOK_POLICY_KEYWORDS: &[&str] = &[
    "policy",
    "policies",
    "guideline",
    "guidelines",
    "procedure",
    "procedures",
];

/// Media vocabulary per subtype, in priority order.
pub const MEDIA_KEYWORDS: &[(MediaKind, &[&str])] = &[
    (
        MediaKind::Video,
        &["video", "videos", "film", "films", "movie", "movies"],
    ),
    (
        MediaKind::Music,
        &[
            "music", "audio", "song", "songs", "hymn", "hymns", "choir", "podcast",
        ],
    ),
    (
        MediaKind::Image,
        &[
            "image", "images", "picture", "pictures", "photo", "photos", "art", "artwork",
            "painting", "paintings",
        ],
    ),
    (MediaKind::Pdf, &["pdf", "pdfs", "printable", "printables"]),
];

/// Magazine names and vocabulary.
pub const MAGAZINE_KEYWORDS: &[&str] = &[
    "liahona",
    "ensign",
    "new era",
    "friend magazine",
    "for the strength of youth",
    "magazine",
    "magazines",
    "article",
    "articles",
];

/// Manual families recognizable by name, most specific first.
pub const MANUAL_FAMILY_KEYWORDS: &[(&str, ManualFamily)] = &[
    ("come follow me", ManualFamily::ComeFollowMe),
    ("cfm", ManualFamily::ComeFollowMe),
    ("general handbook", ManualFamily::GeneralHandbook),
    ("handbook", ManualFamily::GeneralHandbook),
];

/// The first media subtype with a keyword in a normalized query.
pub fn find_media_kind(normalized: &str) -> Option<MediaKind> {
    MEDIA_KEYWORDS
        .iter()
        .find(|(_, words)| contains_any(normalized, words))
        .map(|(kind, _)| *kind)
}

/// The manual family named in a normalized query.
pub fn find_manual_family(normalized: &str) -> Option<ManualFamily> {
    MANUAL_FAMILY_KEYWORDS
        .iter()
        .find(|(phrase, _)| contains_phrase(normalized, phrase))
        .map(|(_, family)| *family)
}

// ============================================================================
// Date vocabulary
// ============================================================================

/// Relative date phrases and the window they stand for.
pub const RELATIVE_DATE_PHRASES: &[(&str, RelativePhrase)] = &[
    ("this year", RelativePhrase::ThisYear),
    ("last year", RelativePhrase::LastYear),
    ("recent", RelativePhrase::Recent),
    ("recently", RelativePhrase::Recent),
    ("latest", RelativePhrase::Recent),
    ("newest", RelativePhrase::Recent),
    ("current", RelativePhrase::Recent),
];

/// Window named by a relative date phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativePhrase {
    /// The last couple of years.
    Recent,
    /// The current calendar year.
    ThisYear,
    /// The previous calendar year.
    LastYear,
}

/// Months in which general conference is held.
pub const CONFERENCE_MONTHS: &[&str] = &["april", "october"];

/// First general conference covered by the archive.
pub const EARLIEST_YEAR: i32 = 1971;

/// The earliest relative date phrase in a normalized query.
pub fn find_relative_date(normalized: &str) -> Option<RelativePhrase> {
    earliest(normalized, RELATIVE_DATE_PHRASES.iter().copied())
}

// ============================================================================
// Tests
// ============================================================================
