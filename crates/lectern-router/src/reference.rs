//! Scripture reference shapes.
//!
//! A reference shape is a regular expression paired with an extractor that
//! turns its captures into a [`ScriptureReference`]. Shapes are tried in a
//! fixed order and the first one that yields a reference wins:
//!
//! 1. `Doctrine and Covenants 76` / `D&C 76:22`
//! 2. `1 Nephi 3` / `2 Cor 5:17` (numbered books)
//! 3. `Alma 32:21` (book, chapter and verse)
//! 4. `Moroni 10` (book and chapter)

use std::fmt;
use std::sync::LazyLock;

use lectern_core::Collection;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{error, trace};

use crate::patterns::{BOOK_FORMS, lookup_book};

/// A book/chapter/verse reference found in a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptureReference {
    /// Canonical book name.
    pub book: String,
    /// Volume the book belongs to.
    pub collection: Collection,
    /// Chapter (or section, for the Doctrine and Covenants).
    pub chapter: u32,
    /// Verse, when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
}

impl fmt::Display for ScriptureReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verse {
            Some(verse) => write!(f, "{} {}:{}", self.book, self.chapter, verse),
            None => write!(f, "{} {}", self.book, self.chapter),
        }
    }
}

type Extractor = fn(&Captures<'_>) -> Option<ScriptureReference>;

struct Shape {
    name: &'static str,
    pattern: Regex,
    extract: Extractor,
}

/// Token separator inside a multi-word book name (`Words of Mormon`,
/// `Joseph Smith—History`).
const NAME_SEPARATOR: &str = r"[\s\-\x{2013}\x{2014}.]+";

/// Regex alternation over book forms, longest first.
fn alternation<'a>(forms: impl IntoIterator<Item = &'a str>) -> String {
    forms
        .into_iter()
        .map(|form| {
            form.split(' ')
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(NAME_SEPARATOR)
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn compile(name: &'static str, pattern: &str, extract: Extractor) -> Option<Shape> {
    match Regex::new(pattern) {
        Ok(pattern) => Some(Shape {
            name,
            pattern,
            extract,
        }),
        Err(err) => {
            error!(shape = name, error = %err, "Invalid scripture reference pattern");
            None
        }
    }
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u32> {
    caps.get(group)?.as_str().parse().ok()
}

fn reference(
    book: &str,
    caps: &Captures<'_>,
    chapter: usize,
    verse: usize,
) -> Option<ScriptureReference> {
    let entry = lookup_book(book)?;
    Some(ScriptureReference {
        book: entry.name.to_string(),
        collection: entry.collection,
        chapter: number(caps, chapter)?,
        verse: number(caps, verse),
    })
}

fn extract_doctrine_and_covenants(caps: &Captures<'_>) -> Option<ScriptureReference> {
    reference("Doctrine and Covenants", caps, 1, 2)
}

fn extract_numbered(caps: &Captures<'_>) -> Option<ScriptureReference> {
    let book = format!("{} {}", caps.get(1)?.as_str(), caps.get(2)?.as_str());
    reference(&book, caps, 3, 4)
}

fn extract_book_chapter_verse(caps: &Captures<'_>) -> Option<ScriptureReference> {
    reference(caps.get(1)?.as_str(), caps, 2, 3)
}

fn extract_book_chapter(caps: &Captures<'_>) -> Option<ScriptureReference> {
    reference(caps.get(1)?.as_str(), caps, 2, 3)
}

static SHAPES: LazyLock<Vec<Shape>> = LazyLock::new(|| {
    let all_forms = alternation(BOOK_FORMS.iter().map(|(form, _)| form.as_str()));
    let numbered_stems = alternation(BOOK_FORMS.iter().filter_map(|(form, _)| {
        let (prefix, stem) = form.split_once(' ')?;
        prefix.parse::<u8>().ok().map(|_| stem)
    }));

    [
        compile(
            "doctrine-and-covenants",
            r"(?i)\b(?:doctrine\s+and\s+covenants|d\s*&\s*c)\.?\s*(\d{1,3})(?::(\d{1,3}))?\b",
            extract_doctrine_and_covenants,
        ),
        compile(
            "numbered-book",
            &format!(r"(?i)\b([1-4])\s*({numbered_stems})\.?\s+(\d{{1,3}})(?::(\d{{1,3}}))?\b"),
            extract_numbered,
        ),
        compile(
            "book-chapter-verse",
            &format!(r"(?i)\b({all_forms})\.?\s+(\d{{1,3}}):(\d{{1,3}})\b"),
            extract_book_chapter_verse,
        ),
        compile(
            "book-chapter",
            &format!(r"(?i)\b({all_forms})\.?\s+(\d{{1,3}})\b"),
            extract_book_chapter,
        ),
    ]
    .into_iter()
    .flatten()
    .collect()
});

/// The first scripture reference in `query`, trying each shape in priority
/// order.
pub fn find_reference(query: &str) -> Option<ScriptureReference> {
    SHAPES.iter().find_map(|shape| {
        let found = shape
            .pattern
            .captures_iter(query)
            .find_map(|caps| (shape.extract)(&caps));
        if let Some(found) = &found {
            trace!(shape = shape.name, reference = %found, "Matched reference shape");
        }
        found
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn find(query: &str) -> Option<String> {
        find_reference(query).map(|r| r.to_string())
    }

    #[test]
    fn test_doctrine_and_covenants() {
        assert_eq!(find("D&C 76").as_deref(), Some("Doctrine and Covenants 76"));
        assert_eq!(find("d & c 121:7").as_deref(), Some("Doctrine and Covenants 121:7"));
        assert_eq!(
            find("Doctrine and Covenants 89:18").as_deref(),
            Some("Doctrine and Covenants 89:18")
        );
        let reference = find_reference("D&C 4").unwrap();
        assert_eq!(reference.collection, Collection::DoctrineAndCovenants);
    }

    #[test]
    fn test_numbered_books() {
        assert_eq!(find("1 Nephi 3").as_deref(), Some("1 Nephi 3"));
        assert_eq!(find("2 Ne 2:25").as_deref(), Some("2 Nephi 2:25"));
        assert_eq!(find("1 Cor. 13").as_deref(), Some("1 Corinthians 13"));
        assert_eq!(find("3 John 1:4").as_deref(), Some("3 John 1:4"));
        let reference = find_reference("2 Timothy 1:7").unwrap();
        assert_eq!(reference.collection, Collection::NewTestament);
    }

    #[test]
    fn test_book_chapter_verse() {
        let reference = find_reference("Alma 32:21").unwrap();
        assert_eq!(reference.book, "Alma");
        assert_eq!(reference.chapter, 32);
        assert_eq!(reference.verse, Some(21));
        assert_eq!(reference.collection, Collection::BookOfMormon);
        assert_eq!(find("words of mormon 1:7").as_deref(), Some("Words of Mormon 1:7"));
        assert_eq!(
            find("Joseph Smith—History 1:17").as_deref(),
            Some("Joseph Smith—History 1:17")
        );
    }

    #[test]
    fn test_book_chapter() {
        assert_eq!(find("Moroni 10").as_deref(), Some("Moroni 10"));
        assert_eq!(find("read isaiah 53 tonight").as_deref(), Some("Isaiah 53"));
    }

    #[test]
    fn test_verse_shape_wins_over_chapter_shape() {
        assert_eq!(find("Moroni 10 and Alma 32:21").as_deref(), Some("Alma 32:21"));
    }

    #[test]
    fn test_no_reference() {
        assert!(find_reference("").is_none());
        assert!(find_reference("faith in Jesus Christ").is_none());
        assert!(find_reference("Alma").is_none());
        assert!(find_reference("Mark 2024 conference").is_none());
    }
}
