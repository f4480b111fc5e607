//! Reformulation suggestions for searches that found nothing.

use lectern_core::ContentType;

use crate::analyzer::QueryAnalysis;

/// Suggestions for rephrasing a query, derived from its analysis.
pub fn reformulation_suggestions(analysis: &QueryAnalysis) -> Vec<String> {
    let mut suggestions = Vec::new();

    if analysis.has_quotes {
        suggestions.push("Remove the quotation marks to allow partial matches".to_string());
    } else {
        suggestions.push("Put an exact phrase in quotation marks".to_string());
    }

    if analysis.has_date_terms {
        suggestions.push("Widen or drop the date restriction".to_string());
    } else if analysis.content_type == ContentType::Conference {
        suggestions.push("Add a year or conference month (April, October)".to_string());
    }

    if analysis.content_type == ContentType::Unknown {
        suggestions.push(
            "Name the kind of content you want: conference talk, scripture, manual, magazine or media"
                .to_string(),
        );
    }

    if let Some(speaker) = &analysis.suggested_filters.speaker {
        suggestions.push(format!(
            "Check the spelling of the speaker's name or search for {speaker} without other terms"
        ));
    }

    if let Some(reference) = &analysis.scripture_reference {
        if reference.verse.is_some() {
            suggestions.push(format!(
                "Search the whole chapter: {} {}",
                reference.book, reference.chapter
            ));
        } else {
            suggestions.push(format!("Search the whole book: {}", reference.book));
        }
    }

    suggestions
}
