//! Snippet location: partition the original text into literal and annotated
//! segments.
//!
//! Records reference text by content, not offset. All distinct snippets are
//! compiled into one case-insensitive alternation, longest first, and the
//! text is scanned once left to right. A match consumes its span, so a short
//! snippet that is a substring of a longer one never splits the longer match.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::ops::Range;

use regex::RegexBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use crate::record::AnnotationRecord;
use crate::store::{IdMinter, OccurrenceId};

/// Compiled-program budget for the alternation pattern.
const PATTERN_SIZE_LIMIT: usize = 64 * 1024 * 1024;

/// A contiguous run of the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Literal {
        text: String,
        span: Range<usize>,
    },
    Annotated {
        /// Source text of the match, in the source's casing.
        text: String,
        span: Range<usize>,
        record: AnnotationRecord,
        occurrence: OccurrenceId,
    },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Literal { text, .. } | Segment::Annotated { text, .. } => text,
        }
    }

    /// Byte range of this segment in the original text.
    pub fn span(&self) -> Range<usize> {
        match self {
            Segment::Literal { span, .. } | Segment::Annotated { span, .. } => span.clone(),
        }
    }

    pub fn occurrence(&self) -> Option<&OccurrenceId> {
        match self {
            Segment::Annotated { occurrence, .. } => Some(occurrence),
            Segment::Literal { .. } => None,
        }
    }

    pub fn record(&self) -> Option<&AnnotationRecord> {
        match self {
            Segment::Annotated { record, .. } => Some(record),
            Segment::Literal { .. } => None,
        }
    }
}

/// Partition `text` into segments for `records`, minting one id per match.
///
/// Concatenating the returned segments reproduces `text` exactly. Snippets
/// that do not occur in `text` are silently skipped.
pub fn locate(text: &str, records: &[AnnotationRecord], minter: &mut IdMinter) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }

    let snippets = ordered_snippets(records);
    if snippets.is_empty() {
        return vec![literal(text, 0..text.len())];
    }

    let alternation = snippets
        .iter()
        .map(|s| format!("({})", regex::escape(s)))
        .collect::<Vec<_>>()
        .join("|");

    let pattern = match RegexBuilder::new(&alternation)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(re) => re,
        Err(e) => {
            warn!(error = %e, snippets = snippets.len(), "snippet pattern failed to compile");
            return vec![literal(text, 0..text.len())];
        }
    };

    let mut segments = Vec::new();
    let mut cursor = 0;

    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let Some(branch) = (1..caps.len()).find(|&i| caps.get(i).is_some()) else {
            continue;
        };
        let Some(record) = record_for(records, whole.as_str(), snippets[branch - 1]) else {
            continue;
        };

        if whole.start() > cursor {
            segments.push(literal(text, cursor..whole.start()));
        }
        segments.push(Segment::Annotated {
            text: whole.as_str().to_string(),
            span: whole.range(),
            record: record.clone(),
            occurrence: minter.mint(),
        });
        cursor = whole.end();
    }

    if cursor < text.len() {
        segments.push(literal(text, cursor..text.len()));
    }

    debug!(
        segments = segments.len(),
        occurrences = minter.minted(),
        snippets = snippets.len(),
        "located snippets"
    );
    segments
}

/// Records whose snippet does not occur in the text behind `segments`.
///
/// Matching ignores case, as [`locate`] does. A record that shares a found
/// snippet with an earlier record is not listed here even though it owns no
/// occurrence: the earlier record claims every match of that snippet.
pub fn unmatched<'a>(
    records: &'a [AnnotationRecord],
    segments: &[Segment],
) -> Vec<&'a AnnotationRecord> {
    let found: HashSet<String> = segments
        .iter()
        .filter(|s| s.occurrence().is_some())
        .map(|s| s.text().to_lowercase())
        .collect();

    records
        .iter()
        .filter(|r| !found.contains(&r.snippet.to_lowercase()))
        .collect()
}

/// Distinct snippets, longest (in chars) first, ties in first-seen order.
fn ordered_snippets(records: &[AnnotationRecord]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut snippets: Vec<&str> = records
        .iter()
        .map(|r| r.snippet.as_str())
        .filter(|s| !s.is_empty() && seen.insert(*s))
        .collect();
    snippets.sort_by_key(|s| Reverse(s.chars().count()));
    snippets
}

/// First record whose snippet equals `matched` ignoring case, falling back
/// to the first record carrying the alternation branch that matched.
fn record_for<'a>(
    records: &'a [AnnotationRecord],
    matched: &str,
    branch: &str,
) -> Option<&'a AnnotationRecord> {
    let folded = matched.to_lowercase();
    records
        .iter()
        .find(|r| r.snippet.to_lowercase() == folded)
        .or_else(|| records.iter().find(|r| r.snippet == branch))
}

fn literal(text: &str, span: Range<usize>) -> Segment {
    Segment::Literal {
        text: text[span.clone()].to_string(),
        span,
    }
}
