//! Terminal overlay for analysis runs.
//!
//! Renders the analysed text with each occurrence wrapped in a marker and
//! numbered, followed by the critique items and their resolution status.

use std::fmt::Write as _;

use redpen_core::{Analysis, AnnotationRecord, ResolutionStore, Segment};
use serde::Serialize;

const MAX_SNIPPET_CHARS: usize = 48;

// ── Public API ──

/// Print one run as a card: header, overlaid text, item list.
pub fn print_analysis(analysis: &Analysis, store: &ResolutionStore) {
    let progress = analysis.progress(store);
    println!(
        "=== {} ({} of {} resolved) ===",
        analysis.kind(),
        progress.resolved,
        progress.total
    );
    println!();
    println!("{}", render_overlay(analysis, store));
    println!();
    print!("{}", render_items(analysis, store));
    println!();
}

/// The analysed text with `[[occurrence]]{n}` markers; resolved occurrences
/// are struck through as `~~occurrence~~{n}`.
pub fn render_overlay(analysis: &Analysis, store: &ResolutionStore) -> String {
    let mut out = String::with_capacity(analysis.text().len() + 16);
    let mut n = 0;
    for segment in analysis.segments() {
        match segment {
            Segment::Literal { text, .. } => out.push_str(text),
            Segment::Annotated {
                text, occurrence, ..
            } => {
                n += 1;
                if store.is_resolved(occurrence) {
                    let _ = write!(out, "~~{text}~~{{{n}}}");
                } else {
                    let _ = write!(out, "[[{text}]]{{{n}}}");
                }
            }
        }
    }
    out
}

/// Numbered critique items, then any records whose snippet was not found.
pub fn render_items(analysis: &Analysis, store: &ResolutionStore) -> String {
    let mut out = String::new();

    for (i, segment) in analysis.occurrences().enumerate() {
        let (Some(id), Some(record)) = (segment.occurrence(), segment.record()) else {
            continue;
        };
        let mark = if store.is_resolved(id) { "x" } else { " " };
        let _ = writeln!(
            out,
            "  {:>2}. [{mark}] {:<10} \"{}\" -> {}",
            i + 1,
            record.label(),
            truncate(segment.text()),
            record.advice()
        );
    }

    let missing = analysis.unmatched();
    if !missing.is_empty() {
        let _ = writeln!(out, "\n  Not found in text:");
        for record in missing {
            let _ = writeln!(
                out,
                "      {:<10} \"{}\" -> {}",
                record.label(),
                truncate(&record.snippet),
                record.advice()
            );
        }
    }

    if analysis.records().is_empty() {
        let _ = writeln!(out, "  No issues found.");
    }

    out
}

/// Machine-readable form of a run.
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub kind: &'static str,
    pub run: String,
    pub segments: &'a [Segment],
    pub unmatched: Vec<&'a AnnotationRecord>,
}

impl<'a> JsonReport<'a> {
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            kind: analysis.kind().as_str(),
            run: analysis.run_id().to_string(),
            segments: analysis.segments(),
            unmatched: analysis.unmatched(),
        }
    }
}

// ── Helpers ──

fn truncate(s: &str) -> String {
    if s.chars().count() <= MAX_SNIPPET_CHARS {
        return s.to_string();
    }
    let head: String = s.chars().take(MAX_SNIPPET_CHARS - 3).collect();
    format!("{head}...")
}
