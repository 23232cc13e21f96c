//! Analysis runs and the per-kind session that owns their resolution state.

use std::sync::OnceLock;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::locate::{Segment, locate, unmatched};
use crate::record::{AnalysisKind, AnnotationRecord};
use crate::store::{IdMinter, OccurrenceId, ResolutionStore, RunId};
use crate::validate::extract;
use crate::AnalysisError;

/// One analysis run: the text that was analysed and the records the model
/// returned for it.
///
/// Segments are computed on first access and cached for the life of the run,
/// so every render sees the same occurrence ids.
#[derive(Debug)]
pub struct Analysis {
    kind: AnalysisKind,
    run: RunId,
    text: String,
    records: Vec<AnnotationRecord>,
    segments: OnceLock<Vec<Segment>>,
}

/// How many occurrences of a run the user has resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub resolved: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.resolved == self.total
    }
}

impl Analysis {
    /// Start a new run over `text` with already-validated `records`.
    pub fn new(
        kind: AnalysisKind,
        text: impl Into<String>,
        records: Vec<AnnotationRecord>,
    ) -> Self {
        Self {
            kind,
            run: RunId::new(),
            text: text.into(),
            records,
            segments: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn records(&self) -> &[AnnotationRecord] {
        &self.records
    }

    /// The lossless segment partition of the analysed text.
    pub fn segments(&self) -> &[Segment] {
        self.segments.get_or_init(|| {
            let segments = locate(&self.text, &self.records, &mut IdMinter::new(self.run));
            let missing = unmatched(&self.records, &segments);
            if !missing.is_empty() {
                debug!(
                    run = %self.run,
                    unmatched = missing.len(),
                    "some snippets do not occur in the text"
                );
            }
            segments
        })
    }

    /// Annotated segments in text order.
    pub fn occurrences(&self) -> impl Iterator<Item = &Segment> {
        self.segments().iter().filter(|s| s.occurrence().is_some())
    }

    /// Id of the `ordinal`-th occurrence (zero-based, text order).
    pub fn occurrence(&self, ordinal: usize) -> Option<&OccurrenceId> {
        self.occurrences().nth(ordinal).and_then(Segment::occurrence)
    }

    /// Records whose snippet was not found in the text.
    pub fn unmatched(&self) -> Vec<&AnnotationRecord> {
        unmatched(&self.records, self.segments())
    }

    pub fn progress(&self, store: &ResolutionStore) -> Progress {
        let mut total = 0;
        let mut resolved = 0;
        for id in self.occurrences().filter_map(Segment::occurrence) {
            total += 1;
            if store.is_resolved(id) {
                resolved += 1;
            }
        }
        Progress { total, resolved }
    }
}

/// Turn a raw model response into an analysis run over `text`.
///
/// The response is always normalised before parsing. Any extraction failure
/// rejects the whole response; nothing is partially trusted.
pub fn analyze(kind: AnalysisKind, text: &str, raw: &str) -> Result<Analysis, AnalysisError> {
    match extract(raw, kind.shape()) {
        Ok(records) => {
            let analysis = Analysis::new(kind, text, records);
            info!(
                %kind,
                run = %analysis.run,
                records = analysis.records.len(),
                "analysis ready"
            );
            Ok(analysis)
        }
        Err(source) => {
            warn!(%kind, error = %source, raw_len = raw.len(), "could not extract annotations");
            Err(AnalysisError {
                raw: raw.to_string(),
                source,
            })
        }
    }
}

#[derive(Debug, Default)]
struct Lane {
    analysis: Option<Analysis>,
    store: ResolutionStore,
}

impl Lane {
    fn clear(&mut self) {
        self.analysis = None;
        self.store.reset();
    }
}

/// Caller-side state: the input text plus, per analysis kind, the current
/// run and its own resolution store.
///
/// The two kinds never share resolution state.
#[derive(Debug, Default)]
pub struct Session {
    input: String,
    rules: Lane,
    general: Lane,
}

impl Session {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Replace the input text. Runs over the old text are discarded.
    pub fn set_input(&mut self, input: impl Into<String>) {
        let input = input.into();
        if input != self.input {
            self.rules.clear();
            self.general.clear();
        }
        self.input = input;
    }

    /// Clear the input and every run.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.rules.clear();
        self.general.clear();
    }

    /// A new run of `kind` is starting: drop the old one and its state.
    pub fn begin(&mut self, kind: AnalysisKind) {
        debug!(%kind, "analysis run starting");
        self.lane_mut(kind).clear();
    }

    /// Install a finished run, replacing any previous run of the same kind.
    pub fn install(&mut self, analysis: Analysis) {
        let lane = self.lane_mut(analysis.kind());
        lane.store.reset();
        lane.analysis = Some(analysis);
    }

    pub fn analysis(&self, kind: AnalysisKind) -> Option<&Analysis> {
        self.lane(kind).analysis.as_ref()
    }

    pub fn store(&self, kind: AnalysisKind) -> &ResolutionStore {
        &self.lane(kind).store
    }

    pub fn resolve(&mut self, kind: AnalysisKind, id: &OccurrenceId) -> bool {
        self.lane_mut(kind).store.resolve(id)
    }

    pub fn unresolve(&mut self, kind: AnalysisKind, id: &OccurrenceId) -> bool {
        self.lane_mut(kind).store.unresolve(id)
    }

    pub fn is_resolved(&self, kind: AnalysisKind, id: &OccurrenceId) -> bool {
        self.lane(kind).store.is_resolved(id)
    }

    pub fn progress(&self, kind: AnalysisKind) -> Option<Progress> {
        let lane = self.lane(kind);
        lane.analysis.as_ref().map(|a| a.progress(&lane.store))
    }

    fn lane(&self, kind: AnalysisKind) -> &Lane {
        match kind {
            AnalysisKind::Rules => &self.rules,
            AnalysisKind::General => &self.general,
        }
    }

    fn lane_mut(&mut self, kind: AnalysisKind) -> &mut Lane {
        match kind {
            AnalysisKind::Rules => &mut self.rules,
            AnalysisKind::General => &mut self.general,
        }
    }
}
