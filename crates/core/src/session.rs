//! Research Session Model
//!
//! The in-memory model reconstructed from a research event stream: the
//! top-level [`Session`] accumulator, the flat ReAct trace, the typed
//! research phases, and the rich detail records attached to phases and
//! observations.
//!
//! The model is write-once-per-stream: builders in the engine crate are the
//! only writers while the stream is open; consumers (rendering, navigation)
//! treat everything here as read-only and may observe partial state at any
//! time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Trace
// ============================================================================

/// Kind of a flat ReAct trace entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Plan,
    Thought,
    Action,
    Observation,
}

/// Sub-kind of a coalesced "think" group entry.
///
/// Consecutive frames of the same sub-kind merge into one group entry
/// instead of producing one trace entry per token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThinkGroupKind {
    Status,
    SearchResults,
    ThinkingStep,
}

/// Payload list carried by a grouped think entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkGroup {
    pub kind: ThinkGroupKind,
    pub items: Vec<Value>,
}

impl ThinkGroup {
    pub fn new(kind: ThinkGroupKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
        }
    }
}

/// One flat, ordered record of the plan/thought/action/observation narrative.
///
/// Ordinals are assigned sequentially by the builder, never trusted from the
/// frame. `correlation_id` is only present on observation entries that carry
/// an embedded rich payload; it is the join key into the detail store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactTraceEntry {
    pub ordinal: usize,
    pub kind: TraceKind,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_params: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<ThinkGroup>,
}

// ============================================================================
// Phases
// ============================================================================

/// Named stage of the research pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    Planning,
    Searching,
    Analyzing,
    Generating,
    Writing,
    Reviewing,
    ReResearching,
    Revising,
}

impl PhaseKind {
    /// Resolve a `research_step` `step_type` discriminator.
    pub fn from_step_type(step_type: &str) -> Option<Self> {
        match step_type {
            "planning" => Some(Self::Planning),
            "searching" | "researching" => Some(Self::Searching),
            "analyzing" => Some(Self::Analyzing),
            "generating" => Some(Self::Generating),
            "writing" => Some(Self::Writing),
            "reviewing" => Some(Self::Reviewing),
            "re_researching" => Some(Self::ReResearching),
            "revising" => Some(Self::Revising),
            _ => None,
        }
    }

    /// Resolve a coarse `phase` narrative-marker name. The producer uses a
    /// slightly different vocabulary than `step_type` (`researching` for the
    /// search burst, `rewriting` for the post-re-research write pass).
    pub fn from_phase_name(name: &str) -> Option<Self> {
        match name {
            "planning" => Some(Self::Planning),
            "researching" | "searching" => Some(Self::Searching),
            "analyzing" => Some(Self::Analyzing),
            "generating" => Some(Self::Generating),
            "writing" | "rewriting" => Some(Self::Writing),
            "reviewing" => Some(Self::Reviewing),
            "re_researching" => Some(Self::ReResearching),
            "revising" => Some(Self::Revising),
            _ => None,
        }
    }

    /// Default display title used when a frame creates a phase without one.
    pub fn default_title(&self) -> &'static str {
        match self {
            Self::Planning => "Research plan",
            Self::Searching => "Information retrieval",
            Self::Analyzing => "Data analysis",
            Self::Generating => "Report generation",
            Self::Writing => "Report writing",
            Self::Reviewing => "Quality review",
            Self::ReResearching => "Supplementary research",
            Self::Revising => "Report revision",
        }
    }

    /// Stable identifier fragment used for minted phase ids.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Searching => "searching",
            Self::Analyzing => "analyzing",
            Self::Generating => "generating",
            Self::Writing => "writing",
            Self::Reviewing => "reviewing",
            Self::ReResearching => "re_researching",
            Self::Revising => "revising",
        }
    }
}

/// Phase lifecycle status. Transitions are one-directional: a phase never
/// returns to `Pending` after leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    #[default]
    Pending,
    Running,
    Completed,
}

impl PhaseStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Completed => 2,
        }
    }

    /// Advance to `next` only if it does not move backwards.
    pub fn advance_to(&mut self, next: PhaseStatus) {
        if next.rank() >= self.rank() {
            *self = next;
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// A typed research phase. At most one instance exists per [`PhaseKind`]
/// within a session; later frames naming the same kind merge into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchPhase {
    pub id: String,
    pub kind: PhaseKind,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub status: PhaseStatus,
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
}

impl ResearchPhase {
    pub fn new(id: impl Into<String>, kind: PhaseKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: kind.default_title().to_string(),
            subtitle: String::new(),
            status: PhaseStatus::Pending,
            stats: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Detail payloads
// ============================================================================

/// One search hit as shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "siteName", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Entity/relation graph snapshot. Node and edge payloads are kept opaque;
/// only the stats are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub edges: Vec<Value>,
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
}

/// A generated chart. Producers send either a rendered image, an ECharts
/// option object, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Chart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(
        default,
        rename = "chart_type",
        alias = "type",
        skip_serializing_if = "Option::is_none"
    )]
    pub chart_type: Option<String>,
    #[serde(default, alias = "image", skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub echarts_option: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
}

/// One cited reference. Tolerant of both the legacy reference-material shape
/// (url/name/summary/siteName) and the newer citation shape (id/marker/source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Reference {
    #[serde(
        default,
        alias = "reference_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, alias = "siteName", skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// One drafted report section, recorded as section drafts stream in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
}

/// Rich per-phase (or per-observation) payload, fetched on demand rather
/// than always rendered. Created lazily on first reference; fields are
/// patched individually and never clobbered by frames that omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResearchDetail {
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_graph: Option<KnowledgeGraph>,
    #[serde(default)]
    pub charts: Vec<Chart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_report: Option<String>,
    #[serde(default)]
    pub sections: Vec<ReportSection>,
    /// Section name for observation-embedded detail records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub facts: Vec<Value>,
    #[serde(default)]
    pub data_points: Vec<Value>,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_quality: Option<String>,
}

// ============================================================================
// Plan & quote
// ============================================================================

/// One planned sub-query of the legacy research plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubQuery {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
}

/// The legacy planner output (understanding / strategy / sub-queries).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResearchPlan {
    #[serde(default)]
    pub understanding: String,
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub sub_queries: Vec<SubQuery>,
    #[serde(default)]
    pub expected_aspects: Vec<String>,
}

/// Real-time stock quote attached when the query names a listed company.
/// Upstream quote APIs stringify numbers inconsistently, so every numeric
/// field is accepted as either form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StockQuote {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "stringish")]
    pub price: String,
    #[serde(default, deserialize_with = "stringish")]
    pub change: String,
    #[serde(default, deserialize_with = "stringish")]
    pub change_percent: String,
    #[serde(default, deserialize_with = "stringish")]
    pub high: String,
    #[serde(default, deserialize_with = "stringish")]
    pub low: String,
    #[serde(default, deserialize_with = "stringish")]
    pub volume: String,
    #[serde(default, deserialize_with = "stringish")]
    pub turnover: String,
}

/// Accept a JSON string, number, or null as a display string.
fn stringish<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

// ============================================================================
// Session
// ============================================================================

/// Lifecycle state of a session's stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The stream is open and frames are still being applied.
    Streaming,
    /// The terminal sentinel arrived; the session is immutable.
    Completed,
    /// The caller aborted mid-flight; partial state is retained.
    Cancelled,
    /// The transport failed; partial state is retained.
    ConnectionLost,
}

/// Top-level mutable record for one research/chat turn.
///
/// Created when a turn begins, mutated exclusively by the stream builders
/// while the stream is open, and effectively immutable once the stream
/// ends, errs, or is cancelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub query: String,
    pub status: SessionStatus,
    /// Streamed answer/report text. Monotonically appended by answer deltas;
    /// replaced wholesale only by the final research-complete frame.
    pub content: String,
    /// Streamed reasoning text, monotonically appended.
    pub thinking: String,
    pub trace: Vec<ReactTraceEntry>,
    pub charts: Vec<Chart>,
    pub insights: Vec<String>,
    pub references: Vec<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<ResearchPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quote: Option<StockQuote>,
    pub phases: Vec<ResearchPhase>,
    pub started_at: DateTime<Utc>,
    /// Message describing a lost connection, when `status` is
    /// [`SessionStatus::ConnectionLost`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl Session {
    pub fn new(id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            query: query.into(),
            status: SessionStatus::Streaming,
            content: String::new(),
            thinking: String::new(),
            trace: Vec::new(),
            charts: Vec::new(),
            insights: Vec::new(),
            references: Vec::new(),
            plan: None,
            stock_quote: None,
            phases: Vec::new(),
            started_at: Utc::now(),
            failure: None,
        }
    }

    /// Append a trace entry, assigning the next ordinal unless the frame
    /// supplied an explicit step number.
    pub fn push_trace(
        &mut self,
        kind: TraceKind,
        text: impl Into<String>,
        explicit_step: Option<usize>,
    ) -> &mut ReactTraceEntry {
        let ordinal = explicit_step.unwrap_or(self.trace.len() + 1);
        let index = self.trace.len();
        self.trace.push(ReactTraceEntry {
            ordinal,
            kind,
            text: text.into(),
            tool: None,
            tool_params: None,
            success: None,
            timestamp: Utc::now(),
            correlation_id: None,
            group: None,
        });
        &mut self.trace[index]
    }

    /// Resolve the single live phase for a kind, if one exists.
    ///
    /// This is the kind-based resolution documented by the wire protocol:
    /// attachment frames never carry an explicit phase id, so a re-entrant
    /// phase of the same kind folds into the existing instance.
    pub fn phase_of(&self, kind: PhaseKind) -> Option<&ResearchPhase> {
        self.phases.iter().find(|p| p.kind == kind)
    }

    /// Mutable variant of [`Session::phase_of`].
    pub fn phase_of_mut(&mut self, kind: PhaseKind) -> Option<&mut ResearchPhase> {
        self.phases.iter_mut().find(|p| p.kind == kind)
    }

    /// Resolve the phase that owns the report draft: `writing` when present,
    /// otherwise `generating`.
    pub fn report_phase_mut(&mut self) -> Option<&mut ResearchPhase> {
        if self.phase_of(PhaseKind::Writing).is_some() {
            self.phase_of_mut(PhaseKind::Writing)
        } else {
            self.phase_of_mut(PhaseKind::Generating)
        }
    }

    /// Whether the stream is still open for mutation.
    pub fn is_streaming(&self) -> bool {
        self.status == SessionStatus::Streaming
    }
}
