//! Stream Event Types
//!
//! Typed event sets for the two overlapping research-stream protocol
//! generations. Each generation is a closed, internally tagged enum with an
//! explicit `Unknown` fallthrough so future event kinds never break old
//! clients.
//!
//! Generation 1 is the flat ReAct narrative (plan/thought/action/observation
//! plus streaming text deltas). Generation 2 is the phase-oriented deep
//! research protocol whose payloads are wrapped in a `content` field by the
//! producing agent pipeline. A single stream may carry both generations
//! interleaved; the router must not assume exclusivity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::{Chart, Reference, ResearchPlan, SearchResult, StockQuote};

// ============================================================================
// Generation 2 — phase-oriented research protocol
// ============================================================================

/// `research_step` payload: create-or-update a phase by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ResearchStepContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    #[serde(default)]
    pub step_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
}

/// `search_results` payload. The incremental flag selects append semantics
/// over replace semantics for the result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResultsContent {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default, alias = "isIncremental")]
    pub is_incremental: bool,
    #[serde(default, alias = "searchType", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u32>,
}

/// Raw node/edge lists inside a `knowledge_graph` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GraphPayload {
    #[serde(default)]
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub edges: Vec<Value>,
}

/// `knowledge_graph` payload: a full graph snapshot plus summary stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct KnowledgeGraphContent {
    #[serde(default)]
    pub graph: GraphPayload,
    #[serde(default)]
    pub stats: BTreeMap<String, i64>,
    #[serde(default, alias = "isIncremental")]
    pub is_incremental: bool,
}

/// `charts` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartsContent {
    #[serde(default)]
    pub charts: Vec<Chart>,
}

/// One section of the planned report outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutlineSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
}

/// `outline` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OutlineContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub understanding: Option<Value>,
    #[serde(default)]
    pub key_entities: Vec<Value>,
    #[serde(default)]
    pub outline: Vec<OutlineSection>,
    #[serde(default)]
    pub research_questions: Vec<Value>,
}

/// `section_draft` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SectionDraftContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// `report_draft` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReportDraftContent {
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub conclusions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_count: Option<usize>,
}

/// `code` payload: the data-analysis interpreter announcing a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CodeContent {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub purpose: String,
}

/// `code_result` payload: execution outcome, output truncated upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CodeResultContent {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub has_chart: bool,
    #[serde(default)]
    pub retries: u32,
}

/// `code_fix` payload: one self-correction round after a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CodeFixContent {
    #[serde(default)]
    pub error_analysis: String,
    #[serde(default)]
    pub fix_description: String,
    #[serde(default)]
    pub retry: u32,
}

/// `critic_feedback` payload: one surfaced review issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CriticFeedbackContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// `review` payload from the adversarial quality check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReviewContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub issues_count: usize,
    #[serde(default)]
    pub critical_issues: usize,
    #[serde(default)]
    pub major_issues: usize,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub missing_aspects: Vec<Value>,
}

impl ReviewContent {
    /// Whether the reviewer accepted the report.
    pub fn passed(&self) -> bool {
        self.verdict.as_deref() == Some("pass")
    }
}

/// `revision_complete` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RevisionCompleteContent {
    #[serde(default)]
    pub changes_count: usize,
    #[serde(default)]
    pub addressed_issues: Vec<Value>,
    #[serde(default)]
    pub unable_to_address: Vec<Value>,
}

/// Generation-2 event set.
///
/// Unknown discriminators land on `Unknown`; the router then retries the
/// frame against [`LegacyEvent`] before giving up on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResearchEvent {
    ResearchStart {
        #[serde(default)]
        query: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        session_id: Option<String>,
    },
    ResearchStep {
        #[serde(default)]
        content: ResearchStepContent,
    },
    SearchResults {
        #[serde(default)]
        content: SearchResultsContent,
    },
    KnowledgeGraph {
        #[serde(default)]
        content: KnowledgeGraphContent,
    },
    Charts {
        #[serde(default)]
        content: ChartsContent,
    },
    Phase {
        #[serde(default)]
        phase: String,
        #[serde(default)]
        content: String,
    },
    Outline {
        #[serde(default)]
        content: OutlineContent,
    },
    SectionDraft {
        #[serde(default)]
        content: SectionDraftContent,
    },
    ReportDraft {
        #[serde(default)]
        content: ReportDraftContent,
    },
    Code {
        #[serde(default)]
        content: CodeContent,
    },
    CodeResult {
        #[serde(default)]
        content: CodeResultContent,
    },
    CodeFix {
        #[serde(default)]
        content: CodeFixContent,
    },
    Review {
        #[serde(default)]
        content: ReviewContent,
    },
    CriticFeedback {
        #[serde(default)]
        content: CriticFeedbackContent,
    },
    RevisionComplete {
        #[serde(default)]
        content: RevisionCompleteContent,
    },
    ResearchComplete {
        #[serde(default)]
        final_report: String,
        #[serde(default)]
        quality_score: f64,
        #[serde(default)]
        references: Vec<Reference>,
        #[serde(default)]
        iterations: u32,
    },
    StockQuote {
        #[serde(default)]
        content: StockQuote,
    },
    Error {
        #[serde(default)]
        content: String,
    },
    #[serde(other)]
    Unknown,
}

// ============================================================================
// Generation 1 — flat ReAct narrative
// ============================================================================

/// Generation-1 event set.
///
/// Payload fields that the two generations shape differently (a thought's
/// `content` is a plain string in Gen 1 but an `{agent, content}` object in
/// Gen 2) are kept as opaque [`Value`]s; [`payload_text`] extracts the
/// human-readable text either way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegacyEvent {
    Plan(ResearchPlan),
    Thought {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<usize>,
        #[serde(default)]
        content: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        confidence: Option<f64>,
    },
    Action {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Value>,
    },
    Observation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        success: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<Value>,
    },
    Chart {
        #[serde(flatten)]
        chart: Chart,
    },
    DataInsight {
        #[serde(default)]
        insights: Vec<String>,
    },
    Status {
        #[serde(default)]
        content: String,
    },
    ThinkingStep {
        #[serde(default)]
        content: Value,
    },
    SearchResultItem {
        #[serde(default)]
        result: Value,
    },
    Thinking {
        #[serde(default)]
        content: String,
    },
    Answer {
        #[serde(default)]
        content: String,
    },
    FinalAnswer {
        #[serde(default)]
        content: String,
    },
    ReferenceMaterials {
        #[serde(default)]
        content: Vec<Reference>,
    },
    Subqueries {
        #[serde(default)]
        content: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Reserved tool name marking a parallel multi-query search action.
pub const PARALLEL_SEARCH_TOOL: &str = "parallel_search";

/// Extract display text from a payload that is either a plain string or an
/// object wrapping the text in a `content` field.
pub fn payload_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get("content") {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        },
        _ => String::new(),
    }
}
