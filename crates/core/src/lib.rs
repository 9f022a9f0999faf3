//! DocMind Core
//!
//! Foundational data model and event types for the DocMind research stream
//! workspace. This crate has zero dependencies on application-level code
//! (HTTP client, stream engine, runtime).
//!
//! ## Module Organization
//!
//! - `session` - Reconstructed session model (`Session`, `ResearchPhase`, `ReactTraceEntry`)
//! - `events` - Wire event types for both protocol generations (`ResearchEvent`, `LegacyEvent`)
//!
//! ## Design Principles
//!
//! 1. **Zero external dependencies beyond serde/chrono** - keeps build times minimal
//! 2. **Closed event enums with `Unknown` fallthrough** - new backend event kinds never break old clients
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod events;
pub mod session;

// ── Session Model ──────────────────────────────────────────────────────
pub use session::{
    Chart, KnowledgeGraph, PhaseKind, PhaseStatus, ReactTraceEntry, Reference, ReportSection,
    ResearchDetail, ResearchPhase, ResearchPlan, SearchResult, Session, SessionStatus, StockQuote,
    SubQuery, ThinkGroup, ThinkGroupKind, TraceKind,
};

// ── Wire Events ────────────────────────────────────────────────────────
pub use events::{
    payload_text, ChartsContent, CodeContent, CodeFixContent, CodeResultContent,
    CriticFeedbackContent, GraphPayload, KnowledgeGraphContent, LegacyEvent, OutlineContent,
    OutlineSection, ReportDraftContent, ResearchEvent, ResearchStepContent, ReviewContent,
    RevisionCompleteContent, SearchResultsContent, SectionDraftContent, PARALLEL_SEARCH_TOOL,
};
