//! DocMind Research
//!
//! Incremental reconstruction engine for DocMind research streams. The
//! backend agent pipeline emits a one-directional, append-only event stream
//! (`data: <json>` frames ending in a `[DONE]` sentinel); this crate turns
//! that stream into a consistent, queryable in-memory [`Session`] while it
//! is still arriving.
//!
//! Two protocol generations are supported concurrently: the flat ReAct
//! narrative (plan/thought/action/observation) and the phase-oriented deep
//! research protocol (planning through revision). A single stream may carry
//! either or both.
//!
//! ## Module Organization
//!
//! - `decoder` - chunk-boundary-agnostic SSE frame extraction
//! - `router` - frame classification and dispatch across both generations
//! - `legacy` - generation-1 trace builder
//! - `phases` - generation-2 phase state machine
//! - `store` - keyed detail records for on-demand inspection
//! - `engine` - the per-turn facade tying decoder, router, and session together
//! - `client` - HTTP client driving an engine from a live backend stream
//! - `config` - backend connection settings and request body
//! - `error` - stream and frame error types
//!
//! ## Basic Usage
//!
//! ```no_run
//! use docmind_research::{ClientConfig, ResearchClient, ResearchRequest};
//!
//! # async fn run() -> Result<(), docmind_research::StreamError> {
//! let client = ResearchClient::new(ClientConfig::new("http://127.0.0.1:8000"));
//! let session = client.run(ResearchRequest::new("quantum error correction")).await?;
//! println!("{}", session.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod legacy;
pub mod phases;
pub mod router;
pub mod store;

// ── Engine ─────────────────────────────────────────────────────────────
pub use engine::{FeedStatus, FrameErrorHook, StreamEngine};

// ── Client & Configuration ─────────────────────────────────────────────
pub use client::ResearchClient;
pub use config::{ClientConfig, ResearchRequest, DEFAULT_STALL_TIMEOUT_SECS};

// ── Decoding ───────────────────────────────────────────────────────────
pub use decoder::FrameDecoder;

// ── Detail Lookup ──────────────────────────────────────────────────────
pub use store::DetailStore;

// ── Errors ─────────────────────────────────────────────────────────────
pub use error::{FrameError, StreamError, StreamResult};

// ── Session Model (re-exported from docmind-core) ──────────────────────
pub use docmind_core::{
    PhaseKind, PhaseStatus, ReactTraceEntry, ResearchDetail, ResearchPhase, Session,
    SessionStatus, TraceKind,
};
