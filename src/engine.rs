//! Stream Engine
//!
//! The per-turn facade: owns one session, its detail store, and the frame
//! decoder, and advances all three as raw transport chunks arrive. One
//! engine per request; all mutation happens synchronously inside [`feed`],
//! so frames are applied in strict arrival order.
//!
//! [`feed`]: StreamEngine::feed

use uuid::Uuid;

use docmind_core::{ResearchDetail, Session, SessionStatus};

use crate::decoder::FrameDecoder;
use crate::error::{FrameError, StreamError};
use crate::router;
use crate::store::DetailStore;

/// Hook invoked for each dropped frame. Logging only; dropped frames are
/// never fatal.
pub type FrameErrorHook = Box<dyn Fn(&FrameError) + Send>;

/// Result of feeding one chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// The stream is still open; more chunks are expected.
    Open,
    /// A terminal condition was reached; further chunks are ignored.
    Finished,
}

pub struct StreamEngine {
    session: Session,
    store: DetailStore,
    decoder: FrameDecoder,
    on_frame_error: Option<FrameErrorHook>,
}

impl StreamEngine {
    /// Create an engine for a new research turn.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            session: Session::new(Uuid::new_v4().to_string(), query),
            store: DetailStore::new(),
            decoder: FrameDecoder::new(),
            on_frame_error: None,
        }
    }

    /// Install a hook observing dropped frames.
    pub fn with_frame_error_hook(mut self, hook: impl Fn(&FrameError) + Send + 'static) -> Self {
        self.on_frame_error = Some(Box::new(hook));
        self
    }

    /// Decode one transport chunk and apply every frame it completes, in
    /// arrival order. Accepts raw bytes: chunk boundaries may fall anywhere,
    /// including inside a multi-byte character. Returns whether the stream
    /// is still open.
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> FeedStatus {
        if !self.session.is_streaming() {
            return FeedStatus::Finished;
        }
        for frame in self.decoder.push(chunk.as_ref()) {
            if let Err(error) = router::route(&mut self.session, &mut self.store, &frame) {
                tracing::debug!(%error, "Dropping frame");
                if let Some(hook) = &self.on_frame_error {
                    hook(&error);
                }
            }
        }
        if self.decoder.is_finished() {
            self.session.status = SessionStatus::Completed;
            tracing::info!(session_id = %self.session.id, "Research stream completed");
            FeedStatus::Finished
        } else {
            FeedStatus::Open
        }
    }

    /// The reconstructed session. Partial while the stream is open.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consume the engine, keeping the session.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Look up the detail record for a phase id or observation correlation id.
    pub fn detail(&self, key: &str) -> Option<&ResearchDetail> {
        self.store.get(key)
    }

    /// Close the session normally. Used when the transport ends cleanly
    /// without a terminal sentinel.
    pub fn finish(&mut self) {
        if self.session.is_streaming() {
            self.session.status = SessionStatus::Completed;
        }
    }

    /// Abort mid-flight. The session keeps whatever partial state it
    /// reached; no rollback.
    pub fn cancel(&mut self) {
        if self.session.is_streaming() {
            self.session.status = SessionStatus::Cancelled;
            tracing::info!(session_id = %self.session.id, "Research stream cancelled");
        }
    }

    /// Record a transport failure. Distinct from an upstream `error` event,
    /// which stays in the trace without closing the session.
    pub fn fail(&mut self, error: &StreamError) {
        if self.session.is_streaming() {
            self.session.status = SessionStatus::ConnectionLost;
            self.session.failure = Some(error.to_string());
        }
    }

    pub fn is_finished(&self) -> bool {
        !self.session.is_streaming()
    }
}
