//! Event Schema Router
//!
//! Classifies one decoded frame payload and dispatches it to the matching
//! builder. Both protocol generations are tried against every frame: a
//! stream may be pure generation-1, pure generation-2, or an interleaving of
//! both during a backend transition. Anything malformed or unrecognized is
//! reported to the caller for logging and otherwise skipped; a single bad
//! frame never aborts the session.

use serde_json::Value;

use docmind_core::{LegacyEvent, Reference, ResearchEvent, Session};

use crate::error::FrameError;
use crate::legacy;
use crate::phases;
use crate::store::DetailStore;

/// Parse and apply one frame payload. `Err` means the frame was dropped;
/// the session is untouched in that case.
pub fn route(session: &mut Session, store: &mut DetailStore, payload: &str) -> Result<(), FrameError> {
    let value: Value = serde_json::from_str(payload).map_err(|_| FrameError::Malformed {
        raw: payload.to_string(),
    })?;

    // Generation 2 first: its discriminator set is disjoint from generation 1
    // except for frames both handle identically.
    match serde_json::from_value::<ResearchEvent>(value.clone()) {
        Ok(ResearchEvent::Unknown) | Err(_) => {}
        Ok(event) => {
            phases::apply(session, store, event);
            return Ok(());
        }
    }

    match serde_json::from_value::<LegacyEvent>(value.clone()) {
        Ok(LegacyEvent::Unknown) | Err(_) => {}
        Ok(event) => {
            legacy::apply(session, store, event);
            return Ok(());
        }
    }

    if let Some(event) = infer_untyped(&value) {
        legacy::apply(session, store, event);
        return Ok(());
    }

    if let Some(kind) = value.get("type").and_then(Value::as_str) {
        return Err(FrameError::Unrecognized {
            kind: kind.to_string(),
        });
    }
    Err(FrameError::Malformed {
        raw: payload.to_string(),
    })
}

/// Oldest legacy frames carry no `type` discriminator at all; their kind is
/// inferred from which field is present.
fn infer_untyped(value: &Value) -> Option<LegacyEvent> {
    let map = value.as_object()?;
    if map.contains_key("type") {
        return None;
    }
    if let Some(thinking) = map.get("thinking").and_then(Value::as_str) {
        return Some(LegacyEvent::Thinking {
            content: thinking.to_string(),
        });
    }
    if let Some(documents) = map.get("documents") {
        let references: Vec<Reference> =
            serde_json::from_value(documents.clone()).unwrap_or_default();
        return Some(LegacyEvent::ReferenceMaterials {
            content: references,
        });
    }
    None
}
