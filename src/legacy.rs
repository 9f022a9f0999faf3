//! Legacy Trace Builder
//!
//! Applies generation-1 events (the flat ReAct narrative) to the session:
//! plan/thought/action/observation trace entries, coalesced think groups,
//! monotonic text accumulation, and reference materials. Generation-2 frames
//! that double as legacy progress text also route through here.

use serde_json::Value;
use uuid::Uuid;

use docmind_core::{
    payload_text, LegacyEvent, ResearchDetail, Session, ThinkGroup, ThinkGroupKind, TraceKind,
    PARALLEL_SEARCH_TOOL,
};

use crate::store::DetailStore;

/// Apply one legacy event to the session and detail store.
pub fn apply(session: &mut Session, store: &mut DetailStore, event: LegacyEvent) {
    match event {
        LegacyEvent::Plan(plan) => {
            let text = if plan.understanding.is_empty() {
                "Research plan created".to_string()
            } else {
                plan.understanding.clone()
            };
            session.push_trace(TraceKind::Plan, text, None);
            session.plan = Some(plan);
        }
        LegacyEvent::Thought { step, content, .. } => {
            session.push_trace(TraceKind::Thought, payload_text(&content), step);
        }
        LegacyEvent::Action {
            step,
            tool,
            params,
            content,
        } => {
            let tool = tool.or_else(|| {
                content
                    .as_ref()
                    .and_then(|c| c.get("tool"))
                    .and_then(Value::as_str)
                    .map(String::from)
            });
            let text = render_action(tool.as_deref(), params.as_ref(), content.as_ref());
            let entry = session.push_trace(TraceKind::Action, text, step);
            entry.tool = tool;
            entry.tool_params = params;
        }
        LegacyEvent::Observation {
            step,
            tool,
            success,
            result,
            content,
        } => {
            let payload = result.as_ref().or(content.as_ref());
            let text = payload.map(payload_text).unwrap_or_default();
            let detail = payload.and_then(detail_from_payload);
            let entry = session.push_trace(TraceKind::Observation, text, step);
            entry.tool = tool;
            entry.success = success;
            if let Some(detail) = detail {
                let key = Uuid::new_v4().to_string();
                store.insert(&key, detail);
                if let Some(entry) = session.trace.last_mut() {
                    entry.correlation_id = Some(key);
                }
            }
        }
        LegacyEvent::Chart { chart } => {
            session.charts.push(chart);
        }
        LegacyEvent::DataInsight { insights } => {
            session.insights.extend(insights);
        }
        LegacyEvent::Status { content } => {
            push_grouped(session, ThinkGroupKind::Status, content.clone().into(), content);
        }
        LegacyEvent::ThinkingStep { content } => {
            let text = payload_text(&content);
            push_grouped(session, ThinkGroupKind::ThinkingStep, content, text);
        }
        LegacyEvent::SearchResultItem { result } => {
            let text = result
                .get("title")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            push_grouped(session, ThinkGroupKind::SearchResults, result, text);
        }
        LegacyEvent::Thinking { content } => {
            session.thinking.push_str(&content);
        }
        LegacyEvent::Answer { content } | LegacyEvent::FinalAnswer { content } => {
            session.content.push_str(&content);
        }
        LegacyEvent::ReferenceMaterials { content } => {
            // Arrives once, fully formed; always a wholesale replace.
            session.references = content;
        }
        LegacyEvent::Subqueries { content } => {
            if !content.is_empty() {
                let text = format!("Sub-queries: {}", content.join("; "));
                session.push_trace(TraceKind::Thought, text, None);
            }
        }
        LegacyEvent::Unknown => {}
    }
}

/// Append into the newest think group of the same sub-kind, or start a new
/// grouped trace entry. Coalescing keeps bursts of status/search frames from
/// producing one trace entry per token.
pub fn push_grouped(
    session: &mut Session,
    kind: ThinkGroupKind,
    item: Value,
    latest_text: String,
) {
    if let Some(entry) = session.trace.last_mut() {
        if let Some(group) = entry.group.as_mut() {
            if group.kind == kind {
                group.items.push(item);
                if !latest_text.is_empty() {
                    entry.text = latest_text;
                }
                return;
            }
        }
    }
    let entry = session.push_trace(TraceKind::Thought, latest_text, None);
    let mut group = ThinkGroup::new(kind);
    group.items.push(item);
    entry.group = Some(group);
}

/// Render the display text of an action entry. A parallel multi-query search
/// enumerates its queries; a single-tool action names the tool.
fn render_action(tool: Option<&str>, params: Option<&Value>, content: Option<&Value>) -> String {
    if tool == Some(PARALLEL_SEARCH_TOOL) {
        let queries: Vec<String> = params
            .and_then(|p| p.get("queries"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|q| match q {
                        Value::String(s) => Some(s.clone()),
                        Value::Object(map) => map
                            .get("query")
                            .and_then(Value::as_str)
                            .map(String::from),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();
        if queries.is_empty() {
            "Parallel search".to_string()
        } else {
            format!(
                "Parallel search ({} queries): {}",
                queries.len(),
                queries.join(" | ")
            )
        }
    } else if let Some(tool) = tool {
        let query = params
            .and_then(|p| p.get("query"))
            .or_else(|| content.and_then(|c| c.get("query")))
            .and_then(Value::as_str);
        match query {
            Some(q) => format!("Using {}: {}", tool, q),
            None => format!("Using {}", tool),
        }
    } else {
        content.map(payload_text).unwrap_or_default()
    }
}

/// Build a detail record from a structured observation payload. Returns
/// `None` for plain-string results; string fields that fail to resolve are
/// omitted rather than failing the frame.
fn detail_from_payload(payload: &Value) -> Option<ResearchDetail> {
    let map = payload.as_object()?;
    let mut detail = ResearchDetail::default();
    let mut structured = false;

    if let Some(section) = map.get("section").and_then(Value::as_str) {
        detail.section = Some(section.to_string());
        structured = true;
    }
    if let Some(facts) = map.get("facts").and_then(Value::as_array) {
        detail.facts = facts.clone();
        structured = true;
    }
    if let Some(points) = map.get("data_points").and_then(Value::as_array) {
        detail.data_points = points.clone();
        structured = true;
    }
    if let Some(insights) = map.get("insights").and_then(Value::as_array) {
        detail.insights = insights
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect();
        structured = true;
    }
    if let Some(quality) = map.get("source_quality").and_then(Value::as_str) {
        detail.source_quality = Some(quality.to_string());
        structured = true;
    }

    structured.then_some(detail)
}
