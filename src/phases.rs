//! Phase State Machine
//!
//! Applies generation-2 events to the session's typed phase list and the
//! detail store. One phase instance exists per kind; attachment frames never
//! carry a phase id, so the live phase is always resolved by kind at the
//! moment the frame arrives. A re-entrant phase of the same kind folds into
//! the existing instance; that is the documented wire contract, not a bug to
//! repair here.

use docmind_core::{
    KnowledgeGraph, PhaseKind, PhaseStatus, ReportSection, ResearchEvent, ResearchStepContent,
    Session, ThinkGroupKind, TraceKind,
};

use crate::legacy;
use crate::store::DetailStore;

/// Apply one generation-2 event to the session and detail store.
pub fn apply(session: &mut Session, store: &mut DetailStore, event: ResearchEvent) {
    match event {
        ResearchEvent::ResearchStart { query, .. } => {
            // The only event that clears prior generation-2 state.
            session.phases.clear();
            store.clear();
            if session.query.is_empty() {
                session.query = query;
            }
        }
        ResearchEvent::ResearchStep { content } => {
            apply_step(session, store, content);
        }
        ResearchEvent::SearchResults { content } => {
            match session.phase_of(PhaseKind::Searching).map(|p| p.id.clone()) {
                Some(key) => {
                    store.merge_search_results(&key, content.results, content.is_incremental);
                }
                None => {
                    // No live searching phase to attach to; surface the hits
                    // in the legacy trace instead of dropping them.
                    for result in content.results {
                        if let Ok(value) = serde_json::to_value(&result) {
                            let text = result.title.clone();
                            legacy::push_grouped(
                                session,
                                ThinkGroupKind::SearchResults,
                                value,
                                text,
                            );
                        }
                    }
                }
            }
        }
        ResearchEvent::KnowledgeGraph { content } => {
            let target = session
                .phase_of(PhaseKind::Analyzing)
                .or_else(|| session.phase_of(PhaseKind::Searching))
                .map(|p| p.id.clone());
            if let Some(key) = target {
                store.set_knowledge_graph(
                    &key,
                    KnowledgeGraph {
                        nodes: content.graph.nodes,
                        edges: content.graph.edges,
                        stats: content.stats,
                    },
                );
            }
        }
        ResearchEvent::Charts { content } => {
            if let Some(key) = session.phase_of(PhaseKind::Analyzing).map(|p| p.id.clone()) {
                store.add_charts(&key, &content.charts);
            }
            session.charts.extend(content.charts);
        }
        ResearchEvent::Phase { phase, content } => {
            if let Some(kind) = PhaseKind::from_phase_name(&phase) {
                let target = ensure_phase(session, store, kind, None);
                target.status.advance_to(PhaseStatus::Running);
                if !content.is_empty() {
                    target.subtitle = content.clone();
                }
            }
            // Coarse narrative markers double as legacy progress text.
            if !content.is_empty() {
                session.push_trace(TraceKind::Thought, content, None);
            }
        }
        ResearchEvent::Outline { content } => {
            let titles: Vec<&str> = content
                .outline
                .iter()
                .map(|s| s.title.as_str())
                .filter(|t| !t.is_empty())
                .collect();
            let text = if titles.is_empty() {
                "Report outline prepared".to_string()
            } else {
                format!("Report outline: {}", titles.join(" / "))
            };
            session.push_trace(TraceKind::Plan, text, None);
        }
        ResearchEvent::SectionDraft { content } => {
            let title = content.section_title.clone().unwrap_or_default();
            let text = match content.word_count {
                Some(words) => format!("Drafted section \"{}\" ({} words)", title, words),
                None => format!("Drafted section \"{}\"", title),
            };
            session.push_trace(TraceKind::Observation, text, None);
            let key = session.report_phase_mut().map(|p| p.id.clone());
            if let (Some(key), Some(id)) = (key, content.section_id) {
                store.upsert_section(
                    &key,
                    ReportSection {
                        id,
                        title,
                        content: String::new(),
                        word_count: content.word_count,
                    },
                );
            }
        }
        ResearchEvent::ReportDraft { content } => {
            let text = match content.word_count {
                Some(words) => format!("Report draft assembled ({} words)", words),
                None => "Report draft assembled".to_string(),
            };
            session.push_trace(TraceKind::Observation, text, None);
            if let Some(phase) = session.report_phase_mut() {
                phase.status.advance_to(PhaseStatus::Completed);
            }
        }
        ResearchEvent::Code { content } => {
            let text = if content.purpose.is_empty() {
                format!("Running {} analysis", content.language)
            } else {
                format!("Running {} analysis: {}", content.language, content.purpose)
            };
            let entry = session.push_trace(TraceKind::Action, text, None);
            entry.tool = Some("code_interpreter".to_string());
            entry.tool_params = serde_json::to_value(&content).ok();
        }
        ResearchEvent::CodeResult { content } => {
            let text = if content.output.is_empty() {
                if content.success {
                    "Code execution succeeded".to_string()
                } else {
                    "Code execution failed".to_string()
                }
            } else {
                content.output.clone()
            };
            let entry = session.push_trace(TraceKind::Observation, text, None);
            entry.tool = Some("code_interpreter".to_string());
            entry.success = Some(content.success);
        }
        ResearchEvent::CodeFix { content } => {
            let description = if content.fix_description.is_empty() {
                content.error_analysis
            } else {
                content.fix_description
            };
            let text = format!("Self-corrected code (retry {}): {}", content.retry, description);
            let entry = session.push_trace(TraceKind::Observation, text, None);
            entry.tool = Some("code_interpreter".to_string());
        }
        ResearchEvent::CriticFeedback { content } => {
            let severity = content.severity.as_deref().unwrap_or("issue");
            let mut text = format!("Review issue ({}): {}", severity, content.description);
            if let Some(suggestion) = &content.suggestion {
                text.push_str(&format!(" Suggestion: {}", suggestion));
            }
            session.push_trace(TraceKind::Observation, text, None);
        }
        ResearchEvent::Review { content } => {
            let passed = content.passed();
            let text = if passed {
                format!("Review passed (score {:.1})", content.quality_score)
            } else {
                format!(
                    "Review found {} issues ({} critical): {}",
                    content.issues_count, content.critical_issues, content.summary
                )
            };
            session.push_trace(TraceKind::Observation, text, None);
            if passed {
                if let Some(phase) = session.phase_of_mut(PhaseKind::Reviewing) {
                    phase.status.advance_to(PhaseStatus::Completed);
                }
            }
        }
        ResearchEvent::RevisionComplete { content } => {
            // Trace only; revising is completed by research_complete.
            let text = format!("Revision applied ({} changes)", content.changes_count);
            session.push_trace(TraceKind::Observation, text, None);
        }
        ResearchEvent::ResearchComplete {
            final_report,
            references,
            ..
        } => {
            session.content = final_report.clone();
            if !references.is_empty() {
                session.references = references;
            }
            for phase in &mut session.phases {
                phase.status.advance_to(PhaseStatus::Completed);
            }
            if let Some(key) = session.report_phase_mut().map(|p| p.id.clone()) {
                store.set_report(&key, final_report);
            }
        }
        ResearchEvent::StockQuote { content } => {
            session.stock_quote = Some(content);
        }
        ResearchEvent::Error { content } => {
            // Upstream application error: visible in the trace, not a
            // transport failure. The stream may continue afterward.
            let entry = session.push_trace(
                TraceKind::Observation,
                format!("Error: {}", content),
                None,
            );
            entry.success = Some(false);
        }
        ResearchEvent::Unknown => {}
    }
}

/// Create-or-update the phase for a `research_step` frame. Only fields the
/// frame carries are merged; status never moves backwards.
fn apply_step(session: &mut Session, store: &mut DetailStore, content: ResearchStepContent) {
    let Some(kind) = PhaseKind::from_step_type(&content.step_type) else {
        tracing::debug!(step_type = %content.step_type, "Ignoring unknown research step type");
        return;
    };
    let phase = ensure_phase(session, store, kind, content.step_id.as_deref());
    if let Some(title) = content.title {
        phase.title = title;
    }
    if let Some(subtitle) = content.subtitle {
        phase.subtitle = subtitle;
    }
    if let Some(status) = content.status.as_deref().and_then(PhaseStatus::parse) {
        phase.status.advance_to(status);
    }
    for (key, value) in content.stats {
        phase.stats.insert(key, value);
    }
}

/// Resolve the single live phase for a kind, creating it (and its lazy
/// detail record) on first reference.
fn ensure_phase<'a>(
    session: &'a mut Session,
    store: &mut DetailStore,
    kind: PhaseKind,
    step_id: Option<&str>,
) -> &'a mut docmind_core::ResearchPhase {
    if let Some(index) = session.phases.iter().position(|p| p.kind == kind) {
        return &mut session.phases[index];
    }
    let id = step_id
        .map(String::from)
        .unwrap_or_else(|| format!("phase_{}", kind.slug()));
    store.entry(&id);
    session
        .phases
        .push(docmind_core::ResearchPhase::new(id, kind));
    let index = session.phases.len() - 1;
    &mut session.phases[index]
}
