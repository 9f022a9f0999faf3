//! Phase Machine Integration Tests
//!
//! Drives the generation-2 protocol over the wire format: phase uniqueness
//! across repeated steps, the incremental/replace rule for search results,
//! and the full planning-through-revision lifecycle including a failed
//! review round.

use docmind_research::{PhaseKind, PhaseStatus, StreamEngine};

fn frame(json: &str) -> String {
    format!("data: {}\n", json)
}

#[test]
fn test_phase_uniqueness_under_repeated_steps() {
    let mut engine = StreamEngine::new("q");
    for status in ["pending", "running", "running", "completed"] {
        engine.feed(&frame(&format!(
            r#"{{"type":"research_step","content":{{"step_type":"analyzing","status":"{}","stats":{{"charts_count":2}}}}}}"#,
            status
        )));
    }
    engine.feed("data: [DONE]\n");

    let session = engine.session();
    assert_eq!(session.phases.len(), 1);
    assert_eq!(session.phases[0].kind, PhaseKind::Analyzing);
    assert_eq!(session.phases[0].status, PhaseStatus::Completed);
    assert_eq!(session.phases[0].stats.get("charts_count"), Some(&2));
}

#[test]
fn test_incremental_vs_replace_search_results() {
    let mut engine = StreamEngine::new("q");
    engine.feed(&frame(
        r#"{"type":"research_step","content":{"step_id":"s1","step_type":"searching","status":"running"}}"#,
    ));
    // Non-incremental, then incremental, then non-incremental again.
    engine.feed(&frame(
        r#"{"type":"search_results","content":{"results":[{"title":"a"}],"isIncremental":false}}"#,
    ));
    engine.feed(&frame(
        r#"{"type":"search_results","content":{"results":[{"title":"b"},{"title":"c"}],"isIncremental":true}}"#,
    ));
    let titles: Vec<String> = engine
        .detail("s1")
        .unwrap()
        .search_results
        .iter()
        .map(|r| r.title.clone())
        .collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    engine.feed(&frame(
        r#"{"type":"search_results","content":{"results":[{"title":"d"}],"isIncremental":false}}"#,
    ));
    let titles: Vec<String> = engine
        .detail("s1")
        .unwrap()
        .search_results
        .iter()
        .map(|r| r.title.clone())
        .collect();
    assert_eq!(titles, vec!["d"]);
}

#[test]
fn test_full_research_lifecycle_with_failed_review() {
    let mut engine = StreamEngine::new("q");
    let frames = [
        r#"{"type":"research_start","query":"llm inference costs"}"#,
        r#"{"type":"research_step","content":{"step_type":"planning","status":"completed"}}"#,
        r#"{"type":"outline","content":{"outline":[{"id":"s1","title":"Overview"},{"id":"s2","title":"Pricing"}]}}"#,
        r#"{"type":"research_step","content":{"step_id":"search1","step_type":"searching","status":"running"}}"#,
        r#"{"type":"search_results","content":{"results":[{"title":"t1","url":"https://e.x"}],"isIncremental":false}}"#,
        r#"{"type":"knowledge_graph","content":{"graph":{"nodes":[{"id":"n1"}],"edges":[]},"stats":{"entities_count":1}}}"#,
        r#"{"type":"research_step","content":{"step_type":"analyzing","status":"running"}}"#,
        r#"{"type":"charts","content":{"charts":[{"title":"Cost per token","type":"line"}]}}"#,
        r#"{"type":"research_step","content":{"step_type":"writing","status":"running"}}"#,
        r#"{"type":"section_draft","content":{"section_id":"s1","section_title":"Overview","word_count":420}}"#,
        r#"{"type":"report_draft","content":{"executive_summary":"...","word_count":2100}}"#,
        r#"{"type":"research_step","content":{"step_type":"reviewing","status":"running"}}"#,
        r#"{"type":"review","content":{"verdict":"needs_revision","issues_count":2,"critical_issues":1,"summary":"unsourced claims"}}"#,
        r#"{"type":"phase","phase":"re_researching","content":"Filling gaps"}"#,
        r#"{"type":"revision_complete","content":{"changes_count":4}}"#,
        r#"{"type":"review","content":{"verdict":"pass","quality_score":8.7}}"#,
        r##"{"type":"research_complete","final_report":"# Final","quality_score":8.7,"references":[{"name":"r1","url":"https://e.x"}],"iterations":2}"##,
    ];
    for f in frames {
        engine.feed(&frame(f));
    }
    engine.feed("data: [DONE]\n");

    let session = engine.session();
    // One phase per kind despite the re-research round.
    let kinds: Vec<PhaseKind> = session.phases.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PhaseKind::Planning,
            PhaseKind::Searching,
            PhaseKind::Analyzing,
            PhaseKind::Writing,
            PhaseKind::Reviewing,
            PhaseKind::ReResearching,
        ]
    );
    assert!(session
        .phases
        .iter()
        .all(|p| p.status == PhaseStatus::Completed));

    assert_eq!(session.content, "# Final");
    assert_eq!(session.references.len(), 1);
    assert_eq!(session.charts.len(), 1);

    // Writing detail accumulated the section draft and the final report.
    let writing_id = session.phase_of(PhaseKind::Writing).unwrap().id.clone();
    let detail = engine.detail(&writing_id).unwrap();
    assert_eq!(detail.sections.len(), 1);
    assert_eq!(detail.sections[0].title, "Overview");
    assert_eq!(detail.streaming_report.as_deref(), Some("# Final"));

    // Searching detail holds results and graph.
    let detail = engine.detail("search1").unwrap();
    assert_eq!(detail.search_results.len(), 1);
    assert!(detail.knowledge_graph.is_some());

    // The failed review left a visible trace entry before the pass.
    assert!(session
        .trace
        .iter()
        .any(|e| e.text.contains("unsourced claims")));
}

#[test]
fn test_research_start_clears_previous_turn_state() {
    let mut engine = StreamEngine::new("q");
    engine.feed(&frame(
        r#"{"type":"research_step","content":{"step_id":"old","step_type":"searching","status":"running"}}"#,
    ));
    engine.feed(&frame(
        r#"{"type":"search_results","content":{"results":[{"title":"stale"}],"isIncremental":false}}"#,
    ));
    engine.feed(&frame(r#"{"type":"research_start","query":"fresh"}"#));

    assert!(engine.session().phases.is_empty());
    assert!(engine.detail("old").is_none());
}

#[test]
fn test_stock_quote_attaches_to_session() {
    let mut engine = StreamEngine::new("q");
    engine.feed(&frame(
        r#"{"type":"stock_quote","content":{"code":"AAPL","name":"Apple","price":230.1,"change":"-1.2"}}"#,
    ));
    let quote = engine.session().stock_quote.as_ref().unwrap();
    assert_eq!(quote.code, "AAPL");
    assert_eq!(quote.price, "230.1");
}
