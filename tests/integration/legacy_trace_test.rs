//! Legacy Trace Integration Tests
//!
//! Drives the generation-1 ReAct protocol over the wire format: the flat
//! plan/thought/action/observation narrative, think-group coalescing, and
//! the observation detail lookup path.

use docmind_research::{SessionStatus, StreamEngine, TraceKind};

fn frame(json: &str) -> String {
    format!("data: {}\n", json)
}

#[test]
fn test_full_react_narrative() {
    let mut engine = StreamEngine::new("tesla q2 deliveries");
    let frames = [
        r#"{"type":"plan","understanding":"User wants delivery figures","strategy":"search filings","sub_queries":[{"query":"tesla q2 2026 deliveries","purpose":"primary figure"}]}"#,
        r#"{"type":"thought","step":1,"content":"I need the latest filing"}"#,
        r#"{"type":"action","step":2,"tool":"web_search","params":{"query":"tesla q2 deliveries"}}"#,
        r#"{"type":"observation","step":3,"tool":"web_search","success":true,"result":"Found 8 articles"}"#,
        r#"{"type":"data_insight","insights":["deliveries up 6% QoQ"]}"#,
        r#"{"type":"chart","title":"Deliveries by quarter","chart_type":"bar"}"#,
        r#"{"type":"answer","content":"Tesla delivered "}"#,
        r#"{"type":"answer","content":"466k vehicles."}"#,
        r#"{"type":"reference_materials","content":[{"name":"IR page","url":"https://ir.tesla.com"}]}"#,
    ];
    for f in frames {
        engine.feed(&frame(f));
    }
    engine.feed("data: [DONE]\n");

    let session = engine.session();
    assert_eq!(session.status, SessionStatus::Completed);

    let kinds: Vec<TraceKind> = session.trace.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TraceKind::Plan,
            TraceKind::Thought,
            TraceKind::Action,
            TraceKind::Observation,
        ]
    );
    assert_eq!(session.trace[2].tool.as_deref(), Some("web_search"));
    assert_eq!(session.trace[3].success, Some(true));

    let plan = session.plan.as_ref().unwrap();
    assert_eq!(plan.sub_queries.len(), 1);

    assert_eq!(session.insights, vec!["deliveries up 6% QoQ"]);
    assert_eq!(session.charts.len(), 1);
    assert_eq!(session.content, "Tesla delivered 466k vehicles.");
    assert_eq!(session.references.len(), 1);
}

#[test]
fn test_parallel_search_action_enumerates_queries() {
    let mut engine = StreamEngine::new("q");
    engine.feed(&frame(
        r#"{"type":"action","tool":"parallel_search","params":{"queries":["a","b","c"]}}"#,
    ));
    assert_eq!(
        engine.session().trace[0].text,
        "Parallel search (3 queries): a | b | c"
    );
}

#[test]
fn test_status_bursts_coalesce_into_one_entry() {
    let mut engine = StreamEngine::new("q");
    for status in ["Connecting...", "Searching...", "Ranking results..."] {
        engine.feed(&frame(&format!(
            r#"{{"type":"status","content":"{}"}}"#,
            status
        )));
    }
    engine.feed(&frame(r#"{"type":"search_result_item","result":{"title":"t1"}}"#));
    engine.feed(&frame(r#"{"type":"search_result_item","result":{"title":"t2"}}"#));

    let session = engine.session();
    assert_eq!(session.trace.len(), 2);
    assert_eq!(session.trace[0].group.as_ref().unwrap().items.len(), 3);
    assert_eq!(session.trace[0].text, "Ranking results...");
    assert_eq!(session.trace[1].group.as_ref().unwrap().items.len(), 2);
}

#[test]
fn test_observation_detail_lookup_via_correlation_id() {
    let mut engine = StreamEngine::new("q");
    engine.feed(&frame(
        r#"{"type":"observation","tool":"web_search","success":true,"result":{"section":"Financials","facts":[{"claim":"revenue up"}],"data_points":[{"x":1}],"insights":["margin pressure"],"source_quality":"medium"}}"#,
    ));

    let entry = &engine.session().trace[0];
    assert_eq!(entry.kind, TraceKind::Observation);
    let key = entry.correlation_id.as_deref().expect("correlation id");

    let detail = engine.detail(key).expect("detail record");
    assert_eq!(detail.section.as_deref(), Some("Financials"));
    assert_eq!(detail.facts.len(), 1);
    assert_eq!(detail.data_points.len(), 1);
    assert_eq!(detail.source_quality.as_deref(), Some("medium"));
    assert_eq!(detail.insights, vec!["margin pressure"]);
    assert!(engine.session().insights.is_empty());
}

#[test]
fn test_untyped_legacy_frames_are_inferred() {
    let mut engine = StreamEngine::new("q");
    engine.feed(&frame(r#"{"thinking":"working on it"}"#));
    engine.feed(&frame(r#"{"documents":[{"name":"doc1"}]}"#));
    assert_eq!(engine.session().thinking, "working on it");
    assert_eq!(engine.session().references.len(), 1);
}

#[test]
fn test_legacy_and_phase_frames_interleave() {
    let mut engine = StreamEngine::new("q");
    engine.feed(&frame(
        r#"{"type":"research_step","content":{"step_type":"searching","status":"running"}}"#,
    ));
    engine.feed(&frame(r#"{"type":"thought","content":"cross-checking"}"#));
    engine.feed(&frame(r#"{"type":"thinking","content":"..."}"#));
    engine.feed("data: [DONE]\n");

    let session = engine.session();
    assert_eq!(session.phases.len(), 1);
    assert_eq!(session.trace.len(), 1);
    assert_eq!(session.thinking, "...");
}
