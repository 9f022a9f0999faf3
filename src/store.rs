//! Detail Correlation Store
//!
//! Keyed lookup from a phase id or observation correlation id to its rich
//! detail record. Records are created lazily on first write; later writes
//! patch individual fields without clobbering fields the incoming frame did
//! not carry. Nothing is evicted while the session lives; `research_start`
//! clears the store for a new turn.

use std::collections::HashMap;

use docmind_core::{Chart, KnowledgeGraph, ReportSection, ResearchDetail, SearchResult};

#[derive(Debug, Default)]
pub struct DetailStore {
    records: HashMap<String, ResearchDetail>,
}

impl DetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the detail record for a phase id or correlation id.
    pub fn get(&self, key: &str) -> Option<&ResearchDetail> {
        self.records.get(key)
    }

    /// Fetch-or-create the record for a key.
    pub fn entry(&mut self, key: &str) -> &mut ResearchDetail {
        self.records.entry(key.to_string()).or_default()
    }

    /// Insert a fully-formed record, as minted for observation payloads.
    pub fn insert(&mut self, key: impl Into<String>, detail: ResearchDetail) {
        self.records.insert(key.into(), detail);
    }

    /// Merge search results into a key's record. A non-incremental batch
    /// replaces the list wholesale; an incremental batch appends.
    pub fn merge_search_results(
        &mut self,
        key: &str,
        results: Vec<SearchResult>,
        incremental: bool,
    ) {
        let detail = self.entry(key);
        if incremental {
            detail.search_results.extend(results);
        } else {
            detail.search_results = results;
        }
    }

    /// Replace a key's knowledge graph snapshot.
    pub fn set_knowledge_graph(&mut self, key: &str, graph: KnowledgeGraph) {
        self.entry(key).knowledge_graph = Some(graph);
    }

    /// Append charts to a key's record.
    pub fn add_charts(&mut self, key: &str, charts: &[Chart]) {
        self.entry(key).charts.extend(charts.iter().cloned());
    }

    /// Record a drafted section, replacing an earlier draft with the same id.
    pub fn upsert_section(&mut self, key: &str, section: ReportSection) {
        let detail = self.entry(key);
        if let Some(existing) = detail.sections.iter_mut().find(|s| s.id == section.id) {
            *existing = section;
        } else {
            detail.sections.push(section);
        }
    }

    /// Store the final report text on a key's record.
    pub fn set_report(&mut self, key: &str, report: impl Into<String>) {
        self.entry(key).streaming_report = Some(report.into());
    }

    /// Drop all records. Only `research_start` does this.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
