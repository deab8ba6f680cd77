/// The expected-entity index produced by the upstream parsing stage.
///
/// Completeness analysis compares the actual graph against this index. The
/// index is optional: when it is absent, the orchestrator skips completeness
/// and records an INFO note instead.
///
/// All collections are `BTreeSet`/`BTreeMap` so derived unions and missing
/// samples iterate in a deterministic order.
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Entities the parser expected the graph builder to materialize.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpectedEntityIndex {
    /// Page ids expected to exist as `Page` nodes.
    #[serde(default)]
    pub expected_pages: BTreeSet<String>,

    /// Section ids expected per page, keyed by page id.
    #[serde(default)]
    pub expected_sections_by_page: BTreeMap<String, BTreeSet<String>>,

    /// Content hashes expected per section, keyed by section id.
    #[serde(default)]
    pub expected_content_by_section: BTreeMap<String, BTreeSet<String>>,
}

impl ExpectedEntityIndex {
    /// Union of all expected section ids across pages.
    pub fn expected_sections(&self) -> BTreeSet<&str> {
        self.expected_sections_by_page
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Union of all expected content hashes across sections.
    pub fn expected_content_hashes(&self) -> BTreeSet<&str> {
        self.expected_content_by_section
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Total number of expected parent→child containment instances
    /// (page→section plus section→content-hash).
    pub fn expected_edge_count(&self) -> usize {
        let sections: usize = self
            .expected_sections_by_page
            .values()
            .map(BTreeSet::len)
            .sum();
        let content: usize = self
            .expected_content_by_section
            .values()
            .map(BTreeSet::len)
            .sum();
        sections + content
    }

    /// Returns `true` if the index carries no expectations at all.
    pub fn is_empty(&self) -> bool {
        self.expected_pages.is_empty()
            && self.expected_sections_by_page.is_empty()
            && self.expected_content_by_section.is_empty()
    }
}
