/// Coverage analysis of the actual graph against the expected-entity index.
///
/// Coverage is fraction-present, never a diff: extra nodes and edges in the
/// graph are ignored here (schema and integrity checks own those). Pages and
/// Sections are matched by node id; ContentItems are matched by their `hash`
/// property, since content ids are not stable across rebuilds. Containment
/// coverage checks CONTAINS edges page→section and section→content-hash.
///
/// An empty index yields 100% across the board plus a warning that the run
/// was vacuous.
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::budget::Deadline;
use crate::enums::{EdgeType, EdgeTypeTag, NodeType};
use crate::expected::ExpectedEntityIndex;
use crate::report::round4;
use crate::schema::required_properties;
use crate::snapshot::GraphSnapshot;

/// Node kinds with required properties, in report order.
const PRIMARY_KINDS: [NodeType; 3] = [NodeType::Page, NodeType::Section, NodeType::ContentItem];

/// Key used for missing containment edges in `missing_entities`.
const CONTAINS_KIND: &str = "CONTAINS";

/// Thresholds and sampling limits for completeness analysis.
#[derive(Debug, Clone)]
pub struct CompletenessConfig {
    /// Minimum per-type node coverage percentage.
    pub node_threshold: f64,
    /// Minimum containment-edge coverage percentage.
    pub edge_threshold: f64,
    /// Minimum required-property coverage percentage.
    pub property_threshold: f64,
    /// Maximum number of missing entities listed per kind in the report.
    pub missing_sample_cap: usize,
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            node_threshold: 95.0,
            edge_threshold: 90.0,
            property_threshold: 95.0,
            missing_sample_cap: 100,
        }
    }
}

/// The completeness section of the final report.
///
/// Percentages are rounded to 4 decimal places at construction so serialized
/// output is byte-stable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessReport {
    /// Coverage percentage per expected node kind (`Page`, `Section`,
    /// `ContentItem`).
    pub node_completeness: BTreeMap<String, f64>,
    /// Coverage percentage of expected containment edges.
    pub edge_completeness: f64,
    /// Required-property coverage per node kind and field, as
    /// `{ kind: { field: pct } }`. Every primary kind appears with all of its
    /// required fields, 100% when the snapshot has no nodes of that kind.
    pub property_completeness: BTreeMap<String, BTreeMap<String, f64>>,
    /// Sampled missing entities keyed by kind (node kinds hold ids or content
    /// hashes, `CONTAINS` holds `source -> target` descriptions), each list
    /// sorted and capped independently. Kinds with nothing missing are absent.
    pub missing_entities: BTreeMap<String, Vec<String>>,
    /// `true` if every coverage metric meets its threshold.
    pub passes_requirements: bool,
    /// Human-readable caveats (empty index, thresholds missed, timeout).
    pub warnings: Vec<String>,
}

/// Compares the snapshot against the expected-entity index.
pub fn analyze_completeness(
    snapshot: &GraphSnapshot,
    expected: &ExpectedEntityIndex,
    config: &CompletenessConfig,
    deadline: &Deadline,
) -> CompletenessReport {
    let mut warnings: Vec<String> = Vec::new();

    if expected.is_empty() {
        warnings.push("expected-entity index is empty; coverage is vacuously 100%".to_owned());
        let mut node_completeness = BTreeMap::new();
        for kind in PRIMARY_KINDS {
            node_completeness.insert(kind.as_str().to_owned(), 100.0);
        }
        return CompletenessReport {
            node_completeness,
            edge_completeness: 100.0,
            property_completeness: vacuous_property_map(),
            missing_entities: BTreeMap::new(),
            passes_requirements: true,
            warnings,
        };
    }

    let actual = ActualIndex::from_snapshot(snapshot);
    let mut missing: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut timed_out = false;

    // Node coverage per kind. Expectation lists are already sorted, so each
    // missing sample comes out sorted too.
    let page_pct = coverage(
        expected.expected_pages.iter().map(String::as_str),
        |id| actual.page_ids.contains(id),
        |id| record_missing(&mut missing, "Page", id.to_owned()),
        deadline,
        &mut timed_out,
    );
    let section_pct = coverage(
        expected.expected_sections().into_iter(),
        |id| actual.section_ids.contains(id),
        |id| record_missing(&mut missing, "Section", id.to_owned()),
        deadline,
        &mut timed_out,
    );
    let content_pct = coverage(
        expected.expected_content_hashes().into_iter(),
        |h| actual.content_hashes.contains(h),
        |h| record_missing(&mut missing, "ContentItem", h.to_owned()),
        deadline,
        &mut timed_out,
    );

    // Containment-edge coverage over expected parent→child instances. The
    // deadline is checked per instance, same as the node loops.
    let mut edge_expected = 0_usize;
    let mut edge_present = 0_usize;
    'pages: for (page, sections) in &expected.expected_sections_by_page {
        for section in sections {
            if deadline.expired() {
                timed_out = true;
                break 'pages;
            }
            edge_expected += 1;
            if actual.contains_pairs.contains(&(page.as_str(), section.as_str())) {
                edge_present += 1;
            } else {
                record_missing(&mut missing, CONTAINS_KIND, format!("{page} -> {section}"));
            }
        }
    }
    'sections: for (section, hashes) in &expected.expected_content_by_section {
        let contained = actual.contained_hashes.get(section.as_str());
        for hash in hashes {
            if deadline.expired() {
                timed_out = true;
                break 'sections;
            }
            edge_expected += 1;
            if contained.is_some_and(|set| set.contains(hash.as_str())) {
                edge_present += 1;
            } else {
                record_missing(
                    &mut missing,
                    CONTAINS_KIND,
                    format!("{section} -> hash {hash}"),
                );
            }
        }
    }
    let edge_pct = percentage(edge_present, edge_expected);

    let property_map = property_coverage(snapshot, deadline, &mut timed_out);

    if timed_out {
        warnings.push(
            "completeness analyzer exceeded its time budget; partial results kept".to_owned(),
        );
    }

    let node_checks = [
        ("Page", page_pct),
        ("Section", section_pct),
        ("ContentItem", content_pct),
    ];
    let mut passes = true;
    for (kind, pct) in node_checks {
        if pct < config.node_threshold {
            passes = false;
            warnings.push(format!(
                "{kind} coverage {pct:.4}% is below the {:.1}% threshold",
                config.node_threshold
            ));
        }
    }
    if edge_pct < config.edge_threshold {
        passes = false;
        warnings.push(format!(
            "containment-edge coverage {edge_pct:.4}% is below the {:.1}% threshold",
            config.edge_threshold
        ));
    }
    // The property gate is per field: every required field of every primary
    // kind must meet the threshold on its own.
    for (kind, fields) in &property_map {
        for (field, pct) in fields {
            if *pct < config.property_threshold {
                passes = false;
                warnings.push(format!(
                    "{kind}.{field} coverage {pct:.4}% is below the {:.1}% threshold",
                    config.property_threshold
                ));
            }
        }
    }

    for sample in missing.values_mut() {
        sample.truncate(config.missing_sample_cap);
    }

    let mut node_completeness = BTreeMap::new();
    node_completeness.insert("Page".to_owned(), round4(page_pct));
    node_completeness.insert("Section".to_owned(), round4(section_pct));
    node_completeness.insert("ContentItem".to_owned(), round4(content_pct));

    CompletenessReport {
        node_completeness,
        edge_completeness: round4(edge_pct),
        property_completeness: property_map,
        missing_entities: missing,
        passes_requirements: passes,
        warnings,
    }
}

fn record_missing(missing: &mut BTreeMap<String, Vec<String>>, kind: &str, entry: String) {
    missing.entry(kind.to_owned()).or_default().push(entry);
}

/// The all-100% property map reported when the expected index is empty.
fn vacuous_property_map() -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut map = BTreeMap::new();
    for kind in PRIMARY_KINDS {
        let fields = required_properties(kind)
            .iter()
            .map(|field| ((*field).to_owned(), 100.0))
            .collect();
        map.insert(kind.as_str().to_owned(), fields);
    }
    map
}

// ---------------------------------------------------------------------------
// Actual-side index
// ---------------------------------------------------------------------------

/// Lookup structures extracted from the snapshot in one pass.
struct ActualIndex<'a> {
    page_ids: HashSet<&'a str>,
    section_ids: HashSet<&'a str>,
    content_hashes: HashSet<&'a str>,
    /// `(source, target)` pairs of CONTAINS edges.
    contains_pairs: HashSet<(&'a str, &'a str)>,
    /// Content hashes reachable from each source via one CONTAINS edge.
    contained_hashes: HashMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> ActualIndex<'a> {
    fn from_snapshot(snapshot: &'a GraphSnapshot) -> Self {
        let mut page_ids = HashSet::new();
        let mut section_ids = HashSet::new();
        let mut content_hashes = HashSet::new();
        let mut hash_by_id: HashMap<&str, &str> = HashMap::new();

        for node in &snapshot.nodes {
            let Some(kind) = node.node_type.known() else {
                continue;
            };
            match kind {
                NodeType::Page => {
                    page_ids.insert(node.id.as_str());
                }
                NodeType::Section => {
                    section_ids.insert(node.id.as_str());
                }
                NodeType::ContentItem => {
                    if let Some(hash) = node.property_str("hash") {
                        content_hashes.insert(hash);
                        hash_by_id.insert(node.id.as_str(), hash);
                    }
                }
                NodeType::Topic | NodeType::Category | NodeType::Persona | NodeType::Entity => {}
            }
        }

        let mut contains_pairs = HashSet::new();
        let mut contained_hashes: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for edge in &snapshot.edges {
            if edge.edge_type != EdgeTypeTag::Known(EdgeType::Contains) {
                continue;
            }
            contains_pairs.insert((edge.source_id.as_str(), edge.target_id.as_str()));
            if let Some(hash) = hash_by_id.get(edge.target_id.as_str()) {
                contained_hashes
                    .entry(edge.source_id.as_str())
                    .or_default()
                    .insert(hash);
            }
        }

        Self {
            page_ids,
            section_ids,
            content_hashes,
            contains_pairs,
            contained_hashes,
        }
    }
}

// ---------------------------------------------------------------------------
// Coverage math
// ---------------------------------------------------------------------------

/// Walks expected items, recording each missing one, and returns the coverage
/// percentage. An empty expectation set is 100%. Stops at the deadline; the
/// percentage then covers only the items actually processed.
fn coverage<'a>(
    expected: impl Iterator<Item = &'a str>,
    present: impl Fn(&str) -> bool,
    mut on_missing: impl FnMut(&str),
    deadline: &Deadline,
    timed_out: &mut bool,
) -> f64 {
    let mut total = 0_usize;
    let mut found = 0_usize;
    for item in expected {
        if deadline.expired() {
            *timed_out = true;
            break;
        }
        total += 1;
        if present(item) {
            found += 1;
        } else {
            on_missing(item);
        }
    }
    percentage(found, total)
}

fn percentage(found: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        found as f64 / total as f64 * 100.0
    }
}

/// Per-(kind, field) percentage of nodes carrying the required property with
/// a non-null value. Every primary kind appears with all its required fields;
/// a field over zero nodes of its kind is 100%.
fn property_coverage(
    snapshot: &GraphSnapshot,
    deadline: &Deadline,
    timed_out: &mut bool,
) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut counts: BTreeMap<(&'static str, &'static str), (usize, usize)> = BTreeMap::new();
    for kind in PRIMARY_KINDS {
        for field in required_properties(kind) {
            counts.insert((kind.as_str(), field), (0, 0));
        }
    }

    for node in &snapshot.nodes {
        if deadline.expired() {
            *timed_out = true;
            break;
        }
        let Some(node_type) = node.node_type.known() else {
            continue;
        };
        for field in required_properties(node_type) {
            let Some((present, total)) = counts.get_mut(&(node_type.as_str(), *field)) else {
                continue;
            };
            *total += 1;
            if node.property(field).is_some_and(|v| !v.is_null()) {
                *present += 1;
            }
        }
    }

    let mut map: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for ((kind, field), (present, total)) in counts {
        map.entry(kind.to_owned())
            .or_default()
            .insert(field.to_owned(), round4(percentage(present, total)));
    }
    map
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
