/// Node and edge type enums for the content knowledge graph.
///
/// Each enum serializes to/from `PascalCase` JSON strings matching the
/// upstream graph builder's vocabulary. `NodeTypeTag` and `EdgeTypeTag`
/// additionally accept unrecognized strings via their `Unknown` variant:
/// rejection of unknown types is a validation concern, not a serde concern,
/// so a malformed snapshot still deserializes and yields diagnostics.
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

// ---------------------------------------------------------------------------
// Node types
// ---------------------------------------------------------------------------

/// Known node types in the content graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    /// A crawled web page.
    Page,
    /// A structural section within a page.
    Section,
    /// A leaf content block (paragraph, list, table cell) with a stable hash.
    ContentItem,
    /// A topic extracted by the enrichment stage.
    Topic,
    /// A taxonomy category grouping topics.
    Category,
    /// An audience persona targeted by content.
    Persona,
    /// A named entity mentioned in content.
    Entity,
}

impl NodeType {
    /// All known node types, in a fixed order used for deterministic iteration.
    pub const ALL: [NodeType; 7] = [
        NodeType::Page,
        NodeType::Section,
        NodeType::ContentItem,
        NodeType::Topic,
        NodeType::Category,
        NodeType::Persona,
        NodeType::Entity,
    ];

    /// Returns the canonical string form of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Page => "Page",
            NodeType::Section => "Section",
            NodeType::ContentItem => "ContentItem",
            NodeType::Topic => "Topic",
            NodeType::Category => "Category",
            NodeType::Persona => "Persona",
            NodeType::Entity => "Entity",
        }
    }

    /// Returns `true` for taxonomy types that may legitimately be pre-seeded
    /// without any connecting edges (Topic, Category, Persona).
    ///
    /// Degree-0 nodes of these types are warnings rather than errors.
    pub fn is_taxonomy(self) -> bool {
        matches!(self, NodeType::Topic | NodeType::Category | NodeType::Persona)
    }
}

/// The `type` field on a node: either a known [`NodeType`] or an unknown string.
///
/// Unknown strings are accepted during deserialization and rejected by the
/// schema validator with a CRITICAL issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeTypeTag {
    /// A node type recognized by this version of kgaudit-core.
    Known(NodeType),
    /// A node type string this crate does not recognize.
    Unknown(String),
}

impl NodeTypeTag {
    /// Returns the string representation of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            NodeTypeTag::Known(t) => t.as_str(),
            NodeTypeTag::Unknown(s) => s.as_str(),
        }
    }

    /// Returns the known node type, or `None` for unknown tags.
    pub fn known(&self) -> Option<NodeType> {
        match self {
            NodeTypeTag::Known(t) => Some(*t),
            NodeTypeTag::Unknown(_) => None,
        }
    }
}

/// An absent `type` key deserializes to `Unknown("")`; the schema validator
/// rejects it like any other unrecognized type string.
impl Default for NodeTypeTag {
    fn default() -> Self {
        NodeTypeTag::Unknown(String::new())
    }
}

impl AsRef<str> for NodeTypeTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for NodeTypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeTypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl de::Visitor<'_> for TagVisitor {
            type Value = NodeTypeTag;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string representing a node type")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(match v {
                    "Page" => NodeTypeTag::Known(NodeType::Page),
                    "Section" => NodeTypeTag::Known(NodeType::Section),
                    "ContentItem" => NodeTypeTag::Known(NodeType::ContentItem),
                    "Topic" => NodeTypeTag::Known(NodeType::Topic),
                    "Category" => NodeTypeTag::Known(NodeType::Category),
                    "Persona" => NodeTypeTag::Known(NodeType::Persona),
                    "Entity" => NodeTypeTag::Known(NodeType::Entity),
                    other => NodeTypeTag::Unknown(other.to_owned()),
                })
            }
        }

        deserializer.deserialize_str(TagVisitor)
    }
}

// ---------------------------------------------------------------------------
// Edge types
// ---------------------------------------------------------------------------

/// Known edge types in the content graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EdgeType {
    /// Page → Section, Section → ContentItem containment.
    Contains,
    /// A hyperlink between pages.
    LinksTo,
    /// Content → Topic assignment.
    HasTopic,
    /// Topic → Category membership.
    BelongsTo,
    /// Content → Persona targeting.
    Targets,
    /// Content → Entity mention.
    Mentions,
    /// Child → parent taxonomy link.
    ChildOf,
}

impl EdgeType {
    /// The hierarchical edge types whose per-type subgraphs must form forests.
    pub const HIERARCHICAL: [EdgeType; 3] =
        [EdgeType::Contains, EdgeType::BelongsTo, EdgeType::ChildOf];

    /// Returns the canonical string form of the type.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Contains => "CONTAINS",
            EdgeType::LinksTo => "LINKS_TO",
            EdgeType::HasTopic => "HAS_TOPIC",
            EdgeType::BelongsTo => "BELONGS_TO",
            EdgeType::Targets => "TARGETS",
            EdgeType::Mentions => "MENTIONS",
            EdgeType::ChildOf => "CHILD_OF",
        }
    }

    /// Returns `true` for edge types whose subgraph must be acyclic.
    pub fn is_hierarchical(self) -> bool {
        matches!(
            self,
            EdgeType::Contains | EdgeType::BelongsTo | EdgeType::ChildOf
        )
    }

    /// Returns `true` for semantic edge types that must carry a confidence
    /// or relevance score.
    pub fn is_semantic(self) -> bool {
        matches!(
            self,
            EdgeType::HasTopic | EdgeType::Targets | EdgeType::Mentions
        )
    }
}

/// The `type` field on an edge: either a known [`EdgeType`] or an unknown string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeTypeTag {
    /// An edge type recognized by this version of kgaudit-core.
    Known(EdgeType),
    /// An edge type string this crate does not recognize.
    Unknown(String),
}

impl EdgeTypeTag {
    /// Returns the string representation of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            EdgeTypeTag::Known(t) => t.as_str(),
            EdgeTypeTag::Unknown(s) => s.as_str(),
        }
    }

    /// Returns the known edge type, or `None` for unknown tags.
    pub fn known(&self) -> Option<EdgeType> {
        match self {
            EdgeTypeTag::Known(t) => Some(*t),
            EdgeTypeTag::Unknown(_) => None,
        }
    }
}

/// An absent `type` key deserializes to `Unknown("")`; the schema validator
/// rejects it like any other unrecognized type string.
impl Default for EdgeTypeTag {
    fn default() -> Self {
        EdgeTypeTag::Unknown(String::new())
    }
}

impl AsRef<str> for EdgeTypeTag {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for EdgeTypeTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EdgeTypeTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TagVisitor;

        impl de::Visitor<'_> for TagVisitor {
            type Value = EdgeTypeTag;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string representing an edge type")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(match v {
                    "CONTAINS" => EdgeTypeTag::Known(EdgeType::Contains),
                    "LINKS_TO" => EdgeTypeTag::Known(EdgeType::LinksTo),
                    "HAS_TOPIC" => EdgeTypeTag::Known(EdgeType::HasTopic),
                    "BELONGS_TO" => EdgeTypeTag::Known(EdgeType::BelongsTo),
                    "TARGETS" => EdgeTypeTag::Known(EdgeType::Targets),
                    "MENTIONS" => EdgeTypeTag::Known(EdgeType::Mentions),
                    "CHILD_OF" => EdgeTypeTag::Known(EdgeType::ChildOf),
                    other => EdgeTypeTag::Unknown(other.to_owned()),
                })
            }
        }

        deserializer.deserialize_str(TagVisitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
