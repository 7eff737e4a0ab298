//! Schema records and boundary decoding of raw introspection output.
//!
//! The graph store reports its schema through introspection procedures whose
//! rows arrive as loosely-typed nested maps and lists. Everything in this
//! module converts those rows into typed records up front, so a missing or
//! mistyped field surfaces as a [`SchemaError`] here instead of deep inside
//! the formatting code.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};

pub const VISUALIZATION: &str = "schema visualization";
pub const NODE_PROPERTIES: &str = "node properties";
pub const RELATIONSHIP_PROPERTIES: &str = "relationship properties";

// ── Typed Schema ─────────────────────────────────────────────────

/// A property observed on a label or relationship type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub required: bool,
}

impl fmt::Display for PropertySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let qualifier = if self.required { "required" } else { "optional" };
        write!(f, "{} ({qualifier})", self.name)
    }
}

/// A node label with its properties in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub label: String,
    pub properties: Vec<PropertySpec>,
}

/// A relationship type with its properties in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRelationship {
    pub rel_type: String,
    pub properties: Vec<PropertySpec>,
}

/// A single observed connection pattern between two labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEdge {
    pub from_label: String,
    pub rel_type: String,
    pub to_label: String,
}

impl fmt::Display for SchemaEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}->{}", self.from_label, self.rel_type, self.to_label)
    }
}

// ── Raw Records ──────────────────────────────────────────────────

/// Any introspection entity that carries a `name`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedEntity {
    pub name: String,
}

/// A `(source, type, target)` tuple from the visualization output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawRelationship(pub NamedEntity, pub String, pub NamedEntity);

impl From<RawRelationship> for SchemaEdge {
    fn from(raw: RawRelationship) -> Self {
        let RawRelationship(source, rel_type, target) = raw;
        Self {
            from_label: source.name,
            rel_type,
            to_label: target.name,
        }
    }
}

/// One row of the per-label property listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePropertyRecord {
    pub node_labels: Vec<String>,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub mandatory: Option<bool>,
}

/// One row of the per-type property listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelPropertyRecord {
    pub rel_type: String,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub mandatory: Option<bool>,
}

// ── Decoding ─────────────────────────────────────────────────────

/// Decode the `nodes` field of the single visualization record.
pub fn decode_visualization_nodes(raw: &Value) -> Result<Vec<NamedEntity>> {
    let field = visualization_field(raw, "nodes")?;
    Vec::<NamedEntity>::deserialize(field).map_err(|e| invalid(VISUALIZATION, e))
}

/// Decode the `relationships` field of the single visualization record.
pub fn decode_visualization_edges(raw: &Value) -> Result<Vec<SchemaEdge>> {
    let field = visualization_field(raw, "relationships")?;
    let tuples = Vec::<RawRelationship>::deserialize(field).map_err(|e| invalid(VISUALIZATION, e))?;
    Ok(tuples.into_iter().map(SchemaEdge::from).collect())
}

/// Decode the flat per-label property listing.
pub fn decode_node_properties(raw: &Value) -> Result<Vec<NodePropertyRecord>> {
    expect_sequence(raw, NODE_PROPERTIES)?;
    Vec::<NodePropertyRecord>::deserialize(raw).map_err(|e| invalid(NODE_PROPERTIES, e))
}

/// Decode the flat per-type property listing.
pub fn decode_relationship_properties(raw: &Value) -> Result<Vec<RelPropertyRecord>> {
    expect_sequence(raw, RELATIONSHIP_PROPERTIES)?;
    Vec::<RelPropertyRecord>::deserialize(raw).map_err(|e| invalid(RELATIONSHIP_PROPERTIES, e))
}

fn expect_sequence<'a>(raw: &'a Value, section: &'static str) -> Result<&'a Vec<Value>> {
    raw.as_array().ok_or_else(|| SchemaError::Invalid {
        section,
        reason: format!("expected a sequence of records, got {}", kind_of(raw)),
    })
}

fn first_record(raw: &Value) -> Result<&Map<String, Value>> {
    let records = expect_sequence(raw, VISUALIZATION)?;
    let first = records.first().ok_or(SchemaError::MissingRecord {
        section: VISUALIZATION,
    })?;
    first.as_object().ok_or_else(|| SchemaError::Invalid {
        section: VISUALIZATION,
        reason: format!("expected a record, got {}", kind_of(first)),
    })
}

fn visualization_field<'a>(raw: &'a Value, field: &'static str) -> Result<&'a Value> {
    first_record(raw)?
        .get(field)
        .ok_or(SchemaError::MissingField {
            section: VISUALIZATION,
            field,
        })
}

fn invalid(section: &'static str, err: serde_json::Error) -> SchemaError {
    SchemaError::Invalid {
        section,
        reason: err.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a record",
    }
}

// ── Grouping ─────────────────────────────────────────────────────

/// Recover the bare type name from a quoted store identifier.
///
/// Drops exactly two leading characters, then any enclosing backticks:
/// ``:`KNOWS` `` becomes `KNOWS`.
pub fn strip_rel_type(quoted: &str) -> String {
    let unprefixed: String = quoted.chars().skip(2).collect();
    unprefixed.trim_matches('`').to_string()
}

/// Group per-label property rows by label, preserving first-seen order.
///
/// Only the first entry of `nodeLabels` is used as the grouping key, so a
/// node carrying several labels is attributed to its first label alone.
/// Repeated label/property pairs are kept as separate entries.
pub fn group_node_properties(records: &[NodePropertyRecord]) -> Result<Vec<SchemaNode>> {
    let mut grouped = Grouped::default();
    for record in records {
        let label = record
            .node_labels
            .first()
            .ok_or(SchemaError::MissingField {
                section: NODE_PROPERTIES,
                field: "nodeLabels[0]",
            })?;
        grouped.push(label, record.property_name.as_deref(), record.mandatory);
    }
    Ok(grouped
        .into_entries()
        .map(|(label, properties)| SchemaNode { label, properties })
        .collect())
}

/// Group per-type property rows by bare type name, preserving first-seen order.
pub fn group_relationship_properties(
    records: &[RelPropertyRecord],
) -> Result<Vec<SchemaRelationship>> {
    let mut grouped = Grouped::default();
    for record in records {
        let rel_type = strip_rel_type(&record.rel_type);
        if rel_type.is_empty() {
            return Err(SchemaError::Invalid {
                section: RELATIONSHIP_PROPERTIES,
                reason: format!("unrecognized relationship type `{}`", record.rel_type),
            });
        }
        grouped.push(&rel_type, record.property_name.as_deref(), record.mandatory);
    }
    Ok(grouped
        .into_entries()
        .map(|(rel_type, properties)| SchemaRelationship {
            rel_type,
            properties,
        })
        .collect())
}

/// Insertion-ordered grouping of properties under a key.
#[derive(Default)]
struct Grouped {
    index: HashMap<String, usize>,
    entries: Vec<(String, Vec<PropertySpec>)>,
}

impl Grouped {
    fn push(&mut self, key: &str, property: Option<&str>, mandatory: Option<bool>) {
        let slot = match self.index.get(key).copied() {
            Some(slot) => slot,
            None => {
                self.entries.push((key.to_string(), Vec::new()));
                self.index.insert(key.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        // A null property name only registers the key.
        if let Some(name) = property {
            self.entries[slot].1.push(PropertySpec {
                name: name.to_string(),
                required: mandatory.unwrap_or(false),
            });
        }
    }

    fn into_entries(self) -> impl Iterator<Item = (String, Vec<PropertySpec>)> {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strip_rel_type() {
        assert_eq!(strip_rel_type(":`KNOWS`"), "KNOWS");
        assert_eq!(strip_rel_type(":`LIVES_IN`"), "LIVES_IN");
        assert_eq!(strip_rel_type(":`"), "");
    }

    #[test]
    fn test_decode_visualization_nodes() {
        let raw = json!([{"nodes": [{"name": "Person"}, {"name": "City", "indexes": []}]}]);
        let nodes = decode_visualization_nodes(&raw).unwrap();
        assert_eq!(
            nodes,
            vec![
                NamedEntity {
                    name: "Person".to_string()
                },
                NamedEntity {
                    name: "City".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_missing_nodes_field() {
        let raw = json!([{"relationships": []}]);
        let err = decode_visualization_nodes(&raw).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingField {
                section: VISUALIZATION,
                field: "nodes"
            }
        );
    }

    #[test]
    fn test_empty_visualization_sequence() {
        let err = decode_visualization_edges(&json!([])).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingRecord {
                section: VISUALIZATION
            }
        );
    }

    #[test]
    fn test_visualization_not_a_sequence() {
        let err = decode_visualization_nodes(&json!({"nodes": []})).unwrap_err();
        assert!(matches!(err, SchemaError::Invalid { .. }));
    }

    #[test]
    fn test_decode_edges_rejects_short_tuple() {
        let raw = json!([{"nodes": [], "relationships": [[{"name": "A"}, "R"]]}]);
        assert!(matches!(
            decode_visualization_edges(&raw),
            Err(SchemaError::Invalid { .. })
        ));
    }

    #[test]
    fn test_decode_node_properties_missing_labels() {
        let raw = json!([{"propertyName": "name", "mandatory": true}]);
        let err = decode_node_properties(&raw).unwrap_err();
        match err {
            SchemaError::Invalid { section, reason } => {
                assert_eq!(section, NODE_PROPERTIES);
                assert!(reason.contains("nodeLabels"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_group_uses_first_label_only() {
        let records = vec![
            NodePropertyRecord {
                node_labels: vec!["Person".to_string(), "Employee".to_string()],
                property_name: Some("name".to_string()),
                mandatory: Some(true),
            },
            NodePropertyRecord {
                node_labels: vec!["Employee".to_string()],
                property_name: Some("salary".to_string()),
                mandatory: Some(false),
            },
        ];
        let nodes = group_node_properties(&records).unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].label, "Person");
        assert_eq!(nodes[0].properties.len(), 1);
        assert_eq!(nodes[1].label, "Employee");
        assert_eq!(nodes[1].properties[0].name, "salary");
    }

    #[test]
    fn test_group_keeps_duplicates() {
        let records = vec![
            NodePropertyRecord {
                node_labels: vec!["Person".to_string()],
                property_name: Some("name".to_string()),
                mandatory: Some(true),
            },
            NodePropertyRecord {
                node_labels: vec!["Person".to_string()],
                property_name: Some("name".to_string()),
                mandatory: Some(false),
            },
        ];
        let nodes = group_node_properties(&records).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(
            nodes[0].properties,
            vec![
                PropertySpec {
                    name: "name".to_string(),
                    required: true
                },
                PropertySpec {
                    name: "name".to_string(),
                    required: false
                },
            ]
        );
    }

    #[test]
    fn test_group_empty_label_list_is_malformed() {
        let records = vec![NodePropertyRecord {
            node_labels: vec![],
            property_name: None,
            mandatory: None,
        }];
        assert!(matches!(
            group_node_properties(&records),
            Err(SchemaError::MissingField { .. })
        ));
    }

    #[test]
    fn test_null_property_registers_type() {
        let records = vec![
            RelPropertyRecord {
                rel_type: ":`KNOWS`".to_string(),
                property_name: None,
                mandatory: Some(false),
            },
            RelPropertyRecord {
                rel_type: ":`LIVES_IN`".to_string(),
                property_name: Some("since".to_string()),
                mandatory: None,
            },
        ];
        let rels = group_relationship_properties(&records).unwrap();
        assert_eq!(rels[0].rel_type, "KNOWS");
        assert!(rels[0].properties.is_empty());
        assert_eq!(rels[1].rel_type, "LIVES_IN");
        assert!(!rels[1].properties[0].required);
    }

    #[test]
    fn test_property_display() {
        let required = PropertySpec {
            name: "name".to_string(),
            required: true,
        };
        let optional = PropertySpec {
            name: "age".to_string(),
            required: false,
        };
        assert_eq!(required.to_string(), "name (required)");
        assert_eq!(optional.to_string(), "age (optional)");
    }
}
