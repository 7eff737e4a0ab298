//! Rendering of schema records into prompt-ready text.
//!
//! The `parse_*` functions take the raw introspection output (a JSON array of
//! rows, as returned by the graph client) and return one text block each.
//! [`compose_schema_text`] joins those blocks into the final schema section of
//! the prompt.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::schema::{
    decode_node_properties, decode_relationship_properties, decode_visualization_edges,
    decode_visualization_nodes, group_node_properties, group_relationship_properties,
    PropertySpec, SchemaEdge, SchemaNode, SchemaRelationship,
};

pub const NODE_SECTION: &str = "NODE LABELS & PROPERTIES";
pub const RELATIONSHIP_SECTION: &str = "RELATIONSHIP LABELS & PROPERTIES";
pub const EDGE_SECTION: &str = "RELATIONSHIPS";

const PROPERTY_BULLET: &str = "  - ";

// ── Raw → Text ───────────────────────────────────────────────────

/// Node label names, one per line, in the order the store reported them.
pub fn parse_node_labels(raw: &Value) -> Result<String> {
    let nodes = decode_visualization_nodes(raw)?;
    Ok(nodes
        .iter()
        .map(|n| n.name.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Relationship patterns rendered as `Source-TYPE->Target`, one per line.
pub fn parse_relationship_edges(raw: &Value) -> Result<String> {
    let edges = decode_visualization_edges(raw)?;
    Ok(render_edges(&edges))
}

/// Per-label property blocks.
pub fn parse_node_properties(raw: &Value) -> Result<String> {
    let records = decode_node_properties(raw)?;
    let nodes = group_node_properties(&records)?;
    Ok(render_nodes(&nodes))
}

/// Per-type property blocks.
pub fn parse_relationship_properties(raw: &Value) -> Result<String> {
    let records = decode_relationship_properties(raw)?;
    let rels = group_relationship_properties(&records)?;
    Ok(render_relationships(&rels))
}

// ── Records → Text ───────────────────────────────────────────────

pub fn render_edges(edges: &[SchemaEdge]) -> String {
    edges
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_nodes(nodes: &[SchemaNode]) -> String {
    nodes
        .iter()
        .map(|n| render_block(&n.label, &n.properties))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_relationships(rels: &[SchemaRelationship]) -> String {
    rels.iter()
        .map(|r| render_block(&r.rel_type, &r.properties))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(header: &str, properties: &[PropertySpec]) -> String {
    let mut block = header.to_string();
    for property in properties {
        block.push('\n');
        block.push_str(PROPERTY_BULLET);
        block.push_str(&property.to_string());
    }
    block
}

// ── Composition ──────────────────────────────────────────────────

/// Join the schema blocks into the three named prompt sections.
///
/// The node section is the property listing, followed by any label from
/// `node_labels` that the property listing does not mention. Each section is
/// its header, its body, and a blank line.
pub fn compose_schema_text(
    node_labels: &str,
    node_props: &str,
    rel_edges: &str,
    rel_props: &str,
) -> String {
    let node_body = merge_node_labels(node_labels, node_props);

    let mut text = String::new();
    for (header, body) in [
        (NODE_SECTION, node_body.as_str()),
        (RELATIONSHIP_SECTION, rel_props),
        (EDGE_SECTION, rel_edges),
    ] {
        text.push_str(header);
        text.push_str(":\n");
        text.push_str(body);
        text.push_str("\n\n");
    }
    text
}

fn merge_node_labels(node_labels: &str, node_props: &str) -> String {
    let described: HashSet<&str> = node_props
        .lines()
        .filter(|line| !line.starts_with(PROPERTY_BULLET))
        .collect();

    let mut lines: Vec<&str> = node_props.lines().collect();
    lines.extend(
        node_labels
            .lines()
            .filter(|label| !label.is_empty() && !described.contains(label)),
    );
    lines.join("\n")
}

/// The four schema text blocks for one fetch of the store's schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattedSchema {
    pub node_labels: String,
    pub node_properties: String,
    pub relationship_properties: String,
    pub relationship_edges: String,
}

impl FormattedSchema {
    /// Format all four blocks from raw introspection output.
    pub fn from_raw(visualization: &Value, node_props: &Value, rel_props: &Value) -> Result<Self> {
        let schema = Self {
            node_labels: parse_node_labels(visualization)?,
            node_properties: parse_node_properties(node_props)?,
            relationship_properties: parse_relationship_properties(rel_props)?,
            relationship_edges: parse_relationship_edges(visualization)?,
        };
        tracing::debug!(
            labels = schema.node_labels.lines().count(),
            edges = schema.relationship_edges.lines().count(),
            "Formatted graph schema"
        );
        Ok(schema)
    }

    pub fn text(&self) -> String {
        compose_schema_text(
            &self.node_labels,
            &self.node_properties,
            &self.relationship_edges,
            &self.relationship_properties,
        )
    }
}

impl fmt::Display for FormattedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use serde_json::json;

    fn visualization() -> Value {
        json!([{
            "nodes": [{"name": "Person"}, {"name": "City"}],
            "relationships": [[{"name": "Person"}, "LIVES_IN", {"name": "City"}]]
        }])
    }

    #[test]
    fn test_parse_node_labels() {
        assert_eq!(parse_node_labels(&visualization()).unwrap(), "Person\nCity");
    }

    #[test]
    fn test_parse_node_labels_one_line_per_node() {
        let raw = json!([{"nodes": [{"name": "A"}, {"name": "B"}, {"name": "A"}]}]);
        let text = parse_node_labels(&raw).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["A", "B", "A"]);
    }

    #[test]
    fn test_parse_relationship_edges() {
        assert_eq!(
            parse_relationship_edges(&visualization()).unwrap(),
            "Person-LIVES_IN->City"
        );
    }

    #[test]
    fn test_edges_are_not_escaped() {
        let raw = json!([{
            "nodes": [],
            "relationships": [
                [{"name": "Big-Co"}, "OWNS->", {"name": "Sub Co"}],
                [{"name": "Sub Co"}, "PART_OF", {"name": "Big-Co"}]
            ]
        }]);
        assert_eq!(
            parse_relationship_edges(&raw).unwrap(),
            "Big-Co-OWNS->->Sub Co\nSub Co-PART_OF->Big-Co"
        );
    }

    #[test]
    fn test_parse_edges_missing_field() {
        let raw = json!([{"nodes": []}]);
        assert!(matches!(
            parse_relationship_edges(&raw),
            Err(SchemaError::MissingField {
                field: "relationships",
                ..
            })
        ));
    }

    #[test]
    fn test_parse_node_properties() {
        let raw = json!([
            {"nodeLabels": ["Person"], "propertyName": "name", "mandatory": true},
            {"nodeLabels": ["Person"], "propertyName": "age", "mandatory": false}
        ]);
        assert_eq!(
            parse_node_properties(&raw).unwrap(),
            "Person\n  - name (required)\n  - age (optional)"
        );
    }

    #[test]
    fn test_parse_node_properties_grouping_is_stable() {
        let raw = json!([
            {"nodeType": ":`Person`", "nodeLabels": ["Person"], "propertyName": "name", "propertyTypes": ["String"], "mandatory": true},
            {"nodeType": ":`City`", "nodeLabels": ["City"], "propertyName": "name", "propertyTypes": ["String"], "mandatory": true},
            {"nodeType": ":`Person`", "nodeLabels": ["Person"], "propertyName": "age", "propertyTypes": ["Long"], "mandatory": false},
            {"nodeType": ":`Tag`", "nodeLabels": ["Tag"], "propertyName": null, "propertyTypes": null, "mandatory": false}
        ]);
        assert_eq!(
            parse_node_properties(&raw).unwrap(),
            "Person\n  - name (required)\n  - age (optional)\nCity\n  - name (required)\nTag"
        );
    }

    #[test]
    fn test_parse_relationship_properties() {
        let raw = json!([
            {"relType": ":`LIVES_IN`", "propertyName": "since", "mandatory": false},
            {"relType": ":`KNOWS`", "propertyName": null, "mandatory": false},
            {"relType": ":`LIVES_IN`", "propertyName": "verified", "mandatory": true}
        ]);
        assert_eq!(
            parse_relationship_properties(&raw).unwrap(),
            "LIVES_IN\n  - since (optional)\n  - verified (required)\nKNOWS"
        );
    }

    #[test]
    fn test_parse_relationship_properties_malformed() {
        let raw = json!([{"propertyName": "since", "mandatory": false}]);
        assert!(matches!(
            parse_relationship_properties(&raw),
            Err(SchemaError::Invalid { .. })
        ));
    }

    #[test]
    fn test_empty_listings_render_empty() {
        assert_eq!(parse_node_properties(&json!([])).unwrap(), "");
        assert_eq!(parse_relationship_properties(&json!([])).unwrap(), "");
    }

    #[test]
    fn test_compose_schema_text() {
        let text = compose_schema_text(
            "Person\nCity",
            "Person\n  - name (required)\nCity",
            "Person-LIVES_IN->City",
            "LIVES_IN\n  - since (optional)",
        );
        assert_eq!(
            text,
            "NODE LABELS & PROPERTIES:\nPerson\n  - name (required)\nCity\n\n\
             RELATIONSHIP LABELS & PROPERTIES:\nLIVES_IN\n  - since (optional)\n\n\
             RELATIONSHIPS:\nPerson-LIVES_IN->City\n\n"
        );
    }

    #[test]
    fn test_compose_adds_labels_without_properties() {
        let text = compose_schema_text("Person\nCity", "Person\n  - name (required)", "", "");
        assert!(text.starts_with("NODE LABELS & PROPERTIES:\nPerson\n  - name (required)\nCity\n\n"));
    }

    #[test]
    fn test_formatted_schema_from_raw() {
        let node_props = json!([
            {"nodeLabels": ["Person"], "propertyName": "name", "mandatory": true}
        ]);
        let rel_props = json!([{"relType": ":`LIVES_IN`", "propertyName": null, "mandatory": false}]);

        let schema = FormattedSchema::from_raw(&visualization(), &node_props, &rel_props).unwrap();
        assert_eq!(schema.node_labels, "Person\nCity");
        assert_eq!(schema.relationship_properties, "LIVES_IN");
        assert_eq!(
            schema.to_string(),
            "NODE LABELS & PROPERTIES:\nPerson\n  - name (required)\nCity\n\n\
             RELATIONSHIP LABELS & PROPERTIES:\nLIVES_IN\n\n\
             RELATIONSHIPS:\nPerson-LIVES_IN->City\n\n"
        );
    }

    #[test]
    fn test_formatted_schema_aborts_on_malformed_input() {
        let err = FormattedSchema::from_raw(&json!([{}]), &json!([]), &json!([])).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField { field: "nodes", .. }));
    }
}
