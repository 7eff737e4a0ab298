//! Schema introspection through the store's built-in procedures.
//!
//! Each `fetch_raw_*` call returns the procedure's rows as a JSON array of
//! records, the shape `graphscribe-core` decodes. Visualization output is
//! projected down to names in Cypher so that virtual nodes and relationships
//! never have to be deserialized on this side.

use neo4rs::{query, Row};
use serde_json::Value;

use graphscribe_core::FormattedSchema;

use crate::client::{GraphClient, GraphError};

const SCHEMA_VISUALIZATION: &str = "CALL db.schema.visualization() YIELD nodes, relationships
     RETURN [n IN nodes | {name: n.name}] AS nodes,
            [r IN relationships |
               [{name: startNode(r).name}, type(r), {name: endNode(r).name}]] AS relationships";

const NODE_TYPE_PROPERTIES: &str = "CALL db.schema.nodeTypeProperties()
     YIELD nodeLabels, propertyName, mandatory
     RETURN nodeLabels, propertyName, mandatory";

const REL_TYPE_PROPERTIES: &str = "CALL db.schema.relTypeProperties()
     YIELD relType, propertyName, mandatory
     RETURN relType, propertyName, mandatory";

impl GraphClient {
    /// Labels and relationship patterns, as one visualization record.
    pub async fn fetch_raw_schema(&self) -> Result<Value, GraphError> {
        self.fetch_records(SCHEMA_VISUALIZATION).await
    }

    /// One record per (label set, property) pair.
    pub async fn fetch_raw_node_properties(&self) -> Result<Value, GraphError> {
        self.fetch_records(NODE_TYPE_PROPERTIES).await
    }

    /// One record per (relationship type, property) pair.
    pub async fn fetch_raw_relationship_properties(&self) -> Result<Value, GraphError> {
        self.fetch_records(REL_TYPE_PROPERTIES).await
    }

    /// Fetch and format the current schema.
    ///
    /// Rebuilt on every call; nothing is cached between calls.
    pub async fn fetch_schema(&self) -> Result<FormattedSchema, GraphError> {
        let visualization = self.fetch_raw_schema().await?;
        let node_props = self.fetch_raw_node_properties().await?;
        let rel_props = self.fetch_raw_relationship_properties().await?;

        Ok(FormattedSchema::from_raw(
            &visualization,
            &node_props,
            &rel_props,
        )?)
    }

    async fn fetch_records(&self, cypher: &str) -> Result<Value, GraphError> {
        let rows = self.query_rows(query(cypher)).await?;
        rows_to_json(&rows)
    }
}

fn rows_to_json(rows: &[Row]) -> Result<Value, GraphError> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let record: Value = row.to().map_err(|e| {
            GraphError::Serialization(format!("Failed to deserialize introspection row: {e}"))
        })?;
        records.push(record);
    }
    Ok(Value::Array(records))
}
