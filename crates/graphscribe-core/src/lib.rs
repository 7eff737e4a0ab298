//! graphscribe-core: Schema records and schema text formatting.
//!
//! This crate turns the raw output of the graph store's schema introspection
//! procedures into the text block that is embedded in a statement-generation
//! prompt:
//! - Typed records for labels, relationship types, properties and edges
//! - Boundary decoding of raw introspection rows into those records
//! - Rendering of the three schema sections
//!
//! It performs no I/O; fetching the raw rows is the job of `graphscribe-graph`.

pub mod error;
pub mod format;
pub mod schema;

pub use error::SchemaError;
pub use format::{
    compose_schema_text, parse_node_labels, parse_node_properties, parse_relationship_edges,
    parse_relationship_properties, FormattedSchema,
};
pub use schema::{PropertySpec, SchemaEdge, SchemaNode, SchemaRelationship};
