//! graphscribe-graph — Neo4j client for graphscribe.
//!
//! All reads and writes against the graph store flow through [`GraphClient`]:
//! executing generated statements, and running the store's schema
//! introspection procedures whose output `graphscribe-core` formats into
//! prompt text.

pub mod client;
pub mod introspection;

pub use client::{GraphClient, GraphConfig, GraphError, Params};
