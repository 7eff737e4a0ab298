//! graphscribe-ingest: Free text to graph mutations.
//!
//! Fetches the current graph schema, asks a language model for a Cypher
//! `MERGE` statement that models the entities and relationships in a piece of
//! text, and applies that statement to the graph.

pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod prompt;
pub mod repl;
