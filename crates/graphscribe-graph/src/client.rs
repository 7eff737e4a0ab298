//! Neo4j connection management and statement execution.

use std::collections::HashMap;

use neo4rs::{query, BoltType, ConfigBuilder, Graph, Query, Row};

use graphscribe_core::SchemaError;

/// Named parameters bound to a statement.
pub type Params = HashMap<String, BoltType>;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Unsupported database target `{database}`: only the default database can be queried")]
    UnsupportedDatabase { database: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "neo4j".to_string(),
            max_connections: 4,
            fetch_size: 256,
        }
    }
}

/// Client for a single Neo4j deployment, scoped to its default database.
///
/// Constructed once at process start and passed by reference to whatever
/// needs it. Each call borrows a pooled connection for its own duration only.
pub struct GraphClient {
    graph: Graph,
    uri: String,
}

impl GraphClient {
    /// Connect to Neo4j and verify the server is reachable.
    ///
    /// Failure here is fatal to the caller; there is no retry.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let client = Self {
            graph,
            uri: config.uri.clone(),
        };
        client.verify_connectivity().await?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(client)
    }

    /// Round-trip a trivial statement so that bad addresses and bad
    /// credentials fail at construction time.
    async fn verify_connectivity(&self) -> Result<(), GraphError> {
        self.graph
            .run(query("RETURN 1"))
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))
    }

    /// Execute a statement against the default database and collect its rows.
    ///
    /// `database` must be `None`: targeting any other database is rejected
    /// before a connection is touched.
    pub async fn execute(
        &self,
        statement: &str,
        params: Option<Params>,
        database: Option<&str>,
    ) -> Result<Vec<Row>, GraphError> {
        ensure_default_database(database)?;

        let mut q = query(statement);
        for (key, value) in params.unwrap_or_default() {
            q = q.param(&key, value);
        }

        let rows = self.query_rows(q).await?;
        tracing::debug!(rows = rows.len(), "Statement executed");
        Ok(rows)
    }

    /// Execute a query and collect all rows.
    pub(crate) async fn query_rows(&self, query: Query) -> Result<Vec<Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Release the driver and its pooled connections.
    pub fn close(self) {
        drop(self.graph);
        tracing::info!(uri = %self.uri, "Closed Neo4j connection");
    }
}

/// Reject any explicit database target.
pub fn ensure_default_database(database: Option<&str>) -> Result<(), GraphError> {
    match database {
        None => Ok(()),
        Some(db) => Err(GraphError::UnsupportedDatabase {
            database: db.to_string(),
        }),
    }
}
