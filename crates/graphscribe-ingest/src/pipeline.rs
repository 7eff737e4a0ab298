//! The ingest pipeline: schema → prompt → statement → graph.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use graphscribe_graph::{GraphClient, GraphError};

use crate::error::{IngestError, Result};
use crate::generator::StatementGenerator;
use crate::prompt::strip_code_fences;

/// The graph operations the pipeline needs.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Current schema rendered as prompt text.
    async fn schema_text(&self) -> std::result::Result<String, GraphError>;

    /// Run a statement against the default database, returning the row count.
    async fn run_statement(&self, statement: &str) -> std::result::Result<usize, GraphError>;
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn schema_text(&self) -> std::result::Result<String, GraphError> {
        Ok(self.fetch_schema().await?.text())
    }

    async fn run_statement(&self, statement: &str) -> std::result::Result<usize, GraphError> {
        let rows = self.execute(statement, None, None).await?;
        Ok(rows.len())
    }
}

/// Result of ingesting one piece of text.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub id: Uuid,
    pub statement: String,
    /// `false` in dry-run mode.
    pub executed: bool,
    pub rows: usize,
    pub started_at: DateTime<Utc>,
}

/// Runs one text through schema lookup, generation, and execution.
///
/// Strictly sequential: each step completes before the next begins.
pub struct Ingestor<'a, G, L> {
    graph: &'a G,
    generator: &'a L,
    dry_run: bool,
}

impl<'a, G, L> Ingestor<'a, G, L>
where
    G: GraphStore,
    L: StatementGenerator,
{
    pub fn new(graph: &'a G, generator: &'a L) -> Self {
        Self {
            graph,
            generator,
            dry_run: false,
        }
    }

    /// Generate statements without applying them.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn ingest(&self, text: &str) -> Result<IngestOutcome> {
        let id = Uuid::new_v4();
        let started_at = Utc::now();

        let schema = self.graph.schema_text().await?;
        tracing::debug!(%id, schema_chars = schema.len(), "Schema fetched");

        let generated = self.generator.generate(&schema, text).await?;
        let statement = strip_code_fences(&generated);
        if statement.trim().is_empty() {
            return Err(IngestError::Generation(
                "Model returned an empty statement".to_string(),
            ));
        }

        if self.dry_run {
            tracing::info!(%id, model = self.generator.model_name(), "Statement generated (dry run)");
            return Ok(IngestOutcome {
                id,
                statement,
                executed: false,
                rows: 0,
                started_at,
            });
        }

        let rows = self.graph.run_statement(&statement).await?;
        let elapsed_ms = (Utc::now() - started_at).num_milliseconds();
        tracing::info!(
            %id,
            rows,
            elapsed_ms,
            model = self.generator.model_name(),
            "Statement applied"
        );

        Ok(IngestOutcome {
            id,
            statement,
            executed: true,
            rows,
            started_at,
        })
    }
}
