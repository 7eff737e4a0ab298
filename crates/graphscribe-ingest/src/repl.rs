//! Interactive loop: one paragraph per line until end of input.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::generator::StatementGenerator;
use crate::pipeline::{GraphStore, IngestOutcome, Ingestor};

pub const PROMPT: &str = "Enter text: ";

/// Counts reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplSummary {
    pub applied: usize,
    pub failed: usize,
}

/// Read text from `input`, ingest it, and report to `output`.
///
/// Recoverable errors are reported and the loop waits for the next line.
/// Fatal errors end the loop and are returned to the caller.
pub async fn run<G, L, R, W>(
    ingestor: &Ingestor<'_, G, L>,
    mut input: R,
    output: &mut W,
) -> Result<ReplSummary>
where
    G: GraphStore,
    L: StatementGenerator,
    R: BufRead,
    W: Write,
{
    let mut summary = ReplSummary::default();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        match ingestor.ingest(text).await {
            Ok(outcome) => {
                report(output, &outcome)?;
                summary.applied += 1;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Ingest failed");
                writeln!(output, "Error: {e}")?;
                writeln!(output)?;
                summary.failed += 1;
            }
        }
    }

    tracing::info!(applied = summary.applied, failed = summary.failed, "Session finished");
    Ok(summary)
}

/// Print an outcome the way the interactive loop and `--text` mode show it.
pub fn report<W: Write>(output: &mut W, outcome: &IngestOutcome) -> Result<()> {
    writeln!(output, "{}", outcome.statement.trim())?;
    if outcome.executed {
        writeln!(output, "Applied ({} rows returned)", outcome.rows)?;
    } else {
        writeln!(output, "Not applied (dry run)")?;
    }
    writeln!(output)?;
    Ok(())
}
