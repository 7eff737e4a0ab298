//! CLI entry point for graphscribe.
//!
//! Prompts for free text on stdin, generates a Cypher `MERGE` statement for
//! it, and applies the statement to Neo4j. Logs go to stderr.

use std::io::Write;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use graphscribe_graph::GraphClient;
use graphscribe_ingest::config::{load as load_config, AppConfig};
use graphscribe_ingest::generator::OpenAiGenerator;
use graphscribe_ingest::pipeline::Ingestor;
use graphscribe_ingest::repl;

#[derive(Parser)]
#[command(name = "graphscribe")]
#[command(about = "Turn free text into Cypher MERGE statements against a Neo4j graph")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file prefix (default: graphscribe).
    #[arg(short, long, default_value = "graphscribe", global = true)]
    config: String,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest text (interactive unless --text is given).
    Ingest {
        /// Ingest this text once and exit.
        #[arg(long)]
        text: Option<String>,

        /// Print generated statements without applying them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the current graph schema as it is shown to the model.
    Schema,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let app_config = load_config(&cli.config)?;
    let graph = GraphClient::connect(&app_config.graph_config()).await?;

    let command = cli.command.unwrap_or(Command::Ingest {
        text: None,
        dry_run: false,
    });
    let result = run(command, &graph, app_config).await;

    graph.close();
    result
}

async fn run(command: Command, graph: &GraphClient, app_config: AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Schema => {
            let schema = graph.fetch_schema().await?;
            print!("{schema}");
        }
        Command::Ingest { text, dry_run } => {
            let generator = OpenAiGenerator::new(app_config.llm)?;
            let ingestor = Ingestor::new(graph, &generator).dry_run(dry_run);

            let mut stdout = std::io::stdout().lock();
            match text {
                Some(text) => {
                    let outcome = ingestor.ingest(&text).await?;
                    repl::report(&mut stdout, &outcome)?;
                }
                None => {
                    let stdin = std::io::stdin().lock();
                    let summary = repl::run(&ingestor, stdin, &mut stdout).await?;
                    writeln!(stdout, "{} applied, {} failed", summary.applied, summary.failed)?;
                }
            }
        }
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
