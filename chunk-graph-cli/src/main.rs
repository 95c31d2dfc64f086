use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chunk_graph::RecordSchema;
use chunk_graph_cli::{NavigateOp, SplitMode, load_config, navigate, read_collection, split};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chunk-graph")]
#[command(about = "Split records into linked chunk graphs and walk them")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split JSON Lines records into a node collection
    Split {
        /// JSON Lines input, one record per line
        #[arg(long)]
        input: PathBuf,
        /// Record field holding the document text
        #[arg(long, default_value = "text")]
        text_field: String,
        /// Record fields copied into document metadata (repeatable)
        #[arg(long = "metadata-field")]
        metadata_fields: Vec<String>,
        /// Record field holding the document id; random ids when omitted
        #[arg(long)]
        id_field: Option<String>,
        #[arg(long, value_enum, default_value_t = SplitMode::Flat)]
        mode: SplitMode,
        /// Write the collection here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Walk a collection from one node
    Navigate {
        /// Collection written by `split`
        #[arg(long)]
        graph: PathBuf,
        /// Id of the starting node
        #[arg(long)]
        node: String,
        /// Do not log unresolved relationships
        #[arg(long)]
        quiet: bool,
        #[command(subcommand)]
        op: NavigateOp,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Split { input, text_field, metadata_fields, id_field, mode, output } => {
            let mut schema = RecordSchema::new(text_field).with_metadata_fields(metadata_fields);
            if let Some(id_field) = id_field {
                schema = schema.with_id_field(id_field);
            }
            let collection = split(&input, &schema, mode, &config)?;
            let json = collection.to_json()?;
            match output {
                Some(path) => fs::write(&path, json)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{json}"),
            }
        }
        Commands::Navigate { graph, node, quiet, op } => {
            if quiet {
                config.on_missing = false;
            }
            let collection = read_collection(&graph)?;
            let result = navigate(&collection, &node, op, &config)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
