// ABOUTME: CLI entry point for dynamo-archiver
// ABOUTME: Parses commands and routes to appropriate handlers

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dynamo_archiver::commands::{self, RestorePhase};
use dynamo_archiver::config::ArchiveConfig;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dynamo-archiver")]
#[command(about = "DynamoDB table backup and restore with schema capture", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct ConnectionArgs {
    /// AWS region override
    #[arg(long)]
    region: Option<String>,
    /// DynamoDB endpoint override, e.g. http://localhost:8000 for DynamoDB Local
    #[arg(long)]
    endpoint_url: Option<String>,
    /// Directory for schema dumps (default: ./dynamodb/backup_schemas)
    #[arg(long)]
    schema_dir: Option<PathBuf>,
    /// Directory for data dumps (default: ./dynamodb/backup_data)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Path to archive-config.toml with the same settings
    #[arg(long = "config")]
    config_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture table schemas and scan table data to dump files
    Backup {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Tables to back up (comma-separated); defaults to all tables
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<String>>,
        /// Tables to skip (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude_tables: Vec<String>,
        /// Disable interactive table selection (back up everything)
        #[arg(long)]
        no_interactive: bool,
        /// Maximum items per scan page
        #[arg(long)]
        page_size: Option<i32>,
    },
    /// Recreate tables from schema dumps and re-import dumped rows
    Restore {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Tables to restore (comma-separated); defaults to every schema dump
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<String>>,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
        /// Delete existing tables on the target before recreating them
        #[arg(long)]
        drop_existing: bool,
        /// Only recreate tables, skip data import
        #[arg(long, conflicts_with = "data_only")]
        schema_only: bool,
        /// Only import data, assume tables already exist
        #[arg(long)]
        data_only: bool,
    },
    /// List live tables with key schema and item counts
    Tables {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
    /// Compare captured schema dumps against live tables
    Verify {
        #[command(flatten)]
        connection: ConnectionArgs,
        /// Tables to verify (comma-separated); defaults to every schema dump
        #[arg(long, value_delimiter = ',')]
        tables: Option<Vec<String>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Backup {
            connection,
            tables,
            exclude_tables,
            no_interactive,
            page_size,
        } => {
            let config = build_config(&connection)?;
            commands::backup(&config, tables, exclude_tables, no_interactive, page_size).await
        }
        Commands::Restore {
            connection,
            tables,
            yes,
            drop_existing,
            schema_only,
            data_only,
        } => {
            let config = build_config(&connection)?;
            let phase = if schema_only {
                RestorePhase::SchemaOnly
            } else if data_only {
                RestorePhase::DataOnly
            } else {
                RestorePhase::All
            };
            commands::restore(&config, tables, yes, drop_existing, phase).await
        }
        Commands::Tables { connection } => {
            let config = build_config(&connection)?;
            commands::tables(&config).await
        }
        Commands::Verify { connection, tables } => {
            let config = build_config(&connection)?;
            commands::verify(&config, tables).await
        }
    }
}

/// Merge the config file (if any) with CLI flag overrides
fn build_config(args: &ConnectionArgs) -> Result<ArchiveConfig> {
    let base = match &args.config_path {
        Some(path) => ArchiveConfig::load_from_file(Path::new(path))?,
        None => ArchiveConfig::default(),
    };
    Ok(base.apply_overrides(
        args.schema_dir.clone(),
        args.data_dir.clone(),
        args.region.clone(),
        args.endpoint_url.clone(),
    ))
}
