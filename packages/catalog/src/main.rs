#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for catalog maintenance.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use crime_dash_catalog::config::StoreConfig;
use crime_dash_catalog::document_store::DocumentStore;
use crime_dash_catalog::duckdb_store::DuckDbStore;
use crime_dash_catalog::queries::copy_catalog;
use crime_dash_catalog::{CatalogSnapshot, open_store, paths};

#[derive(Parser)]
#[command(name = "crime_dash_catalog", about = "Crime dashboard catalog tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a document export (`.jsonl`/`.json` collections) into a `DuckDB` catalog
    Import {
        /// Directory holding one collection file per table
        #[arg(long)]
        from: PathBuf,
        /// Target database file (defaults to the data directory catalog)
        #[arg(long)]
        to: Option<PathBuf>,
    },
    /// Print the size of the configured catalog
    Summary,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Import { from, to } => {
            let to = to.unwrap_or_else(paths::catalog_db_path);
            log::info!("Importing {} into {}", from.display(), to.display());

            let start = Instant::now();
            let source = DocumentStore::open(&from)?;
            let target = DuckDbStore::open(&to)?;
            let total = copy_catalog(&source, &target)?;

            log::info!(
                "Imported {total} rows in {:.1}s",
                start.elapsed().as_secs_f64()
            );
        }
        Commands::Summary => {
            let config = StoreConfig::from_env()?;
            let store = open_store(&config)?;
            let snapshot = CatalogSnapshot::load(store.as_ref())?;

            println!("{:<16} {}", "Backend", store.backend_name());
            println!("{:<16} {}", "Periods", snapshot.periods().len());
            if let Some((first, last)) = snapshot.periods().first().zip(snapshot.periods().last())
            {
                println!("{:<16} {first} .. {last}", "Range");
            }
            if let Some(year) = snapshot.max_year() {
                println!("{:<16} {year}", "Max year");
            }
            println!("{:<16} {}", "Crime groups", snapshot.crime_groups().len());
            println!("{}", "-".repeat(30));
            for (kind, count) in snapshot.place_counts() {
                println!("{:<16} {count}", kind.as_ref());
            }
        }
    }

    Ok(())
}
