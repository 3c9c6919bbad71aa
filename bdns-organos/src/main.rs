//! bdns-organos - administrative-body hierarchy tool
//!
//! Subcommands:
//! - `populate`: fetch the listing service (or read saved listings) and
//!   import each administration kind in its own transaction
//! - `resolve`: map level1/level2/level3 text to a node id
//! - `show`: print a node and its ancestor chain as JSON

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bdns_common::config::{load_config, resolve_database_path, TomlConfig};
use bdns_common::db::init_database;
use bdns_organos::client::ListingClient;
use bdns_organos::import::{ImportStats, Importer};
use bdns_organos::listing::{parse_listing, AdminKind, ListingEntry};
use bdns_organos::store::{ancestors, MemoryStore, SqliteStore};
use bdns_organos::{NodeId, Resolver, Upserter};
use clap::{Parser, Subcommand, ValueEnum};
use sqlx::SqlitePool;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for bdns-organos
#[derive(Parser, Debug)]
#[command(name = "bdns-organos")]
#[command(about = "Resolve and populate the BDNS administrative-body hierarchy")]
#[command(version)]
struct Args {
    /// Bootstrap configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log filter (overrides RUST_LOG and the configured level)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import administrative bodies from the listing service
    Populate {
        #[arg(long, value_enum, default_value_t = KindArg::All)]
        kind: KindArg,

        /// Read the listing from a JSON file instead of the service
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// Import into an in-memory store and only report counts
        #[arg(long)]
        dry_run: bool,
    },

    /// Resolve level text to a node id
    Resolve {
        level1: String,
        level2: Option<String>,
        level3: Option<String>,

        /// Also try co-official language spellings
        #[arg(long)]
        term_equivalence: bool,
    },

    /// Print a node and its ancestors
    Show { id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KindArg {
    All,
    Central,
    Regional,
    Local,
    Other,
}

impl KindArg {
    fn kinds(self) -> Vec<AdminKind> {
        match self {
            KindArg::All => AdminKind::ALL.to_vec(),
            KindArg::Central => vec![AdminKind::Central],
            KindArg::Regional => vec![AdminKind::Regional],
            KindArg::Local => vec![AdminKind::Local],
            KindArg::Other => vec![AdminKind::Other],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(args.log_level.as_deref(), &config)?;

    match args.command {
        Command::Populate {
            kind,
            from_file,
            dry_run,
        } => populate(&args.database, &config, kind, from_file.as_deref(), dry_run).await,
        Command::Resolve {
            level1,
            level2,
            level3,
            term_equivalence,
        } => {
            let pool = open_database(&args.database, &config).await?;
            let mut resolver = Resolver::from_config(&config.resolver);
            if term_equivalence {
                resolver = resolver.with_term_equivalence(true);
            }

            let mut conn = pool.acquire().await?;
            let mut store = SqliteStore::new(&mut conn);
            let resolution = resolver
                .resolve_detailed(&mut store, &level1, level2.as_deref(), level3.as_deref())
                .await?;

            match resolution {
                Some(r) => println!("{} ({})", r.id, r.strategy),
                None => println!("no match"),
            }
            Ok(())
        }
        Command::Show { id } => {
            let id = NodeId::parse(&id)?;
            let pool = open_database(&args.database, &config).await?;

            let mut conn = pool.acquire().await?;
            let mut store = SqliteStore::new(&mut conn);
            let chain = ancestors(&mut store, &id).await?;

            let Some((node, parents)) = chain.split_first() else {
                bail!("Node {} not found", id);
            };
            let out = serde_json::json!({ "node": node, "ancestors": parents });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}

/// `--log-level`, then `RUST_LOG`, then the configured level
fn init_tracing(cli_level: Option<&str>, config: &TomlConfig) -> Result<()> {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.level))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    Ok(())
}

async fn open_database(cli_path: &Option<PathBuf>, config: &TomlConfig) -> Result<SqlitePool> {
    let db_path = resolve_database_path(cli_path.as_deref(), config);
    info!("Database: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;
    Ok(pool)
}

async fn populate(
    cli_db: &Option<PathBuf>,
    config: &TomlConfig,
    kind: KindArg,
    from_file: Option<&Path>,
    dry_run: bool,
) -> Result<()> {
    if from_file.is_some() && kind == KindArg::All {
        bail!("--from-file needs a single --kind");
    }

    let importer = Importer::new(Upserter::from_config(&config.upsert));
    let client = match from_file {
        Some(_) => None,
        None => Some(ListingClient::from_config(&config.listing)?),
    };
    let pool = if dry_run {
        None
    } else {
        Some(open_database(cli_db, config).await?)
    };

    // Shared across kinds so local provinces see the dry-run communities
    let mut dry_store = MemoryStore::new();
    let mut totals = ImportStats::default();
    let mut fetch_failures = 0;

    for kind in kind.kinds() {
        let entries = match (from_file, &client) {
            (Some(path), _) => read_listing(path).await?,
            (None, Some(client)) => match client.fetch(kind).await {
                Ok(entries) => entries,
                Err(e) => {
                    error!(kind = %kind, "Skipping import: {}", e);
                    fetch_failures += 1;
                    continue;
                }
            },
            (None, None) => bail!("No listing source"),
        };

        let stats = match &pool {
            None => importer.import(&mut dry_store, kind, &entries).await?,
            Some(pool) => {
                let mut tx = pool.begin().await?;
                let stats = {
                    let mut store = SqliteStore::new(&mut *tx);
                    importer.import(&mut store, kind, &entries).await?
                };
                tx.commit().await?;
                stats
            }
        };

        println!("{:<9} {}", kind.as_str(), stats);
        totals.merge(&stats);
    }

    info!(dry_run, "Population finished: {}", totals);
    if fetch_failures > 0 {
        bail!("{} listing(s) could not be fetched", fetch_failures);
    }
    Ok(())
}

async fn read_listing(path: &Path) -> Result<Vec<ListingEntry>> {
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_listing(&body)?)
}
