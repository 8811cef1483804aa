use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rosario_scout::config::AppConfig;
use rosario_scout::maintenance;
use rosario_scout::models::ZoneFields;
use rosario_scout::pipeline::{IngestPipeline, ListingFilter};
use rosario_scout::scrapers::{self, load_profiles};
use rosario_scout::store::ListingStore;
use rosario_scout::telemetry;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "rosario-scout", about = "Collects and filters Rosario house listings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Scrape every configured portal and store the listings that pass the filter
    Scrape {
        /// Portal profile file (defaults to SCOUT_PORTALS_PATH)
        #[arg(long)]
        portals: Option<PathBuf>,
        /// Also write each stored listing to its own JSON file here
        #[arg(long)]
        raw_dir: Option<PathBuf>,
    },
    /// Re-check stored listings and delete the ones that no longer pass
    Cleanup {
        #[arg(long)]
        dry_run: bool,
    },
    /// Print one stored listing as JSON
    Show { id: i64 },
    /// Print listing counts per source, neighborhood and currency
    Stats,
    /// Print the verdict for a single listing
    Check {
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        neighborhood: Option<String>,
        #[arg(long)]
        property_type: Option<String>,
        #[arg(long)]
        title: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.log_level)?;

    // one rule set for ingestion and cleanup alike
    let filter = ListingFilter::default();

    match cli.command {
        Command::Scrape { portals, raw_dir } => {
            let portals = portals.unwrap_or_else(|| config.portals_path.clone());
            scrape(&config, &portals, raw_dir, filter).await
        }
        Command::Cleanup { dry_run } => {
            let mut store = ListingStore::open(&config.store_path)?;
            let report = maintenance::cleanup(&mut store, &filter, dry_run)?;
            println!(
                "Examined {}, removed {}, remaining {}",
                report.examined,
                report.removed.len(),
                report.remaining()
            );
            Ok(())
        }
        Command::Show { id } => {
            let store = ListingStore::open(&config.store_path)?;
            let Some(listing) = store.get(id)? else {
                bail!("No listing with id {}", id);
            };
            println!("{}", serde_json::to_string_pretty(&listing)?);
            Ok(())
        }
        Command::Stats => {
            let store = ListingStore::open(&config.store_path)?;
            println!("{}", serde_json::to_string_pretty(&store.stats()?)?);
            Ok(())
        }
        Command::Check {
            address,
            neighborhood,
            property_type,
            title,
        } => {
            let fields = ZoneFields {
                property_type: property_type.as_deref(),
                address: address.as_deref(),
                neighborhood: neighborhood.as_deref(),
                title: title.as_deref(),
            };
            let verdict = filter.accepts_with_title_fallback(&fields);
            let mark = if verdict.is_accepted() { "✅" } else { "❌" };
            println!("{} {}", mark, verdict);
            Ok(())
        }
    }
}

async fn scrape(
    config: &AppConfig,
    portals: &Path,
    raw_dir: Option<PathBuf>,
    filter: ListingFilter,
) -> anyhow::Result<()> {
    info!("🏠 Rosario Scout");
    info!("================");

    let profiles = load_profiles(portals).await?;
    let mut scraped = Vec::new();
    for profile in profiles {
        let scraper = scrapers::for_profile(profile, config.http_timeout)?;
        match scraper.scrape().await {
            Ok(listings) => scraped.extend(listings),
            Err(err) => warn!("{} scrape failed: {:#}", scraper.source_name(), err),
        }
    }

    let mut store = ListingStore::open(&config.store_path)?;
    let last_known = store.last_id()?;
    let report = IngestPipeline::new(filter).run(scraped, &mut store)?;

    info!(
        "\n✅ {} scraped, {} stored, {} rejected, {} already known\n",
        report.scraped, report.stored, report.rejected, report.duplicates
    );

    if let Some(dir) = raw_dir {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for stored in store.listings_after(last_known)? {
            let filename = dir.join(format!("{}.json", stored.id));
            let json = serde_json::to_string_pretty(&stored)?;
            tokio::fs::write(&filename, json).await?;
        }
        info!("💾 Saved {} individual listing files to {}", report.stored, dir.display());
    }

    Ok(())
}
