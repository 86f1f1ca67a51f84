//! gangsheet CLI - pricing and batching from the shell
//!
//! Commands: quote, validate-tiers, pack, generate
//! Outputs JSON to stdout, logs to stderr
//! Returns 2 on rejected input, 1 on any other failure
//!
//! JSON arguments take either inline JSON or `@path/to/file.json`.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gangsheet_batch::payload::{error_body, read_payload, to_pretty_json};
use gangsheet_batch::{
    BatchConfig, BatchResult, BatchService, LocalObjectStore, MemoryStore, PngCompositor,
};
use gangsheet_core::assembly::{plan_batch, BatchFilter};
use gangsheet_core::pricing::quote_order;
use gangsheet_core::raster::RasterPlan;
use gangsheet_core::tiers::validate_tier_ranges;
use gangsheet_core::validation::validate_tier_fields;
use gangsheet_core::{CoreError, PricingSettings, PricingTier, QueueItem, RequestedItem};

#[derive(Parser)]
#[command(name = "gangsheet")]
#[command(about = "Gang sheet pricing and batch packing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to batch.toml (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Price an order
    Quote {
        /// JSON array of {width_in, height_in, qty}
        #[arg(short, long)]
        items: String,

        /// JSON pricing settings (defaults: 0.25 / 2 / 2 / 4)
        #[arg(short, long)]
        settings: Option<String>,

        /// JSON array of tiers (defaults to the seeded table)
        #[arg(short, long)]
        tiers: Option<String>,
    },

    /// Check a tier table before saving it
    ValidateTiers {
        /// JSON array of tiers
        #[arg(short, long)]
        tiers: String,
    },

    /// Plan a sheet without rendering it
    Pack {
        /// JSON array of queue items
        #[arg(short, long)]
        queue: String,

        /// Only these queue item ids (comma separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },

    /// Pack, render and store a sheet
    Generate {
        /// JSON array of queue items
        #[arg(short, long)]
        queue: String,

        /// Directory holding uploaded sources; the sheet is written here too
        #[arg(short, long)]
        objects: PathBuf,

        /// Only these queue item ids (comma separated)
        #[arg(long, value_delimiter = ',')]
        ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await.and_then(|output| to_pretty_json(&output)) {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", error_body(&e));
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> BatchResult<serde_json::Value> {
    match cli.command {
        Commands::Quote {
            items,
            settings,
            tiers,
        } => {
            let items: Vec<RequestedItem> = read_payload("items", &items)?;
            let settings: PricingSettings = match settings {
                Some(raw) => read_payload("settings", &raw)?,
                None => PricingSettings::default(),
            };
            let tiers: Vec<PricingTier> = match tiers {
                Some(raw) => read_payload("tiers", &raw)?,
                None => PricingTier::default_table(),
            };

            let quote = quote_order(&items, &settings, &tiers)?;
            info!(
                lines = quote.lines.len(),
                total_sq_in = quote.total_sq_in,
                subtotal = %quote.subtotal,
                "Quoted order"
            );
            Ok(serde_json::to_value(&quote)?)
        }

        Commands::ValidateTiers { tiers } => {
            let tiers: Vec<PricingTier> = read_payload("tiers", &tiers)?;
            tiers
                .iter()
                .try_for_each(validate_tier_fields)
                .map_err(CoreError::from)?;
            validate_tier_ranges(&tiers).map_err(CoreError::from)?;
            Ok(json!({ "valid": true, "tiers": tiers.len() }))
        }

        Commands::Pack { queue, ids } => {
            let queue: Vec<QueueItem> = read_payload("queue", &queue)?;
            let config = BatchConfig::load(cli.config)?;

            let sheet = config.sheet_config();
            let plan = plan_batch(&queue, &BatchFilter::from_ids(ids), &sheet)?;
            let raster = RasterPlan::from_plan(&plan, sheet.sheet_width_in, config.render.dpi);
            Ok(json!({ "plan": plan, "raster": raster }))
        }

        Commands::Generate {
            queue,
            objects,
            ids,
        } => {
            let queue: Vec<QueueItem> = read_payload("queue", &queue)?;
            let config = BatchConfig::load(cli.config)?;

            info!(objects = %objects.display(), queued = queue.len(), "Generating batch");
            let store = Arc::new(MemoryStore::new(queue));
            let service = BatchService::new(
                config,
                store.clone(),
                Arc::new(LocalObjectStore::new(objects)),
                Arc::new(PngCompositor),
                store,
            );

            let batch = service.generate(BatchFilter::from_ids(ids)).await?;
            Ok(serde_json::to_value(&batch)?)
        }
    }
}

/// Installs the stderr log subscriber.
///
/// ## Environment Variables
/// - `RUST_LOG=debug` - Show debug logs
/// - Default: `info,gangsheet=debug`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,gangsheet=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
