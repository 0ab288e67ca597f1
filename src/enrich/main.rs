//! Bulk facility enrichment.
//!
//! Reads a facility table, looks every row up in Google Places through a
//! bounded worker pool, and writes the table back out with the place details
//! appended.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use facility_lookup::batch::{
    facility_records, merge_outcomes, Dispatcher, FacilityColumns, PlaceLookup, RowLimit,
};
use facility_lookup::config::{EnrichSettings, GoogleConfig};
use facility_lookup::google::GooglePlacesClient;
use facility_lookup::table::{read_table, write_table, TableFormat};

#[derive(Parser, Debug)]
#[command(name = "lookup_tool")]
#[command(about = "Enrich a facility table with Google Places details")]
struct Args {
    /// Input table (.csv, .xlsx, .xlsm, .xls, .ods)
    input: PathBuf,

    /// Output table (.csv or .xlsx)
    output: PathBuf,

    /// Number of rows to look up; -1 for all
    #[arg(long, default_value = "-1", allow_negative_numbers = true)]
    num_rows: i64,

    /// Concurrent lookups (overrides the settings file)
    #[arg(long)]
    workers: Option<usize>,

    /// Per-lookup timeout in seconds, 0 to disable (overrides the settings file)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identifier column
    #[arg(long)]
    id_column: Option<String>,

    /// Website column
    #[arg(long)]
    url_column: Option<String>,

    /// Name column
    #[arg(long)]
    name_column: Option<String>,
}

impl Args {
    fn settings(&self) -> Result<EnrichSettings> {
        let mut settings = match &self.config {
            Some(path) => EnrichSettings::load_from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => EnrichSettings::default(),
        };

        if let Some(workers) = self.workers {
            settings.enrich.workers = workers;
        }
        if let Some(secs) = self.timeout_secs {
            settings.enrich.lookup_timeout_secs = secs;
        }
        if let Some(id) = &self.id_column {
            settings.columns.id = id.clone();
        }
        if let Some(url) = &self.url_column {
            settings.columns.url = url.clone();
        }
        if let Some(name) = &self.name_column {
            settings.columns.name = name.clone();
        }

        settings.validate()?;
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("facility_lookup=info,lookup_tool=info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Facility Lookup");
    info!("Input: {}", args.input.display());

    // Validate everything up front so a bad run fails before any lookup
    let limit = RowLimit::from_arg(args.num_rows)?;
    let settings = args.settings()?;
    if TableFormat::from_path(&args.output)? == TableFormat::Workbook {
        anyhow::bail!(
            "Output must be .csv or .xlsx, got {}",
            args.output.display()
        );
    }
    let google = GoogleConfig::from_env()?;

    let table = read_table(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let columns = FacilityColumns::resolve(&table, &settings.columns)?;
    let records = facility_records(&table, &columns);
    info!("Loaded {} facilities", records.len());

    let client: Arc<dyn PlaceLookup> = Arc::new(GooglePlacesClient::new(&google)?);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let dispatcher = Dispatcher::new(client, settings.enrich.workers)
        .with_lookup_timeout(settings.lookup_timeout())
        .with_progress(pb);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing with the rows processed so far");
            on_signal.cancel();
        }
    });

    let batch = dispatcher.run(&records, limit, &cancel).await;

    let output = merge_outcomes(&table, &batch.outcomes)?;
    write_table(&output, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    info!(
        "Wrote {} rows to {} ({})",
        output.len(),
        args.output.display(),
        batch.stats
    );

    Ok(())
}
