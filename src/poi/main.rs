//! Geocode-then-search for points of interest with Azure Maps.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use facility_lookup::azure::{AzureMapsClient, PoiQuery};
use facility_lookup::config::AzureConfig;
use facility_lookup::models::{Coords, PoiRecord};
use facility_lookup::LookupError;

#[derive(Parser, Debug)]
#[command(name = "poi_search")]
#[command(about = "Search points of interest near an address with Azure Maps")]
struct Args {
    /// What to search for, e.g. "urgent care"
    query: String,

    /// Address or area to search around (geocoded first)
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    near: Option<String>,

    /// Latitude of the search point
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude of the search point
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// ISO country code to restrict results to (repeatable)
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Include opening hours for the next seven days
    #[arg(long)]
    opening_hours: bool,

    /// Maximum number of results (1-100)
    #[arg(long, default_value = "10")]
    limit: u32,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("facility_lookup=info,poi_search=info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    if args.limit == 0 || args.limit > 100 {
        anyhow::bail!("--limit must be between 1 and 100");
    }

    let config = AzureConfig::from_env()?;
    let client = AzureMapsClient::new(&config)?;

    let coords = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Coords { lat, lon },
        _ => {
            let place = args.near.as_deref().unwrap_or(&args.query);
            match client.geocode(place).await {
                Ok(coords) => coords,
                Err(LookupError::NotFound(_)) => {
                    anyhow::bail!("Location not found: '{}'", place)
                }
                Err(e) => return Err(e).context("Geocoding failed"),
            }
        }
    };
    info!("Searching '{}' around {}", args.query, coords);

    let query = PoiQuery {
        query: args.query.clone(),
        countries: args
            .countries
            .iter()
            .map(|c| c.trim().to_ascii_uppercase())
            .collect(),
        coords: Some(coords),
        opening_hours: args.opening_hours,
        limit: Some(args.limit),
    };
    let pois = client.search_poi(&query).await.context("POI search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pois)?);
    } else if pois.is_empty() {
        println!("No places found for '{}'", args.query);
    } else {
        for poi in &pois {
            print_poi(poi, args.opening_hours);
        }
    }

    Ok(())
}

fn print_poi(poi: &PoiRecord, with_hours: bool) {
    println!("Name: {}", poi.name);
    println!("URL: {}", poi.url.as_deref().unwrap_or("-"));
    println!("Phone: {}", poi.phone.as_deref().unwrap_or("-"));
    println!("Address: {}", poi.address.as_deref().unwrap_or("-"));
    if let Some(distance) = poi.distance_m {
        println!("Distance: {:.0} m", distance);
    }

    if with_hours {
        match &poi.opening_hours {
            Some(hours) if !hours.time_ranges.is_empty() => {
                println!("Opening hours:");
                for line in hours.daily_lines() {
                    println!("  {}", line);
                }
            }
            _ => println!("No opening hours information"),
        }
    }
    println!();
}
