//! `kubaxi` operator CLI: quote trips and circuits against the live backend

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use kubaxi_core::booking::whatsapp_link;
use kubaxi_core::directory::{KindFilter, LocationFilter};
use kubaxi_core::models::LocationId;
use kubaxi_core::pricing::{CircuitRequest, CircuitStop, TripRequest, VehicleMode};
use kubaxi_core::{
    warm_cache, AppCache, AppConfig, CircuitCalculator, FlowState, LocationDirectory, PgBackend,
    QuoteService, TripCalculator,
};

#[derive(Debug, Parser)]
#[command(name = "kubaxi", about = "Kubaxi fare and booking tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List locations, optionally filtered
    Locations {
        /// Name or province contains this text
        #[arg(long, short)]
        query: Option<String>,
        /// todo | turistico | cayo | aeropuerto
        #[arg(long, short, value_parser = parse_kind, default_value = "todo")]
        kind: KindFilter,
    },
    /// Quote a single trip
    Quote {
        #[arg(long)]
        from: LocationId,
        #[arg(long)]
        to: LocationId,
        #[arg(long, short, default_value_t = 1)]
        passengers: u32,
        /// Private car instead of shared taxi
        #[arg(long)]
        private: bool,
    },
    /// Quote a circuit; stops as ID or ID:ROOMS:NIGHTS
    Circuit {
        #[arg(long)]
        from: LocationId,
        #[arg(long = "stop", value_parser = parse_stop, required = true)]
        stops: Vec<CircuitStop>,
        #[arg(long, short, default_value_t = 1)]
        passengers: u32,
    },
    /// List excursions at a location, or the locations that have them
    Excursions {
        #[arg(long, short)]
        location: Option<String>,
    },
    /// List active travel packages
    Packages,
    /// Print a prefilled WhatsApp link
    Link {
        message: String,
    },
}

fn parse_kind(value: &str) -> Result<KindFilter, String> {
    KindFilter::from_option(value).ok_or_else(|| format!("unknown location type: {}", value))
}

fn parse_stop(value: &str) -> Result<CircuitStop, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let number = |s: &str| s.trim().parse::<u32>().map_err(|e| format!("{}: {}", s, e));
    let id = parts[0]
        .trim()
        .parse::<LocationId>()
        .map_err(|e| format!("{}: {}", parts[0], e))?;

    match parts.as_slice() {
        [_] => Ok(CircuitStop::new(id)),
        [_, rooms, nights] => Ok(CircuitStop::with_accommodation(id, number(rooms)?, number(nights)?)),
        _ => Err(format!("expected ID or ID:ROOMS:NIGHTS, got {}", value)),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kubaxi=info,kubaxi_core=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    if let Command::Link { message } = &cli.command {
        println!("{}", whatsapp_link(&config.whatsapp_number, message));
        return Ok(());
    }

    let database_url = config.require_database_url()?;
    let backend = Arc::new(
        PgBackend::connect(database_url)
            .await
            .context("connecting to the backend")?,
    );
    info!("Connected to backend");

    let cache = AppCache::new(&config);
    warm_cache(&cache, backend.as_ref()).await;
    let service = QuoteService::new(backend, cache);

    match cli.command {
        Command::Locations { query, kind } => {
            let directory = LocationDirectory::load(&service).await?;
            let filter = LocationFilter::default()
                .with_kind(kind)
                .with_query(query.unwrap_or_default());
            for location in directory.filter(&filter).iter() {
                println!(
                    "{:>5}  {:<32} {:<20} {}",
                    location.id,
                    location.name,
                    location.province,
                    location.kind.label()
                );
            }
        }
        Command::Quote {
            from,
            to,
            passengers,
            private,
        } => {
            let directory = Arc::new(LocationDirectory::load(&service).await?);
            let calculator = TripCalculator::from_config(service, directory, &config);
            let mut request = TripRequest {
                origin: Some(from),
                destination: Some(to),
                mode: if private { VehicleMode::Private } else { VehicleMode::Shared },
                passengers,
                ..TripRequest::default()
            };

            let view = calculator.update(&mut request).await;
            if let FlowState::Error(message) = &view.state {
                return Err(anyhow!("{}", message));
            }
            if request.mode == VehicleMode::Private && !private {
                info!("Quoted as private: shared taxis do not serve Oriente");
            }
            print_json(&view.estimate)?;
        }
        Command::Circuit {
            from,
            stops,
            passengers,
        } => {
            let directory = Arc::new(LocationDirectory::load(&service).await?);
            let calculator = CircuitCalculator::from_config(service, directory, &config);
            let request = CircuitRequest {
                origin: Some(from),
                stops,
                passengers,
                ..CircuitRequest::default()
            };

            let view = calculator.update(&request).await;
            if let FlowState::Error(message) = &view.state {
                return Err(anyhow!("{}", message));
            }
            print_json(&view.estimate)?;
        }
        Command::Excursions { location: None } => {
            for location in service.excursion_locations().await? {
                println!("{}", location);
            }
        }
        Command::Excursions {
            location: Some(location),
        } => {
            let locale = config.default_locale;
            for excursion in service.excursions(&location).await?.iter() {
                println!(
                    "{:<40} desde ${}  {}",
                    excursion.title(locale),
                    excursion.pricing.base_price,
                    excursion.duration.as_deref().unwrap_or_default()
                );
            }
        }
        Command::Packages => {
            let locale = config.default_locale;
            for package in service.packages().await?.iter() {
                println!(
                    "{:<40} ${:<8} {} días / {} noches",
                    package.name.get(locale),
                    package.price,
                    package.days,
                    package.nights
                );
            }
        }
        Command::Link { .. } => {}
    }

    Ok(())
}
