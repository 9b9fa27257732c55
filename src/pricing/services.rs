//! Pricing service functions with backend access.
//!
//! These functions read route details through the shared cache and apply
//! the calculators. Each circuit leg is priced in stop order so a failure
//! is reported against the right leg.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error};

use crate::cache::AppCache;
use crate::db::Backend;
use crate::directory::{MIN_SEARCH_CHARS, SEARCH_LIMIT};
use crate::models::{Excursion, Location, LocationId, TravelPackage};

use super::calculators::{self, LegTotals};
use super::models::{CircuitStop, PriceQuote, RouteDetails, VehicleMode};

/// Pricing calculation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// Input rejected before any backend call
    Validation { message: String },
    /// The backend has no usable fare for a pair.
    ///
    /// `leg` is the 0-based leg index within a circuit (0 = origin to
    /// first destination), `None` for single trips.
    RouteUnavailable { leg: Option<usize> },
    /// The backend could not be reached or failed
    Transport { message: String },
}

impl QuoteError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        QuoteError::Validation {
            message: message.into(),
        }
    }

    fn at_leg(self, index: usize) -> Self {
        match self {
            QuoteError::RouteUnavailable { .. } => QuoteError::RouteUnavailable { leg: Some(index) },
            other => other,
        }
    }

    /// Text shown next to the estimate
    pub fn user_message(&self) -> String {
        match self {
            QuoteError::Validation { message } => message.clone(),
            QuoteError::RouteUnavailable { leg: None } => {
                "No se pudo calcular el precio. Verifica que exista una ruta entre estas ubicaciones."
                    .to_string()
            }
            QuoteError::RouteUnavailable { leg: Some(0) } => {
                "No se pudo calcular el precio para el primer tramo".to_string()
            }
            QuoteError::RouteUnavailable { leg: Some(leg) } => format!(
                "No se pudo calcular el precio entre ciudades {} y {}",
                leg,
                leg + 1
            ),
            QuoteError::Transport { .. } => {
                "Error al calcular el precio. Inténtalo de nuevo en unos minutos.".to_string()
            }
        }
    }
}

impl std::fmt::Display for QuoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteError::Validation { message } => write!(f, "Invalid input: {}", message),
            QuoteError::RouteUnavailable { leg: None } => {
                write!(f, "No route could be priced between these locations")
            }
            QuoteError::RouteUnavailable { leg: Some(leg) } => {
                write!(f, "No route could be priced for leg {}", leg + 1)
            }
            QuoteError::Transport { message } => write!(f, "Backend error: {}", message),
        }
    }
}

impl std::error::Error for QuoteError {}

/// Priced circuit transport, before per-day billing and lodging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitQuote {
    /// Sum of leg prices, whole units
    pub transport_price: Decimal,
    /// Sum of leg distances, 1 decimal
    pub distance_km: Decimal,
    pub duration_minutes: Decimal,
    pub legs: Vec<PriceQuote>,
}

impl From<(LegTotals, Vec<PriceQuote>)> for CircuitQuote {
    fn from((totals, legs): (LegTotals, Vec<PriceQuote>)) -> Self {
        Self {
            transport_price: totals.price,
            distance_km: totals.distance_km,
            duration_minutes: totals.duration_minutes,
            legs,
        }
    }
}

/// Cache-fronted access to prices and catalog data
#[derive(Clone)]
pub struct QuoteService {
    backend: Arc<dyn Backend>,
    cache: AppCache,
}

impl QuoteService {
    pub fn new(backend: Arc<dyn Backend>, cache: AppCache) -> Self {
        Self { backend, cache }
    }

    pub fn cache(&self) -> &AppCache {
        &self.cache
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Full location list, fetched once per TTL window
    pub async fn locations(&self) -> Result<Arc<Vec<Location>>, QuoteError> {
        let backend = Arc::clone(&self.backend);
        self.cache
            .locations
            .get_or_fetch(
                &AppCache::locations_key(),
                || async move {
                    backend.fetch_locations().await.map(Arc::new).map_err(transport)
                },
                None,
            )
            .await
            .map_err(|e| (*e).clone())
    }

    /// Autocomplete against the backend; short queries return nothing
    pub async fn search_locations(&self, query: &str) -> Result<Vec<Location>, QuoteError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }
        self.backend
            .search_locations(query, SEARCH_LIMIT as i64)
            .await
            .map_err(transport)
    }

    /// Route details for a pair, from cache or backend.
    ///
    /// Unpriceable pairs are reported, not cached.
    pub async fn route_details(
        &self,
        origin: LocationId,
        destination: LocationId,
    ) -> Result<RouteDetails, QuoteError> {
        let backend = Arc::clone(&self.backend);
        self.cache
            .routes
            .get_or_fetch(
                &AppCache::route_key(origin, destination),
                || async move {
                    match backend.route_details(origin, destination).await {
                        Ok(Some(details)) if details.base_price > Decimal::ZERO => Ok(details),
                        Ok(_) => {
                            debug!("No fare between {} and {}", origin, destination);
                            Err(QuoteError::RouteUnavailable { leg: None })
                        }
                        Err(e) => Err(transport(e)),
                    }
                },
                None,
            )
            .await
            .map_err(|e| (*e).clone())
    }

    /// Price a single origin -> destination trip
    pub async fn quote_leg(
        &self,
        origin: LocationId,
        destination: LocationId,
        mode: VehicleMode,
        passengers: u32,
    ) -> Result<PriceQuote, QuoteError> {
        if origin == destination {
            return Err(QuoteError::validation(
                "El origen y destino no pueden ser iguales",
            ));
        }
        if passengers == 0 {
            return Err(QuoteError::validation("Debe haber al menos 1 persona"));
        }

        let details = self.route_details(origin, destination).await?;
        calculators::price_leg(&details, mode, passengers)
    }

    /// Price the transport of a circuit.
    ///
    /// Legs run origin -> first stop, then stop to stop, always private.
    /// The first failing leg aborts the whole circuit.
    pub async fn quote_circuit(
        &self,
        origin: LocationId,
        stops: &[CircuitStop],
        passengers: u32,
    ) -> Result<CircuitQuote, QuoteError> {
        if stops.is_empty() {
            return Err(QuoteError::validation(
                "Debes seleccionar al menos 1 ciudad de destino",
            ));
        }

        let path: Vec<LocationId> = std::iter::once(origin)
            .chain(stops.iter().map(|s| s.location_id))
            .collect();

        let mut legs = Vec::with_capacity(stops.len());
        for (index, pair) in path.windows(2).enumerate() {
            let quote = self
                .quote_leg(pair[0], pair[1], VehicleMode::Private, passengers)
                .await
                .map_err(|e| e.at_leg(index))?;
            legs.push(quote);
        }

        let totals = calculators::sum_legs(&legs);
        Ok(CircuitQuote::from((totals, legs)))
    }

    /// Locations offering excursions (not cached; small and rarely read)
    pub async fn excursion_locations(&self) -> Result<Vec<String>, QuoteError> {
        self.backend.excursion_locations().await.map_err(transport)
    }

    /// Excursions at `location`
    pub async fn excursions(&self, location: &str) -> Result<Arc<Vec<Excursion>>, QuoteError> {
        let backend = Arc::clone(&self.backend);
        let location = location.trim().to_string();
        self.cache
            .excursions
            .get_or_fetch(
                &AppCache::excursions_key(&location),
                || async move {
                    backend
                        .fetch_excursions(&location)
                        .await
                        .map(Arc::new)
                        .map_err(transport)
                },
                None,
            )
            .await
            .map_err(|e| (*e).clone())
    }

    /// Active travel packages
    pub async fn packages(&self) -> Result<Arc<Vec<TravelPackage>>, QuoteError> {
        let backend = Arc::clone(&self.backend);
        self.cache
            .packages
            .get_or_fetch(
                &AppCache::packages_key(),
                || async move {
                    backend
                        .fetch_active_packages()
                        .await
                        .map(Arc::new)
                        .map_err(transport)
                },
                None,
            )
            .await
            .map_err(|e| (*e).clone())
    }
}

fn transport(e: crate::error::AppError) -> QuoteError {
    error!("Backend call failed: {}", e);
    QuoteError::Transport {
        message: e.to_string(),
    }
}
