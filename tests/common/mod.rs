//! In-memory backend and fixtures shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kubaxi_core::cache::ManualClock;
use kubaxi_core::error::{AppError, Result};
use kubaxi_core::models::{Excursion, Location, LocationId, LocationKind, TravelPackage};
use kubaxi_core::pricing::RouteDetails;
use kubaxi_core::{AppCache, AppConfig, Backend, LocationDirectory, QuoteService};

pub const HAVANA: LocationId = 1;
pub const VINALES: LocationId = 2;
pub const TRINIDAD: LocationId = 3;
pub const VARADERO: LocationId = 4;
pub const SANTIAGO: LocationId = 5;
pub const CAYO_COCO: LocationId = 6;

type Pair = (LocationId, LocationId);

/// Scripted backend that counts its calls
#[derive(Default)]
pub struct FakeBackend {
    locations: Vec<Location>,
    routes: Mutex<HashMap<Pair, RouteDetails>>,
    failing: Mutex<HashSet<Pair>>,
    delays: Mutex<HashMap<Pair, Duration>>,
    excursions: Vec<Excursion>,
    packages: Vec<TravelPackage>,
    route_calls: AtomicUsize,
    location_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            locations: sample_locations(),
            ..Self::default()
        }
    }

    pub fn with_catalog(mut self, excursions: Vec<Excursion>, packages: Vec<TravelPackage>) -> Self {
        self.excursions = excursions;
        self.packages = packages;
        self
    }

    /// Route with the given distance (km), duration (min) and reference price
    pub fn route(&self, origin: LocationId, destination: LocationId, km: i64, minutes: i64, price: i64) {
        self.routes.lock().unwrap().insert(
            (origin, destination),
            RouteDetails {
                distance_km: Decimal::from(km),
                duration_minutes: Decimal::from(minutes),
                base_price: Decimal::from(price),
            },
        );
    }

    /// Make calls for this pair fail as if the backend were down
    pub fn fail(&self, origin: LocationId, destination: LocationId) {
        self.failing.lock().unwrap().insert((origin, destination));
    }

    pub fn recover(&self, origin: LocationId, destination: LocationId) {
        self.failing.lock().unwrap().remove(&(origin, destination));
    }

    pub fn delay(&self, origin: LocationId, destination: LocationId, by: Duration) {
        self.delays.lock().unwrap().insert((origin, destination), by);
    }

    pub fn route_calls(&self) -> usize {
        self.route_calls.load(Ordering::SeqCst)
    }

    pub fn location_calls(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_locations(&self) -> Result<Vec<Location>> {
        self.location_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.locations.clone())
    }

    async fn search_locations(&self, query: &str, limit: i64) -> Result<Vec<Location>> {
        let query = query.to_lowercase();
        let mut found: Vec<Location> = self
            .locations
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&query))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn route_details(
        &self,
        origin: LocationId,
        destination: LocationId,
    ) -> Result<Option<RouteDetails>> {
        self.route_calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(&(origin, destination)).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&(origin, destination)) {
            return Err(AppError::Internal("connection reset".to_string()));
        }
        Ok(self.routes.lock().unwrap().get(&(origin, destination)).copied())
    }

    async fn excursion_locations(&self) -> Result<Vec<String>> {
        let mut locations: Vec<String> = self.excursions.iter().map(|e| e.location.clone()).collect();
        locations.sort();
        locations.dedup();
        Ok(locations)
    }

    async fn fetch_excursions(&self, location: &str) -> Result<Vec<Excursion>> {
        Ok(self
            .excursions
            .iter()
            .filter(|e| e.location == location)
            .cloned()
            .collect())
    }

    async fn fetch_active_packages(&self) -> Result<Vec<TravelPackage>> {
        Ok(self.packages.iter().filter(|p| p.active).cloned().collect())
    }
}

fn location(id: LocationId, name: &str, kind: &str, province: &str, region: &str) -> Location {
    Location {
        id,
        name: name.to_string(),
        code: String::new(),
        region: region.to_string(),
        kind: LocationKind::from_label(kind),
        province: province.to_string(),
    }
}

pub fn sample_locations() -> Vec<Location> {
    vec![
        location(CAYO_COCO, "Cayo Coco", "cayo", "Ciego de Ávila", "Centro"),
        location(HAVANA, "La Habana", "municipio turistico", "La Habana", "Occidente"),
        location(SANTIAGO, "Santiago de Cuba", "municipio", "Santiago de Cuba", "Oriente"),
        location(TRINIDAD, "Trinidad", "municipio turistico", "Sancti Spíritus", "Centro"),
        location(VARADERO, "Varadero", "municipio turistico", "Matanzas", "Occidente"),
        location(VINALES, "Viñales", "municipio", "Pinar del Río", "Occidente"),
    ]
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap()))
}

/// Service over `backend` with its own cache and a hand-driven clock
pub fn service(backend: &Arc<FakeBackend>, clock: &Arc<ManualClock>) -> QuoteService {
    let cache = AppCache::with_clock(&AppConfig::default(), clock.clone());
    QuoteService::new(backend.clone(), cache)
}

pub fn directory() -> Arc<LocationDirectory> {
    Arc::new(LocationDirectory::new(Arc::new(sample_locations())))
}
