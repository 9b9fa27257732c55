//! Access to the managed backend.
//!
//! Everything the core reads (locations, route details, excursions,
//! packages) goes through [`Backend`], so calculators can run against the
//! Postgres implementation or an in-memory one.

pub mod queries;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Excursion, Location, LocationId, TravelPackage};
use crate::pricing::RouteDetails;

pub use queries::PgBackend;

/// Read-only view of the managed backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Every location, sorted by name
    async fn fetch_locations(&self) -> Result<Vec<Location>>;

    /// Locations whose name contains `query` (case-insensitive), sorted by name
    async fn search_locations(&self, query: &str, limit: i64) -> Result<Vec<Location>>;

    /// Distance, duration and reference price between two locations.
    ///
    /// `None` when the backend returns no row for the pair.
    async fn route_details(
        &self,
        origin: LocationId,
        destination: LocationId,
    ) -> Result<Option<RouteDetails>>;

    /// Distinct locations that have excursions
    async fn excursion_locations(&self) -> Result<Vec<String>>;

    /// Excursions offered at `location`, ordered by Spanish title
    async fn fetch_excursions(&self, location: &str) -> Result<Vec<Excursion>>;

    /// Active travel packages in display order
    async fn fetch_active_packages(&self) -> Result<Vec<TravelPackage>>;
}
