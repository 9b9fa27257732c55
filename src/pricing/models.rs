//! Pricing value types.
//!
//! `RouteDetailsRow` maps the result set of the backend's
//! `calculate_reservation_details` function; the rest are inputs and
//! outputs of the calculators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::LocationId;

/// Taxi mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleMode {
    /// Colectivo: seats sold individually
    #[serde(rename = "colectivo")]
    Shared,
    /// Privado: the whole car
    #[serde(rename = "privado")]
    Private,
}

impl VehicleMode {
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleMode::Shared => "colectivo",
            VehicleMode::Private => "privado",
        }
    }
}

/// Vehicle category offered for circuits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCategory {
    Clasico,
    Moderno,
    Van,
}

impl VehicleCategory {
    pub fn display_name(self) -> &'static str {
        match self {
            VehicleCategory::Clasico => "Clásico",
            VehicleCategory::Moderno => "Moderno",
            VehicleCategory::Van => "Van",
        }
    }
}

/// Raw row returned by `calculate_reservation_details`
#[derive(Debug, Clone, FromRow)]
pub struct RouteDetailsRow {
    pub distancia_km: Option<Decimal>,
    pub tiempo_min: Option<Decimal>,
    pub precio: Option<Decimal>,
}

/// Distance, duration and 4-passenger private reference price for a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDetails {
    pub distance_km: Decimal,
    pub duration_minutes: Decimal,
    pub base_price: Decimal,
}

impl From<RouteDetailsRow> for RouteDetails {
    fn from(row: RouteDetailsRow) -> Self {
        Self {
            distance_km: row.distancia_km.unwrap_or(Decimal::ZERO),
            duration_minutes: row.tiempo_min.unwrap_or(Decimal::ZERO),
            base_price: row.precio.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Priced single leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Decimal,
    /// Kilometres, 1 decimal
    pub distance_km: Decimal,
    /// Whole minutes
    pub duration_minutes: Decimal,
    /// Hours, 1 decimal
    pub duration_hours: Decimal,
}

/// Lodging booked at one circuit stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accommodation {
    pub rooms: u32,
    pub nights: u32,
}

impl Default for Accommodation {
    fn default() -> Self {
        Self { rooms: 1, nights: 1 }
    }
}

/// One destination of a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStop {
    pub location_id: LocationId,
    #[serde(default)]
    pub accommodation: Option<Accommodation>,
}

impl CircuitStop {
    pub fn new(location_id: LocationId) -> Self {
        Self {
            location_id,
            accommodation: None,
        }
    }

    pub fn with_accommodation(location_id: LocationId, rooms: u32, nights: u32) -> Self {
        Self {
            location_id,
            accommodation: Some(Accommodation { rooms, nights }),
        }
    }
}

/// Progressive per-passenger pricing of an excursion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExcursionTiers {
    pub base_price: Decimal,
    /// Headcount included in the base price
    pub min_pax: Option<u32>,
    pub price_per_extra_pax: Option<Decimal>,
    pub tier2_threshold: Option<u32>,
    pub price_per_extra_pax_tier2: Option<Decimal>,
    pub max_pax: Option<u32>,
}

impl ExcursionTiers {
    pub fn flat(base_price: Decimal) -> Self {
        Self {
            base_price,
            ..Self::default()
        }
    }
}
