//! Booking inputs as collected by the site's forms.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::LocationId;

use super::models::{CircuitStop, VehicleCategory, VehicleMode};

/// Half-day slot for shared taxis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharedSchedule {
    #[serde(rename = "mañana")]
    Morning,
    #[serde(rename = "tarde")]
    Afternoon,
}

impl SharedSchedule {
    /// Nominal pickup time stored with the booking
    pub fn pickup_time(self) -> NaiveTime {
        let hour = match self {
            SharedSchedule::Morning => 0,
            SharedSchedule::Afternoon => 12,
        };
        NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            SharedSchedule::Morning => "Mañana",
            SharedSchedule::Afternoon => "Tarde",
        }
    }
}

/// Point-to-point taxi request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: Option<LocationId>,
    pub destination: Option<LocationId>,
    pub mode: VehicleMode,
    pub passengers: u32,
    pub date: Option<NaiveDate>,
    /// Clock time, private trips only
    #[serde(default)]
    pub time: Option<NaiveTime>,
    /// Half-day slot, shared trips only
    #[serde(default)]
    pub shared_schedule: Option<SharedSchedule>,
}

/// Inputs a trip price depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripPricingKey {
    pub origin: Option<LocationId>,
    pub destination: Option<LocationId>,
    pub mode: VehicleMode,
    pub passengers: u32,
}

impl TripRequest {
    /// Pickup time implied by the mode's own time field
    pub fn pickup_time(&self) -> Option<NaiveTime> {
        match self.mode {
            VehicleMode::Shared => self.shared_schedule.map(SharedSchedule::pickup_time),
            VehicleMode::Private => self.time,
        }
    }

    /// Inputs the trip price depends on; date and time do not affect it
    pub fn pricing_key(&self) -> TripPricingKey {
        TripPricingKey {
            origin: self.origin,
            destination: self.destination,
            mode: self.mode,
            passengers: self.passengers,
        }
    }
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            origin: None,
            destination: None,
            mode: VehicleMode::Shared,
            passengers: 1,
            date: None,
            time: None,
            shared_schedule: None,
        }
    }
}

/// Multi-city circuit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitRequest {
    pub origin: Option<LocationId>,
    #[serde(default)]
    pub stops: Vec<CircuitStop>,
    pub passengers: u32,
    pub vehicle: Option<VehicleCategory>,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub pickup_time: Option<NaiveTime>,
}

impl Default for CircuitRequest {
    fn default() -> Self {
        Self {
            origin: None,
            stops: Vec::new(),
            passengers: 1,
            vehicle: None,
            start_date: None,
            end_date: None,
            pickup_time: None,
        }
    }
}

/// Inputs a circuit price depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitPricingKey {
    pub origin: Option<LocationId>,
    pub stops: Vec<CircuitStop>,
    pub passengers: u32,
}

impl CircuitRequest {
    pub fn pricing_key(&self) -> CircuitPricingKey {
        CircuitPricingKey {
            origin: self.origin,
            stops: self.stops.clone(),
            passengers: self.passengers,
        }
    }
}

/// Excursion reservation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcursionBookingRequest {
    pub excursion_id: String,
    pub date: Option<NaiveDate>,
    pub passengers: u32,
}

/// Services quoted by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherService {
    Alojamiento,
    Guia,
    ClasesBaile,
    ExcursionCaballo,
}

impl OtherService {
    pub fn label(self) -> &'static str {
        match self {
            OtherService::Alojamiento => "Alojamiento",
            OtherService::Guia => "Guía turístico",
            OtherService::ClasesBaile => "Clases de baile",
            OtherService::ExcursionCaballo => "Excursión a caballo",
        }
    }
}

/// Inquiry for a service without an automatic price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherServicesRequest {
    pub service: OtherService,
    pub passengers: u32,
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub nights: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
}
