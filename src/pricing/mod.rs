//! Pricing engine module.
//!
//! Turns origin/destination pairs, passenger counts and vehicle choices
//! into fares, and prices excursions and multi-city circuits.

pub mod calculators;
pub mod models;
pub mod requests;
pub mod responses;
pub mod services;

// Re-export commonly used items
pub use calculators::{custom_round, excursion_price, price_leg, round_half_up};
pub use models::{
    Accommodation, CircuitStop, ExcursionTiers, PriceQuote, RouteDetails, RouteDetailsRow,
    VehicleCategory, VehicleMode,
};
pub use requests::{
    CircuitPricingKey, CircuitRequest, ExcursionBookingRequest, OtherService, OtherServicesRequest,
    SharedSchedule, TripPricingKey, TripRequest,
};
pub use responses::{CircuitEstimate, TripEstimate};
pub use services::{CircuitQuote, QuoteError, QuoteService};
