//! Estimates exposed to the presentation layer.

use rust_decimal::Decimal;
use serde::Serialize;

use super::calculators;
use super::models::{CircuitStop, PriceQuote};
use super::services::CircuitQuote;

/// Displayed estimate for a single trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripEstimate {
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub distance_km: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_minutes: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_hours: Decimal,
}

impl TripEstimate {
    /// All-zero estimate shown while nothing valid is available
    pub fn neutral() -> Self {
        Self {
            price: Decimal::ZERO,
            distance_km: Decimal::ZERO,
            duration_minutes: Decimal::ZERO,
            duration_hours: Decimal::ZERO,
        }
    }
}

impl From<PriceQuote> for TripEstimate {
    fn from(quote: PriceQuote) -> Self {
        Self {
            price: quote.price,
            distance_km: quote.distance_km,
            duration_minutes: quote.duration_minutes,
            duration_hours: quote.duration_hours,
        }
    }
}

/// Displayed estimate for a circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitEstimate {
    /// Transport for one day (sum of legs)
    #[serde(with = "rust_decimal::serde::str")]
    pub transport_per_day: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub distance_km: Decimal,
    /// Driving time over all legs
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_minutes: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub duration_hours: Decimal,
    pub days: u32,
    pub nights: u32,
    /// Transport for the whole circuit (per day x days)
    #[serde(with = "rust_decimal::serde::str")]
    pub transport_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub accommodation: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

impl CircuitEstimate {
    pub fn neutral() -> Self {
        Self {
            transport_per_day: Decimal::ZERO,
            distance_km: Decimal::ZERO,
            duration_minutes: Decimal::ZERO,
            duration_hours: Decimal::ZERO,
            days: 1,
            nights: 0,
            transport_total: Decimal::ZERO,
            accommodation: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    /// Layer per-day billing and lodging on top of the priced legs
    pub fn from_quote(quote: &CircuitQuote, stops: &[CircuitStop], nightly_rate: Decimal) -> Self {
        let days = calculators::circuit_days(stops);
        let accommodation = calculators::accommodation_cost(stops, nightly_rate);

        Self {
            transport_per_day: quote.transport_price,
            distance_km: quote.distance_km,
            duration_minutes: quote.duration_minutes,
            duration_hours: calculators::hours(quote.duration_minutes),
            days,
            nights: calculators::total_nights(stops),
            transport_total: quote.transport_price * Decimal::from(days),
            accommodation,
            total: calculators::circuit_total(quote.transport_price, days, accommodation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_circuit_estimate_from_quote() {
        let quote = CircuitQuote {
            transport_price: dec!(180),
            distance_km: dec!(270),
            duration_minutes: dec!(300),
            legs: vec![],
        };
        let stops = [CircuitStop::with_accommodation(2, 1, 2), CircuitStop::new(3)];

        let estimate = CircuitEstimate::from_quote(&quote, &stops, dec!(30));
        assert_eq!(estimate.duration_minutes, dec!(300));
        assert_eq!(estimate.duration_hours, dec!(5));
        assert_eq!(estimate.days, 3);
        assert_eq!(estimate.nights, 2);
        assert_eq!(estimate.transport_total, dec!(540));
        assert_eq!(estimate.accommodation, dec!(60));
        assert_eq!(estimate.total, dec!(600));
    }

    #[test]
    fn test_estimates_serialize_amounts_as_strings() {
        let json = serde_json::to_value(TripEstimate {
            price: dec!(120),
            distance_km: dec!(80.5),
            duration_minutes: dec!(95),
            duration_hours: dec!(1.6),
        })
        .unwrap();
        assert_eq!(json["price"], "120");
        assert_eq!(json["distance_km"], "80.5");
    }
}
