//! Core pricing calculation functions.
//!
//! Pure functions for pricing math - no database or cache access.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use super::models::{CircuitStop, ExcursionTiers, PriceQuote, RouteDetails, VehicleMode};
use super::services::QuoteError;

/// Passengers covered by the private reference price
pub const REFERENCE_PASSENGERS: u32 = 4;

const TEN: Decimal = Decimal::TEN;
const SIXTY: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Round to a "friendly" fare.
///
/// Works on the integer part only:
/// - ends in 5: kept as is
/// - ends in 6-9: up to the next multiple of ten
/// - ends in 0-4: down to the multiple of ten at or below
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use kubaxi_core::pricing::custom_round;
///
/// assert_eq!(custom_round(dec!(125.9)), dec!(125));
/// assert_eq!(custom_round(dec!(126)), dec!(130));
/// assert_eq!(custom_round(dec!(124)), dec!(120));
/// ```
pub fn custom_round(value: Decimal) -> Decimal {
    let whole = value.floor();
    let unit = whole % TEN;

    if unit == Decimal::from(5) {
        whole
    } else if unit >= Decimal::from(6) {
        (whole / TEN + Decimal::ONE).floor() * TEN
    } else {
        (whole / TEN).floor() * TEN
    }
}

/// Round half away from zero to `places` decimals.
///
/// Matches `Math.round(x * 10^places) / 10^places` for non-negative amounts,
/// which is how fares and distances have always been displayed.
pub fn round_half_up(amount: Decimal, places: u32) -> Decimal {
    amount
        .round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

/// Price one leg from its route details.
///
/// The backend price is the private fare for up to four passengers; the
/// per-seat unit is a quarter of it, rounded with [`custom_round`].
pub fn price_leg(
    details: &RouteDetails,
    mode: VehicleMode,
    passengers: u32,
) -> Result<PriceQuote, QuoteError> {
    if passengers == 0 {
        return Err(QuoteError::validation("Debe haber al menos 1 persona"));
    }

    let base_price = details.base_price;
    let seats = Decimal::from(passengers);
    let per_passenger = custom_round(base_price / Decimal::from(REFERENCE_PASSENGERS));

    let price = match mode {
        VehicleMode::Shared => custom_round(per_passenger * seats),
        VehicleMode::Private if passengers <= REFERENCE_PASSENGERS => base_price,
        VehicleMode::Private => round_half_up(per_passenger * seats, 2),
    };

    // A zero fare means the backend knows no route between the two points
    if price <= Decimal::ZERO {
        return Err(QuoteError::RouteUnavailable { leg: None });
    }

    Ok(PriceQuote {
        price,
        distance_km: round_half_up(details.distance_km, 1),
        duration_minutes: round_half_up(details.duration_minutes, 0),
        duration_hours: hours(details.duration_minutes),
    })
}

/// Minutes as hours with one decimal
pub fn hours(minutes: Decimal) -> Decimal {
    round_half_up(minutes / SIXTY, 1)
}

/// Sum of consecutive legs of a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegTotals {
    /// Whole currency units
    pub price: Decimal,
    /// Kilometres, 1 decimal
    pub distance_km: Decimal,
    pub duration_minutes: Decimal,
}

/// Aggregate already priced legs
pub fn sum_legs(legs: &[PriceQuote]) -> LegTotals {
    let (price, distance, minutes) = legs.iter().fold(
        (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        |(p, d, m), leg| (p + leg.price, d + leg.distance_km, m + leg.duration_minutes),
    );

    LegTotals {
        price: round_half_up(price, 0),
        distance_km: round_half_up(distance, 1),
        duration_minutes: minutes,
    }
}

/// Total lodging charge: rooms x nights x nightly rate over every stop
pub fn accommodation_cost(stops: &[CircuitStop], nightly_rate: Decimal) -> Decimal {
    stops
        .iter()
        .filter_map(|stop| stop.accommodation)
        .map(|a| Decimal::from(a.rooms) * Decimal::from(a.nights) * nightly_rate)
        .sum()
}

/// Nights booked across the circuit
pub fn total_nights(stops: &[CircuitStop]) -> u32 {
    stops
        .iter()
        .filter_map(|stop| stop.accommodation)
        .map(|a| a.nights)
        .sum()
}

/// Days the car is hired: one per night plus the travel day
pub fn circuit_days(stops: &[CircuitStop]) -> u32 {
    total_nights(stops) + 1
}

/// Transport is billed per day of the circuit, lodging on top
pub fn circuit_total(transport_per_day: Decimal, days: u32, accommodation: Decimal) -> Decimal {
    transport_per_day * Decimal::from(days) + accommodation
}

/// Excursion price for a group using the two-bracket ladder.
///
/// Passengers up to `min_pax` are included in the base price. Extra
/// passengers pay the first rate up to and including `tier2_threshold`,
/// the second rate beyond it.
pub fn excursion_price(tiers: &ExcursionTiers, passengers: u32) -> Decimal {
    let min_pax = tiers.min_pax.unwrap_or(1);

    let per_pax = match tiers.price_per_extra_pax {
        Some(rate) if passengers > min_pax => rate,
        _ => return tiers.base_price,
    };

    match (tiers.tier2_threshold, tiers.price_per_extra_pax_tier2) {
        (Some(threshold), Some(tier2_rate)) if passengers > threshold => {
            let tier1_pax = threshold.saturating_sub(min_pax);
            tiers.base_price
                + Decimal::from(tier1_pax) * per_pax
                + Decimal::from(passengers - threshold) * tier2_rate
        }
        _ => tiers.base_price + Decimal::from(passengers - min_pax) * per_pax,
    }
}
