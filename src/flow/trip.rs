//! Point-to-point trip flow

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

use crate::booking::{BookingMessage, TaxiTripDetails};
use crate::config::AppConfig;
use crate::directory::{enforce_region_rule, LocationDirectory};
use crate::models::LocationId;
use crate::pricing::{QuoteService, TripEstimate, TripPricingKey, TripRequest, VehicleMode};

use super::validation::{self, ValidationError};
use super::{Flow, FlowState, FlowView};

/// Keeps the estimate of a trip form in step with its inputs
pub struct TripCalculator {
    service: QuoteService,
    directory: Arc<LocationDirectory>,
    max_passengers: u32,
    flow: Flow<TripEstimate, TripPricingKey>,
}

impl TripCalculator {
    pub fn new(service: QuoteService, directory: Arc<LocationDirectory>, max_passengers: u32) -> Self {
        Self {
            service,
            directory,
            max_passengers,
            flow: Flow::new(TripEstimate::neutral()),
        }
    }

    pub fn from_config(
        service: QuoteService,
        directory: Arc<LocationDirectory>,
        config: &AppConfig,
    ) -> Self {
        Self::new(service, directory, config.trip_max_passengers)
    }

    pub fn directory(&self) -> &LocationDirectory {
        &self.directory
    }

    pub fn view(&self) -> FlowView<TripEstimate> {
        self.flow.snapshot()
    }

    pub fn state(&self) -> FlowState {
        self.flow.state()
    }

    pub fn reset(&self) {
        self.flow.reset();
    }

    /// Recalculate after any input change.
    ///
    /// Applies the Oriente rule to `request` first. A result superseded by a
    /// later call is dropped; the returned view is whatever is current.
    pub async fn update(&self, request: &mut TripRequest) -> FlowView<TripEstimate> {
        let generation = self.flow.begin();

        let origin = request.origin.and_then(|id| self.directory.get(id));
        let destination = request.destination.and_then(|id| self.directory.get(id));
        if enforce_region_rule(request, origin, destination) {
            info!("Route touches Oriente, switched to private");
        }

        let (origin, destination) = match validation::validate_trip_quote(request, self.max_passengers) {
            Ok(pair) => pair,
            Err(e) => {
                self.flow.fail(generation, e.to_string());
                return self.flow.snapshot();
            }
        };

        self.flow.calculating(generation);
        let result = self
            .service
            .quote_leg(origin, destination, request.mode, request.passengers)
            .await;

        match result {
            Ok(quote) => {
                debug!("Trip {} -> {} priced at {}", origin, destination, quote.price);
                self.flow
                    .ready(generation, request.pricing_key(), TripEstimate::from(quote));
            }
            Err(e) => {
                self.flow.fail(generation, e.user_message());
            }
        }
        self.flow.snapshot()
    }

    /// Build the chat message for a fully valid trip.
    ///
    /// Fails with `NotPriced` unless the ready estimate was priced for this
    /// very origin, destination, mode and headcount.
    pub fn booking_message(
        &self,
        request: &TripRequest,
        today: NaiveDate,
    ) -> Result<BookingMessage, ValidationError> {
        validation::validate_trip(request, today, self.max_passengers)?;
        let estimate = self
            .flow
            .priced_for(&request.pricing_key())
            .ok_or(ValidationError::NotPriced)?;

        let name = |id: LocationId| self.directory.get(id).map(|l| l.name.clone());
        let time = match request.mode {
            VehicleMode::Shared => request.shared_schedule.map(|s| s.label().to_string()),
            VehicleMode::Private => request.time.map(|t| t.format("%H:%M").to_string()),
        };

        Ok(BookingMessage::TaxiTrip(TaxiTripDetails {
            origin: request.origin.and_then(name),
            destination: request.destination.and_then(name),
            date: request.date,
            time,
            passengers: Some(request.passengers),
            price: Some(estimate.price),
        }))
    }
}
