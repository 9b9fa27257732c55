//! Multi-city circuit flow

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

use crate::booking::{BookingMessage, CircuitDetails, ContactDetails, ItineraryStop};
use crate::config::AppConfig;
use crate::directory::LocationDirectory;
use crate::models::LocationId;
use crate::pricing::{CircuitEstimate, CircuitPricingKey, CircuitRequest, QuoteService};

use super::validation::{self, ValidationError};
use super::{Flow, FlowState, FlowView};

/// Keeps the estimate of a circuit form in step with its inputs
pub struct CircuitCalculator {
    service: QuoteService,
    directory: Arc<LocationDirectory>,
    max_passengers: u32,
    nightly_rate: Decimal,
    flow: Flow<CircuitEstimate, CircuitPricingKey>,
}

impl CircuitCalculator {
    pub fn new(
        service: QuoteService,
        directory: Arc<LocationDirectory>,
        max_passengers: u32,
        nightly_rate: Decimal,
    ) -> Self {
        Self {
            service,
            directory,
            max_passengers,
            nightly_rate,
            flow: Flow::new(CircuitEstimate::neutral()),
        }
    }

    pub fn from_config(
        service: QuoteService,
        directory: Arc<LocationDirectory>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            service,
            directory,
            config.circuit_max_passengers,
            config.nightly_rate,
        )
    }

    pub fn view(&self) -> FlowView<CircuitEstimate> {
        self.flow.snapshot()
    }

    pub fn state(&self) -> FlowState {
        self.flow.state()
    }

    pub fn reset(&self) {
        self.flow.reset();
    }

    /// Recalculate after any change to origin, stops, lodging or headcount
    pub async fn update(&self, request: &CircuitRequest) -> FlowView<CircuitEstimate> {
        let generation = self.flow.begin();

        let origin = match validation::validate_circuit_quote(request, &self.directory, self.max_passengers)
        {
            Ok(origin) => origin,
            Err(e) => {
                self.flow.fail(generation, e.to_string());
                return self.flow.snapshot();
            }
        };

        self.flow.calculating(generation);
        let result = self
            .service
            .quote_circuit(origin, &request.stops, request.passengers)
            .await;

        match result {
            Ok(quote) => {
                let estimate = CircuitEstimate::from_quote(&quote, &request.stops, self.nightly_rate);
                debug!(
                    "Circuit of {} legs priced at {} ({} days)",
                    quote.legs.len(),
                    estimate.total,
                    estimate.days
                );
                self.flow.ready(generation, request.pricing_key(), estimate);
            }
            Err(e) => {
                self.flow.fail(generation, e.user_message());
            }
        }
        self.flow.snapshot()
    }

    /// Build the chat message for a fully valid circuit whose route, lodging
    /// and headcount match the ready estimate
    pub fn booking_message(
        &self,
        request: &CircuitRequest,
        today: NaiveDate,
        contact: ContactDetails,
    ) -> Result<BookingMessage, ValidationError> {
        validation::validate_circuit(request, &self.directory, today, self.max_passengers)?;
        let estimate = self
            .flow
            .priced_for(&request.pricing_key())
            .ok_or(ValidationError::NotPriced)?;

        let name_of = |id: LocationId| {
            self.directory
                .get(id)
                .map(|l| l.name.clone())
                .unwrap_or_default()
        };
        let stops = request
            .stops
            .iter()
            .map(|stop| ItineraryStop {
                name: name_of(stop.location_id),
                accommodation: stop.accommodation,
            })
            .collect();

        Ok(BookingMessage::Circuit(CircuitDetails {
            contact,
            origin: request.origin.map(name_of),
            stops,
            people: request.passengers,
            vehicle: request.vehicle,
            start_date: request.start_date,
            end_date: request.end_date,
            pickup_time: request.pickup_time,
            days: estimate.days,
            distance_km: estimate.distance_km,
            transport_price: estimate.transport_total,
            accommodation_price: estimate.accommodation,
            total_price: estimate.total,
        }))
    }
}
