mod common;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use kubaxi_core::booking::{BookingMessage, ContactDetails};
use kubaxi_core::flow::ValidationError;
use kubaxi_core::pricing::{
    CircuitEstimate, CircuitRequest, CircuitStop, SharedSchedule, TripEstimate, TripRequest,
    VehicleCategory, VehicleMode,
};
use kubaxi_core::{AppConfig, CircuitCalculator, FlowState, TripCalculator};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn trip_calculator(backend: &Arc<FakeBackend>) -> TripCalculator {
    let service = service(backend, &manual_clock());
    TripCalculator::from_config(service, directory(), &AppConfig::default())
}

fn circuit_calculator(backend: &Arc<FakeBackend>) -> CircuitCalculator {
    let service = service(backend, &manual_clock());
    CircuitCalculator::from_config(service, directory(), &AppConfig::default())
}

fn shared_trip(destination: i64) -> TripRequest {
    TripRequest {
        origin: Some(HAVANA),
        destination: Some(destination),
        mode: VehicleMode::Shared,
        passengers: 2,
        date: Some(today()),
        time: None,
        shared_schedule: Some(SharedSchedule::Morning),
    }
}

#[tokio::test]
async fn test_trip_reaches_ready() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, VINALES, 180, 165, 100);
    let calculator = trip_calculator(&backend);
    assert_eq!(calculator.state(), FlowState::Idle);

    let view = calculator.update(&mut shared_trip(VINALES)).await;

    assert_eq!(view.state, FlowState::Ready);
    assert_eq!(view.estimate.price, dec!(50));
    assert_eq!(view.estimate.distance_km, dec!(180));
    assert_eq!(calculator.view(), view);
}

#[tokio::test]
async fn test_trip_validation_error_skips_backend() {
    let backend = Arc::new(FakeBackend::new());
    let calculator = trip_calculator(&backend);

    let view = calculator.update(&mut shared_trip(HAVANA)).await;

    assert_eq!(
        view.state,
        FlowState::Error("El origen y destino no pueden ser iguales".to_string())
    );
    assert_eq!(view.estimate, TripEstimate::neutral());
    assert_eq!(backend.route_calls(), 0);
}

#[tokio::test]
async fn test_trip_error_resets_numbers() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, VINALES, 180, 165, 100);
    backend.fail(HAVANA, TRINIDAD);
    let calculator = trip_calculator(&backend);

    let view = calculator.update(&mut shared_trip(VINALES)).await;
    assert_eq!(view.state, FlowState::Ready);

    let view = calculator.update(&mut shared_trip(TRINIDAD)).await;
    assert_eq!(
        view.state.error(),
        Some("Error al calcular el precio. Inténtalo de nuevo en unos minutos.")
    );
    assert_eq!(view.estimate.price, Decimal::ZERO);
    assert_eq!(view.estimate.distance_km, Decimal::ZERO);
    assert!(!view.state.can_submit());
}

#[tokio::test]
async fn test_oriente_trip_switches_to_private() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, SANTIAGO, 860, 900, 400);
    let calculator = trip_calculator(&backend);

    let mut request = shared_trip(SANTIAGO);
    let view = calculator.update(&mut request).await;

    assert_eq!(request.mode, VehicleMode::Private);
    assert_eq!(request.shared_schedule, None);
    assert_eq!(view.estimate.price, dec!(400));
}

#[tokio::test]
async fn test_stale_trip_result_is_discarded() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, VINALES, 180, 165, 100);
    backend.route(HAVANA, TRINIDAD, 320, 300, 200);
    backend.delay(HAVANA, VINALES, Duration::from_millis(200));
    let calculator = trip_calculator(&backend);

    let mut slow = shared_trip(VINALES);
    let mut fast = shared_trip(TRINIDAD);
    tokio::join!(calculator.update(&mut slow), async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        calculator.update(&mut fast).await
    });

    let view = calculator.view();
    assert_eq!(view.state, FlowState::Ready);
    // Trinidad: unit 50, two seats
    assert_eq!(view.estimate.price, dec!(100));
    assert_eq!(view.estimate.distance_km, dec!(320));
}

#[tokio::test]
async fn test_reset_returns_to_idle() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, VINALES, 180, 165, 100);
    let calculator = trip_calculator(&backend);

    calculator.update(&mut shared_trip(VINALES)).await;
    calculator.reset();

    assert_eq!(calculator.state(), FlowState::Idle);
    assert_eq!(calculator.view().estimate, TripEstimate::neutral());
}

#[tokio::test]
async fn test_trip_booking_message() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, VINALES, 180, 165, 100);
    let calculator = trip_calculator(&backend);
    let mut request = TripRequest {
        mode: VehicleMode::Private,
        time: NaiveTime::from_hms_opt(9, 30, 0),
        shared_schedule: None,
        ..shared_trip(VINALES)
    };

    assert_eq!(
        calculator.booking_message(&request, today()).unwrap_err(),
        ValidationError::NotPriced
    );

    calculator.update(&mut request).await;
    let message = calculator.booking_message(&request, today()).unwrap();
    let text = message.render("Kubaxi");

    assert!(matches!(message, BookingMessage::TaxiTrip(_)));
    assert!(text.contains("📍 Origen: La Habana"));
    assert!(text.contains("📍 Destino: Viñales"));
    assert!(text.contains("⏰ Hora: 09:30"));
    assert!(text.contains("💰 Precio Total: $100"));

    let past = TripRequest {
        date: today().pred_opt(),
        ..request
    };
    assert_eq!(
        calculator.booking_message(&past, today()).unwrap_err(),
        ValidationError::DateInPast
    );
}

#[tokio::test]
async fn test_trip_booking_rejects_inputs_that_were_not_priced() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, VINALES, 180, 165, 100);
    let calculator = trip_calculator(&backend);
    let mut request = TripRequest {
        mode: VehicleMode::Private,
        time: NaiveTime::from_hms_opt(9, 30, 0),
        shared_schedule: None,
        ..shared_trip(VINALES)
    };
    calculator.update(&mut request).await;

    let elsewhere = TripRequest {
        destination: Some(TRINIDAD),
        passengers: 3,
        ..request.clone()
    };
    assert_eq!(
        calculator.booking_message(&elsewhere, today()).unwrap_err(),
        ValidationError::NotPriced
    );
    let more_people = TripRequest {
        passengers: 3,
        ..request.clone()
    };
    assert_eq!(
        calculator.booking_message(&more_people, today()).unwrap_err(),
        ValidationError::NotPriced
    );

    // Date and time do not change the fare
    let later = TripRequest {
        date: today().succ_opt(),
        time: NaiveTime::from_hms_opt(15, 0, 0),
        ..request
    };
    assert!(calculator.booking_message(&later, today()).is_ok());
}

#[tokio::test]
async fn test_recalculation_hides_previous_numbers() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, VINALES, 180, 165, 100);
    backend.route(HAVANA, TRINIDAD, 320, 300, 200);
    backend.delay(HAVANA, TRINIDAD, Duration::from_millis(200));
    let calculator = trip_calculator(&backend);

    let view = calculator.update(&mut shared_trip(VINALES)).await;
    assert_eq!(view.estimate.price, dec!(50));

    let mut request = shared_trip(TRINIDAD);
    let (_, during) = tokio::join!(calculator.update(&mut request), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        calculator.view()
    });

    assert_eq!(during.state, FlowState::Calculating);
    assert_eq!(during.estimate, TripEstimate::neutral());
    assert_eq!(calculator.view().estimate.price, dec!(100));
}

fn circuit_request() -> CircuitRequest {
    CircuitRequest {
        origin: Some(HAVANA),
        stops: vec![
            CircuitStop::with_accommodation(TRINIDAD, 1, 2),
            CircuitStop::new(VARADERO),
        ],
        passengers: 2,
        vehicle: Some(VehicleCategory::Moderno),
        start_date: NaiveDate::from_ymd_opt(2026, 11, 1),
        end_date: NaiveDate::from_ymd_opt(2026, 11, 3),
        pickup_time: NaiveTime::from_hms_opt(8, 0, 0),
    }
}

#[tokio::test]
async fn test_circuit_estimate_includes_lodging() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, TRINIDAD, 150, 240, 100);
    backend.route(TRINIDAD, VARADERO, 120, 180, 80);
    let calculator = circuit_calculator(&backend);

    let view = calculator.update(&circuit_request()).await;

    assert_eq!(view.state, FlowState::Ready);
    assert_eq!(
        view.estimate,
        CircuitEstimate {
            transport_per_day: dec!(180),
            distance_km: dec!(270.0),
            duration_minutes: dec!(420),
            duration_hours: dec!(7),
            days: 3,
            nights: 2,
            transport_total: dec!(540),
            accommodation: dec!(60),
            total: dec!(600),
        }
    );
}

#[tokio::test]
async fn test_circuit_leg_failure_reported() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, TRINIDAD, 150, 240, 100);
    let calculator = circuit_calculator(&backend);

    let view = calculator.update(&circuit_request()).await;

    assert_eq!(
        view.state.error(),
        Some("No se pudo calcular el precio entre ciudades 1 y 2")
    );
    assert_eq!(view.estimate, CircuitEstimate::neutral());
}

#[tokio::test]
async fn test_circuit_lodging_on_cay_rejected() {
    let backend = Arc::new(FakeBackend::new());
    let calculator = circuit_calculator(&backend);
    let request = CircuitRequest {
        stops: vec![CircuitStop::with_accommodation(CAYO_COCO, 1, 1)],
        ..circuit_request()
    };

    let view = calculator.update(&request).await;

    assert_eq!(
        view.state.error(),
        Some("El alojamiento solo está disponible en municipios (destino 1)")
    );
    assert_eq!(backend.route_calls(), 0);
}

#[tokio::test]
async fn test_circuit_booking_message() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, TRINIDAD, 150, 240, 100);
    backend.route(TRINIDAD, VARADERO, 120, 180, 80);
    let calculator = circuit_calculator(&backend);
    let request = circuit_request();

    calculator.update(&request).await;
    let contact = ContactDetails {
        name: Some("Marie".to_string()),
        ..ContactDetails::default()
    };
    let text = calculator
        .booking_message(&request, today(), contact)
        .unwrap()
        .render("Kubaxi");

    assert!(text.contains("🏁 Origen: La Habana"));
    assert!(text.contains("📍 Destino 1: Trinidad (🏨 2 noches, 1 hab)"));
    assert!(text.contains("📍 Destino 2: Varadero"));
    assert!(text.contains("🏁 Destino Final: Varadero"));
    assert!(text.contains("🚕 Transporte (24hrs): $540"));
    assert!(text.contains("💵 *TOTAL: $600*"));
    assert!(text.contains("⏰ Hora de recogida: 08:00"));
}

#[tokio::test]
async fn test_circuit_submission_needs_van_for_large_groups() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, TRINIDAD, 150, 240, 100);
    backend.route(TRINIDAD, VARADERO, 120, 180, 80);
    let calculator = circuit_calculator(&backend);
    let request = CircuitRequest {
        passengers: 6,
        ..circuit_request()
    };

    let view = calculator.update(&request).await;
    assert_eq!(view.state, FlowState::Ready);
    assert_eq!(
        calculator
            .booking_message(&request, today(), ContactDetails::default())
            .unwrap_err(),
        ValidationError::VanRequired
    );
}

#[tokio::test]
async fn test_circuit_booking_rejects_changed_lodging() {
    let backend = Arc::new(FakeBackend::new());
    backend.route(HAVANA, TRINIDAD, 150, 240, 100);
    backend.route(TRINIDAD, VARADERO, 120, 180, 80);
    let calculator = circuit_calculator(&backend);
    let priced = CircuitRequest {
        stops: vec![CircuitStop::new(TRINIDAD), CircuitStop::new(VARADERO)],
        ..circuit_request()
    };
    calculator.update(&priced).await;
    assert!(calculator
        .booking_message(&priced, today(), ContactDetails::default())
        .is_ok());

    let with_lodging = CircuitRequest {
        stops: vec![
            CircuitStop::with_accommodation(TRINIDAD, 3, 10),
            CircuitStop::new(VARADERO),
        ],
        ..priced.clone()
    };
    assert_eq!(
        calculator
            .booking_message(&with_lodging, today(), ContactDetails::default())
            .unwrap_err(),
        ValidationError::NotPriced
    );

    let more_people = CircuitRequest {
        passengers: 3,
        ..priced
    };
    assert_eq!(
        calculator
            .booking_message(&more_people, today(), ContactDetails::default())
            .unwrap_err(),
        ValidationError::NotPriced
    );
}
