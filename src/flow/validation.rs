//! Form validation run before any backend call.

use chrono::NaiveDate;
use thiserror::Error;

use crate::directory::LocationDirectory;
use crate::models::{Excursion, LocationId};
use crate::pricing::{
    calculators::REFERENCE_PASSENGERS, CircuitRequest, CircuitStop, ExcursionBookingRequest,
    OtherServicesRequest, TripRequest, VehicleCategory, VehicleMode,
};

pub const MIN_CIRCUIT_STOPS: usize = 2;
pub const MAX_CIRCUIT_STOPS: usize = 10;
pub const MAX_ROOMS: u32 = 10;
pub const MAX_NIGHTS: u32 = 30;
pub const OTHER_SERVICES_MAX_PASSENGERS: u32 = 20;

/// Input rejected before quoting or booking
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Debes seleccionar origen y destino")]
    MissingEndpoints,

    #[error("Debes seleccionar el punto de origen")]
    MissingOrigin,

    #[error("El origen y destino no pueden ser iguales")]
    SameEndpoints,

    #[error("Debe haber al menos 1 persona")]
    NoPassengers,

    #[error("Máximo {max} personas permitidas")]
    TooManyPassengers { max: u32 },

    #[error("Fecha de viaje requerida")]
    MissingDate,

    #[error("La fecha no puede ser anterior a hoy")]
    DateInPast,

    #[error("Debes seleccionar un horario para viaje colectivo")]
    MissingSharedSchedule,

    #[error("Debes seleccionar una hora para viaje privado")]
    MissingTime,

    #[error("Debes seleccionar al menos {min} ciudad(es) de destino")]
    TooFewStops { min: usize },

    #[error("Máximo {max} ciudades en el circuito")]
    TooManyStops { max: usize },

    /// `stop` is 1-based
    #[error("El destino {stop} repite la ciudad anterior")]
    RepeatedStop { stop: usize },

    #[error("Ubicación desconocida: {0}")]
    UnknownLocation(LocationId),

    #[error("Debes seleccionar el tipo de vehículo")]
    MissingVehicle,

    #[error("La fecha final debe ser posterior a la fecha de inicio")]
    EndNotAfterStart,

    #[error("Para más de 4 personas debes seleccionar vehículo tipo Van")]
    VanRequired,

    #[error("El alojamiento solo está disponible en municipios (destino {stop})")]
    AccommodationNotOffered { stop: usize },

    #[error("Habitaciones entre 1 y {max}")]
    RoomsOutOfRange { max: u32 },

    #[error("Noches entre 1 y {max}")]
    NightsOutOfRange { max: u32 },

    #[error("Espera a que se calcule el precio")]
    NotPriced,
}

fn check_passengers(passengers: u32, max: u32) -> Result<(), ValidationError> {
    if passengers == 0 {
        return Err(ValidationError::NoPassengers);
    }
    if passengers > max {
        return Err(ValidationError::TooManyPassengers { max });
    }
    Ok(())
}

fn check_date(date: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let date = date.ok_or(ValidationError::MissingDate)?;
    if date < today {
        return Err(ValidationError::DateInPast);
    }
    Ok(date)
}

fn check_nights(nights: u32) -> Result<(), ValidationError> {
    if !(1..=MAX_NIGHTS).contains(&nights) {
        return Err(ValidationError::NightsOutOfRange { max: MAX_NIGHTS });
    }
    Ok(())
}

/// Inputs needed for a price: both endpoints, distinct, and a valid headcount
pub fn validate_trip_quote(
    request: &TripRequest,
    max_passengers: u32,
) -> Result<(LocationId, LocationId), ValidationError> {
    let (origin, destination) = request
        .origin
        .zip(request.destination)
        .ok_or(ValidationError::MissingEndpoints)?;
    if origin == destination {
        return Err(ValidationError::SameEndpoints);
    }
    check_passengers(request.passengers, max_passengers)?;
    Ok((origin, destination))
}

/// Full trip form, checked before hand-off
pub fn validate_trip(
    request: &TripRequest,
    today: NaiveDate,
    max_passengers: u32,
) -> Result<(), ValidationError> {
    validate_trip_quote(request, max_passengers)?;
    check_date(request.date, today)?;

    match request.mode {
        VehicleMode::Shared if request.shared_schedule.is_none() => {
            Err(ValidationError::MissingSharedSchedule)
        }
        VehicleMode::Private if request.time.is_none() => Err(ValidationError::MissingTime),
        _ => Ok(()),
    }
}

fn check_stops(
    origin: LocationId,
    stops: &[CircuitStop],
    directory: &LocationDirectory,
) -> Result<(), ValidationError> {
    if stops.len() > MAX_CIRCUIT_STOPS {
        return Err(ValidationError::TooManyStops {
            max: MAX_CIRCUIT_STOPS,
        });
    }

    let mut previous = origin;
    for (index, stop) in stops.iter().enumerate() {
        let number = index + 1;
        if stop.location_id == previous {
            return Err(ValidationError::RepeatedStop { stop: number });
        }
        previous = stop.location_id;

        let Some(accommodation) = stop.accommodation else {
            continue;
        };
        let location = directory
            .get(stop.location_id)
            .ok_or(ValidationError::UnknownLocation(stop.location_id))?;
        if !location.kind.accepts_accommodation() {
            return Err(ValidationError::AccommodationNotOffered { stop: number });
        }
        if !(1..=MAX_ROOMS).contains(&accommodation.rooms) {
            return Err(ValidationError::RoomsOutOfRange { max: MAX_ROOMS });
        }
        check_nights(accommodation.nights)?;
    }
    Ok(())
}

/// Inputs needed to price a circuit: origin, at least one stop, headcount
pub fn validate_circuit_quote(
    request: &CircuitRequest,
    directory: &LocationDirectory,
    max_passengers: u32,
) -> Result<LocationId, ValidationError> {
    let origin = request.origin.ok_or(ValidationError::MissingOrigin)?;
    if request.stops.is_empty() {
        return Err(ValidationError::TooFewStops { min: 1 });
    }
    check_stops(origin, &request.stops, directory)?;
    check_passengers(request.passengers, max_passengers)?;
    Ok(origin)
}

/// Full circuit form, checked before hand-off
pub fn validate_circuit(
    request: &CircuitRequest,
    directory: &LocationDirectory,
    today: NaiveDate,
    max_passengers: u32,
) -> Result<(), ValidationError> {
    validate_circuit_quote(request, directory, max_passengers)?;
    if request.stops.len() < MIN_CIRCUIT_STOPS {
        return Err(ValidationError::TooFewStops {
            min: MIN_CIRCUIT_STOPS,
        });
    }

    let vehicle = request.vehicle.ok_or(ValidationError::MissingVehicle)?;
    let start = check_date(request.start_date, today)?;
    if request.end_date.is_some_and(|end| end <= start) {
        return Err(ValidationError::EndNotAfterStart);
    }
    if request.passengers > REFERENCE_PASSENGERS && vehicle != VehicleCategory::Van {
        return Err(ValidationError::VanRequired);
    }
    Ok(())
}

pub fn validate_excursion_booking(
    request: &ExcursionBookingRequest,
    excursion: &Excursion,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    check_passengers(request.passengers, excursion.max_passengers().unwrap_or(u32::MAX))?;
    check_date(request.date, today)?;
    Ok(())
}

pub fn validate_other_services(
    request: &OtherServicesRequest,
    today: NaiveDate,
) -> Result<(), ValidationError> {
    check_passengers(request.passengers, OTHER_SERVICES_MAX_PASSENGERS)?;
    check_date(request.start_date, today)?;
    if let Some(nights) = request.nights {
        check_nights(nights)?;
    }
    Ok(())
}
