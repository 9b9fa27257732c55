//! Booking messages and the WhatsApp hand-off.
//!
//! Nothing is persisted: a booking is a prefilled chat message opened in
//! the operator's WhatsApp. Missing fields render as "N/A".

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::fmt::Display;
use tracing::info;

use crate::config::AppConfig;
use crate::i18n::Locale;
use crate::models::{Excursion, TravelPackage};
use crate::pricing::{Accommodation, ExcursionBookingRequest, OtherServicesRequest, VehicleCategory};

const NOT_AVAILABLE: &str = "N/A";

/// Customer fields shared by most forms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxiTripDetails {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    /// Clock time, or the shared half-day label
    pub time: Option<String>,
    pub passengers: Option<u32>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcursionDetails {
    pub contact: ContactDetails,
    pub excursion: Option<String>,
    pub date: Option<NaiveDate>,
    pub people: Option<u32>,
    pub price: Option<Decimal>,
}

impl ExcursionDetails {
    pub fn new(
        excursion: &Excursion,
        request: &ExcursionBookingRequest,
        locale: Locale,
        contact: ContactDetails,
    ) -> Self {
        Self {
            contact,
            excursion: Some(excursion.title(locale).to_string()),
            date: request.date,
            people: Some(request.passengers),
            price: Some(excursion.price_for(request.passengers)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDetails {
    pub contact: ContactDetails,
    pub package: Option<String>,
    pub date: Option<NaiveDate>,
    pub people: Option<u32>,
    pub price: Option<Decimal>,
}

impl PackageDetails {
    pub fn new(
        package: &TravelPackage,
        date: Option<NaiveDate>,
        people: u32,
        locale: Locale,
        contact: ContactDetails,
    ) -> Self {
        Self {
            contact,
            package: Some(package.name.get(locale).to_string()),
            date,
            people: Some(people),
            price: Some(package.price),
        }
    }
}

/// Free-form request quoted by hand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomRequestDetails {
    pub contact: ContactDetails,
    pub travellers: Option<u32>,
    pub date: Option<NaiveDate>,
    pub duration: Option<String>,
    pub description: Option<String>,
}

impl CustomRequestDetails {
    pub fn from_other_services(request: &OtherServicesRequest, contact: ContactDetails) -> Self {
        let mut description = request.service.label().to_string();
        if let Some(location) = request.location.as_deref().filter(|l| !l.trim().is_empty()) {
            description.push_str(&format!(" en {}", location.trim()));
        }

        Self {
            contact,
            travellers: Some(request.passengers),
            date: request.start_date,
            duration: request.nights.map(nights_label),
            description: Some(description),
        }
    }
}

/// One stop of a circuit itinerary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryStop {
    pub name: String,
    pub accommodation: Option<Accommodation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitDetails {
    pub contact: ContactDetails,
    pub origin: Option<String>,
    pub stops: Vec<ItineraryStop>,
    pub people: u32,
    pub vehicle: Option<VehicleCategory>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pickup_time: Option<NaiveTime>,
    pub days: u32,
    pub distance_km: Decimal,
    /// Transport for the whole circuit
    pub transport_price: Decimal,
    pub accommodation_price: Decimal,
    pub total_price: Decimal,
}

impl CircuitDetails {
    pub fn total_nights(&self) -> u32 {
        self.stops
            .iter()
            .filter_map(|s| s.accommodation)
            .map(|a| a.nights)
            .sum()
    }

    /// "🏁 Origen: X" then one "📍 Destino n: Y" line per stop
    pub fn itinerary(&self) -> Vec<String> {
        let mut lines = vec![format!("🏁 Origen: {}", self.origin.as_deref().unwrap_or_default())];
        for (index, stop) in self.stops.iter().enumerate() {
            let mut line = format!("📍 Destino {}: {}", index + 1, stop.name);
            if let Some(accommodation) = stop.accommodation {
                line.push_str(&format!(
                    " (🏨 {}, {} hab)",
                    nights_label(accommodation.nights),
                    accommodation.rooms
                ));
            }
            lines.push(line);
        }
        lines
    }
}

/// Message templates, one per booking kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingMessage {
    TaxiTrip(TaxiTripDetails),
    Excursion(ExcursionDetails),
    Package(PackageDetails),
    Custom(CustomRequestDetails),
    Circuit(CircuitDetails),
}

impl BookingMessage {
    /// Render the chat text
    pub fn render(&self, app_name: &str) -> String {
        let app = app_name.to_uppercase();
        match self {
            BookingMessage::TaxiTrip(d) => [
                format!("🚕 *RESERVA DE TAXI - {}*", app),
                String::new(),
                "🗺️ *Detalles del Viaje:*".to_string(),
                format!("📍 Origen: {}", text(&d.origin)),
                format!("📍 Destino: {}", text(&d.destination)),
                format!("📅 Fecha: {}", value(d.date)),
                format!("⏰ Hora: {}", text(&d.time)),
                format!("👥 Pasajeros: {}", value(d.passengers)),
                format!("💰 Precio Total: ${}", value(d.price)),
            ]
            .join("\n"),

            BookingMessage::Excursion(d) => {
                let mut lines = vec![format!("🏝️ *RESERVA DE EXCURSIÓN - {}*", app), String::new()];
                lines.extend(contact_block(&d.contact));
                lines.extend([
                    String::new(),
                    "🎯 *Detalles de la Excursión:*".to_string(),
                    format!("🏝️ Excursión: {}", text(&d.excursion)),
                    format!("📅 Fecha: {}", value(d.date)),
                    format!("👥 Personas: {}", value(d.people)),
                    format!("💰 Precio Total: ${}", value(d.price)),
                ]);
                lines.extend(comments_block(&d.contact));
                lines.join("\n")
            }

            BookingMessage::Package(d) => {
                let mut lines = vec![format!("📦 *RESERVA DE PAQUETE - {}*", app), String::new()];
                lines.extend(contact_block(&d.contact));
                lines.extend([
                    String::new(),
                    "📦 *Detalles del Paquete:*".to_string(),
                    format!("🎁 Paquete: {}", text(&d.package)),
                    format!("📅 Fecha: {}", value(d.date)),
                    format!("👥 Personas: {}", value(d.people)),
                    format!("💰 Precio Total: ${}", value(d.price)),
                ]);
                lines.extend(comments_block(&d.contact));
                lines.join("\n")
            }

            BookingMessage::Custom(d) => {
                let mut lines = vec![format!("✨ *SOLICITUD PERSONALIZADA - {}*", app), String::new()];
                lines.extend(contact_block(&d.contact));
                lines.extend([
                    format!("👥 Viajeros: {}", value(d.travellers)),
                    String::new(),
                    "🗓️ *Detalles del Viaje:*".to_string(),
                    format!("📅 Fecha: {}", value(d.date)),
                    format!("⏱️ Duración: {}", text(&d.duration)),
                    String::new(),
                    "📝 *Descripción:*".to_string(),
                    d.description
                        .clone()
                        .filter(|s| !s.trim().is_empty())
                        .unwrap_or_else(|| "Sin descripción".to_string()),
                ]);
                lines.join("\n")
            }

            BookingMessage::Circuit(d) => render_circuit(d, &app),
        }
    }
}

fn render_circuit(d: &CircuitDetails, app: &str) -> String {
    let final_destination = d.stops.last().map(|s| s.name.clone());
    let nights = d.total_nights();

    let mut lines = vec![format!("🗺️ *CIRCUITO PERSONALIZADO - {}*", app), String::new()];
    lines.extend(contact_block(&d.contact));
    lines.extend([
        String::new(),
        "🚗 *Detalles del Circuito:*".to_string(),
        format!("🚕 Punto de Recogida: {}", text(&d.origin)),
        format!("🏁 Destino Final: {}", text(&final_destination)),
        format!("🚙 Vehículo: {}", value(d.vehicle.map(VehicleCategory::display_name))),
        format!("📅 Inicio: {}", value(d.start_date)),
    ]);
    if let Some(end) = d.end_date {
        lines.push(format!("📅 Fin: {}", end));
    }
    if let Some(time) = d.pickup_time {
        lines.push(format!("⏰ Hora de recogida: {}", time.format("%H:%M")));
    }
    lines.extend([
        format!("👥 Personas: {}", d.people),
        format!("📅 Duración: {} días", d.days),
        format!("📏 Distancia Total: {} km", d.distance_km),
        String::new(),
        "📍 *Itinerario:*".to_string(),
    ]);
    lines.extend(d.itinerary());
    lines.extend([
        String::new(),
        "🏨 *Alojamiento:*".to_string(),
        format!("¿Necesita alojamiento?: {}", if nights > 0 { "Sí" } else { "No" }),
    ]);
    if nights > 0 {
        lines.push(format!("🛏️ Detalle: {}", nights_label(nights)));
    }
    lines.extend([
        String::new(),
        "💰 *Precios:*".to_string(),
        format!("🚕 Transporte (24hrs): ${}", d.transport_price),
        format!("🏨 Alojamiento: ${}", d.accommodation_price),
        format!("💵 *TOTAL: ${}*", d.total_price),
    ]);
    lines.extend(comments_block(&d.contact));
    lines.extend([
        String::new(),
        "ℹ️ _Incluye taxi disponible las 24 horas durante todo el circuito_".to_string(),
    ]);
    lines.join("\n")
}

fn text(field: &Option<String>) -> &str {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(NOT_AVAILABLE)
}

fn value<T: Display>(field: Option<T>) -> String {
    field.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

fn contact_block(contact: &ContactDetails) -> Vec<String> {
    vec![
        "📋 *Información del Cliente:*".to_string(),
        format!("👤 Nombre: {}", text(&contact.name)),
        format!("📧 Email: {}", text(&contact.email)),
        format!("📱 Teléfono: {}", text(&contact.phone)),
    ]
}

fn comments_block(contact: &ContactDetails) -> Vec<String> {
    let comments = contact
        .comments
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("Sin comentarios");
    vec![
        String::new(),
        "💬 *Comentarios:*".to_string(),
        comments.to_string(),
    ]
}

/// "1 noche", "3 noches"
pub fn nights_label(nights: u32) -> String {
    if nights == 1 {
        "1 noche".to_string()
    } else {
        format!("{} noches", nights)
    }
}

/// `https://wa.me/<number>?text=<percent-encoded text>`
pub fn whatsapp_link(number: &str, text: &str) -> String {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{}?text={}", digits, urlencoding::encode(text))
}

/// Opens an external chat prefilled with a message; fire-and-forget
pub trait ChatHandoff: Send + Sync {
    fn open_chat(&self, text: &str);
}

/// Hands the message to WhatsApp through a deep link.
///
/// What "opening" the link means is up to the launcher: a browser call,
/// printing it, or recording it in tests.
pub struct WhatsAppHandoff {
    number: String,
    launcher: Box<dyn Fn(&str) + Send + Sync>,
}

impl WhatsAppHandoff {
    pub fn new<F>(number: impl Into<String>, launcher: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            number: number.into(),
            launcher: Box::new(launcher),
        }
    }

    pub fn from_config<F>(config: &AppConfig, launcher: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self::new(config.whatsapp_number.clone(), launcher)
    }

    pub fn link(&self, text: &str) -> String {
        whatsapp_link(&self.number, text)
    }
}

impl ChatHandoff for WhatsAppHandoff {
    fn open_chat(&self, text: &str) {
        let link = self.link(text);
        info!("Opening WhatsApp chat ({} chars)", text.chars().count());
        (self.launcher)(&link);
    }
}

/// Render `message` and hand it off
pub fn send_booking(message: &BookingMessage, app_name: &str, handoff: &dyn ChatHandoff) {
    handoff.open_chat(&message.render(app_name));
}
