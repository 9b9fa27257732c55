//! Excursion and travel package models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::i18n::{Locale, LocalizedText};
use crate::pricing::{calculators, ExcursionTiers};

/// Row from `excursiones` (or its read view)
#[derive(Debug, Clone, FromRow)]
pub struct ExcursionRow {
    pub id: String,
    pub titulo: Option<String>,
    pub titulo_es: Option<String>,
    pub titulo_en: Option<String>,
    pub titulo_fr: Option<String>,
    pub descripcion: Option<String>,
    pub descripcion_es: Option<String>,
    pub descripcion_en: Option<String>,
    pub descripcion_fr: Option<String>,
    pub ubicacion: String,
    pub precio: Decimal,
    pub precio_por_pax: Option<Decimal>,
    pub min_pax: Option<i32>,
    pub max_pax: Option<i32>,
    pub precio_por_pax_nivel2: Option<Decimal>,
    pub umbral_nivel2: Option<i32>,
    pub imagen_url: Option<String>,
    pub duracion: Option<String>,
    pub hr_salida: Option<String>,
}

/// Guided excursion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Excursion {
    pub id: String,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub location: String,
    pub pricing: ExcursionTiers,
    pub image_url: Option<String>,
    pub duration: Option<String>,
    pub departure_time: Option<String>,
}

impl Excursion {
    pub fn title(&self, locale: Locale) -> &str {
        self.title.get(locale)
    }

    /// Group price for `passengers`
    pub fn price_for(&self, passengers: u32) -> Decimal {
        calculators::excursion_price(&self.pricing, passengers)
    }

    /// Largest group accepted, if capped
    pub fn max_passengers(&self) -> Option<u32> {
        self.pricing.max_pax
    }
}

fn positive(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

impl From<ExcursionRow> for Excursion {
    fn from(row: ExcursionRow) -> Self {
        Self {
            id: row.id,
            title: LocalizedText {
                es: row.titulo_es,
                en: row.titulo_en,
                fr: row.titulo_fr,
                base: row.titulo,
            },
            description: LocalizedText {
                es: row.descripcion_es,
                en: row.descripcion_en,
                fr: row.descripcion_fr,
                base: row.descripcion,
            },
            location: row.ubicacion,
            pricing: ExcursionTiers {
                base_price: row.precio,
                min_pax: positive(row.min_pax),
                price_per_extra_pax: row.precio_por_pax,
                tier2_threshold: positive(row.umbral_nivel2),
                price_per_extra_pax_tier2: row.precio_por_pax_nivel2,
                max_pax: positive(row.max_pax),
            },
            image_url: row.imagen_url,
            duration: row.duracion,
            departure_time: row.hr_salida,
        }
    }
}

/// Row from `paquetes_viaje` (or its read view)
#[derive(Debug, Clone, FromRow)]
pub struct PackageRow {
    pub id: String,
    pub nombre: Option<String>,
    pub nombre_es: Option<String>,
    pub nombre_en: Option<String>,
    pub nombre_fr: Option<String>,
    pub descripcion_es: Option<String>,
    pub descripcion_en: Option<String>,
    pub descripcion_fr: Option<String>,
    pub region: Option<String>,
    pub precio: Decimal,
    pub duracion_dias: i32,
    pub duracion_noches: i32,
    pub imagen_url: Option<String>,
    pub incluye_es: Option<String>,
    pub incluye_en: Option<String>,
    pub incluye_fr: Option<String>,
    pub destinos_es: Option<String>,
    pub destinos_en: Option<String>,
    pub destinos_fr: Option<String>,
    pub activo: Option<bool>,
    pub orden: Option<i32>,
}

/// Pre-built multi-day travel package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelPackage {
    pub id: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub includes: LocalizedText,
    pub destinations: LocalizedText,
    pub region: String,
    pub price: Decimal,
    pub days: u32,
    pub nights: u32,
    pub image_url: Option<String>,
    pub active: bool,
    pub order: i32,
}

impl TravelPackage {
    /// Items of the "includes" list for `locale`, one per line
    pub fn includes_list(&self, locale: Locale) -> Vec<String> {
        self.includes
            .get(locale)
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl From<PackageRow> for TravelPackage {
    fn from(row: PackageRow) -> Self {
        Self {
            id: row.id,
            name: LocalizedText {
                es: row.nombre_es,
                en: row.nombre_en,
                fr: row.nombre_fr,
                base: row.nombre,
            },
            description: LocalizedText {
                es: row.descripcion_es,
                en: row.descripcion_en,
                fr: row.descripcion_fr,
                base: None,
            },
            includes: LocalizedText {
                es: row.incluye_es,
                en: row.incluye_en,
                fr: row.incluye_fr,
                base: None,
            },
            destinations: LocalizedText {
                es: row.destinos_es,
                en: row.destinos_en,
                fr: row.destinos_fr,
                base: None,
            },
            region: row.region.unwrap_or_default(),
            price: row.precio,
            days: positive(Some(row.duracion_dias)).unwrap_or(0),
            nights: positive(Some(row.duracion_noches)).unwrap_or(0),
            image_url: row.imagen_url,
            active: row.activo.unwrap_or(true),
            order: row.orden.unwrap_or(0),
        }
    }
}
