//! Location models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub type LocationId = i64;

/// Location classification as stored in the `tipo` column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationKind {
    Municipality,
    TouristMunicipality,
    Cay,
    Airport,
    Other(String),
}

impl LocationKind {
    /// Parse a stored label. Matching ignores case and the accent in "turístico".
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_lowercase().replace('í', "i");
        match normalized.as_str() {
            "municipio" => LocationKind::Municipality,
            "municipio turistico" => LocationKind::TouristMunicipality,
            "cayo" => LocationKind::Cay,
            "aeropuerto" => LocationKind::Airport,
            _ => LocationKind::Other(label.trim().to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LocationKind::Municipality => "municipio",
            LocationKind::TouristMunicipality => "municipio turistico",
            LocationKind::Cay => "cayo",
            LocationKind::Airport => "aeropuerto",
            LocationKind::Other(label) => label,
        }
    }

    /// Only towns offer lodging on a circuit
    pub fn accepts_accommodation(&self) -> bool {
        matches!(self, LocationKind::Municipality | LocationKind::TouristMunicipality)
    }
}

/// Row from `ubicaciones_cuba`
#[derive(Debug, Clone, FromRow)]
pub struct LocationRow {
    pub id: i64,
    pub nombre: String,
    pub codigo: Option<String>,
    pub region: Option<String>,
    pub tipo: Option<String>,
    pub provincia: Option<String>,
}

/// A pickup or drop-off point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub code: String,
    pub region: String,
    pub kind: LocationKind,
    pub province: String,
}

impl Location {
    /// Eastern provinces are served by private cars only
    pub fn is_oriente(&self) -> bool {
        self.region.trim().eq_ignore_ascii_case("oriente")
    }
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            name: row.nombre,
            code: row.codigo.unwrap_or_default(),
            region: row.region.unwrap_or_default(),
            kind: LocationKind::from_label(row.tipo.as_deref().unwrap_or_default()),
            province: row.provincia.unwrap_or_default(),
        }
    }
}
