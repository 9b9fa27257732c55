//! Location directory.
//!
//! Holds the session's location list and derives the candidate lists shown
//! in origin/destination pickers. The last filtered view is memoized, since
//! pickers re-ask for the same view on every keystroke that does not change
//! the filter.

use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::models::{Location, LocationId, LocationKind};
use crate::pricing::{QuoteError, QuoteService, TripRequest, VehicleMode};

/// Autocomplete needs at least this many characters
pub const MIN_SEARCH_CHARS: usize = 2;
/// Autocomplete suggestions returned
pub const SEARCH_LIMIT: usize = 10;

/// Type filter offered in the pickers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KindFilter {
    #[default]
    All,
    TouristMunicipality,
    Cay,
    Airport,
}

impl KindFilter {
    /// Parse the picker value ("todo", "turistico", "cayo", "aeropuerto")
    pub fn from_option(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "todo" | "all" => Some(KindFilter::All),
            "turistico" | "municipio turistico" => Some(KindFilter::TouristMunicipality),
            "cayo" => Some(KindFilter::Cay),
            "aeropuerto" => Some(KindFilter::Airport),
            _ => None,
        }
    }

    fn matches(self, kind: &LocationKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::TouristMunicipality => *kind == LocationKind::TouristMunicipality,
            KindFilter::Cay => *kind == LocationKind::Cay,
            KindFilter::Airport => *kind == LocationKind::Airport,
        }
    }
}

/// Which locations a picker may offer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationFilter {
    /// Already chosen elsewhere in the form
    pub exclude_ids: Vec<LocationId>,
    /// Hide locations in this province (case-insensitive)
    pub exclude_province: Option<String>,
    pub kind: KindFilter,
    /// Free text matched against name or province
    pub query: String,
}

impl LocationFilter {
    /// Candidates for the other end of a trip whose one end is `chosen`
    pub fn counterpart_of(chosen: Option<&Location>, exclude_same_province: bool) -> Self {
        Self {
            exclude_ids: chosen.map(|l| vec![l.id]).unwrap_or_default(),
            exclude_province: chosen
                .filter(|_| exclude_same_province)
                .map(|l| l.province.clone())
                .filter(|p| !p.trim().is_empty()),
            ..Self::default()
        }
    }

    /// Candidates for a circuit: stops exclude the origin; while the origin
    /// is still unset, it may not be one of the chosen stops
    pub fn for_circuit(origin: Option<LocationId>, chosen_stops: &[LocationId]) -> Self {
        let exclude_ids = match origin {
            Some(id) => vec![id],
            None => chosen_stops.to_vec(),
        };
        Self {
            exclude_ids,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: KindFilter) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    fn accepts(&self, location: &Location) -> bool {
        if self.exclude_ids.contains(&location.id) {
            return false;
        }
        if let Some(province) = &self.exclude_province {
            if location.province.trim().eq_ignore_ascii_case(province.trim()) {
                return false;
            }
        }
        if !self.kind.matches(&location.kind) {
            return false;
        }

        let query = self.query.trim().to_lowercase();
        query.is_empty()
            || location.name.to_lowercase().contains(&query)
            || location.province.to_lowercase().contains(&query)
    }
}

/// Session location list with derived views
pub struct LocationDirectory {
    locations: Arc<Vec<Location>>,
    last_view: Mutex<Option<(LocationFilter, Arc<Vec<Location>>)>>,
}

impl LocationDirectory {
    pub fn new(locations: Arc<Vec<Location>>) -> Self {
        Self {
            locations,
            last_view: Mutex::new(None),
        }
    }

    /// Build from the cached list, fetching it if needed
    pub async fn load(service: &QuoteService) -> Result<Self, QuoteError> {
        Ok(Self::new(service.locations().await?))
    }

    pub fn all(&self) -> &[Location] {
        &self.locations
    }

    pub fn get(&self, id: LocationId) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    /// Locations accepted by `filter`, in list order
    pub fn filter(&self, filter: &LocationFilter) -> Arc<Vec<Location>> {
        let mut last = self.last_view.lock().unwrap_or_else(|e| e.into_inner());

        if let Some((cached_filter, view)) = last.as_ref() {
            if cached_filter == filter {
                return Arc::clone(view);
            }
        }

        let view: Arc<Vec<Location>> = Arc::new(
            self.locations
                .iter()
                .filter(|l| filter.accepts(l))
                .cloned()
                .collect(),
        );
        debug!("Filtered {} of {} locations", view.len(), self.locations.len());
        *last = Some((filter.clone(), Arc::clone(&view)));
        view
    }

    /// Autocomplete by name; empty below [`MIN_SEARCH_CHARS`]
    pub fn search(&self, query: &str) -> Vec<Location> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_SEARCH_CHARS {
            return Vec::new();
        }

        let mut matches: Vec<Location> = self
            .locations
            .iter()
            .filter(|l| l.name.to_lowercase().contains(&query))
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        matches.truncate(SEARCH_LIMIT);
        matches
    }
}

/// Shared taxis do not run to or from the east
pub fn requires_private(origin: Option<&Location>, destination: Option<&Location>) -> bool {
    origin.is_some_and(Location::is_oriente) || destination.is_some_and(Location::is_oriente)
}

/// Force a trip to private mode when an endpoint is in Oriente.
///
/// Clears the shared half-day slot. Returns true when the request changed.
pub fn enforce_region_rule(
    request: &mut TripRequest,
    origin: Option<&Location>,
    destination: Option<&Location>,
) -> bool {
    if !requires_private(origin, destination) {
        return false;
    }

    let changed = request.mode == VehicleMode::Shared || request.shared_schedule.is_some();
    request.mode = VehicleMode::Private;
    request.shared_schedule = None;
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::SharedSchedule;

    fn location(id: LocationId, name: &str, kind: &str, province: &str, region: &str) -> Location {
        Location {
            id,
            name: name.to_string(),
            code: String::new(),
            region: region.to_string(),
            kind: LocationKind::from_label(kind),
            province: province.to_string(),
        }
    }

    fn directory() -> LocationDirectory {
        LocationDirectory::new(Arc::new(vec![
            location(1, "Aeropuerto José Martí", "aeropuerto", "La Habana", "Occidente"),
            location(2, "Cayo Santa María", "cayo", "Villa Clara", "Centro"),
            location(3, "La Habana", "municipio turistico", "La Habana", "Occidente"),
            location(4, "Santiago de Cuba", "municipio", "Santiago de Cuba", "Oriente"),
            location(5, "Trinidad", "municipio turistico", "Sancti Spíritus", "Centro"),
            location(6, "Varadero", "municipio turistico", "Matanzas", "Occidente"),
        ]))
    }

    fn ids(view: &[Location]) -> Vec<LocationId> {
        view.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_counterpart_excluded() {
        let dir = directory();
        let chosen = dir.get(3).cloned();
        let view = dir.filter(&LocationFilter::counterpart_of(chosen.as_ref(), false));
        assert_eq!(ids(&view), vec![1, 2, 4, 5, 6]);
    }

    #[test]
    fn test_same_province_excluded_when_enabled() {
        let dir = directory();
        let chosen = dir.get(3).cloned();
        let view = dir.filter(&LocationFilter::counterpart_of(chosen.as_ref(), true));
        assert_eq!(ids(&view), vec![2, 4, 5, 6]);
    }

    #[test]
    fn test_kind_filter() {
        let dir = directory();
        let filter = LocationFilter::default().with_kind(KindFilter::TouristMunicipality);
        assert_eq!(ids(&dir.filter(&filter)), vec![3, 5, 6]);

        let filter = LocationFilter::default().with_kind(KindFilter::from_option("cayo").unwrap());
        assert_eq!(ids(&dir.filter(&filter)), vec![2]);

        assert_eq!(KindFilter::from_option("todo"), Some(KindFilter::All));
        assert_eq!(KindFilter::from_option("playa"), None);
    }

    #[test]
    fn test_query_matches_name_or_province() {
        let dir = directory();
        let filter = LocationFilter::default().with_query("HABANA");
        assert_eq!(ids(&dir.filter(&filter)), vec![1, 3]);

        let filter = LocationFilter::default().with_query("spíritus");
        assert_eq!(ids(&dir.filter(&filter)), vec![5]);
    }

    #[test]
    fn test_filters_compose() {
        let dir = directory();
        let filter = LocationFilter::for_circuit(Some(5), &[])
            .with_kind(KindFilter::TouristMunicipality)
            .with_query("a");
        assert_eq!(ids(&dir.filter(&filter)), vec![3, 6]);
    }

    #[test]
    fn test_circuit_origin_candidates_exclude_chosen_stops() {
        let dir = directory();
        let view = dir.filter(&LocationFilter::for_circuit(None, &[2, 5]));
        assert_eq!(ids(&view), vec![1, 3, 4, 6]);
    }

    #[test]
    fn test_view_is_memoized() {
        let dir = directory();
        let filter = LocationFilter::default().with_query("a");
        let first = dir.filter(&filter);
        let second = dir.filter(&filter);
        assert!(Arc::ptr_eq(&first, &second));

        let other = dir.filter(&LocationFilter::default());
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_search() {
        let dir = directory();
        assert!(dir.search("t").is_empty());
        assert_eq!(ids(&dir.search("an")), vec![2, 3, 4]);
        assert_eq!(ids(&dir.search(" tRi ")), vec![5]);
    }

    #[test]
    fn test_oriente_forces_private() {
        let dir = directory();
        let mut request = TripRequest {
            origin: Some(5),
            destination: Some(4),
            mode: VehicleMode::Shared,
            shared_schedule: Some(SharedSchedule::Morning),
            ..TripRequest::default()
        };

        assert!(enforce_region_rule(&mut request, dir.get(5), dir.get(4)));
        assert_eq!(request.mode, VehicleMode::Private);
        assert_eq!(request.shared_schedule, None);

        // Already private: nothing to change
        assert!(!enforce_region_rule(&mut request, dir.get(4), dir.get(5)));
    }

    #[test]
    fn test_other_regions_keep_shared() {
        let dir = directory();
        let mut request = TripRequest {
            mode: VehicleMode::Shared,
            shared_schedule: Some(SharedSchedule::Afternoon),
            ..TripRequest::default()
        };

        assert!(!enforce_region_rule(&mut request, dir.get(5), dir.get(3)));
        assert_eq!(request.mode, VehicleMode::Shared);
        assert_eq!(request.shared_schedule, Some(SharedSchedule::Afternoon));
        assert!(!requires_private(None, None));
    }
}
