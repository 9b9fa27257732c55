//! Domain models loaded from the backend

pub mod catalog;
pub mod location;

pub use catalog::{Excursion, ExcursionRow, PackageRow, TravelPackage};
pub use location::{Location, LocationId, LocationKind, LocationRow};
