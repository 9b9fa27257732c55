//! Kubaxi core.
//!
//! Fare calculation, route and catalog caching, booking flow orchestration
//! and WhatsApp hand-off for the Kubaxi taxi and tour site.

pub mod booking;
pub mod cache;
pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod flow;
pub mod i18n;
pub mod models;
pub mod pricing;

pub use cache::{warm_cache, AppCache};
pub use config::AppConfig;
pub use db::{Backend, PgBackend};
pub use directory::LocationDirectory;
pub use error::{AppError, Result};
pub use flow::{CircuitCalculator, FlowState, TripCalculator};
pub use pricing::{QuoteError, QuoteService};
