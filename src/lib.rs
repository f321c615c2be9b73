//! Seasonal Dash - selection and aggregation engine for seasonal dashboards
//!
//! The engine holds a season-tagged time series, tracks which seasons the
//! toolbar has switched on, and after every change recomputes the filtered
//! series and its KPIs as one immutable view model for renderers:
//! selection change → filter → aggregate → publish.
//!
//! ## Modules
//!
//! - **Data**: `season`, `types`, `store` (validated, immutable dataset)
//! - **Engines**: `filter`, `aggregate`, `view`
//! - **Orchestration**: `controller` (single-threaded), `shared` (thread-safe gate)

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod season;
pub mod selection;
pub mod shared;
pub mod store;
pub mod types;
pub mod view;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use aggregate::{AggregationEngine, Aggregates};
pub use config::DashboardConfig;
pub use controller::{ControllerState, DashboardController, SubscriptionId, ViewModelSubscriber};
pub use error::DashboardError;
pub use filter::FilterEngine;
pub use season::SeasonTag;
pub use selection::SelectionState;
pub use shared::SharedDashboard;
pub use store::SeriesStore;
pub use types::{DataPoint, Kpi, LegendEntry, RawPoint, RawTimestamp, Timestamp, ViewModel};

/// Engine version
pub const DASH_VERSION: &str = env!("CARGO_PKG_VERSION");
