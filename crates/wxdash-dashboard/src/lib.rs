//! Dashboard controller for the weather proxy
//!
//! Owns the UI state, talks to the proxy through a [`WeatherSource`],
//! resolves the device position through a [`Geolocator`], and keeps the
//! recent-searches list in a [`KeyValueStore`].

pub mod controller;
pub mod geo;
pub mod source;
pub mod store;
pub mod view;

pub use controller::{Dashboard, DashboardError, UiState};
pub use geo::{FixedGeolocator, GeolocationError, Geolocator};
pub use source::{FetchError, ProxyClient, WeatherSource};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use view::{DashboardView, ForecastCard, WeatherCard};
