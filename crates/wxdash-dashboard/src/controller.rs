//! Dashboard state machine
//!
//! Three triggers drive [`UiState`]: the initial geolocated load, a city
//! search (weather and forecast fetched concurrently), and the unit toggle.
//!
//! Every trigger takes a ticket for the state slot it writes (`weather` or
//! `forecast`). A completion whose ticket is no longer the newest for its
//! slot is dropped, so a slow response can never overwrite the result of a
//! later request.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use wxdash_core::{
    ForecastEntry, ForecastQuery, SearchHistory, Unit, ValidationError, WeatherQuery,
    WeatherReport, HISTORY_KEY,
};

use crate::geo::{GeolocationError, Geolocator};
use crate::source::{FetchError, WeatherSource};
use crate::store::KeyValueStore;
use crate::view::DashboardView;

/// The messages a user can see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DashboardError {
    #[error("Geolocation failed.")]
    Geolocation,

    #[error("City not found or API error.")]
    WeatherSearch,

    #[error("Forecast data not available.")]
    ForecastSearch,
}

/// Why a request cycle failed; logged, then collapsed into a [`DashboardError`]
#[derive(Debug, Error)]
enum Cause {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Geolocation(#[from] GeolocationError),
}

/// Render-relevant state, replaced piecewise by each request cycle
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    /// Current contents of the search box
    pub city: String,
    pub unit: Unit,
    pub weather: Option<WeatherReport>,
    pub forecast: Vec<ForecastEntry>,
    pub loading: bool,
    pub error: Option<DashboardError>,
}

#[derive(Debug, Default)]
struct Inner {
    ui: UiState,
    history: SearchHistory,
    pending: usize,
    weather_ticket: u64,
    forecast_ticket: u64,
}

impl Inner {
    fn begin(&mut self, requests: usize) {
        self.ui.error = None;
        self.pending += requests;
        self.ui.loading = true;
    }

    fn finish(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.ui.loading = self.pending > 0;
    }

    fn next_weather_ticket(&mut self) -> u64 {
        self.weather_ticket += 1;
        self.weather_ticket
    }

    fn next_forecast_ticket(&mut self) -> u64 {
        self.forecast_ticket += 1;
        self.forecast_ticket
    }
}

pub struct Dashboard {
    source: Arc<dyn WeatherSource>,
    geolocator: Arc<dyn Geolocator>,
    store: Arc<dyn KeyValueStore>,
    inner: Mutex<Inner>,
}

impl Dashboard {
    /// Create a dashboard, reading the persisted search history once.
    pub fn new(
        source: Arc<dyn WeatherSource>,
        geolocator: Arc<dyn Geolocator>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let history = load_history(store.as_ref());
        Self {
            source,
            geolocator,
            store,
            inner: Mutex::new(Inner {
                history,
                ..Inner::default()
            }),
        }
    }

    pub fn state(&self) -> UiState {
        self.inner.lock().ui.clone()
    }

    pub fn history(&self) -> SearchHistory {
        self.inner.lock().history.clone()
    }

    pub fn view(&self, today: NaiveDate) -> DashboardView {
        let inner = self.inner.lock();
        DashboardView::build(&inner.ui, &inner.history, today)
    }

    /// Edit the search box
    pub fn set_city(&self, input: impl Into<String>) {
        self.inner.lock().ui.city = input.into();
    }

    /// Copy a recent search into the search box without searching.
    pub fn recall(&self, index: usize) -> Option<String> {
        let mut inner = self.inner.lock();
        let city = inner.history.get(index)?.to_string();
        inner.ui.city = city.clone();
        Some(city)
    }

    /// Current weather at the device position.
    pub async fn init_load(&self) {
        let (ticket, unit) = {
            let mut inner = self.inner.lock();
            inner.begin(1);
            (inner.next_weather_ticket(), inner.ui.unit)
        };
        debug!(ticket, %unit, "initial load");

        let result = self.locate_and_fetch(unit).await;

        let mut inner = self.inner.lock();
        inner.finish();
        if ticket != inner.weather_ticket {
            debug!(ticket, "discarding stale geolocated weather");
            return;
        }
        match result {
            Ok(report) => inner.ui.weather = Some(report),
            Err(cause) => {
                warn!(error = %cause, "geolocated weather failed");
                inner.ui.error = Some(DashboardError::Geolocation);
            }
        }
    }

    /// Search the city in the search box. Blank input is ignored.
    pub async fn search(&self) {
        let started = {
            let mut inner = self.inner.lock();
            let city = inner.ui.city.trim().to_string();
            if city.is_empty() {
                None
            } else {
                inner.begin(2);
                let weather_ticket = inner.next_weather_ticket();
                let forecast_ticket = inner.next_forecast_ticket();
                Some((city, inner.ui.unit, weather_ticket, forecast_ticket))
            }
        };
        let Some((city, unit, weather_ticket, forecast_ticket)) = started else {
            debug!("ignoring blank search");
            return;
        };
        info!(%city, %unit, "search");

        let weather = async {
            let result = self.fetch_weather(WeatherQuery::city(city.as_str(), unit)).await;
            self.apply_search_weather(weather_ticket, &city, result);
        };
        let forecast = async {
            let result = self.fetch_forecast(ForecastQuery::new(city.as_str(), unit)).await;
            self.apply_forecast(forecast_ticket, result);
        };
        tokio::join!(weather, forecast);
    }

    /// Type `input` into the search box and search it.
    pub async fn search_for(&self, input: impl Into<String>) {
        self.set_city(input);
        self.search().await;
    }

    /// Flip the unit system and reload the geolocated weather under it.
    /// The last searched city is not searched again.
    pub async fn toggle_unit(&self) -> Unit {
        let unit = {
            let mut inner = self.inner.lock();
            inner.ui.unit = inner.ui.unit.toggle();
            inner.ui.unit
        };
        self.init_load().await;
        unit
    }

    async fn locate_and_fetch(&self, unit: Unit) -> Result<WeatherReport, Cause> {
        let position = self.geolocator.current_position().await?;
        self.fetch_weather(WeatherQuery::coordinates(position, unit))
            .await
    }

    async fn fetch_weather(&self, query: WeatherQuery) -> Result<WeatherReport, Cause> {
        let body: Value = self.source.weather(&query).await?;
        Ok(WeatherReport::validate(body)?)
    }

    async fn fetch_forecast(&self, query: ForecastQuery) -> Result<Vec<ForecastEntry>, Cause> {
        let body: Value = self.source.forecast(&query).await?;
        Ok(ForecastEntry::midday(&body)?)
    }

    fn apply_search_weather(&self, ticket: u64, city: &str, result: Result<WeatherReport, Cause>) {
        let mut inner = self.inner.lock();
        inner.finish();
        if ticket != inner.weather_ticket {
            debug!(ticket, %city, "discarding stale weather result");
            return;
        }
        match result {
            Ok(report) => {
                inner.ui.weather = Some(report);
                inner.history.push(city);
                self.persist_history(&inner.history);
            }
            Err(cause) => {
                warn!(%city, error = %cause, "weather search failed");
                inner.ui.error = Some(DashboardError::WeatherSearch);
            }
        }
    }

    fn apply_forecast(&self, ticket: u64, result: Result<Vec<ForecastEntry>, Cause>) {
        let mut inner = self.inner.lock();
        inner.finish();
        if ticket != inner.forecast_ticket {
            debug!(ticket, "discarding stale forecast result");
            return;
        }
        match result {
            Ok(daily) => inner.ui.forecast = daily,
            Err(cause) => {
                warn!(error = %cause, "forecast search failed");
                // a weather failure of the same search is the one shown
                if inner.ui.error != Some(DashboardError::WeatherSearch) {
                    inner.ui.error = Some(DashboardError::ForecastSearch);
                }
            }
        }
    }

    fn persist_history(&self, history: &SearchHistory) {
        if let Err(e) = self.store.set(HISTORY_KEY, &history.to_json()) {
            warn!(error = %e, "failed to persist search history");
        }
    }
}

fn load_history(store: &dyn KeyValueStore) -> SearchHistory {
    match store.get(HISTORY_KEY) {
        Ok(Some(raw)) => SearchHistory::from_json(&raw).unwrap_or_else(|| {
            warn!("stored search history is malformed; starting empty");
            SearchHistory::new()
        }),
        Ok(None) => SearchHistory::new(),
        Err(e) => {
            warn!(error = %e, "failed to read search history");
            SearchHistory::new()
        }
    }
}
