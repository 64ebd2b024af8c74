//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use crate::{config::AnalyticsConfig, store::Stores};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The record stores for farms, crops, tasks, expenses and budgets.
    pub stores: Arc<Mutex<Stores>>,

    /// The crop economics table and budget fallback used by the analytics pages.
    pub analytics_config: Arc<AnalyticsConfig>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] that serves `stores`.
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(stores: Stores, analytics_config: AnalyticsConfig, local_timezone: &str) -> Self {
        Self {
            stores: Arc::new(Mutex::new(stores)),
            analytics_config: Arc::new(analytics_config),
            local_timezone: local_timezone.to_owned(),
        }
    }
}
