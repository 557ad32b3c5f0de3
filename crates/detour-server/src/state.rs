//! Shared server state.

use crate::config::Config;
use crate::tomtom::TomTomClient;
use std::sync::atomic::{AtomicU64, Ordering};

/// State shared by every handler. Planning itself keeps no shared state;
/// each request gets its own planner.
pub struct AppState {
    config: Config,
    provider: TomTomClient,
    plans_served: AtomicU64,
}

impl AppState {
    pub fn new(config: Config, provider: TomTomClient) -> Self {
        Self {
            config,
            provider,
            plans_served: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &TomTomClient {
        &self.provider
    }

    pub fn record_plan(&self) -> u64 {
        self.plans_served.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn plans_served(&self) -> u64 {
        self.plans_served.load(Ordering::Relaxed)
    }
}
