//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::api::auth::Authenticator;
use crate::api::rate_limit::RateLimiter;
use crate::config::Config;
use crate::services::NutritionService;
use crate::time::{Clock, SystemClock};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Timezone lookup and nutrition data
    pub service: Arc<dyn NutritionService>,
    /// Source of "now" for household-local dates
    pub clock: Arc<dyn Clock>,
    /// Resolves the acting user from request credentials
    pub authenticator: Arc<Authenticator>,
    /// Per-actor request limiter for the dashboard routes
    pub rate_limiter: Arc<RateLimiter>,
    /// Loaded configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state reading the system clock
    pub fn new(service: Arc<dyn NutritionService>, config: Config) -> Self {
        Self::with_clock(service, Arc::new(SystemClock), config)
    }

    /// Create state with a custom clock
    pub fn with_clock(
        service: Arc<dyn NutritionService>,
        clock: Arc<dyn Clock>,
        config: Config,
    ) -> Self {
        Self {
            service,
            clock,
            authenticator: Arc::new(Authenticator::new(&config.auth)),
            rate_limiter: Arc::new(RateLimiter::new(config.rate_limit.clone())),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
