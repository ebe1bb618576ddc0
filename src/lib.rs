//! # Nourish
//!
//! Household nutrition dashboard API. Validates dashboard queries, works out
//! household-local dates, and serves nutrition data from the upstream
//! nutrition service as JSON.
//!
//! ## Modules
//!
//! - [`time`]: Timezone normalization, household "today", ISO week starts
//! - [`services`]: Nutrition data service trait and upstream HTTP client
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//! - [`telemetry`]: Logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use nourish::time::{normalize_timezone, CalendarDate};
//!
//! assert_eq!(normalize_timezone("Europe/Paris"), "Europe/Paris");
//! assert_eq!(normalize_timezone("Atlantis/Lost"), "UTC");
//!
//! let friday = CalendarDate::parse("2024-03-01").unwrap();
//! assert_eq!(friday.monday_of_week().unwrap().as_str(), "2024-02-26");
//! ```

pub mod api;
pub mod config;
pub mod services;
pub mod telemetry;
pub mod time;

// Re-export top-level types for convenience
pub use api::{build_router, serve, Actor, ApiError, ApiResult, AppState};

pub use config::{Config, ConfigError, LoggingConfig};

pub use services::{
    DailyParams, HealthMetricsParams, MemberSummaryParams, NutritionService, ServiceError,
    ServiceResult, UpstreamClient, UpstreamConfig, WeeklyParams,
};

pub use time::{
    monday_of_week, normalize_timezone, today_in_timezone, CalendarDate, Clock, FixedClock,
    SystemClock, DEFAULT_TIMEZONE,
};
