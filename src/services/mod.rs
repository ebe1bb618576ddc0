//! Nutrition Data Services
//!
//! The dashboard endpoints own no nutrition logic. Household timezones,
//! dashboards, member summaries and health metrics all come from a
//! [`NutritionService`]; the shipped implementation is [`UpstreamClient`],
//! which forwards each call to the nutrition data API.

mod upstream;

pub use upstream::{UpstreamClient, UpstreamConfig};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::time::CalendarDate;

/// Errors raised by nutrition data services
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The service did not answer within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The service could not be reached
    #[error("Service unavailable")]
    Unavailable,

    /// The service answered with a non-success status
    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Parameters for the daily dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyParams {
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    pub date: CalendarDate,
}

/// Parameters for the weekly dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyParams {
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    pub week_start: CalendarDate,
}

/// Parameters for the household member summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummaryParams {
    pub actor_id: String,
    pub date: CalendarDate,
}

/// Parameters for health metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricsParams {
    pub actor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
}

/// Data access behind the dashboard endpoints
///
/// Results are arbitrary JSON and are returned to clients untouched.
#[async_trait]
pub trait NutritionService: Send + Sync {
    /// Stored timezone preference of the actor's household, possibly empty
    async fn household_timezone(&self, actor_id: &str) -> ServiceResult<String>;

    async fn dashboard_daily(&self, params: DailyParams) -> ServiceResult<Value>;

    async fn dashboard_weekly(&self, params: WeeklyParams) -> ServiceResult<Value>;

    async fn member_summary(&self, params: MemberSummaryParams) -> ServiceResult<Value>;

    async fn health_metrics(&self, params: HealthMetricsParams) -> ServiceResult<Value>;

    /// Whether the service is reachable, used by readiness probes
    async fn health_check(&self) -> ServiceResult<()>;
}
