//! Data Transfer Objects
//!
//! Query parameter types for the dashboard endpoints and the extractor that
//! validates them. Dashboard results themselves are opaque JSON from the
//! nutrition service and have no DTO.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::api::error::{ApiError, ApiResult};
use crate::time::CalendarDate;

// ============================================
// VALIDATION
// ============================================

/// Raw query parameters that can be checked into a typed form
pub trait Validate {
    type Output;

    fn validate(self) -> ApiResult<Self::Output>;
}

/// Query string extractor that rejects with [`ApiError::Validation`]
///
/// Both malformed query strings and field-level rule violations surface as
/// validation errors before the handler body runs.
pub struct ValidatedQuery<T: Validate>(pub T::Output);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: Validate + DeserializeOwned + Send,
    T::Output: Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Validation(e.body_text()))?;

        raw.validate().map(ValidatedQuery)
    }
}

fn member_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$",
        )
        .expect("valid uuid regex")
    })
}

fn validate_date(field: &str, value: Option<String>) -> ApiResult<Option<CalendarDate>> {
    value
        .map(|v| {
            CalendarDate::parse(&v).ok_or_else(|| {
                ApiError::Validation(format!("{} must be in YYYY-MM-DD format", field))
            })
        })
        .transpose()
}

fn validate_member_id(value: Option<String>) -> ApiResult<Option<String>> {
    match value {
        Some(id) if !member_id_pattern().is_match(&id) => Err(ApiError::Validation(
            "memberId must be a valid UUID".to_string(),
        )),
        other => Ok(other),
    }
}

// ============================================
// DASHBOARD QUERIES
// ============================================

/// GET /daily query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyQuery {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub member_id: Option<String>,
}

/// Validated /daily parameters
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRequest {
    pub date: Option<CalendarDate>,
    pub member_id: Option<String>,
}

impl Validate for DailyQuery {
    type Output = DailyRequest;

    fn validate(self) -> ApiResult<DailyRequest> {
        Ok(DailyRequest {
            date: validate_date("date", self.date)?,
            member_id: validate_member_id(self.member_id)?,
        })
    }
}

/// GET /weekly query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyQuery {
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub member_id: Option<String>,
}

/// Validated /weekly parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRequest {
    pub week_start: Option<CalendarDate>,
    pub member_id: Option<String>,
}

impl Validate for WeeklyQuery {
    type Output = WeeklyRequest;

    fn validate(self) -> ApiResult<WeeklyRequest> {
        Ok(WeeklyRequest {
            week_start: validate_date("weekStart", self.week_start)?,
            member_id: validate_member_id(self.member_id)?,
        })
    }
}

/// GET /member-summary query parameters
#[derive(Debug, Default, Deserialize)]
pub struct MemberSummaryQuery {
    #[serde(default)]
    pub date: Option<String>,
}

impl Validate for MemberSummaryQuery {
    type Output = Option<CalendarDate>;

    fn validate(self) -> ApiResult<Option<CalendarDate>> {
        validate_date("date", self.date)
    }
}

/// GET /health-metrics query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricsQuery {
    #[serde(default)]
    pub member_id: Option<String>,
}

impl Validate for HealthMetricsQuery {
    type Output = Option<String>;

    fn validate(self) -> ApiResult<Option<String>> {
        validate_member_id(self.member_id)
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Upstream nutrition API status
    pub upstream: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMBER: &str = "3f2c1a9e-8b7d-4c6e-a5f4-0123456789ab";

    #[test]
    fn test_daily_accepts_empty() {
        let req = DailyQuery::default().validate().unwrap();
        assert!(req.date.is_none());
        assert!(req.member_id.is_none());
    }

    #[test]
    fn test_daily_accepts_valid_fields() {
        let req = DailyQuery {
            date: Some("2024-02-30".to_string()),
            member_id: Some(MEMBER.to_uppercase()),
        }
        .validate()
        .unwrap();

        assert_eq!(req.date.unwrap().as_str(), "2024-02-30");
        assert_eq!(req.member_id.unwrap(), MEMBER.to_uppercase());
    }

    #[test]
    fn test_bad_date_rejected() {
        for bad in ["2024-5-15", "15-05-2024", "", "2024-05-15T00:00:00Z"] {
            let result = DailyQuery {
                date: Some(bad.to_string()),
                member_id: None,
            }
            .validate();
            assert!(matches!(result, Err(ApiError::Validation(_))), "{bad}");
        }
    }

    #[test]
    fn test_weekly_error_names_field() {
        let err = WeeklyQuery {
            week_start: Some("next monday".to_string()),
            member_id: None,
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("weekStart"));
    }

    #[test]
    fn test_bad_member_id_rejected() {
        for bad in [
            "not-a-uuid",
            "",
            "3f2c1a9e8b7d4c6ea5f40123456789ab",
            "{3f2c1a9e-8b7d-4c6e-a5f4-0123456789ab}",
            "3f2c1a9e-8b7d-4c6e-a5f4-0123456789ag",
        ] {
            assert!(
                HealthMetricsQuery {
                    member_id: Some(bad.to_string())
                }
                .validate()
                .is_err(),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_member_summary_date() {
        let date = MemberSummaryQuery {
            date: Some("2024-05-15".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(date.unwrap().as_str(), "2024-05-15");
    }

    #[test]
    fn test_query_deserializes_camel_case() {
        let query: WeeklyQuery =
            parse_query("weekStart=2024-05-13&memberId=abc&extra=ignored");
        assert_eq!(query.week_start.as_deref(), Some("2024-05-13"));
        assert_eq!(query.member_id.as_deref(), Some("abc"));
    }

    fn parse_query<T: DeserializeOwned>(qs: &str) -> T {
        let uri: axum::http::Uri = format!("/?{qs}").parse().unwrap();
        Query::<T>::try_from_uri(&uri).unwrap().0
    }
}
