//! Nutrition Dashboard Routes
//!
//! Thin handlers over the [`NutritionService`]. Each one validates its query,
//! fills in household-local date defaults, and returns the service's JSON.
//!
//! - GET /api/v1/nutrition-dashboard/daily - Daily dashboard
//! - GET /api/v1/nutrition-dashboard/weekly - Weekly dashboard
//! - GET /api/v1/nutrition-dashboard/member-summary - Household member summary
//! - GET /api/v1/nutrition-dashboard/health-metrics - Health metrics
//!
//! [`NutritionService`]: crate::services::NutritionService

use axum::{extract::State, Json};
use serde_json::Value;
use std::sync::Arc;

use crate::api::auth::Actor;
use crate::api::dto::{
    DailyQuery, HealthMetricsQuery, MemberSummaryQuery, ValidatedQuery, WeeklyQuery,
};
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::services::{DailyParams, HealthMetricsParams, MemberSummaryParams, WeeklyParams};
use crate::time::{normalize_timezone, today_in_timezone, CalendarDate};

/// GET /daily
///
/// `date` defaults to today in the household's timezone.
pub async fn daily(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ValidatedQuery(query): ValidatedQuery<DailyQuery>,
) -> ApiResult<Json<Value>> {
    let date = match query.date {
        Some(date) => date,
        None => household_today(&state, &actor).await?,
    };

    tracing::debug!(actor_id = %actor.id, date = %date, "Fetching daily dashboard");

    let result = state
        .service
        .dashboard_daily(DailyParams {
            actor_id: actor.id,
            member_id: query.member_id,
            date,
        })
        .await?;

    Ok(Json(result))
}

/// GET /weekly
///
/// `weekStart` is passed through as given; when absent it defaults to the
/// Monday of the household's current week.
pub async fn weekly(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ValidatedQuery(query): ValidatedQuery<WeeklyQuery>,
) -> ApiResult<Json<Value>> {
    let week_start = match query.week_start {
        Some(week_start) => week_start,
        None => {
            let today = household_today(&state, &actor).await?;
            today.monday_of_week().unwrap_or(today)
        }
    };

    tracing::debug!(actor_id = %actor.id, week_start = %week_start, "Fetching weekly dashboard");

    let result = state
        .service
        .dashboard_weekly(WeeklyParams {
            actor_id: actor.id,
            member_id: query.member_id,
            week_start,
        })
        .await?;

    Ok(Json(result))
}

/// GET /member-summary
pub async fn member_summary(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ValidatedQuery(date): ValidatedQuery<MemberSummaryQuery>,
) -> ApiResult<Json<Value>> {
    let date = match date {
        Some(date) => date,
        None => household_today(&state, &actor).await?,
    };

    tracing::debug!(actor_id = %actor.id, date = %date, "Fetching member summary");

    let result = state
        .service
        .member_summary(MemberSummaryParams {
            actor_id: actor.id,
            date,
        })
        .await?;

    Ok(Json(result))
}

/// GET /health-metrics
///
/// No date involved, so the household timezone is never looked up.
pub async fn health_metrics(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    ValidatedQuery(member_id): ValidatedQuery<HealthMetricsQuery>,
) -> ApiResult<Json<Value>> {
    tracing::debug!(actor_id = %actor.id, "Fetching health metrics");

    let result = state
        .service
        .health_metrics(HealthMetricsParams {
            actor_id: actor.id,
            member_id,
        })
        .await?;

    Ok(Json(result))
}

/// Today's date in the actor's household timezone
async fn household_today(state: &AppState, actor: &Actor) -> ApiResult<CalendarDate> {
    let stored = state.service.household_timezone(&actor.id).await?;
    let timezone = normalize_timezone(&stored);
    Ok(today_in_timezone(state.clock.as_ref(), &timezone))
}
