//! Upstream Nutrition API Client
//!
//! HTTP client for the nutrition data API that owns households, meals and
//! health metrics. Every call is a GET; parameters travel as camelCase query
//! strings and JSON results are passed back untouched.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{
    DailyParams, HealthMetricsParams, MemberSummaryParams, NutritionService, ServiceError,
    ServiceResult, WeeklyParams,
};

/// Configuration for the upstream client
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base URL of the nutrition data API (e.g., "http://localhost:8090")
    pub base_url: String,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Optional bearer token sent with every request
    pub api_key: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            request_timeout_ms: 5000,
            api_key: None,
        }
    }
}

/// [`NutritionService`] backed by the upstream HTTP API
pub struct UpstreamClient {
    client: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self.client.get(self.url(path));
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    /// GET a nutrition resource with `params` as the query string
    async fn fetch<P: Serialize>(&self, path: &str, params: &P) -> ServiceResult<Value> {
        let response = self
            .get(path)
            .query(params)
            .send()
            .await
            .map_err(classify)?;

        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl NutritionService for UpstreamClient {
    async fn household_timezone(&self, actor_id: &str) -> ServiceResult<String> {
        let path = format!("/households/{}/timezone", urlencoding::encode(actor_id));
        let response = self.get(&path).send().await.map_err(classify)?;
        let response = check_status(response).await?;

        let body: TimezoneResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))?;

        Ok(body.timezone.unwrap_or_default())
    }

    async fn dashboard_daily(&self, params: DailyParams) -> ServiceResult<Value> {
        self.fetch("/nutrition/daily", &params).await
    }

    async fn dashboard_weekly(&self, params: WeeklyParams) -> ServiceResult<Value> {
        self.fetch("/nutrition/weekly", &params).await
    }

    async fn member_summary(&self, params: MemberSummaryParams) -> ServiceResult<Value> {
        self.fetch("/nutrition/member-summary", &params).await
    }

    async fn health_metrics(&self, params: HealthMetricsParams) -> ServiceResult<Value> {
        self.fetch("/nutrition/health-metrics", &params).await
    }

    async fn health_check(&self) -> ServiceResult<()> {
        let response = self.get("/health").send().await.map_err(classify)?;
        check_status(response).await.map(|_| ())
    }
}

#[derive(Debug, Deserialize)]
struct TimezoneResponse {
    #[serde(default)]
    timezone: Option<String>,
}

fn classify(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Timeout
    } else if e.is_connect() {
        ServiceError::Unavailable
    } else {
        ServiceError::Request(e)
    }
}

async fn check_status(response: Response) -> ServiceResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        message: text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UpstreamConfig::default();
        assert_eq!(config.base_url, "http://localhost:8090");
        assert_eq!(config.request_timeout_ms, 5000);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = UpstreamClient::new(UpstreamConfig {
            base_url: "http://nutrition.internal/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            client.url("/nutrition/daily"),
            "http://nutrition.internal/nutrition/daily"
        );
    }

    #[test]
    fn test_timezone_response_tolerates_missing_field() {
        let body: TimezoneResponse = serde_json::from_str("{}").unwrap();
        assert!(body.timezone.is_none());

        let body: TimezoneResponse =
            serde_json::from_str(r#"{"timezone": "Europe/Berlin"}"#).unwrap();
        assert_eq!(body.timezone.as_deref(), Some("Europe/Berlin"));
    }

    mod wire {
        use super::*;
        use axum::{
            extract::{Path, Query},
            http::{header, HeaderMap, StatusCode, Uri},
            response::{IntoResponse, Json},
            routing::get,
            Router,
        };
        use serde_json::json;
        use std::collections::HashMap;

        use crate::time::CalendarDate;

        const MEMBER: &str = "3f2b8c1e-9d4a-4f6b-8e2c-1a2b3c4d5e6f";

        async fn echo(
            uri: Uri,
            headers: HeaderMap,
            Query(query): Query<HashMap<String, String>>,
        ) -> Json<Value> {
            let authorization = headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            Json(json!({
                "path": uri.path(),
                "query": query,
                "authorization": authorization,
            }))
        }

        async fn timezone(Path(actor): Path<String>) -> axum::response::Response {
            match actor.as_str() {
                "house 1/a" => Json(json!({"timezone": "Europe/Berlin"})).into_response(),
                "no-preference" => Json(json!({})).into_response(),
                "null-preference" => Json(json!({"timezone": null})).into_response(),
                _ => (StatusCode::NOT_FOUND, "unknown household").into_response(),
            }
        }

        /// Serve a stand-in nutrition API on an ephemeral port
        async fn stub_upstream() -> String {
            let app = Router::new()
                .route("/households/:actor/timezone", get(timezone))
                .route("/nutrition/daily", get(echo))
                .route("/nutrition/weekly", get(echo))
                .route("/nutrition/member-summary", get(echo))
                .route("/nutrition/health-metrics", get(echo))
                .route("/health", get(|| async { "ok" }))
                .route(
                    "/broken/*rest",
                    get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "database offline") }),
                )
                .route("/garbled/*rest", get(|| async { "<html>not json</html>" }));

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            format!("http://{}", addr)
        }

        fn client(base_url: String, api_key: Option<&str>) -> UpstreamClient {
            UpstreamClient::new(UpstreamConfig {
                base_url,
                request_timeout_ms: 2000,
                api_key: api_key.map(String::from),
            })
            .unwrap()
        }

        fn date(s: &str) -> CalendarDate {
            CalendarDate::parse(s).unwrap()
        }

        #[tokio::test]
        async fn test_daily_sends_camel_case_query_and_api_key() {
            let client = client(stub_upstream().await, Some("upstream-key"));

            let body = client
                .dashboard_daily(DailyParams {
                    actor_id: "actor-1".to_string(),
                    member_id: Some(MEMBER.to_string()),
                    date: date("2024-05-14"),
                })
                .await
                .unwrap();

            assert_eq!(body["path"], "/nutrition/daily");
            assert_eq!(
                body["query"],
                json!({"actorId": "actor-1", "memberId": MEMBER, "date": "2024-05-14"})
            );
            assert_eq!(body["authorization"], "Bearer upstream-key");
        }

        #[tokio::test]
        async fn test_weekly_omits_absent_member() {
            let client = client(stub_upstream().await, None);

            let body = client
                .dashboard_weekly(WeeklyParams {
                    actor_id: "actor-1".to_string(),
                    member_id: None,
                    week_start: date("2024-05-13"),
                })
                .await
                .unwrap();

            assert_eq!(body["path"], "/nutrition/weekly");
            assert_eq!(
                body["query"],
                json!({"actorId": "actor-1", "weekStart": "2024-05-13"})
            );
            assert!(body["authorization"].is_null());
        }

        #[tokio::test]
        async fn test_summary_and_health_metrics_paths() {
            let client = client(stub_upstream().await, None);

            let summary = client
                .member_summary(MemberSummaryParams {
                    actor_id: "actor-1".to_string(),
                    date: date("2024-05-15"),
                })
                .await
                .unwrap();
            assert_eq!(summary["path"], "/nutrition/member-summary");
            assert_eq!(
                summary["query"],
                json!({"actorId": "actor-1", "date": "2024-05-15"})
            );

            let metrics = client
                .health_metrics(HealthMetricsParams {
                    actor_id: "actor-1".to_string(),
                    member_id: Some(MEMBER.to_string()),
                })
                .await
                .unwrap();
            assert_eq!(metrics["path"], "/nutrition/health-metrics");
            assert_eq!(
                metrics["query"],
                json!({"actorId": "actor-1", "memberId": MEMBER})
            );
        }

        #[tokio::test]
        async fn test_household_timezone_encodes_actor_id() {
            let client = client(stub_upstream().await, None);

            // Unencoded, the slash would split the path and miss the route
            let tz = client.household_timezone("house 1/a").await.unwrap();
            assert_eq!(tz, "Europe/Berlin");
        }

        #[tokio::test]
        async fn test_household_timezone_missing_preference_is_empty() {
            let client = client(stub_upstream().await, None);

            assert_eq!(client.household_timezone("no-preference").await.unwrap(), "");
            assert_eq!(client.household_timezone("null-preference").await.unwrap(), "");
        }

        #[tokio::test]
        async fn test_non_success_status_is_reported() {
            let base = stub_upstream().await;

            let err = client(format!("{}/broken", base), None)
                .health_metrics(HealthMetricsParams {
                    actor_id: "actor-1".to_string(),
                    member_id: None,
                })
                .await
                .unwrap_err();
            match err {
                ServiceError::Status { status, message } => {
                    assert_eq!(status, 500);
                    assert_eq!(message, "database offline");
                }
                other => panic!("expected status error, got {other:?}"),
            }

            let err = client(base, None)
                .household_timezone("someone-else")
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Status { status: 404, .. }));
        }

        #[tokio::test]
        async fn test_non_json_body_is_invalid_response() {
            let base = stub_upstream().await;

            let err = client(format!("{}/garbled", base), None)
                .dashboard_daily(DailyParams {
                    actor_id: "actor-1".to_string(),
                    member_id: None,
                    date: date("2024-05-14"),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidResponse(_)));
        }

        #[tokio::test]
        async fn test_health_check_against_live_upstream() {
            let client = client(stub_upstream().await, None);
            assert!(client.health_check().await.is_ok());
        }
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_an_error() {
        // Port 9 (discard) is not expected to serve HTTP
        let client = UpstreamClient::new(UpstreamConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            request_timeout_ms: 500,
            api_key: None,
        })
        .unwrap();

        assert!(client.health_check().await.is_err());
    }
}
