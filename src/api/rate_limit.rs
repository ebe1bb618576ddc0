//! Rate Limiting
//!
//! Fixed-window request counting per actor. Runs after [`authenticate`],
//! so requests are keyed by actor id; requests without one fall back to the
//! peer address when the server exposes it.
//!
//! [`authenticate`]: crate::api::auth::authenticate

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::api::auth::Actor;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::config::RateLimitConfig;

/// Windows tracked before expired ones are swept
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window limiter shared by all requests
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn window_len(&self) -> Duration {
        Duration::from_secs(self.config.window_secs.max(1))
    }

    /// Count a request for `key`
    ///
    /// Returns the number of seconds until the window resets when the
    /// request is over the limit.
    pub async fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now()).await
    }

    async fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        if !self.config.enabled {
            return Ok(());
        }

        let window_len = self.window_len();
        let mut windows = self.windows.lock().await;

        if windows.len() >= SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.started) < window_len);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= window_len {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.config.max_requests {
            let elapsed = now.duration_since(window.started);
            let remaining = window_len.saturating_sub(elapsed);
            // Round up so clients never retry early
            let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
            return Err(secs.max(1));
        }

        window.count += 1;
        Ok(())
    }
}

/// Reject requests over the configured rate
pub async fn limit(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if state.rate_limiter.is_enabled() {
        let key = request_key(&request);
        if let Err(retry_after_secs) = state.rate_limiter.check(&key).await {
            tracing::debug!(key = %key, retry_after_secs, "Rate limit exceeded");
            return Err(ApiError::RateLimited { retry_after_secs });
        }
    }

    Ok(next.run(request).await)
}

fn request_key(request: &Request) -> String {
    if let Some(actor) = request.extensions().get::<Actor>() {
        return format!("actor:{}", actor.id);
    }

    match request.extensions().get::<ConnectInfo<SocketAddr>>() {
        Some(ConnectInfo(addr)) => format!("ip:{}", addr.ip()),
        None => "anonymous".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            enabled: true,
            max_requests,
            window_secs,
        })
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = limiter(3, 60);
        let now = Instant::now();

        for _ in 0..3 {
            assert!(limiter.check_at("a", now).await.is_ok());
        }
        assert_eq!(limiter.check_at("a", now).await, Err(60));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.check_at("a", now).await.is_ok());
        assert!(limiter.check_at("b", now).await.is_ok());
        assert!(limiter.check_at("a", now).await.is_err());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        assert!(limiter.check_at("a", start).await.is_ok());
        assert_eq!(
            limiter.check_at("a", start + Duration::from_millis(4_500)).await,
            Err(6)
        );
        assert!(limiter
            .check_at("a", start + Duration::from_secs(10))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_disabled_is_pass_through() {
        let limiter = RateLimiter::new(RateLimitConfig {
            enabled: false,
            max_requests: 0,
            window_secs: 1,
        });

        for _ in 0..5 {
            assert!(limiter.check("a").await.is_ok());
        }
    }

    #[test]
    fn test_request_key_prefers_actor() {
        let mut request = Request::new(axum::body::Body::empty());
        assert_eq!(request_key(&request), "anonymous");

        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([10, 0, 0, 1], 4000))));
        assert_eq!(request_key(&request), "ip:10.0.0.1");

        request.extensions_mut().insert(Actor {
            id: "actor-1".to_string(),
        });
        assert_eq!(request_key(&request), "actor:actor-1");
    }
}
