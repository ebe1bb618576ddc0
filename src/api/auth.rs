//! Authentication
//!
//! The dashboard routes only need to know *who* is asking. [`authenticate`]
//! resolves the actor from request credentials and stores it in the request
//! extensions; handlers then take an [`Actor`] argument, which fails with
//! 401 when no actor was resolved.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::config::AuthConfig;

/// The authenticated user making a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Actor>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("No authenticated actor".to_string()))
    }
}

/// Maps request credentials to actors
#[derive(Debug, Clone, Default)]
pub struct Authenticator {
    tokens: HashMap<String, String>,
    trusted_header: Option<String>,
}

impl Authenticator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            tokens: config.tokens.clone(),
            trusted_header: config
                .trusted_header
                .as_ref()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty()),
        }
    }

    /// Resolve the actor, preferring a bearer token over the trusted header
    pub fn resolve(&self, headers: &HeaderMap) -> Option<Actor> {
        if let Some(actor) = self.bearer_actor(headers) {
            return Some(actor);
        }

        let name = self.trusted_header.as_deref()?;
        let id = headers.get(name)?.to_str().ok()?.trim();
        (!id.is_empty()).then(|| Actor { id: id.to_string() })
    }

    fn bearer_actor(&self, headers: &HeaderMap) -> Option<Actor> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?.trim();
        self.tokens.get(token).map(|id| Actor { id: id.clone() })
    }
}

/// Reject requests without a resolvable actor
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let actor = state
        .authenticator
        .resolve(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid credentials".to_string()))?;

    tracing::debug!(actor_id = %actor.id, "Authenticated request");
    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}
