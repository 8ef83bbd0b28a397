//! HTTP routes for the timepunch web app.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use timepunch_auth::{AuthErrorCode, TokenManager};
use timepunch_core::{ClockPayload, ClockRequest};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::{ServerError, ServerResult};
use crate::identity::UserIdentity;
use crate::pages;
use crate::timesheet::TimesheetClient;

/// Shared state for all handlers.
pub struct AppState {
    /// The token lifecycle manager.
    pub tokens: TokenManager,
    /// Client for the timesheet backend.
    pub timesheet: TimesheetClient,
    /// Caller identity resolution.
    pub identity: Arc<dyn UserIdentity>,
}

/// Builds the application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(front))
        .route("/auth", get(auth))
        .route("/usercallback", get(usercallback))
        .route("/api/clock", post(clock))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// -- Request/Response types ---------------------------------------------------

/// Query parameters of the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// The authorization code, on success.
    pub code: Option<String>,
    /// The state token issued with the authorization URL.
    pub state: Option<String>,
    /// The provider's error code, when the user denied access.
    pub error: Option<String>,
}

/// Response of `GET /healthz`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "running" when the server answers at all.
    pub status: String,
    /// Whether a refresh token is stored.
    pub authorized: bool,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /` — the clock front end.
async fn front() -> Html<String> {
    Html(pages::front_page())
}

/// `GET /auth` — the authorization page.
///
/// With no stored refresh token this shows the callback URL to register and
/// the authorization URL to visit; afterwards it confirms authorization.
async fn auth(State(state): State<Arc<AppState>>) -> ServerResult<Html<String>> {
    if state.tokens.is_authorized()? {
        return Ok(Html(pages::already_authorized()));
    }

    let auth_url = state.tokens.authorization_url()?;
    Ok(Html(pages::auth_page(
        state.tokens.redirect_uri(),
        &auth_url,
    )))
}

/// `GET /usercallback` — the OAuth callback.
///
/// Exchanges the authorization code for tokens. Failures leave the stored
/// state untouched, so the user can retry from the auth page.
async fn usercallback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<String>) {
    if let Some(ref error) = params.error {
        warn!(error = %error, "authorization denied by provider");
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::callback_error(&format!(
                "The provider reported: {}",
                error
            ))),
        );
    }

    let (Some(code), Some(state_token)) = (params.code.as_deref(), params.state.as_deref()) else {
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::callback_error(
                "The callback is missing the code or state parameter.",
            )),
        );
    };

    match state.tokens.complete_authorization(code, state_token).await {
        Ok(()) => (StatusCode::OK, Html(pages::callback_success())),
        Err(err) => {
            warn!(error = %err, "callback exchange failed");
            let status = match err.code() {
                AuthErrorCode::StateRejected => StatusCode::BAD_REQUEST,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, Html(pages::callback_error(err.message())))
        }
    }
}

/// `POST /api/clock` — forwards a clock action to the timesheet backend.
///
/// The caller's email comes from the identity seam, never from the request
/// body; the backend's response body is relayed verbatim.
async fn clock(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<ClockRequest>,
) -> ServerResult<String> {
    let email = state
        .identity
        .email(&headers)
        .ok_or_else(|| ServerError::Identity("no authenticated caller email".to_string()))?;

    if request.employee_id.trim().is_empty() {
        return Err(ServerError::BadRequest("employee_id is required".to_string()));
    }

    let payload = ClockPayload::clock(request, email);
    state.timesheet.clock(&payload).await
}

/// `GET /healthz` — liveness probe.
async fn healthz(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_string(),
        authorized: state.tokens.is_authorized().unwrap_or(false),
    })
}
