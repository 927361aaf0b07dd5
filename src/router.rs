//! Router construction for the marketplace shell.
//!
//! Public routes (`/health`, the login page, the access-check API) are open;
//! every entry of the route table is wrapped with its own [`AccessGate`].

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::config::{ProtectedRoute, RouteTable, ServerConfig, ACCESS_API_PATH, HEALTH_PATH};
use crate::gate::GateOutcome;
use crate::identity::{AuthSnapshot, Identity};
use crate::middleware::protect;
use crate::observer::{GateObserver, TracingObserver};
use crate::pages;
use crate::provider::IdentityProvider;

#[derive(Clone)]
struct AccessApiState {
    routes: Arc<RouteTable>,
    login_path: Arc<str>,
    provider: Arc<dyn IdentityProvider>,
}

#[derive(Debug, Deserialize)]
struct AccessQuery {
    path: String,
}

#[derive(Debug, Serialize)]
struct AccessResponse {
    path: String,
    decision: GateOutcome,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the router with a tracing observer per protected route.
pub fn build_router(config: &ServerConfig, provider: Arc<dyn IdentityProvider>) -> Router {
    build_router_with(config, provider, |route| {
        let observer: Arc<dyn GateObserver> =
            Arc::new(TracingObserver::for_route(route.path.clone()));
        observer
    })
}

/// Build the router, choosing the observer for each protected route.
pub fn build_router_with<F>(
    config: &ServerConfig,
    provider: Arc<dyn IdentityProvider>,
    observer_for: F,
) -> Router
where
    F: Fn(&ProtectedRoute) -> Arc<dyn GateObserver>,
{
    let mut app = Router::new()
        .route(HEALTH_PATH, get(health))
        .route(&config.login_path, get(login))
        .route(
            ACCESS_API_PATH,
            get(check_access).with_state(AccessApiState {
                routes: Arc::new(config.routes.clone()),
                login_path: Arc::from(config.login_path.as_str()),
                provider: Arc::clone(&provider),
            }),
        );

    for route in config.routes.routes() {
        let title = route.title.clone();
        let page = Router::new().route(
            &route.path,
            get(move |Extension(identity): Extension<Identity>| {
                let title = title.clone();
                async move { Html(pages::content_page(&title, &identity)) }
            }),
        );
        app = app.merge(protect(
            page,
            route.gate(&config.login_path),
            Arc::clone(&provider),
            observer_for(route),
        ));
    }

    app.layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn login() -> Html<String> {
    Html(pages::login_page())
}

/// Report the gate outcome for `path` without serving it.
async fn check_access(
    State(state): State<AccessApiState>,
    Query(query): Query<AccessQuery>,
    headers: axum::http::HeaderMap,
) -> Response {
    let route = match state.routes.get(&query.path) {
        Some(route) => route,
        None => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Route '{}' is not protected", query.path),
                }),
            )
                .into_response()
        }
    };

    let snapshot = state.provider.resolve(&headers).await.unwrap_or_else(|e| {
        tracing::warn!(path = %query.path, "identity rejected: {}", e);
        AuthSnapshot::anonymous()
    });
    let outcome = route.gate(&state.login_path).evaluate(&snapshot);

    Json(AccessResponse {
        path: query.path,
        decision: outcome,
    })
    .into_response()
}
