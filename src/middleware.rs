//! axum middleware that puts an [`AccessGate`] in front of a router.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    middleware::{self as axum_mw, Next},
    response::{Html, IntoResponse, Redirect, Response},
    Router,
};

use crate::gate::{AccessGate, GateOutcome};
use crate::identity::AuthSnapshot;
use crate::observer::GateObserver;
use crate::pages;
use crate::provider::IdentityProvider;

/// Everything the gate middleware needs per request.
#[derive(Clone)]
pub struct GateLayerState {
    pub gate: Arc<AccessGate>,
    pub provider: Arc<dyn IdentityProvider>,
    pub observer: Arc<dyn GateObserver>,
}

impl GateLayerState {
    pub fn new(
        gate: AccessGate,
        provider: Arc<dyn IdentityProvider>,
        observer: Arc<dyn GateObserver>,
    ) -> Self {
        Self {
            gate: Arc::new(gate),
            provider,
            observer,
        }
    }
}

/// Resolve the requester, evaluate the gate and answer accordingly.
///
/// On `Allow` the resolved [`Identity`](crate::identity::Identity) is put into
/// the request extensions for the inner handler.
pub async fn route_gate(
    State(state): State<GateLayerState>,
    mut req: Request,
    next: Next,
) -> Response {
    let snapshot = match state.provider.resolve(req.headers()).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(path = %req.uri().path(), "identity rejected: {}", e);
            AuthSnapshot::anonymous()
        }
    };

    let outcome = state
        .gate
        .evaluate_observed(&snapshot, state.observer.as_ref());
    if let Some(resp) = denied_response(outcome) {
        return resp;
    }

    if let Some(identity) = snapshot.identity {
        req.extensions_mut().insert(identity);
    }
    next.run(req).await
}

/// Response that replaces the protected content, or `None` on `Allow`.
pub fn denied_response(outcome: GateOutcome) -> Option<Response> {
    let resp = match outcome {
        GateOutcome::Allow => return None,
        GateOutcome::Pending => {
            let mut resp = Html(pages::loading_page()).into_response();
            let headers = resp.headers_mut();
            headers.insert(
                HeaderName::from_static("refresh"),
                HeaderValue::from_static("1"),
            );
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            resp
        }
        // 303: the gated URL is not kept in history
        GateOutcome::Redirect(redirect) => Redirect::to(&redirect.to).into_response(),
        GateOutcome::Forbidden(denial) => {
            (StatusCode::FORBIDDEN, Html(pages::denial_page(&denial))).into_response()
        }
    };
    Some(resp)
}

/// Wrap every route of `router` with `gate`.
pub fn protect<S>(
    router: Router<S>,
    gate: AccessGate,
    provider: Arc<dyn IdentityProvider>,
    observer: Arc<dyn GateObserver>,
) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let state = GateLayerState::new(gate, provider, observer);
    router.layer(axum_mw::from_fn_with_state(state, route_gate))
}
