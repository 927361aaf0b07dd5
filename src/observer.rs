//! Observability hook for gate decisions.
//!
//! The gate never logs on its own. Hosts inject an observer to get a record
//! of each decision; the server uses [`TracingObserver`].

use crate::gate::{AllowedRoles, GateState};
use crate::role::Role;

/// One decision, borrowed from the evaluation that produced it.
#[derive(Debug, Clone, Copy)]
pub struct GateDecision<'a> {
    pub user_id: Option<&'a str>,
    pub role: Option<Role>,
    pub allowed: &'a AllowedRoles,
    pub state: GateState,
}

pub trait GateObserver: Send + Sync {
    fn on_decision(&self, decision: &GateDecision<'_>);
}

/// Discards decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl GateObserver for NoopObserver {
    fn on_decision(&self, _decision: &GateDecision<'_>) {}
}

/// Emits a `tracing` event per decision.
#[derive(Debug, Clone, Default)]
pub struct TracingObserver {
    target: Option<String>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag events with the destination being guarded.
    pub fn for_route(route: impl Into<String>) -> Self {
        Self {
            target: Some(route.into()),
        }
    }
}

impl GateObserver for TracingObserver {
    fn on_decision(&self, d: &GateDecision<'_>) {
        let route = self.target.as_deref().unwrap_or("-");
        let role = d.role.map(|r| r.as_str()).unwrap_or("none");
        let user = d.user_id.unwrap_or("anonymous");
        let required = d.allowed.required_text();
        match d.state {
            GateState::Pending => {
                tracing::debug!(route, "authentication pending");
            }
            GateState::Unauthenticated => {
                tracing::info!(route, "unauthenticated request redirected to login");
            }
            GateState::Authorized => {
                tracing::debug!(route, user, role, required = %required, "access granted");
            }
            GateState::Forbidden => {
                tracing::warn!(route, user, role, required = %required, "access forbidden");
            }
        }
    }
}

/// Adapts a closure into an observer.
pub struct FnObserver<F> {
    f: F,
}

impl<F> FnObserver<F>
where
    F: Fn(&GateDecision<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> GateObserver for FnObserver<F>
where
    F: Fn(&GateDecision<'_>) + Send + Sync,
{
    fn on_decision(&self, decision: &GateDecision<'_>) {
        (self.f)(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn fn_observer_forwards() {
        let count = AtomicUsize::new(0);
        let observer = FnObserver::new(|d: &GateDecision<'_>| {
            if d.state == GateState::Forbidden {
                count.fetch_add(1, Ordering::SeqCst);
            }
        });
        let allowed = AllowedRoles::only([Role::Admin]);
        observer.on_decision(&GateDecision {
            user_id: Some("u"),
            role: Some(Role::Buyer),
            allowed: &allowed,
            state: GateState::Forbidden,
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tracing_observer_handles_all_states() {
        let observer = TracingObserver::for_route("/admin");
        let allowed = AllowedRoles::any();
        for state in [
            GateState::Pending,
            GateState::Unauthenticated,
            GateState::Authorized,
            GateState::Forbidden,
        ] {
            observer.on_decision(&GateDecision {
                user_id: None,
                role: None,
                allowed: &allowed,
                state,
            });
        }
    }
}
