//! AccessGate — decides what a navigation request gets to see.
//!
//! The decision is a pure function of the authentication snapshot and the
//! route's allowed roles. Every evaluation yields exactly one outcome:
//! a loading placeholder, a login redirect, the protected content, or a
//! denial screen. Nothing is logged from here; callers that want to observe
//! decisions go through [`AccessGate::evaluate_observed`].

use serde::{Deserialize, Serialize};

use crate::identity::AuthSnapshot;
use crate::observer::{GateDecision, GateObserver};
use crate::role::Role;

/// Default login destination.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

/// Optional role restriction for a protected view.
///
/// Empty means any authenticated identity may pass. Membership ignores order
/// and duplicates; the first-seen order is kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Role>", into = "Vec<Role>")]
pub struct AllowedRoles {
    roles: Vec<Role>,
}

impl AllowedRoles {
    /// No restriction.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn only<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        let mut deduped = Vec::new();
        for role in roles {
            if !deduped.contains(&role) {
                deduped.push(role);
            }
        }
        Self { roles: deduped }
    }

    pub fn is_restricted(&self) -> bool {
        !self.roles.is_empty()
    }

    pub fn permits(&self, role: Role) -> bool {
        !self.is_restricted() || self.roles.contains(&role)
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// "FARMER or ADMIN"
    pub fn required_text(&self) -> String {
        join_roles(&self.roles)
    }
}

impl From<Vec<Role>> for AllowedRoles {
    fn from(roles: Vec<Role>) -> Self {
        Self::only(roles)
    }
}

impl From<Option<Vec<Role>>> for AllowedRoles {
    fn from(roles: Option<Vec<Role>>) -> Self {
        roles.map(Self::only).unwrap_or_default()
    }
}

impl From<AllowedRoles> for Vec<Role> {
    fn from(allowed: AllowedRoles) -> Self {
        allowed.roles
    }
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Instruction for the navigator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    /// Current location must not stay in navigation history.
    pub replace: bool,
}

/// Data shown on the denial screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Denial {
    pub required: Vec<Role>,
    pub actual: Role,
}

impl Denial {
    pub fn required_text(&self) -> String {
        join_roles(&self.required)
    }

    pub fn actual_text(&self) -> &'static str {
        self.actual.as_str()
    }
}

/// What a single evaluation produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GateOutcome {
    /// Render the loading placeholder only.
    Pending,
    /// Send the requester to the login destination.
    Redirect(Redirect),
    /// Render the protected content.
    Allow,
    /// Render the denial screen. No automatic redirect.
    Forbidden(Denial),
}

/// Coarse state of the gate, for observers and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Pending,
    Unauthenticated,
    Authorized,
    Forbidden,
}

impl GateOutcome {
    pub fn state(&self) -> GateState {
        match self {
            GateOutcome::Pending => GateState::Pending,
            GateOutcome::Redirect(_) => GateState::Unauthenticated,
            GateOutcome::Allow => GateState::Authorized,
            GateOutcome::Forbidden(_) => GateState::Forbidden,
        }
    }
}

/// Role gate for one protected destination. Configured once, evaluated per
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGate {
    allowed: AllowedRoles,
    login_path: String,
}

impl AccessGate {
    pub fn new(allowed: AllowedRoles) -> Self {
        Self {
            allowed,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    /// Any authenticated identity passes.
    pub fn authenticated() -> Self {
        Self::new(AllowedRoles::any())
    }

    pub fn for_roles<I>(roles: I) -> Self
    where
        I: IntoIterator<Item = Role>,
    {
        Self::new(AllowedRoles::only(roles))
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn allowed(&self) -> &AllowedRoles {
        &self.allowed
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn evaluate(&self, snapshot: &AuthSnapshot) -> GateOutcome {
        if snapshot.is_loading {
            return GateOutcome::Pending;
        }

        let Some(identity) = snapshot.current() else {
            return GateOutcome::Redirect(Redirect {
                to: self.login_path.clone(),
                replace: true,
            });
        };

        if self.allowed.permits(identity.role) {
            GateOutcome::Allow
        } else {
            GateOutcome::Forbidden(Denial {
                required: self.allowed.roles().to_vec(),
                actual: identity.role,
            })
        }
    }

    /// Same decision as [`evaluate`](Self::evaluate), reported to `observer`.
    pub fn evaluate_observed(
        &self,
        snapshot: &AuthSnapshot,
        observer: &dyn GateObserver,
    ) -> GateOutcome {
        let outcome = self.evaluate(snapshot);
        observer.on_decision(&GateDecision {
            user_id: snapshot.current().map(|i| i.user_id.as_str()),
            role: snapshot.role(),
            allowed: &self.allowed,
            state: outcome.state(),
        });
        outcome
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::identity::Identity;
    use proptest::prelude::*;

    fn arb_role() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Buyer), Just(Role::Farmer), Just(Role::Admin)]
    }

    fn arb_allowed() -> impl Strategy<Value = AllowedRoles> {
        prop::collection::vec(arb_role(), 0..6).prop_map(AllowedRoles::only)
    }

    fn arb_snapshot() -> impl Strategy<Value = AuthSnapshot> {
        (
            any::<bool>(),
            any::<bool>(),
            prop::option::of(arb_role()),
        )
            .prop_map(|(is_loading, is_authenticated, role)| AuthSnapshot {
                is_loading,
                is_authenticated,
                identity: role.map(|r| Identity::new("user", r)),
            })
    }

    proptest! {
        #[test]
        fn loading_always_pending(snap in arb_snapshot(), allowed in arb_allowed()) {
            let snap = AuthSnapshot { is_loading: true, ..snap };
            prop_assert_eq!(AccessGate::new(allowed).evaluate(&snap), GateOutcome::Pending);
        }

        #[test]
        fn unauthenticated_always_redirects(snap in arb_snapshot(), allowed in arb_allowed()) {
            let snap = AuthSnapshot { is_loading: false, is_authenticated: false, ..snap };
            let outcome = AccessGate::new(allowed).evaluate(&snap);
            prop_assert_eq!(
                outcome,
                GateOutcome::Redirect(Redirect { to: DEFAULT_LOGIN_PATH.into(), replace: true })
            );
        }

        #[test]
        fn unrestricted_always_allows(role in arb_role()) {
            let snap = AuthSnapshot::authenticated(Identity::new("user", role));
            prop_assert_eq!(AccessGate::authenticated().evaluate(&snap), GateOutcome::Allow);
        }

        #[test]
        fn restricted_follows_membership(role in arb_role(), roles in prop::collection::vec(arb_role(), 1..6)) {
            let snap = AuthSnapshot::authenticated(Identity::new("user", role));
            let gate = AccessGate::for_roles(roles.clone());
            let outcome = gate.evaluate(&snap);
            if roles.contains(&role) {
                prop_assert_eq!(outcome, GateOutcome::Allow);
            } else {
                let expected = gate.allowed().required_text();
                match outcome {
                    GateOutcome::Forbidden(denial) => {
                        prop_assert_eq!(denial.required_text(), expected);
                        prop_assert_eq!(denial.actual_text(), role.as_str());
                    }
                    other => prop_assert!(false, "expected forbidden, got {:?}", other),
                }
            }
        }

        #[test]
        fn order_does_not_change_decision(role in arb_role(), roles in prop::collection::vec(arb_role(), 0..6)) {
            let snap = AuthSnapshot::authenticated(Identity::new("user", role));
            let mut reversed = roles.clone();
            reversed.reverse();
            let a = AccessGate::for_roles(roles).evaluate(&snap).state();
            let b = AccessGate::for_roles(reversed).evaluate(&snap).state();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn evaluation_is_idempotent(snap in arb_snapshot(), allowed in arb_allowed()) {
            let gate = AccessGate::new(allowed);
            prop_assert_eq!(gate.evaluate(&snap), gate.evaluate(&snap));
        }
    }
}
