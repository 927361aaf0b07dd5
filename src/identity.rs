//! Identity and authentication snapshot consumed by the gate.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// The authenticated actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name to greet the identity with.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.user_id)
    }
}

/// Point-in-time view of the identity provider's state.
///
/// `is_authenticated` and `identity` are carried separately because providers
/// may report them independently; the gate treats a missing identity as
/// unauthenticated even when the flag is set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthSnapshot {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub identity: Option<Identity>,
}

impl AuthSnapshot {
    /// Authentication status is still being resolved.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            is_authenticated: false,
            identity: None,
        }
    }

    /// Resolution finished with no identity.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: Identity) -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
            identity: Some(identity),
        }
    }

    /// The identity, only if resolution finished and the flag agrees.
    pub fn current(&self) -> Option<&Identity> {
        if self.is_loading || !self.is_authenticated {
            return None;
        }
        self.identity.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|i| i.role)
    }
}
