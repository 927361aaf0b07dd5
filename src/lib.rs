//! Role-based access gate for the buyer / farmer / admin marketplace.
//!
//! This crate provides:
//!
//! - **AccessGate**: pure decision over an authentication snapshot and an
//!   optional allowed-roles restriction
//! - **Role**: closed role set, parsed at the identity boundary
//! - **IdentityProvider**: header and bearer-token resolution (`server`)
//! - **route_gate / protect**: axum middleware rendering the outcome (`server`)
//!
//! # Architecture
//!
//! ```text
//! Request ──► IdentityProvider ──► AuthSnapshot ──► AccessGate ──► GateOutcome
//!                                                       │
//!                     ┌─────────────────┬───────────────┼─────────────────┐
//!                     ▼                 ▼               ▼                 ▼
//!                  Pending          Redirect          Allow           Forbidden
//!              (loading page)   (303 to /login)  (inner handler)   (denial page)
//! ```
//!
//! # Example
//!
//! ```
//! use market_gate::{AccessGate, AuthSnapshot, GateOutcome, Identity, Role};
//!
//! let gate = AccessGate::for_roles([Role::Farmer, Role::Admin]);
//! let buyer = AuthSnapshot::authenticated(Identity::new("u-1", Role::Buyer));
//!
//! match gate.evaluate(&buyer) {
//!     GateOutcome::Forbidden(denial) => {
//!         assert_eq!(denial.required_text(), "FARMER or ADMIN");
//!         assert_eq!(denial.actual_text(), "BUYER");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod observer;
pub mod pages;
pub mod role;

#[cfg(feature = "server")]
pub mod middleware;
#[cfg(feature = "server")]
pub mod provider;
#[cfg(feature = "server")]
pub mod router;

pub use config::{IdentitySource, ProtectedRoute, RouteTable, ServerConfig};
pub use error::{ConfigError, IdentityError, RoleError};
pub use gate::{AccessGate, AllowedRoles, Denial, GateOutcome, GateState, Redirect};
pub use identity::{AuthSnapshot, Identity};
pub use observer::{FnObserver, GateDecision, GateObserver, NoopObserver, TracingObserver};
pub use role::Role;

#[cfg(feature = "server")]
pub use middleware::{protect, route_gate, GateLayerState};
#[cfg(feature = "server")]
pub use provider::{
    HeaderIdentityProvider, IdentityProvider, JwtIdentityProvider, StaticIdentityProvider,
};
#[cfg(feature = "server")]
pub use router::{build_router, build_router_with};
