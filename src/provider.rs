//! Identity providers — turn a request into an authentication snapshot.
//!
//! This is the boundary where role strings become [`Role`] values. Unknown
//! roles are rejected here, never at the gate.

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::identity::{AuthSnapshot, Identity};
use crate::role::Role;

pub const USER_ID_HEADER: &str = "x-market-user-id";
pub const ROLE_HEADER: &str = "x-market-role";
pub const DISPLAY_NAME_HEADER: &str = "x-market-display-name";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<AuthSnapshot, IdentityError>;
}

fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<Option<&'a str>, IdentityError> {
    match headers.get(name) {
        None => Ok(None),
        Some(v) => v
            .to_str()
            .map(|s| Some(s.trim()).filter(|s| !s.is_empty()))
            .map_err(|_| IdentityError::InvalidHeader { header: name }),
    }
}

/// Trusts identity headers set by an upstream proxy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderIdentityProvider;

impl HeaderIdentityProvider {
    pub fn from_headers(headers: &HeaderMap) -> Result<AuthSnapshot, IdentityError> {
        let user_id = match header_str(headers, USER_ID_HEADER)? {
            Some(id) => id.to_string(),
            None => return Ok(AuthSnapshot::anonymous()),
        };
        let role: Role = header_str(headers, ROLE_HEADER)?
            .ok_or_else(|| IdentityError::MissingRole {
                user_id: user_id.clone(),
            })?
            .parse()?;

        let mut identity = Identity::new(user_id, role);
        if let Some(name) = header_str(headers, DISPLAY_NAME_HEADER)? {
            identity = identity.with_display_name(name);
        }
        Ok(AuthSnapshot::authenticated(identity))
    }
}

#[async_trait]
impl IdentityProvider for HeaderIdentityProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<AuthSnapshot, IdentityError> {
        Self::from_headers(headers)
    }
}

/// Claims carried by marketplace bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketClaims {
    pub sub: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: u64,
}

/// Verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    fn bearer(headers: &HeaderMap) -> Result<Option<&str>, IdentityError> {
        let value = match headers.get(header::AUTHORIZATION) {
            Some(v) => v.to_str().map_err(|_| IdentityError::InvalidHeader {
                header: "authorization",
            })?,
            None => return Ok(None),
        };
        match value.trim().split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
                Ok(Some(token.trim()))
            }
            _ => Err(IdentityError::InvalidToken("expected Bearer scheme".into())),
        }
    }

    pub fn decode_token(&self, token: &str) -> Result<AuthSnapshot, IdentityError> {
        let data = decode::<MarketClaims>(token, &self.key, &self.validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?;
        let claims = data.claims;
        let role: Role = claims.role.parse()?;

        let mut identity = Identity::new(claims.sub, role);
        if let Some(name) = claims.name {
            identity = identity.with_display_name(name);
        }
        Ok(AuthSnapshot::authenticated(identity))
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn resolve(&self, headers: &HeaderMap) -> Result<AuthSnapshot, IdentityError> {
        match Self::bearer(headers)? {
            Some(token) => self.decode_token(token),
            None => Ok(AuthSnapshot::anonymous()),
        }
    }
}

/// Returns the same snapshot for every request.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    snapshot: AuthSnapshot,
}

impl StaticIdentityProvider {
    pub fn new(snapshot: AuthSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<AuthSnapshot, IdentityError> {
        Ok(self.snapshot.clone())
    }
}
