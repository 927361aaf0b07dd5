//! Error types for the marketplace access gate
//!
//! Gate outcomes (pending, redirect, forbidden) are not errors. These types
//! only cover the boundaries around the gate: parsing roles, resolving
//! identities from requests and loading configuration.

use thiserror::Error;

/// A role value that is not part of the closed role set
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role '{0}'")]
    Unknown(String),

    #[error("Empty role value")]
    Empty,
}

/// Failures while turning a request into an authentication snapshot
#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Role error: {0}")]
    Role(#[from] RoleError),

    #[error("Identity '{user_id}' carries no role")]
    MissingRole { user_id: String },

    #[error("Header '{header}' is not valid UTF-8")]
    InvalidHeader { header: &'static str },

    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse route table: {0}")]
    Parse(String),

    #[error("Route '{path}': {source}")]
    InvalidRole {
        path: String,
        #[source]
        source: RoleError,
    },

    #[error("Route '{0}' is declared more than once")]
    DuplicateRoute(String),

    #[error("Path '{0}' must be absolute with literal segments only")]
    InvalidPath(String),

    #[error("Login path '{0}' is itself a protected route")]
    GatedLogin(String),

    #[error("Path '{0}' is reserved by the server")]
    ReservedPath(String),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}
