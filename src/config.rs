//! Route table and server configuration
//!
//! Protected destinations and their allowed roles are declared in YAML:
//!
//! ```yaml
//! routes:
//!   - path: /farmer/crops
//!     title: My crops
//!     allowed_roles: [FARMER]
//!   - path: /profile
//!     title: Profile
//! ```
//!
//! Role names are checked while loading, so an unknown role fails at startup
//! rather than at request time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::{AccessGate, AllowedRoles, DEFAULT_LOGIN_PATH};
use crate::role::Role;

pub const HEALTH_PATH: &str = "/health";
pub const ACCESS_API_PATH: &str = "/api/access";

/// Paths served by the shell itself; they cannot be gated.
const RESERVED_PATHS: &[&str] = &[HEALTH_PATH, ACCESS_API_PATH];

/// Absolute path with literal segments only. Capture segments (`:id`,
/// `*rest`) and query or fragment markers are refused, so the router and the
/// access API match the same set of paths.
fn is_literal_path(path: &str) -> bool {
    path.starts_with('/')
        && !path
            .chars()
            .any(|c| matches!(c, ':' | '*' | '?' | '#' | '{' | '}') || c.is_whitespace())
}

/// Raw route entry as written in the YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteSpec {
    path: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    allowed_roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteTableFile {
    #[serde(default)]
    routes: Vec<RouteSpec>,
}

/// A validated protected destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoute {
    pub path: String,
    pub title: String,
    pub allowed: AllowedRoles,
}

impl ProtectedRoute {
    pub fn new(path: impl Into<String>, title: impl Into<String>, allowed: AllowedRoles) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            allowed,
        }
    }

    /// Gate for this route, redirecting to `login_path`.
    pub fn gate(&self, login_path: &str) -> AccessGate {
        AccessGate::new(self.allowed.clone()).with_login_path(login_path)
    }
}

/// Ordered set of protected destinations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<ProtectedRoute>,
}

impl RouteTable {
    /// Load from a YAML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::load_from_str(&content)
    }

    /// Load from a YAML string
    pub fn load_from_str(yaml: &str) -> Result<Self, ConfigError> {
        let file: RouteTableFile =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let mut table = RouteTable::default();
        for spec in file.routes {
            let roles = spec
                .allowed_roles
                .iter()
                .map(|r| r.parse::<Role>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ConfigError::InvalidRole {
                    path: spec.path.clone(),
                    source,
                })?;
            let title = spec.title.unwrap_or_else(|| spec.path.clone());
            table.push(ProtectedRoute::new(spec.path, title, AllowedRoles::only(roles)))?;
        }
        Ok(table)
    }

    /// Built-in table for the marketplace views
    pub fn marketplace() -> Self {
        use Role::*;

        let routes = vec![
            ProtectedRoute::new("/dashboard", "Dashboard", AllowedRoles::any()),
            ProtectedRoute::new("/profile", "Profile", AllowedRoles::any()),
            ProtectedRoute::new("/buyer/orders", "My orders", AllowedRoles::only([Buyer])),
            ProtectedRoute::new(
                "/buyer/reviews",
                "My reviews",
                AllowedRoles::only([Buyer, Admin]),
            ),
            ProtectedRoute::new("/farmer/crops", "My crops", AllowedRoles::only([Farmer])),
            ProtectedRoute::new(
                "/farmer/advice",
                "Crop advice",
                AllowedRoles::only([Farmer, Admin]),
            ),
            ProtectedRoute::new("/admin", "Administration", AllowedRoles::only([Admin])),
        ];
        Self { routes }
    }

    pub fn push(&mut self, route: ProtectedRoute) -> Result<(), ConfigError> {
        if !is_literal_path(&route.path) {
            return Err(ConfigError::InvalidPath(route.path));
        }
        if self.routes.iter().any(|r| r.path == route.path) {
            return Err(ConfigError::DuplicateRoute(route.path));
        }
        self.routes.push(route);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&ProtectedRoute> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn routes(&self) -> &[ProtectedRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Where identities come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    /// `x-market-*` headers set by a trusted upstream
    Headers,
    /// HS256 bearer tokens
    Jwt { secret: String },
}

/// Server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub login_path: String,
    pub routes: RouteTable,
    pub identity: IdentitySource,
}

impl ServerConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            routes: RouteTable::marketplace(),
            identity: IdentitySource::Headers,
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_identity(mut self, identity: IdentitySource) -> Self {
        self.identity = identity;
        self
    }

    /// Reject settings that would make the gate unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_literal_path(&self.login_path) {
            return Err(ConfigError::InvalidPath(self.login_path.clone()));
        }
        if self.routes.get(&self.login_path).is_some() {
            return Err(ConfigError::GatedLogin(self.login_path.clone()));
        }
        if RESERVED_PATHS.contains(&self.login_path.as_str()) {
            return Err(ConfigError::ReservedPath(self.login_path.clone()));
        }
        if let Some(route) = self
            .routes
            .routes()
            .iter()
            .find(|r| RESERVED_PATHS.contains(&r.path.as_str()))
        {
            return Err(ConfigError::ReservedPath(route.path.clone()));
        }
        if let IdentitySource::Jwt { secret } = &self.identity {
            if secret.is_empty() {
                return Err(ConfigError::Missing("jwt secret"));
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1:3000")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_yaml_routes() {
        let yaml = r#"
routes:
  - path: /farmer/crops
    title: My crops
    allowed_roles: [farmer]
  - path: /profile
"#;
        let table = RouteTable::load_from_str(yaml).unwrap();
        assert_eq!(table.len(), 2);
        let crops = table.get("/farmer/crops").unwrap();
        assert_eq!(crops.allowed.roles(), &[Role::Farmer]);
        let profile = table.get("/profile").unwrap();
        assert_eq!(profile.title, "/profile");
        assert!(!profile.allowed.is_restricted());
    }

    #[test]
    fn unknown_role_fails_loading() {
        let yaml = "routes:\n  - path: /x\n    allowed_roles: [GARDENER]\n";
        let err = RouteTable::load_from_str(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRole { ref path, .. } if path == "/x"));
    }

    #[test]
    fn duplicate_route_fails_loading() {
        let yaml = "routes:\n  - path: /x\n  - path: /x\n";
        assert!(matches!(
            RouteTable::load_from_str(yaml),
            Err(ConfigError::DuplicateRoute(p)) if p == "/x"
        ));
    }

    #[test]
    fn relative_path_rejected() {
        let yaml = "routes:\n  - path: admin\n";
        assert!(matches!(
            RouteTable::load_from_str(yaml),
            Err(ConfigError::InvalidPath(_))
        ));
    }

    #[test]
    fn capture_segments_rejected() {
        for path in ["/crops/:", "/farmer/:id", "/files/*rest", "/search?q=x"] {
            let yaml = format!("routes:\n  - path: \"{path}\"\n");
            assert!(
                matches!(
                    RouteTable::load_from_str(&yaml),
                    Err(ConfigError::InvalidPath(ref p)) if p == path
                ),
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn login_path_must_be_literal() {
        let config = ServerConfig::default().with_login_path("/login/:next");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPath(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "routes:\n  - path: /admin\n    allowed_roles: [ADMIN]").unwrap();
        let table = RouteTable::load_from_file(file.path()).unwrap();
        assert_eq!(table.get("/admin").unwrap().allowed.roles(), &[Role::Admin]);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = RouteTable::load_from_file(Path::new("/nonexistent/routes.yaml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/routes.yaml"));
    }

    #[test]
    fn marketplace_table_is_valid() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert!(config.routes.get("/admin").is_some());
    }

    #[test]
    fn gated_login_path_rejected() {
        let config = ServerConfig::default().with_login_path("/dashboard");
        assert!(matches!(config.validate(), Err(ConfigError::GatedLogin(_))));
    }

    #[test]
    fn reserved_paths_rejected() {
        let routes = RouteTable::load_from_str("routes:\n  - path: /health\n").unwrap();
        let config = ServerConfig::default().with_routes(routes);
        assert!(matches!(config.validate(), Err(ConfigError::ReservedPath(p)) if p == "/health"));
    }

    #[test]
    fn empty_jwt_secret_rejected() {
        let config = ServerConfig::default().with_identity(IdentitySource::Jwt {
            secret: String::new(),
        });
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn route_gate_uses_login_path() {
        let route = ProtectedRoute::new("/admin", "Admin", AllowedRoles::only([Role::Admin]));
        assert_eq!(route.gate("/signin").login_path(), "/signin");
    }
}
