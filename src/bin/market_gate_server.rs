//! market_gate_server — serves the gated marketplace shell.
//!
//! Reads config from flags or env vars (a `.env` file is loaded first):
//!   MARKET_GATE_BIND_ADDR   — listen address (default: 127.0.0.1:3000)
//!   MARKET_GATE_LOGIN_PATH  — login destination (default: /login)
//!   MARKET_GATE_ROUTES      — YAML route table (default: built-in marketplace table)
//!   MARKET_GATE_JWT_SECRET  — HS256 secret; identities come from x-market-* headers when unset
//!
//! ```bash
//! cargo run --bin market_gate_server -- --routes config/routes.yaml
//!
//! curl -i http://localhost:3000/farmer/crops
//! curl -i -H 'x-market-user-id: u1' -H 'x-market-role: BUYER' http://localhost:3000/farmer/crops
//! curl 'http://localhost:3000/api/access?path=/admin' -H 'x-market-user-id: a1' -H 'x-market-role: ADMIN'
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use market_gate::{
    build_router, HeaderIdentityProvider, IdentityProvider, IdentitySource, JwtIdentityProvider,
    RouteTable, ServerConfig,
};

#[derive(Debug, Parser)]
#[command(name = "market_gate_server", about = "Role-gated marketplace shell")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "MARKET_GATE_BIND_ADDR", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Where unauthenticated requests are redirected
    #[arg(long, env = "MARKET_GATE_LOGIN_PATH", default_value = "/login")]
    login_path: String,

    /// YAML route table
    #[arg(long, env = "MARKET_GATE_ROUTES")]
    routes: Option<PathBuf>,

    /// HS256 secret for bearer tokens
    #[arg(long, env = "MARKET_GATE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let routes = match &self.routes {
            Some(path) => RouteTable::load_from_file(path)
                .with_context(|| format!("loading route table {}", path.display()))?,
            None => RouteTable::marketplace(),
        };
        let identity = match self.jwt_secret {
            Some(secret) => IdentitySource::Jwt { secret },
            None => IdentitySource::Headers,
        };
        let config = ServerConfig::new(self.bind)
            .with_login_path(self.login_path)
            .with_routes(routes)
            .with_identity(identity);
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,market_gate=debug,tower_http=debug".into()),
        )
        .init();

    let config = Args::parse().into_config()?;

    let provider: Arc<dyn IdentityProvider> = match &config.identity {
        IdentitySource::Headers => {
            tracing::warn!("trusting x-market-* identity headers from upstream");
            Arc::new(HeaderIdentityProvider)
        }
        IdentitySource::Jwt { secret } => {
            Arc::new(JwtIdentityProvider::from_secret(secret.as_bytes()))
        }
    };

    let app = build_router(&config, provider);

    for route in config.routes.routes() {
        let required = if route.allowed.is_restricted() {
            route.allowed.required_text()
        } else {
            "any signed-in role".to_string()
        };
        tracing::info!("  GET {} ({})", route.path, required);
    }

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("market_gate_server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
