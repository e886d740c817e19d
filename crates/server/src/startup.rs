use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use service::assets::FsAssetRepository;
use service::company::store::SeaOrmCompanyStore;
use service::company::CompanyService;

use crate::auth::{ServerAuthConfig, ServerState};
use crate::routes;

fn init_logging() {
    common::utils::logging::init_logging();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr(cfg: &configs::AppConfig) -> anyhow::Result<SocketAddr> {
    let host = if cfg.server.host.trim().is_empty() {
        env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string())
    } else {
        cfg.server.host.clone()
    };
    let port = if cfg.server.port == 0 {
        env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()).unwrap_or(5000)
    } else {
        cfg.server.port
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = configs::load_default().unwrap_or_default();

    // DB connection
    let db = models::db::connect().await?;

    // Core services: filesystem asset repository + aggregate service
    let assets = Arc::new(FsAssetRepository::new(
        &cfg.assets.root_dir,
        cfg.assets.max_upload_bytes,
    ));
    let store = Arc::new(SeaOrmCompanyStore { db: db.clone() });
    let company_svc = Arc::new(CompanyService::new(
        store,
        assets,
        cfg.assets.base_address.clone(),
    ));

    // JWT secret
    let jwt_secret =
        env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());
    let state = ServerState {
        db,
        auth: ServerAuthConfig { jwt_secret },
        company_svc,
    };

    // Build router
    let app: Router = routes::build_router(build_cors(), state);

    // Bind and serve
    let addr = load_bind_addr(&cfg)?;
    info!(%addr, assets_root = %cfg.assets.root_dir, "starting company api server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
