use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

use crate::auth::{self, ServerState};

pub mod company;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public reads, auth endpoints, and the
/// owner-gated asset mutations.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public = Router::new().route("/health", get(health));

    let api = Router::new()
        .route("/api/User/Register", post(auth::register))
        .route("/api/User/Login", post(auth::login))
        .route("/api/User/Logout", post(auth::logout))
        .route(
            "/api/Company",
            get(company::get_companies).post(company::post_company),
        )
        .route("/api/Company/Banner", post(company::post_banner))
        .route("/api/Company/Logo", post(company::post_logo))
        .route("/api/Company/:id/banner.jpg", get(company::get_banner))
        .route("/api/Company/:id/logo.jpg", get(company::get_logo))
        .route("/api/Company/:id/Products", get(company::get_company_products));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
