use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use service::assets::FsAssetRepository;
use service::auth::domain::{Claims, LoginInput, RegisterInput};
use service::auth::seaorm::SeaOrmAuthRepository;
use service::auth::service::{decode_token, AuthConfig, AuthService};
use service::company::store::SeaOrmCompanyStore;
use service::company::CompanyService;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
    pub company_svc: Arc<CompanyService<SeaOrmCompanyStore, FsAssetRepository>>,
}

#[derive(Serialize)]
pub struct RegisterOutput {
    pub user_id: i32,
}

#[derive(Serialize)]
pub struct LoginOutput {
    pub user_id: i32,
    pub username: String,
    pub role: String,
    pub token: String,
}

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    let repo = Arc::new(SeaOrmAuthRepository { db: state.db.clone() });
    AuthService::new(repo, AuthConfig::new(state.auth.jwt_secret.clone()))
}

/// Resolve the caller's verified identity from a bearer header or the
/// `auth_token` cookie. `None` when the request carries no valid credential.
pub fn verified_caller(state: &ServerState, headers: &HeaderMap, jar: &CookieJar) -> Option<Claims> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .or_else(|| jar.get("auth_token").map(|c| c.value().to_string()))?;
    decode_token(&state.auth.jwt_secret, &token).ok()
}

pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<RegisterOutput>, (StatusCode, String)> {
    let svc = auth_service(&state);
    let user = svc.register(input).await.map_err(|e| match e {
        service::auth::errors::AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        service::auth::errors::AuthError::Conflict => {
            (StatusCode::CONFLICT, "user already exists".into())
        }
        other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    })?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<LoginOutput>), (StatusCode, String)> {
    let svc = auth_service(&state);
    let session = svc
        .login(input)
        .await
        .map_err(|e| (StatusCode::UNAUTHORIZED, e.to_string()))?;
    let user = session.user;
    let token = session
        .token
        .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "token generation failed".to_string()))?;

    let mut cookie = Cookie::new("auth_token", token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
    let jar = jar.add(cookie);

    let out = LoginOutput { user_id: user.id, username: user.username, role: user.role, token };
    Ok((jar, Json(out)))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}
