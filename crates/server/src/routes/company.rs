use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use service::company::projection::{CompanyList, ProductList};

use crate::auth::{self, ServerState};
use crate::errors::JsonApiError;

#[derive(Deserialize)]
pub struct CompanyPostInput {
    pub title: String,
    pub description: String,
}

/// Public banner fetch; the payload is served as `image/jpeg` as-is.
pub async fn get_banner(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, JsonApiError> {
    let bytes = state.company_svc.banner_bytes(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

pub async fn get_logo(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, JsonApiError> {
    let bytes = state.company_svc.logo_bytes(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

/// Replace the caller's company banner. The target company is derived from
/// the verified identity, never from the request.
pub async fn post_banner(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> Result<StatusCode, JsonApiError> {
    let claims = auth::verified_caller(&state, &headers, &jar)
        .ok_or_else(|| JsonApiError::not_found("no verified identity"))?;
    state.company_svc.replace_banner(claims.uid, body.to_vec()).await?;
    Ok(StatusCode::OK)
}

pub async fn post_logo(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> Result<StatusCode, JsonApiError> {
    let claims = auth::verified_caller(&state, &headers, &jar)
        .ok_or_else(|| JsonApiError::not_found("no verified identity"))?;
    state.company_svc.replace_logo(claims.uid, body.to_vec()).await?;
    Ok(StatusCode::OK)
}

pub async fn get_companies(
    State(state): State<ServerState>,
) -> Result<Json<CompanyList>, JsonApiError> {
    let companies = state.company_svc.list_companies().await?;
    Ok(Json(CompanyList::from(companies)))
}

pub async fn get_company_products(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
) -> Result<Json<ProductList>, JsonApiError> {
    let products = state.company_svc.list_company_products(id).await?;
    Ok(Json(ProductList::from(products)))
}

/// Promote the caller to a company owner with a brand-new company.
pub async fn post_company(
    State(state): State<ServerState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(input): Json<CompanyPostInput>,
) -> Result<StatusCode, JsonApiError> {
    let claims = auth::verified_caller(&state, &headers, &jar)
        .ok_or_else(|| JsonApiError::not_found("no verified identity"))?;
    state
        .company_svc
        .create_company_from_user(claims.uid, &input.title, &input.description)
        .await?;
    Ok(StatusCode::OK)
}
