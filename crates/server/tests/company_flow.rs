use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use server::auth::{ServerAuthConfig, ServerState};
use server::routes;
use service::assets::FsAssetRepository;
use service::company::store::SeaOrmCompanyStore;
use service::company::CompanyService;

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

fn db_tests_enabled() -> bool {
    std::env::var("SKIP_DB_TESTS").is_err() && std::env::var("DATABASE_URL").is_ok()
}

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    // Repeat runs may have the schema applied already; ignore that case
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("migrations notice: {}", e);
    }

    // Isolated asset root per test run
    let assets_root = format!("target/test-data/{}/assets", Uuid::new_v4());
    let assets = Arc::new(FsAssetRepository::new(&assets_root, 1024 * 1024));
    let store = Arc::new(SeaOrmCompanyStore { db: db.clone() });
    let company_svc = Arc::new(CompanyService::new(store, assets, "http://localhost:5000"));

    let state = ServerState {
        db,
        auth: ServerAuthConfig { jwt_secret: "test-secret".into() },
        company_svc,
    };
    Ok(routes::build_router(cors(), state))
}

async fn json_body(res: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn company_creation_and_banner_replacement_flow() -> anyhow::Result<()> {
    if !db_tests_enabled() {
        eprintln!("skip: DATABASE_URL missing or SKIP_DB_TESTS set");
        return Ok(());
    }
    let app = build_app().await?;

    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("owner_{}", suffix);
    let title = format!("Acme {}", suffix);

    // Register
    let res = app
        .clone()
        .oneshot(post_json(
            "/api/User/Register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "S3curePass!",
            }),
        ))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Login
    let res = app
        .clone()
        .oneshot(post_json(
            "/api/User/Login",
            json!({ "username": username, "password": "S3curePass!" }),
        ))
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let login = json_body(res).await?;
    let token = login["token"].as_str().expect("token in login response").to_string();
    let bearer = format!("Bearer {}", token);

    // Create company from the base user
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/Company")
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::from(
                    json!({ "title": title, "description": "widgets" }).to_string(),
                ))
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The company shows up in the public listing
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/api/Company").body(Body::empty()).unwrap())
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let listing = json_body(res).await?;
    let company = listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["title"] == json!(title))
        .expect("created company listed")
        .clone();
    let company_id = company["id"].as_i64().unwrap();
    assert!(company["bannerUrl"].is_null());

    // No products yet
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/Company/{}/Products", company_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let products = json_body(res).await?;
    assert_eq!(products["items"].as_array().unwrap().len(), 0);

    // Banner starts absent
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/Company/{}/banner.jpg", company_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Replace the banner
    let payload = vec![0xFFu8, 0xD8, 0xFF, 0xE0, 1, 2, 3];
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/Company/Banner")
                .header(header::AUTHORIZATION, &bearer)
                .body(Body::from(payload.clone()))
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Fetch it back byte-for-byte
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/Company/{}/banner.jpg", company_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(header::CONTENT_TYPE).unwrap().to_str()?,
        "image/jpeg"
    );
    let bytes = to_bytes(res.into_body(), usize::MAX).await?;
    assert_eq!(bytes.as_ref(), payload.as_slice());

    // The derived URL was persisted
    let res = app
        .clone()
        .oneshot(Request::builder().uri("/api/Company").body(Body::empty()).unwrap())
        .await?;
    let listing = json_body(res).await?;
    let company = listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["id"].as_i64() == Some(company_id))
        .unwrap()
        .clone();
    assert_eq!(
        company["bannerUrl"],
        json!(format!("http://localhost:5000/api/Company/{}/banner.jpg", company_id))
    );

    Ok(())
}

#[tokio::test]
async fn asset_mutation_without_identity_is_not_found() -> anyhow::Result<()> {
    if !db_tests_enabled() {
        eprintln!("skip: DATABASE_URL missing or SKIP_DB_TESTS set");
        return Ok(());
    }
    let app = build_app().await?;

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/Company/Banner")
                .body(Body::from(vec![1u8, 2, 3]))
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/Company/Logo")
                .header(header::AUTHORIZATION, "Bearer not-a-valid-token")
                .body(Body::from(vec![1u8, 2, 3]))
                .unwrap(),
        )
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
