use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use cinelog_core::AppError;
use cinelog_core::testutil::MockFetcher;

use crate::integration::common::{FILMS_P1, setup_test_app, stubbed_fetcher};

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app(stubbed_fetcher());

    let (status, json) = get_json(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn manifest_describes_the_catalog() {
    let app = setup_test_app(stubbed_fetcher());

    let (status, json) = get_json(app, "/manifest.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "org.cinelog.jake84");
    assert_eq!(json["types"], serde_json::json!(["movie"]));
    assert_eq!(json["catalogs"][0]["id"], "cinelog-diary");
}

#[tokio::test]
async fn catalog_lists_reconciled_metas() {
    let app = setup_test_app(stubbed_fetcher());

    let (status, json) = get_json(app, "/catalog/movie/cinelog-diary.json").await;

    assert_eq!(status, StatusCode::OK);
    let metas = json["metas"].as_array().unwrap();
    assert_eq!(metas.len(), 2);
    assert_eq!(metas[0]["id"], "heat");
    assert_eq!(metas[0]["description"], "Rating by jake84: ★☆☆☆☆");
    assert_eq!(metas[1]["id"], "alien");
    assert_eq!(metas[1]["description"], "Not rated by jake84");
}

#[tokio::test]
async fn unknown_catalog_id_is_an_empty_listing() {
    let app = setup_test_app(stubbed_fetcher());

    let (status, json) = get_json(app, "/catalog/movie/not-this-addon.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["metas"], serde_json::json!([]));
}

#[tokio::test]
async fn non_movie_type_is_an_empty_listing() {
    let app = setup_test_app(stubbed_fetcher());

    let (status, json) = get_json(app, "/catalog/series/cinelog-diary.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["metas"], serde_json::json!([]));
}

#[tokio::test]
async fn meta_returns_the_record_for_a_known_id() {
    let app = setup_test_app(stubbed_fetcher());

    let (status, json) = get_json(app, "/meta/movie/heat.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["meta"]["id"], "heat");
    assert_eq!(json["meta"]["name"], "Heat");
    assert_eq!(json["meta"]["type"], "movie");
}

#[tokio::test]
async fn unknown_meta_id_is_a_null_meta_not_a_fault() {
    let app = setup_test_app(stubbed_fetcher());

    let (status, json) = get_json(app, "/meta/movie/no-such-film.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["meta"].is_null());
}

#[tokio::test]
async fn upstream_failure_still_yields_a_well_formed_catalog() {
    let fetcher = MockFetcher::default();
    fetcher.stub(FILMS_P1, Err(AppError::Http("HTTP 503".into())));
    let app = setup_test_app(fetcher);

    let (status, json) = get_json(app, "/catalog/movie/cinelog-diary.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["metas"], serde_json::json!([]));
}
