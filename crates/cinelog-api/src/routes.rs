use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::routing::get;

use cinelog_core::traits::{Clock, Enricher, Fetcher};

use crate::dto::{CatalogResponse, HealthResponse, Manifest, MetaItem, MetaResponse};
use crate::state::AppState;

/// Build the full add-on router.
///
/// Every endpoint answers 200 with a well-formed body; upstream trouble
/// surfaces as an empty catalog or a `null` meta, which browsing clients
/// tolerate. That absorption happens in the catalog service, so there is no
/// error type at this layer.
pub fn router<F, E, C>(state: Arc<AppState<F, E, C>>) -> Router
where
    F: Fetcher + 'static,
    E: Enricher + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/manifest.json", get(manifest))
        .route("/catalog/{type}/{id}.json", get(catalog))
        .route("/meta/{type}/{id}.json", get(meta))
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse { status: "ok" })
}

async fn manifest<F, E, C>(State(state): State<Arc<AppState<F, E, C>>>) -> axum::Json<Manifest>
where
    F: Fetcher + 'static,
    E: Enricher + 'static,
    C: Clock + 'static,
{
    axum::Json(state.manifest.clone())
}

async fn catalog<F, E, C>(
    State(state): State<Arc<AppState<F, E, C>>>,
    Path((kind, id)): Path<(String, String)>,
) -> axum::Json<CatalogResponse>
where
    F: Fetcher + 'static,
    E: Enricher + 'static,
    C: Clock + 'static,
{
    if kind != "movie" {
        return axum::Json(CatalogResponse { metas: Vec::new() });
    }

    let records = state.catalog.list_catalog(&id).await;
    axum::Json(CatalogResponse {
        metas: records.into_iter().map(MetaItem::from).collect(),
    })
}

async fn meta<F, E, C>(
    State(state): State<Arc<AppState<F, E, C>>>,
    Path((kind, id)): Path<(String, String)>,
) -> axum::Json<MetaResponse>
where
    F: Fetcher + 'static,
    E: Enricher + 'static,
    C: Clock + 'static,
{
    if kind != "movie" {
        return axum::Json(MetaResponse { meta: None });
    }

    axum::Json(MetaResponse {
        meta: state.catalog.get_item(&id).await.map(MetaItem::from),
    })
}
