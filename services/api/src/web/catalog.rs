//! services/api/src/web/catalog.rs
//!
//! Public, unauthenticated catalog endpoints.

use axum::{
    extract::{Query, State},
    response::Json,
};
use bookshelf_core::domain::CatalogEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::web::state::AppState;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Free-text query.
    pub q: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntryResponse {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub description: String,
    pub thumbnail: String,
    pub read_link: String,
    /// Always false: catalog entries are never stored.
    pub is_uploaded: bool,
}

impl From<CatalogEntry> for CatalogEntryResponse {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            title: entry.title,
            authors: entry.authors,
            description: entry.description,
            thumbnail: entry.thumbnail,
            read_link: entry.read_link,
            is_uploaded: false,
        }
    }
}

fn to_response(entries: Vec<CatalogEntry>) -> Json<Vec<CatalogEntryResponse>> {
    Json(entries.into_iter().map(CatalogEntryResponse::from).collect())
}

/// GET /api/catalog/search - Search the public catalog
///
/// Upstream failures produce an empty list rather than an error.
#[utoipa::path(
    get,
    path = "/api/catalog/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching catalog entries (possibly none)", body = [CatalogEntryResponse])
    )
)]
pub async fn search_catalog_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<CatalogEntryResponse>> {
    let query = params.q.unwrap_or_default();
    to_response(state.catalog.search(&query).await)
}

/// GET /api/catalog/featured - Curated public-domain books
#[utoipa::path(
    get,
    path = "/api/catalog/featured",
    responses(
        (status = 200, description = "Featured catalog entries", body = [CatalogEntryResponse])
    )
)]
pub async fn featured_catalog_handler(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<CatalogEntryResponse>> {
    to_response(state.catalog.featured())
}
