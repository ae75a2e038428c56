//! services/api/src/adapters/catalog.rs
//!
//! Gutendex (Project Gutenberg) implementation of the `CatalogService` port.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bookshelf_core::domain::CatalogEntry;
use bookshelf_core::ports::{CatalogService, PortError, PortResult};
use serde::Deserialize;

const PLACEHOLDER_THUMBNAIL: &str = "https://via.placeholder.com/128x192?text=No+Cover";
const MISSING_DESCRIPTION: &str = "No description available.";

/// Formats tried, in order, for the link the reader opens.
const READABLE_FORMATS: [&str; 5] = [
    "text/html",
    "text/html; charset=utf-8",
    "application/pdf",
    "text/plain",
    "text/plain; charset=utf-8",
];

//=========================================================================================
// Gutendex Response Shape
//=========================================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<GutendexBook>,
}

#[derive(Debug, Deserialize)]
struct GutendexBook {
    id: u64,
    title: String,
    #[serde(default)]
    authors: Vec<GutendexPerson>,
    #[serde(default)]
    summaries: Vec<String>,
    #[serde(default)]
    formats: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct GutendexPerson {
    name: String,
}

impl GutendexBook {
    fn to_domain(self) -> CatalogEntry {
        let read_link = READABLE_FORMATS
            .iter()
            .find_map(|format| self.formats.get(*format))
            .cloned()
            .unwrap_or_default();
        let thumbnail = self
            .formats
            .get("image/jpeg")
            .cloned()
            .unwrap_or_else(|| PLACEHOLDER_THUMBNAIL.to_string());
        let description = self
            .summaries
            .into_iter()
            .next()
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string());

        CatalogEntry {
            id: self.id.to_string(),
            title: self.title,
            authors: self.authors.into_iter().map(|a| a.name).collect(),
            description,
            thumbnail,
            read_link,
        }
    }
}

//=========================================================================================
// The Adapter
//=========================================================================================

pub struct GutendexCatalogAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl GutendexCatalogAdapter {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl CatalogService for GutendexCatalogAdapter {
    async fn search(&self, query: &str) -> PortResult<Vec<CatalogEntry>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("search", query)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| PortError::Unexpected(format!("Catalog request failed: {}", e)))?;

        let body: SearchResponse = response.json().await.map_err(|e| {
            PortError::Unexpected(format!("Catalog response was not understood: {}", e))
        })?;

        Ok(body.results.into_iter().map(GutendexBook::to_domain).collect())
    }
}
