//! crates/bookshelf_core/src/services/catalog.rs
//!
//! Best-effort access to the external book catalog.

use std::sync::Arc;

use tracing::warn;

use crate::domain::CatalogEntry;
use crate::ports::CatalogService;

pub struct CatalogSearch {
    catalog: Arc<dyn CatalogService>,
}

impl CatalogSearch {
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// Never fails: upstream errors degrade to an empty result.
    pub async fn search(&self, query: &str) -> Vec<CatalogEntry> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.catalog.search(query).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Catalog search for {:?} failed, returning no results: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Curated public-domain books shown before the user searches.
    pub fn featured(&self) -> Vec<CatalogEntry> {
        featured_entries()
    }
}

pub fn featured_entries() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            id: "alice-in-wonderland".to_string(),
            title: "Alice's Adventures in Wonderland".to_string(),
            authors: vec!["Lewis Carroll".to_string()],
            description: "The classic fantasy novel about a young girl named Alice who falls through a rabbit hole into a fantasy world.".to_string(),
            thumbnail: "https://www.gutenberg.org/cache/epub/11/pg11.cover.medium.jpg".to_string(),
            read_link: "https://www.adobe.com/support/products/enterprise/knowledgecenter/media/c4611_sample_explain.pdf".to_string(),
        },
        CatalogEntry {
            id: "sample-pdf-report".to_string(),
            title: "Annual Report Sample".to_string(),
            authors: vec!["Corporate Demo".to_string()],
            description: "A sample PDF document to demonstrate the reading and downloading capabilities of the application.".to_string(),
            thumbnail: "https://images.unsplash.com/photo-1544947950-fa07a98d237f?auto=format&fit=crop&q=80&w=800".to_string(),
            read_link: "https://unec.edu.az/application/uploads/2014/12/pdf-sample.pdf".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fakes::StubCatalog;

    #[tokio::test]
    async fn upstream_failure_degrades_to_empty() {
        let search = CatalogSearch::new(Arc::new(StubCatalog::failing()));

        assert!(search.search("alice").await.is_empty());
    }

    #[tokio::test]
    async fn no_matches_is_an_empty_list() {
        let search = CatalogSearch::new(Arc::new(StubCatalog::with_entries(Vec::new())));

        assert!(search.search("zzzzzz").await.is_empty());
    }

    #[tokio::test]
    async fn blank_query_skips_upstream() {
        let stub = Arc::new(StubCatalog::with_entries(featured_entries()));
        let search = CatalogSearch::new(stub.clone());

        assert!(search.search("   ").await.is_empty());
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn results_pass_through() {
        let stub = Arc::new(StubCatalog::with_entries(featured_entries()));
        let search = CatalogSearch::new(stub.clone());

        let results = search.search(" alice ").await;

        assert_eq!(results.len(), 2);
        assert_eq!(stub.last_query().as_deref(), Some("alice"));
    }

    #[test]
    fn featured_list_is_not_empty() {
        let search = CatalogSearch::new(Arc::new(StubCatalog::failing()));
        assert!(search.featured().iter().all(|e| !e.read_link.is_empty()));
    }
}
