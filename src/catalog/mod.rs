//! Tour catalog store
//!
//! Single source of truth for the tour list, the active search/filter
//! criteria and the display language/currency. The filtered view is derived
//! on demand from the current snapshot, so it is always consistent with it.

pub mod filter;

pub use filter::{filter_tours, Facet, FilterCriteria};

use crate::api::ApiClient;
use crate::i18n::Language;
use crate::models::{Currency, Tour};
use crate::state::Observable;
use crate::types::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Snapshot of the catalog store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub tours: Vec<Tour>,
    pub loading: bool,
    pub search_query: String,
    pub filters: FilterCriteria,
    pub language: Language,
    pub currency: Currency,
}

impl CatalogState {
    pub fn filtered(&self) -> Vec<Tour> {
        filter_tours(&self.tours, &self.search_query, &self.filters)
            .into_iter()
            .cloned()
            .collect()
    }
}

pub struct TourCatalog {
    api: ApiClient,
    state: Observable<CatalogState>,
    fetch_generation: AtomicU64,
}

impl TourCatalog {
    pub fn new(api: ApiClient, language: Language, currency: Currency) -> Self {
        Self {
            api,
            state: Observable::new(CatalogState {
                language,
                currency,
                ..Default::default()
            }),
            fetch_generation: AtomicU64::new(0),
        }
    }

    /// Replace the catalog from `GET /api/tours`.
    ///
    /// Never fails: on error the previous catalog is kept and the error is
    /// logged. `loading` stays true until the most recent call finishes; an
    /// older call's response is dropped.
    pub async fn fetch_tours(&self) {
        let generation = self.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.update(|s| s.loading = true);

        let result = self.api.list_tours().await;
        if self.fetch_generation.load(Ordering::SeqCst) != generation {
            debug!("Dropping tour list superseded by a newer fetch");
            return;
        }

        match result {
            Ok(tours) => {
                info!("Loaded {} tours", tours.len());
                self.state.update(|s| {
                    s.tours = tours;
                    s.loading = false;
                });
            }
            Err(e) => {
                error!("Failed to fetch tours: {}", e);
                self.state.update(|s| s.loading = false);
            }
        }
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.update_if(|s| {
            if s.search_query == query {
                return false;
            }
            s.search_query = query;
            true
        });
    }

    pub fn set_filters(&self, filters: FilterCriteria) {
        self.state.update_if(|s| {
            if s.filters == filters {
                return false;
            }
            s.filters = filters;
            true
        });
    }

    pub fn set_language(&self, language: Language) {
        self.state.update(|s| s.language = language);
    }

    pub fn set_currency(&self, currency: Currency) {
        self.state.update(|s| s.currency = currency);
    }

    pub fn tours(&self) -> Vec<Tour> {
        self.state.with(|s| s.tours.clone())
    }

    /// Tours admitted by the current search text and filters.
    pub fn filtered_tours(&self) -> Vec<Tour> {
        self.state.with(CatalogState::filtered)
    }

    /// Catalog entry by id, if loaded.
    pub fn tour(&self, id: &str) -> Option<Tour> {
        self.state
            .with(|s| s.tours.iter().find(|t| t.id == id).cloned())
    }

    /// Catalog entry by id, falling back to `GET /api/tours/:id`.
    pub async fn tour_detail(&self, id: &str) -> Result<Tour> {
        if let Some(tour) = self.tour(id) {
            debug!("Tour {} served from catalog", id);
            return Ok(tour);
        }
        self.api.get_tour(id).await
    }

    pub fn is_loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    pub fn language(&self) -> Language {
        self.state.with(|s| s.language)
    }

    pub fn currency(&self) -> Currency {
        self.state.with(|s| s.currency)
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<CatalogState> {
        self.state.subscribe()
    }

    // ============= Admin edits =============

    pub async fn create_tour(&self, tour: &Tour, token: Option<&str>) -> Result<()> {
        self.api.create_tour(tour, token).await?;
        self.fetch_tours().await;
        Ok(())
    }

    pub async fn update_tour(&self, tour: &Tour, token: Option<&str>) -> Result<()> {
        self.api.update_tour(tour, token).await?;
        self.fetch_tours().await;
        Ok(())
    }

    pub async fn delete_tour(&self, id: &str, token: Option<&str>) -> Result<()> {
        self.api.delete_tour(id, token).await?;
        self.fetch_tours().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TourRecord;

    fn offline_catalog() -> TourCatalog {
        TourCatalog::new(
            ApiClient::with_base_url("http://127.0.0.1:1"),
            Language::En,
            Currency::Usd,
        )
    }

    #[test]
    fn test_setters_notify_only_on_change() {
        let catalog = offline_catalog();
        let rx = catalog.subscribe();

        catalog.set_search_query("");
        assert!(!rx.has_changed().unwrap());

        catalog.set_search_query("gốm");
        assert!(rx.has_changed().unwrap());
        assert_eq!(catalog.snapshot().search_query, "gốm");
    }

    #[test]
    fn test_filtered_view_tracks_state() {
        let catalog = offline_catalog();
        catalog.state.update(|s| {
            s.tours = vec![
                Tour::from(TourRecord {
                    id: "1".into(),
                    title: "Văn Miếu".into(),
                    departure: "hanoi".into(),
                    ..Default::default()
                }),
                Tour::from(TourRecord {
                    id: "2".into(),
                    title: "Bà Nà".into(),
                    departure: "danang".into(),
                    ..Default::default()
                }),
            ]
        });

        assert_eq!(catalog.filtered_tours().len(), 2);
        catalog.set_filters(FilterCriteria {
            departure: Facet::is("danang"),
            ..Default::default()
        });
        let filtered = catalog.filtered_tours();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");
        assert_eq!(catalog.tour("1").map(|t| t.title), Some("Văn Miếu".to_string()));
        assert!(catalog.tour("9").is_none());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_empty_catalog_and_clears_loading() {
        let catalog = offline_catalog();
        catalog.fetch_tours().await;
        assert!(!catalog.is_loading());
        assert!(catalog.tours().is_empty());
        assert!(catalog.filtered_tours().is_empty());
    }
}
