//! Small key-value stores shared by the page templates: the header search
//! query and the category list the header renders.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::api::CategoriesApi;
use crate::models::Category;

pub const CATEGORIES_LOAD_ERROR: &str = "Failed to load categories";

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStore {
    pub query: String,
}

impl SearchStore {
    pub fn new(query: Option<&str>) -> Self {
        Self {
            query: query.unwrap_or_default().to_string(),
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear(&mut self) {
        self.query.clear();
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoriesStore {
    pub categories: Vec<Category>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl CategoriesStore {
    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.error = None;
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
        self.is_loading = false;
    }

    pub fn clear_categories(&mut self) {
        self.categories.clear();
        self.error = None;
    }
}

pub type SharedCategories = Arc<RwLock<CategoriesStore>>;

/// Holds `is_loading` for one header fetch. Dropping it before `finish`
/// (the request future was cancelled) releases the flag so the next page
/// fetches again.
struct LoadingFlag {
    store: SharedCategories,
    done: bool,
}

impl LoadingFlag {
    fn finish(mut self) {
        self.done = true;
    }
}

impl Drop for LoadingFlag {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        tracing::warn!("Header category load abandoned");
        if let Ok(mut store) = self.store.try_write() {
            store.set_loading(false);
        } else if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let store = Arc::clone(&self.store);
            handle.spawn(async move { store.write().await.set_loading(false) });
        }
    }
}

/// Returns the header's category state, fetching it first when the list is
/// empty and no other request is already loading it.
pub async fn load_header_categories(store: &SharedCategories, api: &CategoriesApi) -> CategoriesStore {
    {
        let mut guard = store.write().await;
        if !guard.categories.is_empty() || guard.is_loading {
            return guard.clone();
        }
        guard.set_loading(true);
    }
    let flag = LoadingFlag {
        store: Arc::clone(store),
        done: false,
    };

    let fetched = api.get_categories().await;

    let mut guard = store.write().await;
    match fetched {
        Ok(categories) => {
            tracing::debug!(count = categories.len(), "Header categories loaded");
            guard.set_categories(categories);
            guard.set_loading(false);
        }
        Err(err) => {
            tracing::error!(error = %err, "Error fetching categories");
            guard.set_error(Some(CATEGORIES_LOAD_ERROR.to_string()));
        }
    }
    flag.finish();

    guard.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: i64, name: &str) -> Category {
        Category {
            id,
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_categories_clears_error() {
        let mut store = CategoriesStore::default();
        store.set_error(Some(CATEGORIES_LOAD_ERROR.to_string()));
        store.set_categories(vec![category(1, "Fashion")]);

        assert_eq!(store.categories.len(), 1);
        assert!(store.error.is_none());
    }

    #[test]
    fn test_set_error_stops_loading() {
        let mut store = CategoriesStore::default();
        store.set_loading(true);
        store.set_error(Some("boom".to_string()));

        assert!(!store.is_loading);
        assert_eq!(store.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_clear_categories() {
        let mut store = CategoriesStore::default();
        store.set_categories(vec![category(1, "Fashion"), category(2, "Elektronik")]);
        store.error = Some("stale".into());
        store.clear_categories();

        assert!(store.categories.is_empty());
        assert!(store.error.is_none());
    }

    #[test]
    fn test_search_store() {
        let mut search = SearchStore::new(Some("sepatu"));
        assert_eq!(search.query, "sepatu");
        search.set_query("tas");
        assert_eq!(search.query, "tas");
        search.clear();
        assert!(search.query.is_empty());
    }

    #[tokio::test]
    async fn test_loaded_store_is_not_refetched() {
        let store: SharedCategories = Arc::new(RwLock::new(CategoriesStore {
            categories: vec![category(5, "Olahraga")],
            ..Default::default()
        }));
        // Nothing listens on this port; a fetch would fail and set an error.
        let api = CategoriesApi::new(crate::api::ApiClient::new("http://127.0.0.1:9").unwrap());

        let snapshot = load_header_categories(&store, &api).await;
        assert_eq!(snapshot.categories.len(), 1);
        assert!(snapshot.error.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_records_error() {
        let store: SharedCategories = Arc::default();
        let api = CategoriesApi::new(crate::api::ApiClient::new("http://127.0.0.1:9").unwrap());

        let snapshot = load_header_categories(&store, &api).await;
        assert!(snapshot.categories.is_empty());
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.error.as_deref(), Some(CATEGORIES_LOAD_ERROR));
    }
}
