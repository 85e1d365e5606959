use serde_json::Value;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::filters::QueryParams;
use crate::models::{Category, SubCategory};

/// Reference data is small; one window of this size covers it.
const REFERENCE_PAGE_LENGTH: u64 = 100;

#[derive(Clone, Debug)]
pub struct CategoriesApi {
    client: ApiClient,
}

impl CategoriesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch_list("/categories").await
    }

    /// Categories with their `sub_categories` populated.
    pub async fn get_categories_with_sub_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.fetch_list("/categories/sub-categories").await
    }

    pub async fn get_sub_categories(&self) -> Result<Vec<SubCategory>, ApiError> {
        self.fetch_list("/sub-categories").await
    }

    async fn fetch_list<T>(&self, path: &str) -> Result<Vec<T>, ApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let mut params = QueryParams::new();
        params.set("length", REFERENCE_PAGE_LENGTH);
        params.set("start", 0);

        self.client.get::<Value>(path, &params).await?.into_list()
    }
}
