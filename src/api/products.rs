use serde_json::Value;

use crate::api::ApiClient;
use crate::errors::ApiError;
use crate::filters::{ProductFilters, QueryParams};
use crate::models::{
    ApiResponse, ListMeta, Product, ProductDetail, ProductInput, ProductListResponse,
};

#[derive(Clone, Debug)]
pub struct ProductsApi {
    client: ApiClient,
}

impl ProductsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetches one page of products.
    ///
    /// Never fails: a transport error, a failed envelope or a missing payload
    /// all come back as an empty first page, so callers render "no products"
    /// instead of an error.
    pub async fn get_products(&self, filters: &ProductFilters) -> ProductListResponse {
        let params = filters.to_query_params();
        let page_size = filters.effective_page_size();

        let response = match self.client.get::<Value>("/products", &params).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch products");
                return ProductListResponse::empty(page_size);
            }
        };

        let (start, length) = window_of(&params, page_size);
        match normalize_product_list(response, start, length) {
            Ok(list) => list,
            Err(err) => {
                tracing::error!(error = %err, "Product list response unusable");
                ProductListResponse::empty(page_size)
            }
        }
    }

    pub async fn get_product_by_id(&self, id: i64) -> Result<ProductDetail, ApiError> {
        let product = self
            .client
            .get::<Product>(&format!("/products/{}", id), &QueryParams::new())
            .await?
            .into_data()?;
        ProductDetail::try_from(product)
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        self.client
            .post::<_, Product>("/products", input)
            .await?
            .into_data()
    }

    pub async fn update_product(&self, id: i64, input: &ProductInput) -> Result<Product, ApiError> {
        self.client
            .put::<_, Product>(&format!("/products/{}", id), input)
            .await?
            .into_data()
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        let response = self
            .client
            .delete::<Value>(&format!("/products/{}", id))
            .await?;
        if response.success {
            Ok(())
        } else {
            Err(ApiError::Unsuccessful(
                response
                    .message
                    .unwrap_or_else(|| format!("could not delete product {}", id)),
            ))
        }
    }
}

fn window_of(params: &QueryParams, page_size: u64) -> (u64, u64) {
    let start = params
        .get("start")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let length = params
        .get("length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(page_size);
    (start, length)
}

/// Turns a DataTables-style listing into `{data, meta}`. The total prefers
/// `recordsFiltered`, then `recordsTotal`, then zero.
pub fn normalize_product_list(
    response: ApiResponse<Value>,
    start: u64,
    length: u64,
) -> Result<ProductListResponse, ApiError> {
    let total = response
        .records_filtered
        .or(response.records_total)
        .unwrap_or(0);
    let data: Vec<Product> = response.into_list()?;

    Ok(ProductListResponse {
        data,
        meta: ListMeta::from_window(start, length, total),
    })
}
