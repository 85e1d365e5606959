use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;

/// Envelope every backend endpoint answers with. List endpoints follow the
/// DataTables convention and add `recordsTotal` / `recordsFiltered`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub records_total: Option<u64>,
    #[serde(default)]
    pub records_filtered: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// Payload of a successful response, or the reason there is none.
    pub fn into_data(self) -> Result<T, ApiError> {
        if !self.success {
            return Err(ApiError::Unsuccessful(
                self.message.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        self.data.ok_or(ApiError::EmptyPayload)
    }
}

impl ApiResponse<Value> {
    /// Decodes an array payload. Anything that is not an array counts as an
    /// empty list.
    pub fn into_list<T>(self) -> Result<Vec<T>, ApiError>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.into_data()? {
            Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
            _ => Ok(Vec::new()),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: String,
    pub price: f64,
    #[serde(default)]
    pub slashed_price: Option<f64>,
    #[serde(default)]
    pub discount_pct: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub count_review: i64,
    #[serde(default)]
    pub count_sold: i64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub sub_category_id: Option<i64>,
    #[serde(default)]
    pub shop_id: i64,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,

    // relations, present only when the backend preloads them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<SubCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop: Option<Shop>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub labels: Vec<ProductLabel>,
    #[serde(default)]
    pub badges: Vec<ProductBadge>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
}

/// A product whose category and shop are guaranteed to be loaded.
#[derive(Serialize, Debug, Clone)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
    pub shop: Shop,
}

impl TryFrom<Product> for ProductDetail {
    type Error = ApiError;

    fn try_from(mut product: Product) -> Result<Self, Self::Error> {
        let category = product
            .category
            .take()
            .ok_or(ApiError::MissingRelation("category"))?;
        let shop = product.shop.take().ok_or(ApiError::MissingRelation("shop"))?;
        Ok(Self {
            product,
            category,
            shop,
        })
    }
}

/// Body of a product create/update call. Unset fields are left out so an
/// update only touches what it names.
#[derive(Serialize, Debug, Clone, Default)]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slashed_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<i64>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub image_url: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    pub is_main: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProductLabel {
    pub id: i64,
    pub product_id: i64,
    pub title: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProductBadge {
    pub id: i64,
    pub product_id: i64,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ProductVariant {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub sku: Option<String>,
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_available: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SubCategory {
    pub id: i64,
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct Shop {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub reputation: Option<String>,
    #[serde(default)]
    pub is_official: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub description: Option<String>,
}

/// Pagination block of a product listing, derived from the backend's
/// `start`/`length` window and record counters on every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_page: u64,
}

impl ListMeta {
    /// Rebuilds one-based paging from the zero-based window that was sent.
    /// A zero `length` is read as the default page size.
    pub fn from_window(start: u64, length: u64, total: u64) -> Self {
        let length = if length == 0 {
            crate::filters::DEFAULT_PAGE_SIZE
        } else {
            length
        };
        Self {
            page: (start / length).saturating_add(1),
            page_size: length,
            total,
            total_page: total.div_ceil(length),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
    pub meta: ListMeta,
}

impl ProductListResponse {
    pub fn empty(page_size: u64) -> Self {
        Self {
            data: Vec::new(),
            meta: ListMeta {
                page: 1,
                page_size,
                total: 0,
                total_page: 0,
            },
        }
    }
}

/// Query string of the `/products` page. Everything arrives as text so a bad
/// number drops that one filter instead of rejecting the request.
#[derive(Deserialize, Debug, Default)]
pub struct PageQuery {
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub sub_category_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    /// Combined `field-order` value posted by the sort select
    pub sort: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub view: Option<String>,
    pub filters: Option<String>,
}

/// Query string of the product detail page.
#[derive(Deserialize, Debug, Default)]
pub struct DetailQuery {
    pub image: Option<String>,
    pub qty: Option<String>,
    pub variant: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_counters_are_camel_case() {
        let resp: ApiResponse<Value> = serde_json::from_value(json!({
            "success": true,
            "data": [],
            "recordsTotal": 120,
            "recordsFiltered": 42
        }))
        .unwrap();

        assert_eq!(resp.records_total, Some(120));
        assert_eq!(resp.records_filtered, Some(42));
    }

    #[test]
    fn test_meta_from_window() {
        let meta = ListMeta::from_window(40, 20, 95);
        assert_eq!(meta.page, 3);
        assert_eq!(meta.page_size, 20);
        assert_eq!(meta.total, 95);
        assert_eq!(meta.total_page, 5);

        assert_eq!(ListMeta::from_window(0, 20, 0).total_page, 0);
        assert_eq!(ListMeta::from_window(0, 0, 21).page_size, 20);
    }

    #[test]
    fn test_non_array_payload_is_empty_list() {
        let resp: ApiResponse<Value> =
            serde_json::from_value(json!({"success": true, "data": {"id": 1}})).unwrap();
        let list: Vec<Category> = resp.into_list().unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn test_unsuccessful_envelope() {
        let resp: ApiResponse<Value> =
            serde_json::from_value(json!({"success": false, "message": "boom"})).unwrap();
        let err = resp.into_data().unwrap_err();
        assert!(matches!(err, ApiError::Unsuccessful(msg) if msg == "boom"));
    }

    #[test]
    fn test_detail_requires_category_and_shop() {
        let product: Product = serde_json::from_value(json!({
            "id": 3,
            "name": "Kopi Gayo",
            "price": 85000.0,
            "shop": {"id": 1, "name": "Toko Kopi"}
        }))
        .unwrap();

        let err = ProductDetail::try_from(product).unwrap_err();
        assert!(matches!(err, ApiError::MissingRelation("category")));
    }

    #[test]
    fn test_detail_serializes_flat() {
        let product = Product {
            id: 9,
            name: "Teh Hijau".into(),
            price: 25000.0,
            category: Some(Category {
                id: 2,
                name: "Minuman".into(),
                ..Default::default()
            }),
            shop: Some(Shop {
                id: 4,
                name: "Warung".into(),
                ..Default::default()
            }),
            ..Default::default()
        };

        let detail = ProductDetail::try_from(product).unwrap();
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["name"], "Teh Hijau");
        assert_eq!(value["category"]["name"], "Minuman");
        assert_eq!(value["shop"]["name"], "Warung");
    }
}
