//! Product filter DSL and its translation to the backend's bracketed query
//! syntax (`field[op]=value`, `sort=-field`, `start`/`length` paging).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::PageQuery;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
    In,
    Between,
    IsNull,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Ne => "ne",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::In => "in",
            FilterOperator::Between => "between",
            FilterOperator::IsNull => "is_null",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<FilterValue>),
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterValue::Text(text) => f.write_str(text),
            FilterValue::Number(n) => write!(f, "{}", n),
            FilterValue::Bool(b) => write!(f, "{}", b),
            FilterValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Number(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Number(value as f64)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(values: Vec<T>) -> Self {
        FilterValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// A single field condition: either a bare value (operator implied by its
/// type) or an explicit operator/value pair.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldFilter {
    Value(FilterValue),
    WithOperator {
        operator: FilterOperator,
        value: FilterValue,
    },
}

impl FieldFilter {
    pub fn op(operator: FilterOperator, value: impl Into<FilterValue>) -> Self {
        FieldFilter::WithOperator {
            operator,
            value: value.into(),
        }
    }

    /// The bare value, regardless of operator. Used to echo a filter back
    /// into a page URL.
    pub fn value(&self) -> &FilterValue {
        match self {
            FieldFilter::Value(value) => value,
            FieldFilter::WithOperator { value, .. } => value,
        }
    }
}

macro_rules! field_filter_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldFilter {
                fn from(value: $ty) -> Self {
                    FieldFilter::Value(value.into())
                }
            }
        )*
    };
}

field_filter_from!(&str, String, f64, i64, bool);

impl<T: Into<FilterValue>> From<Vec<T>> for FieldFilter {
    fn from(values: Vec<T>) -> Self {
        FieldFilter::Value(values.into())
    }
}

/// Ordered query parameters. Setting a key that is already present replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    entries: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.entries
    }
}

/// Writes the query parameters for one field condition.
///
/// Text values default to `contains`, numbers and booleans to `eq`.
/// `between` expands to a `gte`/`lte` pair and `in` joins its list with
/// commas. Any other operator is written as `field[operator]=value`.
pub fn add_filter_param(params: &mut QueryParams, field: &str, filter: Option<&FieldFilter>) {
    let Some(filter) = filter else {
        return;
    };

    match filter {
        FieldFilter::WithOperator {
            operator: FilterOperator::Between,
            value: FilterValue::List(bounds),
        } => {
            if let Some(lo) = bounds.first() {
                params.set(format!("{}[gte]", field), lo);
            }
            if let Some(hi) = bounds.get(1) {
                params.set(format!("{}[lte]", field), hi);
            }
        }
        FieldFilter::WithOperator {
            operator: FilterOperator::In,
            value: FilterValue::List(items),
        } => {
            params.set(format!("{}[in]", field), FilterValue::List(items.clone()));
        }
        FieldFilter::WithOperator { operator, value } => {
            params.set(format!("{}[{}]", field, operator.as_str()), value);
        }
        FieldFilter::Value(value) => {
            let operator = match value {
                FilterValue::Text(_) => FilterOperator::Contains,
                _ => FilterOperator::Eq,
            };
            params.set(format!("{}[{}]", field, operator.as_str()), value);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    Price,
    Rating,
    CountSold,
    Name,
    Stock,
    Status,
    Id,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Price => "price",
            SortField::Rating => "rating",
            SortField::CountSold => "count_sold",
            SortField::Name => "name",
            SortField::Stock => "stock",
            SortField::Status => "status",
            SortField::Id => "id",
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(SortField::CreatedAt),
            "price" => Ok(SortField::Price),
            "rating" => Ok(SortField::Rating),
            "count_sold" => Ok(SortField::CountSold),
            "name" => Ok(SortField::Name),
            "stock" => Ok(SortField::Stock),
            "status" => Ok(SortField::Status),
            "id" => Ok(SortField::Id),
            other => Err(format!("unknown sort field `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order `{}`", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    /// Free-text search, sent as `name[contains]`
    pub search: Option<String>,

    pub name: Option<FieldFilter>,
    pub sku: Option<FieldFilter>,
    pub description: Option<FieldFilter>,
    pub category_id: Option<FieldFilter>,
    pub sub_category_id: Option<FieldFilter>,
    pub shop_id: Option<FieldFilter>,
    pub price: Option<FieldFilter>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub stock: Option<FieldFilter>,
    pub status: Option<FieldFilter>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub discount_pct: Option<FieldFilter>,
    pub rating: Option<FieldFilter>,

    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,

    /// One-based
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl ProductFilters {
    /// Builds the filters of the `/products` page from its query string.
    /// Values that do not parse are dropped.
    pub fn from_page_query(query: &PageQuery) -> Self {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        // a zero bound is the slider's resting position, not a filter
        fn price_bound(value: &Option<String>) -> Option<f64> {
            non_empty(value)
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|p| p.is_finite() && *p != 0.0)
        }

        let (sort_by, sort_order) = match non_empty(&query.sort).and_then(|v| v.split_once('-')) {
            Some((field, order)) => (field.parse().ok(), order.parse().ok()),
            None => (
                non_empty(&query.sort_by).and_then(|v| v.parse().ok()),
                non_empty(&query.sort_order).and_then(|v| v.parse().ok()),
            ),
        };

        Self {
            search: non_empty(&query.search).map(str::to_string),
            category_id: non_empty(&query.category_id)
                .and_then(|v| v.parse::<i64>().ok())
                .map(FieldFilter::from),
            sub_category_id: non_empty(&query.sub_category_id)
                .and_then(|v| v.parse::<i64>().ok())
                .map(FieldFilter::from),
            min_price: price_bound(&query.min_price),
            max_price: price_bound(&query.max_price),
            sort_by,
            sort_order,
            page: Some(
                non_empty(&query.page)
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1),
            ),
            page_size: Some(
                non_empty(&query.page_size)
                    .and_then(|v| v.parse::<u64>().ok())
                    .filter(|size| *size > 0)
                    .map_or(DEFAULT_PAGE_SIZE, |size| size.min(MAX_PAGE_SIZE)),
            ),
            ..Default::default()
        }
    }

    pub fn effective_page_size(&self) -> u64 {
        match self.page_size {
            Some(size) if size > 0 => size,
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn to_query_params(&self) -> QueryParams {
        let mut params = QueryParams::new();

        let (start, length) = page_window(self.page.unwrap_or(1), self.effective_page_size());
        params.set("start", start);
        params.set("length", length);

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            params.set("name[contains]", search);
        }

        add_filter_param(&mut params, "name", self.name.as_ref());
        add_filter_param(&mut params, "sku", self.sku.as_ref());
        add_filter_param(&mut params, "description", self.description.as_ref());
        add_filter_param(&mut params, "category_id", self.category_id.as_ref());
        add_filter_param(&mut params, "sub_category_id", self.sub_category_id.as_ref());
        add_filter_param(&mut params, "shop_id", self.shop_id.as_ref());
        add_filter_param(&mut params, "price", self.price.as_ref());
        add_filter_param(&mut params, "stock", self.stock.as_ref());
        add_filter_param(&mut params, "status", self.status.as_ref());
        add_filter_param(&mut params, "discount_pct", self.discount_pct.as_ref());
        add_filter_param(&mut params, "rating", self.rating.as_ref());

        if let Some(min) = self.min_price {
            params.set("price[gte]", FilterValue::Number(min));
        }
        if let Some(max) = self.max_price {
            params.set("price[lte]", FilterValue::Number(max));
        }

        if let Some(active) = self.is_active {
            params.set("is_active[eq]", active);
        }
        if let Some(featured) = self.is_featured {
            params.set("is_featured[eq]", featured);
        }

        if let Some(sort_by) = self.sort_by {
            let prefix = match self.sort_order {
                Some(SortOrder::Asc) => "",
                _ => "-",
            };
            params.set("sort", format!("{}{}", prefix, sort_by.as_str()));
        }

        params
    }
}

/// One-based page and page size to the backend's zero-based
/// `(start, length)` window. A zero page counts as the first page; pages
/// too far out for `u64` clamp to the last representable offset.
pub fn page_window(page: u64, page_size: u64) -> (u64, u64) {
    let page = page.max(1);
    ((page - 1).saturating_mul(page_size), page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_for(field: &str, filter: FieldFilter) -> QueryParams {
        let mut params = QueryParams::new();
        add_filter_param(&mut params, field, Some(&filter));
        params
    }

    #[test]
    fn test_missing_value_emits_nothing() {
        let mut params = QueryParams::new();
        add_filter_param(&mut params, "price", None);
        assert!(params.is_empty());
    }

    #[test]
    fn test_scalar_number_and_bool_use_eq() {
        let params = params_for("stock", 5i64.into());
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("stock[eq]"), Some("5"));

        let params = params_for("is_active", true.into());
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("is_active[eq]"), Some("true"));

        let params = params_for("rating", 4.5.into());
        assert_eq!(params.get("rating[eq]"), Some("4.5"));
    }

    #[test]
    fn test_scalar_text_uses_contains() {
        let params = params_for("name", "kopi".into());
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("name[contains]"), Some("kopi"));
    }

    #[test]
    fn test_between_expands_to_gte_and_lte() {
        let params = params_for(
            "price",
            FieldFilter::op(FilterOperator::Between, vec![10_000i64, 50_000]),
        );

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("price[gte]"), Some("10000"));
        assert_eq!(params.get("price[lte]"), Some("50000"));
        assert!(!params.contains_key("price[between]"));
    }

    #[test]
    fn test_in_joins_with_commas() {
        let params = params_for(
            "category_id",
            FieldFilter::op(FilterOperator::In, vec![1i64, 2, 3]),
        );
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("category_id[in]"), Some("1,2,3"));
    }

    #[test]
    fn test_explicit_operator_is_used_verbatim() {
        let params = params_for("sku", FieldFilter::op(FilterOperator::StartsWith, "SKU-"));
        assert_eq!(params.get("sku[starts_with]"), Some("SKU-"));

        let params = params_for("discount_pct", FieldFilter::op(FilterOperator::Gt, 10i64));
        assert_eq!(params.get("discount_pct[gt]"), Some("10"));

        let params = params_for("description", FieldFilter::op(FilterOperator::IsNull, true));
        assert_eq!(params.get("description[is_null]"), Some("true"));
    }

    #[test]
    fn test_between_without_list_falls_through() {
        let params = params_for("price", FieldFilter::op(FilterOperator::Between, 7i64));
        assert_eq!(params.get("price[between]"), Some("7"));
    }

    #[test]
    fn test_later_writes_replace_earlier() {
        let filters = ProductFilters {
            price: Some(FieldFilter::op(
                FilterOperator::Between,
                vec![1_000i64, 2_000],
            )),
            min_price: Some(1_500.0),
            ..Default::default()
        };

        let params = filters.to_query_params();
        assert_eq!(params.get("price[gte]"), Some("1500"));
        assert_eq!(params.get("price[lte]"), Some("2000"));
    }

    #[test]
    fn test_page_window() {
        assert_eq!(page_window(3, 20), (40, 20));
        assert_eq!(page_window(1, 20), (0, 20));
        assert_eq!(page_window(0, 10), (0, 10));
        assert_eq!(page_window(u64::MAX, 20), (u64::MAX, 20));
    }

    #[test]
    fn test_from_page_query_bounds_paging() {
        let query = PageQuery {
            page: Some("1000000000000000000".into()),
            page_size: Some("5000".into()),
            ..Default::default()
        };

        let filters = ProductFilters::from_page_query(&query);
        assert_eq!(filters.page_size, Some(MAX_PAGE_SIZE));

        let params = filters.to_query_params();
        assert_eq!(params.get("start"), Some(u64::MAX.to_string().as_str()));
        assert_eq!(params.get("length"), Some("100"));

        let zero = PageQuery {
            page_size: Some("0".into()),
            ..Default::default()
        };
        assert_eq!(
            ProductFilters::from_page_query(&zero).page_size,
            Some(DEFAULT_PAGE_SIZE)
        );
    }

    #[test]
    fn test_from_page_query_ignores_unusable_prices() {
        for (min, max) in [("NaN", "inf"), ("0", "-inf"), ("0.0", "infinity")] {
            let query = PageQuery {
                min_price: Some(min.into()),
                max_price: Some(max.into()),
                ..Default::default()
            };
            let filters = ProductFilters::from_page_query(&query);
            assert_eq!(filters.min_price, None, "{}", min);
            assert_eq!(filters.max_price, None, "{}", max);

            let params = filters.to_query_params();
            assert!(!params.contains_key("price[gte]"));
            assert!(!params.contains_key("price[lte]"));
        }
    }

    #[test]
    fn test_full_query_params() {
        let filters = ProductFilters {
            search: Some("teh".into()),
            category_id: Some(4i64.into()),
            is_featured: Some(true),
            max_price: Some(250_000.0),
            sort_by: Some(SortField::Price),
            sort_order: Some(SortOrder::Asc),
            page: Some(2),
            page_size: Some(12),
            ..Default::default()
        };

        let params = filters.to_query_params();
        assert_eq!(params.get("start"), Some("12"));
        assert_eq!(params.get("length"), Some("12"));
        assert_eq!(params.get("name[contains]"), Some("teh"));
        assert_eq!(params.get("category_id[eq]"), Some("4"));
        assert_eq!(params.get("price[lte]"), Some("250000"));
        assert_eq!(params.get("is_featured[eq]"), Some("true"));
        assert_eq!(params.get("sort"), Some("price"));
    }

    #[test]
    fn test_sort_defaults_to_descending() {
        let filters = ProductFilters {
            sort_by: Some(SortField::CreatedAt),
            ..Default::default()
        };
        assert_eq!(filters.to_query_params().get("sort"), Some("-created_at"));
    }

    #[test]
    fn test_from_page_query_drops_bad_numbers() {
        let query = PageQuery {
            search: Some("  ".into()),
            category_id: Some("abc".into()),
            sub_category_id: Some("7".into()),
            min_price: Some("1000".into()),
            sort_by: Some("bogus".into()),
            sort_order: Some("asc".into()),
            page: Some("x".into()),
            ..Default::default()
        };

        let filters = ProductFilters::from_page_query(&query);
        assert_eq!(filters.search, None);
        assert_eq!(filters.category_id, None);
        assert_eq!(filters.sub_category_id, Some(FieldFilter::from(7i64)));
        assert_eq!(filters.min_price, Some(1000.0));
        assert_eq!(filters.sort_by, None);
        assert_eq!(filters.sort_order, Some(SortOrder::Asc));
        assert_eq!(filters.page, Some(1));
        assert_eq!(filters.page_size, Some(DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_combined_sort_value() {
        let query = PageQuery {
            sort: Some("count_sold-desc".into()),
            sort_by: Some("name".into()),
            ..Default::default()
        };

        let filters = ProductFilters::from_page_query(&query);
        assert_eq!(filters.sort_by, Some(SortField::CountSold));
        assert_eq!(filters.sort_order, Some(SortOrder::Desc));
    }
}
