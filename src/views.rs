//! View models handed to the Tera templates, plus the small presentational
//! rules (price formatting, badges, paging window, detail-page toggles).

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::filters::{FieldFilter, ProductFilters, SortField, SortOrder};
use crate::models::{ListMeta, Product, ProductDetail};

pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.png";
pub const PRICE_RANGE_MAX: f64 = 10_000_000.0;
pub const PRICE_RANGE_STEP: f64 = 100_000.0;
const MAX_PAGE_LINKS: u64 = 5;

pub const SORT_OPTIONS: [(&str, &str); 7] = [
    ("created_at-desc", "Newest"),
    ("created_at-asc", "Oldest"),
    ("price-asc", "Price: Low to High"),
    ("price-desc", "Price: High to Low"),
    ("rating-desc", "Highest Rated"),
    ("count_sold-desc", "Most Sold"),
    ("name-asc", "Name: A to Z"),
];

/// Rupiah in Indonesian notation: `Rp 1.500.000`, at most two decimals.
pub fn format_price(price: f64) -> String {
    let cents = (price.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let raw = whole.to_string();
    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if frac > 0 {
        grouped.push(',');
        grouped.push_str(format!("{:02}", frac).trim_end_matches('0'));
    }

    let sign = if price < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}Rp\u{a0}{}", sign, grouped)
}

/// Tera filter: `{{ product.price | idr }}`
pub fn idr_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let price = value
        .as_f64()
        .ok_or_else(|| tera::Error::msg(format!("idr filter expects a number, got {}", value)))?;
    Ok(Value::String(format_price(price)))
}

fn discount_label(discount_pct: Option<f64>) -> Option<String> {
    discount_pct.filter(|d| *d > 0.0).map(|d| d.to_string())
}

/// Backend image paths go through the local image proxy; absolute URLs are
/// used as they are.
pub fn resolve_image_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() {
        PLACEHOLDER_IMAGE.to_string()
    } else if url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//") {
        url.to_string()
    } else {
        format!("/images/{}", url.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: i64,
    pub href: String,
    pub name: String,
    pub subtitle: Option<String>,
    pub image: String,
    pub price: f64,
    /// Only set when it is above the selling price
    pub slashed_price: Option<f64>,
    /// Only set when positive, e.g. `"15"`
    pub discount_pct: Option<String>,
    pub is_featured: bool,
    pub rating: String,
    pub count_review: i64,
    pub count_sold: i64,
    pub shop_name: Option<String>,
    pub shop_official: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            href: format!("/products/{}", product.id),
            name: product.name.clone(),
            subtitle: product.subtitle.clone().filter(|s| !s.is_empty()),
            image: resolve_image_url(&product.image_url),
            price: product.price,
            slashed_price: product.slashed_price.filter(|s| *s > product.price),
            discount_pct: discount_label(product.discount_pct),
            is_featured: product.is_featured,
            rating: format!("{:.1}", product.rating),
            count_review: product.count_review,
            count_sold: product.count_sold,
            shop_name: product.shop.as_ref().map(|shop| shop.name.clone()),
            shop_official: product.shop.as_ref().is_some_and(|shop| shop.is_official),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("list") => ViewMode::List,
            _ => ViewMode::Grid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

/// The page numbers shown in the pager: at most five, sliding with the
/// current page and pinned at either end.
pub fn pagination_window(meta: &ListMeta) -> Vec<u64> {
    let count = meta.total_page.min(MAX_PAGE_LINKS);
    (0..count)
        .map(|i| {
            if meta.total_page <= MAX_PAGE_LINKS || meta.page <= 3 {
                i + 1
            } else if meta.page >= meta.total_page - 2 {
                meta.total_page - 4 + i
            } else {
                meta.page - 2 + i
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct PageLink {
    pub number: u64,
    pub href: String,
    pub current: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    pub visible: bool,
    pub pages: Vec<PageLink>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Builds `/products` URLs that carry the current filters.
#[derive(Debug, Clone)]
pub struct ListingLinks<'a> {
    filters: &'a ProductFilters,
    view: ViewMode,
}

impl<'a> ListingLinks<'a> {
    pub fn new(filters: &'a ProductFilters, view: ViewMode) -> Self {
        Self { filters, view }
    }

    /// Query fields the listing round-trips, in URL order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let filters = self.filters;
        let mut fields = Vec::new();

        if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
            fields.push(("search", search.to_string()));
        }
        if let Some(id) = filters.category_id.as_ref().map(FieldFilter::value) {
            fields.push(("category_id", id.to_string()));
        }
        if let Some(id) = filters.sub_category_id.as_ref().map(FieldFilter::value) {
            fields.push(("sub_category_id", id.to_string()));
        }
        if let Some(min) = filters.min_price {
            fields.push(("min_price", min.to_string()));
        }
        if let Some(max) = filters.max_price {
            fields.push(("max_price", max.to_string()));
        }
        if let Some(sort_by) = filters.sort_by {
            fields.push(("sort_by", sort_by.as_str().to_string()));
        }
        if let Some(order) = filters.sort_order {
            fields.push(("sort_order", order.as_str().to_string()));
        }
        if let Some(page) = filters.page {
            fields.push(("page", page.to_string()));
        }
        if let Some(size) = filters.page_size {
            fields.push(("page_size", size.to_string()));
        }
        if self.view == ViewMode::List {
            fields.push(("view", self.view.as_str().to_string()));
        }

        fields
    }

    /// Fields for a form that supplies some of them itself. The page is
    /// always dropped so a submitted form starts from page one.
    pub fn hidden_fields(&self, except: &[&str]) -> Vec<(&'static str, String)> {
        self.fields()
            .into_iter()
            .filter(|(name, _)| *name != "page" && !except.contains(name))
            .collect()
    }

    pub fn href(&self) -> String {
        to_href("/products", &self.fields())
    }

    pub fn page(&self, page: u64) -> String {
        let filters = ProductFilters {
            page: Some(page),
            ..self.filters.clone()
        };
        ListingLinks::new(&filters, self.view).href()
    }

    pub fn view(&self, view: ViewMode) -> String {
        ListingLinks::new(self.filters, view).href()
    }

    /// Drops every filter except the page size (and the view mode).
    pub fn clear(&self) -> String {
        let filters = ProductFilters {
            page: Some(1),
            page_size: self.filters.page_size,
            ..Default::default()
        };
        ListingLinks::new(&filters, self.view).href()
    }

    pub fn pager(&self, meta: &ListMeta) -> Pager {
        let pages = pagination_window(meta)
            .into_iter()
            .map(|number| PageLink {
                number,
                href: self.page(number),
                current: number == meta.page,
            })
            .collect();

        Pager {
            visible: meta.total_page > 1,
            pages,
            prev: (meta.page > 1).then(|| self.page(meta.page - 1)),
            next: (meta.page < meta.total_page).then(|| self.page(meta.page.saturating_add(1))),
        }
    }
}

fn to_href(path: &str, fields: &[(&str, String)]) -> String {
    if fields.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect();
    format!("{}?{}", path, query.join("&"))
}

pub fn category_href(category_id: i64) -> String {
    format!("/products?category_id={}&page=1", category_id)
}

/// Value of the sort select, e.g. `price-asc`.
pub fn sort_value(sort_by: Option<SortField>, sort_order: Option<SortOrder>) -> String {
    format!(
        "{}-{}",
        sort_by.unwrap_or(SortField::CreatedAt).as_str(),
        sort_order.unwrap_or(SortOrder::Desc).as_str()
    )
}

/// "Showing 21 - 40 of 95 products"
pub fn results_range(meta: &ListMeta, shown: usize) -> (u64, u64) {
    if shown == 0 {
        return (0, 0);
    }
    let offset = meta.page.saturating_sub(1).saturating_mul(meta.page_size);
    let last = meta.page.saturating_mul(meta.page_size).min(meta.total);
    (offset.saturating_add(1).min(last), last)
}

pub fn has_active_filters(filters: &ProductFilters) -> bool {
    filters.search.as_deref().is_some_and(|s| !s.is_empty())
        || filters.min_price.is_some_and(|p| p != 0.0)
        || filters.max_price.is_some_and(|p| p != 0.0)
        || filters.category_id.is_some()
        || filters.sub_category_id.is_some()
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantOption {
    pub id: i64,
    pub name: String,
    pub href: String,
    pub selected: bool,
    pub disabled: bool,
    /// Difference to the base price, e.g. `+Rp 5.000`
    pub price_delta: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageThumb {
    pub index: usize,
    pub src: String,
    pub href: String,
    pub selected: bool,
}

/// Interactive state of the product detail page, driven by the `image`,
/// `qty` and `variant` query parameters.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetailView {
    pub images: Vec<ImageThumb>,
    pub selected_image: usize,
    pub main_image: String,
    pub prev_image_href: Option<String>,
    pub next_image_href: Option<String>,
    pub quantity: i64,
    pub decrease_href: Option<String>,
    pub increase_href: Option<String>,
    pub selected_variant: Option<i64>,
    pub variants: Vec<VariantOption>,
    pub current_price: f64,
    pub slashed_price: Option<f64>,
    pub discount_pct: Option<String>,
    pub rating: String,
}

#[derive(Debug, Clone, Copy)]
struct DetailState {
    image: usize,
    quantity: i64,
    variant: Option<i64>,
}

impl ProductDetailView {
    pub fn new(
        detail: &ProductDetail,
        image: Option<usize>,
        quantity: Option<i64>,
        variant: Option<i64>,
    ) -> Self {
        let product = &detail.product;

        let mut sources: Vec<String> = std::iter::once(product.image_url.as_str())
            .chain(product.images.iter().map(|img| img.image_url.as_str()))
            .filter(|url| !url.trim().is_empty())
            .map(resolve_image_url)
            .collect();
        if sources.is_empty() {
            sources.push(PLACEHOLDER_IMAGE.to_string());
        }

        let selected_image = image.filter(|i| *i < sources.len()).unwrap_or(0);
        let max_quantity = product.stock.max(1);
        let quantity = quantity.unwrap_or(1).clamp(1, max_quantity);

        let selected_variant = variant
            .filter(|id| product.variants.iter().any(|v| v.id == *id))
            .or_else(|| product.variants.first().map(|v| v.id));

        let state = DetailState {
            image: selected_image,
            quantity,
            variant: selected_variant,
        };
        let href = |next: DetailState| detail_href(product.id, next);

        let current_price = selected_variant
            .and_then(|id| product.variants.iter().find(|v| v.id == id))
            .and_then(|v| v.price)
            .filter(|p| *p != 0.0)
            .unwrap_or(product.price);

        let count = sources.len();
        let images = sources
            .iter()
            .enumerate()
            .map(|(index, src)| ImageThumb {
                index,
                src: src.clone(),
                href: href(DetailState { image: index, ..state }),
                selected: index == selected_image,
            })
            .collect();

        let variants = product
            .variants
            .iter()
            .map(|v| VariantOption {
                id: v.id,
                name: v.name.clone(),
                href: href(DetailState {
                    variant: Some(v.id),
                    ..state
                }),
                selected: selected_variant == Some(v.id),
                disabled: !v.is_available || v.stock == 0,
                price_delta: v
                    .price
                    .filter(|p| *p != 0.0 && *p != product.price)
                    .map(|p| {
                        let delta = p - product.price;
                        if delta > 0.0 {
                            format!("+{}", format_price(delta))
                        } else {
                            format_price(delta)
                        }
                    }),
            })
            .collect();

        Self {
            main_image: sources[selected_image].clone(),
            images,
            selected_image,
            prev_image_href: (count > 1).then(|| {
                let prev = if selected_image == 0 {
                    count - 1
                } else {
                    selected_image - 1
                };
                href(DetailState { image: prev, ..state })
            }),
            next_image_href: (count > 1).then(|| {
                href(DetailState {
                    image: (selected_image + 1) % count,
                    ..state
                })
            }),
            quantity,
            decrease_href: (quantity > 1).then(|| {
                href(DetailState {
                    quantity: quantity - 1,
                    ..state
                })
            }),
            increase_href: (quantity < product.stock).then(|| {
                href(DetailState {
                    quantity: quantity + 1,
                    ..state
                })
            }),
            selected_variant,
            variants,
            current_price,
            slashed_price: product.slashed_price.filter(|s| *s > product.price),
            discount_pct: discount_label(product.discount_pct),
            rating: format!("{:.1}", product.rating),
        }
    }
}

fn detail_href(product_id: i64, state: DetailState) -> String {
    let mut fields = vec![
        ("image", state.image.to_string()),
        ("qty", state.quantity.to_string()),
    ];
    if let Some(variant) = state.variant {
        fields.push(("variant", variant.to_string()));
    }
    to_href(&format!("/products/{}", product_id), &fields)
}
