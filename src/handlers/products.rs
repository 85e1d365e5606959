use actix_web::{HttpResponse, http::StatusCode, web};
use serde::Serialize;
use tera::Tera;

use crate::AppState;
use crate::errors::AppError;
use crate::filters::{FilterValue, ProductFilters};
use crate::handlers::{page_context, render, render_with_status};
use crate::models::{DetailQuery, PageQuery, SubCategory};
use crate::views::{
    ListingLinks, PRICE_RANGE_MAX, PRICE_RANGE_STEP, ProductCard, ProductDetailView, SORT_OPTIONS,
    ViewMode, has_active_filters, results_range, sort_value,
};

#[derive(Serialize)]
struct SortOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

#[derive(Serialize)]
struct PriceRange {
    min: f64,
    max: f64,
    step: f64,
    low: f64,
    high: f64,
}

fn category_id_of(filters: &ProductFilters) -> Option<i64> {
    match filters.category_id.as_ref().map(|f| f.value()) {
        Some(FilterValue::Number(id)) => Some(*id as i64),
        _ => None,
    }
}

pub async fn list_products(
    tmpl: web::Data<Tera>,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let filters = ProductFilters::from_page_query(&query);
    let view = ViewMode::parse(query.view.as_deref());
    let sheet_open = query.filters.as_deref() == Some("open");
    let active_category = category_id_of(&filters);

    let (mut context, list, sub_categories) = tokio::join!(
        page_context(&state, filters.search.as_deref(), active_category),
        state.products.get_products(&filters),
        sub_categories_of(&state, active_category),
    );

    let links = ListingLinks::new(&filters, view);
    let cards: Vec<ProductCard> = list.data.iter().map(ProductCard::from).collect();
    let (first, last) = results_range(&list.meta, cards.len());
    let selected_sort = sort_value(filters.sort_by, filters.sort_order);

    let sort_options: Vec<SortOption> = SORT_OPTIONS
        .iter()
        .map(|&(value, label)| SortOption {
            value,
            label,
            selected: value == selected_sort,
        })
        .collect();

    let price_range = PriceRange {
        min: 0.0,
        max: PRICE_RANGE_MAX,
        step: PRICE_RANGE_STEP,
        low: filters.min_price.unwrap_or(0.0),
        high: filters.max_price.unwrap_or(PRICE_RANGE_MAX),
    };

    context.insert("products", &cards);
    context.insert("meta", &list.meta);
    context.insert("results_first", &first);
    context.insert("results_last", &last);
    context.insert("pager", &links.pager(&list.meta));
    context.insert("view_mode", view.as_str());
    context.insert("grid_href", &links.view(ViewMode::Grid));
    context.insert("list_href", &links.view(ViewMode::List));
    context.insert("clear_href", &links.clear());
    context.insert("has_active_filters", &has_active_filters(&filters));
    context.insert("sort_options", &sort_options);
    context.insert("sort_hidden", &links.hidden_fields(&["sort_by", "sort_order"]));
    context.insert(
        "price_hidden",
        &links.hidden_fields(&["min_price", "max_price"]),
    );
    context.insert("price_range", &price_range);
    context.insert("filter_sheet_open", &sheet_open);
    context.insert("sub_categories", &sub_categories);
    context.insert("search_term", &filters.search);

    render(&tmpl, "products.html", &context)
}

async fn sub_categories_of(state: &AppState, category_id: Option<i64>) -> Vec<SubCategory> {
    let Some(category_id) = category_id else {
        return Vec::new();
    };

    match state.categories.get_sub_categories().await {
        Ok(all) => all
            .into_iter()
            .filter(|sub| sub.category_id == category_id)
            .collect(),
        Err(err) => {
            tracing::error!(error = %err, "Error fetching sub-categories");
            Vec::new()
        }
    }
}

pub async fn product_detail(
    tmpl: web::Data<Tera>,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<DetailQuery>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let (mut context, detail) = tokio::join!(
        page_context(&state, None, None),
        state.products.get_product_by_id(id),
    );

    let detail = match detail {
        Ok(detail) => detail,
        Err(err) => {
            tracing::warn!(product_id = id, error = %err, "Product detail unavailable");
            context.insert("missing", &format!("Product {}", id));
            return render_with_status(&tmpl, "not_found.html", &context, StatusCode::NOT_FOUND);
        }
    };

    let parse = |value: &Option<String>| value.as_deref().and_then(|v| v.trim().parse().ok());
    let view = ProductDetailView::new(
        &detail,
        parse(&query.image).map(|i: i64| i.max(0) as usize),
        parse(&query.qty),
        parse(&query.variant),
    );

    context.insert("product", &detail);
    context.insert("detail", &view);

    render(&tmpl, "product_detail.html", &context)
}
