use actix_web::{HttpResponse, web};
use tera::Tera;

use crate::AppState;
use crate::errors::AppError;
use crate::filters::{ProductFilters, SortField, SortOrder};
use crate::handlers::{page_context, render};
use crate::views::ProductCard;

const SECTION_SIZE: u64 = 12;

pub async fn home(tmpl: web::Data<Tera>, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let featured_filters = ProductFilters {
        is_featured: Some(true),
        page_size: Some(SECTION_SIZE),
        ..Default::default()
    };
    let newest_filters = ProductFilters {
        sort_by: Some(SortField::CreatedAt),
        sort_order: Some(SortOrder::Desc),
        page_size: Some(SECTION_SIZE),
        ..Default::default()
    };

    let (mut context, featured, newest) = tokio::join!(
        page_context(&state, None, None),
        state.products.get_products(&featured_filters),
        state.products.get_products(&newest_filters),
    );

    let featured: Vec<ProductCard> = featured.data.iter().map(ProductCard::from).collect();
    let newest: Vec<ProductCard> = newest.data.iter().map(ProductCard::from).collect();

    context.insert("featured", &featured);
    context.insert("newest", &newest);

    render(&tmpl, "home.html", &context)
}
