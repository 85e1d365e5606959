//! Route loaders: fetch what a page needs, then render its template.

pub mod categories;
pub mod home;
pub mod images;
pub mod products;

use actix_web::{HttpResponse, http::StatusCode};
use tera::{Context, Tera};

use crate::AppState;
use crate::errors::AppError;
use crate::state::{SearchStore, load_header_categories};

pub fn render(tmpl: &Tera, name: &str, context: &Context) -> Result<HttpResponse, AppError> {
    render_with_status(tmpl, name, context, StatusCode::OK)
}

pub fn render_with_status(
    tmpl: &Tera,
    name: &str,
    context: &Context,
    status: StatusCode,
) -> Result<HttpResponse, AppError> {
    let html = tmpl.render(name, context)?;
    Ok(HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// Context every page starts from: the header's categories and search box.
pub async fn page_context(
    state: &AppState,
    search: Option<&str>,
    active_category: Option<i64>,
) -> Context {
    let header = load_header_categories(&state.header, &state.categories).await;

    let mut context = Context::new();
    context.insert("header", &header);
    context.insert("search", &SearchStore::new(search));
    context.insert("active_category", &active_category);
    context
}

pub async fn health() -> &'static str {
    "OK"
}
