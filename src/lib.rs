//! Server-rendered storefront over the catalog REST API: home page, category
//! directory, filterable product listing and product detail pages.

pub mod api;
pub mod config;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod state;
pub mod views;

use std::sync::Arc;

use actix_web::web;
use anyhow::Context as _;
use tera::Tera;

use api::{ApiClient, CategoriesApi, ProductsApi};
use config::Config;
use handlers::images::ImageProxy;
use state::SharedCategories;

/// Shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub products: ProductsApi,
    pub categories: CategoriesApi,
    pub header: SharedCategories,
    pub images: ImageProxy,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = ApiClient::new(config.api_base_url.clone())
            .context("failed to build catalog API client")?;
        Ok(Self {
            products: ProductsApi::new(client.clone()),
            categories: CategoriesApi::new(client),
            header: Arc::default(),
            images: ImageProxy::new(config.asset_base_url.clone())
                .context("failed to build image proxy")?,
        })
    }
}

pub fn load_templates(glob: &str) -> anyhow::Result<Tera> {
    let mut tera = Tera::new(glob).with_context(|| format!("failed to load templates from {}", glob))?;
    tera.register_filter("idr", views::idr_filter);
    Ok(tera)
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::home::home))
        .route("/health", web::get().to(handlers::health))
        .route("/products", web::get().to(handlers::products::list_products))
        .route("/products/{id}", web::get().to(handlers::products::product_detail))
        .route("/categories", web::get().to(handlers::categories::list_categories))
        .route(
            "/categories/{id}",
            web::get().to(handlers::categories::category_redirect),
        )
        .route(
            "/images/placeholder.png",
            web::get().to(handlers::images::placeholder),
        )
        .route(
            "/images/{tail:.*}",
            web::get().to(handlers::images::proxy_image),
        );
}
