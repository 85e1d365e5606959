use actix_web::{HttpResponse, web};
use tera::Tera;

use crate::AppState;
use crate::errors::AppError;
use crate::handlers::{page_context, render};
use crate::views::category_href;

/// Category directory with each category's sub-categories.
pub async fn list_categories(
    tmpl: web::Data<Tera>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (mut context, categories) = tokio::join!(
        page_context(&state, None, None),
        state.categories.get_categories_with_sub_categories(),
    );

    match categories {
        Ok(categories) => {
            context.insert("categories", &categories);
        }
        Err(err) => {
            tracing::error!(error = %err, "Error fetching categories with sub-categories");
            context.insert("categories", &Vec::<()>::new());
            context.insert("error", "Failed to load categories");
        }
    }

    render(&tmpl, "categories.html", &context)
}

pub async fn category_redirect(path: web::Path<i64>) -> HttpResponse {
    HttpResponse::Found()
        .append_header(("Location", category_href(path.into_inner())))
        .finish()
}
