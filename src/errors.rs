//! Error types for backend calls and page handlers.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Failure talking to the catalog API.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to parse JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("API reported failure: {0}")]
    Unsuccessful(String),

    #[error("API response carried no data")]
    EmptyPayload,

    #[error("Product detail is missing its {0}")]
    MissingRelation(&'static str),
}

/// Errors surfaced by page handlers. Backend failures never get here: list
/// pages degrade to empty results and a missing product renders the
/// not-found page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Template render error: {0}")]
    Template(#[from] tera::Error),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Template(err) => {
                tracing::error!(error = ?err, "Tera render error");
                "Template render error"
            }
        };

        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_error_is_500() {
        let err: AppError = tera::Tera::default()
            .render("missing.html", &tera::Context::new())
            .unwrap_err()
            .into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_decode_error_converts() {
        let err: ApiError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, ApiError::Decode(_)));
        assert!(err.to_string().starts_with("Failed to parse JSON"));
    }
}
