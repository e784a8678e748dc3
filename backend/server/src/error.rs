use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use upstream::FetchError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid post type: {0}. Use 'latest' or 'popular'")]
    InvalidPostType(String),

    #[error("Invalid number type: {0}")]
    InvalidNumberType(String),

    #[error("{context}")]
    Upstream {
        context: String,
        #[source]
        source: FetchError,
    },
}

impl AppError {
    pub fn upstream(context: impl Into<String>) -> impl FnOnce(FetchError) -> Self {
        let context = context.into();
        move |source| AppError::Upstream { context, source }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidPostType { .. } => StatusCode::BAD_REQUEST,
            AppError::InvalidNumberType { .. } => StatusCode::BAD_REQUEST,
            AppError::Upstream { context, source } => {
                error!("{context}: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
