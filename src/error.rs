use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::services::{document::DocumentError, tour_repository::RepositoryError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("tour {0} not found")]
    TourNotFound(String),
    #[error("template {0} is not configured")]
    TemplateNotFound(String),
    #[error("invalid submission: {}", .0.join("; "))]
    InvalidSubmission(Vec<String>),
    #[error("{template}: {source}")]
    Document {
        template: String,
        #[source]
        source: DocumentError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApiError {
    /// Whether resubmitting the same request may succeed.
    pub fn retryable(&self) -> bool {
        match self {
            ApiError::Document { source, .. } => source.is_fetch(),
            ApiError::Repository(RepositoryError::Unavailable(_)) => true,
            _ => false,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::TourNotFound(_) | ApiError::TemplateNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidSubmission(_) => StatusCode::BAD_REQUEST,
            ApiError::Document { source, .. } => match source {
                DocumentError::Fetch { .. } => StatusCode::BAD_GATEWAY,
                DocumentError::MalformedPackage(_) | DocumentError::MissingDocumentPart(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                DocumentError::EmptyReplacements => StatusCode::BAD_REQUEST,
                DocumentError::Assemble(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Repository(RepositoryError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Repository(RepositoryError::InvalidCatalog(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut body = json!({
            "error": self.to_string(),
            "retry": self.retryable(),
        });
        if let ApiError::InvalidSubmission(problems) = self {
            body["problems"] = json!(problems);
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
