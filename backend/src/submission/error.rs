use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use common::model::destination::DestinationError;
use std::io;

/// Why a submission could not be stored or forwarded. None of these are
/// retried; the submitter decides whether to post again.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("invalid content-type, expect application/json, actual {}.", .0.as_deref().unwrap_or("none"))]
    InvalidContentType(Option<String>),
    #[error("bad JSON: {0}")]
    InvalidBody(String),
    #[error("form {0} not found")]
    FormNotFound(String),
    #[error("destination type of web with content type {0} is not implemented")]
    UnsupportedContentType(String),
    #[error("destination type of \"{0}\" is not implemented.")]
    UnsupportedDestinationType(String),
    #[error("{0}")]
    InvalidDestination(String),
    #[error("{message}")]
    RemoteRejected { status: u16, message: String },
    #[error("request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },
    #[error("storage failure: {0}")]
    StorageFailure(#[from] io::Error),
}

impl SubmitError {
    pub fn name(&self) -> &'static str {
        match self {
            SubmitError::InvalidContentType(_) => "InvalidContentType",
            SubmitError::InvalidBody(_) => "InvalidBody",
            SubmitError::FormNotFound(_) => "FormNotFound",
            SubmitError::UnsupportedContentType(_) => "UnsupportedContentType",
            SubmitError::UnsupportedDestinationType(_) => "UnsupportedDestinationType",
            SubmitError::InvalidDestination(_) => "InvalidDestination",
            SubmitError::RemoteRejected { .. } => "RemoteRejected",
            SubmitError::Transport { .. } => "Transport",
            SubmitError::StorageFailure(_) => "StorageFailure",
        }
    }
}

impl From<DestinationError> for SubmitError {
    fn from(error: DestinationError) -> Self {
        match error {
            DestinationError::UnsupportedType(tag) => SubmitError::UnsupportedDestinationType(tag),
            invalid @ DestinationError::Invalid { .. } => {
                SubmitError::InvalidDestination(invalid.to_string())
            }
        }
    }
}

impl ResponseError for SubmitError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubmitError::InvalidContentType(_) | SubmitError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            SubmitError::FormNotFound(_) => StatusCode::NOT_FOUND,
            SubmitError::RemoteRejected { .. } | SubmitError::Transport { .. } => StatusCode::BAD_GATEWAY,
            SubmitError::UnsupportedContentType(_)
            | SubmitError::UnsupportedDestinationType(_)
            | SubmitError::InvalidDestination(_)
            | SubmitError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(format!("{}: {}", self.name(), self))
    }
}
