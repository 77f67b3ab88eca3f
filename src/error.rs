use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::services::AgentError;

const GENERIC_FAILURE: &str = "An error occurred while analyzing the video. Please try again.";

/// Failures that end an `/analyze` request. Extraction and narration
/// problems never show up here, they only reduce what the response carries.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AnalyzeError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::Validation(_) => "ValidationError",
            AnalyzeError::Agent(_) => "AgentError",
            AnalyzeError::Internal(_) => "InternalError",
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl ResponseError for AnalyzeError {
    fn status_code(&self) -> StatusCode {
        match self {
            AnalyzeError::Validation(_) => StatusCode::BAD_REQUEST,
            AnalyzeError::Agent(_) | AnalyzeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AnalyzeError::Validation(reason) => ErrorBody {
                error: reason.clone(),
                message: None,
            },
            _ => {
                log::error!("Analysis failed with {}: {:?}", self.kind(), self);
                ErrorBody {
                    error: format!("{}: {}", self.kind(), self),
                    message: Some(GENERIC_FAILURE),
                }
            }
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}
