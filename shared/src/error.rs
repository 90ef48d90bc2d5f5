use crate::validation::ValidationError;
use lambda_http::http::StatusCode;
use thiserror::Error;

/// Failures talking to the table.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conditional check failed")]
    ConditionFailed,
    #[error("dynamodb request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum MovieError {
    #[error("ERROR: required request body not found")]
    MissingBody,
    #[error("ERROR: request body invalid: {0}")]
    InvalidBody(#[from] ValidationError),
    #[error("ERROR: provide {0} parameter")]
    MissingParameter(&'static str),
    #[error("No movie found for id '{0}'")]
    NotFound(String),
    #[error("No Items found")]
    NoMatches,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl MovieError {
    /// Everything the caller can fix is a 400; only store faults are a 500.
    pub fn status(&self) -> StatusCode {
        match self {
            MovieError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to return to the caller. Store details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            MovieError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(MovieError::MissingBody.status(), StatusCode::BAD_REQUEST);
        assert_eq!(MovieError::NotFound("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(MovieError::NoMatches.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            MovieError::from(ValidationError::NotAnObject).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            MovieError::from(StoreError::Request("throttled".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_are_hidden() {
        let err = MovieError::from(StoreError::Request("table movies throttled".into()));
        assert_eq!(err.public_message(), "Internal server error");
        assert_eq!(
            MovieError::MissingParameter("movieId").public_message(),
            "ERROR: provide movieId parameter"
        );
    }
}
