//! Transport-level and content errors. Engine operations never fail; these only
//! cover requests that name content which does not exist or cannot be parsed,
//! and content that is rejected at load.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown activity: {0}")]
    UnknownActivity(String),
    #[error("unknown decision key: {0}")]
    UnknownDecisionKey(String),
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Why an activity or decision key was rejected at load.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("activity has no regions")]
    NoRegions,
    #[error("activity has no items")]
    NoItems,
    #[error("duplicate region id '{0}'")]
    DuplicateRegion(String),
    #[error("duplicate item id '{0}'")]
    DuplicateItem(String),
    #[error("item '{item}' points at unknown region '{region}'")]
    UnknownCorrectRegion { item: String, region: String },
    #[error("region '{region}' has no value for criterion '{criterion}'")]
    MissingCriterionValue { region: String, criterion: String },
    #[error("duplicate node id '{0}'")]
    DuplicateNode(String),
    #[error("branch '{0}' has no children")]
    EmptyBranch(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownActivity(_) | ApiError::UnknownDecisionKey(_) | ApiError::UnknownUser(_) => {
                StatusCode::NOT_FOUND
            }
            ApiError::InvalidMessage(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
