//! Relay server errors
//!
//! Every error is answered with a JSON [`RelayResponse`] carrying
//! `success: false`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::wire::RelayResponse;

#[derive(Error, Debug)]
pub enum RelayError {
    /// Missing, out-of-range, or mismatched client id/key
    #[error("{0}")]
    Authentication(&'static str),

    /// Body is not a JSON object of the expected shape
    #[error("Invalid JSON")]
    InvalidJson,

    /// Required update fields are absent or empty
    #[error("Missing required fields: {}", .0.join(","))]
    MissingFields(Vec<&'static str>),

    /// The provider could not be reached
    #[error("Internal server error")]
    Internal(String),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Authentication(_)
            | RelayError::InvalidJson
            | RelayError::MissingFields(_) => StatusCode::BAD_REQUEST,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            RelayError::Internal(detail) => Some(serde_json::Value::String(detail.clone())),
            _ => None,
        };

        (status, Json(RelayResponse::failure(self.to_string(), detail))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
