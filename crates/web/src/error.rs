// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps domain errors onto HTTP responses this store's error kinds.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

/// One of the error kinds, already resolved to the status
/// code and body it's reported as.
pub enum ApiError {
    Validation { message: String, details: Vec<String> },
    NotFound,
    Transient(String),
}

#[derive(Serialize)]
struct ValidationBody {
    error: String,
    details: Vec<String>,
}

#[derive(Serialize)]
struct MessageBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, Json(ValidationBody { error: message, details })).into_response()
            }
            ApiError::NotFound => (StatusCode::NOT_FOUND, Json(MessageBody { error: "job not found".to_string() })).into_response(),
            ApiError::Transient(message) => {
                error!(%message, "transient store error");
                (StatusCode::SERVICE_UNAVAILABLE, Json(MessageBody { error: message })).into_response()
            }
        }
    }
}

impl From<fj_core::ValidationError> for ApiError {
    fn from(err: fj_core::ValidationError) -> Self {
        ApiError::Validation {
            message: err.to_string(),
            details: vec![err.to_string()],
        }
    }
}

impl From<fj_jobstore::JobStoreError> for ApiError {
    fn from(err: fj_jobstore::JobStoreError) -> Self {
        match err {
            fj_jobstore::JobStoreError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Transient(other.to_string()),
        }
    }
}

impl From<fj_queue::QueueError> for ApiError {
    fn from(err: fj_queue::QueueError) -> Self {
        ApiError::Transient(err.to_string())
    }
}
