//! REST API request and response types.
//!
//! Every body is camelCase JSON. Errors share one shape:
//!
//! ```json
//! { "status": "error", "error": "...", "fieldErrors": [{ "field": "rollNo", "message": "..." }] }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Rejection, RegistrarError};
use crate::export::CsvQuoting;
use crate::models::{StudentForm, StudentRecord};
use crate::reconcile::WriteKind;
use crate::validation::FieldError;

/// Query string for `GET /api/students`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Search text; blank lists everything.
    #[serde(default)]
    pub q: String,
}

/// Filtered listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub students: Vec<StudentRecord>,
    /// Records shown after filtering.
    pub shown: usize,
    /// Records in the store.
    pub total: usize,
}

/// Body of `POST /api/students`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub form: StudentForm,
    /// Record being edited, if any.
    #[serde(default)]
    pub edit_id: Option<String>,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// "created" or "updated"
    pub status: String,
    pub student: StudentRecord,
}

impl SubmitResponse {
    pub fn new(kind: WriteKind, student: StudentRecord) -> Self {
        let status = match kind {
            WriteKind::Create => "created",
            WriteKind::Update => "updated",
        };
        Self {
            status: status.to_string(),
            student,
        }
    }
}

/// Query string for `GET /api/export`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportParams {
    #[serde(default)]
    pub quoting: CsvQuoting,
}

/// Create an error body.
pub fn error_response(error: &str, field_errors: &[FieldError]) -> Value {
    json!({
        "status": "error",
        "error": error,
        "fieldErrors": field_errors,
    })
}

/// A registrar error as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub RegistrarError);

impl From<RegistrarError> for ApiError {
    fn from(err: RegistrarError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RegistrarError::Rejected(Rejection::FieldInvalid(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            RegistrarError::Rejected(_) => StatusCode::CONFLICT,
            RegistrarError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistrarError::Store(_) | RegistrarError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let field_errors = match &self.0 {
            RegistrarError::Rejected(rejection) => rejection.field_errors(),
            _ => Vec::new(),
        };
        let message = match &self.0 {
            RegistrarError::Rejected(rejection) => rejection.summary().to_string(),
            other => other.to_string(),
        };
        (self.status(), Json(error_response(&message, &field_errors))).into_response()
    }
}
