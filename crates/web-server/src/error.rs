use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::ValidationErrors;
use database::DbError;
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// The store operation a handler was performing. Used to phrase the generic
/// messages returned for server-side failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateDietPlan,
    GetDietPlan,
    DeleteDietPlans,
    DeleteDietPlan,
    UpdateFoodQuantity,
    DeleteFood,
}

impl Operation {
    pub fn not_found_message(self) -> &'static str {
        match self {
            Operation::CreateDietPlan | Operation::GetDietPlan | Operation::DeleteDietPlans => {
                "No diet plan found for the given external user id"
            }
            Operation::DeleteDietPlan => "Diet plan not found",
            Operation::UpdateFoodQuantity | Operation::DeleteFood => "Food not found",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Operation::CreateDietPlan => "creating the diet plan",
            Operation::GetDietPlan => "fetching the diet plan",
            Operation::DeleteDietPlans => "deleting the diet plans",
            Operation::DeleteDietPlan => "deleting the diet plan",
            Operation::UpdateFoodQuantity => "updating the food quantity",
            Operation::DeleteFood => "deleting the food",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request failed validation: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Integrity error while {operation}: {source}")]
    Integrity { operation: Operation, source: DbError },
    #[error("Unknown error while {operation}: {source}")]
    Unknown { operation: Operation, source: DbError },
}

impl AppError {
    /// Classifies a store failure for the operation that produced it.
    pub fn database(err: DbError, operation: Operation) -> Self {
        match err {
            DbError::NotFound => AppError::NotFound(operation.not_found_message().to_string()),
            integrity @ DbError::Integrity(_) => AppError::Integrity {
                operation,
                source: integrity,
            },
            other => AppError::Unknown {
                operation,
                source: other,
            },
        }
    }
}

/// A body that is not JSON at all is reported like any other shape problem.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body.");
        AppError::Validation(ValidationErrors::invalid_json())
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// This is the single place failures are logged, inside the request span, so
/// each entry carries the request id and whatever entity ids the handler
/// recorded on the span.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                tracing::warn!(errors = ?errors.errors(), "Validation error.");
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            AppError::MissingParameter(name) => {
                tracing::warn!(parameter = name, "Missing required parameter.");
                let body = Json(json!({ "error": format!("{name} is required") }));
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            AppError::NotFound(message) => {
                tracing::warn!(%message, "Not found.");
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            AppError::Integrity { operation, source } => {
                tracing::error!(error = %source, %operation, "Integrity error.");
                let body = Json(json!({ "error": format!("Integrity error while {operation}") }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
            AppError::Unknown { operation, source } => {
                tracing::error!(error = ?source, %operation, "Unknown error.");
                let body = Json(json!({ "error": format!("Unknown error while {operation}") }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_the_right_variant() {
        assert!(matches!(
            AppError::database(DbError::NotFound, Operation::DeleteFood),
            AppError::NotFound(ref m) if m == "Food not found"
        ));
        assert!(matches!(
            AppError::database(DbError::Integrity("dup".into()), Operation::CreateDietPlan),
            AppError::Integrity { operation: Operation::CreateDietPlan, .. }
        ));
        assert!(matches!(
            AppError::database(
                DbError::ConnectionConfigError("x".into()),
                Operation::GetDietPlan
            ),
            AppError::Unknown { operation: Operation::GetDietPlan, .. }
        ));
    }

    #[test]
    fn status_codes_follow_the_error_class() {
        let cases = [
            (
                AppError::Validation(ValidationErrors::invalid_json()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::MissingParameter("externalUserId"),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                AppError::database(DbError::Integrity("dup".into()), Operation::CreateDietPlan),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::database(
                    DbError::ConnectionConfigError("pool closed".into()),
                    Operation::DeleteFood,
                ),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
