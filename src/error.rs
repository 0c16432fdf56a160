//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
/// "Card already completed" is deliberately absent: adding a stamp to a
/// completed card is a soft no-op reported in the success body, not an
/// error (the client simply has to request a new card).
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Underlying storage operation failed (connection error, query error).
    ///
    /// Wraps any sqlx::Error via `#[from]`. Returns HTTP 500 with the
    /// database details hidden from the client.
    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),

    /// Requested loyalty card does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Loyalty card not found")]
    CardNotFound,

    /// Referenced client does not exist.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("Client not found")]
    ClientNotFound,

    /// The client already has a card in the `active` state.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Client already has an active loyalty card")]
    DuplicateActiveCard,

    /// The requested card code is already taken by another card.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Card code already exists")]
    DuplicateCode,

    /// Operation attempted on a card not in the state it requires.
    ///
    /// Returns HTTP 409 Conflict.
    #[error("Card is not in a valid state for this operation")]
    InvalidState,

    /// Stamp removal requested on a card whose counter is already 0.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Card has no stamps to remove")]
    NoStampsToRemove,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request with details in the String.
    #[error("Invalid request")]
    InvalidRequest(String),
}

/// Convert AppError into an HTTP response.
///
/// Handlers return `Result<T, AppError>` and failures become JSON bodies
/// of the form:
///
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::CardNotFound => (StatusCode::NOT_FOUND, "card_not_found", self.to_string()),
            AppError::ClientNotFound => {
                (StatusCode::NOT_FOUND, "client_not_found", self.to_string())
            }
            AppError::DuplicateActiveCard => (
                StatusCode::BAD_REQUEST,
                "duplicate_active_card",
                self.to_string(),
            ),
            AppError::DuplicateCode => {
                (StatusCode::BAD_REQUEST, "duplicate_code", self.to_string())
            }
            AppError::InvalidState => (StatusCode::CONFLICT, "invalid_state", self.to_string()),
            AppError::NoStampsToRemove => (
                StatusCode::BAD_REQUEST,
                "no_stamps_to_remove",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Storage(ref e) => {
                // Log the real cause, hide it from the client
                tracing::error!("storage failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_failure",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

impl AppError {
    /// Map a unique-constraint violation onto its domain error.
    ///
    /// `create_card` checks for duplicates before inserting, but two
    /// concurrent creations can both pass the check; the constraint that
    /// fires tells us which rule was violated.
    pub fn from_unique_violation(err: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return match db_err.constraint() {
                    Some("loyalty_cards_code_key") => AppError::DuplicateCode,
                    Some("loyalty_cards_one_active_per_client") => AppError::DuplicateActiveCard,
                    _ => AppError::Storage(err),
                };
            }
        }
        AppError::Storage(err)
    }
}
