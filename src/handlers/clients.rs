//! Client HTTP handlers.
//!
//! Minimal collaborator surface: the wider management application owns
//! client records, but the loyalty program needs enough of one to issue
//! cards against and to join display fields from.

use crate::{
    db::DbPool,
    error::AppError,
    models::client::{Client, ClientResponse, CreateClientRequest},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// Register a client.
///
/// # Request Body
///
/// ```json
/// {
///   "nombre": "María García",
///   "documento": "12345678Z"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the new client
/// - **400**: blank name or document
pub async fn create_client(
    State(pool): State<DbPool>,
    Json(request): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    let nombre = request.nombre.trim();
    let documento = request.documento.trim();

    if nombre.is_empty() || documento.is_empty() {
        return Err(AppError::InvalidRequest(
            "nombre and documento must not be blank".to_string(),
        ));
    }

    let client = sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (full_name, document_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(nombre)
    .bind(documento)
    .fetch_one(&pool)
    .await?;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

/// List all clients, newest first.
pub async fn list_clients(State(pool): State<DbPool>) -> Result<Json<Vec<ClientResponse>>, AppError> {
    let clients =
        sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
            .fetch_all(&pool)
            .await?;

    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

/// Get a client by id.
pub async fn get_client(
    State(pool): State<DbPool>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<ClientResponse>, AppError> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
        .bind(client_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::ClientNotFound)?;

    Ok(Json(client.into()))
}
