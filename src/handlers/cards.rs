//! Loyalty card HTTP handlers.
//!
//! This module implements the card API endpoints:
//! - GET /tarjetas-fidelidad - List cards with client fields
//! - POST /tarjetas-fidelidad - Create a card
//! - GET /tarjetas-fidelidad/cliente/:clienteId - Active card for a client
//! - POST /tarjetas-fidelidad/:id/sello - Add a stamp
//! - POST /tarjetas-fidelidad/:id/quitar-sello - Remove a stamp
//! - GET /tarjetas-fidelidad/:id/historial - Stamp history
//! - DELETE /tarjetas-fidelidad/:id - Delete card + history

use crate::{
    db::DbPool,
    error::AppError,
    models::card::{CardResponse, CardWithClient, CreateCardRequest},
    models::stamp_event::{AddStampRequest, RemoveStampRequest, StampEvent, StampKind, StampResponse},
    services::{card_service, stamp_engine},
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// List all loyalty cards with the owning client's display fields.
///
/// # Response (200 OK)
///
/// ```json
/// [
///   {
///     "id": "660e8400-e29b-41d4-a716-446655440001",
///     "code": "TF-483920-117",
///     "client_id": "550e8400-e29b-41d4-a716-446655440000",
///     "stamp_count": 3,
///     "state": "active",
///     "client_name": "María García",
///     "client_document": "12345678Z"
///   }
/// ]
/// ```
pub async fn list_cards(State(pool): State<DbPool>) -> Result<Json<Vec<CardWithClient>>, AppError> {
    let cards = card_service::list_cards(&pool).await?;

    Ok(Json(cards))
}

/// Create a loyalty card.
///
/// # Request Body
///
/// ```json
/// {
///   "clienteId": "550e8400-e29b-41d4-a716-446655440000",
///   "codigoManual": "TF-REGALO-001"
/// }
/// ```
///
/// # Response
///
/// - **201 Created**: the new card, `stamp_count` 0, `state` active
/// - **400**: the client already has an active card, or the code is taken
/// - **404**: the client does not exist
pub async fn create_card(
    State(pool): State<DbPool>,
    Json(request): Json<CreateCardRequest>,
) -> Result<impl IntoResponse, AppError> {
    let card = card_service::create_card(&pool, request.cliente_id, request.codigo_manual).await?;

    Ok((StatusCode::CREATED, Json(CardResponse::from(card))))
}

/// Get a client's active card, or JSON `null` when the client has none.
pub async fn get_card_by_client(
    State(pool): State<DbPool>,
    Path(cliente_id): Path<Uuid>,
) -> Result<Json<Option<CardResponse>>, AppError> {
    let card = card_service::get_card_by_client(&pool, cliente_id).await?;

    Ok(Json(card.map(CardResponse::from)))
}

/// Add a stamp to a card.
///
/// # Request Body
///
/// ```json
/// {
///   "empleado": "Laura",
///   "observaciones": "Corte caballero"
/// }
/// ```
///
/// # Response (200 OK)
///
/// One of three outcome shapes, always with a `mensaje`:
/// progress (`sellos_actuales`, `sellos_restantes`, `proximo_gratis`),
/// completion (`tarjeta_completada`), or the no-op on an already
/// completed card (`tarjeta_ya_completada`).
pub async fn add_stamp(
    State(pool): State<DbPool>,
    Path(card_id): Path<Uuid>,
    Json(request): Json<AddStampRequest>,
) -> Result<Json<StampResponse>, AppError> {
    if request.empleado.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "empleado must not be blank".to_string(),
        ));
    }

    let outcome = stamp_engine::add_stamp(
        &pool,
        card_id,
        StampKind::Manual,
        request.empleado.trim(),
        None,
        request.observaciones.as_deref(),
    )
    .await?;

    Ok(Json(outcome.into()))
}

/// Remove a stamp from a card.
///
/// # Response
///
/// - **200 OK**: `mensaje` + `sellos_actuales` with the new counter
/// - **400**: the counter is already 0
/// - **404**: no card with this id
pub async fn remove_stamp(
    State(pool): State<DbPool>,
    Path(card_id): Path<Uuid>,
    Json(request): Json<RemoveStampRequest>,
) -> Result<Json<StampResponse>, AppError> {
    if request.empleado.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "empleado must not be blank".to_string(),
        ));
    }

    let stamp_count = stamp_engine::remove_stamp(&pool, card_id, request.empleado.trim()).await?;

    Ok(Json(StampResponse::removed(stamp_count)))
}

/// Get a card's stamp history, newest first.
pub async fn get_history(
    State(pool): State<DbPool>,
    Path(card_id): Path<Uuid>,
) -> Result<Json<Vec<StampEvent>>, AppError> {
    let events = card_service::list_history(&pool, card_id).await?;

    Ok(Json(events))
}

/// Delete a card and its stamp history.
///
/// # Response
///
/// - **204 No Content** on success
/// - **404** when the card does not exist
pub async fn delete_card(
    State(pool): State<DbPool>,
    Path(card_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    card_service::delete_card(&pool, card_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
