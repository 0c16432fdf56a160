//! Loyalty card data model and API request/response types.
//!
//! This module defines:
//! - `LoyaltyCard`: Database entity representing a card
//! - `CardState`: the card's two-state lifecycle
//! - `CreateCardRequest`: Request body for creating cards
//! - `CardResponse` / `CardWithClient`: Response bodies returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a loyalty card.
///
/// Maps to the PostgreSQL enum `card_state`. The only transition is
/// `active -> completed`, taken when the stamp counter reaches the
/// target; nothing moves a card back to `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "card_state", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    /// Accumulating stamps
    Active,
    /// Reached the stamp target; frozen until the client requests a new card
    Completed,
}

/// Represents a loyalty card record from the database.
///
/// # Database Table
///
/// Maps to the `loyalty_cards` table. Each card:
/// - Belongs to exactly one client (via `client_id`)
/// - Holds a running stamp counter in `[0, 10]`
/// - Is the client's only `active` card (partial unique index)
///
/// # Counter vs. history
///
/// `stamp_count` is the authoritative counter. The `stamp_events` table
/// is an audit trail and is never replayed to recompute the counter.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct LoyaltyCard {
    /// Unique identifier for this card
    pub id: Uuid,

    /// Human-readable unique code, printed on the physical card
    ///
    /// Auto-generated (`TF-<digits>-<digits>`) when not assigned
    /// manually at creation.
    pub code: String,

    /// Client this card belongs to
    pub client_id: Uuid,

    /// Running stamp counter, between 0 and 10
    pub stamp_count: i32,

    /// Lifecycle state
    pub state: CardState,

    /// Timestamp when the card was created
    pub created_at: DateTime<Utc>,

    /// Set once, when the card reaches the stamp target
    pub completed_at: Option<DateTime<Utc>>,
}

/// Request body for creating a new loyalty card.
///
/// # JSON Example
///
/// ```json
/// {
///   "clienteId": "550e8400-e29b-41d4-a716-446655440000",
///   "codigoManual": "TF-REGALO-001"
/// }
/// ```
///
/// `codigoManual` is optional; a code is generated when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    /// Client the card is issued to
    pub cliente_id: Uuid,

    /// Manually assigned code (must be unique across all cards)
    pub codigo_manual: Option<String>,
}

/// Response body for card endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "660e8400-e29b-41d4-a716-446655440001",
///   "code": "TF-483920-117",
///   "client_id": "550e8400-e29b-41d4-a716-446655440000",
///   "stamp_count": 3,
///   "state": "active",
///   "created_at": "2026-02-10T10:00:00Z",
///   "completed_at": null
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct CardResponse {
    pub id: Uuid,
    pub code: String,
    pub client_id: Uuid,
    pub stamp_count: i32,
    pub state: CardState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<LoyaltyCard> for CardResponse {
    fn from(card: LoyaltyCard) -> Self {
        Self {
            id: card.id,
            code: card.code,
            client_id: card.client_id,
            stamp_count: card.stamp_count,
            state: card.state,
            created_at: card.created_at,
            completed_at: card.completed_at,
        }
    }
}

/// A card joined with the owning client's display fields.
///
/// Returned by the card listing so the administration screen can show
/// who holds each card without a second lookup.
#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct CardWithClient {
    pub id: Uuid,
    pub code: String,
    pub client_id: Uuid,
    pub stamp_count: i32,
    pub state: CardState,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,

    /// Client display name (`clients.full_name`)
    pub client_name: String,

    /// Client identity document (`clients.document_id`)
    pub client_document: String,
}
