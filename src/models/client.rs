//! Client data model and API request/response types.
//!
//! The wider management application owns the full client record
//! (contact data, visit history, ...). The loyalty program only needs
//! the identity and the display fields that card listings join against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents a client record from the database.
///
/// Maps to the `clients` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Client {
    /// Unique identifier for this client
    pub id: Uuid,

    /// Display name
    pub full_name: String,

    /// Identity document (DNI/NIE or similar free-form document number)
    pub document_id: String,

    /// Timestamp when the client was registered
    pub created_at: DateTime<Utc>,
}

/// Request body for registering a new client.
///
/// # JSON Example
///
/// ```json
/// {
///   "nombre": "María García",
///   "documento": "12345678Z"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    /// Client display name
    pub nombre: String,

    /// Identity document number
    pub documento: String,
}

/// Response body for client endpoints.
#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub nombre: String,
    pub documento: String,
    pub created_at: DateTime<Utc>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            nombre: client.full_name,
            documento: client.document_id,
            created_at: client.created_at,
        }
    }
}
