//! Data models representing database entities and API types.
//!
//! Each resource gets a database entity (`sqlx::FromRow`), request
//! bodies (`Deserialize`) and response bodies (`Serialize`).

/// Loyalty card entity and card API types
pub mod card;
/// Client collaborator entity
pub mod client;
/// Invoice line items consumed by the stamp hook
pub mod invoice;
/// Stamp history entity and stamp API types
pub mod stamp_event;
