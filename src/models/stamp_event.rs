//! Stamp history entity and stamp API types.
//!
//! Every stamp mutation appends one row to the `stamp_events` table:
//! manual adjustments from the administration screen, automatic stamps
//! driven by invoicing, and removals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What triggered a stamp event.
///
/// Maps to the PostgreSQL enum `stamp_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stamp_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StampKind {
    /// Added by an operator through the administration screen
    Manual,
    /// Added by the invoicing hook, one per service unit sold
    Automatic,
    /// Administrative removal
    Remove,
}

/// One row of a card's append-only stamp history.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct StampEvent {
    pub id: Uuid,

    /// Card this event belongs to
    pub card_id: Uuid,

    pub kind: StampKind,

    /// Who or what triggered the event (employee name, free text)
    pub operator: String,

    /// Optional correlation to the invoice that produced the stamp
    pub invoice_ref: Option<String>,

    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Request body for `POST /tarjetas-fidelidad/{id}/sello`.
///
/// # JSON Example
///
/// ```json
/// {
///   "empleado": "Laura",
///   "observaciones": "Corte caballero"
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct AddStampRequest {
    /// Employee adding the stamp
    pub empleado: String,

    /// Optional free-text note stored with the history entry
    pub observaciones: Option<String>,
}

/// Request body for `POST /tarjetas-fidelidad/{id}/quitar-sello`.
#[derive(Debug, Deserialize)]
pub struct RemoveStampRequest {
    /// Employee removing the stamp
    pub empleado: String,
}

/// Outcome of adding a stamp to a card.
///
/// `AlreadyCompleted` is a successful no-op, not an error: the card is
/// terminal and the client must request a new one to keep earning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampOutcome {
    /// Stamp recorded, card still active.
    Progress {
        /// Counter after the stamp
        stamp_count: i32,
        /// Stamps left until the reward
        remaining: i32,
        /// True exactly when one stamp is left (the next service is free)
        next_is_free: bool,
    },

    /// This stamp was the last one: the card just completed and the
    /// reward (one free service) is due.
    Completed {
        /// Counter after the stamp (the target, 10)
        stamp_count: i32,
    },

    /// The card was already completed; nothing changed and no history
    /// row was written.
    AlreadyCompleted,
}

/// Response body for the stamp endpoints.
///
/// Only the fields relevant to the outcome are serialized, e.g.:
///
/// ```json
/// {
///   "mensaje": "Sello añadido. Lleva 7 de 10.",
///   "sellos_actuales": 7,
///   "sellos_restantes": 3,
///   "proximo_gratis": false
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct StampResponse {
    /// Human-readable notification shown by the calling UI
    pub mensaje: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sellos_actuales: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sellos_restantes: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proximo_gratis: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tarjeta_completada: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tarjeta_ya_completada: Option<bool>,
}

impl From<StampOutcome> for StampResponse {
    fn from(outcome: StampOutcome) -> Self {
        match outcome {
            StampOutcome::Progress {
                stamp_count,
                remaining,
                next_is_free,
            } => Self {
                mensaje: if next_is_free {
                    format!("Sello añadido. Lleva {stamp_count} de 10. ¡La próxima visita es gratis!")
                } else {
                    format!("Sello añadido. Lleva {stamp_count} de 10.")
                },
                sellos_actuales: Some(stamp_count),
                sellos_restantes: Some(remaining),
                proximo_gratis: Some(next_is_free),
                tarjeta_completada: None,
                tarjeta_ya_completada: None,
            },
            StampOutcome::Completed { stamp_count } => Self {
                mensaje: "¡Tarjeta completada! El próximo servicio es gratis.".to_string(),
                sellos_actuales: Some(stamp_count),
                sellos_restantes: None,
                proximo_gratis: None,
                tarjeta_completada: Some(true),
                tarjeta_ya_completada: None,
            },
            StampOutcome::AlreadyCompleted => Self {
                mensaje: "La tarjeta ya está completada. El cliente debe solicitar una nueva."
                    .to_string(),
                sellos_actuales: None,
                sellos_restantes: None,
                proximo_gratis: None,
                tarjeta_completada: None,
                tarjeta_ya_completada: Some(true),
            },
        }
    }
}

impl StampResponse {
    /// Response for a successful stamp removal.
    pub fn removed(stamp_count: i32) -> Self {
        Self {
            mensaje: format!("Sello retirado. Lleva {stamp_count} de 10."),
            sellos_actuales: Some(stamp_count),
            sellos_restantes: None,
            proximo_gratis: None,
            tarjeta_completada: None,
            tarjeta_ya_completada: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_response_carries_counter_fields() {
        let response = StampResponse::from(StampOutcome::Progress {
            stamp_count: 7,
            remaining: 3,
            next_is_free: false,
        });
        assert_eq!(response.sellos_actuales, Some(7));
        assert_eq!(response.sellos_restantes, Some(3));
        assert_eq!(response.proximo_gratis, Some(false));
        assert_eq!(response.tarjeta_completada, None);
        assert!(response.mensaje.contains("7 de 10"));
    }

    #[test]
    fn ninth_stamp_announces_free_visit() {
        let response = StampResponse::from(StampOutcome::Progress {
            stamp_count: 9,
            remaining: 1,
            next_is_free: true,
        });
        assert_eq!(response.proximo_gratis, Some(true));
        assert!(response.mensaje.contains("gratis"));
    }

    #[test]
    fn completion_response_sets_only_the_completed_flag() {
        let response = StampResponse::from(StampOutcome::Completed { stamp_count: 10 });
        assert_eq!(response.sellos_actuales, Some(10));
        assert_eq!(response.tarjeta_completada, Some(true));
        assert_eq!(response.tarjeta_ya_completada, None);
        assert_eq!(response.proximo_gratis, None);
    }

    #[test]
    fn already_completed_response_is_distinct_from_completion() {
        let response = StampResponse::from(StampOutcome::AlreadyCompleted);
        assert_eq!(response.tarjeta_ya_completada, Some(true));
        assert_eq!(response.tarjeta_completada, None);
        assert_eq!(response.sellos_actuales, None);
    }

    #[test]
    fn omitted_fields_do_not_serialize() {
        let response = StampResponse::from(StampOutcome::AlreadyCompleted);
        let json = serde_json::to_value(&response).expect("serializable");
        let object = json.as_object().expect("object");
        assert!(object.contains_key("mensaje"));
        assert!(object.contains_key("tarjeta_ya_completada"));
        assert!(!object.contains_key("sellos_actuales"));
        assert!(!object.contains_key("tarjeta_completada"));
    }

    #[test]
    fn removal_response_reports_new_counter() {
        let response = StampResponse::removed(4);
        assert_eq!(response.sellos_actuales, Some(4));
        assert!(response.mensaje.contains("retirado"));
    }
}
