//! Stamp engine - the stamp/reward state machine.
//!
//! States are `active` and `completed` with a single forward transition,
//! taken when the counter reaches [`STAMP_TARGET`].
//!
//! # Atomicity
//!
//! The counter advance, the state transition and the history append all
//! happen inside one PostgreSQL transaction, and the advance itself is a
//! single conditional `UPDATE`. Two concurrent stamp calls on the same
//! card serialize on the row; no read-modify-write window exists.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::card::{CardState, LoyaltyCard};
use crate::models::stamp_event::{StampKind, StampOutcome};
use crate::services::card_service;
use uuid::Uuid;

/// Stamps needed to complete a card and earn the free service.
pub const STAMP_TARGET: i32 = 10;

/// Add one stamp to a card.
///
/// # Process
///
/// 1. Conditionally increment the counter (`WHERE state = 'active'`),
///    flipping `state`/`completed_at` in the same statement when the
///    target is reached
/// 2. If no row matched, diagnose: absent card, completed card (soft
///    no-op), or anything else
/// 3. Append the history entry and commit
///
/// # Returns
///
/// - `Progress` while the card stays active (with `next_is_free` when
///   exactly one stamp is left)
/// - `Completed` on the stamp that reaches the target
/// - `AlreadyCompleted` when the card was terminal before the call; the
///   card is untouched and no history is written
///
/// # Errors
///
/// - `CardNotFound`: no card with this id
/// - `InvalidState`: the card was not stampable for any other reason
pub async fn add_stamp(
    pool: &DbPool,
    card_id: Uuid,
    kind: StampKind,
    operator: &str,
    invoice_ref: Option<&str>,
    notes: Option<&str>,
) -> Result<StampOutcome, AppError> {
    let mut tx = pool.begin().await?;

    // Advance and transition in one statement; only active cards match.
    let updated = sqlx::query_as::<_, LoyaltyCard>(
        r#"
        UPDATE loyalty_cards
        SET stamp_count = LEAST(stamp_count + 1, $2),
            state = CASE WHEN stamp_count + 1 >= $2 THEN 'completed'::card_state ELSE state END,
            completed_at = CASE WHEN stamp_count + 1 >= $2 THEN NOW() ELSE completed_at END
        WHERE id = $1 AND state = 'active'
        RETURNING *
        "#,
    )
    .bind(card_id)
    .bind(STAMP_TARGET)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(card) = updated else {
        let existing =
            sqlx::query_as::<_, LoyaltyCard>("SELECT * FROM loyalty_cards WHERE id = $1")
                .bind(card_id)
                .fetch_optional(&mut *tx)
                .await?;
        tx.rollback().await?;

        return match existing {
            None => Err(AppError::CardNotFound),
            Some(card) if card.state == CardState::Completed => {
                Ok(StampOutcome::AlreadyCompleted)
            }
            Some(_) => Err(AppError::InvalidState),
        };
    };

    card_service::append_history(&mut *tx, card.id, kind, operator, invoice_ref, notes).await?;

    tx.commit().await?;

    let outcome = outcome_for(&card);

    if let StampOutcome::Completed { .. } = outcome {
        tracing::info!(card_id = %card.id, "loyalty card completed, reward due");
    }

    Ok(outcome)
}

/// Remove one stamp from a card.
///
/// The counter decrements but the state never changes: removing a stamp
/// from a completed card does not revive it.
///
/// # Returns
///
/// The counter after the removal.
///
/// # Errors
///
/// - `CardNotFound`: no card with this id
/// - `NoStampsToRemove`: the counter is already 0
pub async fn remove_stamp(
    pool: &DbPool,
    card_id: Uuid,
    operator: &str,
) -> Result<i32, AppError> {
    let mut tx = pool.begin().await?;

    let updated = sqlx::query_as::<_, LoyaltyCard>(
        r#"
        UPDATE loyalty_cards
        SET stamp_count = stamp_count - 1
        WHERE id = $1 AND stamp_count > 0
        RETURNING *
        "#,
    )
    .bind(card_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(card) = updated else {
        let card_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loyalty_cards WHERE id = $1)")
                .bind(card_id)
                .fetch_one(&mut *tx)
                .await?;
        tx.rollback().await?;

        return if card_exists {
            Err(AppError::NoStampsToRemove)
        } else {
            Err(AppError::CardNotFound)
        };
    };

    card_service::append_history(&mut *tx, card.id, StampKind::Remove, operator, None, None)
        .await?;

    tx.commit().await?;

    Ok(card.stamp_count)
}

/// Translate the card row returned by the conditional update into the
/// caller-facing outcome.
fn outcome_for(card: &LoyaltyCard) -> StampOutcome {
    if card.state == CardState::Completed {
        StampOutcome::Completed {
            stamp_count: card.stamp_count,
        }
    } else {
        StampOutcome::Progress {
            stamp_count: card.stamp_count,
            remaining: STAMP_TARGET - card.stamp_count,
            next_is_free: card.stamp_count == STAMP_TARGET - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn card(stamp_count: i32, state: CardState) -> LoyaltyCard {
        LoyaltyCard {
            id: Uuid::new_v4(),
            code: "TF-000000-000".to_string(),
            client_id: Uuid::new_v4(),
            stamp_count,
            state,
            created_at: Utc::now(),
            completed_at: (state == CardState::Completed).then(Utc::now),
        }
    }

    #[test]
    fn midway_card_reports_progress() {
        let outcome = outcome_for(&card(5, CardState::Active));
        assert_eq!(
            outcome,
            StampOutcome::Progress {
                stamp_count: 5,
                remaining: 5,
                next_is_free: false,
            }
        );
    }

    #[test]
    fn ninth_stamp_flags_next_free() {
        let outcome = outcome_for(&card(9, CardState::Active));
        assert_eq!(
            outcome,
            StampOutcome::Progress {
                stamp_count: 9,
                remaining: 1,
                next_is_free: true,
            }
        );
    }

    #[test]
    fn completed_row_maps_to_completed_outcome() {
        let outcome = outcome_for(&card(10, CardState::Completed));
        assert_eq!(outcome, StampOutcome::Completed { stamp_count: 10 });
    }
}
