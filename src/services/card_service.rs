//! Card store - durable storage and lookup of loyalty cards.
//!
//! This service owns card creation (with code generation), lookups,
//! the joined listing for the administration screen, deletion, and the
//! append-only stamp history.

use crate::db::DbPool;
use crate::error::AppError;
use crate::models::card::{CardWithClient, LoyaltyCard};
use crate::models::stamp_event::{StampEvent, StampKind};
use chrono::Utc;
use rand::Rng;
use uuid::Uuid;

/// Create a new loyalty card for a client.
///
/// # Process
///
/// 1. Verify the client exists
/// 2. Reject if the client already has an active card
/// 3. Use the manual code if supplied (rejecting collisions), otherwise
///    generate one
/// 4. Insert with `stamp_count = 0`, `state = 'active'`
///
/// # Errors
///
/// - `ClientNotFound`: the referenced client does not exist
/// - `DuplicateActiveCard`: the client already has an active card
/// - `DuplicateCode`: the manual code is already taken
/// - `InvalidRequest`: the manual code is blank
pub async fn create_card(
    pool: &DbPool,
    client_id: Uuid,
    manual_code: Option<String>,
) -> Result<LoyaltyCard, AppError> {
    let client_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
        .bind(client_id)
        .fetch_one(pool)
        .await?;

    if !client_exists {
        return Err(AppError::ClientNotFound);
    }

    // One active card per client; checked here so the caller gets the
    // dedicated error, backstopped by the partial unique index.
    if get_card_by_client(pool, client_id).await?.is_some() {
        return Err(AppError::DuplicateActiveCard);
    }

    let code = match manual_code {
        Some(code) => {
            let code = code.trim().to_string();
            if code.is_empty() {
                return Err(AppError::InvalidRequest(
                    "Card code must not be blank".to_string(),
                ));
            }

            let code_taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loyalty_cards WHERE code = $1)")
                    .bind(&code)
                    .fetch_one(pool)
                    .await?;

            if code_taken {
                return Err(AppError::DuplicateCode);
            }

            code
        }
        None => generate_code(),
    };

    let card = sqlx::query_as::<_, LoyaltyCard>(
        r#"
        INSERT INTO loyalty_cards (code, client_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(&code)
    .bind(client_id)
    .fetch_one(pool)
    .await
    // The pre-checks above can race with a concurrent create; the
    // violated constraint names the rule that lost.
    .map_err(AppError::from_unique_violation)?;

    tracing::info!(card_id = %card.id, client_id = %client_id, code = %card.code, "loyalty card created");

    Ok(card)
}

/// Get a card by id.
pub async fn get_card(pool: &DbPool, card_id: Uuid) -> Result<Option<LoyaltyCard>, AppError> {
    let card = sqlx::query_as::<_, LoyaltyCard>("SELECT * FROM loyalty_cards WHERE id = $1")
        .bind(card_id)
        .fetch_optional(pool)
        .await?;

    Ok(card)
}

/// Get a client's active card, if any.
///
/// Completed cards are not returned: once a card is terminal the client
/// has no card until a new one is created.
pub async fn get_card_by_client(
    pool: &DbPool,
    client_id: Uuid,
) -> Result<Option<LoyaltyCard>, AppError> {
    let card = sqlx::query_as::<_, LoyaltyCard>(
        "SELECT * FROM loyalty_cards WHERE client_id = $1 AND state = 'active'",
    )
    .bind(client_id)
    .fetch_optional(pool)
    .await?;

    Ok(card)
}

/// List all cards joined with client display fields, newest first.
pub async fn list_cards(pool: &DbPool) -> Result<Vec<CardWithClient>, AppError> {
    let cards = sqlx::query_as::<_, CardWithClient>(
        r#"
        SELECT
            lc.id, lc.code, lc.client_id, lc.stamp_count, lc.state,
            lc.created_at, lc.completed_at,
            c.full_name AS client_name,
            c.document_id AS client_document
        FROM loyalty_cards lc
        JOIN clients c ON c.id = lc.client_id
        ORDER BY lc.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(cards)
}

/// Delete a card and its full stamp history.
///
/// History rows go with the card via `ON DELETE CASCADE`.
///
/// # Errors
///
/// - `CardNotFound`: no card with this id
pub async fn delete_card(pool: &DbPool, card_id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM loyalty_cards WHERE id = $1")
        .bind(card_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::CardNotFound);
    }

    tracing::info!(card_id = %card_id, "loyalty card deleted");

    Ok(())
}

/// Append one stamp event to a card's history.
///
/// Pure append; takes any executor so the stamp engine can call it
/// inside the transaction that updates the counter.
pub async fn append_history(
    executor: impl sqlx::PgExecutor<'_>,
    card_id: Uuid,
    kind: StampKind,
    operator: &str,
    invoice_ref: Option<&str>,
    notes: Option<&str>,
) -> Result<StampEvent, AppError> {
    let event = sqlx::query_as::<_, StampEvent>(
        r#"
        INSERT INTO stamp_events (card_id, kind, operator, invoice_ref, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(card_id)
    .bind(kind)
    .bind(operator)
    .bind(invoice_ref)
    .bind(notes)
    .fetch_one(executor)
    .await?;

    Ok(event)
}

/// List a card's stamp history, newest first.
///
/// # Errors
///
/// - `CardNotFound`: no card with this id
pub async fn list_history(pool: &DbPool, card_id: Uuid) -> Result<Vec<StampEvent>, AppError> {
    let card_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM loyalty_cards WHERE id = $1)")
            .bind(card_id)
            .fetch_one(pool)
            .await?;

    if !card_exists {
        return Err(AppError::CardNotFound);
    }

    let events = sqlx::query_as::<_, StampEvent>(
        "SELECT * FROM stamp_events WHERE card_id = $1 ORDER BY created_at DESC",
    )
    .bind(card_id)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

/// Generate a card code: prefix, timestamp-derived digits, random digits.
///
/// Uniqueness is guaranteed by the `code` unique constraint, not by the
/// generator; a collision surfaces as `DuplicateCode`.
fn generate_code() -> String {
    let timestamp_digits = Utc::now().timestamp_millis() % 1_000_000;
    let random_digits: u32 = rand::rng().random_range(0..1000);
    format!("TF-{timestamp_digits:06}-{random_digits:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_has_expected_shape() {
        let code = generate_code();
        let parts: Vec<&str> = code.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TF");
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    }
}
