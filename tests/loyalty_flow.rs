//! End-to-end storage tests for the loyalty card flow.
//!
//! These tests run against a real PostgreSQL database configured via
//! `DATABASE_URL` (a `.env` file is honored). When no database is
//! configured the tests skip themselves instead of failing, so the
//! suite stays green in environments without PostgreSQL.
//!
//! Each test seeds its own client, so tests can share one database and
//! run concurrently.

use loyalty_card_service::db::{self, DbPool};
use loyalty_card_service::error::AppError;
use loyalty_card_service::models::card::CardState;
use loyalty_card_service::models::invoice::{InvoiceStampRequest, ServiceLineItem};
use loyalty_card_service::models::stamp_event::{StampKind, StampOutcome};
use loyalty_card_service::services::{card_service, invoice_hook, stamp_engine};
use uuid::Uuid;

/// Connect and migrate, or `None` when no database is configured.
async fn test_pool() -> Option<DbPool> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = db::create_pool(&url).await.ok()?;
    db::run_migrations(&pool).await.expect("migrations apply");
    Some(pool)
}

/// Insert a fresh client and return its id.
async fn seed_client(pool: &DbPool) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO clients (full_name, document_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(format!("Cliente {}", Uuid::new_v4()))
    .bind(Uuid::new_v4().to_string())
    .fetch_one(pool)
    .await
    .expect("seed client")
}

/// Add `count` manual stamps to a card.
async fn stamp_times(pool: &DbPool, card_id: Uuid, count: i32) {
    for _ in 0..count {
        stamp_engine::add_stamp(pool, card_id, StampKind::Manual, "test", None, None)
            .await
            .expect("stamp applies");
    }
}

async fn history_len(pool: &DbPool, card_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM stamp_events WHERE card_id = $1")
        .bind(card_id)
        .fetch_one(pool)
        .await
        .expect("count history")
}

fn line(cantidad: i32, precio_gratis: bool) -> ServiceLineItem {
    ServiceLineItem {
        servicio: "Corte caballero".to_string(),
        cantidad,
        precio_unitario_cents: 1500,
        precio_gratis,
    }
}

fn invoice(cliente_id: Uuid, lineas: Vec<ServiceLineItem>) -> InvoiceStampRequest {
    InvoiceStampRequest {
        cliente_id,
        empleado: "Laura".to_string(),
        factura_ref: Some("F-2026-0001".to_string()),
        lineas,
    }
}

#[tokio::test]
async fn created_card_starts_empty_with_generated_code() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;

    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    assert_eq!(card.stamp_count, 0);
    assert_eq!(card.state, CardState::Active);
    assert!(card.completed_at.is_none());
    assert!(card.code.starts_with("TF-"));

    let found = card_service::get_card_by_client(&pool, cliente)
        .await
        .expect("lookup works")
        .expect("card is active");
    assert_eq!(found.id, card.id);
}

#[tokio::test]
async fn second_active_card_is_rejected() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;

    card_service::create_card(&pool, cliente, None)
        .await
        .expect("first card created");

    let err = card_service::create_card(&pool, cliente, None)
        .await
        .expect_err("second card rejected");
    assert!(matches!(err, AppError::DuplicateActiveCard));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loyalty_cards WHERE client_id = $1")
        .bind(cliente)
        .fetch_one(&pool)
        .await
        .expect("count cards");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn manual_code_collision_is_rejected() {
    let Some(pool) = test_pool().await else { return };
    let code = format!("TF-TEST-{}", Uuid::new_v4());

    let first = seed_client(&pool).await;
    card_service::create_card(&pool, first, Some(code.clone()))
        .await
        .expect("first card created");

    let second = seed_client(&pool).await;
    let err = card_service::create_card(&pool, second, Some(code))
        .await
        .expect_err("colliding code rejected");
    assert!(matches!(err, AppError::DuplicateCode));
}

#[tokio::test]
async fn card_for_unknown_client_is_rejected() {
    let Some(pool) = test_pool().await else { return };

    let err = card_service::create_card(&pool, Uuid::new_v4(), None)
        .await
        .expect_err("unknown client rejected");
    assert!(matches!(err, AppError::ClientNotFound));
}

#[tokio::test]
async fn tenth_stamp_completes_the_card() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    stamp_times(&pool, card.id, 8).await;

    // 9th stamp: one left, next visit free
    let ninth = stamp_engine::add_stamp(&pool, card.id, StampKind::Manual, "test", None, None)
        .await
        .expect("ninth stamp");
    assert_eq!(
        ninth,
        StampOutcome::Progress {
            stamp_count: 9,
            remaining: 1,
            next_is_free: true,
        }
    );

    // 10th stamp: completion
    let tenth = stamp_engine::add_stamp(&pool, card.id, StampKind::Manual, "test", None, None)
        .await
        .expect("tenth stamp");
    assert_eq!(tenth, StampOutcome::Completed { stamp_count: 10 });

    let card = card_service::get_card(&pool, card.id)
        .await
        .expect("lookup works")
        .expect("card exists");
    assert_eq!(card.stamp_count, 10);
    assert_eq!(card.state, CardState::Completed);
    assert!(card.completed_at.is_some());

    // A completed card is no longer the client's active card
    let active = card_service::get_card_by_client(&pool, cliente)
        .await
        .expect("lookup works");
    assert!(active.is_none());
}

#[tokio::test]
async fn stamp_on_completed_card_is_a_noop() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    stamp_times(&pool, card.id, 10).await;
    let history_before = history_len(&pool, card.id).await;

    let outcome = stamp_engine::add_stamp(&pool, card.id, StampKind::Manual, "test", None, None)
        .await
        .expect("soft no-op, not an error");
    assert_eq!(outcome, StampOutcome::AlreadyCompleted);

    let card = card_service::get_card(&pool, card.id)
        .await
        .expect("lookup works")
        .expect("card exists");
    assert_eq!(card.stamp_count, 10);
    assert_eq!(card.state, CardState::Completed);

    // No history row for the no-op
    assert_eq!(history_len(&pool, card.id).await, history_before);
}

#[tokio::test]
async fn stamp_on_missing_card_fails() {
    let Some(pool) = test_pool().await else { return };

    let err = stamp_engine::add_stamp(&pool, Uuid::new_v4(), StampKind::Manual, "test", None, None)
        .await
        .expect_err("missing card rejected");
    assert!(matches!(err, AppError::CardNotFound));
}

#[tokio::test]
async fn remove_stamp_on_empty_card_fails() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    let err = stamp_engine::remove_stamp(&pool, card.id, "test")
        .await
        .expect_err("nothing to remove");
    assert!(matches!(err, AppError::NoStampsToRemove));

    // Storage unchanged: no history row either
    assert_eq!(history_len(&pool, card.id).await, 0);

    stamp_times(&pool, card.id, 1).await;
    let count = stamp_engine::remove_stamp(&pool, card.id, "test")
        .await
        .expect("stamp removed");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn remove_stamp_does_not_revive_a_completed_card() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    stamp_times(&pool, card.id, 10).await;

    let count = stamp_engine::remove_stamp(&pool, card.id, "test")
        .await
        .expect("administrative removal works");
    assert_eq!(count, 9);

    let card = card_service::get_card(&pool, card.id)
        .await
        .expect("lookup works")
        .expect("card exists");
    assert_eq!(card.state, CardState::Completed);
}

#[tokio::test]
async fn deleting_a_card_removes_its_history() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    stamp_times(&pool, card.id, 3).await;
    assert_eq!(history_len(&pool, card.id).await, 3);

    card_service::delete_card(&pool, card.id)
        .await
        .expect("card deleted");

    assert!(card_service::get_card(&pool, card.id)
        .await
        .expect("lookup works")
        .is_none());
    // No orphan history rows remain
    assert_eq!(history_len(&pool, card.id).await, 0);

    let err = card_service::delete_card(&pool, card.id)
        .await
        .expect_err("second delete rejected");
    assert!(matches!(err, AppError::CardNotFound));
}

#[tokio::test]
async fn history_records_kind_and_invoice_ref() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    stamp_engine::add_stamp(
        &pool,
        card.id,
        StampKind::Automatic,
        "Laura",
        Some("F-2026-0042"),
        None,
    )
    .await
    .expect("stamp applies");

    let history = card_service::list_history(&pool, card.id)
        .await
        .expect("history listed");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind, StampKind::Automatic);
    assert_eq!(history[0].operator, "Laura");
    assert_eq!(history[0].invoice_ref.as_deref(), Some("F-2026-0042"));

    let err = card_service::list_history(&pool, Uuid::new_v4())
        .await
        .expect_err("missing card rejected");
    assert!(matches!(err, AppError::CardNotFound));
}

#[tokio::test]
async fn invoice_units_ignore_the_free_price_flag() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");
    stamp_times(&pool, card.id, 6).await;

    // One line of 2 units plus one free-price unit: 3 stamps total
    let summary =
        invoice_hook::process_invoice(&pool, invoice(cliente, vec![line(2, false), line(1, true)]))
            .await;

    assert_eq!(summary.unidades_totales, 3);
    assert_eq!(summary.sellos_aplicados, 3);
    assert_eq!(summary.unidades_descartadas, 0);
    assert!(summary.proximo_gratis);
    assert!(!summary.tarjeta_completada);

    let card = card_service::get_card(&pool, card.id)
        .await
        .expect("lookup works")
        .expect("card exists");
    assert_eq!(card.stamp_count, 9);
}

#[tokio::test]
async fn invoice_halts_when_the_card_completes() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");
    stamp_times(&pool, card.id, 9).await;

    let summary = invoice_hook::process_invoice(&pool, invoice(cliente, vec![line(3, false)])).await;

    assert_eq!(summary.unidades_totales, 3);
    assert_eq!(summary.sellos_aplicados, 1);
    assert_eq!(summary.unidades_descartadas, 2);
    assert!(summary.tarjeta_completada);

    let card = card_service::get_card(&pool, card.id)
        .await
        .expect("lookup works")
        .expect("card exists");
    assert_eq!(card.stamp_count, 10);
    assert_eq!(card.state, CardState::Completed);
}

#[tokio::test]
async fn invoice_without_a_card_applies_nothing() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;

    let summary = invoice_hook::process_invoice(&pool, invoice(cliente, vec![line(3, false)])).await;

    assert_eq!(summary.sellos_aplicados, 0);
    assert_eq!(summary.unidades_descartadas, 3);
    assert!(!summary.avisos.is_empty());

    // Still no card: the hook never creates one implicitly
    assert!(card_service::get_card_by_client(&pool, cliente)
        .await
        .expect("lookup works")
        .is_none());
}

#[tokio::test]
async fn invoice_with_no_units_is_a_noop() {
    let Some(pool) = test_pool().await else { return };
    let cliente = seed_client(&pool).await;
    let card = card_service::create_card(&pool, cliente, None)
        .await
        .expect("card created");

    let summary = invoice_hook::process_invoice(&pool, invoice(cliente, vec![])).await;

    assert_eq!(summary.unidades_totales, 0);
    assert_eq!(summary.sellos_aplicados, 0);

    assert_eq!(history_len(&pool, card.id).await, 0);
}
