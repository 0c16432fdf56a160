//! Invoicing hook - turns a saved invoice into stamp calls.
//!
//! Invoicing calls this after an invoice is persisted. Every service
//! unit sold earns one stamp (the free-price flag is irrelevant to the
//! loyalty program), applied sequentially to the client's active card.
//!
//! # Error Handling
//!
//! Stamp processing must never fail the invoice-save flow: every failure
//! here is logged and reported as a notice in the summary, and the hook
//! itself is infallible from the caller's point of view.

use crate::db::DbPool;
use crate::models::invoice::{InvoiceStampRequest, InvoiceStampSummary, ServiceLineItem};
use crate::models::stamp_event::{StampKind, StampOutcome};
use crate::services::{card_service, stamp_engine};

/// Total stamp-earning units on an invoice.
///
/// One unit per quantity across all line items. Free-price lines count
/// like any other; non-positive quantities contribute nothing.
pub fn total_units(lineas: &[ServiceLineItem]) -> i64 {
    lineas
        .iter()
        .map(|linea| i64::from(linea.cantidad.max(0)))
        .sum()
}

/// Apply an invoice's service units to the client's active card.
///
/// # Process
///
/// 1. Sum the units across line items
/// 2. Look up the client's active card; no card means nothing to do (a
///    card is never created implicitly)
/// 3. Add one stamp per unit, sequentially, threading the card through
///    the loop
/// 4. Stop at the stamp that completes the card; leftover units are
///    discarded and reported in the summary
pub async fn process_invoice(pool: &DbPool, request: InvoiceStampRequest) -> InvoiceStampSummary {
    let total = total_units(&request.lineas);
    let mut summary = InvoiceStampSummary::new(total);

    if total == 0 {
        summary
            .avisos
            .push("La factura no contiene servicios que acumulen sellos.".to_string());
        return summary;
    }

    let card = match card_service::get_card_by_client(pool, request.cliente_id).await {
        Ok(Some(card)) => card,
        Ok(None) => {
            summary
                .avisos
                .push("El cliente no tiene tarjeta de fidelidad activa.".to_string());
            return summary;
        }
        Err(e) => {
            tracing::error!(cliente_id = %request.cliente_id, "card lookup failed during invoice stamping: {e}");
            summary
                .avisos
                .push("No se pudo consultar la tarjeta de fidelidad.".to_string());
            return summary;
        }
    };

    let invoice_ref = request.factura_ref.as_deref();

    for _ in 0..total {
        match stamp_engine::add_stamp(
            pool,
            card.id,
            StampKind::Automatic,
            &request.empleado,
            invoice_ref,
            None,
        )
        .await
        {
            Ok(StampOutcome::Progress { next_is_free, .. }) => {
                summary.sellos_aplicados += 1;
                if next_is_free {
                    summary.proximo_gratis = true;
                    summary
                        .avisos
                        .push("¡La próxima visita es gratis!".to_string());
                }
            }
            Ok(StampOutcome::Completed { .. }) => {
                summary.sellos_aplicados += 1;
                summary.tarjeta_completada = true;
                summary
                    .avisos
                    .push("¡Tarjeta completada! El próximo servicio es gratis.".to_string());
                // Terminal card: leftover units are discarded
                break;
            }
            Ok(StampOutcome::AlreadyCompleted) => {
                summary.avisos.push(
                    "La tarjeta ya estaba completada; no se añadieron más sellos.".to_string(),
                );
                break;
            }
            Err(e) => {
                tracing::error!(card_id = %card.id, "stamp failed during invoice processing: {e}");
                summary
                    .avisos
                    .push("No se pudieron aplicar todos los sellos de la factura.".to_string());
                break;
            }
        }
    }

    summary.unidades_descartadas = total - summary.sellos_aplicados;

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(cantidad: i32, precio_gratis: bool) -> ServiceLineItem {
        ServiceLineItem {
            servicio: "Corte caballero".to_string(),
            cantidad,
            precio_unitario_cents: 1500,
            precio_gratis,
        }
    }

    #[test]
    fn free_price_lines_still_count_units() {
        let lineas = vec![line(2, false), line(1, true)];
        assert_eq!(total_units(&lineas), 3);
    }

    #[test]
    fn empty_invoice_has_no_units() {
        assert_eq!(total_units(&[]), 0);
    }

    #[test]
    fn non_positive_quantities_contribute_nothing() {
        let lineas = vec![line(0, false), line(-2, false), line(4, false)];
        assert_eq!(total_units(&lineas), 4);
    }
}
