//! Invoicing hook HTTP handler.

use crate::{db::DbPool, models::invoice::{InvoiceStampRequest, InvoiceStampSummary}, services::invoice_hook};
use axum::{Json, extract::State};

/// Apply a saved invoice's service units as stamps.
///
/// # Endpoint
///
/// `POST /tarjetas-fidelidad/procesar-factura`
///
/// # Request Body
///
/// ```json
/// {
///   "clienteId": "550e8400-e29b-41d4-a716-446655440000",
///   "empleado": "Laura",
///   "facturaRef": "F-2026-0117",
///   "lineas": [
///     { "servicio": "Corte caballero", "cantidad": 2, "precioUnitarioCents": 1500, "precioGratis": false },
///     { "servicio": "Arreglo barba", "cantidad": 1, "precioUnitarioCents": 0, "precioGratis": true }
///   ]
/// }
/// ```
///
/// # Response (always 200 OK)
///
/// A stamp summary; the invoice-save flow must never fail because of
/// stamp processing, so problems surface as notices, not statuses:
///
/// ```json
/// {
///   "unidades_totales": 3,
///   "sellos_aplicados": 3,
///   "unidades_descartadas": 0,
///   "tarjeta_completada": false,
///   "proximo_gratis": true,
///   "avisos": ["¡La próxima visita es gratis!"]
/// }
/// ```
pub async fn process_invoice(
    State(pool): State<DbPool>,
    Json(request): Json<InvoiceStampRequest>,
) -> Json<InvoiceStampSummary> {
    Json(invoice_hook::process_invoice(&pool, request).await)
}
