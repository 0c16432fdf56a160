//! Invoice types consumed by the stamp hook.
//!
//! Invoicing is owned by the wider management application. After it has
//! persisted an invoice it hands the service line items to this service
//! purely to drive stamp counting; nothing here is stored or validated
//! as invoice data.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One service line of a saved invoice.
///
/// # JSON Example
///
/// ```json
/// {
///   "servicio": "Corte caballero",
///   "cantidad": 2,
///   "precioUnitarioCents": 1500,
///   "precioGratis": false
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLineItem {
    /// Service name, display only
    pub servicio: String,

    /// Units sold of this service
    pub cantidad: i32,

    /// Unit price in cents, display only
    #[serde(default)]
    pub precio_unitario_cents: i64,

    /// True when the line was sold at a promotional/free price.
    /// The flag never suppresses stamping: discounts and the loyalty
    /// program are independent.
    #[serde(default)]
    pub precio_gratis: bool,
}

/// Request body for `POST /tarjetas-fidelidad/procesar-factura`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStampRequest {
    /// Client the invoice was issued to
    pub cliente_id: Uuid,

    /// Employee who closed the sale
    pub empleado: String,

    /// Optional invoice number/reference, stored with each history entry
    pub factura_ref: Option<String>,

    /// Service line items of the saved invoice
    pub lineas: Vec<ServiceLineItem>,
}

/// What the stamp hook did for one invoice.
///
/// Always returned with HTTP 200: stamp processing must never fail the
/// invoice-save flow, so errors are reported as notices, not statuses.
#[derive(Debug, Serialize)]
pub struct InvoiceStampSummary {
    /// Sum of quantities across all line items
    pub unidades_totales: i64,

    /// Stamps actually recorded
    pub sellos_aplicados: i64,

    /// Units left unapplied (card completed mid-invoice, no card, or a
    /// processing error)
    pub unidades_descartadas: i64,

    /// The invoice completed the card
    pub tarjeta_completada: bool,

    /// The card reached 9 stamps: the next visit is free
    pub proximo_gratis: bool,

    /// Human-readable notifications for the operator
    pub avisos: Vec<String>,
}

impl InvoiceStampSummary {
    /// Empty summary for an invoice with the given unit total.
    pub fn new(unidades_totales: i64) -> Self {
        Self {
            unidades_totales,
            sellos_aplicados: 0,
            unidades_descartadas: unidades_totales,
            tarjeta_completada: false,
            proximo_gratis: false,
            avisos: Vec::new(),
        }
    }
}
