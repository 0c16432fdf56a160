//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers:
//! card storage and lookup, the stamp/reward state machine, and the
//! invoicing-side hook that feeds it.

pub mod card_service;
pub mod invoice_hook;
pub mod stamp_engine;
