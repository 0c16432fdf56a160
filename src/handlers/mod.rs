//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Delegates to the services layer
//! 3. Returns HTTP response (JSON, status code)

/// Loyalty card endpoints
pub mod cards;
/// Client collaborator endpoints
pub mod clients;
/// Service health endpoint
pub mod health;
/// Invoicing hook endpoint
pub mod invoices;
