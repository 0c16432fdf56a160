//! Loyalty card service for a barbershop/salon management application.
//!
//! Clients collect one stamp per service unit sold; the 10th stamp
//! completes the card and grants a free service. This crate exposes the
//! card store, the stamp engine and the invoicing hook both as a REST
//! API (see `main.rs`) and as a library so integration tests can drive
//! the services directly.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
