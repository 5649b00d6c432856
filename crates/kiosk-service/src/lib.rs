//! Kiosk HTTP API Service.
//!
//! This crate hosts the payment lifecycle core of the kiosk storefront:
//!
//! - Checkout: invoice creation against the payment processor
//! - Webhook reconciliation of processor-reported payment status
//! - Fulfillment: access delivery and purchase recording
//! - Durable expiry sweeping for invoices that are never reported on
//! - Admin reporting (aggregate sales statistics) and catalog reload
//!
//! The chat presentation layer is an external collaborator: it calls the
//! checkout and account endpoints with a user identity and package selection,
//! and users receive outcomes through the notification sink.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for consistency

pub mod auth;
pub mod config;
pub mod crypto;
pub mod error;
pub mod fulfillment;
pub mod handlers;
pub mod notify;
pub mod orchestrator;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use notify::{BotApiNotifier, Notifier, NotifyError};
pub use orchestrator::{CheckoutError, Orchestrator, ReconcileOutcome};
pub use routes::create_router;
pub use state::AppState;
