//! Invoice gateway for kiosk.
//!
//! This crate wraps the external crypto payment processor's invoice API and
//! normalizes its responses. The gateway never retries; retry policy belongs
//! to the caller.
//!
//! # Example
//!
//! ```no_run
//! use kiosk_gateway::{GatewayClient, InvoiceRequest};
//! use kiosk_core::{AccountId, PackageId};
//!
//! # async fn example() -> Result<(), kiosk_gateway::GatewayError> {
//! let gateway = GatewayClient::new("https://api.processor.example", "merchant-key");
//!
//! let invoice = gateway
//!     .create_invoice(InvoiceRequest {
//!         amount_cents: 1500,
//!         package_id: PackageId::new("100_videos"),
//!         account_id: AccountId::new(42),
//!         callback_url: "https://kiosk.example/webhooks/payment".into(),
//!         display_name: Some("alice".into()),
//!     })
//!     .await?;
//!
//! println!("pay at {}", invoice.payment_url);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::GatewayClient;
pub use error::GatewayError;
pub use types::{Invoice, InvoiceRequest};
