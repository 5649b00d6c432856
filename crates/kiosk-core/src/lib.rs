//! Core types and utilities for kiosk.
//!
//! This crate provides the foundational types used throughout the kiosk
//! payment platform:
//!
//! - **Identifiers**: `AccountId`, `TrackId`, `PackageId`, `PurchaseId`
//! - **Accounts**: `Account`
//! - **Payments**: `PaymentIntent`, `IntentStatus`, `Purchase`
//! - **Catalog**: `PackageCatalog`, `PackageEntry`
//!
//! # Money
//!
//! All amounts are integer USD cents stored as `i64`. A $15 package is
//! `1500` cents. Integer cents avoid floating point drift in revenue sums.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod catalog;
pub mod ids;
pub mod payment;

pub use account::Account;
pub use catalog::{CatalogError, PackageCatalog, PackageEntry};
pub use ids::{AccountId, IdError, PackageId, PurchaseId, TrackId};
pub use payment::{IntentStatus, PaymentIntent, Purchase, DEFAULT_VALIDITY_MINUTES};
