//! HTTP request handlers.

pub mod accounts;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod stats;
pub mod webhooks;
