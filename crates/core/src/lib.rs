//! Kasra Core - Shared types library.
//!
//! This crate provides the types and pure rules used across all Kasra components:
//! - `storefront` - Client state layer (cart, session, REST client)
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and trivially testable.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, passwords and statuses
//! - [`models`] - Canonical entity shapes decoded from the backend
//! - [`filter`] - Catalog filter composition
//! - [`pricing`] - Group tier price resolution

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod filter;
pub mod models;
pub mod pricing;
pub mod types;

pub use filter::ProductFilter;
pub use pricing::{resolve_price, resolve_variant_price};
pub use types::*;
