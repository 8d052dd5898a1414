//! Kasra storefront client library.
//!
//! Client-side state and backend access for the Kasra shop: a REST client for
//! the `/api` backend, a persisted shopping cart, the authenticated session
//! and the storage port they persist through. Front ends (the `kasra` CLI,
//! tests) build one [`state::AppState`] and drive everything through it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
