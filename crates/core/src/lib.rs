//! Copper State Core - Shared types library.
//!
//! Domain types shared between the storefront server and anything else that
//! speaks its JSON surface. The cart shapes here are the normalized form of
//! what the Shopify Storefront API returns; the storefront crate owns the
//! translation from the raw GraphQL wire format into these.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. All wire
//! types serialize with camelCase keys to match the public JSON API
//! (`totalQuantity`, `checkoutUrl`, `merchandiseId`).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
