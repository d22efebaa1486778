//! Cartwheel Core - Shared types library.
//!
//! This crate provides the domain types used across all Cartwheel components:
//! - `client` - Cart reconciliation, category page cache, and REST gateway
//! - `cli` - Command-line front end over the client library
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no async.
//! This keeps it lightweight and allows it to be used anywhere, including
//! presentation layers that never talk to the network themselves.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, cart lines, catalog pages, and sync states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
