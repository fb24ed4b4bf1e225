//! CyberMart Core - Shared types library.
//!
//! This crate provides common types used across all CyberMart components:
//! - `storefront` - Gateway between shoppers and the marketplace backends
//! - `cli` - Command-line shopper and seller client
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
