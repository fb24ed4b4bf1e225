//! Core types for CyberMart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod credential;
pub mod email;
pub mod id;
pub mod price;
pub mod role;
pub mod status;

pub use category::Category;
pub use credential::{BearerToken, CredentialError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, line_total, to_minor_units};
pub use role::{ParseRoleError, Role};
pub use status::OrderStatus;
