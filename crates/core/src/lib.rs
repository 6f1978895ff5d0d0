//! Classic Car Matcher Core - Shared types and matching engine.
//!
//! This crate provides the pieces shared by every Classic Car Matcher component:
//! - `web` - The request tracker web app and inventory relay
//! - `cli` - Command-line tools for migrations and terminal access
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Customer requests, inventory items, and vehicle decomposition
//! - [`matching`] - Facets, filtering, sorting, and inventory matching

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod matching;
pub mod types;

pub use matching::{FilterCriteria, SortKey};
pub use types::*;
