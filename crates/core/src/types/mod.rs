//! Core types for Classic Car Matcher.
//!
//! This module provides the domain records exchanged with the record store
//! and the inventory feed.

pub mod id;
pub mod request;
pub mod vehicle;

pub use id::RequestId;
pub use request::{CustomerRequest, NewCustomerRequest, ValidationError};
pub use vehicle::{InventoryItem, VehicleRequest};
