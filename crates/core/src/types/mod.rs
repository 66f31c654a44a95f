//! Core types for Shoplist.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod page;
pub mod quantity;
pub mod status;
pub mod text;

pub use id::*;
pub use page::{Page, PageRequest};
pub use quantity::{Quantity, QuantityError};
pub use status::*;
pub use text::{Awid, Identity, ItemName, ListName, Measure, TextError};
