//! Shoplist Core - Shared types and list domain rules.
//!
//! This crate provides the pieces used by every Shoplist component:
//! - `api` - REST service for shopping lists
//! - `cli` - Command-line tools for migrations and demo data
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP. This keeps it lightweight and easy to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, validated text, quantities, states and paging
//! - [`list`] - The shopping list aggregate and its invariants
//! - [`access`] - The access control gate consulted before every list operation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod list;
pub mod types;

pub use access::{Caller, Decision, Denial, Operation};
pub use list::{Item, ItemPatch, ListDocument, ListError, Member, NewItem, Progress, ShoppingList};
pub use types::*;
