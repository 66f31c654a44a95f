//! Business logic services.
//!
//! # Services
//!
//! - `lists` - Shopping list store: access checks, aggregate mutations and
//!   persistence behind one call per command

pub mod lists;

pub use lists::{ListStore, StoreError};
