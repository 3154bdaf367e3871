//! Core type definitions for Local Places.
//!
//! Split by concern: client-facing items, raw provider places, the search
//! request/response pair, and the error contract.

pub mod contract;
pub mod item;
pub mod place;
pub mod search;

pub use contract::*;
pub use item::*;
pub use place::*;
pub use search::*;
