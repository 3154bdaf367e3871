#![deny(unused)]
//! Place classification for Local Places.
//!
//! Provider places are matched against a category rule table and turned
//! into `Restaurant`, `Park`, or `Event` items. Places that match no rule
//! are left out.

pub mod classify;
pub mod rules;

pub use classify::{normalize_rating, Classification, Classifier, UnclassifiedReason, DEFAULT_PHOTO_SIZE};
pub use rules::{CategoryRules, RuleMatch};
