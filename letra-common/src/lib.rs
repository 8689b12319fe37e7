//! # Letra Common Library
//!
//! Shared code for the Letra songwriting/production-planning services:
//! - Project tree data model (words, verses, strophes, song metadata)
//! - Ordered-collection operations (reorder, move, insert, remove)
//! - Bulk-lyrics importer
//! - Meter-analysis request/response types with defensive validation
//! - Production planning records (budget, wardrobe, contracts, release)
//! - Completion gating predicates
//! - Configuration loading and database access

pub mod config;
pub mod db;
pub mod error;
pub mod gating;
pub mod meter;
pub mod model;
pub mod planning;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use model::Project;
