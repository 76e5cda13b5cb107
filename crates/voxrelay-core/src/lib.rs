//! # voxrelay-core
//!
//! Core crate for VoxRelay. Contains configuration schemas, typed
//! identifiers (device keys, connection IDs) and the unified error system.
//!
//! This crate has **no** internal dependencies on other VoxRelay crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
