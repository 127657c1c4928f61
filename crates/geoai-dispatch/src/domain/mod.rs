//! Domain types for the caller side.

pub mod config;
pub mod error;
pub mod pending;
