//! Cross-crate integration scenarios.

pub mod failure_modes;
pub mod flows;
