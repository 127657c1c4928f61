//! # GeoAI Test Suite
//!
//! Unified test crate for scenarios that span the caller and the worker.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Demo backends and a wired-up caller/worker pair
//! └── integration/      # End-to-end scenarios over a real channel
//!     ├── flows.rs          # init → call → dispose, concurrency
//!     └── failure_modes.rs  # timeouts, worker failure, termination
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p geoai-tests
//!
//! # By category
//! cargo test -p geoai-tests integration::flows::
//! cargo test -p geoai-tests integration::failure_modes::
//!
//! # Benchmarks
//! cargo bench -p geoai-tests
//! ```

#![allow(dead_code)]

pub mod fixtures;
pub mod integration;
