//! Ports (hexagonal architecture)
//!
//! - Inbound: [`SessionApi`], what the message handler drives
//! - Outbound: [`PipelineFactory`] and [`Pipeline`], the ML backend

pub mod inbound;
pub mod outbound;

pub use inbound::SessionApi;
pub use outbound::{Pipeline, PipelineFactory};
