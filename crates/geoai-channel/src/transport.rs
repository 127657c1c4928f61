//! # Transport Ports
//!
//! The boundary abstraction: something that can post wire text, and something
//! that yields what the other side posted. Dispatcher and worker runtime only
//! depend on these traits, so a different transport (a process pipe, a web
//! worker bridge) can be dropped in without touching either side.

use crate::events::ChannelEvent;
use async_trait::async_trait;
use thiserror::Error;

/// Errors from channel operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel was closed by either side.
    #[error("channel closed")]
    Closed,
    /// The transport failed.
    #[error("channel failed: {0}")]
    Failed(String),
}

/// Outbound half of a channel.
#[async_trait]
pub trait MessagePoster: Send + Sync {
    /// Post wire text to the other side.
    async fn post(&self, wire: String) -> Result<(), ChannelError>;

    /// Close the outbound half. Idempotent.
    fn close(&self);

    fn is_closed(&self) -> bool;
}

/// Inbound half on the caller side.
#[async_trait]
pub trait EventReceiver: Send {
    /// Next event, or `None` once the worker side is gone.
    async fn recv(&mut self) -> Option<ChannelEvent>;
}

/// Inbound half on the worker side.
#[async_trait]
pub trait MessageReceiver: Send {
    /// Next wire message, or `None` once the caller closed the channel.
    async fn recv(&mut self) -> Option<String>;
}
