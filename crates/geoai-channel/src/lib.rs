//! # GeoAI Channel - Transport Between Caller and Worker
//!
//! One channel connects one caller context to one worker instance. The channel
//! moves opaque wire text; it knows nothing about envelopes or correlation.
//!
//! ```text
//! ┌──────────────┐   post(wire)        ┌──────────────┐
//! │    Caller    │ ──────────────────→ │    Worker    │
//! │  (dispatch)  │                     │  (sessions)  │
//! │              │ ←────────────────── │              │
//! └──────────────┘   Message | Error   └──────────────┘
//! ```
//!
//! The worker → caller direction carries [`ChannelEvent`]s so that a
//! transport-level failure (the analogue of a worker `onerror`) reaches the
//! caller through the same stream as ordinary messages.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod memory;
pub mod transport;

pub use events::ChannelEvent;
pub use memory::{
    channel_pair, CallerEndpoint, CallerPoster, CallerReceiver, WorkerEndpoint, WorkerPoster,
    WorkerReceiver,
};
pub use transport::{ChannelError, EventReceiver, MessagePoster, MessageReceiver};

/// Messages to buffer per direction before `post` waits.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
