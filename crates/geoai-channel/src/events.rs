//! Events delivered to the caller side of a channel.

use std::fmt;

/// What the caller can observe on its inbound side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Wire text posted by the worker.
    Message(String),
    /// The transport itself failed; nothing more will arrive.
    Error(String),
}

impl ChannelEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, ChannelEvent::Error(_))
    }
}

impl fmt::Display for ChannelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelEvent::Message(wire) => write!(f, "message ({} bytes)", wire.len()),
            ChannelEvent::Error(reason) => write!(f, "error: {reason}"),
        }
    }
}
