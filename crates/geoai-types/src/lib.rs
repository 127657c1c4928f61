//! # GeoAI Types Crate
//!
//! This crate contains the message envelope that crosses the worker boundary,
//! the typed payload for every operation, and the codec that turns envelopes
//! into wire text and back.
//!
//! ## Design Principles
//!
//! - **Correlation by identifier**: every request carries a [`RequestId`]; the
//!   worker echoes it on the response. Ordering on the channel carries no
//!   meaning.
//! - **Validated payloads**: payloads are decoded into tagged variants
//!   ([`Request`], [`Response`]) before anything acts on them.
//! - **Immutable once sent**: envelopes are rendered to an owned `String`
//!   before they are posted.

pub mod codec;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod messages;

pub use codec::{decode, encode, encode_response, recover_id};
pub use envelope::{Envelope, MessageType};
pub use errors::DecodeError;
pub use ids::{InstanceId, RequestId, RequestIdGenerator};
pub use messages::*;
