//! Channel integration: the dispatcher and its listener loop.

pub mod dispatcher;
