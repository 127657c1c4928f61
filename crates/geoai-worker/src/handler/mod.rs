//! Message handler: wire text in, wire text out.

pub mod message_handler;

pub use message_handler::MessageHandler;
