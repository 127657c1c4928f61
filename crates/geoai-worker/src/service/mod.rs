//! Service layer

pub mod session_manager;

pub use session_manager::PipelineSessionManager;
