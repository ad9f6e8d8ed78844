pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod outline;
pub mod recent;
pub mod template;

// Re-export common error type
pub use error::LexdraftError;
