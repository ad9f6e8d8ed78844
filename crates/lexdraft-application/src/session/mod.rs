//! Editing session services.
//!
//! This module contains the multi-document session that owns open records,
//! the active tab and the save/close discipline around them.

mod manager;
mod notice;

pub use manager::EditingSession;
pub use notice::SessionNotice;
