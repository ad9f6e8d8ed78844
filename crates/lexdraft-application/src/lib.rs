//! Application layer for Lexdraft.
//!
//! Coordinates the editing core with the persistence, template and
//! recent-documents collaborators.

pub mod autosave;
pub mod recent;
pub mod session;

pub use autosave::{AutosaveHandle, AutosaveReport, AutosaveScheduler};
pub use recent::RecentDocuments;
pub use session::{EditingSession, SessionNotice};
