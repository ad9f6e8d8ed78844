mod model;
mod repository;

pub use model::{DEFAULT_RECENT_LIMIT, RecentDocumentEntry, RecentDocumentsLog};
pub use repository::RecentDocumentsStore;
