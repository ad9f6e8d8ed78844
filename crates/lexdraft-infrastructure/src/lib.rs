pub mod config_service;
pub mod memory;
pub mod paths;
pub mod recent_store;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::memory::{InMemoryDocumentRepository, InMemoryTemplateCatalog, RepositoryCalls};
pub use crate::paths::{LexdraftPaths, ServiceType};
pub use crate::recent_store::TomlRecentDocumentsStore;
