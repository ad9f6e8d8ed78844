//! Template catalog contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A read-only document template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, alias = "content")]
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Source of templates for new documents.
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    /// Returns `Ok(None)` when the catalog has no template with this id.
    async fn get_template(&self, id: &str) -> Result<Option<Template>>;
}
