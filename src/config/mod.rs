//! Run configuration: name filters and layer/service registries

mod filter;
mod registry;

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::AutodocError;

pub use filter::{FilterPattern, ObjectFilter};
pub use registry::{Registries, RegistryEntry};

/// Per-schema table/function filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaTweaks {
    pub tables_whitelist_regex: Option<FilterPattern>,
    pub tables_blacklist_regex: Option<FilterPattern>,
    pub functions_whitelist_regex: Option<FilterPattern>,
    pub functions_blacklist_regex: Option<FilterPattern>,
}

/// Layer registry definition: one base URL plus per-layer query arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    pub url: String,
    pub arguments_names: Vec<String>,
    pub arguments_values: BTreeMap<String, Vec<String>>,
}

/// Contents of the JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutodocConfig {
    pub schemas_whitelist_regex: Option<FilterPattern>,
    pub schemas_blacklist_regex: Option<FilterPattern>,
    pub schema_tweaks: BTreeMap<String, SchemaTweaks>,
    pub layers: Option<LayersConfig>,
    pub services: BTreeMap<String, String>,
}

impl AutodocConfig {
    /// Filter applied to schema names
    pub fn schema_filter(&self) -> Result<ObjectFilter> {
        ObjectFilter::new(
            self.schemas_whitelist_regex.as_ref(),
            self.schemas_blacklist_regex.as_ref(),
        )
    }

    /// Filter applied to table names of `schema`
    pub fn table_filter(&self, schema: &str) -> Result<ObjectFilter> {
        match self.schema_tweaks.get(schema) {
            Some(tweaks) => ObjectFilter::new(
                tweaks.tables_whitelist_regex.as_ref(),
                tweaks.tables_blacklist_regex.as_ref(),
            ),
            None => Ok(ObjectFilter::accept_all()),
        }
    }

    /// Filter applied to function names of `schema`
    pub fn function_filter(&self, schema: &str) -> Result<ObjectFilter> {
        match self.schema_tweaks.get(schema) {
            Some(tweaks) => ObjectFilter::new(
                tweaks.functions_whitelist_regex.as_ref(),
                tweaks.functions_blacklist_regex.as_ref(),
            ),
            None => Ok(ObjectFilter::accept_all()),
        }
    }

    /// Build the layer and service registries
    pub fn registries(&self) -> Registries {
        Registries::from_config(self)
    }
}

/// Load the config file
pub fn load_config(path: &Path) -> Result<AutodocConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| AutodocError::ConfigReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = serde_json::from_str(&content).map_err(|e| AutodocError::ConfigParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(config)
}
