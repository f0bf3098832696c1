//! Reading catalog snapshots from disk

use std::path::Path;

use anyhow::Result;

use super::CatalogSnapshot;
use crate::error::AutodocError;

/// Read a catalog snapshot JSON file
pub fn read_snapshot(path: &Path) -> Result<CatalogSnapshot> {
    let content = std::fs::read_to_string(path).map_err(|e| AutodocError::CatalogReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_snapshot(&content).map_err(|e| {
        AutodocError::CatalogParseError {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

/// Parse a catalog snapshot from JSON text
pub fn parse_snapshot(content: &str) -> std::result::Result<CatalogSnapshot, serde_json::Error> {
    // Strip UTF-8 BOM if present
    let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
    serde_json::from_str(content)
}
