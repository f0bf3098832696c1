//! Error types for pg-autodoc

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a documentation run
#[derive(Error, Debug)]
pub enum AutodocError {
    #[error("Failed to read catalog snapshot: {path}")]
    CatalogReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog snapshot: {path}")]
    CatalogParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read config file: {path}")]
    ConfigReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {path}")]
    ConfigParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid filter pattern: {pattern}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Malformed ACL entry '{entry}' on {schema}.{table}")]
    MalformedAcl {
        schema: String,
        table: String,
        entry: String,
    },

    #[error("Column {attnum} of relation {table_oid} referenced by {constraint} does not exist")]
    UnknownColumnNumber {
        constraint: String,
        table_oid: u32,
        attnum: i16,
    },

    #[error("Catalog row references unknown relation {oid}")]
    UnknownTableOid { oid: u32 },

    #[error(
        "FKEY {constraint} Broken -- {local} local columns vs {referenced} referenced columns, fix your PostgreSQL installation"
    )]
    ForeignKeyColumnMismatch {
        constraint: String,
        local: usize,
        referenced: usize,
    },

    #[error("Dependency node {child} inserted twice under {parent}")]
    DuplicateChild { parent: String, child: String },

    #[error("Cyclic dependency on {id} (path: {chain})")]
    CyclicDependency { id: String, chain: String },

    #[error("Failed to write output to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
