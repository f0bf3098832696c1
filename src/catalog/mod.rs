//! Catalog snapshot input
//!
//! The rows here are produced by an external data source (the catalog queries
//! are not part of this crate) and handed over as one JSON document.

mod rows;
mod snapshot_reader;

pub use rows::{
    CatalogSnapshot, CheckConstraintRow, ColumnRow, ForeignKeyRow, FunctionRow, IndexRow,
    InheritanceRow, KeyConstraintRow, SchemaRow, StatisticsRow, TableRow, TypeRef,
};
pub use snapshot_reader::{parse_snapshot, read_snapshot};
