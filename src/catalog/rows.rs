//! Raw catalog rows

use serde::{Deserialize, Serialize};

/// One database's worth of catalog rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSnapshot {
    /// Database name
    pub database: String,
    /// Database comment (shobj_description)
    pub comment: Option<String>,
    pub schemas: Vec<SchemaRow>,
    pub tables: Vec<TableRow>,
    pub columns: Vec<ColumnRow>,
    pub check_constraints: Vec<CheckConstraintRow>,
    pub key_constraints: Vec<KeyConstraintRow>,
    pub foreign_keys: Vec<ForeignKeyRow>,
    pub indexes: Vec<IndexRow>,
    pub inheritance: Vec<InheritanceRow>,
    pub functions: Vec<FunctionRow>,
    pub statistics: Vec<StatisticsRow>,
}

/// pg_namespace row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaRow {
    pub name: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// pg_class row for a table-like relation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRow {
    pub oid: u32,
    pub schema: String,
    pub name: String,
    /// "table", "view", "materialized view", "foreign table" or "special"
    pub kind: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Raw relacl text, e.g. `{postgres=arwdDxt/postgres,=r/postgres}`
    #[serde(default)]
    pub acl: Option<String>,
    #[serde(default)]
    pub view_definition: Option<String>,
}

/// pg_attribute row (dropped and system columns already excluded)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRow {
    pub table_oid: u32,
    pub attnum: i16,
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// CHECK constraint with its rendered source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConstraintRow {
    pub table_oid: u32,
    pub name: String,
    pub source: String,
}

/// PRIMARY KEY or UNIQUE constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConstraintRow {
    pub table_oid: u32,
    pub name: String,
    /// "PRIMARY KEY" or "UNIQUE"
    pub constraint_type: String,
    /// Backing index definition, e.g. `CREATE UNIQUE INDEX u ON t USING btree (a, b)`
    pub definition: String,
}

/// FOREIGN KEY constraint expressed in column numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyRow {
    pub table_oid: u32,
    pub name: String,
    /// conkey
    pub columns: Vec<i16>,
    /// confrelid
    pub referenced_table_oid: u32,
    /// confkey
    pub referenced_columns: Vec<i16>,
}

/// Non-unique index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRow {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub definition: String,
}

/// pg_inherits edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceRow {
    pub schema: String,
    pub table: String,
    pub parent_schema: String,
    pub parent_table: String,
}

/// Type reference as resolved from pg_type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub schema: String,
    pub name: String,
}

/// pg_proc row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRow {
    pub schema: String,
    pub name: String,
    pub language: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub arg_types: Vec<TypeRef>,
    /// proargnames; may be shorter than `arg_types` or empty
    #[serde(default)]
    pub arg_names: Vec<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub returns_set: bool,
    pub return_type: TypeRef,
}

/// pgstattuple output for one table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsRow {
    pub table_oid: u32,
    pub table_len: u64,
    pub tuple_count: u64,
    pub tuple_len: u64,
    pub dead_tuple_len: u64,
    pub free_space: u64,
}
