//! Build the metadata model from catalog rows
//!
//! `ModelBuilder` owns every table and function while the snapshot is being
//! normalised; `build_model` drives it through the per-table fan-out
//! (columns, keys, foreign keys, indexes, inheritance, ACL, statistics).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::catalog::{
    CatalogSnapshot, CheckConstraintRow, ColumnRow, ForeignKeyRow, FunctionRow, IndexRow,
    InheritanceRow, KeyConstraintRow, StatisticsRow, TableRow, TypeRef,
};
use crate::config::{AutodocConfig, ObjectFilter};
use crate::error::AutodocError;

use super::acl::parse_acl;
use super::{
    CheckConstraint, Column, ColumnConstraint, DatabaseModel, ForeignKeyMembership, Function,
    FunctionKey, Index, InheritanceParent, KeyMembership, Parameter, Permission, Schema, Table,
    TableKey, TableKind, TableStatistics,
};

/// Types from this schema are rendered without a schema prefix
const SYSTEM_SCHEMA: &str = "pg_catalog";

/// Column list of an index definition: the group right after
/// `USING <method>`, ahead of any `INCLUDE (...)` or `WHERE` clause
static KEY_COLUMNS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bUSING\s+\w+\s*\(([^)]+)\)").expect("Invalid key columns regex")
});
static FIRST_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("Invalid first group regex"));

/// Accumulates model elements with typed upserts
#[derive(Debug, Default)]
pub struct ModelBuilder {
    name: String,
    comment: Option<String>,
    schemas: BTreeMap<String, Schema>,
    tables: BTreeMap<TableKey, Table>,
    functions: BTreeMap<FunctionKey, Function>,
}

impl ModelBuilder {
    pub fn new(database: &str) -> Self {
        Self {
            name: database.to_string(),
            ..Default::default()
        }
    }

    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment;
    }

    pub fn upsert_schema(&mut self, name: &str, comment: Option<&str>) {
        let schema = self
            .schemas
            .entry(name.to_string())
            .or_insert_with(|| Schema {
                name: name.to_string(),
                comment: None,
            });
        if comment.is_some() {
            schema.comment = comment.map(str::to_string);
        }
    }

    fn table_entry(&mut self, key: &TableKey) -> &mut Table {
        self.tables
            .entry(key.clone())
            .or_insert_with(|| Table::new(&key.schema, &key.name, TableKind::Table))
    }

    /// Create the table if needed and set its kind
    pub fn upsert_table(&mut self, key: &TableKey, kind: TableKind) -> &mut Table {
        let table = self.table_entry(key);
        table.kind = kind;
        table
    }

    /// Insert or replace a column, keeping attribute-number order
    pub fn upsert_column(&mut self, key: &TableKey, column: Column) {
        let table = self.table_entry(key);
        if let Some(existing) = table.column_mut(&column.name) {
            *existing = column;
            table.columns.sort_by_key(|c| c.position);
            return;
        }
        let at = table
            .columns
            .partition_point(|c| c.position < column.position);
        table.columns.insert(at, column);
    }

    /// Record a key membership on an existing column.
    ///
    /// Returns false when the column is unknown.
    pub fn add_column_constraint(
        &mut self,
        key: &TableKey,
        column: &str,
        constraint: ColumnConstraint,
    ) -> bool {
        match self.table_entry(key).column_mut(column) {
            Some(col) => {
                col.constraints.push(constraint);
                true
            }
            None => false,
        }
    }

    pub fn add_check_constraint(&mut self, key: &TableKey, constraint: CheckConstraint) {
        self.table_entry(key).check_constraints.push(constraint);
    }

    pub fn add_index(&mut self, key: &TableKey, index: Index) {
        self.table_entry(key).indexes.push(index);
    }

    pub fn add_inheritance(&mut self, key: &TableKey, parent: InheritanceParent) {
        self.table_entry(key).inherits.insert(parent);
    }

    pub fn grant(&mut self, key: &TableKey, grantee: &str, permission: Permission) {
        self.table_entry(key)
            .acl
            .entry(grantee.to_string())
            .or_default()
            .insert(permission);
    }

    pub fn set_statistics(&mut self, key: &TableKey, statistics: TableStatistics) {
        self.table_entry(key).statistics = Some(statistics);
    }

    pub fn upsert_function(&mut self, function: Function) {
        let key = FunctionKey::new(&function.schema, &function.signature);
        self.functions.insert(key, function);
    }

    /// Freeze the model and build its lookup indexes
    pub fn finish(self) -> DatabaseModel {
        let schema_index = self
            .schemas
            .keys()
            .map(|name| (name.to_lowercase(), name.clone()))
            .collect();

        let table_index = self
            .tables
            .keys()
            .map(|key| {
                (
                    (key.schema.to_lowercase(), key.name.to_lowercase()),
                    key.clone(),
                )
            })
            .collect();

        // Keys iterate in signature order, so the lexically greatest
        // signature of each base name is the one left in the index.
        let mut function_index: HashMap<(String, String), FunctionKey> = HashMap::new();
        let mut overloads: BTreeMap<(String, String), usize> = BTreeMap::new();
        for (key, function) in &self.functions {
            let name_key = (key.schema.to_lowercase(), function.name.to_lowercase());
            *overloads.entry(name_key.clone()).or_default() += 1;
            function_index.insert(name_key, key.clone());
        }
        for ((schema, name), count) in &overloads {
            if *count > 1 {
                let kept = &function_index[&(schema.clone(), name.clone())];
                warn!(
                    "{}.{} has {} overloads; references by name resolve to {}",
                    schema, name, count, kept.signature
                );
            }
        }

        DatabaseModel {
            name: self.name,
            comment: self.comment,
            schemas: self.schemas,
            tables: self.tables,
            functions: self.functions,
            schema_index,
            table_index,
            function_index,
        }
    }
}

/// Catalog rows grouped by the relation they belong to
struct CatalogIndex<'a> {
    relations: HashMap<u32, &'a TableRow>,
    attributes: HashMap<(u32, i16), &'a str>,
    columns: HashMap<u32, Vec<&'a ColumnRow>>,
    checks: HashMap<u32, Vec<&'a CheckConstraintRow>>,
    keys: HashMap<u32, Vec<&'a KeyConstraintRow>>,
    foreign_keys: HashMap<u32, Vec<&'a ForeignKeyRow>>,
    statistics: HashMap<u32, &'a StatisticsRow>,
    indexes: HashMap<(&'a str, &'a str), Vec<&'a IndexRow>>,
    inheritance: HashMap<(&'a str, &'a str), Vec<&'a InheritanceRow>>,
    kept_schemas: HashSet<&'a str>,
}

fn group_by_oid<T>(rows: &[T], oid: impl Fn(&T) -> u32) -> HashMap<u32, Vec<&T>> {
    let mut grouped: HashMap<u32, Vec<&T>> = HashMap::new();
    for row in rows {
        grouped.entry(oid(row)).or_default().push(row);
    }
    grouped
}

impl<'a> CatalogIndex<'a> {
    fn new(snapshot: &'a CatalogSnapshot, kept_schemas: HashSet<&'a str>) -> Self {
        let mut indexes: HashMap<(&str, &str), Vec<&IndexRow>> = HashMap::new();
        for row in &snapshot.indexes {
            indexes
                .entry((row.schema.as_str(), row.table.as_str()))
                .or_default()
                .push(row);
        }

        let mut inheritance: HashMap<(&str, &str), Vec<&InheritanceRow>> = HashMap::new();
        for row in &snapshot.inheritance {
            inheritance
                .entry((row.schema.as_str(), row.table.as_str()))
                .or_default()
                .push(row);
        }

        Self {
            relations: snapshot.tables.iter().map(|t| (t.oid, t)).collect(),
            attributes: snapshot
                .columns
                .iter()
                .map(|c| ((c.table_oid, c.attnum), c.name.as_str()))
                .collect(),
            columns: group_by_oid(&snapshot.columns, |c| c.table_oid),
            checks: group_by_oid(&snapshot.check_constraints, |c| c.table_oid),
            keys: group_by_oid(&snapshot.key_constraints, |k| k.table_oid),
            foreign_keys: group_by_oid(&snapshot.foreign_keys, |f| f.table_oid),
            statistics: snapshot
                .statistics
                .iter()
                .map(|s| (s.table_oid, s))
                .collect(),
            indexes,
            inheritance,
            kept_schemas,
        }
    }

    fn attribute_name(&self, constraint: &str, table_oid: u32, attnum: i16) -> Result<String> {
        self.attributes
            .get(&(table_oid, attnum))
            .map(|name| name.to_string())
            .ok_or_else(|| {
                AutodocError::UnknownColumnNumber {
                    constraint: constraint.to_string(),
                    table_oid,
                    attnum,
                }
                .into()
            })
    }
}

/// Build a database model from a catalog snapshot
pub fn build_model(snapshot: &CatalogSnapshot, config: &AutodocConfig) -> Result<DatabaseModel> {
    let schema_filter = config.schema_filter()?;
    let mut builder = ModelBuilder::new(&snapshot.database);
    builder.set_comment(snapshot.comment.clone());

    let mut kept_schemas = HashSet::new();
    for schema in &snapshot.schemas {
        if schema_filter.accepts(&schema.name) {
            kept_schemas.insert(schema.name.as_str());
            builder.upsert_schema(&schema.name, schema.comment.as_deref());
        } else {
            debug!("Skipping schema {}", schema.name);
        }
    }

    let mut table_filters: HashMap<&str, ObjectFilter> = HashMap::new();
    let mut function_filters: HashMap<&str, ObjectFilter> = HashMap::new();
    for schema in &kept_schemas {
        table_filters.insert(*schema, config.table_filter(schema)?);
        function_filters.insert(*schema, config.function_filter(schema)?);
    }

    let index = CatalogIndex::new(snapshot, kept_schemas);

    for table in &snapshot.tables {
        let accepted = table_filters
            .get(table.schema.as_str())
            .is_some_and(|filter| filter.accepts(&table.name));
        if accepted {
            add_table(&mut builder, &index, table)?;
        }
    }

    for function in &snapshot.functions {
        let accepted = function_filters
            .get(function.schema.as_str())
            .is_some_and(|filter| filter.accepts(&function.name));
        if accepted {
            builder.upsert_function(function_from_row(function));
        }
    }

    let model = builder.finish();
    info!(
        "Loaded {} schemas, {} tables, {} functions from {}",
        model.schemas.len(),
        model.table_count(),
        model.function_count(),
        model.name
    );
    Ok(model)
}

fn add_table(builder: &mut ModelBuilder, index: &CatalogIndex, row: &TableRow) -> Result<()> {
    let key = TableKey::new(&row.schema, &row.name);
    let kind = TableKind::from_catalog(&row.kind);

    let table = builder.upsert_table(&key, kind);
    table.description = row.description.clone();
    table.view_definition = row.view_definition.clone();

    if let Some(acl) = &row.acl {
        let items = parse_acl(acl).map_err(|entry| AutodocError::MalformedAcl {
            schema: row.schema.clone(),
            table: row.name.clone(),
            entry,
        })?;
        for item in items {
            for permission in item.permissions {
                builder.grant(&key, &item.grantee, permission);
            }
        }
    }

    if kind == TableKind::Table {
        if let Some(stats) = index.statistics.get(&row.oid) {
            builder.set_statistics(
                &key,
                TableStatistics {
                    table_len: stats.table_len,
                    tuple_count: stats.tuple_count,
                    tuple_len: stats.tuple_len,
                    dead_tuple_len: stats.dead_tuple_len,
                    free_space: stats.free_space,
                },
            );
        }
    }

    for check in index.checks.get(&row.oid).into_iter().flatten() {
        builder.add_check_constraint(
            &key,
            CheckConstraint {
                name: check.name.clone(),
                source: check.source.clone(),
            },
        );
    }

    for column in index.columns.get(&row.oid).into_iter().flatten() {
        builder.upsert_column(
            &key,
            Column {
                name: column.name.clone(),
                data_type: column.type_name.clone(),
                is_nullable: !column.not_null,
                default_value: column.default.clone(),
                description: column.description.clone(),
                position: column.attnum,
                constraints: Vec::new(),
            },
        );
    }

    add_key_constraints(builder, index, row, &key);
    add_foreign_keys(builder, index, row, &key)?;

    let name_key = (row.schema.as_str(), row.name.as_str());
    for idx in index.indexes.get(&name_key).into_iter().flatten() {
        builder.add_index(
            &key,
            Index {
                name: idx.name.clone(),
                definition: idx.definition.clone(),
            },
        );
    }

    for inherit in index.inheritance.get(&name_key).into_iter().flatten() {
        if index.kept_schemas.contains(inherit.parent_schema.as_str()) {
            builder.add_inheritance(
                &key,
                InheritanceParent {
                    schema: inherit.parent_schema.clone(),
                    table: inherit.parent_table.clone(),
                },
            );
        }
    }

    Ok(())
}

/// Column names of a key constraint, taken from its index definition
pub(crate) fn key_columns(definition: &str) -> Vec<String> {
    let list = KEY_COLUMNS_RE
        .captures(definition)
        .or_else(|| FIRST_GROUP_RE.captures(definition))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(definition);

    list.split(',')
        .map(|c| c.trim().trim_matches('"').to_string())
        .collect()
}

/// PRIMARY KEY and UNIQUE constraints. Constraints spanning two or more
/// columns get a group number, counted per table in discovery order.
fn add_key_constraints(
    builder: &mut ModelBuilder,
    index: &CatalogIndex,
    row: &TableRow,
    key: &TableKey,
) {
    let mut group = 0;
    for constraint in index.keys.get(&row.oid).into_iter().flatten() {
        let columns = key_columns(&constraint.definition);
        let group_number = if columns.len() >= 2 {
            group += 1;
            Some(group)
        } else {
            None
        };

        for (i, column) in columns.iter().enumerate() {
            let membership = KeyMembership {
                constraint_name: constraint.name.clone(),
                position: i + 1,
                group: group_number,
            };
            let column_constraint = match constraint.constraint_type.as_str() {
                "PRIMARY KEY" => ColumnConstraint::PrimaryKey(membership),
                "UNIQUE" => ColumnConstraint::Unique(membership),
                other => {
                    warn!(
                        "Ignoring constraint {} of unexpected type {}",
                        constraint.name, other
                    );
                    break;
                }
            };
            attach_constraint(builder, key, &constraint.name, column, column_constraint);
        }
    }
}

/// Attach a constraint to a column, skipping it with a warning when the
/// table has no such column
fn attach_constraint(
    builder: &mut ModelBuilder,
    key: &TableKey,
    constraint_name: &str,
    column: &str,
    constraint: ColumnConstraint,
) -> bool {
    let attached = builder.add_column_constraint(key, column, constraint);
    if !attached {
        warn!(
            "Constraint {} on {}.{} names unknown column {}",
            constraint_name, key.schema, key.name, column
        );
    }
    attached
}

fn add_foreign_keys(
    builder: &mut ModelBuilder,
    index: &CatalogIndex,
    row: &TableRow,
    key: &TableKey,
) -> Result<()> {
    let mut group = 0;
    for fk in index.foreign_keys.get(&row.oid).into_iter().flatten() {
        let referenced = index
            .relations
            .get(&fk.referenced_table_oid)
            .ok_or(AutodocError::UnknownTableOid {
                oid: fk.referenced_table_oid,
            })?;

        if !index.kept_schemas.contains(referenced.schema.as_str()) {
            debug!(
                "Skipping foreign key {} into filtered schema {}",
                fk.name, referenced.schema
            );
            continue;
        }

        let local = fk
            .columns
            .iter()
            .map(|attnum| index.attribute_name(&fk.name, row.oid, *attnum))
            .collect::<Result<Vec<_>>>()?;
        let remote = fk
            .referenced_columns
            .iter()
            .map(|attnum| index.attribute_name(&fk.name, referenced.oid, *attnum))
            .collect::<Result<Vec<_>>>()?;

        if local.len() != remote.len() {
            return Err(AutodocError::ForeignKeyColumnMismatch {
                constraint: fk.name.clone(),
                local: local.len(),
                referenced: remote.len(),
            }
            .into());
        }

        let group_number = if local.len() >= 2 {
            group += 1;
            Some(group)
        } else {
            None
        };

        for (i, (column, referenced_column)) in local.iter().zip(&remote).enumerate() {
            attach_constraint(
                builder,
                key,
                &fk.name,
                column,
                ColumnConstraint::ForeignKey(ForeignKeyMembership {
                    constraint_name: fk.name.clone(),
                    position: i + 1,
                    group: group_number,
                    referenced_schema: referenced.schema.clone(),
                    referenced_table: referenced.name.clone(),
                    referenced_column: referenced_column.clone(),
                }),
            );
        }
    }

    Ok(())
}

fn type_name(type_ref: &TypeRef) -> String {
    if type_ref.schema == SYSTEM_SCHEMA {
        type_ref.name.clone()
    } else {
        format!("{}.{}", type_ref.schema, type_ref.name)
    }
}

fn function_from_row(row: &FunctionRow) -> Function {
    let parameters: Vec<Parameter> = row
        .arg_types
        .iter()
        .enumerate()
        .map(|(i, arg_type)| Parameter {
            name: row.arg_names.get(i).filter(|n| !n.is_empty()).cloned(),
            type_name: type_name(arg_type),
        })
        .collect();

    let returns = if row.returns_set {
        format!("SET OF {}", row.return_type.name)
    } else {
        row.return_type.name.clone()
    };

    Function {
        schema: row.schema.clone(),
        name: row.name.clone(),
        signature: Function::render_signature(&row.name, &parameters),
        parameters,
        returns,
        source: row.source.clone(),
        language: row.language.clone(),
        comment: row.comment.clone(),
        keywords: Vec::new(),
    }
}
