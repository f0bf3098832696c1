//! Metadata model element types

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::annotation::Keyword;

/// Kind of a table-like relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    Table,
    View,
    MaterializedView,
    ForeignTable,
    Special,
}

impl TableKind {
    /// Parse the relation kind as reported by the catalog query
    pub fn from_catalog(kind: &str) -> Self {
        match kind.to_lowercase().as_str() {
            "table" => TableKind::Table,
            "materialized view" => TableKind::MaterializedView,
            "foreign table" => TableKind::ForeignTable,
            "special" => TableKind::Special,
            // relkind 'v' and anything unrecognised are reported as views
            _ => TableKind::View,
        }
    }

    /// Catalog spelling, e.g. "materialized view"
    pub fn catalog_name(&self) -> &'static str {
        match self {
            TableKind::Table => "table",
            TableKind::View => "view",
            TableKind::MaterializedView => "materialized view",
            TableKind::ForeignTable => "foreign table",
            TableKind::Special => "special",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_name())
    }
}

impl Serialize for TableKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.catalog_name())
    }
}

/// Schema element
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    pub name: String,
    pub comment: Option<String>,
}

/// Membership of a column in a PRIMARY KEY or UNIQUE constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMembership {
    pub constraint_name: String,
    /// 1-based position of the column within the constraint
    pub position: usize,
    /// Only set when the constraint spans two or more columns
    pub group: Option<u32>,
}

/// Membership of a column in a FOREIGN KEY constraint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyMembership {
    pub constraint_name: String,
    pub position: usize,
    pub group: Option<u32>,
    pub referenced_schema: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

/// Constraint a column takes part in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnConstraint {
    PrimaryKey(KeyMembership),
    Unique(KeyMembership),
    ForeignKey(ForeignKeyMembership),
}

impl ColumnConstraint {
    pub fn constraint_name(&self) -> &str {
        match self {
            ColumnConstraint::PrimaryKey(m) | ColumnConstraint::Unique(m) => &m.constraint_name,
            ColumnConstraint::ForeignKey(m) => &m.constraint_name,
        }
    }

    pub fn group(&self) -> Option<u32> {
        match self {
            ColumnConstraint::PrimaryKey(m) | ColumnConstraint::Unique(m) => m.group,
            ColumnConstraint::ForeignKey(m) => m.group,
        }
    }
}

/// Column element
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    /// Catalog attribute number
    pub position: i16,
    /// Key and foreign key memberships, in discovery order
    pub constraints: Vec<ColumnConstraint>,
}

impl Column {
    /// True when the column is part of the primary key (NOT NULL is then implied)
    pub fn is_primary_key(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ColumnConstraint::PrimaryKey(_)))
    }
}

/// Named CHECK constraint
#[derive(Debug, Clone, Serialize)]
pub struct CheckConstraint {
    pub name: String,
    pub source: String,
}

/// Index element
#[derive(Debug, Clone, Serialize)]
pub struct Index {
    pub name: String,
    pub definition: String,
}

/// Inheritance parent
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct InheritanceParent {
    pub schema: String,
    pub table: String,
}

/// Privilege granted through an ACL entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    Insert,
    Select,
    Update,
    Delete,
    Rule,
    References,
    Trigger,
    /// Letter without a known meaning, kept as `FLAG_<letter>`
    Flag(char),
}

impl Permission {
    pub fn from_flag(flag: char) -> Self {
        match flag {
            'a' => Permission::Insert,
            'r' => Permission::Select,
            'w' => Permission::Update,
            'd' => Permission::Delete,
            'R' => Permission::Rule,
            'x' => Permission::References,
            't' => Permission::Trigger,
            other => Permission::Flag(other),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Insert => f.write_str("INSERT"),
            Permission::Select => f.write_str("SELECT"),
            Permission::Update => f.write_str("UPDATE"),
            Permission::Delete => f.write_str("DELETE"),
            Permission::Rule => f.write_str("RULE"),
            Permission::References => f.write_str("REFERENCES"),
            Permission::Trigger => f.write_str("TRIGGER"),
            Permission::Flag(c) => write!(f, "FLAG_{}", c),
        }
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Page-level statistics (pgstattuple)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStatistics {
    pub table_len: u64,
    pub tuple_count: u64,
    pub tuple_len: u64,
    pub dead_tuple_len: u64,
    pub free_space: u64,
}

/// Table-like relation
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
    pub description: Option<String>,
    pub view_definition: Option<String>,
    /// Ordered by attribute number
    pub columns: Vec<Column>,
    pub check_constraints: Vec<CheckConstraint>,
    pub indexes: Vec<Index>,
    pub inherits: BTreeSet<InheritanceParent>,
    /// grantee -> granted permissions
    pub acl: BTreeMap<String, BTreeSet<Permission>>,
    pub statistics: Option<TableStatistics>,
    /// Annotation keywords found in `description`
    pub keywords: Vec<Keyword>,
}

impl Table {
    pub fn new(schema: &str, name: &str, kind: TableKind) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
            kind,
            description: None,
            view_definition: None,
            columns: Vec::new(),
            check_constraints: Vec::new(),
            indexes: Vec::new(),
            inherits: BTreeSet::new(),
            acl: BTreeMap::new(),
            statistics: None,
            keywords: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: Option<String>,
    /// Type name, schema-qualified unless it lives in pg_catalog
    pub type_name: String,
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", name, self.type_name),
            None => f.write_str(&self.type_name),
        }
    }
}

/// Function element
#[derive(Debug, Clone, Serialize)]
pub struct Function {
    pub schema: String,
    /// Base name without arguments
    pub name: String,
    /// `name(arg1, arg2, ...)`; identifies the overload
    pub signature: String,
    pub parameters: Vec<Parameter>,
    /// Return type, prefixed with `SET OF ` for set-returning functions
    pub returns: String,
    pub source: String,
    pub language: String,
    pub comment: Option<String>,
    /// Annotation keywords found in `comment`
    pub keywords: Vec<Keyword>,
}

impl Function {
    pub fn render_signature(name: &str, parameters: &[Parameter]) -> String {
        let args: Vec<String> = parameters.iter().map(ToString::to_string).collect();
        format!("{}({})", name, args.join(", "))
    }
}
