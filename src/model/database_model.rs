//! Database model representation

use std::collections::{BTreeMap, HashMap};

use serde::{Serialize, Serializer};

use super::{Function, Schema, Table, TableKind};

/// Composite (schema, table) key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey {
    pub schema: String,
    pub name: String,
}

impl TableKey {
    pub fn new(schema: &str, name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }
}

/// Composite (schema, signature) key; overloads get distinct keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionKey {
    pub schema: String,
    pub signature: String,
}

impl FunctionKey {
    pub fn new(schema: &str, signature: &str) -> Self {
        Self {
            schema: schema.to_string(),
            signature: signature.to_string(),
        }
    }
}

fn values_only<K, V: Serialize, S: Serializer>(
    map: &BTreeMap<K, V>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(map.values())
}

/// The metadata of one database, read-only after construction
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatabaseModel {
    pub name: String,
    pub comment: Option<String>,
    #[serde(serialize_with = "values_only")]
    pub(crate) schemas: BTreeMap<String, Schema>,
    #[serde(serialize_with = "values_only")]
    pub(crate) tables: BTreeMap<TableKey, Table>,
    #[serde(serialize_with = "values_only")]
    pub(crate) functions: BTreeMap<FunctionKey, Function>,
    /// lowercase schema -> schema name
    #[serde(skip)]
    pub(crate) schema_index: HashMap<String, String>,
    /// (lowercase schema, lowercase table) -> key
    #[serde(skip)]
    pub(crate) table_index: HashMap<(String, String), TableKey>,
    /// (lowercase schema, lowercase base name) -> retained overload
    #[serde(skip)]
    pub(crate) function_index: HashMap<(String, String), FunctionKey>,
}

impl DatabaseModel {
    pub fn schemas(&self) -> impl Iterator<Item = &Schema> {
        self.schemas.values()
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub fn schema_exists(&self, name: &str) -> bool {
        self.schema_index.contains_key(&name.to_lowercase())
    }

    pub fn table_exists(&self, schema: &str, name: &str) -> bool {
        self.table(schema, name).is_some()
    }

    /// Case-insensitive table lookup
    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.table_index
            .get(&(schema.to_lowercase(), name.to_lowercase()))
            .and_then(|key| self.tables.get(key))
    }

    pub fn table_kind(&self, schema: &str, name: &str) -> Option<TableKind> {
        self.table(schema, name).map(|t| t.kind)
    }

    /// Exact lookup by stored schema and signature
    pub fn function(&self, schema: &str, signature: &str) -> Option<&Function> {
        self.functions.get(&FunctionKey::new(schema, signature))
    }

    /// Signature of the overload retained for `name` in `schema`
    pub fn function_by_name(&self, schema: &str, name: &str) -> Option<&str> {
        self.function_index
            .get(&(schema.to_lowercase(), name.to_lowercase()))
            .map(|key| key.signature.as_str())
    }

    /// The retained overload for `name` in `schema`
    pub fn function_named(&self, schema: &str, name: &str) -> Option<&Function> {
        self.function_index
            .get(&(schema.to_lowercase(), name.to_lowercase()))
            .and_then(|key| self.functions.get(key))
    }

    pub(crate) fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.tables.values_mut()
    }

    pub(crate) fn functions_mut(&mut self) -> impl Iterator<Item = &mut Function> {
        self.functions.values_mut()
    }
}
