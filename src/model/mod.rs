//! Database metadata model

mod acl;
mod builder;
mod database_model;
mod elements;

pub use acl::{parse_acl, AclItem};
pub use builder::{build_model, ModelBuilder};
pub use database_model::{DatabaseModel, FunctionKey, TableKey};
pub use elements::*;
