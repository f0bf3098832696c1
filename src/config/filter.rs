//! Whitelist/blacklist name filters

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AutodocError;

/// A filter pattern as written in the config: one string, or a list of
/// fragments joined in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterPattern {
    Single(String),
    Parts(Vec<String>),
}

impl FilterPattern {
    pub fn to_pattern(&self) -> String {
        match self {
            FilterPattern::Single(s) => s.clone(),
            FilterPattern::Parts(parts) => parts.concat(),
        }
    }
}

/// Keeps a name iff it matches the whitelist and does not match the blacklist
#[derive(Debug, Clone)]
pub struct ObjectFilter {
    whitelist: Regex,
    blacklist: Regex,
}

const DEFAULT_WHITELIST: &str = "^";
const DEFAULT_BLACKLIST: &str = "^$";

impl ObjectFilter {
    pub fn new(
        whitelist: Option<&FilterPattern>,
        blacklist: Option<&FilterPattern>,
    ) -> Result<Self> {
        let whitelist = whitelist
            .map(FilterPattern::to_pattern)
            .unwrap_or_else(|| DEFAULT_WHITELIST.to_string());
        let blacklist = blacklist
            .map(FilterPattern::to_pattern)
            .unwrap_or_else(|| DEFAULT_BLACKLIST.to_string());

        Ok(Self {
            whitelist: compile(&whitelist)?,
            blacklist: compile(&blacklist)?,
        })
    }

    pub fn accept_all() -> Self {
        Self {
            whitelist: Regex::new(DEFAULT_WHITELIST).expect("Invalid default whitelist"),
            blacklist: Regex::new(DEFAULT_BLACKLIST).expect("Invalid default blacklist"),
        }
    }

    pub fn accepts(&self, name: &str) -> bool {
        self.whitelist.is_match(name) && !self.blacklist.is_match(name)
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        AutodocError::InvalidFilterPattern {
            pattern: pattern.to_string(),
            source: e,
        }
        .into()
    })
}
