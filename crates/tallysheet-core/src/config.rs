//! Store construction rules and their TOML configuration.
//!
//! [`SheetRules`] is what a [`Spreadsheet`](crate::Spreadsheet) is built
//! with: a validity predicate and a normalizer applied to every cell name
//! and formula variable, plus the version tag checked when a snapshot is
//! loaded. [`SheetConfig`] is the on-disk form of the same thing:
//!
//! ```toml
//! version = "ps6"
//! case = "upper"
//! name_pattern = "[A-Z]{1,2}[0-9]{1,3}"
//! max_name_len = 5
//! ```

use regex::Regex;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::PersistenceError;

pub const DEFAULT_VERSION: &str = "default";

const MAX_CONFIG_FILE_BYTES: u64 = 65_536; // 64 KiB

/// Predicate over normalized names.
pub type Validator = Arc<dyn Fn(&str) -> bool + Send + Sync>;
/// Name normalizer.
pub type Normalizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Naming rules and version tag fixed for the lifetime of a store.
#[derive(Clone)]
pub struct SheetRules {
    is_valid: Validator,
    normalize: Normalizer,
    version: String,
}

impl SheetRules {
    pub fn new<V, N>(is_valid: V, normalize: N, version: impl Into<String>) -> Self
    where
        V: Fn(&str) -> bool + Send + Sync + 'static,
        N: Fn(&str) -> String + Send + Sync + 'static,
    {
        SheetRules {
            is_valid: Arc::new(is_valid),
            normalize: Arc::new(normalize),
            version: version.into(),
        }
    }

    /// Accept-everything rules with identity normalization and `version`.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self::new(|_: &str| true, |name: &str| name.to_string(), version)
    }

    pub fn is_valid(&self, name: &str) -> bool {
        (self.is_valid)(name)
    }

    pub fn normalize(&self, name: &str) -> String {
        (self.normalize)(name)
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl Default for SheetRules {
    fn default() -> Self {
        Self::with_version(DEFAULT_VERSION)
    }
}

impl fmt::Debug for SheetRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetRules")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// How cell names are case-folded before use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameCase {
    #[default]
    Preserve,
    Upper,
    Lower,
}

impl NameCase {
    fn apply(self, name: &str) -> String {
        match self {
            NameCase::Preserve => name.to_string(),
            NameCase::Upper => name.to_ascii_uppercase(),
            NameCase::Lower => name.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct SheetConfig {
    pub version: String,
    pub case: NameCase,
    /// Regex a normalized name must match in full.
    pub name_pattern: Option<String>,
    pub max_name_len: Option<usize>,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            version: DEFAULT_VERSION.to_string(),
            case: NameCase::Preserve,
            name_pattern: None,
            max_name_len: None,
        }
    }
}

impl SheetConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, PersistenceError> {
        toml::from_str(content).map_err(|err| PersistenceError::Config(err.to_string()))
    }

    /// Read a config file, refusing anything over 64 KiB.
    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(PersistenceError::Config(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|err| match err {
            PersistenceError::Config(msg) => {
                PersistenceError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn into_rules(self) -> Result<SheetRules, PersistenceError> {
        let pattern = match &self.name_pattern {
            Some(pattern) => Some(Regex::new(&format!("^(?:{})$", pattern)).map_err(|err| {
                PersistenceError::Config(format!("Invalid name_pattern {:?}: {}", pattern, err))
            })?),
            None => None,
        };
        let max_len = self.max_name_len;
        let case = self.case;

        let is_valid = move |name: &str| {
            max_len.is_none_or(|max| name.len() <= max)
                && pattern.as_ref().is_none_or(|re| re.is_match(name))
        };
        Ok(SheetRules::new(
            is_valid,
            move |name: &str| case.apply(name),
            self.version,
        ))
    }
}
