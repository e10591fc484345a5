//! TOML configuration
//!
//! A config file mirrors [`FunnelOptions`]; rename rules are plain prefix
//! rewrites since a file cannot carry a closure.

use crate::options::FunnelOptions;
use funnel_core::{FunnelError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Funnel configuration as stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunnelConfig {
    /// Source sub-directory to project
    #[serde(default)]
    pub src_dir: String,

    /// Namespace in the output
    #[serde(default)]
    pub dest_dir: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    /// Treat a missing `src_dir` as empty (default: false)
    #[serde(default)]
    pub allow_empty: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,

    /// Prefix rewrites for file paths, first match wins
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rename: Vec<RenameRule>,
}

/// Rewrite a leading `from` of a source path into `to`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

impl RenameRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Parse a `FROM=TO` pair
    pub fn parse(spec: &str) -> Result<Self> {
        match spec.split_once('=') {
            Some((from, to)) if !from.is_empty() => Ok(Self::new(from, to)),
            _ => Err(FunnelError::Configuration(format!(
                "invalid rename rule `{}`, expected FROM=TO",
                spec
            ))),
        }
    }

    /// Rewritten path, if the rule applies
    pub fn apply(&self, path: &str) -> Option<String> {
        path.strip_prefix(self.from.as_str())
            .map(|rest| format!("{}{}", self.to, rest))
    }
}

impl FunnelConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|err| FunnelError::io(path, err))?;
        Self::parse(&contents)
    }

    /// Parse TOML text
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|err| FunnelError::Configuration(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(rule) = self.rename.iter().find(|rule| rule.from.is_empty()) {
            return Err(FunnelError::Configuration(format!(
                "rename rule to `{}` has an empty `from`",
                rule.to
            )));
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| FunnelError::Configuration(err.to_string()))
    }

    /// Convert into engine options
    pub fn into_options(self) -> FunnelOptions {
        let rename = self.rename;

        FunnelOptions {
            src_dir: self.src_dir,
            dest_dir: self.dest_dir,
            include: self.include,
            exclude: self.exclude,
            files: self.files.map(crate::options::FileList::Static),
            get_destination_path: if rename.is_empty() {
                None
            } else {
                Some(Box::new(move |path: &str| {
                    rename
                        .iter()
                        .find_map(|rule| rule.apply(path))
                        .unwrap_or_else(|| path.to_string())
                }))
            },
            allow_empty: self.allow_empty,
            annotation: self.annotation,
        }
    }
}

/// Commented template for a new config file
pub fn example_config() -> &'static str {
    r#"# Sub-directory of the source tree to project ("" = everything)
src_dir = "src"

# Namespace the projection lands under in the output ("" = output root)
dest_dir = "lib"

# Gitignore-style globs; a file (or one of its parents) must match
include = ["**/*.js"]

# Globs that drop a file or a whole directory
exclude = ["**/*.test.js"]

# Exact relative paths (cannot be combined with include/exclude)
# files = ["index.js"]

# Treat a missing src_dir as an empty tree instead of failing
allow_empty = false

# Name used in logs
annotation = "scripts"

# Prefix rewrites applied to file paths, first match wins
[[rename]]
from = "legacy/"
to = "compat/"
"#
}
