//! Loads a catalog-endpoint configuration document and resolves one
//! RSE's settings, deep-merging the `"*"` default entry underneath any
//! RSE-specific overrides.
//!
//! # Design
//!
//! Grounded in `config.py`'s `CEConfiguration.merge`: an override's
//! nested mapping recurses into the corresponding default sub-mapping
//! (falling back to an empty one); any other value type replaces the
//! default outright. This crate does the same merge over
//! `serde_yaml::Value` before deserializing the result into a typed
//! [`RseConfig`], so unknown/extra YAML keys are rejected the same way
//! regardless of whether they came from the defaults or the override.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;
use crate::settings::RseConfig;

/// All RSE configurations defined in one catalog-endpoint YAML document.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    by_rse: BTreeMap<String, RseConfig>,
}

impl CatalogConfig {
    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or any
    /// parsing error from [`CatalogConfig::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parses a catalog-endpoint document from its YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] on malformed YAML or a per-RSE entry
    /// that does not match [`RseConfig`]'s shape, [`ConfigError::MissingRses`]
    /// if there is no top-level `rses` mapping, and
    /// [`ConfigError::MissingServerRoot`] if a resolved RSE has an empty
    /// `server_root`.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_yaml::from_str(contents)?;
        let rses = document.get("rses").and_then(Value::as_mapping).ok_or(ConfigError::MissingRses)?.clone();

        let default_key = Value::String("*".to_string());
        let defaults = rses.get(&default_key).and_then(Value::as_mapping).cloned().unwrap_or_default();

        let mut by_rse = BTreeMap::new();
        for (key, value) in &rses {
            let Some(name) = key.as_str() else { continue };
            if name == "*" {
                continue;
            }
            let overrides = value.as_mapping().cloned().unwrap_or_default();
            let merged = merge(&defaults, &overrides);
            let mut config: RseConfig = serde_yaml::from_value(Value::Mapping(merged))?;
            config.rse = name.to_string();
            if config.scanner.server_root.trim().is_empty() {
                return Err(ConfigError::MissingServerRoot(name.to_string()));
            }
            by_rse.insert(name.to_string(), config);
        }
        Ok(Self { by_rse })
    }

    /// Looks up one RSE's resolved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownRse`] if `name` has no entry.
    pub fn rse(&self, name: &str) -> Result<&RseConfig, ConfigError> {
        self.by_rse.get(name).ok_or_else(|| ConfigError::UnknownRse(name.to_string()))
    }

    /// Iterates over every configured RSE name, in sorted order.
    pub fn rse_names(&self) -> impl Iterator<Item = &str> {
        self.by_rse.keys().map(String::as_str)
    }
}

fn merge(defaults: &Mapping, overrides: &Mapping) -> Mapping {
    let mut out = defaults.clone();
    for (key, value) in overrides {
        if let Value::Mapping(override_sub) = value {
            let default_sub = out.get(key).and_then(Value::as_mapping).cloned().unwrap_or_default();
            out.insert(key.clone(), Value::Mapping(merge(&default_sub, override_sub)));
        } else {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r"
rses:
  '*':
    npartitions: 4
    scanner:
      timeout: 120
      nworkers: 16
  RSE_A:
    scanner:
      server: xrootd.example.org
      server_root: /store
      roots:
        - path: /store/mc
  RSE_B:
    npartitions: 2
    scanner:
      server: other.example.org
      server_root: /data
      timeout: 60
      roots:
        - path: /data/raw
";

    #[test]
    fn rse_inherits_unset_fields_from_default_entry() {
        let config = CatalogConfig::parse(DOC).unwrap();
        let rse_a = config.rse("RSE_A").unwrap();
        assert_eq!(rse_a.npartitions, 4);
        assert_eq!(rse_a.scanner.timeout, 120);
        assert_eq!(rse_a.scanner.nworkers, 16);
        assert_eq!(rse_a.scanner.server, "xrootd.example.org");
        assert_eq!(rse_a.root_paths(), vec!["/store/mc".to_string()]);
    }

    #[test]
    fn rse_specific_overrides_beat_defaults() {
        let config = CatalogConfig::parse(DOC).unwrap();
        let rse_b = config.rse("RSE_B").unwrap();
        assert_eq!(rse_b.npartitions, 2);
        assert_eq!(rse_b.scanner.timeout, 60);
        // nworkers was not overridden, so it still falls back to the default entry.
        assert_eq!(rse_b.scanner.nworkers, 16);
    }

    #[test]
    fn default_entry_itself_is_not_a_selectable_rse() {
        let config = CatalogConfig::parse(DOC).unwrap();
        assert!(config.rse("*").is_err());
        assert_eq!(config.rse_names().collect::<Vec<_>>(), vec!["RSE_A", "RSE_B"]);
    }

    #[test]
    fn missing_rses_key_is_an_error() {
        let err = CatalogConfig::parse("not_rses: {}").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRses));
    }

    #[test]
    fn unknown_rse_lookup_is_an_error() {
        let config = CatalogConfig::parse(DOC).unwrap();
        assert!(matches!(config.rse("does-not-exist"), Err(ConfigError::UnknownRse(_))));
    }

    #[test]
    fn empty_server_root_is_rejected() {
        let doc = r"
rses:
  RSE_C:
    scanner:
      server: x
      server_root: ''
";
        let err = CatalogConfig::parse(doc).unwrap_err();
        assert!(matches!(err, ConfigError::MissingServerRoot(_)));
    }
}
