/// Errors raised while loading or looking up catalog-endpoint configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The document was not valid YAML, or did not match the expected
    /// per-RSE shape.
    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The document has no top-level `rses` mapping.
    #[error("configuration has no top-level 'rses' mapping")]
    MissingRses,
    /// The requested RSE name has no entry in the document.
    #[error("no configuration found for RSE '{0}'")]
    UnknownRse(String),
    /// A per-RSE entry has no `server_root` set (required, per `spec.md`
    /// §6, to exit 2 before any scan begins).
    #[error("RSE '{0}' has no server_root configured")]
    MissingServerRoot(String),
}
