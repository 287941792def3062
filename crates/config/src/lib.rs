#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! YAML-backed per-RSE scan settings.
//!
//! # Overview
//!
//! A catalog-endpoint configuration document lists one entry per RSE
//! (storage endpoint) under a top-level `rses` mapping, plus an optional
//! `"*"` entry giving defaults every other entry inherits from (deep
//! merged, not shallow — grounded in `config.py`'s `CEConfiguration`).
//! [`CatalogConfig::load`] parses the document and [`CatalogConfig::rse`]
//! resolves one RSE's settings into a typed [`RseConfig`].
//!
//! ```
//! use config::CatalogConfig;
//!
//! let doc = r"
//! rses:
//!   '*':
//!     scanner:
//!       timeout: 120
//!   EXAMPLE_RSE:
//!     scanner:
//!       server: xrootd.example.org
//!       server_root: /store
//!       roots:
//!         - path: /store/mc
//! ";
//! let config = CatalogConfig::parse(doc).unwrap();
//! let rse = config.rse("EXAMPLE_RSE").unwrap();
//! assert_eq!(rse.scanner.timeout, 120);
//! assert_eq!(rse.root_paths(), vec!["/store/mc".to_string()]);
//! ```

pub mod document;
pub mod error;
pub mod settings;

pub use document::CatalogConfig;
pub use error::ConfigError;
pub use settings::{RootConfig, RseConfig, ScanSettings};
