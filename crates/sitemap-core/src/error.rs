//! Error types for sitemap-core

/// Result type for sitemap-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a reconciliation pass
///
/// Everything here is fatal to the pass that raised it: the pass stops
/// before emitting any action, existing entries are left untouched, and
/// the next trigger starts from scratch. Failures of individual actions
/// during execution are not errors in this sense; the executor logs
/// them and continues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured index root container is absent from the snapshot
    #[error("index root container not found: {id}")]
    IndexRootMissing { id: String },

    /// Two container groups normalized to the same entry name
    #[error("duplicate index entry name: {name}")]
    DuplicateEntryName { name: String },

    /// Platform error while fetching the snapshot
    #[error(transparent)]
    Platform(#[from] sitemap_platform::Error),

    /// TOML error while parsing configuration
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// I/O error while reading a configuration file
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
