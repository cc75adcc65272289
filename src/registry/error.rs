//! Registry error types.

/// Errors from building or querying the source registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The requested source id is not registered.
    #[error("Unknown source: {id}")]
    UnknownSource {
        /// The id that was asked for.
        id: String,
        /// Every registered id, in declaration order.
        available: Vec<String>,
    },

    /// A source was declared with an empty id.
    #[error("Source id must not be empty")]
    EmptyId,

    /// Two sources share an id.
    #[error("Duplicate source id: {0}")]
    DuplicateId(String),

    /// A base path is absolute or leaves the knowledge root.
    #[error("Source {id} has an invalid base path: {path}")]
    InvalidBasePath { id: String, path: String },

    /// A declared index or allow-listed file leaves the source.
    #[error("Source {id} declares an invalid file: {file}")]
    InvalidFile { id: String, file: String },
}
