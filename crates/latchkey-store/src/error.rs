/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store cannot be used on this device (missing
    /// directory, read-only filesystem, platform API refused).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Reading, writing, or erasing a key failed.
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The key contains characters no store can represent.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),
}

impl StoreError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}
