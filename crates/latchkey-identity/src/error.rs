//! Error types for the identity layer.

/// Errors that can occur while encoding, decoding, or constructing
/// identities.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// Serializing an identity failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A stored blob is not a well-formed identity: malformed JSON,
    /// missing fields, or wrong field types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A user id was empty.
    #[error("invalid user id: {0:?}")]
    InvalidId(String),
}
