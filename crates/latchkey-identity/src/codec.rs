//! Codec trait and implementations for identity blobs.
//!
//! The session store holds strings, so a signed-in identity has to be
//! turned into one before it's written and parsed back when the app
//! starts. The session layer doesn't care HOW; it only needs something
//! that implements [`Codec`].
//!
//! [`JsonCodec`] is the default and produces the flat
//! `{"id","name","email","phone"}` object.

use serde::{de::DeserializeOwned, Serialize};

use crate::IdentityError;

/// Encodes values to storable strings and decodes them back.
///
/// `Send + Sync + 'static` because the codec lives inside the session
/// manager, which is shared across tasks for the lifetime of the app.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a string.
    ///
    /// # Errors
    /// Returns `IdentityError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, IdentityError>;

    /// Parses a string back into a value.
    ///
    /// # Errors
    /// Returns `IdentityError::Decode` if the input is malformed or
    /// doesn't have the expected shape.
    fn decode<T: DeserializeOwned>(&self, blob: &str) -> Result<T, IdentityError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ```rust
/// use latchkey_identity::{Codec, Identity, JsonCodec, UserId};
///
/// let identity = Identity {
///     id: UserId::new("1").unwrap(),
///     name: "A".into(),
///     email: "a@x.com".into(),
///     phone: "+911111111111".into(),
/// };
///
/// let blob = JsonCodec.encode(&identity).unwrap();
/// let decoded: Identity = JsonCodec.decode(&blob).unwrap();
/// assert_eq!(identity, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, IdentityError> {
        serde_json::to_string(value).map_err(IdentityError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, blob: &str) -> Result<T, IdentityError> {
        serde_json::from_str(blob).map_err(IdentityError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Identity, UserId};

    fn sample() -> Identity {
        Identity {
            id: UserId::new("1700000000000").unwrap(),
            name: "A".into(),
            email: "a@x.com".into(),
            phone: "+911111111111".into(),
        }
    }

    #[test]
    fn test_encode_produces_flat_object() {
        let blob = JsonCodec.encode(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&blob).unwrap();

        assert_eq!(value["id"], "1700000000000");
        assert_eq!(value["name"], "A");
        assert_eq!(value["email"], "a@x.com");
        assert_eq!(value["phone"], "+911111111111");
        assert_eq!(value.as_object().unwrap().len(), 4);
    }

    #[test]
    fn test_decode_blob_written_by_other_clients() {
        // Field order and whitespace don't matter.
        let blob = r#"{ "phone": "+917011270902", "email": "e@x.com",
                        "name": "N", "id": "0" }"#;

        let identity: Identity = JsonCodec.decode(blob).unwrap();

        assert_eq!(identity.id.as_str(), "0");
        assert_eq!(identity.phone, "+917011270902");
    }

    #[test]
    fn test_decode_garbled_blob_fails() {
        let result: Result<Identity, _> = JsonCodec.decode("{not json");
        assert!(matches!(result, Err(IdentityError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_field_fails() {
        let result: Result<Identity, _> =
            JsonCodec.decode(r#"{"id":"1","name":"A","email":"a@x.com"}"#);
        assert!(matches!(result, Err(IdentityError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_id_fails() {
        let result: Result<Identity, _> = JsonCodec.decode(
            r#"{"id":"","name":"A","email":"a@x.com","phone":"+911111111111"}"#,
        );
        assert!(matches!(result, Err(IdentityError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_type_fails() {
        let result: Result<Identity, _> = JsonCodec.decode(
            r#"{"id":1,"name":"A","email":"a@x.com","phone":"+911111111111"}"#,
        );
        assert!(matches!(result, Err(IdentityError::Decode(_))));
    }
}
