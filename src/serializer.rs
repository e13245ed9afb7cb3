use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::SerializerError;

/// Value ⇄ byte-string codec used by the cache facade.
///
/// Implementations must round-trip any serde-representable value. A decode
/// failure on a corrupt blob is recoverable: the facade treats it as a
/// cache miss, never as a fatal error.
pub trait Serializer {
    fn serialize<V: Serialize>(&self, value: &V) -> Result<Vec<u8>, SerializerError>;

    fn unserialize<V: DeserializeOwned>(&self, blob: &[u8]) -> Result<V, SerializerError>;
}

/// JSON codec. Human-readable payloads, useful when inspecting what a
/// filesystem adapter wrote.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn serialize<V: Serialize>(&self, value: &V) -> Result<Vec<u8>, SerializerError> {
        serde_json::to_vec(value).map_err(|e| SerializerError::Encode(e.to_string()))
    }

    fn unserialize<V: DeserializeOwned>(&self, blob: &[u8]) -> Result<V, SerializerError> {
        serde_json::from_slice(blob).map_err(|e| SerializerError::Decode(e.to_string()))
    }
}

/// Bincode codec. Compact payloads for adapters where nobody reads the
/// bytes by hand.
#[derive(Debug, Default, Clone, Copy)]
pub struct BincodeSerializer;

impl Serializer for BincodeSerializer {
    fn serialize<V: Serialize>(&self, value: &V) -> Result<Vec<u8>, SerializerError> {
        bincode::serialize(value).map_err(|e| SerializerError::Encode(e.to_string()))
    }

    fn unserialize<V: DeserializeOwned>(&self, blob: &[u8]) -> Result<V, SerializerError> {
        bincode::deserialize(blob).map_err(|e| SerializerError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        user: String,
        logins: u32,
    }

    #[test]
    fn json_round_trips_structs() {
        let session = Session {
            user: "ada".to_string(),
            logins: 3,
        };
        let blob = JsonSerializer.serialize(&session).unwrap();
        let back: Session = JsonSerializer.unserialize(&blob).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn bincode_round_trips_structs() {
        let session = Session {
            user: "ada".to_string(),
            logins: 3,
        };
        let blob = BincodeSerializer.serialize(&session).unwrap();
        let back: Session = BincodeSerializer.unserialize(&blob).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn corrupt_blob_is_a_decode_error() {
        let result: Result<Session, _> = JsonSerializer.unserialize(b"{not json");
        assert!(matches!(result, Err(SerializerError::Decode(_))));
    }
}
