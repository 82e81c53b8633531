use std::fmt;
use std::str::FromStr;

use bson::oid::{self, ObjectId};
use bson::Bson;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::ToSchema;

/// Identifier of a stored document.
///
/// Kept as a BSON ObjectId in the database and exchanged as its 24 hex digit
/// form in JSON, paths and query strings. Documents whose `_id` was written as
/// a hex string are read as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[schema(value_type = String)]
pub struct RecordId(ObjectId);

impl RecordId {
    pub fn new() -> RecordId {
        RecordId(ObjectId::new())
    }

    pub fn object_id(self) -> ObjectId {
        self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::new()
    }
}

impl From<ObjectId> for RecordId {
    fn from(value: ObjectId) -> Self {
        RecordId(value)
    }
}

impl From<RecordId> for Bson {
    fn from(value: RecordId) -> Self {
        Bson::ObjectId(value.0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl FromStr for RecordId {
    type Err = oid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s).map(RecordId)
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Bson::deserialize(deserializer)? {
            Bson::ObjectId(oid) => Ok(RecordId(oid)),
            Bson::String(hex) => hex.parse().map_err(serde::de::Error::custom),
            other => Err(serde::de::Error::custom(format!(
                "expected an ObjectId, found {:?}",
                other.element_type()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn object_id_and_hex_string_both_read() {
        let oid = ObjectId::new();

        let native: RecordId = bson::from_bson(Bson::ObjectId(oid)).expect("native ObjectId");
        let hex: RecordId = bson::from_bson(Bson::String(oid.to_hex())).expect("hex string");
        assert_eq!(native, hex);
        assert_eq!(native.object_id(), oid);

        assert!(bson::from_bson::<RecordId>(Bson::Int32(7)).is_err());
    }

    #[test]
    fn json_form_is_hex() {
        let id = RecordId::new();
        let json = serde_json::to_value(id).expect("serializable");
        assert_eq!(json, serde_json::json!(id.object_id().to_hex()));

        let back: RecordId = serde_json::from_value(json).expect("deserializable");
        assert_eq!(back, id);
    }

    #[test]
    fn filters_use_native_object_id() {
        let id = RecordId::new();
        let filter = doc! { "_id": id };
        assert_eq!(filter.get_object_id("_id").ok(), Some(id.object_id()));
    }

    #[test]
    fn malformed_ids_are_rejected() {
        assert!("not-an-id".parse::<RecordId>().is_err());
        assert!("64b7f0c2a1e4d53f2c9b1a7".parse::<RecordId>().is_err());
        assert!("64b7f0c2a1e4d53f2c9b1a70".parse::<RecordId>().is_ok());
    }
}
