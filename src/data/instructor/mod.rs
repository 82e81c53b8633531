use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::RecordId;

pub mod db;

pub static INSTRUCTOR_COLLECTION_NAME: &str = "instructor";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    #[serde(rename = "_id", default)]
    pub id: RecordId,
    pub name: String,
    #[schema(format = "email")]
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};

    #[test]
    fn instructor_document_with_object_id_is_read() {
        let oid = ObjectId::new();
        let instructor: Instructor = bson::from_document(doc! {
            "_id": oid,
            "name": "Kenji Sato",
            "email": "kenji.sato@example.com",
        })
        .expect("instructor document should deserialize");

        assert_eq!(instructor.id.object_id(), oid);
        assert_eq!(instructor.image, None);
        assert_eq!(
            serde_json::to_value(&instructor).unwrap()["_id"],
            oid.to_hex().as_str()
        );
    }
}
