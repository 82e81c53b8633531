use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::class::SeatUpdate;
use crate::data::RecordId;

pub mod db;

pub static SELECTION_COLLECTION_NAME: &str = "selectedClass";

/// A class a student has picked, pending or completed payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    #[serde(rename = "_id", default)]
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<RecordId>,
    pub name: String,
    pub student_uid: String,

    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,

    #[serde(default)]
    pub is_paid: bool,
    #[serde(default = "Utc::now")]
    pub selected_at: DateTime<Utc>,

    /// Set while the seat update of the class is outstanding. Pending
    /// selections block reselection but are neither listed nor payable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    #[schema(read_only)]
    pub pending: bool,
}

/// Class details a student submits when selecting a class.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSelection {
    pub name: String,
    pub student_uid: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub instructor_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl NewSelection {
    /// Builds the stored form of the selection, pending until the class
    /// seats are taken.
    pub fn into_record(self, class_id: RecordId) -> SelectionRecord {
        SelectionRecord {
            id: RecordId::new(),
            class_id: Some(class_id),
            name: self.name,
            student_uid: self.student_uid,
            image: self.image,
            instructor_name: self.instructor_name,
            price: self.price,
            is_paid: false,
            selected_at: Utc::now(),
            pending: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectClassData {
    pub class_updatable_data: SeatUpdate,
    pub selected_class_obj: NewSelection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};

    #[test]
    fn selection_document_without_workflow_fields_is_read() {
        let oid = ObjectId::new();
        let selection: SelectionRecord = bson::from_document(doc! {
            "_id": oid,
            "name": "Shotokan Karate",
            "studentUid": "student-a",
            "instructorName": "Kenji Sato",
            "price": 60.0,
            "isPaid": true,
        })
        .expect("selection document should deserialize");

        assert_eq!(selection.id.object_id(), oid);
        assert_eq!(selection.class_id, None);
        assert!(selection.is_paid);
        assert!(!selection.pending);
    }

    #[test]
    fn new_selections_start_pending() {
        let class_id = RecordId::new();
        let record = NewSelection {
            name: "Judo".to_string(),
            student_uid: "student-a".to_string(),
            image: None,
            instructor_name: None,
            price: None,
        }
        .into_record(class_id);

        assert!(record.pending);
        assert!(!record.is_paid);
        assert_eq!(record.class_id, Some(class_id));
    }
}
