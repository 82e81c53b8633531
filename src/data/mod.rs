pub mod class;
pub mod id;
pub mod instructor;
pub mod memory;
pub mod selection;
pub mod store;

pub use id::RecordId;

pub mod filter {
    use bson::{doc, Document};

    use super::RecordId;

    #[inline]
    pub fn by_id(id: RecordId) -> Document {
        doc! { "_id": id }
    }

    /// Matches a selection whose seat accounting has completed.
    #[inline]
    pub fn confirmed_by_id(id: RecordId) -> Document {
        doc! { "_id": id, "pending": { "$ne": true } }
    }

    /// Matches a selection still waiting for its seat update.
    #[inline]
    pub fn pending_by_id(id: RecordId) -> Document {
        doc! { "_id": id, "pending": true }
    }

    #[inline]
    pub fn by_student_and_name(student_uid: impl AsRef<str>, name: impl AsRef<str>) -> Document {
        doc! {
            "studentUid": student_uid.as_ref(),
            "name": name.as_ref(),
        }
    }

    #[inline]
    pub fn by_student_and_payment(student_uid: impl AsRef<str>, is_paid: bool) -> Document {
        doc! {
            "studentUid": student_uid.as_ref(),
            "isPaid": is_paid,
            "pending": { "$ne": true },
        }
    }
}
