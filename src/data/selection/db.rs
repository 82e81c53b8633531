use bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use rocket::futures::TryStreamExt;

use super::{SelectionRecord, SELECTION_COLLECTION_NAME};
use crate::data::{filter, RecordId};
use crate::data::store::{DeleteOutcome, SelectionStore, UpdateOutcome};
use crate::error::StoreError;

const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY_CODE
    )
}

/// Stored form of a selection with `_id` as a native ObjectId.
pub(crate) fn selection_document(record: &SelectionRecord) -> Result<Document, StoreError> {
    let mut document = bson::to_document(record)?;
    document.insert("_id", record.id);
    Ok(document)
}

/// Creates the unique `(studentUid, name)` index that keeps concurrent
/// selections of the same class from both being stored.
pub async fn ensure_indexes(db: &Database) -> Result<(), StoreError> {
    let index = IndexModel::builder()
        .keys(doc! { "studentUid": 1, "name": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .name("student_class_unique".to_string())
                .build(),
        )
        .build();

    db.collection::<SelectionRecord>(SELECTION_COLLECTION_NAME)
        .create_index(index, None)
        .await?;

    Ok(())
}

#[rocket::async_trait]
impl SelectionStore for Database {
    async fn find_selection(
        &self,
        student_uid: &str,
        name: &str,
    ) -> Result<Option<SelectionRecord>, StoreError> {
        Ok(self
            .collection::<SelectionRecord>(SELECTION_COLLECTION_NAME)
            .find_one(filter::by_student_and_name(student_uid, name), None)
            .await?)
    }

    async fn insert_selection(&self, record: &SelectionRecord) -> Result<RecordId, StoreError> {
        match self
            .collection::<Document>(SELECTION_COLLECTION_NAME)
            .insert_one(selection_document(record)?, None)
            .await
        {
            Ok(_) => Ok(record.id),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate {
                student_uid: record.student_uid.clone(),
                name: record.name.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn confirm_selection(&self, id: RecordId) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection::<SelectionRecord>(SELECTION_COLLECTION_NAME)
            .update_one(
                filter::pending_by_id(id),
                doc! { "$unset": { "pending": "" } },
                None,
            )
            .await?;

        Ok(result.into())
    }

    async fn discard_pending_selection(&self, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        let result = self
            .collection::<SelectionRecord>(SELECTION_COLLECTION_NAME)
            .delete_one(filter::pending_by_id(id), None)
            .await?;

        Ok(result.into())
    }

    async fn list_selections(
        &self,
        student_uid: &str,
        is_paid: bool,
    ) -> Result<Vec<SelectionRecord>, StoreError> {
        let selections = self
            .collection::<SelectionRecord>(SELECTION_COLLECTION_NAME)
            .find(filter::by_student_and_payment(student_uid, is_paid), None)
            .await?
            .try_collect()
            .await?;

        Ok(selections)
    }

    async fn mark_paid(&self, id: RecordId) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection::<SelectionRecord>(SELECTION_COLLECTION_NAME)
            .update_one(
                filter::confirmed_by_id(id),
                doc! { "$set": { "isPaid": true } },
                None,
            )
            .await?;

        Ok(result.into())
    }

    async fn delete_selection(&self, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        let result = self
            .collection::<SelectionRecord>(SELECTION_COLLECTION_NAME)
            .delete_one(filter::by_id(id), None)
            .await?;

        Ok(result.into())
    }
}
