use bson::doc;
use mongodb::options::FindOptions;
use mongodb::Database;
use rocket::futures::TryStreamExt;

use super::{ClassQuery, ClassRecord, ClassStatus, SeatUpdate, CLASS_COLLECTION_NAME};
use crate::data::{filter, RecordId};
use crate::data::store::{ClassStore, UpdateOutcome};
use crate::error::StoreError;

#[rocket::async_trait]
impl ClassStore for Database {
    async fn list_classes(&self, query: ClassQuery) -> Result<Vec<ClassRecord>, StoreError> {
        let filter = query
            .approved_only
            .then(|| doc! { "status": ClassStatus::Approved.as_str() });

        let options = FindOptions::builder()
            .limit(query.limit)
            .sort(query.most_enrolled_first.then(|| doc! { "enroll": -1 }))
            .build();

        let classes = self
            .collection::<ClassRecord>(CLASS_COLLECTION_NAME)
            .find(filter, options)
            .await?
            .try_collect()
            .await?;

        Ok(classes)
    }

    async fn get_class(&self, id: RecordId) -> Result<Option<ClassRecord>, StoreError> {
        Ok(self
            .collection::<ClassRecord>(CLASS_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await?)
    }

    async fn update_seats(
        &self,
        id: RecordId,
        seats: SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let update = doc! {
            "$set": {
                "availableSeats": i64::from(seats.available_seats),
                "enroll": i64::from(seats.enroll),
            }
        };

        let result = self
            .collection::<ClassRecord>(CLASS_COLLECTION_NAME)
            .update_one(filter::by_id(id), update, None)
            .await?;

        Ok(result.into())
    }

    async fn set_status(
        &self,
        id: RecordId,
        status: ClassStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        let result = self
            .collection::<ClassRecord>(CLASS_COLLECTION_NAME)
            .update_one(
                filter::by_id(id),
                doc! { "$set": { "status": status.as_str() } },
                None,
            )
            .await?;

        Ok(result.into())
    }
}
