use mongodb::options::FindOptions;
use mongodb::Database;
use rocket::futures::TryStreamExt;

use super::{Instructor, INSTRUCTOR_COLLECTION_NAME};
use crate::data::store::InstructorStore;
use crate::error::StoreError;

#[rocket::async_trait]
impl InstructorStore for Database {
    async fn list_instructors(&self, limit: Option<i64>) -> Result<Vec<Instructor>, StoreError> {
        let options = FindOptions::builder().limit(limit).build();

        let instructors = self
            .collection::<Instructor>(INSTRUCTOR_COLLECTION_NAME)
            .find(None, options)
            .await?
            .try_collect()
            .await?;

        Ok(instructors)
    }
}
