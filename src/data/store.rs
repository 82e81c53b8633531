//! Storage seams of the backend.
//!
//! Handlers and the enrollment workflow never reach for a database handle
//! directly; they receive a [Stores] bundle whose members may be backed by
//! MongoDB or by the in-memory store.

use std::sync::Arc;

use mongodb::results::{DeleteResult, UpdateResult};
use mongodb::Database;
use serde::Serialize;
use utoipa::ToSchema;

use super::class::{ClassQuery, ClassRecord, ClassStatus, SeatUpdate};
use super::instructor::Instructor;
use super::memory::MemoryStore;
use super::selection::SelectionRecord;
use super::RecordId;
use crate::error::StoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateResult> for UpdateOutcome {
    fn from(value: UpdateResult) -> Self {
        UpdateOutcome {
            matched_count: value.matched_count,
            modified_count: value.modified_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteOutcome {
    fn from(value: DeleteResult) -> Self {
        DeleteOutcome {
            deleted_count: value.deleted_count,
        }
    }
}

#[rocket::async_trait]
pub trait ClassStore: Send + Sync {
    async fn list_classes(&self, query: ClassQuery) -> Result<Vec<ClassRecord>, StoreError>;

    async fn get_class(&self, id: RecordId) -> Result<Option<ClassRecord>, StoreError>;

    /// Overwrites the seat accounting counters of a class.
    async fn update_seats(
        &self,
        id: RecordId,
        seats: SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError>;

    async fn set_status(
        &self,
        id: RecordId,
        status: ClassStatus,
    ) -> Result<UpdateOutcome, StoreError>;
}

#[rocket::async_trait]
pub trait SelectionStore: Send + Sync {
    /// Finds a selection of class `name` by the student, paid or not.
    async fn find_selection(
        &self,
        student_uid: &str,
        name: &str,
    ) -> Result<Option<SelectionRecord>, StoreError>;

    /// Stores a new selection.
    ///
    /// Fails with [StoreError::Duplicate] if the student already has a
    /// selection with the same class name.
    async fn insert_selection(&self, record: &SelectionRecord) -> Result<RecordId, StoreError>;

    /// Clears the pending flag once the class seats were taken.
    async fn confirm_selection(&self, id: RecordId) -> Result<UpdateOutcome, StoreError>;

    /// Deletes the selection only while it is still pending.
    async fn discard_pending_selection(&self, id: RecordId) -> Result<DeleteOutcome, StoreError>;

    /// Confirmed selections of the student with the given payment state.
    async fn list_selections(
        &self,
        student_uid: &str,
        is_paid: bool,
    ) -> Result<Vec<SelectionRecord>, StoreError>;

    /// Marks a confirmed selection as paid. Pending selections don't match.
    async fn mark_paid(&self, id: RecordId) -> Result<UpdateOutcome, StoreError>;

    async fn delete_selection(&self, id: RecordId) -> Result<DeleteOutcome, StoreError>;
}

#[rocket::async_trait]
pub trait InstructorStore: Send + Sync {
    async fn list_instructors(&self, limit: Option<i64>) -> Result<Vec<Instructor>, StoreError>;
}

#[derive(Clone)]
pub struct Stores {
    pub classes: Arc<dyn ClassStore>,
    pub selections: Arc<dyn SelectionStore>,
    pub instructors: Arc<dyn InstructorStore>,
}

impl Stores {
    pub fn mongodb(db: Database) -> Stores {
        let db = Arc::new(db);
        Stores {
            classes: db.clone(),
            selections: db.clone(),
            instructors: db,
        }
    }

    pub fn memory(store: Arc<MemoryStore>) -> Stores {
        Stores {
            classes: store.clone(),
            selections: store.clone(),
            instructors: store,
        }
    }
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stores")
    }
}
