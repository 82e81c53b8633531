//! Class selection lifecycle.
//!
//! A selection starts unpaid when a student picks a class, becomes enrolled
//! once it is paid for, or is removed. Seat accounting on the class happens
//! once, when the selection is created; until it has landed the selection is
//! pending and can be neither listed nor paid for.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::data::class::{ApprovalDecision, ClassStatus, SeatUpdate};
use crate::data::selection::{NewSelection, SelectionRecord};
use crate::data::store::{ClassStore, DeleteOutcome, SelectionStore, Stores, UpdateOutcome};
use crate::data::RecordId;
use crate::error::{EnrollmentError, StoreError};

pub const ALREADY_SELECTED: &str = "already selected";

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum SelectOutcome {
    AlreadySelected {
        status: String,
    },
    Selected {
        #[serde(rename = "modifiedCount")]
        modified_count: u64,
        #[serde(rename = "insertedId")]
        inserted_id: RecordId,
    },
}

impl SelectOutcome {
    fn already_selected() -> SelectOutcome {
        SelectOutcome::AlreadySelected {
            status: ALREADY_SELECTED.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct Enrollment {
    classes: Arc<dyn ClassStore>,
    selections: Arc<dyn SelectionStore>,
}

impl std::fmt::Debug for Enrollment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Enrollment")
    }
}

impl Enrollment {
    pub fn new(classes: Arc<dyn ClassStore>, selections: Arc<dyn SelectionStore>) -> Enrollment {
        Enrollment {
            classes,
            selections,
        }
    }

    pub fn from_stores(stores: &Stores) -> Enrollment {
        Enrollment::new(stores.classes.clone(), stores.selections.clone())
    }

    /// Records a student's class selection and applies the caller's seat
    /// accounting to the class.
    ///
    /// The selection is stored first, as pending, so that the store's
    /// uniqueness rule settles concurrent requests for the same class. It is
    /// confirmed once the seat update lands. If the seat update fails or finds
    /// no class, the selection is deleted again, but only while still pending.
    pub async fn select_class(
        &self,
        class_id: RecordId,
        seats: SeatUpdate,
        selection: NewSelection,
    ) -> Result<SelectOutcome, EnrollmentError> {
        if self
            .selections
            .find_selection(&selection.student_uid, &selection.name)
            .await?
            .is_some()
        {
            tracing::debug!(
                "'{}' already selected by {}",
                selection.name,
                selection.student_uid
            );
            return Ok(SelectOutcome::already_selected());
        }

        let record = selection.into_record(class_id);
        let inserted_id = match self.selections.insert_selection(&record).await {
            Ok(id) => id,
            Err(StoreError::Duplicate { .. }) => {
                tracing::debug!(
                    "concurrent selection of '{}' by {} lost the race",
                    record.name,
                    record.student_uid
                );
                return Ok(SelectOutcome::already_selected());
            }
            Err(e) => return Err(e.into()),
        };

        let failure = match self.classes.update_seats(class_id, seats).await {
            Ok(outcome) if outcome.matched_count > 0 => {
                if let Err(e) = self.selections.confirm_selection(inserted_id).await {
                    tracing::error!(
                        "seats of class {} taken but selection {} stays pending: {}",
                        class_id,
                        inserted_id,
                        e
                    );
                    return Err(e.into());
                }
                tracing::info!(
                    "student {} selected class {} as {}",
                    record.student_uid,
                    class_id,
                    inserted_id
                );
                return Ok(SelectOutcome::Selected {
                    modified_count: outcome.modified_count,
                    inserted_id,
                });
            }
            Ok(_) => EnrollmentError::ClassNotFound(class_id),
            Err(e) => EnrollmentError::from(e),
        };

        tracing::warn!(
            "seat update for class {} failed ({}), removing selection {}",
            class_id,
            failure,
            inserted_id
        );
        match self.selections.discard_pending_selection(inserted_id).await {
            Ok(outcome) if outcome.deleted_count == 0 => tracing::warn!(
                "selection {} was no longer pending, left in place",
                inserted_id
            ),
            Ok(_) => {}
            Err(e) => tracing::error!(
                "unable to remove selection {} after failed seat update: {}",
                inserted_id,
                e
            ),
        }

        Err(failure)
    }

    /// Selections the student hasn't paid for yet.
    pub async fn list_selected(
        &self,
        student_uid: &str,
    ) -> Result<Vec<SelectionRecord>, EnrollmentError> {
        Ok(self.selections.list_selections(student_uid, false).await?)
    }

    /// Selections the student has paid for.
    pub async fn list_enrolled(
        &self,
        student_uid: &str,
    ) -> Result<Vec<SelectionRecord>, EnrollmentError> {
        Ok(self.selections.list_selections(student_uid, true).await?)
    }

    pub async fn mark_enrolled(
        &self,
        selection_id: RecordId,
    ) -> Result<UpdateOutcome, EnrollmentError> {
        let outcome = self.selections.mark_paid(selection_id).await?;
        tracing::info!(
            "selection {} marked as paid (modified: {})",
            selection_id,
            outcome.modified_count
        );
        Ok(outcome)
    }

    /// Deletes a selection. Seat counters of the class are left untouched.
    pub async fn remove_selection(
        &self,
        selection_id: RecordId,
    ) -> Result<DeleteOutcome, EnrollmentError> {
        let outcome = self.selections.delete_selection(selection_id).await?;
        tracing::info!(
            "selection {} removed (deleted: {})",
            selection_id,
            outcome.deleted_count
        );
        Ok(outcome)
    }

    pub async fn set_class_approval(
        &self,
        class_id: RecordId,
        decision: ApprovalDecision,
    ) -> Result<UpdateOutcome, EnrollmentError> {
        let status = ClassStatus::from(decision);
        let outcome = self.classes.set_status(class_id, status).await?;
        tracing::info!("class {} set to {}", class_id, status);
        Ok(outcome)
    }
}
