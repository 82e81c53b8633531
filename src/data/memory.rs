use std::sync::{Mutex, MutexGuard};

use super::class::{ClassQuery, ClassRecord, ClassStatus, SeatUpdate};
use super::instructor::Instructor;
use super::selection::SelectionRecord;
use super::store::{ClassStore, DeleteOutcome, InstructorStore, SelectionStore, UpdateOutcome};
use super::RecordId;
use crate::error::StoreError;

/// Process-local store with the same observable semantics as the MongoDB
/// collections, including the unique `(studentUid, name)` selection rule.
#[derive(Debug, Default)]
pub struct MemoryStore {
    classes: Mutex<Vec<ClassRecord>>,
    selections: Mutex<Vec<SelectionRecord>>,
    instructors: Mutex<Vec<Instructor>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

fn limited<T>(items: impl Iterator<Item = T>, limit: Option<i64>) -> Vec<T> {
    match limit {
        Some(l) if l > 0 => items.take(l as usize).collect(),
        _ => items.collect(),
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn insert_class(&self, class: ClassRecord) -> Result<(), StoreError> {
        let mut classes = lock(&self.classes)?;
        classes.retain(|it| it.id != class.id);
        classes.push(class);
        Ok(())
    }

    pub fn insert_instructor(&self, instructor: Instructor) -> Result<(), StoreError> {
        let mut instructors = lock(&self.instructors)?;
        instructors.retain(|it| it.id != instructor.id);
        instructors.push(instructor);
        Ok(())
    }

    fn update_class(
        &self,
        id: RecordId,
        apply: impl FnOnce(&mut ClassRecord) -> bool,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut classes = lock(&self.classes)?;
        Ok(match classes.iter_mut().find(|it| it.id == id) {
            Some(class) => UpdateOutcome {
                matched_count: 1,
                modified_count: u64::from(apply(class)),
            },
            None => UpdateOutcome::default(),
        })
    }
}

#[rocket::async_trait]
impl ClassStore for MemoryStore {
    async fn list_classes(&self, query: ClassQuery) -> Result<Vec<ClassRecord>, StoreError> {
        let mut classes: Vec<ClassRecord> = lock(&self.classes)?
            .iter()
            .filter(|it| !query.approved_only || it.status == ClassStatus::Approved)
            .cloned()
            .collect();

        if query.most_enrolled_first {
            classes.sort_by(|a, b| b.enroll.cmp(&a.enroll));
        }

        Ok(limited(classes.into_iter(), query.limit))
    }

    async fn get_class(&self, id: RecordId) -> Result<Option<ClassRecord>, StoreError> {
        Ok(lock(&self.classes)?.iter().find(|it| it.id == id).cloned())
    }

    async fn update_seats(
        &self,
        id: RecordId,
        seats: SeatUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        self.update_class(id, |class| {
            let changed = class.available_seats != seats.available_seats
                || class.enroll != seats.enroll;
            class.available_seats = seats.available_seats;
            class.enroll = seats.enroll;
            changed
        })
    }

    async fn set_status(
        &self,
        id: RecordId,
        status: ClassStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        self.update_class(id, |class| {
            let changed = class.status != status;
            class.status = status;
            changed
        })
    }
}

#[rocket::async_trait]
impl SelectionStore for MemoryStore {
    async fn find_selection(
        &self,
        student_uid: &str,
        name: &str,
    ) -> Result<Option<SelectionRecord>, StoreError> {
        Ok(lock(&self.selections)?
            .iter()
            .find(|it| it.student_uid == student_uid && it.name == name)
            .cloned())
    }

    async fn insert_selection(&self, record: &SelectionRecord) -> Result<RecordId, StoreError> {
        let mut selections = lock(&self.selections)?;

        if selections
            .iter()
            .any(|it| it.student_uid == record.student_uid && it.name == record.name)
        {
            return Err(StoreError::Duplicate {
                student_uid: record.student_uid.clone(),
                name: record.name.clone(),
            });
        }

        selections.push(record.clone());
        Ok(record.id)
    }

    async fn confirm_selection(&self, id: RecordId) -> Result<UpdateOutcome, StoreError> {
        let mut selections = lock(&self.selections)?;
        Ok(match selections.iter_mut().find(|it| it.id == id && it.pending) {
            Some(selection) => {
                selection.pending = false;
                UpdateOutcome {
                    matched_count: 1,
                    modified_count: 1,
                }
            }
            None => UpdateOutcome::default(),
        })
    }

    async fn discard_pending_selection(&self, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        let mut selections = lock(&self.selections)?;
        let before = selections.len();
        selections.retain(|it| !(it.id == id && it.pending));

        Ok(DeleteOutcome {
            deleted_count: (before - selections.len()) as u64,
        })
    }

    async fn list_selections(
        &self,
        student_uid: &str,
        is_paid: bool,
    ) -> Result<Vec<SelectionRecord>, StoreError> {
        Ok(lock(&self.selections)?
            .iter()
            .filter(|it| !it.pending && it.student_uid == student_uid && it.is_paid == is_paid)
            .cloned()
            .collect())
    }

    async fn mark_paid(&self, id: RecordId) -> Result<UpdateOutcome, StoreError> {
        let mut selections = lock(&self.selections)?;
        Ok(match selections.iter_mut().find(|it| it.id == id && !it.pending) {
            Some(selection) => {
                let modified = !selection.is_paid;
                selection.is_paid = true;
                UpdateOutcome {
                    matched_count: 1,
                    modified_count: u64::from(modified),
                }
            }
            None => UpdateOutcome::default(),
        })
    }

    async fn delete_selection(&self, id: RecordId) -> Result<DeleteOutcome, StoreError> {
        let mut selections = lock(&self.selections)?;
        let before = selections.len();
        selections.retain(|it| it.id != id);

        Ok(DeleteOutcome {
            deleted_count: (before - selections.len()) as u64,
        })
    }
}

#[rocket::async_trait]
impl InstructorStore for MemoryStore {
    async fn list_instructors(&self, limit: Option<i64>) -> Result<Vec<Instructor>, StoreError> {
        let instructors = lock(&self.instructors)?;
        Ok(limited(instructors.iter().cloned(), limit))
    }
}

#[cfg(test)]
pub mod fixtures {
    use super::*;
    use crate::data::class::InstructorRef;
    use crate::data::selection::NewSelection;

    pub fn class(name: &str, seats: u32, enroll: u32, status: ClassStatus) -> ClassRecord {
        ClassRecord {
            id: RecordId::new(),
            name: name.to_string(),
            image: None,
            instructor: InstructorRef {
                name: "Mei Lin".to_string(),
                email: "mei.lin@example.com".to_string(),
            },
            price: 45.0,
            available_seats: seats,
            enroll,
            status,
        }
    }

    pub fn selection_of(class: &ClassRecord, student_uid: &str) -> NewSelection {
        NewSelection {
            name: class.name.clone(),
            student_uid: student_uid.to_string(),
            image: class.image.clone(),
            instructor_name: Some(class.instructor.name.clone()),
            price: Some(class.price),
        }
    }

    pub fn instructor(name: &str) -> Instructor {
        Instructor {
            id: RecordId::new(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            image: None,
        }
    }
}
