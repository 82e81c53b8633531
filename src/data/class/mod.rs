use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::RecordId;

pub mod db;

pub static CLASS_COLLECTION_NAME: &str = "class";

/// Admin review state of an offered class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl ClassStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClassStatus::Pending => "pending",
            ClassStatus::Approved => "approved",
            ClassStatus::Denied => "denied",
        }
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decision an admin can take on a pending class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Deny,
}

impl From<ApprovalDecision> for ClassStatus {
    fn from(value: ApprovalDecision) -> Self {
        match value {
            ApprovalDecision::Approve => ClassStatus::Approved,
            ApprovalDecision::Deny => ClassStatus::Denied,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InstructorRef {
    pub name: String,
    #[schema(format = "email")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    #[serde(rename = "_id", default)]
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    pub instructor: InstructorRef,
    #[serde(default)]
    pub price: f64,

    pub available_seats: u32,
    #[serde(default)]
    pub enroll: u32,
    #[serde(default)]
    pub status: ClassStatus,
}

/// New seat accounting values for a class, computed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeatUpdate {
    pub available_seats: u32,
    pub enroll: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassQuery {
    pub approved_only: bool,
    pub most_enrolled_first: bool,
    pub limit: Option<i64>,
}
