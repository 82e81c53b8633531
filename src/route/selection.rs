use rocket::serde::json::Json;
use rocket::State;

use crate::data::class::ApprovalDecision;
use crate::data::selection::{SelectClassData, SelectionRecord};
use crate::data::store::{DeleteOutcome, UpdateOutcome};
use crate::data::RecordId;
use crate::enrollment::{Enrollment, SelectOutcome};
use crate::resp::jwt::AccessToken;
use crate::resp::problem::{problems, Problem};

fn record_id(value: &str) -> Result<RecordId, Problem> {
    value.parse().map_err(|_| problems::invalid_id(value))
}

/// Select a class for a student
///
/// Stores the selection and applies the submitted seat counters to the class.
/// Selecting a class the student already has responds with
/// `{"status": "already selected"}` and changes nothing.
#[utoipa::path(
    request_body = SelectClassData,
    params(
        ("id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Selection result", body = SelectOutcome),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 404, description = "Class doesn't exist", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[post("/selectedClass/<id>", format = "application/json", data = "<data>")]
#[tracing::instrument]
pub async fn select_class(
    id: &str,
    data: Json<SelectClassData>,
    token: AccessToken,
    enrollment: &State<Enrollment>,
) -> Result<Json<SelectOutcome>, Problem> {
    let data = data.into_inner();
    let outcome = enrollment
        .select_class(record_id(id)?, data.class_updatable_data, data.selected_class_obj)
        .await?;

    Ok(Json(outcome))
}

/// List classes a student selected but hasn't paid for
#[utoipa::path(
    params(
        ("uid", description = "student UID")
    ),
    responses(
        (status = 200, description = "Unpaid selections", body = Vec<SelectionRecord>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/student/<uid>/selectedClass")]
#[tracing::instrument]
pub async fn selected_list(
    uid: &str,
    token: AccessToken,
    enrollment: &State<Enrollment>,
) -> Result<Json<Vec<SelectionRecord>>, Problem> {
    Ok(Json(enrollment.list_selected(uid).await?))
}

/// List classes a student is enrolled in
#[utoipa::path(
    params(
        ("uid", description = "student UID")
    ),
    responses(
        (status = 200, description = "Paid selections", body = Vec<SelectionRecord>),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[get("/student/<uid>/enrolledClass")]
#[tracing::instrument]
pub async fn enrolled_list(
    uid: &str,
    token: AccessToken,
    enrollment: &State<Enrollment>,
) -> Result<Json<Vec<SelectionRecord>>, Problem> {
    Ok(Json(enrollment.list_enrolled(uid).await?))
}

/// Mark a selection as paid
#[utoipa::path(
    params(
        ("user", description = "student UID"),
        ("enrollClass", description = "selection ID")
    ),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[put("/student/<user>/enrollment?<enrollClass>")]
#[tracing::instrument]
#[allow(non_snake_case)]
pub async fn enrollment_mark(
    user: &str,
    enrollClass: &str,
    token: AccessToken,
    enrollment: &State<Enrollment>,
) -> Result<Json<UpdateOutcome>, Problem> {
    Ok(Json(enrollment.mark_enrolled(record_id(enrollClass)?).await?))
}

/// Remove a selection
#[utoipa::path(
    params(
        ("user", description = "student UID"),
        ("class", description = "selection ID")
    ),
    responses(
        (status = 200, description = "Deletion result", body = DeleteOutcome),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[delete("/student/<user>/delete?<class>")]
#[tracing::instrument]
pub async fn selection_delete(
    user: &str,
    class: &str,
    token: AccessToken,
    enrollment: &State<Enrollment>,
) -> Result<Json<DeleteOutcome>, Problem> {
    Ok(Json(enrollment.remove_selection(record_id(class)?).await?))
}

/// Approve a class
#[utoipa::path(
    params(
        ("class_id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[put("/selectedClass/<class_id>/approved")]
#[tracing::instrument]
pub async fn class_approve(
    class_id: &str,
    token: AccessToken,
    enrollment: &State<Enrollment>,
) -> Result<Json<UpdateOutcome>, Problem> {
    Ok(Json(
        enrollment
            .set_class_approval(record_id(class_id)?, ApprovalDecision::Approve)
            .await?,
    ))
}

/// Deny a class
#[utoipa::path(
    params(
        ("class_id", description = "class ID")
    ),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Missing/expired token", body = Problem),
    ),
    security(
        ("jwt" = [])
    )
)]
#[put("/selectedClass/<class_id>/denied")]
#[tracing::instrument]
pub async fn class_deny(
    class_id: &str,
    token: AccessToken,
    enrollment: &State<Enrollment>,
) -> Result<Json<UpdateOutcome>, Problem> {
    Ok(Json(
        enrollment
            .set_class_approval(record_id(class_id)?, ApprovalDecision::Deny)
            .await?,
    ))
}

///////////////////////
//       TESTS
///////////////////////
