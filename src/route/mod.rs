use rocket::{Build, Catcher, Request, Rocket, Route};

pub mod auth;
pub mod catalog;
pub mod selection;

use auth::*;
use catalog::*;
use selection::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{
        class::{ClassRecord, ClassStatus, InstructorRef, SeatUpdate},
        instructor::Instructor,
        selection::{NewSelection, SelectClassData, SelectionRecord},
        store::{DeleteOutcome, UpdateOutcome},
        RecordId,
    },
    enrollment::SelectOutcome,
    resp::{
        jwt::{auth_problem, doc::JWTAuth, RejectedAuth},
        problem::{problems, Problem},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        index,
        instructor_list,
        instructor_popular,
        class_list,
        class_popular,
        jwt_issue,
        select_class,
        selected_list,
        enrolled_list,
        enrollment_mark,
        selection_delete,
        class_approve,
        class_deny
    ),
    components(schemas(
        RecordId,
        ClassRecord,
        ClassStatus,
        InstructorRef,
        SeatUpdate,
        Instructor,
        SelectionRecord,
        NewSelection,
        SelectClassData,
        SelectOutcome,
        UpdateOutcome,
        DeleteOutcome,
        TokenRequest,
        TokenResponse,
        Problem
    )),
    modifiers(&JWTAuth)
)]
pub struct ApiDoc;

pub fn api() -> Vec<Route> {
    routes![
        index,
        instructor_list,
        instructor_popular,
        class_list,
        class_popular,
        jwt_issue,
        select_class,
        selected_list,
        enrolled_list,
        enrollment_mark,
        selection_delete,
        class_approve,
        class_deny
    ]
}

#[catch(401)]
fn unauthorized(req: &Request) -> Problem {
    req.local_cache(RejectedAuth::default)
        .0
        .clone()
        .unwrap_or_else(|| auth_problem("Missing or invalid bearer token."))
}

#[catch(404)]
fn not_found() -> Problem {
    problems::not_found()
}

#[catch(422)]
fn unprocessable() -> Problem {
    problems::parse_problem()
}

#[catch(500)]
fn internal() -> Problem {
    problems::internal()
}

pub fn catchers() -> Vec<Catcher> {
    catchers![unauthorized, not_found, unprocessable, internal]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api())
        .mount(
            "/",
            SwaggerUi::new("/swagger/<_..>").url("/openapi.json", ApiDoc::openapi()),
        )
        .register("/", catchers())
}
