use rocket::serde::json::Json;
use rocket::State;

use crate::config::Config;
use crate::data::class::{ClassQuery, ClassRecord};
use crate::data::instructor::Instructor;
use crate::data::store::Stores;
use crate::resp::problem::Problem;

pub static RUNNING_BANNER: &str = "Tiger Spirit Martial Art Academy server is running......";

/// Server liveness banner
#[utoipa::path(
    responses(
        (status = 200, description = "Server is running", body = String),
    )
)]
#[get("/")]
pub fn index() -> &'static str {
    RUNNING_BANNER
}

/// List all instructors
#[utoipa::path(
    responses(
        (status = 200, description = "List of instructors", body = Vec<Instructor>),
    )
)]
#[get("/instructors")]
#[tracing::instrument]
pub async fn instructor_list(stores: &State<Stores>) -> Result<Json<Vec<Instructor>>, Problem> {
    Ok(Json(stores.instructors.list_instructors(None).await?))
}

/// List featured instructors
#[utoipa::path(
    responses(
        (status = 200, description = "First few instructors", body = Vec<Instructor>),
    )
)]
#[get("/popularInstructors")]
#[tracing::instrument(skip(c))]
pub async fn instructor_popular(
    stores: &State<Stores>,
    c: &State<Config>,
) -> Result<Json<Vec<Instructor>>, Problem> {
    Ok(Json(
        stores
            .instructors
            .list_instructors(Some(c.popular_instructor_limit))
            .await?,
    ))
}

/// List approved classes
#[utoipa::path(
    responses(
        (status = 200, description = "Classes approved by an admin", body = Vec<ClassRecord>),
    )
)]
#[get("/classes")]
#[tracing::instrument]
pub async fn class_list(stores: &State<Stores>) -> Result<Json<Vec<ClassRecord>>, Problem> {
    let query = ClassQuery {
        approved_only: true,
        ..Default::default()
    };

    Ok(Json(stores.classes.list_classes(query).await?))
}

/// List the most enrolled classes
#[utoipa::path(
    responses(
        (status = 200, description = "Classes ordered by enrollment", body = Vec<ClassRecord>),
    )
)]
#[get("/popularClasses")]
#[tracing::instrument(skip(c))]
pub async fn class_popular(
    stores: &State<Stores>,
    c: &State<Config>,
) -> Result<Json<Vec<ClassRecord>>, Problem> {
    let query = ClassQuery {
        approved_only: false,
        most_enrolled_first: true,
        limit: Some(c.popular_class_limit),
    };

    Ok(Json(stores.classes.list_classes(query).await?))
}

#[cfg(test)]
mod catalog_endpoints {
    use std::sync::Arc;

    use rocket::http::Status;

    use super::RUNNING_BANNER;
    use crate::data::class::{ClassRecord, ClassStatus};
    use crate::data::instructor::Instructor;
    use crate::data::memory::fixtures::{class, instructor};
    use crate::data::memory::MemoryStore;
    use crate::route::test_util::client;

    #[rocket::async_test]
    async fn index_reports_running() {
        let client = client(Arc::new(MemoryStore::new())).await;

        let response = client.get("/").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.into_string().await.as_deref(), Some(RUNNING_BANNER));
    }

    #[rocket::async_test]
    async fn classes_lists_only_approved() {
        let store = Arc::new(MemoryStore::new());
        store
            .insert_class(class("Wing Chun", 10, 2, ClassStatus::Approved))
            .unwrap();
        store
            .insert_class(class("Sumo", 10, 0, ClassStatus::Denied))
            .unwrap();
        store
            .insert_class(class("Sambo", 10, 0, ClassStatus::Pending))
            .unwrap();
        let client = client(store).await;

        let classes: Vec<ClassRecord> = client
            .get("/classes")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("json body");

        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "Wing Chun");
    }

    #[rocket::async_test]
    async fn popular_classes_are_limited_and_ordered() {
        let store = Arc::new(MemoryStore::new());
        for enroll in 0..20 {
            store
                .insert_class(class(&format!("Class {}", enroll), 30, enroll, ClassStatus::Approved))
                .unwrap();
        }
        let client = client(store).await;

        let classes: Vec<ClassRecord> = client
            .get("/popularClasses")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("json body");

        assert_eq!(classes.len(), 15);
        assert_eq!(classes[0].enroll, 19);
        assert!(classes.windows(2).all(|w| w[0].enroll >= w[1].enroll));
    }

    #[rocket::async_test]
    async fn popular_instructors_are_limited() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..8 {
            store
                .insert_instructor(instructor(&format!("Sensei {}", i)))
                .unwrap();
        }
        let client = client(store).await;

        let all: Vec<Instructor> = client
            .get("/instructors")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("json body");
        assert_eq!(all.len(), 8);

        let popular: Vec<Instructor> = client
            .get("/popularInstructors")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("json body");
        assert_eq!(popular.len(), 6);
    }
}
