use chrono::{DateTime, Duration, Utc};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Config;
use crate::resp::jwt::AccessToken;
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(format = "email")]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[inline]
fn bad_email(email: impl ToString) -> Problem {
    Problem::new_untyped(Status::BadRequest, "Bad email.")
        .insert_str("email", email)
        .detail("Not a valid e-mail address.")
        .to_owned()
}

/// Issue an access token
#[utoipa::path(
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed access token", body = TokenResponse),
        (status = 400, description = "Invalid email", body = Problem),
    )
)]
#[post("/jwt", format = "application/json", data = "<request>")]
#[tracing::instrument(skip(c))]
pub fn jwt_issue(
    request: Json<TokenRequest>,
    c: &State<Config>,
) -> Result<Json<TokenResponse>, Problem> {
    let email = request.into_inner().email;
    if !email.contains('@') {
        return Err(bad_email(email));
    }

    let token = AccessToken::new(&email, Duration::hours(c.token_lifetime_hours));
    let encoded = token.encode_jwt(&c.jwt_secret)?;
    tracing::info!("issued access token for {}", email);

    Ok(Json(TokenResponse {
        token: encoded,
        expires_at: token.expires_at(),
    }))
}

#[cfg(test)]
mod auth_endpoints {
    use std::sync::Arc;

    use rocket::http::{ContentType, Header, Status};

    use super::TokenResponse;
    use crate::data::memory::MemoryStore;
    use crate::resp::jwt::AccessToken;
    use crate::route::test_util::{client, TEST_SECRET};

    #[rocket::async_test]
    async fn issued_token_opens_student_routes() {
        let client = client(Arc::new(MemoryStore::new())).await;

        let response = client
            .post("/jwt")
            .header(ContentType::JSON)
            .body(r#"{"email":"student@example.com"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let issued: TokenResponse = response.into_json().await.expect("json body");
        let claims = AccessToken::decode_jwt(&issued.token, TEST_SECRET).expect("valid token");
        assert_eq!(claims.email, "student@example.com");

        let listed = client
            .get("/student/student-a/selectedClass")
            .header(Header::new(
                "Authorization",
                format!("Bearer {}", issued.token),
            ))
            .dispatch()
            .await;
        assert_eq!(listed.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn malformed_email_is_rejected() {
        let client = client(Arc::new(MemoryStore::new())).await;

        let response = client
            .post("/jwt")
            .header(ContentType::JSON)
            .body(r#"{"email":"not-an-email"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[rocket::async_test]
    async fn garbage_token_is_unauthorized() {
        let client = client(Arc::new(MemoryStore::new())).await;

        let response = client
            .get("/student/student-a/enrolledClass")
            .header(Header::new("Authorization", "Bearer not.a.jwt"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Unauthorized);

        let body: serde_json::Value = response.into_json().await.expect("json body");
        assert_eq!(body["status"], 401);
    }
}
