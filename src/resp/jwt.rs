use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::resp::problem::{problems, Problem};

static BEARER_PREFIX: &str = "Bearer ";

/// Claims of the access token handed out by `POST /jwt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    #[serde(with = "jwt_numeric_date")]
    iat: DateTime<Utc>,
    #[serde(with = "jwt_numeric_date")]
    exp: DateTime<Utc>,
    pub email: String,
}

impl AccessToken {
    pub fn new(email: impl ToString, lifetime: Duration) -> AccessToken {
        let now = Utc::now();
        AccessToken {
            iat: now,
            exp: now + lifetime,
            email: email.to_string(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.exp
    }

    pub fn encode_jwt(&self, secret: impl AsRef<[u8]>) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::new(Algorithm::HS256),
            &self,
            &EncodingKey::from_secret(secret.as_ref()),
        )
    }

    pub fn decode_jwt(
        token: impl AsRef<str>,
        secret: impl AsRef<[u8]>,
    ) -> Result<AccessToken, jsonwebtoken::errors::Error> {
        decode::<AccessToken>(
            token.as_ref(),
            &DecodingKey::from_secret(secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
    }
}

pub fn auth_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Unauthorized, "Unable to authorize user.")
        .detail(detail)
        .clone()
}

/// Reads claims from an `Authorization: Bearer <jwt>` header value.
pub fn extract_claims(
    authorization: Option<&str>,
    secret: impl AsRef<[u8]>,
) -> Result<AccessToken, Problem> {
    let token = match authorization.and_then(|it| it.strip_prefix(BEARER_PREFIX)) {
        Some(token) => token.trim(),
        None => return Err(auth_problem("No bearer token in Authorization header.")),
    };
    tracing::trace!("extracted bearer token from header");

    match AccessToken::decode_jwt(token, secret) {
        Ok(it) => {
            tracing::debug!("decoded access token for: {}", it.email);
            Ok(it)
        }
        Err(e) => {
            let mut problem = Problem::from(e);
            if problem.detail.is_none() {
                problem.detail("Bearer token was malformed.");
            }
            Err(problem)
        }
    }
}

/// Last guard failure of a request, picked up by the 401 catcher.
#[derive(Debug, Default)]
pub struct RejectedAuth(pub Option<Problem>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AccessToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config: &Config = match req.rocket().state() {
            Some(it) => it,
            None => {
                tracing::error!("configuration isn't managed; unable to verify tokens");
                return Outcome::Error((Status::InternalServerError, problems::internal()));
            }
        };

        match extract_claims(req.headers().get_one("Authorization"), &config.jwt_secret) {
            Ok(claims) => Outcome::Success(claims),
            Err(problem) => {
                tracing::debug!("rejected request: {}", problem);
                req.local_cache(|| RejectedAuth(Some(problem.clone())));
                Outcome::Error((Status::Unauthorized, problem))
            }
        }
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl From<JWTAuth> for SecurityScheme {
        fn from(_: JWTAuth) -> Self {
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            )
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            if let Some(c) = openapi.components.as_mut() {
                c.add_security_scheme("jwt", *self)
            }
        }
    }
}

mod jwt_numeric_date {
    //! Serializes DateTime<Utc> as a JWT "NumericDate" (RFC 7519 section 2).
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i64(date.timestamp())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Utc.timestamp_opt(i64::deserialize(deserializer)?, 0)
            .single()
            .ok_or_else(|| serde::de::Error::custom("Invalid Unix timestamp value."))
    }
}
