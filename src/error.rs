use std::path::PathBuf;
use thiserror::Error;

use crate::data::RecordId;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error("JWT secret is empty; set 'jwt_secret' or ACCESS_TOKEN_SECRET")]
    MissingSecret,
    #[error("token lifetime of {0} hours is outside 1..=8760")]
    TokenLifetime(i64),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures reported by class, selection and instructor stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("'{name}' is already selected by student '{student_uid}'")]
    Duplicate { student_uid: String, name: String },
    #[error("in-memory store lock was poisoned")]
    Poisoned,

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Bson(#[from] bson::ser::Error),
}

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("class '{0}' doesn't exist")]
    ClassNotFound(RecordId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Store(#[from] StoreError),

    // External errors
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error(transparent)]
    Cors(#[from] rocket_cors::Error),
}
