use crate::error::ConfigurationError;
use crate::util;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

fn default_mongodb_uri() -> String {
    env::var("MONGODB_URI").unwrap_or("mongodb://localhost:27017".to_string())
}

fn default_mongodb_db() -> String {
    env::var("MONGODB_DB_NAME").unwrap_or("tigerSpiritMartialArtAcademyDB".to_string())
}

fn default_storage() -> StorageBackend {
    match env::var("STORAGE").as_deref() {
        Ok("memory") => StorageBackend::Memory,
        _ => StorageBackend::MongoDb,
    }
}

fn default_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|it| it.parse().ok())
        .unwrap_or(5000)
}

fn default_jwt_secret() -> String {
    env::var("ACCESS_TOKEN_SECRET").unwrap_or_default()
}

/// One year.
const MAX_TOKEN_LIFETIME_HOURS: i64 = 24 * 365;

fn default_token_lifetime_hours() -> i64 {
    1
}

fn default_popular_class_limit() -> i64 {
    15
}

fn default_popular_instructor_limit() -> i64 {
    6
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    MongoDb,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    file_path: PathBuf,

    #[serde(default = "default_mongodb_uri")]
    pub mongodb_uri: String,
    #[serde(default = "default_mongodb_db")]
    pub mongodb_db: String,
    #[serde(default = "default_storage")]
    pub storage: StorageBackend,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_jwt_secret", skip_serializing)]
    pub jwt_secret: String,
    #[serde(default = "default_token_lifetime_hours")]
    pub token_lifetime_hours: i64,

    #[serde(default = "default_popular_class_limit")]
    pub popular_class_limit: i64,
    #[serde(default = "default_popular_instructor_limit")]
    pub popular_instructor_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            file_path: config_dir().join("settings.yml"),
            mongodb_uri: default_mongodb_uri(),
            mongodb_db: default_mongodb_db(),
            storage: default_storage(),
            port: default_port(),
            jwt_secret: default_jwt_secret(),
            token_lifetime_hours: default_token_lifetime_hours(),
            popular_class_limit: default_popular_class_limit(),
            popular_instructor_limit: default_popular_instructor_limit(),
        }
    }
}

#[inline]
fn config_dir() -> PathBuf {
    PathBuf::from(env::var("CONFIG_DIR").unwrap_or("./config".to_string()))
}

impl Config {
    pub fn load() -> Result<Config, ConfigurationError> {
        let config_file = util::find_first_subpath(
            config_dir(),
            &["settings.yml", "settings.yaml"],
            Path::exists,
        )
        .ok_or_else(|| ConfigurationError::NotFound(config_dir()))?;

        let file = File::open(&config_file)?;
        let mut config: Config = serde_yaml::from_reader(BufReader::new(file))?;
        config.file_path = config_file;

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigurationError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&self.file_path)?;
        let mut out = BufWriter::new(file);
        serde_yaml::to_writer(&mut out, self)?;
        out.flush()?;
        Ok(())
    }

    /// Checks values that have no usable fallback.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        if !(1..=MAX_TOKEN_LIFETIME_HOURS).contains(&self.token_lifetime_hours) {
            return Err(ConfigurationError::TokenLifetime(self.token_lifetime_hours));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config =
            serde_yaml::from_str("mongodb_db: academy\nstorage: memory\njwt_secret: s3cr3t\n")
                .expect("valid yaml");

        assert_eq!(config.mongodb_db, "academy");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.jwt_secret, "s3cr3t");
        assert_eq!(config.token_lifetime_hours, 1);
        assert_eq!(config.popular_class_limit, 15);
        assert_eq!(config.popular_instructor_limit, 6);
    }

    #[test]
    fn empty_secret_is_rejected() {
        let mut config = Config::default();
        config.jwt_secret = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingSecret)
        ));

        config.jwt_secret = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn token_lifetime_must_be_within_a_year() {
        let mut config = Config::default();
        config.jwt_secret = "secret".to_string();

        for hours in [0, -1, 8761, i64::MAX] {
            config.token_lifetime_hours = hours;
            assert!(
                matches!(config.validate(), Err(ConfigurationError::TokenLifetime(h)) if h == hours),
                "{} hours should be rejected",
                hours
            );
        }

        for hours in [1, 24, 8760] {
            config.token_lifetime_hours = hours;
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn secret_is_never_written_out() {
        let mut config = Config::default();
        config.jwt_secret = "do-not-leak".to_string();

        let yaml = serde_yaml::to_string(&config).expect("serializable config");
        assert!(!yaml.contains("do-not-leak"));
    }
}
