/// Client configuration
///
/// Read from the environment, with an optional `.env` file:
/// - `TASKBOARD_API_URL` (default `http://localhost:3000`)
/// - `TASKBOARD_TOKEN_FILE` (default `<platform data dir>/taskboard/access_token`)

use directories::ProjectDirs;
use std::{env, path::PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
const TOKEN_FILE_NAME: &str = "access_token";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no token file location: set TASKBOARD_TOKEN_FILE")]
    NoDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub token_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_values(
            env::var("TASKBOARD_API_URL").ok(),
            env::var("TASKBOARD_TOKEN_FILE").ok(),
        )
    }

    fn from_values(api_url: Option<String>, token_file: Option<String>) -> Result<Self, ConfigError> {
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let token_file = match token_file.filter(|path| !path.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_token_file().ok_or(ConfigError::NoDataDir)?,
        };

        Ok(Self { api_url, token_file })
    }
}

fn default_token_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taskboard").map(|dirs| dirs.data_dir().join(TOKEN_FILE_NAME))
}
