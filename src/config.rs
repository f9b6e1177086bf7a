use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_GIST_API: &str = "https://api.github.com";
const DEFAULT_AUTOSAVE_SECS: u64 = 30;

/// Credentials for the shared Gist document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub api_base: String,
    pub token: String,
    pub gist_id: String,
}

/// Runtime configuration, read once at startup and handed to the store,
/// the planner session and the access gate.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub gist_api: String,
    pub github_token: Option<String>,
    pub gist_id: Option<String>,
    pub password: Option<String>,
    pub autosave_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_path: PathBuf::from("data/planner.json"),
            gist_api: DEFAULT_GIST_API.to_string(),
            github_token: None,
            gist_id: None,
            password: None,
            autosave_delay: Duration::from_secs(DEFAULT_AUTOSAVE_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            port: non_empty("PORT")
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(defaults.port),
            data_path: non_empty("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            gist_api: non_empty("PLANNER_GIST_API")
                .map(|value| value.trim_end_matches('/').to_string())
                .unwrap_or(defaults.gist_api),
            github_token: non_empty("PLANNER_GITHUB_TOKEN"),
            gist_id: non_empty("PLANNER_GIST_ID"),
            password: non_empty("PLANNER_PASSWORD"),
            autosave_delay: non_empty("PLANNER_AUTOSAVE_SECS")
                .and_then(|value| value.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.autosave_delay),
        }
    }

    /// Remote storage needs both the token and the document id.
    pub fn remote(&self) -> Option<RemoteConfig> {
        match (&self.github_token, &self.gist_id) {
            (Some(token), Some(gist_id)) => Some(RemoteConfig {
                api_base: self.gist_api.clone(),
                token: token.clone(),
                gist_id: gist_id.clone(),
            }),
            _ => None,
        }
    }
}
