use crate::codec::{decode_record, encode_record};
use crate::config::Config;
use crate::errors::StoreError;
use crate::gist::{GistClient, GistDocument};
use crate::models::DailyRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::{error, info, warn};

pub const KEY_PREFIX: &str = "planner-";
const REMOTE_SUFFIX: &str = ".json";

pub fn record_key(date: NaiveDate) -> String {
    format!("{KEY_PREFIX}{}", date.format("%Y-%m-%d"))
}

pub fn remote_file_name(date: NaiveDate) -> String {
    format!("{}{REMOTE_SUFFIX}", record_key(date))
}

fn date_from_key(key: &str) -> Option<NaiveDate> {
    let date = key.strip_prefix(KEY_PREFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn date_from_file_name(name: &str) -> Option<NaiveDate> {
    date_from_key(name.strip_suffix(REMOTE_SUFFIX)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    Local,
    Remote,
}

/// A flat key/value file: `planner-<date>` keys mapping to JSON text.
pub struct LocalStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalStore {
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path).await;
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    async fn read(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn write(&self, key: String, value: String) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        updated.insert(key, value);
        persist_entries(&self.path, &updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.lock().await.clone()
    }
}

async fn load_entries(path: &Path) -> BTreeMap<String, String> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(err) => {
                error!("failed to parse data file {}: {err}", path.display());
                BTreeMap::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            BTreeMap::new()
        }
    }
}

async fn persist_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(entries)?;
    fs::write(path, payload).await?;
    Ok(())
}

enum Backend {
    Local(LocalStore),
    Remote(GistClient),
}

#[derive(Debug, Clone)]
pub struct LoadedRecord {
    pub record: DailyRecord,
    pub found: bool,
    pub warning: Option<String>,
}

/// Date-keyed record store. The backend is chosen once, at construction.
pub struct RecordStore {
    backend: Backend,
}

impl RecordStore {
    pub async fn from_config(config: &Config) -> Result<Self, StoreError> {
        match config.remote() {
            Some(remote) => {
                info!("storing planner records in gist {}", remote.gist_id);
                Ok(Self {
                    backend: Backend::Remote(GistClient::new(&remote)?),
                })
            }
            None => {
                if config.github_token.is_some() || config.gist_id.is_some() {
                    warn!("gist storage needs both PLANNER_GITHUB_TOKEN and PLANNER_GIST_ID; using local storage");
                }
                info!("storing planner records in {}", config.data_path.display());
                Ok(Self::local(&config.data_path).await)
            }
        }
    }

    pub async fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Local(LocalStore::open(path).await),
        }
    }

    pub fn mode(&self) -> StorageMode {
        match self.backend {
            Backend::Local(_) => StorageMode::Local,
            Backend::Remote(_) => StorageMode::Remote,
        }
    }

    pub async fn fetch(&self, date: NaiveDate) -> Result<Option<DailyRecord>, StoreError> {
        let key = record_key(date);
        let text = match &self.backend {
            Backend::Local(local) => local.read(&key).await,
            Backend::Remote(gist) => {
                let document = gist.fetch().await?;
                document
                    .file_content(&remote_file_name(date))
                    .map(str::to_string)
            }
        };
        text.map(|text| decode_record(&text).map_err(|source| StoreError::Decode { key, source }))
            .transpose()
    }

    /// Failures yield the default record plus a warning.
    pub async fn get(&self, date: NaiveDate) -> LoadedRecord {
        match self.fetch(date).await {
            Ok(Some(record)) => LoadedRecord {
                record,
                found: true,
                warning: None,
            },
            Ok(None) => LoadedRecord {
                record: DailyRecord::default(),
                found: false,
                warning: None,
            },
            Err(err) => {
                error!("failed to load planner for {date}: {err}");
                LoadedRecord {
                    record: DailyRecord::default(),
                    found: false,
                    warning: Some(err.to_string()),
                }
            }
        }
    }

    pub async fn put(&self, date: NaiveDate, record: &DailyRecord) -> Result<(), StoreError> {
        let payload = encode_record(record)?;
        match &self.backend {
            Backend::Local(local) => local.write(record_key(date), payload).await,
            Backend::Remote(gist) => {
                gist.update_file(
                    &remote_file_name(date),
                    payload,
                    format!("Daily Planner Data for {date}"),
                )
                .await
            }
        }
    }

    pub async fn list_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let mut dates: Vec<NaiveDate> = match &self.backend {
            Backend::Local(local) => local
                .snapshot()
                .await
                .keys()
                .filter_map(|key| date_from_key(key))
                .collect(),
            Backend::Remote(gist) => gist
                .fetch()
                .await?
                .file_names()
                .filter_map(date_from_file_name)
                .collect(),
        };
        dates.sort_unstable_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    pub async fn fetch_all(&self) -> Result<Vec<(NaiveDate, DailyRecord)>, StoreError> {
        let texts: Vec<(NaiveDate, String)> = match &self.backend {
            Backend::Local(local) => local
                .snapshot()
                .await
                .into_iter()
                .filter_map(|(key, text)| Some((date_from_key(&key)?, text)))
                .collect(),
            Backend::Remote(gist) => remote_texts(gist.fetch().await?),
        };

        let mut records: Vec<(NaiveDate, DailyRecord)> = texts
            .into_iter()
            .filter_map(|(date, text)| match decode_record(&text) {
                Ok(record) => Some((date, record)),
                Err(err) => {
                    warn!("skipping unreadable planner for {date}: {err}");
                    None
                }
            })
            .collect();
        records.sort_unstable_by(|a, b| b.0.cmp(&a.0));
        Ok(records)
    }
}

fn remote_texts(document: GistDocument) -> Vec<(NaiveDate, String)> {
    document
        .file_names()
        .filter_map(|name| {
            let date = date_from_file_name(name)?;
            Some((date, document.file_content(name)?.to_string()))
        })
        .collect()
}
