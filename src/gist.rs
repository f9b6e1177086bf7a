//! Client for the single shared Gist that holds one `planner-<date>.json`
//! file per day.

use crate::config::RemoteConfig;
use crate::errors::StoreError;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const USER_AGENT: &str = "daily-planner";
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Default, Deserialize)]
pub struct GistDocument {
    #[serde(default)]
    pub files: BTreeMap<String, Option<GistFile>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GistFile {
    #[serde(default)]
    pub content: Option<String>,
}

impl GistDocument {
    pub fn file_content(&self, name: &str) -> Option<&str> {
        self.files
            .get(name)?
            .as_ref()?
            .content
            .as_deref()
    }

    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

#[derive(Debug, Serialize)]
struct GistPatch<'a> {
    description: String,
    files: BTreeMap<&'a str, GistFile>,
}

pub struct GistClient {
    http: Client,
    url: String,
    token: String,
}

impl GistClient {
    pub fn new(remote: &RemoteConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| StoreError::Client(err.to_string()))?;
        Ok(Self {
            http,
            url: format!("{}/gists/{}", remote.api_base, remote.gist_id),
            token: remote.token.clone(),
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.bearer_auth(&self.token).header("Accept", ACCEPT)
    }

    pub async fn fetch(&self) -> Result<GistDocument, StoreError> {
        let response = self.authorized(self.http.get(&self.url)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<GistDocument>().await?)
    }

    /// Replaces one file; the service keeps every file not named in the body.
    pub async fn update_file(&self, name: &str, content: String, description: String) -> Result<(), StoreError> {
        let mut files = BTreeMap::new();
        files.insert(name, GistFile { content: Some(content) });
        let body = GistPatch { description, files };

        let response = self
            .authorized(self.http.patch(&self.url))
            .json(&body)
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}
