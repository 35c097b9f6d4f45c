use crate::config::toml_config::redacted;
use crate::core::{Storage, VisitLog};
use crate::domain::model::VisitRecord;
use crate::utils::error::{Result, ShuttleError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// 在既有 CSV 內容後追加一列；內容為空時先寫入標題列
pub fn append_visit_row(existing: &[u8], record: &VisitRecord) -> Result<Vec<u8>> {
    let write_header = existing.iter().all(|b| b.is_ascii_whitespace());

    let mut buffer = if write_header {
        Vec::new()
    } else {
        existing.to_vec()
    };
    if !buffer.is_empty() && !buffer.ends_with(b"\n") {
        buffer.push(b'\n');
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(buffer);
    writer.serialize(record)?;
    writer.into_inner().map_err(|e| ShuttleError::VisitLogError {
        message: format!("failed to flush CSV row: {}", e),
    })
}

/// 透過 `Storage` 讀取、追加、整檔寫回
pub struct StorageVisitLog<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> StorageVisitLog<S> {
    pub fn new(storage: S, path: String) -> Self {
        Self { storage, path }
    }
}

#[async_trait]
impl<S: Storage> VisitLog for StorageVisitLog<S> {
    async fn append(&self, record: &VisitRecord) -> Result<()> {
        let existing = self.storage.read_file(&self.path).await?.unwrap_or_default();
        let updated = append_visit_row(&existing, record)?;
        self.storage.write_file(&self.path, &updated).await?;
        tracing::debug!("Appended visit to {}", self.path);
        Ok(())
    }
}

pub struct NoopVisitLog;

#[async_trait]
impl VisitLog for NoopVisitLog {
    async fn append(&self, _record: &VisitRecord) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteRepoSettings {
    pub api_base: String,
    pub owner: String,
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub token: String,
    pub commit_message: String,
}

impl fmt::Debug for RemoteRepoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteRepoSettings")
            .field("api_base", &self.api_base)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("path", &self.path)
            .field("branch", &self.branch)
            .field("token", &redacted(Some(self.token.as_str())))
            .field("commit_message", &self.commit_message)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: String,
    sha: String,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Serialize)]
struct UpdateContentRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<String>,
}

/// 以內容 API（GitHub contents API 格式）維護遠端儲存庫中的記錄檔
pub struct RemoteRepoVisitLog {
    settings: RemoteRepoSettings,
    client: Client,
}

impl RemoteRepoVisitLog {
    pub fn new(settings: RemoteRepoSettings, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("shuttle-finder/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.owner,
            self.settings.repo,
            self.settings.path.trim_start_matches('/')
        )
    }

    /// 取得目前內容與 sha；檔案不存在時回傳空內容
    async fn fetch_current(&self) -> Result<(Vec<u8>, Option<String>)> {
        let response = self
            .client
            .get(self.contents_url())
            .query(&[("ref", self.settings.branch.as_str())])
            .bearer_auth(&self.settings.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                tracing::info!("📄 Remote visit log not found, creating {}", self.settings.path);
                Ok((Vec::new(), None))
            }
            status if status.is_success() => {
                let body: ContentResponse = response.json().await?;
                let encoded: String = body
                    .content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                // 超過 1 MB 的檔案 API 不回傳內容，整檔覆寫會遺失記錄
                if encoded.is_empty() && body.size > 0 {
                    return Err(ShuttleError::VisitLogError {
                        message: format!(
                            "remote log {} is {} bytes and its content was not returned",
                            self.settings.path, body.size
                        ),
                    });
                }
                let decoded =
                    STANDARD
                        .decode(encoded)
                        .map_err(|e| ShuttleError::VisitLogError {
                            message: format!("remote content is not valid base64: {}", e),
                        })?;
                Ok((decoded, Some(body.sha)))
            }
            status => Err(ShuttleError::VisitLogError {
                message: format!("fetching remote log failed with HTTP {}", status),
            }),
        }
    }
}

#[async_trait]
impl VisitLog for RemoteRepoVisitLog {
    async fn append(&self, record: &VisitRecord) -> Result<()> {
        let (existing, sha) = self.fetch_current().await?;
        let updated = append_visit_row(&existing, record)?;

        let request = UpdateContentRequest {
            message: &self.settings.commit_message,
            content: STANDARD.encode(&updated),
            branch: &self.settings.branch,
            sha,
        };

        let response = self
            .client
            .put(self.contents_url())
            .bearer_auth(&self.settings.token)
            .header("Accept", "application/vnd.github+json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShuttleError::VisitLogError {
                message: format!("updating remote log failed with HTTP {}", status),
            });
        }

        tracing::debug!(
            "Appended visit to {}/{}:{}",
            self.settings.owner,
            self.settings.repo,
            self.settings.path
        );
        Ok(())
    }
}
