//! HTTP plumbing shared by the Radarr and Sonarr clients (both speak the
//! same v3 API dialect: `X-Api-Key` header, JSON bodies, `/api/v3/...`).

use chrono::{DateTime, Datelike, Utc};
use plexarr_config::ArrConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use crate::error::SourceError;

pub struct ArrHttpClient {
    client: Client,
    base_url: String,
    service: &'static str,
}

impl ArrHttpClient {
    pub fn new(service: &'static str, config: &ArrConfig) -> Result<Self, SourceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::HeaderName::from_static("x-api-key"),
            reqwest::header::HeaderValue::from_str(&config.api_key).map_err(|e| {
                SourceError::InvalidConfig {
                    service,
                    message: format!("api_key is not a valid header value: {}", e),
                }
            })?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::http(service, e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/api/v3/{}", self.base_url, endpoint)
    }

    async fn check(&self, response: Response) -> Result<Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SourceError::Api {
            service: self.service,
            status: status.as_u16(),
            message: truncate(&message, 300),
        })
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T, SourceError> {
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::http(self.service, e))?;
        trace!("{} response body: {}", self.service, truncate(&body, 500));
        serde_json::from_str(&body).map_err(|e| SourceError::decode(self.service, e))
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, SourceError> {
        debug!("{}: GET {}", self.service, endpoint);
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|e| SourceError::http(self.service, e))?;
        let response = self.check(response).await?;
        self.decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, SourceError> {
        debug!("{}: POST {}", self.service, endpoint);
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::http(self.service, e))?;
        let response = self.check(response).await?;
        self.decode(response).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, SourceError> {
        debug!("{}: PUT {}", self.service, endpoint);
        let response = self
            .client
            .put(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::http(self.service, e))?;
        let response = self.check(response).await?;
        self.decode(response).await
    }

    pub async fn delete(&self, endpoint: &str) -> Result<(), SourceError> {
        debug!("{}: DELETE {}", self.service, endpoint);
        let response = self
            .client
            .delete(self.url(endpoint))
            .send()
            .await
            .map_err(|e| SourceError::http(self.service, e))?;
        self.check(response).await?;
        Ok(())
    }

    pub async fn tag_names(&self, tag_ids: &[u32]) -> Result<Vec<String>, SourceError> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let tags: Vec<ArrTag> = self.get("tag").await?;
        Ok(tags
            .into_iter()
            .filter(|tag| tag_ids.contains(&tag.id))
            .map(|tag| tag.label)
            .collect())
    }

    /// Weight of the quality definition whose quality id is `quality_id`
    pub async fn quality_weight(&self, quality_id: u32) -> Result<i64, SourceError> {
        let definitions: Vec<ArrQualityDefinition> = self.get("qualitydefinition").await?;
        definitions
            .into_iter()
            .find(|def| def.quality.id == quality_id)
            .and_then(|def| def.weight)
            .ok_or_else(|| SourceError::NotFound(format!("{} quality definition {}", self.service, quality_id)))
    }

    pub async fn root_folders(&self) -> Result<Vec<plexarr_models::RootFolder>, SourceError> {
        let folders: Vec<ArrRootFolder> = self.get("rootfolder").await?;
        Ok(folders
            .into_iter()
            .map(|f| plexarr_models::RootFolder {
                id: f.id,
                path: f.path,
                free_space: f.free_space,
            })
            .collect())
    }

    /// First root folder, required when adding items
    pub async fn first_root_folder(&self) -> Result<String, SourceError> {
        self.root_folders()
            .await?
            .into_iter()
            .next()
            .map(|f| f.path)
            .ok_or_else(|| {
                SourceError::NotFound(format!(
                    "No root folders found in {}. Please configure at least one root folder",
                    self.service
                ))
            })
    }

    pub async fn quality_profiles(&self) -> Result<Vec<plexarr_models::QualityProfile>, SourceError> {
        let profiles: Vec<ArrQualityProfile> = self.get("qualityprofile").await?;
        Ok(profiles
            .into_iter()
            .map(|p| plexarr_models::QualityProfile { id: p.id, name: p.name })
            .collect())
    }
}

/// `0` is how the *arr APIs say "no id"
pub(crate) fn non_zero(id: Option<u32>) -> Option<u32> {
    id.filter(|id| *id != 0)
}

/// The *arr APIs report unknown dates as `0001-01-01T00:00:00Z`
pub(crate) fn real_date(date: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    date.filter(|d| d.year() > 1900)
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[derive(Debug, Deserialize)]
struct ArrTag {
    id: u32,
    label: String,
}

#[derive(Debug, Deserialize)]
struct ArrQualityDefinition {
    quality: ArrQualityRef,
    weight: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArrQualityRef {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArrRootFolder {
    id: Option<u32>,
    path: String,
    #[serde(default)]
    free_space: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ArrQualityProfile {
    id: u32,
    name: String,
}

/// `quality` block attached to movie and episode files
#[derive(Debug, Clone, Deserialize)]
pub struct ArrFileQuality {
    pub quality: ArrQualityRef,
}

/// A movie file (Radarr) or episode file (Sonarr)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrMediaFile {
    pub id: u32,
    #[serde(default)]
    pub relative_path: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub quality: Option<ArrFileQuality>,
}

pub fn decode_file(raw: &ArrMediaFile) -> plexarr_models::FileVariant {
    plexarr_models::FileVariant {
        id: raw.id,
        quality_id: raw.quality.as_ref().map(|q| q.quality.id),
        quality_name: raw.quality.as_ref().and_then(|q| q.quality.name.clone()),
        size: raw.size,
        relative_path: raw.relative_path.clone(),
    }
}
