//! GitHub-backed annotation source.
//!
//! ## Endpoints
//!
//! | Operation        | Request                                                    |
//! |------------------|------------------------------------------------------------|
//! | `latest_release` | `GET {api}/repos/{repo}/releases` (first entry's `tag_name`) |
//! | `list_modules`   | `GET {api}/repos/{repo}/contents/{data_path}?ref={version}` |
//! | `fetch`          | `GET {download_url}` of a listed `.json` entry              |
//!
//! The client is blocking. Callers inside an async runtime must run it on a
//! blocking thread (`tokio::task::spawn_blocking`).

use std::collections::BTreeMap;
use std::time::Duration;

use annot_core::{parse_document, AnnotationField, ModuleName, ReleaseVersion};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{ConfigError, SourceConfig};
use crate::error::SourceError;
use crate::source::{AnnotationSource, ModuleLocator};

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(default)]
    download_url: Option<String>,
}

/// Annotation source reading releases and module documents from GitHub.
#[derive(Debug, Clone)]
pub struct GitHubAnnotationSource {
    http: Client,
    api_root: String,
    repository: String,
    data_path: String,
}

impl GitHubAnnotationSource {
    /// Create a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Config`] if the token contains characters not
    /// allowed in a header, and [`SourceError::Unavailable`] if the HTTP
    /// client cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("annot/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|_| ConfigError::InvalidToken)?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| SourceError::Unavailable {
                endpoint: "client_init".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_root: config.api_url.as_str().trim_end_matches('/').to_string(),
            repository: config.repository,
            data_path: config.data_path.trim_matches('/').to_string(),
        })
    }

    /// Send a request, mapping transport failures and non-2xx statuses.
    fn send(&self, request: RequestBuilder, endpoint: &str) -> Result<Response, SourceError> {
        let resp = request.send().map_err(|e| SourceError::Unavailable {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_default();
            return Err(SourceError::ApiError {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }
        Ok(resp)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<T, SourceError> {
        self.send(request, endpoint)?
            .json()
            .map_err(|e| SourceError::Deserialization {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })
    }
}

impl AnnotationSource for GitHubAnnotationSource {
    fn latest_release(&self) -> Result<ReleaseVersion, SourceError> {
        let endpoint = format!("GET /repos/{}/releases", self.repository);
        let url = format!("{}/repos/{}/releases", self.api_root, self.repository);

        let releases: Vec<Release> = self.get_json(self.http.get(&url), &endpoint)?;
        let first = releases
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::NoReleases(self.repository.clone()))?;

        let version = ReleaseVersion::new(first.tag_name).map_err(|e| SourceError::Deserialization {
            endpoint,
            reason: e.to_string(),
        })?;
        tracing::info!(repository = %self.repository, %version, "resolved latest release");
        Ok(version)
    }

    fn list_modules(
        &self,
        version: &ReleaseVersion,
    ) -> Result<BTreeMap<ModuleName, ModuleLocator>, SourceError> {
        let endpoint = format!("GET /repos/{}/contents/{}", self.repository, self.data_path);
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.api_root, self.repository, self.data_path
        );

        let entries: Vec<ContentEntry> = self.get_json(
            self.http.get(&url).query(&[("ref", version.as_str())]),
            &endpoint,
        )?;

        let mut modules = BTreeMap::new();
        for entry in entries {
            if !entry.name.ends_with(".json") {
                tracing::debug!(name = %entry.name, "skipping non-JSON entry");
                continue;
            }
            let Some(download_url) = entry.download_url else {
                tracing::debug!(name = %entry.name, "skipping entry without download_url");
                continue;
            };
            match ModuleName::from_file_name(&entry.name) {
                Ok(module) => {
                    modules.insert(
                        module.clone(),
                        ModuleLocator {
                            module,
                            location: download_url,
                        },
                    );
                }
                Err(e) => tracing::warn!(name = %entry.name, "skipping entry: {e}"),
            }
        }

        tracing::debug!(%version, count = modules.len(), "listed annotation modules");
        Ok(modules)
    }

    fn fetch(&self, locator: &ModuleLocator) -> Result<Vec<AnnotationField>, SourceError> {
        let endpoint = format!("GET {}", locator.location);
        let bytes = self
            .send(self.http.get(&locator.location), &endpoint)?
            .bytes()
            .map_err(|e| SourceError::Unavailable {
                endpoint: endpoint.clone(),
                reason: e.to_string(),
            })?;
        Ok(parse_document(&locator.module, &bytes)?)
    }
}
