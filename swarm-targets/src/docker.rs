//! Implements [`TaskLookup`] for the Docker Engine API.

use crate::{Service, ServiceId, Task, TaskFilter, TaskLookup};
use anyhow::Context;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;

const DEFAULT_DOCKER_HOST: &str = "http://127.0.0.1:2375";

/// Failures talking to the engine.
#[derive(Debug, thiserror::Error)]
pub enum DockerApiError {
    #[error("request to the docker engine failed")]
    Transport(#[from] reqwest::Error),
    #[error("docker engine answered {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("unsupported docker host '{0}': only tcp and http(s) endpoints can be reached")]
    UnsupportedHost(String),
    #[error("invalid docker host '{0}'")]
    InvalidHost(String),
}

/// Error body the engine sends along with non-success statuses.
#[derive(serde::Deserialize)]
struct ErrorMessage {
    message: String,
}

/// Implements [`TaskLookup`] by querying the swarm endpoints of a Docker Engine over http.
#[derive(Debug, Clone)]
pub struct DockerApi {
    client: reqwest::Client,
    base_url: Url,
}

impl DockerApi {
    /// Construct a [`DockerApi`] talking to the engine at `base_url`, e.g. `http://10.0.0.1:2375`.
    pub fn new(base_url: &str) -> Result<Self, DockerApiError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| DockerApiError::InvalidHost(base_url.to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// Construct a [`DockerApi`] from the `DOCKER_HOST` environment variable.
    ///
    /// `tcp://` hosts are reached over plain http, unix sockets are not supported.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let host = std::env::var("DOCKER_HOST").ok();
        let base_url = engine_url(host.as_deref())?;

        Self::new(&base_url).context("failed to configure docker engine client from DOCKER_HOST")
    }

    /// List every service of the swarm.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn list_services(&self) -> Result<Vec<Service>, DockerApiError> {
        self.get_json(&["services"], &[]).await
    }

    /// Fetch a single service.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn inspect_service(&self, id: &ServiceId) -> Result<Service, DockerApiError> {
        self.get_json(&["services", id.as_str()], &[]).await
    }

    /// Append `segments` to the base url, keeping any path prefix such as an api version.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DockerApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DockerApiError::InvalidHost(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, DockerApiError> {
        let url = self.endpoint(segments)?;

        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorMessage>().await {
                Ok(body) => body.message,
                Err(_) => String::from("no error message"),
            };
            return Err(DockerApiError::Status { status, message });
        }

        Ok(response.json().await?)
    }
}

/// Map a `DOCKER_HOST` value onto the http url the client talks to.
fn engine_url(docker_host: Option<&str>) -> Result<String, DockerApiError> {
    match docker_host {
        None | Some("") => Ok(DEFAULT_DOCKER_HOST.to_string()),
        Some(host) if host.starts_with("http://") || host.starts_with("https://") => {
            Ok(host.to_string())
        }
        Some(host) => match host.strip_prefix("tcp://") {
            Some(address) => Ok(format!("http://{}", address)),
            None => Err(DockerApiError::UnsupportedHost(host.to_string())),
        },
    }
}

#[async_trait::async_trait]
impl TaskLookup for DockerApi {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, anyhow::Error> {
        let filters = serde_json::json!({
            "service": [filter.service.as_str()],
            "desired-state": [filter.desired_state.as_str()],
        });

        let tasks: Vec<Task> = self
            .get_json(&["tasks"], &[("filters", filters.to_string())])
            .await
            .with_context(|| format!("failed to list tasks of service {}", filter.service))?;
        tracing::debug!("engine reported {} tasks", tasks.len());

        Ok(tasks)
    }
}
