use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use proofuino_common::{ApiFlavor, Command, DashboardConfig, StatusSnapshot, PATH_STATUS};

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("status payload from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The device as seen by the dashboard.
#[async_trait]
pub trait DeviceApi: Send + Sync + 'static {
    async fn fetch_status(&self) -> Result<StatusSnapshot, DeviceError>;
    async fn send(&self, command: Command) -> Result<(), DeviceError>;
}

#[derive(Debug, Clone)]
pub struct HttpDevice {
    client: Client,
    base_url: String,
    api: ApiFlavor,
}

impl HttpDevice {
    pub fn new(config: &DashboardConfig) -> Result<Self, DeviceError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(DeviceError::Client)?;

        Ok(Self {
            client,
            base_url: config.device_url.trim_end_matches('/').to_string(),
            api: config.api,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl DeviceApi for HttpDevice {
    async fn fetch_status(&self) -> Result<StatusSnapshot, DeviceError> {
        let url = self.url(PATH_STATUS);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| DeviceError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status { url, status });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| DeviceError::Transport {
                url: url.clone(),
                source,
            })?;
        serde_json::from_slice(&body).map_err(|source| DeviceError::Decode { url, source })
    }

    async fn send(&self, command: Command) -> Result<(), DeviceError> {
        let request = command.request(self.api);
        let url = self.url(request.path);

        let mut builder = self.client.post(&url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| DeviceError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Status { url, status });
        }
        debug!("{url} answered {status}");
        Ok(())
    }
}
