use crate::config::DownloaderConfig;
use crate::error::{Error, Result};
use crate::fetchers::fetcher::Fetcher;
use reqwest::{Client, Response};

/// `Fetcher` backed by a single reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds the client from config. A single attempt per request, no retries.
    pub fn new(config: &DownloaderConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Sends a GET and rejects non-2xx responses
    async fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(Response::error_for_status)
            .map_err(|source| transport(url, source))?;

        ::log::trace!("GET {} -> {}", url, response.status());
        Ok(response)
    }
}

fn transport(url: &str, source: reqwest::Error) -> Error {
    Error::Transport {
        url: url.to_string(),
        source,
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|source| transport(url, source))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let bytes = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|source| transport(url, source))?;
        Ok(bytes.to_vec())
    }
}
