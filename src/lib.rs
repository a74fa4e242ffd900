// Re-export modules
pub mod assemblers;
pub mod config;
pub mod error;
pub mod fetchers;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use error::{Error, Result};
pub use pipeline::DocumentPipeline;
pub use results::{Mode, RunSummary};

use assemblers::PdfEncoder;
use config::DownloaderConfig;
use fetchers::HttpFetcher;
use std::path::PathBuf;

/// Main builder for downloading one document
pub struct Downloader {
    url: String,
    mode: Mode,
    config: DownloaderConfig,
    output_root: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl Downloader {
    /// Create a new Downloader for the given viewer page URL, in text mode
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: Mode::Text,
            config: DownloaderConfig::default(),
            output_root: None,
            request_timeout_secs: None,
        }
    }

    /// Set the output mode
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Download page images and assemble a PDF instead of a transcript
    pub fn with_images(self, images: bool) -> Self {
        self.with_mode(if images { Mode::Images } else { Mode::Text })
    }

    /// Override the output root (takes precedence over config and environment)
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    /// Override the per-request timeout
    pub fn with_request_timeout(mut self, timeout_seconds: u64) -> Self {
        self.request_timeout_secs = Some(timeout_seconds);
        self
    }

    /// Set the base configuration
    pub fn with_config(mut self, config: DownloaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the base configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config = DownloaderConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Load the base configuration from a JSON string
    pub fn with_config_str(self, config_str: &str) -> Result<Self> {
        let config = DownloaderConfig::from_json(config_str)?;
        Ok(self.with_config(config))
    }

    /// Effective configuration: builder overrides, then environment, then config
    pub fn resolved_config(&self) -> DownloaderConfig {
        let mut config = self.config.clone().with_env_overrides();
        if let Some(root) = &self.output_root {
            config.output_root = root.clone();
        }
        if let Some(secs) = self.request_timeout_secs {
            config.request_timeout_secs = Some(secs);
        }
        config
    }

    /// Download the document and assemble the output
    pub async fn run(self) -> Result<RunSummary> {
        let config = self.resolved_config();
        let fetcher = HttpFetcher::new(&config)?;
        let pipeline = DocumentPipeline::new(fetcher, PdfEncoder::default(), config);

        pipeline.run(&self.url, self.mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_to_text_mode() {
        let downloader = Downloader::new("https://www.scribd.com/document/1/x");
        assert_eq!(downloader.mode, Mode::Text);
        assert_eq!(downloader.with_images(true).mode, Mode::Images);
    }

    #[test]
    fn test_builder_overrides_config() {
        let downloader = Downloader::new("https://www.scribd.com/document/1/x")
            .with_config_str(r#"{"output_root": "/from/config", "request_timeout_secs": 5}"#)
            .unwrap()
            .with_output_root("/from/cli")
            .with_request_timeout(60);

        let config = downloader.resolved_config();
        assert_eq!(config.output_root, PathBuf::from("/from/cli"));
        assert_eq!(config.request_timeout_secs, Some(60));
    }
}
