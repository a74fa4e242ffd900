use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the output root
pub const OUTPUT_ROOT_ENV: &str = "SCRIBD_OUTPUT_ROOT";

/// Configuration for the document downloader
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Directory under which the output directory is created
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,

    /// Name of the output directory holding transcripts and PDFs
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Name of the image working directory, relative to the output directory
    #[serde(default = "default_images_dir")]
    pub images_dir: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds (no timeout when absent)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            output_dir: default_output_dir(),
            images_dir: default_images_dir(),
            user_agent: default_user_agent(),
            request_timeout_secs: None,
        }
    }
}

/// Default value for output_root
fn default_output_root() -> PathBuf {
    PathBuf::from(".")
}

/// Default value for output_dir
fn default_output_dir() -> String {
    "scribd".to_string()
}

/// Default value for images_dir
fn default_images_dir() -> String {
    "images".to_string()
}

/// Default value for user_agent
fn default_user_agent() -> String {
    format!("scribd-dl/{}", env!("CARGO_PKG_VERSION"))
}

impl DownloaderConfig {
    /// Create a configuration rooted at the given directory
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Apply the output root from the environment, if set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var(OUTPUT_ROOT_ENV) {
            if !root.is_empty() {
                ::log::debug!("Output root overridden by {}: {}", OUTPUT_ROOT_ENV, root);
                self.output_root = PathBuf::from(root);
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// `<root>/<output_dir>`
    pub fn output_path(&self) -> PathBuf {
        self.output_root.join(&self.output_dir)
    }

    /// `<root>/<output_dir>/<images_dir>`
    pub fn images_path(&self) -> PathBuf {
        self.output_path().join(&self.images_dir)
    }

    /// Transcript file for a sanitized title
    pub fn transcript_path(&self, title: &str) -> PathBuf {
        self.output_path().join(format!("{title}.txt"))
    }

    /// Final paged document for a sanitized title
    pub fn pdf_path(&self, title: &str) -> PathBuf {
        self.output_path().join(format!("{title}.pdf"))
    }
}
