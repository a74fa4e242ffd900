use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while downloading and rebuilding a document
#[derive(Error, Debug)]
pub enum Error {
    /// Network failure, non-2xx status or timeout
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The document reference is not an absolute http(s) URL
    #[error("Invalid document URL '{0}'")]
    InvalidUrl(String),

    /// A text page payload did not match the callback wrapper
    #[error("Malformed page payload from {url}: {reason}")]
    MalformedPayload { url: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF encoding error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Image decoding or re-encoding error
    #[error("Image error in {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Config could not be parsed
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
