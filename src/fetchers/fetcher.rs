use crate::error::Result;
use crate::results::{AssetKind, DESCRIPTOR_SUFFIX, PageDescriptor};
use std::future::Future;

/// Source of remote content for a document run
pub trait Fetcher {
    /// Fetch a URL and decode the body as text
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String>>;

    /// Fetch a URL as raw bytes
    fn fetch_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>>>;
}

/// Payload of one fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedAsset {
    Image(Vec<u8>),
    Text(String),
}

/// Rewrites a `.jsonp` descriptor to its page image URL.
///
/// Anything not ending in the descriptor suffix is already fetchable and is
/// returned unchanged. `found` selects the `/000.jpg` serving convention over
/// the flat `.jpg` one.
pub fn resolve_descriptor(raw: &str, found: bool) -> String {
    let Some(stem) = raw.strip_suffix(DESCRIPTOR_SUFFIX) else {
        return raw.to_string();
    };

    let stem = stem.replace("/pages/", "/images/");
    if found {
        format!("{stem}/000.jpg")
    } else {
        format!("{stem}.jpg")
    }
}

/// URL to request for a descriptor, decided by its asset kind
pub fn resolve(descriptor: &PageDescriptor) -> String {
    match descriptor.kind {
        AssetKind::DirectImage | AssetKind::PageText => descriptor.raw.clone(),
        AssetKind::PageImage { found } => resolve_descriptor(&descriptor.raw, found),
    }
}

/// Resolves and downloads one descriptor. Transport failures are returned as-is.
pub async fn fetch_asset<F: Fetcher>(fetcher: &F, descriptor: &PageDescriptor) -> Result<FetchedAsset> {
    let url = resolve(descriptor);
    ::log::debug!("Fetching page {} from {}", descriptor.index, url);

    if descriptor.kind.is_image() {
        Ok(FetchedAsset::Image(fetcher.fetch_bytes(&url).await?))
    } else {
        Ok(FetchedAsset::Text(fetcher.fetch_text(&url).await?))
    }
}
