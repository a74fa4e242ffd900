pub mod fetcher;
pub mod http;

pub use fetcher::{FetchedAsset, Fetcher, fetch_asset, resolve, resolve_descriptor};
pub use http::HttpFetcher;
