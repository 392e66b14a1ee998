//! Downloading template images.
//!
//! A batch of URLs is loaded concurrently through an [`ImageSource`] and every
//! body is decoded into a [`DownloadedImage`]. The batch completes once, with
//! one result per distinct URL.

use crate::image::DownloadedImage;
use futures_util::future::join_all;
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("invalid image URL: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("invalid image data: {0}")]
    InvalidImageData(String),
}

/// Where image bytes come from
pub trait ImageSource {
    fn load(&self, url: &Url) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Result of one batch, keyed by the URL string as requested
pub type FetchResults = HashMap<String, Result<DownloadedImage, FetchError>>;

/// Load and decode every distinct URL concurrently.
///
/// Unparseable URLs fail with [`FetchError::InvalidUrl`] without reaching the source.
pub async fn fetch_images<S, I, T>(source: &S, urls: I, max_size: u32) -> FetchResults
where
    S: ImageSource + Sync,
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let urls: BTreeSet<String> = urls.into_iter().map(|u| u.as_ref().to_string()).collect();
    if urls.is_empty() {
        return HashMap::new();
    }

    tracing::debug!("Fetching {} image(s)", urls.len());
    let loads = urls.into_iter().map(|raw| async move {
        let result = fetch_one(source, &raw, max_size).await;
        if let Err(e) = &result {
            tracing::warn!("Failed to fetch image {}: {}", raw, e);
        }
        (raw, result)
    });

    join_all(loads).await.into_iter().collect()
}

async fn fetch_one<S: ImageSource>(
    source: &S,
    raw: &str,
    max_size: u32,
) -> Result<DownloadedImage, FetchError> {
    let url = Url::parse(raw).map_err(|_| FetchError::InvalidUrl(raw.to_string()))?;
    let bytes = source.load(&url).await?;
    DownloadedImage::from_bytes(&bytes, max_size)
        .map_err(|e| FetchError::InvalidImageData(e.to_string()))
}

/// Loads images over HTTP(S)
#[cfg(feature = "http")]
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpImageSource {
    pub fn new(timeout: std::time::Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http")]
impl ImageSource for HttpImageSource {
    fn load(&self, url: &Url) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send {
        let request = self.client.get(url.clone());
        async move {
            let response = request
                .send()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| FetchError::Network(e.to_string()))?;
            Ok(bytes.to_vec())
        }
    }
}
