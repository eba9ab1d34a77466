//! Asset fetching – the only I/O the core performs.
//!
//! [`AssetFetcher`] is the seam: the renderer only ever sees the trait, so a
//! host can plug in its own transport and tests can use an in-memory map.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AssetError, Result};

const DEFAULT_USER_AGENT: &str = concat!("sig-forge/", env!("CARGO_PKG_VERSION"));

/// Raw bytes of a fetched asset plus the transport's content type, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedAsset {
    pub fn new(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        Self { bytes, content_type }
    }
}

/// Loads the bytes behind an absolute asset URL.
pub trait AssetFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchedAsset>;
}

impl<T: AssetFetcher + ?Sized> AssetFetcher for Arc<T> {
    fn fetch(&self, url: &str) -> Result<FetchedAsset> {
        (**self).fetch(url)
    }
}

impl<T: AssetFetcher + ?Sized> AssetFetcher for Box<T> {
    fn fetch(&self, url: &str) -> Result<FetchedAsset> {
        (**self).fetch(url)
    }
}

/// Transport limits for [`HttpFetcher`].
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Whole-request timeout (default: 10 s).
    pub timeout: Duration,
    /// Largest accepted body in bytes (default: 5 MiB).
    pub max_size: usize,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_size: 5 * 1024 * 1024,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Default fetcher: `http(s)://` over ureq, `file://` from disk.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    config: FetchConfig,
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { config, agent }
    }

    fn fetch_http(&self, url: &str) -> Result<FetchedAsset> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", "image/*,*/*;q=0.8")
            .call()
            .map_err(|e| AssetError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(AssetError::Http {
                url: url.to_string(),
                status,
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.config.max_size as u64)
            .read_to_vec()
            .map_err(|e| match e {
                ureq::Error::BodyExceedsLimit(_) => AssetError::TooLarge {
                    url: url.to_string(),
                    limit: self.config.max_size,
                },
                other => AssetError::Network {
                    url: url.to_string(),
                    reason: other.to_string(),
                },
            })?;

        if bytes.is_empty() {
            return Err(AssetError::Empty {
                url: url.to_string(),
            });
        }
        Ok(FetchedAsset::new(bytes, content_type))
    }

    fn fetch_file(&self, url: &str) -> Result<FetchedAsset> {
        let path = url::Url::parse(url)
            .ok()
            .and_then(|u| u.to_file_path().ok())
            .ok_or_else(|| AssetError::UnsupportedScheme {
                url: url.to_string(),
            })?;

        let io_err = |source: io::Error| AssetError::Io {
            path: path.display().to_string(),
            source,
        };
        let len = std::fs::metadata(&path).map_err(io_err)?.len();
        if len as usize > self.config.max_size {
            return Err(AssetError::TooLarge {
                url: url.to_string(),
                limit: self.config.max_size,
            });
        }
        let bytes = std::fs::read(&path).map_err(io_err)?;
        if bytes.is_empty() {
            return Err(AssetError::Empty {
                url: url.to_string(),
            });
        }
        Ok(FetchedAsset::new(bytes, None))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedAsset> {
        let scheme = url.split_once(':').map(|(s, _)| s.to_ascii_lowercase());
        match scheme.as_deref() {
            Some("http") | Some("https") => self.fetch_http(url),
            Some("file") => self.fetch_file(url),
            _ => Err(AssetError::UnsupportedScheme {
                url: url.to_string(),
            }),
        }
    }
}
