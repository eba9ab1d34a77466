//! Error types for asset fetching and embedding.
//!
//! None of these escape the public rendering API: every [`AssetError`] is
//! logged and replaced by a best-effort fallback (usually the original,
//! unresolved reference).

use thiserror::Error;

/// Recoverable failures while turning an asset reference into a data URI.
#[derive(Debug, Error)]
pub enum AssetError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    /// Transport-level failure (DNS, TLS, timeout, reset).
    #[error("network error fetching {url}: {reason}")]
    Network { url: String, reason: String },

    /// A local asset could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The response body exceeded the configured limit.
    #[error("{url} exceeds the {limit} byte asset limit")]
    TooLarge { url: String, limit: usize },

    /// The response body was empty.
    #[error("empty response body for {url}")]
    Empty { url: String },

    /// The reference uses a scheme the fetcher cannot load.
    #[error("unsupported URL scheme: {url}")]
    UnsupportedScheme { url: String },

    /// An inline `<svg>` block could not be turned into an image.
    #[error("malformed inline SVG: {reason}")]
    MalformedSvg { reason: String },

    /// A `data:` URI could not be parsed.
    #[error("invalid data URI: {reason}")]
    InvalidDataUri { reason: String },
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;
