//! Asset resolution – turns image references into final `src` values.
//!
//! Two operations:
//!
//! - [`resolve_url`] is pure path algebra: qualify a relative path with a
//!   base URL, leave everything else alone.
//! - [`AssetResolver::to_embedded`] fetches the bytes behind a reference and
//!   returns a `data:` URI, caching by the original reference. It never
//!   fails: on any error the original reference comes back unchanged.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use url::Url;

use crate::data_uri;
use crate::fetch::AssetFetcher;

// ---------------------------------------------------------------------------
// URL algebra
// ---------------------------------------------------------------------------

/// Qualify `path` with a base URL.
///
/// The effective base is `base_url_override` when non-empty, else
/// `default_base_url`. Embedded images, absolute `http(s)` URLs and empty
/// paths are returned unchanged; so is every path when no base is set.
/// Unlike a plain `base + "/" + path` join, absolute and empty paths are
/// never prefixed, so an absolute portrait URL survives any base.
pub fn resolve_url(path: &str, base_url_override: &str, default_base_url: &str) -> String {
    if path.is_empty() || data_uri::is_embedded(path) || is_absolute_http(path) {
        return path.to_string();
    }
    let base = if base_url_override.is_empty() {
        default_base_url
    } else {
        base_url_override
    };
    if base.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.strip_suffix('/').unwrap_or(base),
        path.strip_prefix('/').unwrap_or(path)
    )
}

fn is_absolute_http(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ---------------------------------------------------------------------------
// Runtime URL capability
// ---------------------------------------------------------------------------

/// Turns a reference found in markup into something a fetcher can load.
///
/// Which implementation is used depends on where the host runs; it is
/// chosen once at startup.
pub trait RuntimeUrlResolver: Send + Sync {
    fn resolve_runtime_url(&self, path: &str) -> String;
}

/// Relative paths resolve against the origin of the page hosting the UI.
#[derive(Debug, Clone)]
pub struct PageOrigin {
    origin: Url,
}

impl PageOrigin {
    pub fn new(origin: Url) -> Self {
        Self { origin }
    }
}

impl RuntimeUrlResolver for PageOrigin {
    fn resolve_runtime_url(&self, path: &str) -> String {
        join_or_keep(&self.origin, path)
    }
}

/// Relative paths resolve inside a packaged extension's own URL space
/// (e.g. `chrome-extension://<id>/`), always from the package root.
#[derive(Debug, Clone)]
pub struct ExtensionRuntime {
    base: Url,
}

impl ExtensionRuntime {
    pub fn new(base: Url) -> Self {
        Self { base }
    }
}

impl RuntimeUrlResolver for ExtensionRuntime {
    fn resolve_runtime_url(&self, path: &str) -> String {
        if Url::parse(path).is_ok() {
            return path.to_string();
        }
        join_or_keep(&self.base, &format!("/{}", path.trim_start_matches('/')))
    }
}

/// Relative paths resolve to `file://` URLs under a directory on disk.
#[derive(Debug, Clone)]
pub struct AssetDirectory {
    root: PathBuf,
}

impl AssetDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl RuntimeUrlResolver for AssetDirectory {
    fn resolve_runtime_url(&self, path: &str) -> String {
        if Url::parse(path).is_ok() {
            return path.to_string();
        }
        let full = self.root.join(path.trim_start_matches('/'));
        match Url::from_file_path(&full) {
            Ok(url) => url.to_string(),
            Err(()) => {
                log::debug!("cannot express {} as a file URL", full.display());
                path.to_string()
            }
        }
    }
}

fn join_or_keep(base: &Url, path: &str) -> String {
    match base.join(path) {
        Ok(url) => url.to_string(),
        Err(e) => {
            log::debug!("cannot resolve {path:?} against {base}: {e}");
            path.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Original reference → embedded data URI.
///
/// Append-only for the lifetime of its owner. The first value stored for a
/// key wins; later inserts of the same key are ignored.
#[derive(Debug, Default)]
pub struct AssetCache {
    entries: RwLock<HashMap<String, String>>,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, reference: &str) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|map| map.get(reference).cloned())
    }

    /// Store `data_uri` for `reference` unless a value is already present.
    /// Returns the value now cached.
    pub fn insert(&self, reference: &str, data_uri: String) -> String {
        match self.entries.write() {
            Ok(mut map) => map
                .entry(reference.to_string())
                .or_insert(data_uri)
                .clone(),
            Err(_) => data_uri,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Owns the runtime capability, the fetcher and the embed cache for one
/// session.
pub struct AssetResolver {
    runtime: Box<dyn RuntimeUrlResolver>,
    fetcher: Box<dyn AssetFetcher>,
    cache: AssetCache,
}

impl AssetResolver {
    pub fn new(runtime: Box<dyn RuntimeUrlResolver>, fetcher: Box<dyn AssetFetcher>) -> Self {
        Self {
            runtime,
            fetcher,
            cache: AssetCache::new(),
        }
    }

    pub fn cache(&self) -> &AssetCache {
        &self.cache
    }

    /// Absolute URL the fetcher will be asked to load for `path`.
    pub fn fetchable_url(&self, path: &str) -> String {
        self.runtime.resolve_runtime_url(path)
    }

    /// Embed the asset behind `path` as a data URI.
    ///
    /// Already-embedded references are returned as is. Results are cached by
    /// `path`. Any failure is logged and yields `path` unchanged.
    pub fn to_embedded(&self, path: &str) -> String {
        if path.is_empty() || data_uri::is_embedded(path) {
            return path.to_string();
        }
        if let Some(hit) = self.cache.get(path) {
            log::debug!("asset cache hit for {path}");
            return hit;
        }

        let url = self.fetchable_url(path);
        let fetched = match self.fetcher.fetch(&url) {
            Ok(fetched) => fetched,
            Err(e) => {
                log::warn!("keeping original reference {path}: {e}");
                return path.to_string();
            }
        };

        let Some(mime) = data_uri::detect_mime(fetched.content_type.as_deref(), &fetched.bytes, &url)
        else {
            log::warn!("keeping original reference {path}: not a recognisable image");
            return path.to_string();
        };

        log::debug!("embedded {path} as {mime} ({} bytes)", fetched.bytes.len());
        self.cache.insert(path, data_uri::encode(&mime, &fetched.bytes))
    }
}

impl std::fmt::Debug for AssetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetResolver")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}
