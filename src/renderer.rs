//! Renderer – ties together asset resolution, templates and inlining into a
//! single object a host keeps for its session.

use std::path::PathBuf;

use url::Url;

use crate::assets::{
    resolve_url, AssetDirectory, AssetResolver, ExtensionRuntime, PageOrigin, RuntimeUrlResolver,
};
use crate::fetch::{AssetFetcher, FetchConfig, HttpFetcher};
use crate::fields::SignatureFields;
use crate::inline::AssetInliner;
use crate::templates::{self, ResolvedAssets};
use crate::variants::descriptor;

/// Organisation assets every signature shows, as paths relative to the
/// effective base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandAssets {
    pub logo: String,
    pub facebook_icon: String,
    pub youtube_icon: String,
    pub linkedin_icon: String,
    /// Alt text for the logo (default: "Company logo").
    pub logo_alt: String,
}

impl Default for BrandAssets {
    fn default() -> Self {
        Self {
            logo: "assets/logo.svg".to_string(),
            facebook_icon: "assets/icons/facebook.svg".to_string(),
            youtube_icon: "assets/icons/youtube.svg".to_string(),
            linkedin_icon: "assets/icons/linkedin.svg".to_string(),
            logo_alt: "Company logo".to_string(),
        }
    }
}

/// Where relative references are loaded from when embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeContext {
    /// Resolve against the origin of the page hosting the UI.
    PageOrigin(Url),
    /// Resolve inside a packaged extension's URL space.
    ExtensionRuntime(Url),
    /// Resolve to files under a directory on disk.
    AssetDirectory(PathBuf),
}

impl Default for RuntimeContext {
    fn default() -> Self {
        RuntimeContext::AssetDirectory(PathBuf::from("."))
    }
}

impl RuntimeContext {
    fn build(&self) -> Box<dyn RuntimeUrlResolver> {
        match self {
            RuntimeContext::PageOrigin(origin) => Box::new(PageOrigin::new(origin.clone())),
            RuntimeContext::ExtensionRuntime(base) => Box::new(ExtensionRuntime::new(base.clone())),
            RuntimeContext::AssetDirectory(root) => Box::new(AssetDirectory::new(root.clone())),
        }
    }
}

/// Configuration for a [`SignatureRenderer`].
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Base URL used when neither the call nor the fields supply one
    /// (default: empty, paths stay relative).
    pub default_base_url: String,
    pub brand: BrandAssets,
    /// `<title>` of the standalone document (default: "Email Signature").
    pub document_title: String,
    pub runtime: RuntimeContext,
    pub fetch: FetchConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            default_base_url: String::new(),
            brand: BrandAssets::default(),
            document_title: "Email Signature".to_string(),
            runtime: RuntimeContext::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Default configuration with `default_base_url` set.
    pub fn with_base_url(default_base_url: impl Into<String>) -> Self {
        Self {
            default_base_url: default_base_url.into(),
            ..Self::default()
        }
    }

    fn title(&self) -> &str {
        if self.document_title.is_empty() {
            "Email Signature"
        } else {
            &self.document_title
        }
    }
}

/// Session object: configuration plus the asset resolver and its cache.
#[derive(Debug)]
pub struct SignatureRenderer {
    config: RendererConfig,
    resolver: AssetResolver,
}

impl Default for SignatureRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl SignatureRenderer {
    /// Build a renderer that fetches over HTTP(S) and `file://`.
    pub fn new(config: RendererConfig) -> Self {
        let fetcher = HttpFetcher::new(config.fetch.clone());
        Self::with_fetcher(config, Box::new(fetcher))
    }

    /// Build a renderer with a caller-supplied fetcher.
    pub fn with_fetcher(config: RendererConfig, fetcher: Box<dyn AssetFetcher>) -> Self {
        let resolver = AssetResolver::new(config.runtime.build(), fetcher);
        Self { config, resolver }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    /// Image `src` values for `fields`.
    ///
    /// The base URL is the first non-empty of `base_url_override`,
    /// `fields.base_url` and the configured default.
    pub fn resolve_assets(
        &self,
        fields: &SignatureFields,
        base_url_override: Option<&str>,
    ) -> ResolvedAssets {
        let base = base_url_override
            .filter(|b| !b.is_empty())
            .unwrap_or(fields.base_url.as_str());
        let default = &self.config.default_base_url;
        let brand = &self.config.brand;

        ResolvedAssets {
            portrait: resolve_url(&fields.image_url, base, default),
            logo: resolve_url(&brand.logo, base, default),
            facebook_icon: resolve_url(&brand.facebook_icon, base, default),
            youtube_icon: resolve_url(&brand.youtube_icon, base, default),
            linkedin_icon: resolve_url(&brand.linkedin_icon, base, default),
            logo_alt: brand.logo_alt.clone(),
        }
    }

    /// Signature fragment for `fields.variant`.
    pub fn render_fragment(&self, fields: &SignatureFields, base_url_override: Option<&str>) -> String {
        let assets = self.resolve_assets(fields, base_url_override);
        log::debug!("rendering {} fragment", fields.variant);
        templates::render(fields, &assets)
    }

    /// Standalone HTML document containing the fragment.
    pub fn render_document(&self, fields: &SignatureFields, base_url_override: Option<&str>) -> String {
        let fragment = self.render_fragment(fields, base_url_override);
        let background = descriptor(fields.variant).palette.page.base_color();
        templates::document(&fragment, self.config.title(), background)
    }

    /// Embed every image in `html` as a data URI. Never fails.
    pub fn inline_images(&self, html: &str) -> String {
        AssetInliner::new(&self.resolver).inline_all_images(html)
    }

    /// Fragment with every image embedded – the copy-to-clipboard payload.
    pub fn render_inlined_fragment(
        &self,
        fields: &SignatureFields,
        base_url_override: Option<&str>,
    ) -> String {
        self.inline_images(&self.render_fragment(fields, base_url_override))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_uri;
    use crate::error::{AssetError, Result};
    use crate::fetch::FetchedAsset;
    use crate::fields::Variant;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    struct StaticFetcher;

    impl AssetFetcher for StaticFetcher {
        fn fetch(&self, url: &str) -> Result<FetchedAsset> {
            if url.contains("missing") {
                return Err(AssetError::Http {
                    url: url.to_string(),
                    status: 404,
                });
            }
            Ok(FetchedAsset::new(PNG.to_vec(), Some("image/png".to_string())))
        }
    }

    fn renderer(default_base_url: &str) -> SignatureRenderer {
        let config = RendererConfig {
            runtime: RuntimeContext::PageOrigin(Url::parse("https://app.example.com/").unwrap()),
            ..RendererConfig::with_base_url(default_base_url)
        };
        SignatureRenderer::with_fetcher(config, Box::new(StaticFetcher))
    }

    #[test]
    fn base_url_precedence_is_override_then_fields_then_default() {
        let r = renderer("https://default.example.com");
        let mut fields = SignatureFields::new("Ann", "CTO");

        let assets = r.resolve_assets(&fields, None);
        assert_eq!(assets.logo, "https://default.example.com/assets/logo.svg");

        fields.base_url = "https://fields.example.com/".to_string();
        let assets = r.resolve_assets(&fields, Some(""));
        assert_eq!(assets.logo, "https://fields.example.com/assets/logo.svg");

        let assets = r.resolve_assets(&fields, Some("https://call.example.com"));
        assert_eq!(assets.youtube_icon, "https://call.example.com/assets/icons/youtube.svg");
    }

    #[test]
    fn uploaded_portrait_is_not_rewritten() {
        let r = renderer("https://default.example.com");
        let mut fields = SignatureFields::new("Ann", "CTO");
        fields.image_url = data_uri::encode("image/jpeg", b"\xFF\xD8\xFF");
        let assets = r.resolve_assets(&fields, None);
        assert_eq!(assets.portrait, fields.image_url);
    }

    #[test]
    fn document_uses_the_layout_page_colour() {
        let r = renderer("");
        let fields = SignatureFields::new("Jane Roe", "Engineer").with_variant(Variant::Dark);
        let doc = r.render_document(&fields, None);
        assert!(doc.contains("<title>Email Signature</title>"));
        assert!(doc.contains("background-color: #231F20;"));
        assert!(doc.contains(&r.render_fragment(&fields, None)));
    }

    #[test]
    fn inlined_fragment_embeds_every_reachable_image() {
        let r = renderer("https://cdn.example.com");
        let mut fields = SignatureFields::new("Ann", "CTO");
        fields.image_url = "missing/portrait.png".to_string();

        let html = r.render_inlined_fragment(&fields, None);
        let srcs: Vec<String> = crate::scan::img_sources(&html)
            .into_iter()
            .map(|a| a.value)
            .collect();
        assert!(srcs.iter().any(|s| s == "https://cdn.example.com/missing/portrait.png"));
        assert!(srcs
            .iter()
            .filter(|s| !s.contains("missing"))
            .all(|s| s.starts_with("data:image/png;base64,")));
        assert_eq!(r.inline_images(&html), html);
    }
}
