//! Integration tests for the signature renderer.
//!
//! These tests validate:
//! - Every layout renders without interpolation artifacts
//! - Unknown layout tags render exactly like classic
//! - The document shell wraps the fragment once
//! - URL resolution and embedding fall back instead of failing
//! - Inlining rewrites every image and is idempotent

use std::collections::HashMap;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use sig_forge::data_uri;
use sig_forge::error::{AssetError, Result};
use sig_forge::fetch::{AssetFetcher, FetchedAsset};
use sig_forge::fields::{OrganizationLinks, SignatureFields, Variant};
use sig_forge::renderer::{RendererConfig, RuntimeContext, SignatureRenderer};
use sig_forge::resolve_url;
use sig_forge::scan;

// =====================================================================
// Helpers
// =====================================================================

const PNG_1X1: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];

/// In-memory fetcher: known URLs return bytes, everything else is a 404.
#[derive(Default)]
struct MemoryFetcher {
    assets: HashMap<String, (Vec<u8>, Option<String>)>,
    calls: AtomicUsize,
}

impl MemoryFetcher {
    fn with(mut self, url: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
        self.assets
            .insert(url.to_string(), (bytes.to_vec(), content_type.map(str::to_string)));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedAsset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.assets.get(url) {
            Some((bytes, ct)) => Ok(FetchedAsset::new(bytes.clone(), ct.clone())),
            None => Err(AssetError::Http {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

fn renderer_with(fetcher: Arc<MemoryFetcher>, default_base_url: &str) -> SignatureRenderer {
    let config = RendererConfig {
        runtime: RuntimeContext::PageOrigin("https://app.example.com/".parse().unwrap()),
        ..RendererConfig::with_base_url(default_base_url)
    };
    SignatureRenderer::with_fetcher(config, Box::new(fetcher))
}

fn offline_renderer() -> SignatureRenderer {
    renderer_with(Arc::new(MemoryFetcher::default()), "")
}

fn sha256_hex(s: &str) -> String {
    Sha256::digest(s.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

// =====================================================================
// Templates
// =====================================================================

#[test]
fn empty_fields_never_render_placeholders() {
    let r = offline_renderer();
    for variant in Variant::ALL {
        let fields = SignatureFields::default().with_variant(variant);
        let html = r.render_fragment(&fields, None);
        assert!(!html.contains("undefined"), "{variant} rendered 'undefined'");
        assert!(!html.contains("null"), "{variant} rendered 'null'");
        assert!(html.starts_with("<table"), "{variant} is not a table fragment");
    }
}

#[test]
fn null_json_fields_render_like_missing_ones() {
    let r = offline_renderer();
    let from_nulls = SignatureFields::from_json(
        r#"{"name":null,"title":null,"linkedInUrl":null,"imageUrl":null,"variant":null}"#,
    )
    .unwrap();
    let html = r.render_fragment(&from_nulls, None);
    assert_eq!(html, r.render_fragment(&SignatureFields::default(), None));
    assert!(!html.contains("null"));
}

#[test]
fn unknown_tag_renders_exactly_like_classic() {
    let r = offline_renderer();
    let base = SignatureFields::new("Ann Example", "Designer");
    let classic = r.render_fragment(&base.clone().with_variant("classic"), None);

    for tag in ["retro", "", "CLASSIC ", "dark-mode"] {
        let html = r.render_fragment(&base.clone().with_variant(tag), None);
        assert_eq!(sha256_hex(&html), sha256_hex(&classic), "tag {tag:?}");
    }
}

#[test]
fn rendering_is_deterministic() {
    let r = offline_renderer();
    let fields = SignatureFields::new("Ann Example", "Designer").with_variant(Variant::Quadrant);
    let first = sha256_hex(&r.render_document(&fields, None));
    let second = sha256_hex(&r.render_document(&fields, None));
    assert_eq!(first, second);
}

#[test]
fn every_layout_renders_a_distinct_fragment() {
    let r = offline_renderer();
    let fields = SignatureFields::new("Ann Example", "Designer");
    let mut digests: Vec<String> = Variant::ALL
        .into_iter()
        .map(|v| sha256_hex(&r.render_fragment(&fields.clone().with_variant(v), None)))
        .collect();
    digests.sort();
    digests.dedup();
    assert_eq!(digests.len(), Variant::ALL.len());
}

#[test]
fn document_wraps_the_fragment_once() {
    let r = offline_renderer();
    for variant in Variant::ALL {
        let fields = SignatureFields::new("Ann", "CTO").with_variant(variant);
        let fragment = r.render_fragment(&fields, None);
        let doc = r.render_document(&fields, None);

        assert_eq!(doc.matches("<!DOCTYPE html>").count(), 1);
        assert_eq!(doc.matches("<body").count(), 1);
        assert_eq!(doc.matches("</body>").count(), 1);

        let open = doc.find("<body").unwrap();
        let body_start = open + doc[open..].find('>').unwrap() + 1;
        let body_end = doc.find("</body>").unwrap();
        assert_eq!(doc[body_start..body_end].trim(), fragment.trim());
    }
}

#[test]
fn dark_scenario_shows_name_title_and_dark_background() {
    let r = offline_renderer();
    let fields = SignatureFields::from_json(
        r#"{"name":"Jane Roe","title":"VP of Engineering","variant":"dark"}"#,
    )
    .unwrap();
    let html = r.render_fragment(&fields, None);

    assert!(html.contains("Jane Roe"));
    assert!(html.contains("VP of Engineering"));
    assert!(html.contains("#231F20"));
    for artifact in ["undefined", "null", "${", "{{"] {
        assert!(!html.contains(artifact), "found {artifact:?}");
    }
}

#[test]
fn simple_layouts_omit_linkedin_and_social_icons() {
    let r = offline_renderer();
    let mut fields = SignatureFields::new("Ann Example", "Designer").with_derived_linkedin_text();
    fields.linkedin_url = "https://linkedin.com/in/ann".to_string();
    fields.facebook_url = "https://facebook.com/example".to_string();

    for variant in [Variant::HorizontalSimple, Variant::VerticalSimple] {
        let html = r.render_fragment(&fields.clone().with_variant(variant), None);
        assert!(!html.contains("Ann on LinkedIn"), "{variant}");
        assert!(!html.contains("facebook"), "{variant}");
    }
    let classic = r.render_fragment(&fields, None);
    assert!(classic.contains("Ann on LinkedIn"));
    assert!(classic.contains("https://facebook.com/example"));
}

#[test]
fn markup_in_fields_is_escaped() {
    let r = offline_renderer();
    let fields = SignatureFields::new("<b>Ann</b> & \"Co\"", "R&D");
    let html = r.render_fragment(&fields, None);
    assert!(html.contains("&lt;b&gt;Ann&lt;/b&gt; &amp; &quot;Co&quot;"));
    assert!(!scan::element_names(&html).contains(&"b".to_string()));
}

#[test]
fn organization_links_overlay_the_snapshot() {
    let r = offline_renderer();
    let links = OrganizationLinks {
        website_url: "https://example.com".to_string(),
        website_text: "example.com".to_string(),
        ..OrganizationLinks::default()
    };
    let fields = SignatureFields::new("Ann", "CTO").with_organization(&links);
    let html = r.render_fragment(&fields, None);
    assert!(html.contains("href=\"https://example.com\""));
    assert!(html.contains(">example.com<"));
}

// =====================================================================
// Asset resolution
// =====================================================================

#[test]
fn resolve_url_examples() {
    assert_eq!(
        resolve_url("assets/logo.png", "", "https://cdn.example.com/"),
        "https://cdn.example.com/assets/logo.png"
    );
    assert_eq!(resolve_url("assets/logo.png", "", ""), "assets/logo.png");
    assert_eq!(
        resolve_url("data:image/png;base64,AAAA", "https://cdn.example.com", ""),
        "data:image/png;base64,AAAA"
    );
}

#[test]
fn failed_fetch_keeps_the_original_reference() {
    let fetcher = Arc::new(MemoryFetcher::default());
    let r = renderer_with(fetcher.clone(), "");
    let url = "https://example.com/broken.png";

    assert_eq!(r.resolver().to_embedded(url), url);
    assert_eq!(fetcher.calls(), 1);
    assert!(r.resolver().cache().is_empty());
}

#[test]
fn embedded_portrait_is_never_fetched() {
    let fetcher = Arc::new(MemoryFetcher::default());
    let r = renderer_with(fetcher.clone(), "https://cdn.example.com");
    let mut fields = SignatureFields::new("Ann", "CTO");
    fields.image_url = data_uri::encode("image/png", PNG_1X1);

    let assets = r.resolve_assets(&fields, None);
    assert_eq!(assets.portrait, fields.image_url);
    assert_eq!(r.resolver().to_embedded(&assets.portrait), fields.image_url);
    assert_eq!(fetcher.calls(), 0);
}

// =====================================================================
// Inlining
// =====================================================================

#[test]
fn inlining_is_idempotent() {
    let fetcher = Arc::new(
        MemoryFetcher::default()
            .with("https://cdn.example.com/a.png", PNG_1X1, Some("image/png"))
            .with("https://app.example.com/assets/b.png", PNG_1X1, None),
    );
    let r = renderer_with(fetcher.clone(), "");
    let html = r#"<table><tr>
<td><img src="https://cdn.example.com/a.png" alt="a"></td>
<td><img src='assets/b.png'></td>
<td><svg viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></svg></td>
</tr></table>"#;

    let once = r.inline_images(html);
    let calls = fetcher.calls();
    let twice = r.inline_images(&once);

    assert_eq!(once, twice);
    assert_eq!(fetcher.calls(), calls, "second pass fetched again");
    assert!(scan::img_sources(&once)
        .iter()
        .all(|a| data_uri::is_embedded(&a.value)));
    assert!(once.contains("<img src='data:image/png;base64,"));
}

#[test]
fn inlining_preserves_tag_structure() {
    let fetcher = Arc::new(MemoryFetcher::default().with(
        "https://cdn.example.com/a.png",
        PNG_1X1,
        Some("image/png"),
    ));
    let r = renderer_with(fetcher, "");
    let html = r#"<table><tr><td><img src="https://cdn.example.com/a.png"></td><td><svg><g><rect/></g></svg></td></tr></table>"#;

    let out = r.inline_images(html);
    assert_eq!(
        scan::element_names(&out),
        vec!["table", "tr", "td", "img", "td", "img"]
    );
}

#[test]
fn unreachable_images_stay_put_while_others_embed() {
    let fetcher = Arc::new(MemoryFetcher::default().with(
        "https://cdn.example.com/ok.png",
        PNG_1X1,
        Some("image/png"),
    ));
    let r = renderer_with(fetcher, "");
    let html = r#"<img src="https://cdn.example.com/ok.png"><img src="https://example.com/broken.png">"#;

    let out = r.inline_images(html);
    assert!(out.contains(r#"<img src="https://example.com/broken.png">"#));
    assert!(out.starts_with(r#"<img src="data:image/png;base64,"#));
}

#[test]
fn nothing_to_inline_means_no_fetch() {
    let fetcher = Arc::new(MemoryFetcher::default());
    let r = renderer_with(fetcher.clone(), "");
    let html = format!(
        r#"<p>Hi</p><img src="{}">"#,
        data_uri::encode("image/png", PNG_1X1)
    );

    assert_eq!(r.inline_images(&html), html);
    assert_eq!(fetcher.calls(), 0);
}

#[test]
fn repeated_references_are_fetched_once() {
    let fetcher = Arc::new(MemoryFetcher::default().with(
        "https://cdn.example.com/icon.png",
        PNG_1X1,
        Some("image/png"),
    ));
    let r = renderer_with(fetcher.clone(), "");
    let html = r#"<img src="https://cdn.example.com/icon.png"><img SRC="https://cdn.example.com/icon.png">"#;

    let out = r.inline_images(html);
    assert_eq!(out.matches("data:image/png;base64,").count(), 2);
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn padded_src_values_are_still_replaced() {
    let fetcher = Arc::new(MemoryFetcher::default().with(
        "https://cdn.example.com/a.png",
        PNG_1X1,
        Some("image/png"),
    ));
    let r = renderer_with(fetcher, "");
    let html = r#"<img src=" https://cdn.example.com/a.png ">"#;

    let out = r.inline_images(html);
    assert!(out.starts_with(r#"<img src="data:image/png;base64,"#), "{out}");
    assert_eq!(r.inline_images(&out), out);
}

#[test]
fn entity_encoded_urls_are_fetched_decoded() {
    let fetcher = Arc::new(MemoryFetcher::default().with(
        "https://cdn.example.com/img?w=24&h=24",
        PNG_1X1,
        Some("image/png"),
    ));
    let r = renderer_with(fetcher, "");
    let html = r#"<img src="https://cdn.example.com/img?w=24&amp;h=24">"#;

    let out = r.inline_images(html);
    assert!(out.starts_with(r#"<img src="data:image/png;base64,"#), "{out}");
}

#[test]
fn inlined_fragment_reads_brand_assets_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("assets/icons")).unwrap();
    let svg = br#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><rect width="24" height="24"/></svg>"#;
    for name in ["assets/logo.svg", "assets/icons/facebook.svg", "assets/icons/youtube.svg", "assets/icons/linkedin.svg"] {
        fs::write(dir.path().join(name), svg).unwrap();
    }

    let config = RendererConfig {
        runtime: RuntimeContext::AssetDirectory(dir.path().to_path_buf()),
        ..RendererConfig::default()
    };
    let r = SignatureRenderer::new(config);
    let fields = SignatureFields::new("Ann", "CTO");

    let html = r.render_inlined_fragment(&fields, None);
    let srcs: Vec<String> = scan::img_sources(&html).into_iter().map(|a| a.value).collect();
    assert_eq!(srcs.len(), 4, "logo and three icons");
    for src in srcs {
        let parsed = data_uri::parse(&src).unwrap();
        assert_eq!(parsed.mime, "image/svg+xml");
        assert_eq!(parsed.bytes, svg);
    }
}
