//! Asset inlining – rewrite every image in finished HTML as a `data:` URI.
//!
//! Mail composers often block remote images or drop them on paste, so the
//! copy-paste payload carries its images with it. The pass runs in a fixed
//! order:
//!
//! 1. inline `<svg>` blocks become `<img>` tags with an SVG data URI;
//! 2. the rewritten HTML is re-scanned for `<img src>` values that are not
//!    embedded yet;
//! 3. with nothing to do the input comes back untouched, no fetch made;
//! 4. the distinct references are fetched concurrently and every
//!    `src="…"` / `src='…'` occurrence is replaced;
//! 5. references that failed to embed are left as they were.
//!
//! Running the pass on its own output is a no-op.

use std::ops::Range;
use std::sync::OnceLock;

use rayon::prelude::*;
use regex::{Captures, Regex};

use crate::assets::AssetResolver;
use crate::data_uri::{self, SVG_MIME};
use crate::error::{AssetError, Result};
use crate::scan;
use crate::templates::escape;

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";
const ICON_SIZE: u32 = 24;
/// Inline SVG larger than this is left in place.
const MAX_INLINE_SVG_BYTES: usize = 256 * 1024;

fn compile(pattern: &'static str, desc: &'static str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid {desc} regex: {err}"))
}

/// Rewrites images in HTML using a session's [`AssetResolver`].
#[derive(Debug, Clone, Copy)]
pub struct AssetInliner<'a> {
    resolver: &'a AssetResolver,
}

impl<'a> AssetInliner<'a> {
    pub fn new(resolver: &'a AssetResolver) -> Self {
        Self { resolver }
    }

    /// Embed every image in `html`. Never fails; see the module docs for
    /// the exact steps.
    pub fn inline_all_images(&self, html: &str) -> String {
        let html = inline_svg_blocks(html);

        let refs = external_image_refs(&html);
        if refs.is_empty() {
            return html;
        }
        log::debug!("embedding {} external image reference(s)", refs.len());

        let embedded: Vec<(String, String)> = refs
            .par_iter()
            .map(|raw| {
                let reference = scan::decode_entities(raw);
                (raw.clone(), self.resolver.to_embedded(&reference))
            })
            .collect();

        let mut out = html;
        for (raw, data) in embedded {
            if data_uri::is_embedded(&data) {
                out = replace_src(&out, &raw, &data);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Step 1: inline SVG
// ---------------------------------------------------------------------------

/// Replace every `<svg>…</svg>` block with an equivalent `<img>` tag.
///
/// Blocks are replaced back to front so earlier byte ranges stay valid. A
/// block that cannot be converted is left exactly as it was.
pub fn inline_svg_blocks(html: &str) -> String {
    let blocks = scan::svg_blocks(html);
    if blocks.is_empty() {
        return html.to_string();
    }

    let mut out = html.to_string();
    for range in blocks.into_iter().rev() {
        let block = &html[range.clone()];
        let img = match svg_to_img(block) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("leaving inline SVG in place: {e}");
                continue;
            }
        };
        match replace_block(&out, range, block, &img) {
            Some(next) => out = next,
            None => log::warn!("inline SVG block no longer present, skipped"),
        }
    }
    out
}

/// Encode one `<svg>` block as an `<img>` tag.
pub fn svg_to_img(block: &str) -> Result<String> {
    static PROLOG: OnceLock<Regex> = OnceLock::new();
    let prolog = PROLOG.get_or_init(|| compile(r"(?is)<\?xml.*?\?>|<!DOCTYPE\s+svg[^>]*>", "xml prolog"));

    let markup = prolog.replace_all(block, "");
    let markup = markup.trim();

    if markup.len() > MAX_INLINE_SVG_BYTES {
        return Err(AssetError::MalformedSvg {
            reason: format!("{} bytes exceeds the inline limit", markup.len()),
        });
    }

    let tokens = scan::tokenize(markup);
    let root = match tokens.first() {
        Some(scan::Token::StartTag(tag)) if tag.name == "svg" && tag.range.start == 0 => tag,
        _ => {
            return Err(AssetError::MalformedSvg {
                reason: "block does not start with an <svg> tag".to_string(),
            })
        }
    };
    let closed = root.self_closing
        || matches!(
            tokens.last(),
            Some(scan::Token::EndTag { name, range }) if name == "svg" && range.end == markup.len()
        );
    if !closed {
        return Err(AssetError::MalformedSvg {
            reason: "block does not end with </svg>".to_string(),
        });
    }
    let scripted = tokens.iter().any(|t| match t {
        scan::Token::StartTag(tag) => {
            tag.name == "script"
                || tag
                    .attributes
                    .iter()
                    .any(|a| a.name.len() > 2 && a.name.starts_with("on"))
        }
        scan::Token::EndTag { .. } => false,
    });
    if scripted {
        return Err(AssetError::MalformedSvg {
            reason: "scripted SVG cannot be embedded as an image".to_string(),
        });
    }

    let alt = root
        .attr("aria-label")
        .map(|a| escape(&scan::decode_entities(&a.value)))
        .unwrap_or_default();

    let encoded = if root.attr("xmlns").is_some() {
        data_uri::encode(SVG_MIME, markup.as_bytes())
    } else {
        // "<svg" is 4 bytes; the namespace goes right after the tag name.
        let with_ns = format!(
            "{} xmlns=\"{SVG_NAMESPACE}\"{}",
            &markup[..4],
            &markup[4..]
        );
        data_uri::encode(SVG_MIME, with_ns.as_bytes())
    };

    Ok(format!(
        "<img src=\"{encoded}\" alt=\"{alt}\" width=\"{ICON_SIZE}\" height=\"{ICON_SIZE}\" border=\"0\" style=\"display: block; width: {ICON_SIZE}px; height: {ICON_SIZE}px; border: 0; outline: none; text-decoration: none;\" />"
    ))
}

/// Put `replacement` where `block` was found in `html`.
///
/// Tries the recorded byte range first, then an exact search, then a
/// whitespace-tolerant pattern. Returns `None` when the block is gone.
pub fn replace_block(html: &str, range: Range<usize>, block: &str, replacement: &str) -> Option<String> {
    if html.get(range.clone()) == Some(block) {
        let mut out = String::with_capacity(html.len() - block.len() + replacement.len());
        out.push_str(&html[..range.start]);
        out.push_str(replacement);
        out.push_str(&html[range.end..]);
        return Some(out);
    }
    if let Some(start) = html.find(block) {
        let mut out = html.to_string();
        out.replace_range(start..start + block.len(), replacement);
        return Some(out);
    }

    let pattern = Regex::new(&whitespace_tolerant_pattern(block)).ok()?;
    let found = pattern.find(html)?;
    let mut out = html.to_string();
    out.replace_range(found.range(), replacement);
    Some(out)
}

/// A pattern matching `block` with any run of whitespace, including none,
/// wherever `block` has whitespace or a tag boundary.
fn whitespace_tolerant_pattern(block: &str) -> String {
    let mut pattern = String::with_capacity(block.len() * 2);
    let mut in_space = false;
    for c in block.chars() {
        if c.is_whitespace() {
            if !in_space {
                pattern.push_str(r"\s*");
                in_space = true;
            }
            continue;
        }
        in_space = false;
        if c == '<' {
            pattern.push_str(r"\s*<");
        } else if c == '>' {
            pattern.push_str(r">\s*");
        } else {
            pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
        }
    }
    pattern
        .trim_start_matches(r"\s*")
        .trim_end_matches(r"\s*")
        .to_string()
}

// ---------------------------------------------------------------------------
// Steps 2–5: external images
// ---------------------------------------------------------------------------

/// Distinct raw `<img src>` values that are not embedded yet, in order of
/// first appearance.
pub fn external_image_refs(html: &str) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    for attr in scan::img_sources(html) {
        let value = attr.value.trim();
        if value.is_empty() || data_uri::is_embedded(value) {
            continue;
        }
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Replace every `src` attribute whose value is exactly `raw` with `data`.
///
/// The attribute name matches case-insensitively; the value must match
/// exactly, apart from whitespace just inside the quotes. Quote style is
/// preserved and unquoted values get double quotes.
pub fn replace_src(html: &str, raw: &str, data: &str) -> String {
    let escaped = regex::escape(raw);
    let pattern = format!(
        r#"(\b(?i:src)\s*=\s*)(?:"\s*{escaped}\s*"|'\s*{escaped}\s*'|{escaped}([\s>]|/>))"#
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            log::warn!("cannot build src pattern for {raw}: {e}");
            return html.to_string();
        }
    };

    re.replace_all(html, |caps: &Captures| {
        let prefix = &caps[1];
        let whole = &caps[0];
        match caps.get(2) {
            Some(tail) => format!("{prefix}\"{data}\"{}", tail.as_str()),
            None if whole.ends_with('\'') => format!("{prefix}'{data}'"),
            None => format!("{prefix}\"{data}\""),
        }
    })
    .into_owned()
}
