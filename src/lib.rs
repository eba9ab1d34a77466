//! # sig-forge – email signatures that survive every mail client
//!
//! This crate turns a small set of contact fields into a table-based HTML
//! signature with inline styles, and can embed every image in that HTML as
//! a `data:` URI so the signature pastes intact into any composer. The
//! stages are:
//!
//! 1. **Fields** – the persisted snapshot and its layout tag ([`fields`])
//! 2. **Layout** – one descriptor per layout variant ([`variants`])
//! 3. **Template** – descriptor + fields → HTML fragment or document ([`templates`])
//! 4. **Assets** – URL resolution and fetch-and-embed with a cache ([`assets`], [`fetch`])
//! 5. **Inline** – rewrite inline SVG and `<img src>` as data URIs ([`inline`])
//!
//! [`renderer::SignatureRenderer`] owns one session and drives the stages.
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod assets;
pub mod data_uri;
pub mod error;
pub mod ffi;
pub mod fetch;
pub mod fields;
pub mod inline;
pub mod renderer;
pub mod scan;
pub mod templates;
pub mod variants;

// Re-exports for convenience
pub use assets::{resolve_url, AssetResolver};
pub use error::AssetError;
pub use fields::{OrganizationLinks, SignatureFields, Variant};
pub use renderer::{BrandAssets, RendererConfig, RuntimeContext, SignatureRenderer};
