//! C-compatible FFI API for host UIs (webview shells, browser-extension
//! native hosts, desktop wrappers).
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Handles
//! - `sigforge_renderer_new` / `sigforge_renderer_new_ex` return an opaque
//!   [`SigforgeRenderer`] owning the asset cache for one session.
//! - Release it with `sigforge_renderer_free`.
//!
//! ## Memory management
//! - Strings returned through `out_*` parameters are allocated on the Rust heap.
//! - Callers **must** free them with `sigforge_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int`:
//!   `0` success, `1` null pointer, `2` invalid UTF-8, `3` invalid field JSON.
//! - Error details can be retrieved via `sigforge_last_error`.
//! - Asset failures are never errors: the affected image keeps its
//!   original reference.
//!
//! ## Thread safety
//! - `sigforge_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads.
//! - A renderer handle may be shared between threads.
//!
//! ## Usage from C
//! ```c
//! SigforgeRenderer *r = sigforge_renderer_new("https://cdn.example.com/");
//! char *html = NULL;
//! if (sigforge_render_fragment(r, fields_json, NULL, &html) == 0) {
//!     /* ... */
//!     sigforge_free_string(html);
//! }
//! sigforge_renderer_free(r);
//! ```

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;
use std::ptr;
use std::slice;
use std::time::Duration;

use url::Url;

use crate::fields::SignatureFields;
use crate::renderer::{RendererConfig, RuntimeContext, SignatureRenderer};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = RefCell::new(None);
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Opaque renderer handle.
pub struct SigforgeRenderer {
    inner: SignatureRenderer,
}

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

/// Where relative image references are loaded from when inlining.
#[repr(C)]
pub enum SigforgeRuntime {
    /// Files under the directory given in `runtime_base` (default: `.`).
    AssetDirectory = 0,
    /// URLs relative to the page origin given in `runtime_base`.
    PageOrigin = 1,
    /// URLs inside the extension package rooted at `runtime_base`.
    ExtensionRuntime = 2,
}

/// Optional configuration passed to `sigforge_renderer_new_ex`.
///
/// Null strings and zero numbers fall back to their defaults:
/// - `default_base_url` → "" (paths stay relative)
/// - `document_title`   → "Email Signature"
/// - `runtime_base`     → "." for `AssetDirectory`
/// - `timeout_ms`       → 10 000
#[repr(C)]
pub struct SigforgeRendererConfig {
    /// Null-terminated UTF-8 default base URL.
    pub default_base_url: *const c_char,
    /// Null-terminated UTF-8 `<title>` for standalone documents.
    pub document_title: *const c_char,
    pub runtime: SigforgeRuntime,
    /// Directory or URL interpreted according to `runtime`.
    pub runtime_base: *const c_char,
    /// Per-fetch timeout in milliseconds.
    pub timeout_ms: u32,
}

/// Read an optional C string. Null yields `None`.
///
/// # Safety
/// `s`, if non-null, must point to a valid null-terminated string.
unsafe fn opt_str<'a>(s: *const c_char, what: &str) -> Result<Option<&'a str>, c_int> {
    if s.is_null() {
        return Ok(None);
    }
    match CStr::from_ptr(s).to_str() {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in {what}: {e}"));
            Err(2)
        }
    }
}

/// Convert a [`SigforgeRendererConfig`] (FFI) to a [`RendererConfig`] (Rust).
///
/// # Safety
/// Every non-null string field must point to a valid null-terminated string.
unsafe fn renderer_config_from_c(cfg: &SigforgeRendererConfig) -> Result<RendererConfig, c_int> {
    let mut config = RendererConfig::default();

    if let Some(base) = opt_str(cfg.default_base_url, "default_base_url")? {
        config.default_base_url = base.to_string();
    }
    if let Some(title) = opt_str(cfg.document_title, "document_title")? {
        config.document_title = title.to_string();
    }
    if cfg.timeout_ms != 0 {
        config.fetch.timeout = Duration::from_millis(u64::from(cfg.timeout_ms));
    }

    let runtime_base = opt_str(cfg.runtime_base, "runtime_base")?;
    config.runtime = match cfg.runtime {
        SigforgeRuntime::AssetDirectory => {
            RuntimeContext::AssetDirectory(PathBuf::from(runtime_base.unwrap_or(".")))
        }
        SigforgeRuntime::PageOrigin | SigforgeRuntime::ExtensionRuntime => {
            let raw = runtime_base.unwrap_or_default();
            let url = match Url::parse(raw) {
                Ok(url) => url,
                Err(e) => {
                    set_last_error(&format!("Invalid runtime_base URL {raw:?}: {e}"));
                    return Err(3);
                }
            };
            if matches!(cfg.runtime, SigforgeRuntime::PageOrigin) {
                RuntimeContext::PageOrigin(url)
            } else {
                RuntimeContext::ExtensionRuntime(url)
            }
        }
    };
    Ok(config)
}

/// Write `s` to `*out` as a heap-allocated C string.
///
/// # Safety
/// `out` must be a valid pointer.
unsafe fn write_out(s: String, out: *mut *mut c_char) -> c_int {
    match CString::new(s) {
        Ok(cs) => {
            *out = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("Output contained null byte");
            *out = ptr::null_mut();
            2
        }
    }
}

/// Shared body of the two render calls.
///
/// # Safety
/// Pointer arguments follow the contract of `sigforge_render_fragment`.
unsafe fn render_with(
    renderer: *const SigforgeRenderer,
    fields_json: *const c_char,
    base_url_override: *const c_char,
    out_html: *mut *mut c_char,
    render: fn(&SignatureRenderer, &SignatureFields, Option<&str>) -> String,
) -> c_int {
    if renderer.is_null() || fields_json.is_null() || out_html.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let json = match CStr::from_ptr(fields_json).to_str() {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8 in fields JSON: {e}"));
            return 2;
        }
    };
    let base_override = match opt_str(base_url_override, "base URL override") {
        Ok(v) => v,
        Err(rc) => return rc,
    };
    let fields = match SignatureFields::from_json(json) {
        Ok(f) => f,
        Err(e) => {
            set_last_error(&format!("Invalid field JSON: {e}"));
            return 3;
        }
    };

    let html = render(&(*renderer).inner, &fields, base_override);
    write_out(html, out_html)
}

// ---------------------------------------------------------------------------
// Renderer lifecycle
// ---------------------------------------------------------------------------

/// Create a renderer with default configuration and the given default base
/// URL.
///
/// # Parameters
/// - `default_base_url`: null-terminated UTF-8 URL, or `NULL` for none
///
/// # Returns
/// A handle to free with `sigforge_renderer_free`, or null if
/// `default_base_url` is not valid UTF-8.
///
/// # Safety
/// `default_base_url`, if non-null, must be a valid null-terminated string.
#[no_mangle]
pub unsafe extern "C" fn sigforge_renderer_new(default_base_url: *const c_char) -> *mut SigforgeRenderer {
    let base = match opt_str(default_base_url, "default_base_url") {
        Ok(v) => v.unwrap_or_default(),
        Err(_) => return ptr::null_mut(),
    };
    let inner = SignatureRenderer::new(RendererConfig::with_base_url(base));
    Box::into_raw(Box::new(SigforgeRenderer { inner }))
}

/// Create a renderer from a [`SigforgeRendererConfig`]; pass `NULL` for
/// defaults.
///
/// # Returns
/// A handle, or null on invalid configuration (see `sigforge_last_error`).
///
/// # Safety
/// `cfg`, if non-null, must point to a fully initialised
/// [`SigforgeRendererConfig`] whose string fields are null or valid.
#[no_mangle]
pub unsafe extern "C" fn sigforge_renderer_new_ex(
    cfg: *const SigforgeRendererConfig,
) -> *mut SigforgeRenderer {
    let config = if cfg.is_null() {
        RendererConfig::default()
    } else {
        match renderer_config_from_c(&*cfg) {
            Ok(c) => c,
            Err(_) => return ptr::null_mut(),
        }
    };
    let inner = SignatureRenderer::new(config);
    Box::into_raw(Box::new(SigforgeRenderer { inner }))
}

/// Release a renderer and its asset cache.
///
/// # Safety
/// `renderer` must have come from `sigforge_renderer_new*` and must not be
/// used afterwards.
#[no_mangle]
pub unsafe extern "C" fn sigforge_renderer_free(renderer: *mut SigforgeRenderer) {
    if !renderer.is_null() {
        drop(Box::from_raw(renderer));
    }
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Render the signature fragment for a persisted field snapshot.
///
/// # Parameters
/// - `renderer`: handle from `sigforge_renderer_new*`
/// - `fields_json`: null-terminated UTF-8 JSON snapshot (camelCase keys)
/// - `base_url_override`: null-terminated base URL, or `NULL`
/// - `out_html`: receives a pointer to a null-terminated HTML string
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `sigforge_last_error`.
///
/// # Safety
/// - `renderer` must be a live handle.
/// - `fields_json` and non-null `base_url_override` must be valid
///   null-terminated strings.
/// - `out_html` must be a valid pointer; free `*out_html` with
///   `sigforge_free_string`.
#[no_mangle]
pub unsafe extern "C" fn sigforge_render_fragment(
    renderer: *const SigforgeRenderer,
    fields_json: *const c_char,
    base_url_override: *const c_char,
    out_html: *mut *mut c_char,
) -> c_int {
    render_with(
        renderer,
        fields_json,
        base_url_override,
        out_html,
        SignatureRenderer::render_fragment,
    )
}

/// Render a standalone HTML document wrapping the fragment.
///
/// # Safety
/// Same as `sigforge_render_fragment`.
#[no_mangle]
pub unsafe extern "C" fn sigforge_render_document(
    renderer: *const SigforgeRenderer,
    fields_json: *const c_char,
    base_url_override: *const c_char,
    out_html: *mut *mut c_char,
) -> c_int {
    render_with(
        renderer,
        fields_json,
        base_url_override,
        out_html,
        SignatureRenderer::render_document,
    )
}

/// Embed every image in an HTML string as a data URI.
///
/// Blocks while assets are fetched. Images that cannot be fetched keep
/// their original reference; this is not an error.
///
/// # Parameters
/// - `html_ptr`: pointer to UTF-8 HTML bytes (not necessarily null-terminated)
/// - `html_len`: length of the HTML data in bytes
/// - `out_html`: receives a pointer to a null-terminated HTML string
///
/// # Safety
/// - `renderer` must be a live handle.
/// - `html_ptr` must point to `html_len` valid bytes.
/// - `out_html` must be a valid pointer; free `*out_html` with
///   `sigforge_free_string`.
#[no_mangle]
pub unsafe extern "C" fn sigforge_inline_images(
    renderer: *const SigforgeRenderer,
    html_ptr: *const u8,
    html_len: u32,
    out_html: *mut *mut c_char,
) -> c_int {
    if renderer.is_null() || html_ptr.is_null() || out_html.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let html_bytes = slice::from_raw_parts(html_ptr, html_len as usize);
    let html = match std::str::from_utf8(html_bytes) {
        Ok(s) => s,
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8: {e}"));
            return 2;
        }
    };

    write_out((*renderer).inner.inline_images(html), out_html)
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a string returned through an `out_html` parameter.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn sigforge_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `sigforge_*` call on the
/// same thread. The caller should **not** free this pointer – it is managed
/// internally.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn sigforge_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn sigforge_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
