//! sigforge – render a saved signature snapshot to email-ready HTML.
//!
//! Usage:
//!   sigforge <fields.json> [-o out.html] [--variant TAG] [--base-url URL]
//!            [--document] [--inline] [--assets DIR] [--portrait FILE]
//!
//! Without `-o` the HTML goes to stdout.

use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

use clap::Parser;

use sig_forge::data_uri;
use sig_forge::fields::{SignatureFields, Variant};
use sig_forge::renderer::{RendererConfig, RuntimeContext, SignatureRenderer};

/// Largest portrait accepted by `--portrait`.
const MAX_PORTRAIT_BYTES: usize = 5 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(
    name = "sigforge",
    version,
    about = "Render an email signature snapshot to table-based HTML"
)]
struct Args {
    /// Field snapshot as saved by the editor (camelCase JSON)
    fields: PathBuf,

    /// Output path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Layout tag, overriding the snapshot's own (unknown tags fall back to classic)
    #[arg(long)]
    variant: Option<String>,

    /// Base URL for relative image paths, overriding the snapshot's `baseUrl`
    #[arg(long)]
    base_url: Option<String>,

    /// Wrap the fragment in a standalone HTML document
    #[arg(long)]
    document: bool,

    /// Embed every image as a data URI
    #[arg(long)]
    inline: bool,

    /// Directory relative image paths are read from when inlining
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Local JPG/PNG embedded as the portrait
    #[arg(long)]
    portrait: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let json = match fs::read_to_string(&args.fields) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading '{}': {e}", args.fields.display());
            process::exit(1);
        }
    };
    let mut fields = match SignatureFields::from_json(&json) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error parsing '{}': {e}", args.fields.display());
            process::exit(1);
        }
    };

    if let Some(tag) = &args.variant {
        fields.variant = Variant::from_tag(tag);
    }
    if let Some(path) = &args.portrait {
        match embed_portrait(path) {
            Ok(uri) => fields.image_url = uri,
            Err(e) => {
                eprintln!("Error embedding portrait: {e}");
                process::exit(1);
            }
        }
    }

    let config = RendererConfig {
        runtime: RuntimeContext::AssetDirectory(args.assets.clone()),
        ..RendererConfig::default()
    };
    let renderer = SignatureRenderer::new(config);
    let base_override = args.base_url.as_deref();

    let mut html = if args.document {
        renderer.render_document(&fields, base_override)
    } else {
        renderer.render_fragment(&fields, base_override)
    };
    if args.inline {
        html = renderer.inline_images(&html);
    }

    match &args.output {
        Some(output) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(output, &html) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            eprintln!(
                "Wrote '{}' ({} bytes, {} layout)",
                output.display(),
                html.len(),
                fields.variant.display_name()
            );
        }
        None => println!("{html}"),
    }
}

/// Read a JPG/PNG from disk and return it as a data URI.
fn embed_portrait(path: &Path) -> Result<String, String> {
    let bytes = fs::read(path).map_err(|e| format!("reading '{}': {e}", path.display()))?;
    if bytes.len() > MAX_PORTRAIT_BYTES {
        return Err(format!(
            "'{}' is {} bytes; the limit is {MAX_PORTRAIT_BYTES}",
            path.display(),
            bytes.len()
        ));
    }
    let reference = path.to_string_lossy();
    match data_uri::detect_mime(None, &bytes, &reference).as_deref() {
        Some(mime @ ("image/jpeg" | "image/png")) => Ok(data_uri::encode(mime, &bytes)),
        other => Err(format!(
            "'{}' must be a JPG or PNG image (found {})",
            path.display(),
            other.unwrap_or("unknown data")
        )),
    }
}
