use std::env;
use std::path::PathBuf;

fn main() {
    // Only regenerate the header when the C API changes.
    println!("cargo:rerun-if-changed=src/ffi.rs");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");

    let header = PathBuf::from(&crate_dir).join("include").join("sigforge.h");

    std::fs::create_dir_all(header.parent().expect("sigforge.h has no parent directory"))
        .expect("failed to create include/ for sigforge.h");

    let config = cbindgen::Config::from_file(PathBuf::from(&crate_dir).join("cbindgen.toml"))
        .expect("failed to read cbindgen.toml for sigforge.h");

    // sigforge_* functions plus the SigforgeRenderer handle and config types.
    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
        .expect("cbindgen failed to generate sigforge.h")
        .write_to_file(&header);

    println!("cargo:warning=sigforge C header written to {}", header.display());
}
