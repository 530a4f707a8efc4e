//! Build script for storefront crate.
//!
//! Generates content-based hashes for static assets (CSS and JS) to enable
//! immutable CDN caching.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    hash_asset("css", "main", "CSS_HASH");
    hash_asset("js", "checkout", "JS_HASH");
}

/// Hash `static/{kind}/{stem}.{kind}` and copy it to the derived directory
/// with the hash in the filename.
///
/// Sets `env_var` for use with `env!(...)`.
fn hash_asset(kind: &str, stem: &str, env_var: &str) {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let source_path = Path::new(&manifest_dir).join(format!("static/{kind}/{stem}.{kind}"));

    // Tell Cargo to rerun if the asset changes
    println!("cargo:rerun-if-changed={}", source_path.display());

    let content = match fs::read(&source_path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {stem}.{kind}: {e}");
            println!("cargo:rustc-env={env_var}=");
            return;
        }
    };

    // Compute hash (first 8 chars of SHA256)
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = format!("{:x}", hasher.finalize());
    let short_hash = &hash[..8];

    println!("cargo:rustc-env={env_var}={short_hash}");

    let derived_dir = Path::new(&manifest_dir).join(format!("static/{kind}/derived"));
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");

    let derived_path = derived_dir.join(format!("{stem}.{short_hash}.{kind}"));
    fs::copy(&source_path, &derived_path).expect("Failed to copy asset to derived directory");
}
