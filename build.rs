use anyhow::Result;
use fs_extra::copy_items;
use fs_extra::dir::CopyOptions;
use std::env;
use std::path::PathBuf;

/// Asset folders the scene loads from, relative to the asset root.
const ASSET_DIRS: [&str; 2] = ["images", "models"];

fn main() -> Result<()> {
    println!("cargo:rerun-if-changed=assets");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let assets_src = manifest_dir.join("assets");
    if !assets_src.exists() {
        println!("cargo:warning=no assets directory, the scene will use placeholders");
        return Ok(());
    }

    let assets_out = PathBuf::from(env::var("OUT_DIR")?).join("assets");
    std::fs::create_dir_all(&assets_out)?;
    let mut copy_options = CopyOptions::new();
    copy_options.overwrite = true;
    let sources: Vec<PathBuf> = ASSET_DIRS
        .iter()
        .map(|dir| assets_src.join(dir))
        .filter(|dir| dir.exists())
        .collect();
    copy_items(&sources, &assets_out, &copy_options)?;

    Ok(())
}
