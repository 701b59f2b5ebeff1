use std::path::{Path, PathBuf};

/**
 * This module contains all logic for loading textures from external files.
 */
pub mod texture;

/// Resolve an asset file name.
///
/// Paths that exist as given are used unchanged. Otherwise `./assets` and the
/// copy the build script placed in `OUT_DIR` are tried in that order. If
/// nothing matches the path is returned unchanged so the caller's read fails
/// with a meaningful error.
pub fn asset_path(file_name: impl AsRef<Path>) -> PathBuf {
    let file_name = file_name.as_ref();
    if file_name.exists() || file_name.is_absolute() {
        return file_name.to_path_buf();
    }

    let local = Path::new("./").join("assets").join(file_name);
    if local.exists() {
        return local;
    }

    if let Some(out_dir) = option_env!("OUT_DIR") {
        let bundled = Path::new(out_dir).join("assets").join(file_name);
        if bundled.exists() {
            return bundled;
        }
    }

    file_name.to_path_buf()
}
