//! Directory placement for downloaded items.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::extract::Item;
use crate::fs::naming::sanitize_path_component;

/// Name of the source-URL log kept in each album directory.
pub const URL_LOG_NAME: &str = "urls.txt";

/// Get the album directory for an item.
///
/// The override wins over the item's own album title. An item with neither
/// is an error rather than a prompt, so unattended runs never block.
pub fn album_directory(
    output_root: &Path,
    item: &Item,
    album_override: Option<&str>,
) -> Result<PathBuf> {
    let album = album_override
        .or(item.album_title())
        .ok_or_else(|| Error::MissingAlbumName {
            url: item.source().to_string(),
        })?;

    Ok(output_root.join(sanitize_path_component(album)?))
}

/// Get the directory an item's file goes into.
pub fn item_directory(album_dir: &Path, item: &Item, separate_content: bool) -> PathBuf {
    if separate_content {
        album_dir.join(item.content_kind().folder_name())
    } else {
        album_dir.to_path_buf()
    }
}

/// Path an in-flight download is written to before it is renamed into place.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
