//! Downloadable item representation.

use std::fmt;

use crate::error::{Error, Result};
use crate::fs::naming::sanitize_filename;

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tif", "tiff", "jfif", "heic",
];
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "webm", "mkv", "avi", "m4v", "wmv", "flv", "ts",
];
pub const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz"];
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "ogg", "aac", "opus"];

/// Kind of content an item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Image,
    Video,
    Archive,
    Audio,
}

impl ContentKind {
    /// Get the folder name for this kind when content is separated.
    pub fn folder_name(&self) -> &'static str {
        match self {
            ContentKind::Image => "Images",
            ContentKind::Video => "Videos",
            ContentKind::Archive => "Archives",
            ContentKind::Audio => "Audio",
        }
    }

    /// Extensions (without dot) belonging to this kind.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            ContentKind::Image => IMAGE_EXTENSIONS,
            ContentKind::Video => VIDEO_EXTENSIONS,
            ContentKind::Archive => ARCHIVE_EXTENSIONS,
            ContentKind::Audio => AUDIO_EXTENSIONS,
        }
    }

    /// Derive the kind from a file extension, with or without the leading dot.
    pub fn from_extension(extension: &str) -> Result<Self> {
        let ext = extension.trim_start_matches('.').to_lowercase();

        [
            ContentKind::Image,
            ContentKind::Video,
            ContentKind::Archive,
            ContentKind::Audio,
        ]
        .into_iter()
        .find(|kind| kind.extensions().contains(&ext.as_str()))
        .ok_or_else(|| Error::UnsupportedExtension(extension.to_string()))
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Image => write!(f, "image"),
            ContentKind::Video => write!(f, "video"),
            ContentKind::Archive => write!(f, "archive"),
            ContentKind::Audio => write!(f, "audio"),
        }
    }
}

/// Split a file name into stem and extension.
///
/// The extension keeps its leading dot and is lowercased. Names without a dot
/// are split at the last underscore, which is how some file hosts flatten
/// names (`photo_2021_jpg` becomes `photo_2021` + `.jpg`).
pub fn split_filename_ext(name: &str) -> Result<(String, String)> {
    let (stem, ext) = name
        .rsplit_once('.')
        .or_else(|| name.rsplit_once('_'))
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .ok_or_else(|| Error::InvalidItem(format!("No extension in file name '{}'", name)))?;

    Ok((stem.to_string(), format!(".{}", ext.to_lowercase())))
}

/// A downloadable item.
///
/// Fields are private; an item is validated once in [`Item::new`] and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    content_kind: ContentKind,
    album_title: Option<String>,
    filename: String,
    extension: String,
    source: String,
}

impl Item {
    /// Create an item.
    ///
    /// Fails if `content_kind` disagrees with the extension table, if the
    /// name is not filesystem-safe, or if `source` is empty.
    pub fn new(
        content_kind: ContentKind,
        filename: impl Into<String>,
        extension: impl Into<String>,
        source: impl Into<String>,
        album_title: Option<String>,
    ) -> Result<Self> {
        let extension = normalize_extension(&extension.into());
        let derived = ContentKind::from_extension(&extension)?;
        if derived != content_kind {
            return Err(Error::InvalidItem(format!(
                "Extension '{}' is {}, not {}",
                extension, derived, content_kind
            )));
        }

        let filename = sanitize_filename(&filename.into())?;

        let source = source.into();
        if source.trim().is_empty() {
            return Err(Error::InvalidItem(format!(
                "Item '{}{}' has no source",
                filename, extension
            )));
        }

        Ok(Self {
            content_kind,
            album_title: album_title.filter(|title| !title.trim().is_empty()),
            filename,
            extension,
            source,
        })
    }

    /// Create an item from a full file name, deriving kind from its extension.
    pub fn from_file_name(
        file_name: &str,
        source: impl Into<String>,
        album_title: Option<String>,
    ) -> Result<Self> {
        let (filename, extension) = split_filename_ext(file_name)?;
        let kind = ContentKind::from_extension(&extension)?;
        Self::new(kind, filename, extension, source, album_title)
    }

    pub fn content_kind(&self) -> ContentKind {
        self.content_kind
    }

    pub fn album_title(&self) -> Option<&str> {
        self.album_title.as_deref()
    }

    /// File stem, without extension.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Extension including the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// File name the item is saved under.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.filename, self.extension)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({}{}, {})", self.filename, self.extension, self.source)
    }
}

fn normalize_extension(extension: &str) -> String {
    format!(".{}", extension.trim_start_matches('.').to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_extension_maps_to_its_kind() {
        for kind in [
            ContentKind::Image,
            ContentKind::Video,
            ContentKind::Archive,
            ContentKind::Audio,
        ] {
            for ext in kind.extensions() {
                assert_eq!(ContentKind::from_extension(ext).unwrap(), kind);
                assert_eq!(
                    ContentKind::from_extension(&format!(".{}", ext.to_uppercase())).unwrap(),
                    kind
                );
            }
        }
    }

    #[test]
    fn test_extension_tables_are_disjoint() {
        let all: Vec<&str> = [
            IMAGE_EXTENSIONS,
            VIDEO_EXTENSIONS,
            ARCHIVE_EXTENSIONS,
            AUDIO_EXTENSIONS,
        ]
        .concat();
        let mut unique = all.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(all.len(), unique.len());
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        assert!(matches!(
            ContentKind::from_extension(".exe"),
            Err(Error::UnsupportedExtension(ext)) if ext == ".exe"
        ));
    }

    #[test]
    fn test_folder_names() {
        assert_eq!(ContentKind::Image.folder_name(), "Images");
        assert_eq!(ContentKind::Video.folder_name(), "Videos");
        assert_eq!(ContentKind::Archive.folder_name(), "Archives");
        assert_eq!(ContentKind::Audio.folder_name(), "Audio");
    }

    #[test]
    fn test_split_on_last_dot() {
        assert_eq!(
            split_filename_ext("IMG_1141-6RvpacEH.MOV").unwrap(),
            ("IMG_1141-6RvpacEH".to_string(), ".mov".to_string())
        );
        assert_eq!(
            split_filename_ext("archive.tar.gz").unwrap(),
            ("archive.tar".to_string(), ".gz".to_string())
        );
    }

    #[test]
    fn test_split_on_underscore_without_dot() {
        let (stem, ext) = split_filename_ext("photo_2021_jpg").unwrap();
        assert_eq!(stem, "photo_2021");
        assert_eq!(ext, ".jpg");
        assert_eq!(ContentKind::from_extension(&ext).unwrap(), ContentKind::Image);
    }

    #[test]
    fn test_split_without_separator_fails() {
        assert!(split_filename_ext("noextension").is_err());
        assert!(split_filename_ext(".hidden").is_err());
        assert!(split_filename_ext("trailing.").is_err());
    }

    #[test]
    fn test_from_file_name() {
        let item = Item::from_file_name(
            "photo_2021_jpg",
            "https://anonfiles.com/abc/photo_2021_jpg",
            None,
        )
        .unwrap();
        assert_eq!(item.content_kind(), ContentKind::Image);
        assert_eq!(item.filename(), "photo_2021");
        assert_eq!(item.extension(), ".jpg");
        assert_eq!(item.file_name(), "photo_2021.jpg");
        assert_eq!(item.album_title(), None);
    }

    #[test]
    fn test_new_normalizes_extension() {
        let item =
            Item::new(ContentKind::Video, "clip", "MP4", "https://x/clip.MP4", None).unwrap();
        assert_eq!(item.extension(), ".mp4");
    }

    #[test]
    fn test_new_rejects_kind_mismatch() {
        assert!(matches!(
            Item::new(ContentKind::Video, "photo", ".jpg", "https://x/photo.jpg", None),
            Err(Error::InvalidItem(_))
        ));
    }

    #[test]
    fn test_new_rejects_unsafe_name_and_empty_source() {
        assert!(Item::new(ContentKind::Image, "../up", ".jpg", "https://x/a.jpg", None).is_err());
        assert!(Item::new(ContentKind::Image, "a/b", ".jpg", "https://x/a.jpg", None).is_err());
        assert!(Item::new(ContentKind::Image, "ok", ".jpg", " ", None).is_err());
    }

    #[test]
    fn test_inner_dots_are_allowed() {
        let item =
            Item::from_file_name("final..cut.jpg", "https://x/final..cut.jpg", None).unwrap();
        assert_eq!(item.filename(), "final..cut");
        assert_eq!(item.file_name(), "final..cut.jpg");
    }

    #[test]
    fn test_blank_album_title_is_none() {
        let item = Item::new(
            ContentKind::Image,
            "a",
            ".png",
            "https://x/a.png",
            Some("  ".to_string()),
        )
        .unwrap();
        assert_eq!(item.album_title(), None);
    }

    #[test]
    fn test_display() {
        let item =
            Item::new(ContentKind::Audio, "song", ".mp3", "https://x/song.mp3", None).unwrap();
        assert_eq!(item.to_string(), "Item(song.mp3, https://x/song.mp3)");
    }
}
