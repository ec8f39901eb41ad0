//! Bunkr albums, video pages and direct image links.

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::extract::item::{ContentKind, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::extract::{split_filename_ext, Descriptor, Extractor, ItemCollector};
use crate::http::{RequestOptions, Session};

const DOMAIN: &str = "bunkr.is";

const ALBUM_PATTERN: &str = r"(?:https?://)?bunkr\.is/a/\w+";
const NEXT_DATA_PATTERN: &str =
    r#"(?s)<script id="__NEXT_DATA__" type="application/json">(\{.*?\})</script>"#;
const SERVER_PATTERN: &str = r"(?:cdn|stream|i|media-files)(\d*)\.bunkr\.is";

fn video_pattern() -> String {
    format!(
        r"(?:https?://)(?:stream|media-files\d*|cdn\d*)\.bunkr\.is/(?:v/)?[-\w]+?\.(?i:{})\b",
        VIDEO_EXTENSIONS.join("|")
    )
}

fn image_pattern() -> String {
    format!(
        r"(?:https://)?cdn\d+\.bunkr\.is/[-\w]+\.(?i:{})\b",
        IMAGE_EXTENSIONS.join("|")
    )
}

/// Stream host serving videos from a numbered server.
pub fn stream_url(server: &str) -> String {
    format!("https://media-files{}.bunkr.is", server)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FallbackFlag {
    #[serde(default)]
    is_fallback: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextData<T> {
    props: Props<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Props<T> {
    page_props: T,
}

#[derive(Debug, Deserialize)]
struct AlbumPage {
    album: AlbumInfo,
    files: Vec<AlbumFile>,
}

#[derive(Debug, Deserialize)]
struct AlbumInfo {
    name: String,
}

/// One file listed on an album page.
#[derive(Debug, Deserialize)]
struct AlbumFile {
    name: String,
    /// Image host.
    i: Option<String>,
    cdn: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FilePage {
    file: FileInfo,
}

#[derive(Debug, Deserialize)]
struct FileInfo {
    name: String,
    mediafiles: String,
}

/// Pull the embedded page data out of a Bunkr page.
fn page_data<T>(next_data: &Regex, url: &str, html: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let json = next_data
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| Error::extraction(url, "No __NEXT_DATA__ script tag in page"))?
        .as_str();

    let flag: FallbackFlag = serde_json::from_str(json)
        .map_err(|e| Error::extraction(url, format!("Malformed page data: {}", e)))?;
    if flag.is_fallback {
        return Err(Error::extraction(url, "Page data is a fallback page (isFallback)"));
    }

    let data: NextData<T> = serde_json::from_str(json)
        .map_err(|e| Error::extraction(url, format!("Unexpected page data: {}", e)))?;
    Ok(data.props.page_props)
}

fn server_number(server: &Regex, url: &str) -> Option<String> {
    server
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn last_segment(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Bunkr album pages.
pub struct BunkrAlbumExtractor {
    descriptor: Descriptor,
    next_data: Regex,
    server: Regex,
}

impl BunkrAlbumExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: Descriptor::new(
                "bunkr-album",
                "https",
                DOMAIN,
                "Bunkr.is storage",
                &[ALBUM_PATTERN],
                &[
                    "https://bunkr.is/a/rXQtFw5W",
                    "https://bunkr.is/a/jBCopZia",
                    "https://bunkr.is/a/G6Mzbwpv",
                    "https://bunkr.is/a/TCxaRKiw",
                    "https://bunkr.is/a/XCIfbTX8",
                ],
            )?,
            next_data: Regex::new(NEXT_DATA_PATTERN)?,
            server: Regex::new(SERVER_PATTERN)?,
        })
    }

    /// Collect the items listed in an album page.
    pub fn parse_album(&self, url: &str, html: &str, items: &mut ItemCollector) -> Result<()> {
        let album: AlbumPage = page_data(&self.next_data, url, html)?;
        tracing::info!(
            "Album '{}' lists {} file(s)",
            album.album.name,
            album.files.len()
        );

        for file in album.files {
            let (filename, extension) = split_filename_ext(&file.name)?;
            let kind = ContentKind::from_extension(&extension)?;

            let source = match kind {
                ContentKind::Image => {
                    let host = file.i.as_deref().ok_or_else(|| {
                        Error::extraction(url, format!("No image host for '{}'", file.name))
                    })?;
                    format!("{}/{}", host, file.name)
                }
                ContentKind::Video => {
                    let cdn = file.cdn.as_deref().unwrap_or_default();
                    let server = server_number(&self.server, cdn).ok_or_else(|| {
                        Error::extraction(url, format!("No server number in '{}'", cdn))
                    })?;
                    format!("{}/{}", stream_url(&server), file.name)
                }
                ContentKind::Audio | ContentKind::Archive => {
                    let cdn = file.cdn.as_deref().ok_or_else(|| {
                        Error::extraction(url, format!("No CDN host for '{}'", file.name))
                    })?;
                    format!("{}/{}", cdn, file.name)
                }
            };

            items.add_item(
                kind,
                filename,
                extension,
                source,
                Some(album.album.name.clone()),
            )?;
        }

        Ok(())
    }
}

#[async_trait]
impl Extractor for BunkrAlbumExtractor {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    async fn extract(&self, session: &Session, url: &str, items: &mut ItemCollector) -> Result<()> {
        let html = session
            .get_text(url, RequestOptions::new().header("Host", DOMAIN))
            .await?;
        self.parse_album(url, &html, items)
    }
}

/// Bunkr video pages and direct video links.
pub struct BunkrVideoExtractor {
    descriptor: Descriptor,
    next_data: Regex,
    server: Regex,
}

impl BunkrVideoExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: Descriptor::new(
                "bunkr-video",
                "https",
                "stream.bunkr.is",
                "Bunkr.is video page",
                &[video_pattern().as_str()],
                &[
                    "https://stream.bunkr.is/v/ea_vid_14-9a9Jq32V.mov",
                    "https://stream.bunkr.is/v/lai_vid_3-3Ymk80tH.mp4",
                    "https://cdn.bunkr.is/0h1owpgtrqdncpvflf8ey_source-XltlzTqe.mp4",
                    "https://cdn3.bunkr.is/IMG_1141-6RvpacEH.MOV",
                ],
            )?,
            next_data: Regex::new(NEXT_DATA_PATTERN)?,
            server: Regex::new(SERVER_PATTERN)?,
        })
    }

    /// Direct link of the file shown on a stream page.
    pub fn parse_stream_page(&self, url: &str, html: &str) -> Result<String> {
        let page: FilePage = page_data(&self.next_data, url, html)?;
        Ok(format!("{}/{}", page.file.mediafiles, page.file.name))
    }

    /// Stream-host link for a direct CDN video link.
    pub fn stream_source(&self, url: &str) -> Result<String> {
        let server = server_number(&self.server, url)
            .ok_or_else(|| Error::extraction(url, "No server number in URL"))?;
        Ok(format!("{}/{}", stream_url(&server), last_segment(url)))
    }
}

#[async_trait]
impl Extractor for BunkrVideoExtractor {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    async fn extract(&self, session: &Session, url: &str, items: &mut ItemCollector) -> Result<()> {
        let source = if url.contains("stream.bunkr.is") {
            let html = session.get_text(url, RequestOptions::new()).await?;
            self.parse_stream_page(url, &html)?
        } else {
            self.stream_source(url)?
        };

        let file_name = last_segment(&source).to_string();
        items.add_file(&file_name, source, None)
    }
}

/// Direct links to images on Bunkr CDN hosts.
pub struct BunkrImageExtractor {
    descriptor: Descriptor,
}

impl BunkrImageExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: Descriptor::new(
                "bunkr-image",
                "https",
                DOMAIN,
                "Bunkr.is image direct link",
                &[image_pattern().as_str()],
                &[
                    "https://cdn3.bunkr.is/2021-07-03-3024x4032_c87b68ca72e0b5296829cf1a9e187b2c-Km9gaCRc.jpg",
                    "https://cdn3.bunkr.is/2021-07-03-3840x2880_9841c7b4aa6d1f96196660545973efa9-Kf5UfqsE.jpg",
                    "https://cdn4.bunkr.is/2021-12-01-3024x4032_479bdb93acdb799bf81da5195ef0abf6-dFl47m7b.jpg",
                ],
            )?,
        })
    }
}

#[async_trait]
impl Extractor for BunkrImageExtractor {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    async fn extract(
        &self,
        _session: &Session,
        url: &str,
        items: &mut ItemCollector,
    ) -> Result<()> {
        items.add_file(last_segment(url), url, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALBUM_HTML: &str = r#"<html><body>
<script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"album":{"name":"Summer"},"files":[
{"name":"beach-AbCd1234.jpg","i":"https://i3.bunkr.is","cdn":"https://cdn3.bunkr.is"},
{"name":"clip-XyZ98765.mp4","i":"https://i4.bunkr.is","cdn":"https://cdn4.bunkr.is"},
{"name":"song-Qq11.mp3","cdn":"https://cdn2.bunkr.is"}
]}},"isFallback":false}</script>
</body></html>"#;

    #[test]
    fn test_parse_album() {
        let extractor = BunkrAlbumExtractor::new().unwrap();
        let mut items = ItemCollector::new();
        extractor
            .parse_album("https://bunkr.is/a/rXQtFw5W", ALBUM_HTML, &mut items)
            .unwrap();

        let items = items.into_items();
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|i| i.album_title() == Some("Summer")));

        assert_eq!(items[0].content_kind(), ContentKind::Image);
        assert_eq!(items[0].source(), "https://i3.bunkr.is/beach-AbCd1234.jpg");

        assert_eq!(items[1].content_kind(), ContentKind::Video);
        assert_eq!(items[1].source(), "https://media-files4.bunkr.is/clip-XyZ98765.mp4");

        assert_eq!(items[2].content_kind(), ContentKind::Audio);
        assert_eq!(items[2].source(), "https://cdn2.bunkr.is/song-Qq11.mp3");
    }

    #[test]
    fn test_parse_album_without_data_tag() {
        let extractor = BunkrAlbumExtractor::new().unwrap();
        let mut items = ItemCollector::new();
        let err = extractor
            .parse_album("https://bunkr.is/a/x", "<html></html>", &mut items)
            .unwrap_err();
        assert!(matches!(err, Error::Extraction { ref url, .. } if url == "https://bunkr.is/a/x"));
    }

    #[test]
    fn test_parse_album_fallback_page() {
        let extractor = BunkrAlbumExtractor::new().unwrap();
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"props":{},"isFallback":true}</script>"#;
        let mut items = ItemCollector::new();
        assert!(matches!(
            extractor.parse_album("https://bunkr.is/a/x", html, &mut items),
            Err(Error::Extraction { .. })
        ));
    }

    #[test]
    fn test_parse_album_missing_fields() {
        let extractor = BunkrAlbumExtractor::new().unwrap();
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"files":[]}},"isFallback":false}</script>"#;
        let mut items = ItemCollector::new();
        assert!(matches!(
            extractor.parse_album("https://bunkr.is/a/x", html, &mut items),
            Err(Error::Extraction { .. })
        ));
    }

    #[test]
    fn test_stream_page_direct_link() {
        let extractor = BunkrVideoExtractor::new().unwrap();
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{"file":{"name":"ea_vid_14-9a9Jq32V.mov","mediafiles":"https://media-files2.bunkr.is"}}},"isFallback":false}</script>"#;
        assert_eq!(
            extractor
                .parse_stream_page("https://stream.bunkr.is/v/ea_vid_14-9a9Jq32V.mov", html)
                .unwrap(),
            "https://media-files2.bunkr.is/ea_vid_14-9a9Jq32V.mov"
        );
    }

    #[test]
    fn test_cdn_video_maps_to_stream_host() {
        let extractor = BunkrVideoExtractor::new().unwrap();
        assert_eq!(
            extractor
                .stream_source("https://cdn3.bunkr.is/IMG_1141-6RvpacEH.MOV")
                .unwrap(),
            "https://media-files3.bunkr.is/IMG_1141-6RvpacEH.MOV"
        );
        assert_eq!(
            extractor
                .stream_source("https://cdn.bunkr.is/source-XltlzTqe.mp4")
                .unwrap(),
            "https://media-files.bunkr.is/source-XltlzTqe.mp4"
        );
    }

    #[test]
    fn test_patterns_are_disjoint() {
        let image = BunkrImageExtractor::new().unwrap();
        let video = BunkrVideoExtractor::new().unwrap();

        assert!(!image
            .descriptor()
            .is_suitable("https://cdn3.bunkr.is/IMG_1141-6RvpacEH.MOV"));
        assert!(!video.descriptor().is_suitable(
            "https://cdn3.bunkr.is/2021-07-03-3024x4032_c87b68ca72e0b5296829cf1a9e187b2c-Km9gaCRc.jpg"
        ));
    }
}
