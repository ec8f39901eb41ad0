//! AnonFiles file pages.

use async_trait::async_trait;
use regex::Regex;

use crate::error::{Error, Result};
use crate::extract::{Descriptor, Extractor, ItemCollector};
use crate::http::{RequestOptions, Session};

const FILE_PATTERN: &str = r"(?:https?://)?anonfiles\.com/\w+/[\w-]+_[a-zA-Z\d]+";
const DOWNLOAD_TAG_PATTERN: &str = r#"(?s)"download-url".*?href="(.*?)">"#;

pub struct AnonfilesExtractor {
    descriptor: Descriptor,
    download_tag: Regex,
}

impl AnonfilesExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: Descriptor::new(
                "anonfiles",
                "https",
                "anonfiles.com",
                "AnonFiles file storage",
                &[FILE_PATTERN],
                &[
                    "https://anonfiles.com/r7ldQ8r2wd/2021-12-17-15-34-25_NCARHYdP-1_mp4",
                    "https://anonfiles.com/H3h4W5y3y3/200222787_195947142418120_7120636900489110320_n_jpg",
                    "https://anonfiles.com/B3h0W9ydyb/z143_l_jpg",
                    "https://anonfiles.com/J5heW6y8ya/l8jqf882kzp11_png",
                ],
            )?,
            download_tag: Regex::new(DOWNLOAD_TAG_PATTERN)?,
        })
    }

    /// The direct download link on a file page.
    pub fn download_link(&self, url: &str, html: &str) -> Result<String> {
        self.download_tag
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| Error::extraction(url, "No download link in page"))
    }
}

#[async_trait]
impl Extractor for AnonfilesExtractor {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    async fn extract(&self, session: &Session, url: &str, items: &mut ItemCollector) -> Result<()> {
        let html = session.get_text(url, RequestOptions::new()).await?;
        let source = self.download_link(url, &html)?;
        let file_name = source.rsplit('/').next().unwrap_or(&source).to_string();
        items.add_file(&file_name, source, None)
    }
}
