//! ImgBox thumbnails, resolved to the full-size image.

use async_trait::async_trait;

use crate::error::Result;
use crate::extract::item::IMAGE_EXTENSIONS;
use crate::extract::{Descriptor, Extractor, ItemCollector};
use crate::http::Session;

fn thumbnail_pattern() -> String {
    format!(
        r"(?:https?://)?thumbs\d+\.imgbox\.com/[a-z\d]+/[a-z\d]+/\w+_t\.(?:{})\b",
        IMAGE_EXTENSIONS.join("|")
    )
}

/// Full-size image URL for a thumbnail URL.
pub fn original_url(thumbnail: &str) -> String {
    thumbnail.replacen("thumbs", "images", 1).replacen("_t.", "_o.", 1)
}

pub struct ImgboxThumbnailExtractor {
    descriptor: Descriptor,
}

impl ImgboxThumbnailExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            descriptor: Descriptor::new(
                "imgbox-thumbnail",
                "https",
                "imgbox.com",
                "ImgBox image from thumbnail",
                &[thumbnail_pattern().as_str()],
                &[
                    "https://thumbs2.imgbox.com/76/51/0MgDRXNo_t.png",
                    "https://thumbs2.imgbox.com/72/95/VL9wS1tI_t.jpeg",
                    "https://thumbs2.imgbox.com/cf/a3/p807JSq5_t.jpeg",
                ],
            )?,
        })
    }
}

#[async_trait]
impl Extractor for ImgboxThumbnailExtractor {
    fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    async fn extract(
        &self,
        _session: &Session,
        url: &str,
        items: &mut ItemCollector,
    ) -> Result<()> {
        let source = original_url(url);
        let file_name = source.rsplit('/').next().unwrap_or(&source).to_string();
        items.add_file(&file_name, source, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_original_url() {
        assert_eq!(
            original_url("https://thumbs2.imgbox.com/76/51/0MgDRXNo_t.png"),
            "https://images2.imgbox.com/76/51/0MgDRXNo_o.png"
        );
    }

    #[tokio::test]
    async fn test_extract_needs_no_request() {
        let extractor = ImgboxThumbnailExtractor::new().unwrap();
        let session = Session::new().unwrap();
        let mut items = ItemCollector::new();
        extractor
            .extract(&session, "https://thumbs2.imgbox.com/72/95/VL9wS1tI_t.jpeg", &mut items)
            .await
            .unwrap();

        let items = items.into_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].file_name(), "VL9wS1tI_o.jpeg");
        assert_eq!(items[0].source(), "https://images2.imgbox.com/72/95/VL9wS1tI_o.jpeg");
    }
}
