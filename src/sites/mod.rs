//! Supported sites.

pub mod anonfiles;
pub mod bunkr;
pub mod imgbox;

pub use anonfiles::AnonfilesExtractor;
pub use bunkr::{BunkrAlbumExtractor, BunkrImageExtractor, BunkrVideoExtractor};
pub use imgbox::ImgboxThumbnailExtractor;

use crate::error::Result;
use crate::extract::{Capability, Registry};

/// Registry with every built-in site.
pub fn default_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    registry.register(Capability::extractor(BunkrAlbumExtractor::new()?))?;
    registry.register(Capability::extractor(BunkrVideoExtractor::new()?))?;
    registry.register(Capability::extractor(BunkrImageExtractor::new()?))?;
    registry.register(Capability::extractor(AnonfilesExtractor::new()?))?;
    registry.register(Capability::extractor(ImgboxThumbnailExtractor::new()?))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extracted;
    use crate::http::Session;
    use crate::Error;

    #[test]
    fn test_default_registry_is_consistent() {
        let registry = default_registry().unwrap();
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_dispatch() {
        let registry = default_registry().unwrap();
        let cases = [
            ("https://bunkr.is/a/rXQtFw5W", "bunkr-album"),
            ("https://stream.bunkr.is/v/rr_vid_12-3HiQTJtY.mp4", "bunkr-video"),
            (
                "https://cdn4.bunkr.is/2021-12-01-3023x4011_5f36416846cde7afd8b0f20f0835cb43-bFhLNQx2.jpg",
                "bunkr-image",
            ),
            ("https://anonfiles.com/F6h0W0y2yd/EubtFQLVEAEsLAj_jpg", "anonfiles"),
            ("https://thumbs2.imgbox.com/e1/24/f3rYiAMq_t.jpeg", "imgbox-thumbnail"),
        ];
        for (url, name) in cases {
            assert_eq!(registry.select(url).unwrap().descriptor().name(), name, "{}", url);
        }

        assert!(matches!(
            registry.select("https://example.com/page"),
            Err(Error::NoSuitableExtractor { .. })
        ));
    }

    #[tokio::test]
    async fn test_direct_image_scenario() {
        let url = "https://cdn3.bunkr.is/2021-07-03-3024x4032_c87b68ca72e0b5296829cf1a9e187b2c-Km9gaCRc.jpg";
        let registry = default_registry().unwrap();
        let session = Session::new().unwrap();

        let items = match registry.extract(&session, url).await.unwrap() {
            Extracted::Items(items) => items,
            Extracted::Page(_) => panic!("expected items"),
        };

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.content_kind(), crate::extract::ContentKind::Image);
        assert_eq!(item.extension(), ".jpg");
        assert_eq!(item.source(), url);
        assert_eq!(item.album_title(), None);
    }
}
