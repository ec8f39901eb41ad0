//! Extractor registry and dispatch.

use std::collections::HashSet;

use tokio::sync::OnceCell;

use crate::error::{Error, Result};
use crate::extract::capability::{Capability, CapabilityKind, Descriptor, Extracted};
use crate::extract::item::Item;
use crate::http::Session;

struct Entry {
    capability: Capability,
    ready: OnceCell<()>,
}

/// Every known capability, keyed by the URL shapes they claim.
///
/// Registration checks each capability against its own sample URLs and
/// against every other capability's samples, so overlapping patterns fail at
/// startup instead of at dispatch.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability.
    pub fn register(&mut self, capability: Capability) -> Result<()> {
        let descriptor = capability.descriptor();

        for url in descriptor.sample_urls() {
            if !descriptor.is_suitable(url) {
                return Err(Error::SampleMismatch {
                    name: descriptor.name().to_string(),
                    url: url.clone(),
                });
            }
        }

        for entry in &self.entries {
            let other = entry.capability.descriptor();
            if other.name() == descriptor.name() {
                return Err(Error::Config(format!(
                    "Extractor '{}' is registered twice",
                    descriptor.name()
                )));
            }

            let overlap = descriptor
                .sample_urls()
                .iter()
                .find(|url| other.is_suitable(url))
                .or_else(|| {
                    other
                        .sample_urls()
                        .iter()
                        .find(|url| descriptor.is_suitable(url))
                });
            if let Some(url) = overlap {
                return Err(Error::OverlappingPatterns {
                    first: other.name().to_string(),
                    second: descriptor.name().to_string(),
                    url: url.clone(),
                });
            }
        }

        tracing::debug!("Registered {} {}", capability.kind(), descriptor);
        self.entries.push(Entry {
            capability,
            ready: OnceCell::new(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &Descriptor> {
        self.entries.iter().map(|e| e.capability.descriptor())
    }

    /// The capability that claims `url`.
    pub fn select(&self, url: &str) -> Result<&Capability> {
        self.select_entry(url).map(|e| &e.capability)
    }

    fn select_entry(&self, url: &str) -> Result<&Entry> {
        let mut matches = self
            .entries
            .iter()
            .filter(|e| e.capability.descriptor().is_suitable(url));

        let first = matches.next().ok_or_else(|| Error::NoSuitableExtractor {
            url: url.to_string(),
        })?;

        let rest: Vec<&Entry> = matches.collect();
        if !rest.is_empty() {
            return Err(Error::AmbiguousExtractor {
                url: url.to_string(),
                candidates: std::iter::once(first)
                    .chain(rest)
                    .map(|e| e.capability.descriptor().name().to_string())
                    .collect(),
            });
        }

        Ok(first)
    }

    /// Run the capability that claims `url`, initializing it on first use.
    pub async fn extract(&self, session: &Session, url: &str) -> Result<Extracted> {
        let entry = self.select_entry(url)?;
        tracing::debug!("{} selected for {}", entry.capability.descriptor().name(), url);

        entry
            .ready
            .get_or_try_init(|| entry.capability.initialize(session))
            .await?;

        entry.capability.extract_data(session, url).await
    }

    /// Links in crawled content that some extractor claims.
    ///
    /// Scheme-less matches get `https://`. Unique, in the order they first
    /// appear in `content`.
    pub fn harvest_links(&self, content: &str) -> Vec<String> {
        let mut found: Vec<(usize, String)> = self
            .entries
            .iter()
            .filter(|e| e.capability.kind() == CapabilityKind::Extractor)
            .flat_map(|e| e.capability.descriptor().find_links(content))
            .map(|link| (content.find(&link).unwrap_or(usize::MAX), link))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);

        let mut seen = HashSet::new();
        found
            .into_iter()
            .map(|(_, link)| {
                if link.contains("://") {
                    link
                } else {
                    format!("https://{}", link)
                }
            })
            .filter(|link| seen.insert(link.clone()))
            .collect()
    }

    /// Turn `url` into items.
    ///
    /// Crawled content is harvested for links; each link is extracted in turn
    /// and links that fail are logged and skipped.
    pub async fn resolve(&self, session: &Session, url: &str) -> Result<Vec<Item>> {
        let content = match self.extract(session, url).await? {
            Extracted::Items(items) => return Ok(items),
            Extracted::Page(content) => content,
        };

        let links = self.harvest_links(&content);
        tracing::info!("Found {} link(s) while crawling {}", links.len(), url);

        let mut items = Vec::new();
        for link in links {
            match self.extract(session, &link).await {
                Ok(Extracted::Items(found)) => items.extend(found),
                Ok(Extracted::Page(_)) => {
                    tracing::warn!("Skipping {}: nested crawl results are not followed", link)
                }
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => tracing::warn!("Skipping {}: {}", link, e),
            }
        }

        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::capability::{Extractor, ItemCollector};
    use async_trait::async_trait;

    struct Fixed {
        descriptor: Descriptor,
    }

    impl Fixed {
        fn new(name: &str, pattern: &str, sample: &str) -> Self {
            Self {
                descriptor: Descriptor::new(
                    name,
                    "https",
                    "example.com",
                    "test",
                    &[pattern],
                    &[sample],
                )
                .unwrap(),
            }
        }
    }

    #[async_trait]
    impl Extractor for Fixed {
        fn descriptor(&self) -> &Descriptor {
            &self.descriptor
        }

        async fn extract(&self, _: &Session, url: &str, items: &mut ItemCollector) -> Result<()> {
            items.add_file("a.jpg", url, None)
        }
    }

    #[test]
    fn test_select_unique_match() {
        let mut registry = Registry::new();
        registry
            .register(Capability::extractor(Fixed::new("a", r"https://a\.com/", "https://a.com/1")))
            .unwrap();
        registry
            .register(Capability::extractor(Fixed::new("b", r"https://b\.com/", "https://b.com/1")))
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.select("https://b.com/x").unwrap().descriptor().name(), "b");
        assert!(matches!(
            registry.select("https://c.com/x"),
            Err(Error::NoSuitableExtractor { .. })
        ));
    }

    #[test]
    fn test_register_rejects_overlap() {
        let mut registry = Registry::new();
        let broad = Fixed::new("broad", r"https://a\.com/", "https://a.com/x");
        registry.register(Capability::extractor(broad)).unwrap();

        let narrow = Fixed::new("narrow", r"https://a\.com/v/", "https://a.com/v/1");
        let err = registry
            .register(Capability::extractor(narrow))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::OverlappingPatterns { ref first, ref second, .. }
                if first == "broad" && second == "narrow"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_own_sample_mismatch() {
        let mut registry = Registry::new();
        let err = registry
            .register(Capability::extractor(Fixed::new("a", r"https://a\.com/", "https://b.com/1")))
            .unwrap_err();
        assert!(matches!(err, Error::SampleMismatch { .. }));
    }

    #[test]
    fn test_register_rejects_duplicate_name() {
        let mut registry = Registry::new();
        registry
            .register(Capability::extractor(Fixed::new("a", r"https://a\.com/", "https://a.com/1")))
            .unwrap();
        assert!(registry
            .register(Capability::extractor(Fixed::new("a", r"https://z\.com/", "https://z.com/1")))
            .is_err());
    }

    #[test]
    fn test_overlap_outside_samples_is_ambiguous_at_dispatch() {
        let mut registry = Registry::new();
        let one = Fixed::new("one", r"https://a\.com/(?:x|shared)", "https://a.com/x");
        let two = Fixed::new("two", r"https://a\.com/(?:y|shared)", "https://a.com/y");
        registry.register(Capability::extractor(one)).unwrap();
        registry.register(Capability::extractor(two)).unwrap();

        match registry.select("https://a.com/shared") {
            Err(Error::AmbiguousExtractor { candidates, .. }) => {
                assert_eq!(candidates, vec!["one".to_string(), "two".to_string()])
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_harvest_links_adds_scheme_and_dedups() {
        let mut registry = Registry::new();
        registry
            .register(Capability::extractor(Fixed::new(
                "a",
                r"(?:https?://)?a\.com/\d+",
                "https://a.com/1",
            )))
            .unwrap();

        let links = registry.harvest_links("a.com/2 https://a.com/1 https://a.com/2");
        assert_eq!(links, vec!["https://a.com/2".to_string(), "https://a.com/1".to_string()]);
    }
}
