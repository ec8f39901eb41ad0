//! Extraction capabilities: descriptor, variant traits and the per-call item
//! accumulator.

use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use regex::Regex;

use crate::error::Result;
use crate::extract::item::{ContentKind, Item};
use crate::http::Session;

/// Which shape of result a capability produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// Turns a URL into items.
    Extractor,
    /// Turns a URL into page content that is searched for further links.
    Crawler,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Extractor => write!(f, "extractor"),
            CapabilityKind::Crawler => write!(f, "crawler"),
        }
    }
}

/// Identity and URL predicate of a capability.
#[derive(Debug, Clone)]
pub struct Descriptor {
    name: String,
    protocol: String,
    domain: String,
    description: String,
    patterns: Vec<Regex>,
    sample_urls: Vec<String>,
}

impl Descriptor {
    /// Create a descriptor, compiling its URL patterns.
    pub fn new(
        name: impl Into<String>,
        protocol: impl Into<String>,
        domain: impl Into<String>,
        description: impl Into<String>,
        patterns: &[&str],
        sample_urls: &[&str],
    ) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            protocol: protocol.into(),
            domain: domain.into(),
            description: description.into(),
            patterns,
            sample_urls: sample_urls.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    pub fn sample_urls(&self) -> &[String] {
        &self.sample_urls
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }

    /// Whether any pattern matches at the start of `url`.
    pub fn is_suitable(&self, url: &str) -> bool {
        self.patterns
            .iter()
            .any(|p| p.find(url).is_some_and(|m| m.start() == 0))
    }

    /// All links in `content` matching any pattern, unique, in first-seen order.
    pub fn find_links(&self, content: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut found: Vec<(usize, String)> = Vec::new();

        for pattern in &self.patterns {
            for m in pattern.find_iter(content) {
                if seen.insert(m.as_str().to_string()) {
                    found.push((m.start(), m.as_str().to_string()));
                }
            }
        }

        found.sort_by_key(|(pos, _)| *pos);
        found.into_iter().map(|(_, link)| link).collect()
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.base_url(), self.description)
    }
}

/// Accumulates the items found by one extraction call.
#[derive(Debug, Default)]
pub struct ItemCollector {
    items: Vec<Item>,
}

impl ItemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add an item.
    pub fn add_item(
        &mut self,
        content_kind: ContentKind,
        filename: impl Into<String>,
        extension: impl Into<String>,
        source: impl Into<String>,
        album_title: Option<String>,
    ) -> Result<()> {
        let item = Item::new(content_kind, filename, extension, source, album_title)?;
        self.push(item);
        Ok(())
    }

    /// Add an item from its full file name, deriving name, extension and kind.
    pub fn add_file(
        &mut self,
        file_name: &str,
        source: impl Into<String>,
        album_title: Option<String>,
    ) -> Result<()> {
        let item = Item::from_file_name(file_name, source, album_title)?;
        self.push(item);
        Ok(())
    }

    fn push(&mut self, item: Item) {
        tracing::debug!("Adding {}", item);
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

/// A capability that produces items for a URL.
#[async_trait]
pub trait Extractor: Send + Sync {
    fn descriptor(&self) -> &Descriptor;

    /// One-time preparation (authentication, warm-up requests).
    async fn initialize(&self, _session: &Session) -> Result<()> {
        Ok(())
    }

    async fn extract(&self, session: &Session, url: &str, items: &mut ItemCollector)
        -> Result<()>;
}

/// A capability that walks pages and returns their raw content.
#[async_trait]
pub trait Crawler: Send + Sync {
    fn descriptor(&self) -> &Descriptor;

    /// One-time preparation (authentication, warm-up requests).
    async fn initialize(&self, _session: &Session) -> Result<()> {
        Ok(())
    }

    async fn crawl(&self, session: &Session, url: &str) -> Result<String>;
}

/// Result of running a capability on a URL.
#[derive(Debug)]
pub enum Extracted {
    Items(Vec<Item>),
    Page(String),
}

/// A registered capability of either variant.
pub enum Capability {
    Extractor(Box<dyn Extractor>),
    Crawler(Box<dyn Crawler>),
}

impl Capability {
    pub fn extractor(extractor: impl Extractor + 'static) -> Self {
        Capability::Extractor(Box::new(extractor))
    }

    pub fn crawler(crawler: impl Crawler + 'static) -> Self {
        Capability::Crawler(Box::new(crawler))
    }

    pub fn descriptor(&self) -> &Descriptor {
        match self {
            Capability::Extractor(e) => e.descriptor(),
            Capability::Crawler(c) => c.descriptor(),
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::Extractor(_) => CapabilityKind::Extractor,
            Capability::Crawler(_) => CapabilityKind::Crawler,
        }
    }

    pub async fn initialize(&self, session: &Session) -> Result<()> {
        match self {
            Capability::Extractor(e) => e.initialize(session).await,
            Capability::Crawler(c) => c.initialize(session).await,
        }
    }

    /// Run the capability on `url`.
    ///
    /// Extractors get a fresh collector per call.
    pub async fn extract_data(&self, session: &Session, url: &str) -> Result<Extracted> {
        match self {
            Capability::Extractor(e) => {
                let mut items = ItemCollector::new();
                e.extract(session, url, &mut items).await?;
                tracing::debug!(
                    "{} found {} item(s) at {}",
                    e.descriptor().name(),
                    items.len(),
                    url
                );
                Ok(Extracted::Items(items.into_items()))
            }
            Capability::Crawler(c) => Ok(Extracted::Page(c.crawl(session, url).await?)),
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("kind", &self.kind())
            .field("name", &self.descriptor().name())
            .finish()
    }
}
