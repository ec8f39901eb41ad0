//! Extraction module.
//!
//! This module provides:
//! - The item model and extension table
//! - Extractor and crawler capabilities
//! - The registry that dispatches URLs to capabilities

pub mod capability;
pub mod crawl;
pub mod item;
pub mod registry;

pub use capability::{
    Capability, CapabilityKind, Crawler, Descriptor, Extracted, Extractor, ItemCollector,
};
pub use crawl::{crawl_pages, DEFAULT_PAGE_LIMIT};
pub use item::{split_filename_ext, ContentKind, Item};
pub use registry::Registry;
