//! Pagination helper for crawlers.

use std::collections::HashSet;

use regex::Regex;
use url::Url;

use crate::error::Result;
use crate::http::{RequestOptions, Session};

/// Upper bound on pages a single crawl visits.
pub const DEFAULT_PAGE_LIMIT: usize = 50;

/// Fetch `start_url` and every page reached by following `next_page`.
///
/// `next_page` is searched in each page body; its first capture group (or the
/// whole match) is the next page's link, resolved against the current page.
/// Stops when no link is found, a page repeats, or `page_limit` pages have
/// been fetched. Page bodies are concatenated in visit order.
pub async fn crawl_pages(
    session: &Session,
    start_url: &str,
    next_page: &Regex,
    page_limit: usize,
) -> Result<String> {
    let mut content = String::new();
    let mut visited = HashSet::new();
    let mut current = Url::parse(start_url)?;

    loop {
        if visited.len() >= page_limit {
            tracing::debug!("Page limit ({}) reached at {}", page_limit, current);
            break;
        }
        if !visited.insert(current.clone()) {
            tracing::debug!("Already visited {}, stopping", current);
            break;
        }

        tracing::debug!("Crawling page {}: {}", visited.len(), current);
        let page = session.get_text(current.as_str(), RequestOptions::new()).await?;

        let next = next_page
            .captures(&page)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| m.as_str().to_string());

        content.push_str(&page);
        content.push('\n');

        match next {
            Some(link) => current = current.join(&link)?,
            None => break,
        }
    }

    Ok(content)
}
