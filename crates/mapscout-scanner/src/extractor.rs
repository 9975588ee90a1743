//! Candidate and detail extraction from page snapshots.

use crate::error::{Result, ScanError};
use mapscout_core::{CandidateStub, SelectorConfig};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use url::Url;

/// Fields read from a listing's detail page. Missing elements read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFields {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub website: String,
    pub hours: String,
    pub rating: String,
    pub num_reviews: String,
    pub category: String,
}

/// Reads pipeline data out of serialized page HTML.
pub trait PageExtractor: Send + Sync {
    /// Up to `limit` candidate stubs from the results feed, in feed order.
    fn extract_stubs(&self, html: &str, limit: usize) -> Vec<CandidateStub>;

    /// Structured fields from a detail page.
    fn extract_detail(&self, html: &str) -> Result<DetailFields>;
}

/// [`PageExtractor`] driven by a [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct MapsExtractor {
    base_url: Option<Url>,
    phone_prefix: String,
    address_prefix: String,
    feed_item: Selector,
    item_name: Selector,
    item_rating: Selector,
    item_reviews: Selector,
    item_address: Selector,
    item_hours: Selector,
    item_link: Selector,
    detail_name: Selector,
    detail_phone: Selector,
    detail_address: Selector,
    detail_website: Selector,
    detail_hours: Selector,
    detail_rating: Selector,
    detail_review_count: Selector,
    detail_category: Selector,
}

impl MapsExtractor {
    /// Compile the configured selectors. Relative links resolve against
    /// `base_url` when one is given.
    pub fn new(selectors: &SelectorConfig, base_url: Option<&str>) -> Result<Self> {
        let base_url = base_url
            .map(|b| {
                Url::parse(b).map_err(|e| ScanError::InvalidConfig(format!("base URL '{b}': {e}")))
            })
            .transpose()?;

        Ok(Self {
            base_url,
            phone_prefix: selectors.detail_phone_prefix.clone(),
            address_prefix: selectors.detail_address_prefix.clone(),
            feed_item: compile("feed_item", &selectors.feed_item)?,
            item_name: compile("item_name", &selectors.item_name)?,
            item_rating: compile("item_rating", &selectors.item_rating)?,
            item_reviews: compile("item_reviews", &selectors.item_reviews)?,
            item_address: compile("item_address", &selectors.item_address)?,
            item_hours: compile("item_hours", &selectors.item_hours)?,
            item_link: compile("item_link", &selectors.item_link)?,
            detail_name: compile("detail_name", &selectors.detail_name)?,
            detail_phone: compile("detail_phone", &selectors.detail_phone)?,
            detail_address: compile("detail_address", &selectors.detail_address)?,
            detail_website: compile("detail_website", &selectors.detail_website)?,
            detail_hours: compile("detail_hours", &selectors.detail_hours)?,
            detail_rating: compile("detail_rating", &selectors.detail_rating)?,
            detail_review_count: compile("detail_review_count", &selectors.detail_review_count)?,
            detail_category: compile("detail_category", &selectors.detail_category)?,
        })
    }

    fn parse_item(&self, item: &ElementRef) -> CandidateStub {
        let hours = item
            .select(&self.item_hours)
            .next()
            .map(|el| {
                let next = el
                    .next_siblings()
                    .find_map(ElementRef::wrap)
                    .map(|sib| sib.text().collect::<String>())
                    .unwrap_or_default();
                format!("{}{next}", el.text().collect::<String>())
            })
            .unwrap_or_default();

        let detail_ref = item
            .select(&self.item_link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| self.resolve_link(href))
            .unwrap_or_default();

        CandidateStub {
            name: first_text(item, &self.item_name),
            rating: first_text(item, &self.item_rating),
            review_count: first_text(item, &self.item_reviews)
                .chars()
                .filter(|c| *c != '(' && *c != ')')
                .collect(),
            address: first_text(item, &self.item_address),
            hours,
            detail_ref,
        }
    }

    fn resolve_link(&self, href: &str) -> String {
        if Url::parse(href).is_ok() {
            return href.to_string();
        }
        match &self.base_url {
            Some(base) => base
                .join(href)
                .map_or_else(|_| href.to_string(), String::from),
            None => href.to_string(),
        }
    }
}

impl PageExtractor for MapsExtractor {
    fn extract_stubs(&self, html: &str, limit: usize) -> Vec<CandidateStub> {
        if limit == 0 {
            return Vec::new();
        }
        let document = Html::parse_document(html);
        document
            .select(&self.feed_item)
            .take(limit)
            .map(|item| self.parse_item(&item))
            .collect()
    }

    fn extract_detail(&self, html: &str) -> Result<DetailFields> {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let num_reviews = match root
            .select(&self.detail_review_count)
            .next()
            .and_then(|el| el.value().attr("aria-label"))
        {
            Some(label) => first_number(label)
                .ok_or_else(|| {
                    ScanError::Extraction(format!("no review count in label '{label}'"))
                })?
                .to_string(),
            None => String::new(),
        };

        Ok(DetailFields {
            name: first_text(&root, &self.detail_name),
            phone: prefixed_label(&root, &self.detail_phone, &self.phone_prefix),
            address: prefixed_label(&root, &self.detail_address, &self.address_prefix),
            website: root
                .select(&self.detail_website)
                .next()
                .and_then(|el| el.value().attr("href"))
                .map(|href| self.resolve_link(href))
                .unwrap_or_default(),
            hours: first_text(&root, &self.detail_hours),
            rating: first_text(&root, &self.detail_rating),
            num_reviews,
            category: first_text(&root, &self.detail_category),
        })
    }
}

fn compile(field: &str, css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ScanError::InvalidConfig(format!("invalid {field} selector '{css}': {e}")))
}

fn first_text(scope: &ElementRef, selector: &Selector) -> String {
    scope
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn prefixed_label(scope: &ElementRef, selector: &Selector, prefix: &str) -> String {
    scope
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("aria-label"))
        .map(|label| label.replacen(prefix, "", 1).trim().to_string())
        .unwrap_or_default()
}

fn first_number(text: &str) -> Option<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").expect("valid number regex"))
        .find(text)
        .map(|m| m.as_str())
}
