//! Compiled form of [`ScraperConfig`]: parsed URLs, selectors and patterns.
//!
//! Compiling up front turns every bad selector or regex into a
//! [`ConfigError`] at startup instead of a silent miss mid-run.

use crate::browser::Locator;
use crate::cascade::{Cascade, Extract, Rule, compile_selector};
use crate::config::ScraperConfig;
use crate::error::ConfigError;
use regex::RegexSet;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Link discovery rules for the listing pages.
#[derive(Debug, Clone)]
pub struct ListingRules {
    /// Container tiers followed by the anchor fallback tier.
    pub links: Cascade,
    /// Index of the fallback tier inside `links`; its hits are path-filtered.
    pub fallback_tier: usize,
    pub next_page: Vec<Locator>,
    /// 0 means unbounded.
    pub max_pages: usize,
}

/// One cascade per article field.
#[derive(Debug, Clone)]
pub struct ArticleRules {
    pub title: Cascade,
    pub date: Cascade,
    pub author: Cascade,
    pub content: Cascade,
    pub images: Cascade,
}

#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub origin: Url,
    pub listing_url: String,
    pub root_url: String,
    pub link_patterns: RegexSet,
    /// Every anchor on the root page; used by the empty-listing fallback.
    pub root_anchors: Cascade,
    pub listing: ListingRules,
    pub article: ArticleRules,
    pub politeness_delay: Duration,
}

impl SiteProfile {
    pub fn compile(config: &ScraperConfig) -> Result<Self, ConfigError> {
        let origin = parse_url(&config.site.origin)?;
        parse_url(&config.site.listing_url)?;
        parse_url(&config.site.root_url)?;

        let mut links = Cascade::compile(&config.listing.containers, &Extract::FirstAnchor)?
            .rules()
            .to_vec();
        let fallback_tier = links.len();
        links.push(Rule::new(
            &config.listing.fallback_anchors,
            Extract::Attr("href".to_string()),
        )?);

        let next_page = config
            .listing
            .next_page
            .iter()
            .map(|spec| Locator::parse(spec))
            .collect::<Result<Vec<_>, _>>()?;

        let article = &config.article;
        let blocks = Extract::Blocks(compile_selector(&article.content_blocks)?);

        let article = ArticleRules {
            title: Cascade::compile(&article.title, &Extract::Text)?,
            date: Cascade::compile(&article.date, &Extract::Text)?,
            author: Cascade::compile(&article.author, &Extract::Text)?,
            content: Cascade::compile(&article.content, &blocks)?,
            images: Cascade::compile(&article.images, &Extract::Attr("src".to_string()))?,
        };
        debug!(
            listing_tiers = links.len(),
            title_tiers = article.title.len(),
            content_tiers = article.content.len(),
            image_tiers = article.images.len(),
            "Site profile compiled"
        );

        Ok(Self {
            origin,
            listing_url: config.site.listing_url.clone(),
            root_url: config.site.root_url.clone(),
            link_patterns: RegexSet::new(&config.site.link_patterns)?,
            root_anchors: Cascade::new(vec![Rule::new("a", Extract::Attr("href".to_string()))?]),
            listing: ListingRules {
                links: Cascade::new(links),
                fallback_tier,
                next_page,
                max_pages: config.listing.max_pages,
            },
            article,
            politeness_delay: Duration::from_millis(config.politeness_delay_ms),
        })
    }

    /// True when `href` looks like an article URL.
    pub fn is_article_path(&self, href: &str) -> bool {
        self.link_patterns.is_match(href)
    }
}

fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::Url {
        url: raw.to_string(),
        source,
    })
}
