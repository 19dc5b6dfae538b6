//! Selector cascades: ordered extraction rules where the first match wins.
//!
//! A [`Cascade`] is a list of [`Rule`]s, each pairing a CSS selector with an
//! [`Extract`] strategy. [`Cascade::first_match`] walks the rules in order and
//! returns the value of the first rule that matches; later rules are never
//! consulted, even when the winning match is poor.
//!
//! What "matches" means depends on the strategy:
//!
//! | Strategy | Matches when | Value |
//! |----------|--------------|-------|
//! | `text` | the selector finds an element | trimmed text of the first element |
//! | `blocks:<sel>` | the selector finds a container | non-empty `<sel>` descendants of the first container, joined by a blank line |
//! | `attr:<name>` | at least one element carries a non-empty `<name>` | every such value, in document order |
//! | `first_anchor` | the selector finds a container | `href` of the first anchor of every container |
//!
//! `text` and `blocks` may therefore yield an empty string; callers map that
//! to their sentinel without falling through to the next rule.

use crate::error::ConfigError;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("static selector"));

/// Separator placed between text blocks.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// How a rule turns matched elements into a value.
#[derive(Debug, Clone)]
pub enum Extract {
    Text,
    Blocks(Selector),
    Attr(String),
    FirstAnchor,
}

impl Extract {
    /// Parse the textual form used in configuration files.
    ///
    /// Accepts `text`, `first_anchor`, `attr:<name>` and `blocks:<selector>`.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let spec = spec.trim();
        if spec == "text" {
            return Ok(Extract::Text);
        }
        if spec == "first_anchor" {
            return Ok(Extract::FirstAnchor);
        }
        if let Some(name) = spec.strip_prefix("attr:") {
            let name = name.trim();
            if !name.is_empty() {
                return Ok(Extract::Attr(name.to_string()));
            }
        }
        if let Some(children) = spec.strip_prefix("blocks:") {
            return Ok(Extract::Blocks(compile_selector(children.trim())?));
        }
        Err(ConfigError::Selector {
            selector: spec.to_string(),
            message: "unknown extraction (expected text, first_anchor, attr:<name> or blocks:<selector>)"
                .to_string(),
        })
    }
}

/// A rule as written in configuration: either a bare selector, which uses the
/// cascade's default extraction, or a selector with an explicit extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSpec {
    Selector(String),
    Full { selector: String, extract: String },
}

impl RuleSpec {
    pub fn selector(&self) -> &str {
        match self {
            RuleSpec::Selector(s) => s,
            RuleSpec::Full { selector, .. } => selector,
        }
    }
}

impl From<&str> for RuleSpec {
    fn from(s: &str) -> Self {
        RuleSpec::Selector(s.to_string())
    }
}

/// Value produced by a matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matched {
    Text(String),
    List(Vec<String>),
}

/// The winning rule's position and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub tier: usize,
    pub value: Matched,
}

impl Hit {
    /// Text value, or `None` when it is empty.
    ///
    /// A list (from `attr:` or `first_anchor`) becomes its non-empty items
    /// joined by [`BLOCK_SEPARATOR`].
    pub fn into_text(self) -> Option<String> {
        let text = match self.value {
            Matched::Text(s) => s,
            Matched::List(items) => items.iter().filter(|s| !s.is_empty()).join(BLOCK_SEPARATOR),
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn into_list(self) -> Vec<String> {
        match self.value {
            Matched::List(items) => items,
            Matched::Text(s) if s.is_empty() => Vec::new(),
            Matched::Text(s) => vec![s],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    source: String,
    selector: Selector,
    extract: Extract,
}

impl Rule {
    pub fn new(selector: &str, extract: Extract) -> Result<Self, ConfigError> {
        Ok(Self {
            source: selector.to_string(),
            selector: compile_selector(selector)?,
            extract,
        })
    }

    pub fn selector(&self) -> &str {
        &self.source
    }

    fn apply(&self, doc: &Html) -> Option<Matched> {
        match &self.extract {
            Extract::Text => doc
                .select(&self.selector)
                .next()
                .map(|el| Matched::Text(element_text(el))),
            Extract::Blocks(children) => doc.select(&self.selector).next().map(|container| {
                let text = container
                    .select(children)
                    .map(element_text)
                    .filter(|t| !t.is_empty())
                    .join(BLOCK_SEPARATOR);
                Matched::Text(text)
            }),
            Extract::Attr(name) => {
                let values: Vec<String> = doc
                    .select(&self.selector)
                    .filter_map(|el| el.value().attr(name))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect();
                (!values.is_empty()).then_some(Matched::List(values))
            }
            Extract::FirstAnchor => {
                let mut containers = doc.select(&self.selector).peekable();
                containers.peek()?;
                let hrefs = containers
                    .filter_map(|container| container.select(&ANCHOR).next())
                    .filter_map(|anchor| anchor.value().attr("href"))
                    .map(|href| href.trim().to_string())
                    .collect();
                Some(Matched::List(hrefs))
            }
        }
    }
}

/// Ordered list of rules evaluated first-match-wins.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    rules: Vec<Rule>,
}

impl Cascade {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile configured rules; bare selectors use `default_extract`.
    pub fn compile(specs: &[RuleSpec], default_extract: &Extract) -> Result<Self, ConfigError> {
        let rules = specs
            .iter()
            .map(|spec| {
                let extract = match spec {
                    RuleSpec::Selector(_) => default_extract.clone(),
                    RuleSpec::Full { extract, .. } => Extract::parse(extract)?,
                };
                Rule::new(spec.selector(), extract)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate rules in priority order and return the first match.
    pub fn first_match(&self, doc: &Html) -> Option<Hit> {
        self.rules.iter().enumerate().find_map(|(tier, rule)| {
            rule.apply(doc).map(|value| {
                tracing::trace!(tier, selector = rule.selector(), "cascade matched");
                Hit { tier, value }
            })
        })
    }

    /// First-match text, or `sentinel` when nothing matched or the match was empty.
    pub fn text_or(&self, doc: &Html, sentinel: &str) -> String {
        self.first_match(doc)
            .and_then(Hit::into_text)
            .unwrap_or_else(|| sentinel.to_string())
    }
}

/// Trimmed concatenated text of an element and its descendants.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cascade(rules: &[(&str, &str)]) -> Cascade {
        let specs: Vec<RuleSpec> = rules
            .iter()
            .map(|(selector, extract)| RuleSpec::Full {
                selector: selector.to_string(),
                extract: extract.to_string(),
            })
            .collect();
        Cascade::compile(&specs, &Extract::Text).unwrap()
    }

    #[test]
    fn test_first_tier_wins_over_second() {
        let doc = Html::parse_document(
            r#"<h1 class="page-header">Tier one</h1><h1>Tier two</h1>"#,
        );
        let c = cascade(&[(".page-header", "text"), ("h1", "text")]);
        let hit = c.first_match(&doc).unwrap();
        assert_eq!(hit.tier, 0);
        assert_eq!(hit.into_text().as_deref(), Some("Tier one"));
    }

    #[test]
    fn test_falls_through_to_later_tier() {
        let doc = Html::parse_document(r#"<div class="byline">Phòng Truyền thông</div>"#);
        let c = cascade(&[(".author", "text"), (".byline", "text")]);
        let hit = c.first_match(&doc).unwrap();
        assert_eq!(hit.tier, 1);
        assert_eq!(hit.into_text().as_deref(), Some("Phòng Truyền thông"));
    }

    #[test]
    fn test_empty_match_short_circuits_to_sentinel() {
        let doc = Html::parse_document(r#"<div class="date">  </div><time>01/01/2025</time>"#);
        let c = cascade(&[(".date", "text"), ("time", "text")]);
        assert_eq!(c.first_match(&doc).unwrap().tier, 0);
        assert_eq!(c.text_or(&doc, "No date found"), "No date found");
    }

    #[test]
    fn test_no_match_returns_none() {
        let doc = Html::parse_document("<p>nothing here</p>");
        let c = cascade(&[(".author", "text"), (".byline", "text")]);
        assert!(c.first_match(&doc).is_none());
        assert_eq!(c.text_or(&doc, "No author found"), "No author found");
    }

    #[test]
    fn test_blocks_skip_empty_and_join() {
        let doc = Html::parse_document(
            r#"<div class="node-content"><p>A</p><p>  </p><p>B</p></div>"#,
        );
        let c = cascade(&[(".node-content", "blocks:p")]);
        assert_eq!(c.text_or(&doc, "No content found"), "A\n\nB");
    }

    #[test]
    fn test_attr_requires_a_value_to_match() {
        let doc = Html::parse_document(
            r#"<article><img alt="no src"></article>
               <div class="content"><img src="/a.png"><img src="/a.png"></div>"#,
        );
        let c = cascade(&[("article img", "attr:src"), (".content img", "attr:src")]);
        let hit = c.first_match(&doc).unwrap();
        assert_eq!(hit.tier, 1);
        assert_eq!(hit.into_list(), vec!["/a.png", "/a.png"]);
    }

    #[test]
    fn test_attr_rule_on_text_field_yields_value() {
        let doc = Html::parse_document(
            r#"<meta name="keywords" content="a"><meta name="keywords" content="b">"#,
        );
        let c = cascade(&[("meta[name=keywords]", "attr:content"), ("h1", "text")]);
        assert_eq!(c.text_or(&doc, "No title found"), "a\n\nb");
    }

    #[test]
    fn test_first_anchor_per_container() {
        let doc = Html::parse_document(
            r#"<div class="views-row"><a href="/tin-tuc/a">A</a><a href="/other">x</a></div>
               <div class="views-row"><span>no link</span></div>
               <div class="views-row"><a href="/tin-tuc/b">B</a></div>"#,
        );
        let c = cascade(&[(".views-row", "first_anchor")]);
        let hit = c.first_match(&doc).unwrap();
        assert_eq!(hit.into_list(), vec!["/tin-tuc/a", "/tin-tuc/b"]);
    }

    #[test]
    fn test_first_anchor_container_without_links_still_wins() {
        let doc = Html::parse_document(
            r#"<article><p>teaser only</p></article><div class="news-item"><a href="/x">x</a></div>"#,
        );
        let c = cascade(&[("article", "first_anchor"), (".news-item", "first_anchor")]);
        let hit = c.first_match(&doc).unwrap();
        assert_eq!(hit.tier, 0);
        assert!(hit.into_list().is_empty());
    }

    #[test]
    fn test_bare_selector_uses_default_extract() {
        let specs = vec![RuleSpec::from("img")];
        let c = Cascade::compile(&specs, &Extract::Attr("src".to_string())).unwrap();
        let doc = Html::parse_document(r#"<img src="x.png">"#);
        assert_eq!(c.first_match(&doc).unwrap().into_list(), vec!["x.png"]);
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let specs = vec![RuleSpec::from("div[")];
        let err = Cascade::compile(&specs, &Extract::Text).unwrap_err();
        assert!(matches!(err, ConfigError::Selector { .. }));
    }

    #[test]
    fn test_extract_parse() {
        assert!(matches!(Extract::parse("text").unwrap(), Extract::Text));
        assert!(matches!(Extract::parse("first_anchor").unwrap(), Extract::FirstAnchor));
        assert!(matches!(Extract::parse("attr: src").unwrap(), Extract::Attr(a) if a == "src"));
        assert!(matches!(Extract::parse("blocks:p, div").unwrap(), Extract::Blocks(_)));
        assert!(Extract::parse("attr:").is_err());
        assert!(Extract::parse("bogus").is_err());
    }
}
