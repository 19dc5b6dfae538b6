//! Browser-driven scrapers for the TDMU news site.
//!
//! Scraping follows the same two-phase pattern for every run:
//!
//! 1. **Discovery**: walk the paginated listing and collect article URLs
//! 2. **Extraction**: open each URL and read its fields through the profile's cascades
//!
//! # Submodules
//!
//! | Module | Entry point | Input | Output |
//! |--------|-------------|-------|--------|
//! | [`listing`] | [`listing::LinkDiscoverer`] | listing URL | ordered, deduplicated article URLs |
//! | [`article`] | [`article::ArticleExtractor`] | one article URL | [`crate::models::ArticleOutcome`] |
//!
//! Both take the browser as `&mut dyn PageDriver`, so one session is reused
//! for the whole run and tests can substitute an in-memory driver.
//!
//! # Failure handling
//!
//! - A "next" control that cannot be found, clicked or followed ends
//!   pagination; links collected so far are kept
//! - Failing to load the first listing page, or to read any listing page's
//!   HTML, aborts discovery
//! - A failed article becomes a typed [`crate::models::ExtractFailure`] and
//!   never aborts the run

pub mod article;
pub mod listing;
