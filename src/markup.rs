//! Markup analysis: SEO signals and resource counts.
//!
//! The fetched HTML is parsed exactly once; downstream components (the
//! performance heuristic) reuse the counts derived here instead of reparsing.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::{clamp_score, ResourceCounts, SeoFindings};

// CSS selector strings
const TITLE_SELECTOR_STR: &str = "title";
const META_DESCRIPTION_SELECTOR_STR: &str = "meta[name='description']";
const META_ROBOTS_SELECTOR_STR: &str = "meta[name='robots']";
const H1_SELECTOR_STR: &str = "h1";
const CANONICAL_SELECTOR_STR: &str = "link[rel='canonical']";
const IMG_SELECTOR_STR: &str = "img";
const ANCHOR_SELECTOR_STR: &str = "a";
const SCRIPT_SRC_SELECTOR_STR: &str = "script[src]";
const STYLESHEET_SELECTOR_STR: &str = "link[rel='stylesheet']";

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(TITLE_SELECTOR_STR).expect("Failed to parse title selector - this is a bug")
});

static META_DESCRIPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(META_DESCRIPTION_SELECTOR_STR)
        .expect("Failed to parse meta description selector - this is a bug")
});

static META_ROBOTS_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(META_ROBOTS_SELECTOR_STR)
        .expect("Failed to parse meta robots selector - this is a bug")
});

static H1_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(H1_SELECTOR_STR).expect("Failed to parse h1 selector - this is a bug")
});

static CANONICAL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(CANONICAL_SELECTOR_STR)
        .expect("Failed to parse canonical selector - this is a bug")
});

static IMG_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(IMG_SELECTOR_STR).expect("Failed to parse img selector - this is a bug")
});

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(ANCHOR_SELECTOR_STR).expect("Failed to parse anchor selector - this is a bug")
});

static SCRIPT_SRC_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(SCRIPT_SRC_SELECTOR_STR)
        .expect("Failed to parse script selector - this is a bug")
});

static STYLESHEET_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(STYLESHEET_SELECTOR_STR)
        .expect("Failed to parse stylesheet selector - this is a bug")
});

/// SEO findings plus the resource counts shared with the performance
/// heuristic, both derived from one parse pass.
#[derive(Debug, Clone)]
pub struct MarkupAudit {
    /// Checklist-driven SEO signals and score.
    pub seo: SeoFindings,
    /// img / script[src] / stylesheet tag counts.
    pub resources: ResourceCounts,
}

/// Analyzes fetched HTML for SEO signals and resource counts.
///
/// Pure function over already-fetched content. The checklist runs in fixed
/// order; each failed rule appends exactly one issue and one recommendation.
pub fn analyze_markup(html: &str) -> MarkupAudit {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let meta_description = document
        .select(&META_DESCRIPTION_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    let h1 = document
        .select(&H1_SELECTOR)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let canonical = document
        .select(&CANONICAL_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default();

    let robots = document
        .select(&META_ROBOTS_SELECTOR)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    let images = document.select(&IMG_SELECTOR).count();
    let missing_alt = document
        .select(&IMG_SELECTOR)
        .filter(|el| {
            el.value()
                .attr("alt")
                .map(|alt| alt.trim().is_empty())
                .unwrap_or(true)
        })
        .count();
    let links = document.select(&ANCHOR_SELECTOR).count();
    let scripts = document.select(&SCRIPT_SRC_SELECTOR).count();
    let stylesheets = document.select(&STYLESHEET_SELECTOR).count();

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let title_len = title.chars().count();
    if !(10..=70).contains(&title_len) {
        issues.push("Title tag missing or not between 10-70 chars".to_string());
        recommendations.push("Add a concise, keyword-rich title (10-70 chars).".to_string());
    }
    let desc_len = meta_description.chars().count();
    if !(50..=160).contains(&desc_len) {
        issues.push("Meta description missing or not between 50-160 chars".to_string());
        recommendations.push("Write a compelling 50-160 char meta description.".to_string());
    }
    if h1.is_empty() {
        issues.push("Missing H1".to_string());
        recommendations.push("Include exactly one clear H1 on the page.".to_string());
    }
    if canonical.is_empty() {
        issues.push("Missing canonical link".to_string());
        recommendations
            .push("Add <link rel='canonical'> to prevent duplicate content.".to_string());
    }
    if missing_alt > 0 {
        issues.push(format!("{missing_alt} image(s) missing alt text"));
        recommendations
            .push("Provide descriptive alt text for all meaningful images.".to_string());
    }
    if links < 5 {
        issues.push("Very few links found".to_string());
        recommendations.push("Add internal links to improve crawlability.".to_string());
    }

    let score = clamp_score(100 - 8 * issues.len() as i64);

    MarkupAudit {
        seo: SeoFindings {
            title,
            meta_description,
            h1,
            canonical,
            robots,
            images,
            missing_alt,
            links,
            issues,
            recommendations,
            score,
        },
        resources: ResourceCounts {
            img: images,
            script: scripts,
            link: stylesheets,
        },
    }
}
