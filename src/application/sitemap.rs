//! Sitemap and robots.txt generation.
//!
//! Route enumeration covers the static marketing pages, the service catalog,
//! case studies, and the insights library including its synthesized
//! pagination routes. The HTTP layer only serializes what this service
//! produces.

use std::sync::Arc;

use thiserror::Error;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::application::repos::{ContentQuery, ContentRepo, RepoError, SortOrder};
use crate::domain::content::{Category, ContentField, ContentItem, Section};

const LASTMOD_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const SLUG_DATE_PROJECTION: [ContentField; 2] = [ContentField::Slug, ContentField::Date];

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("failed to query content: {0}")]
    Content(String),
}

impl From<RepoError> for SitemapError {
    fn from(err: RepoError) -> Self {
        SitemapError::Content(err.to_string())
    }
}

/// Inputs that do not come from the content store.
#[derive(Debug, Clone)]
pub struct SitemapConfig {
    /// Site origin, e.g. `https://www.example-logistics.com`.
    pub base_url: String,
    /// Static page paths; `/` receives priority 1.0, the rest 0.7.
    pub static_paths: Vec<String>,
    /// Service detail slugs, routed as `/services/{slug}` at priority 0.8.
    pub service_slugs: Vec<String>,
    /// Articles per insights page; drives the `page=N` route synthesis.
    pub page_size: usize,
    /// Substitute for entries whose content carries no usable date.
    pub default_lastmod: Date,
}

#[derive(Clone)]
pub struct SitemapService {
    content: Arc<dyn ContentRepo>,
    config: SitemapConfig,
}

struct SitemapUrl {
    path: String,
    lastmod: Option<Date>,
    priority: &'static str,
}

impl SitemapService {
    pub fn new(content: Arc<dyn ContentRepo>, config: SitemapConfig) -> Self {
        Self { content, config }
    }

    /// Generate the sitemap.xml document.
    pub async fn sitemap_xml(&self) -> Result<String, SitemapError> {
        let mut urls = Vec::new();

        for path in &self.config.static_paths {
            let priority = if path == "/" { "1.0" } else { "0.7" };
            urls.push(SitemapUrl {
                path: path.clone(),
                lastmod: None,
                priority,
            });
        }

        for slug in &self.config.service_slugs {
            urls.push(SitemapUrl {
                path: format!("/services/{slug}"),
                lastmod: None,
                priority: "0.8",
            });
        }

        let cases = self
            .content
            .fetch_all(
                &ContentQuery::section(Section::Cases)
                    .project(SLUG_DATE_PROJECTION.to_vec())
                    .sort_by(ContentField::Date, SortOrder::Descending),
            )
            .await?;
        for case in &cases {
            if let Some(slug) = &case.slug {
                urls.push(SitemapUrl {
                    path: format!("/cases/{slug}"),
                    lastmod: case.date,
                    priority: "0.65",
                });
            }
        }

        for category in Category::ALL {
            let articles = self
                .content
                .fetch_all(
                    &ContentQuery::section(Section::Insights)
                        .filter_dir(category)
                        .project(SLUG_DATE_PROJECTION.to_vec())
                        .sort_by(ContentField::Date, SortOrder::Descending),
                )
                .await?;

            // Empty categories yield no routes at all.
            if articles.is_empty() {
                continue;
            }

            urls.push(SitemapUrl {
                path: format!("/insights?category={}", category.as_str()),
                lastmod: None,
                priority: "0.7",
            });

            for page in 2..=page_count(articles.len(), self.config.page_size) {
                urls.push(SitemapUrl {
                    path: format!("/insights?category={}&page={page}", category.as_str()),
                    lastmod: None,
                    priority: "0.7",
                });
            }

            for article in &articles {
                if let Some(slug) = &article.slug {
                    urls.push(SitemapUrl {
                        path: format!("/insights/{slug}"),
                        lastmod: article.date,
                        priority: "0.65",
                    });
                }
            }
        }

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for url in urls {
            xml.push_str(&self.sitemap_entry(&url));
        }
        xml.push_str("</urlset>\n");
        Ok(xml)
    }

    /// Generate the robots.txt body, pointing crawlers at the sitemap.
    pub fn robots_txt(&self) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        format!("User-agent: *\nAllow: /\nDisallow: /admin\nSitemap: {base}/sitemap.xml\n")
    }

    fn sitemap_entry(&self, url: &SitemapUrl) -> String {
        let loc = escape_xml(&canonical_url(&self.config.base_url, &url.path));
        let lastmod = format_lastmod(url.lastmod, self.config.default_lastmod);
        format!(
            "  <url><loc>{loc}</loc><lastmod>{lastmod}</lastmod><changefreq>weekly</changefreq><priority>{}</priority></url>\n",
            url.priority
        )
    }
}

fn page_count(article_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    article_count.div_ceil(page_size)
}

fn canonical_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path == "/" {
        base.to_string()
    } else {
        format!("{base}{path}")
    }
}

fn format_lastmod(date: Option<Date>, default: Date) -> String {
    date.unwrap_or(default)
        .format(LASTMOD_FORMAT)
        .ok()
        .unwrap_or_default()
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Paginated insight routes for one category, exposed for the content APIs
/// which slice the full fetched list the same way the sitemap counts it.
pub fn paginate<'a>(items: &'a [ContentItem], page: usize, page_size: usize) -> &'a [ContentItem] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = usize::min(start + page_size, items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn escape_xml_covers_the_five_special_characters() {
        assert_eq!(
            escape_xml("/insights?category=a&page=2 <\"'>"),
            "/insights?category=a&amp;page=2 &lt;&quot;&apos;&gt;"
        );
    }

    #[test]
    fn canonical_url_collapses_home_to_the_bare_origin() {
        assert_eq!(
            canonical_url("https://example.com/", "/"),
            "https://example.com"
        );
        assert_eq!(
            canonical_url("https://example.com", "/cases/port-move"),
            "https://example.com/cases/port-move"
        );
    }

    #[test]
    fn lastmod_falls_back_to_the_default_date() {
        let default = date!(2024 - 01 - 01);
        assert_eq!(format_lastmod(None, default), "2024-01-01");
        assert_eq!(
            format_lastmod(Some(date!(2024 - 03 - 01)), default),
            "2024-03-01"
        );
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(13, 6), 3);
        assert_eq!(page_count(12, 6), 2);
        assert_eq!(page_count(1, 6), 1);
        assert_eq!(page_count(0, 6), 0);
    }

    #[test]
    fn paginate_slices_the_full_list() {
        let items: Vec<ContentItem> = (0..13)
            .map(|i| ContentItem::new(format!("/insights/{i}")))
            .collect();

        assert_eq!(paginate(&items, 1, 6).len(), 6);
        assert_eq!(paginate(&items, 3, 6).len(), 1);
        assert!(paginate(&items, 4, 6).is_empty());
        assert!(paginate(&items, 0, 6).is_empty());
    }
}
