//! Request-scoped memoization over the content-query collaborator.
//!
//! Three caches: list results, single articles, and related-article picks.
//! Entries are never evicted or expired; the cache lives only as long as the
//! render scope that constructed it, and the content volume behind it is
//! small. A missing article is reported as `Ok(None)` and deliberately not
//! cached, so repeated lookups for an absent slug re-query the store.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use metrics::counter;
use rand::Rng;
use serde::Serialize;
use time::Date;
use tracing::debug;

use crate::application::repos::{
    ContentQuery, ContentRepo, QueryField, RepoError, SortOrder,
};
use crate::domain::content::{Category, ContentField, ContentItem, Section, by_date_descending};
use crate::util::lock::{rw_read, rw_write};

const SOURCE: &str = "application::content_cache";

pub const DEFAULT_RELATED_LIMIT: usize = 3;

/// Projection used for related-article candidates.
const RELATED_PROJECTION: [ContentField; 4] = [
    ContentField::Title,
    ContentField::Image,
    ContentField::Date,
    ContentField::Category,
];

/// Source of the uniform jitter added to related-selection weights. Injected
/// so tests can pin the sequence; production uses the thread RNG.
pub trait RecencyJitter: Send + Sync {
    /// A sample in `[0, 2)`.
    fn sample(&self) -> f64;
}

pub struct ThreadRngJitter;

impl RecencyJitter for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::rng().random_range(0.0..2.0)
    }
}

/// List-cache key. The projection participates in the key so that two calls
/// for the same (section, subdirectory) with different projections never
/// serve each other's fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ListKey {
    section: Section,
    dir: Option<Category>,
    projection: Option<Vec<ContentField>>,
}

impl ListKey {
    fn new(section: Section, dir: Option<Category>, projection: Option<&[ContentField]>) -> Self {
        let projection = projection.map(|fields| {
            let mut normalized = fields.to_vec();
            normalized.sort_unstable();
            normalized.dedup();
            normalized
        });
        Self {
            section,
            dir,
            projection,
        }
    }
}

/// The minimal projection handed to pagination UI for prev/next links.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborRef {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<Date>,
}

impl NeighborRef {
    fn from_item(item: &ContentItem) -> Self {
        Self {
            title: item.title.clone(),
            slug: item.slug.clone(),
            date: item.date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbors {
    pub previous: Option<NeighborRef>,
    pub next: Option<NeighborRef>,
}

pub struct ContentCache {
    repo: Arc<dyn ContentRepo>,
    jitter: Arc<dyn RecencyJitter>,
    lists: RwLock<HashMap<ListKey, Arc<Vec<ContentItem>>>>,
    // Keyed by `section[/dir]:slug`; entries arrive from direct lookups and
    // from unprojected list results.
    articles: RwLock<HashMap<String, ContentItem>>,
    related: RwLock<HashMap<String, Arc<Vec<ContentItem>>>>,
}

impl ContentCache {
    pub fn new(repo: Arc<dyn ContentRepo>, jitter: Arc<dyn RecencyJitter>) -> Self {
        Self {
            repo,
            jitter,
            lists: RwLock::new(HashMap::new()),
            articles: RwLock::new(HashMap::new()),
            related: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the date-descending list for a section, optionally restricted to
    /// a subdirectory and projected to the given fields (plus path).
    ///
    /// Concurrent misses on one key may both reach the store; the writes
    /// converge on identical values, so the race is redundant work only.
    pub async fn fetch_list(
        &self,
        section: Section,
        dir: Option<Category>,
        projection: Option<&[ContentField]>,
    ) -> Result<Arc<Vec<ContentItem>>, RepoError> {
        let key = ListKey::new(section, dir, projection);
        if let Some(list) = rw_read(&self.lists, SOURCE, "fetch_list").get(&key) {
            counter!("cartage_content_list_hit_total").increment(1);
            debug!(cache = "list", outcome = "hit", section = section.as_str());
            return Ok(list.clone());
        }
        counter!("cartage_content_list_miss_total").increment(1);
        debug!(cache = "list", outcome = "miss", section = section.as_str());

        let mut query = ContentQuery::section(section)
            .sort_by(ContentField::Date, SortOrder::Descending);
        if let Some(dir) = dir {
            query = query.filter_dir(dir);
        }
        if let Some(fields) = projection {
            query = query.project(fields.to_vec());
        }

        let list = Arc::new(self.repo.fetch_all(&query).await?);

        // Full list results double as article-cache seeds, so a later
        // fetch_article for any listed slug is a hit. Projected lists are
        // partial and must not seed.
        if projection.is_none() {
            let mut articles = rw_write(&self.articles, SOURCE, "fetch_list.seed");
            for item in list.iter() {
                if let Some(slug) = &item.slug {
                    articles
                        .entry(article_key(section, dir, slug))
                        .or_insert_with(|| item.clone());
                }
            }
        }

        rw_write(&self.lists, SOURCE, "fetch_list.store").insert(key, list.clone());
        Ok(list)
    }

    /// Fetch one article by slug. Only positive results are memoized.
    pub async fn fetch_article(
        &self,
        section: Section,
        slug: &str,
        dir: Option<Category>,
    ) -> Result<Option<ContentItem>, RepoError> {
        let key = article_key(section, dir, slug);
        if let Some(article) = rw_read(&self.articles, SOURCE, "fetch_article").get(&key) {
            counter!("cartage_content_article_hit_total").increment(1);
            debug!(cache = "article", outcome = "hit", slug);
            return Ok(Some(article.clone()));
        }
        counter!("cartage_content_article_miss_total").increment(1);
        debug!(cache = "article", outcome = "miss", slug);

        let mut query = ContentQuery::section(section);
        if let Some(dir) = dir {
            query = query.filter_dir(dir);
        }
        query = query.filter_equals(QueryField::Slug, slug);

        let article = self.repo.fetch_one(&query).await?;
        if let Some(article) = &article {
            rw_write(&self.articles, SOURCE, "fetch_article.store")
                .insert(key, article.clone());
        }
        Ok(article)
    }

    /// Locate the chronological neighbors of `current_path` within its list.
    /// `previous` is the newer item, `next` the older one; no wraparound.
    pub async fn fetch_prev_next(
        &self,
        section: Section,
        current_path: &str,
        dir: Option<Category>,
    ) -> Result<Neighbors, RepoError> {
        let list = self.fetch_list(section, dir, None).await?;

        // The list arrives newest-first already; re-sorting a copy keeps the
        // neighbor math correct even if an adapter skips the sort clause.
        let mut sorted: Vec<&ContentItem> = list.iter().collect();
        sorted.sort_by(|a, b| by_date_descending(a, b));

        let Some(index) = sorted.iter().position(|item| item.path == current_path) else {
            return Ok(Neighbors {
                previous: None,
                next: None,
            });
        };

        let previous = (index > 0).then(|| NeighborRef::from_item(sorted[index - 1]));
        let next = sorted.get(index + 1).copied().map(NeighborRef::from_item);

        Ok(Neighbors { previous, next })
    }

    /// Recommend up to `limit` other articles from the same list, biased
    /// towards recent items with a random tiebreak. The pick is resolved once
    /// per key and then frozen by the cache, so a scope sees a stable set.
    pub async fn fetch_related(
        &self,
        current_path: &str,
        section: Section,
        dir: Option<Category>,
        limit: usize,
    ) -> Result<Arc<Vec<ContentItem>>, RepoError> {
        let key = format!(
            "{}|{}|{}",
            section.as_str(),
            dir.map_or("all", Category::as_str),
            limit
        );
        if let Some(selected) = rw_read(&self.related, SOURCE, "fetch_related").get(&key) {
            counter!("cartage_content_related_hit_total").increment(1);
            debug!(cache = "related", outcome = "hit", key = %key);
            return Ok(selected.clone());
        }
        counter!("cartage_content_related_miss_total").increment(1);
        debug!(cache = "related", outcome = "miss", key = %key);

        let list = self
            .fetch_list(section, dir, Some(&RELATED_PROJECTION))
            .await?;
        let candidates: Vec<ContentItem> = list
            .iter()
            .filter(|item| item.path != current_path)
            .cloned()
            .collect();

        let selected = Arc::new(select_with_recency_bias(
            candidates,
            limit,
            self.jitter.as_ref(),
        ));
        rw_write(&self.related, SOURCE, "fetch_related.store").insert(key, selected.clone());
        Ok(selected)
    }
}

fn article_key(section: Section, dir: Option<Category>, slug: &str) -> String {
    match dir {
        Some(dir) => format!("{}/{}:{slug}", section.as_str(), dir.as_str()),
        None => format!("{}:{slug}", section.as_str()),
    }
}

/// Weighted pick over date-descending candidates: position i carries weight
/// max(1, 4 - i) plus a jitter in [0, 2), so the newest few items dominate
/// while older ones still surface occasionally. Candidate counts at or below
/// `count` short-circuit to the full list in list order.
fn select_with_recency_bias(
    articles: Vec<ContentItem>,
    count: usize,
    jitter: &dyn RecencyJitter,
) -> Vec<ContentItem> {
    if articles.len() <= count {
        return articles;
    }

    let mut weighted: Vec<(f64, ContentItem)> = articles
        .into_iter()
        .enumerate()
        .map(|(index, article)| {
            let weight = (4.0 - index as f64).max(1.0) + jitter.sample();
            (weight, article)
        })
        .collect();
    weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
    weighted.truncate(count);
    weighted.into_iter().map(|(_, article)| article).collect()
}
