#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use cartage::application::repos::{
    ContentQuery, ContentRepo, FieldEquals, QueryField, RepoError, SortOrder,
};
use cartage::domain::content::{Category, ContentItem, Section, by_date_descending};
use time::Date;

/// In-memory `ContentRepo` that records every query it evaluates.
#[derive(Default)]
pub struct RecordingRepo {
    docs: Vec<(Section, Option<Category>, ContentItem)>,
    calls: Mutex<Vec<ContentQuery>>,
}

impl RecordingRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_doc(mut self, section: Section, dir: Option<Category>, item: ContentItem) -> Self {
        self.docs.push((section, dir, item));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("call log lock").len()
    }

    fn evaluate(&self, query: &ContentQuery) -> Vec<ContentItem> {
        self.calls
            .lock()
            .expect("call log lock")
            .push(query.clone());

        let mut matches: Vec<&ContentItem> = self
            .docs
            .iter()
            .filter(|(section, _, _)| *section == query.section)
            .filter(|(_, dir, item)| {
                query
                    .filters
                    .iter()
                    .all(|filter| matches_filter(*dir, item, filter))
            })
            .map(|(_, _, item)| item)
            .collect();

        if let Some(sort) = &query.sort {
            match sort.order {
                SortOrder::Descending => matches.sort_by(|a, b| by_date_descending(a, b)),
                SortOrder::Ascending => matches.sort_by(|a, b| by_date_descending(b, a)),
            }
        }

        matches
            .into_iter()
            .map(|item| match &query.projection {
                Some(fields) => item.project(fields),
                None => item.clone(),
            })
            .collect()
    }
}

fn matches_filter(dir: Option<Category>, item: &ContentItem, filter: &FieldEquals) -> bool {
    match filter.field {
        QueryField::Dir => dir.map(Category::as_str) == Some(filter.value.as_str()),
        QueryField::Slug => item.slug.as_deref() == Some(filter.value.as_str()),
        QueryField::Category => item.category.as_deref() == Some(filter.value.as_str()),
    }
}

#[async_trait]
impl ContentRepo for RecordingRepo {
    async fn fetch_all(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, RepoError> {
        Ok(self.evaluate(query))
    }

    async fn fetch_one(&self, query: &ContentQuery) -> Result<Option<ContentItem>, RepoError> {
        Ok(self.evaluate(query).into_iter().next())
    }
}

pub fn doc(path: &str, slug: &str, date: Option<Date>) -> ContentItem {
    let mut item = ContentItem::new(path);
    item.slug = Some(slug.to_string());
    item.title = Some(format!("Title for {slug}"));
    item.date = date;
    item
}
