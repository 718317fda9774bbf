//! Content-query collaborator contract.
//!
//! Queries are declarative: callers describe a section, equality filters, a
//! projection, and a sort, and the adapter evaluates them against whatever
//! store it fronts (filesystem here, but the caching layer only ever sees
//! this trait). There is no server-side pagination; callers that paginate do
//! so over the full fetched list.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::content::{Category, ContentField, ContentItem, Section};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("content store error: {0}")]
    Persistence(String),
    #[error("invalid query: {message}")]
    InvalidQuery { message: String },
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }
}

/// A field an equality filter may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    /// The subdirectory a document lives in (e.g. `company`).
    Dir,
    Slug,
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEquals {
    pub field: QueryField,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: ContentField,
    pub order: SortOrder,
}

/// Declarative content query, built up in the style of a query chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentQuery {
    pub section: Section,
    pub filters: Vec<FieldEquals>,
    pub projection: Option<Vec<ContentField>>,
    pub sort: Option<SortSpec>,
}

impl ContentQuery {
    pub fn section(section: Section) -> Self {
        Self {
            section,
            filters: Vec::new(),
            projection: None,
            sort: None,
        }
    }

    pub fn filter_equals(mut self, field: QueryField, value: impl Into<String>) -> Self {
        self.filters.push(FieldEquals {
            field,
            value: value.into(),
        });
        self
    }

    pub fn filter_dir(self, dir: Category) -> Self {
        self.filter_equals(QueryField::Dir, dir.as_str())
    }

    pub fn project(mut self, fields: impl Into<Vec<ContentField>>) -> Self {
        self.projection = Some(fields.into());
        self
    }

    pub fn sort_by(mut self, field: ContentField, order: SortOrder) -> Self {
        self.sort = Some(SortSpec { field, order });
        self
    }
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Fetch every item matching the query, in query order.
    async fn fetch_all(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, RepoError>;

    /// Fetch the first item matching the query, or `None`.
    async fn fetch_one(&self, query: &ContentQuery) -> Result<Option<ContentItem>, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_accumulates_clauses() {
        let query = ContentQuery::section(Section::Insights)
            .filter_dir(Category::Industry)
            .filter_equals(QueryField::Slug, "rate-watch")
            .project(vec![ContentField::Title, ContentField::Date])
            .sort_by(ContentField::Date, SortOrder::Descending);

        assert_eq!(query.section, Section::Insights);
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].field, QueryField::Dir);
        assert_eq!(query.filters[0].value, "industry");
        assert_eq!(
            query.projection.as_deref(),
            Some(&[ContentField::Title, ContentField::Date][..])
        );
        assert_eq!(
            query.sort,
            Some(SortSpec {
                field: ContentField::Date,
                order: SortOrder::Descending,
            })
        );
    }
}
