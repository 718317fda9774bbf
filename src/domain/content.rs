//! Content entities mirrored from the authored content library.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::error::DomainError;

/// Top-level content collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Cases,
    Insights,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Cases => "cases",
            Section::Insights => "insights",
        }
    }
}

impl TryFrom<&str> for Section {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "cases" => Ok(Section::Cases),
            "insights" => Ok(Section::Insights),
            other => Err(DomainError::validation(format!(
                "unknown content section `{other}`"
            ))),
        }
    }
}

/// Second-level grouping within the insights section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Company,
    Industry,
    Knowledge,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Company, Category::Industry, Category::Knowledge];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Company => "company",
            Category::Industry => "industry",
            Category::Knowledge => "knowledge",
        }
    }
}

impl TryFrom<&str> for Category {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "company" => Ok(Category::Company),
            "industry" => Ok(Category::Industry),
            "knowledge" => Ok(Category::Knowledge),
            other => Err(DomainError::validation(format!(
                "unknown insight category `{other}`"
            ))),
        }
    }
}

/// A projectable field of a content item. The path identifier is always
/// retained and therefore has no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentField {
    Slug,
    Title,
    Description,
    Date,
    Category,
    Tags,
    Image,
}

/// An authored document. Identity is `path`; every other field may be absent,
/// either because the author omitted it or because a projection dropped it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ContentItem {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            slug: None,
            title: None,
            description: None,
            date: None,
            category: None,
            image: None,
            tags: None,
            extra: BTreeMap::new(),
        }
    }

    /// Reduce this item to the requested fields plus its path. Extra fields
    /// never survive a projection.
    pub fn project(&self, fields: &[ContentField]) -> ContentItem {
        let mut item = ContentItem::new(self.path.clone());
        for field in fields {
            match field {
                ContentField::Slug => item.slug = self.slug.clone(),
                ContentField::Title => item.title = self.title.clone(),
                ContentField::Description => item.description = self.description.clone(),
                ContentField::Date => item.date = self.date,
                ContentField::Category => item.category = self.category.clone(),
                ContentField::Tags => item.tags = self.tags.clone(),
                ContentField::Image => item.image = self.image.clone(),
            }
        }
        item
    }
}

/// Newest-first ordering. Undated items sort after every dated one.
pub fn by_date_descending(a: &ContentItem, b: &ContentItem) -> Ordering {
    match (a.date, b.date) {
        (Some(left), Some(right)) => right.cmp(&left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
