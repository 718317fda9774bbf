//! Filesystem content store.
//!
//! Adapts a directory of TOML documents to the `ContentRepo` contract:
//! `cases/*.toml` plus `insights/{company,industry,knowledge}/*.toml`.
//! Documents are loaded eagerly at startup and queries are evaluated in
//! memory; the authoring pipeline that produces the documents is outside
//! this system.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use time::{Date, Month};
use tracing::{debug, warn};

use crate::application::repos::{
    ContentQuery, ContentRepo, FieldEquals, QueryField, RepoError, SortOrder,
};
use crate::domain::content::{Category, ContentField, ContentItem, Section, by_date_descending};
use crate::infra::error::InfraError;

#[derive(Debug, Clone)]
struct StoredDoc {
    section: Section,
    dir: Option<Category>,
    item: ContentItem,
}

/// In-memory snapshot of the content directory.
pub struct TomlContentStore {
    docs: Vec<StoredDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Calendar(toml::value::Datetime),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawDoc {
    title: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    date: Option<RawDate>,
    category: Option<String>,
    image: Option<String>,
    tags: Option<Vec<String>>,
    #[serde(flatten)]
    extra: BTreeMap<String, toml::Value>,
}

impl TomlContentStore {
    /// Load every document under `root`. Malformed TOML fails the load;
    /// missing or unparseable dates are kept as `None` with a warning so the
    /// sitemap's fallback date can take over.
    pub fn load(root: &Path) -> Result<Self, InfraError> {
        let mut docs = Vec::new();

        load_section_dir(&root.join("cases"), Section::Cases, None, &mut docs)?;
        for category in Category::ALL {
            load_section_dir(
                &root.join("insights").join(category.as_str()),
                Section::Insights,
                Some(category),
                &mut docs,
            )?;
        }

        // read_dir order is platform-dependent; pin a deterministic base
        // order so equal-date ties resolve the same way on every start.
        docs.sort_by(|a, b| a.item.path.cmp(&b.item.path));

        debug!(documents = docs.len(), "content store loaded");
        Ok(Self { docs })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    fn evaluate(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, RepoError> {
        let mut matches: Vec<&StoredDoc> = self
            .docs
            .iter()
            .filter(|doc| doc.section == query.section)
            .filter(|doc| query.filters.iter().all(|filter| matches_filter(doc, filter)))
            .collect();

        if let Some(sort) = &query.sort {
            if sort.field != ContentField::Date {
                return Err(RepoError::invalid_query(format!(
                    "unsupported sort field {:?}",
                    sort.field
                )));
            }
            match sort.order {
                SortOrder::Descending => {
                    matches.sort_by(|a, b| by_date_descending(&a.item, &b.item));
                }
                SortOrder::Ascending => {
                    matches.sort_by(|a, b| by_date_descending(&b.item, &a.item));
                }
            }
        }

        Ok(matches
            .into_iter()
            .map(|doc| match &query.projection {
                Some(fields) => doc.item.project(fields),
                None => doc.item.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl ContentRepo for TomlContentStore {
    async fn fetch_all(&self, query: &ContentQuery) -> Result<Vec<ContentItem>, RepoError> {
        self.evaluate(query)
    }

    async fn fetch_one(&self, query: &ContentQuery) -> Result<Option<ContentItem>, RepoError> {
        Ok(self.evaluate(query)?.into_iter().next())
    }
}

fn matches_filter(doc: &StoredDoc, filter: &FieldEquals) -> bool {
    match filter.field {
        QueryField::Dir => doc.dir.map(Category::as_str) == Some(filter.value.as_str()),
        QueryField::Slug => doc.item.slug.as_deref() == Some(filter.value.as_str()),
        QueryField::Category => doc.item.category.as_deref() == Some(filter.value.as_str()),
    }
}

fn load_section_dir(
    dir_path: &Path,
    section: Section,
    dir: Option<Category>,
    docs: &mut Vec<StoredDoc>,
) -> Result<(), InfraError> {
    if !dir_path.is_dir() {
        debug!(path = %dir_path.display(), "content directory absent, skipping");
        return Ok(());
    }

    for entry in fs::read_dir(dir_path).map_err(InfraError::Io)? {
        let entry = entry.map_err(InfraError::Io)?;
        let file_path = entry.path();
        if file_path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }

        let text = fs::read_to_string(&file_path).map_err(InfraError::Io)?;
        let raw: RawDoc = toml::from_str(&text).map_err(|err| {
            InfraError::content(format!(
                "failed to parse `{}`: {err}",
                file_path.display()
            ))
        })?;

        let slug = raw.slug.clone().or_else(|| {
            file_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
        });
        let Some(slug) = slug else {
            warn!(path = %file_path.display(), "document without derivable slug, skipping");
            continue;
        };

        let path = match dir {
            Some(dir) => format!("/{}/{}/{slug}", section.as_str(), dir.as_str()),
            None => format!("/{}/{slug}", section.as_str()),
        };

        let mut item = ContentItem::new(path);
        item.slug = Some(slug);
        item.title = raw.title;
        item.description = raw.description;
        item.date = raw.date.and_then(|date| parse_date(date, &file_path));
        item.category = raw
            .category
            .or_else(|| dir.map(|category| category.as_str().to_string()));
        item.image = raw.image;
        item.tags = raw.tags;
        for (key, value) in raw.extra {
            match serde_json::to_value(&value) {
                Ok(json) => {
                    item.extra.insert(key, json);
                }
                Err(err) => {
                    warn!(path = %file_path.display(), field = %key, error = %err,
                        "dropping extra field that does not convert to JSON");
                }
            }
        }

        docs.push(StoredDoc { section, dir, item });
    }

    Ok(())
}

fn parse_date(raw: RawDate, file_path: &Path) -> Option<Date> {
    let parsed = match raw {
        RawDate::Calendar(datetime) => datetime.date.and_then(|date| {
            let month = Month::try_from(date.month).ok()?;
            Date::from_calendar_date(i32::from(date.year), month, date.day).ok()
        }),
        RawDate::Text(text) => {
            let format = time::macros::format_description!("[year]-[month]-[day]");
            Date::parse(text.trim(), format).ok()
        }
    };

    if parsed.is_none() {
        warn!(path = %file_path.display(), "unparseable publish date, treating as absent");
    }
    parsed
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_doc(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("doc parent")).expect("create content dirs");
        let mut file = fs::File::create(&path).expect("create doc");
        file.write_all(body.as_bytes()).expect("write doc");
    }

    fn sample_store() -> (tempfile::TempDir, TomlContentStore) {
        let root = tempfile::tempdir().expect("tempdir");
        write_doc(
            root.path(),
            "cases/port-relocation.toml",
            r#"
title = "Port Relocation for a Furniture Brand"
date = 2024-03-01
tags = ["sea", "fcl"]
"#,
        );
        write_doc(
            root.path(),
            "insights/company/warehouse-expansion.toml",
            r#"
title = "Warehouse Expansion"
date = "2024-05-12"
image = "/images/warehouse.jpg"
readingTime = 4
"#,
        );
        write_doc(
            root.path(),
            "insights/knowledge/incoterms-primer.toml",
            r#"
title = "Incoterms Primer"
date = "not-a-date"
"#,
        );
        let store = TomlContentStore::load(root.path()).expect("load store");
        (root, store)
    }

    #[tokio::test]
    async fn loads_documents_and_derives_paths() {
        let (_root, store) = sample_store();
        assert_eq!(store.len(), 3);

        let cases = store
            .fetch_all(&ContentQuery::section(Section::Cases))
            .await
            .expect("fetch cases");
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].path, "/cases/port-relocation");
        assert_eq!(cases[0].slug.as_deref(), Some("port-relocation"));
        assert_eq!(cases[0].date, Some(time::macros::date!(2024 - 03 - 01)));
    }

    #[tokio::test]
    async fn dir_filter_and_category_default_apply() {
        let (_root, store) = sample_store();

        let company = store
            .fetch_all(
                &ContentQuery::section(Section::Insights).filter_dir(Category::Company),
            )
            .await
            .expect("fetch company insights");
        assert_eq!(company.len(), 1);
        assert_eq!(company[0].category.as_deref(), Some("company"));
        assert_eq!(
            company[0].extra.get("readingTime"),
            Some(&serde_json::json!(4))
        );
    }

    #[tokio::test]
    async fn unparseable_date_is_surfaced_as_absent() {
        let (_root, store) = sample_store();

        let item = store
            .fetch_one(
                &ContentQuery::section(Section::Insights)
                    .filter_equals(QueryField::Slug, "incoterms-primer"),
            )
            .await
            .expect("fetch insight")
            .expect("insight present");
        assert!(item.date.is_none());
    }

    #[tokio::test]
    async fn slug_field_overrides_the_filename() {
        let root = tempfile::tempdir().expect("tempdir");
        write_doc(
            root.path(),
            "cases/file-name.toml",
            r#"
title = "Renamed"
slug = "authored-slug"
"#,
        );
        let store = TomlContentStore::load(root.path()).expect("load store");

        let item = store
            .fetch_one(
                &ContentQuery::section(Section::Cases)
                    .filter_equals(QueryField::Slug, "authored-slug"),
            )
            .await
            .expect("fetch case")
            .expect("case present");
        assert_eq!(item.path, "/cases/authored-slug");
    }

    #[tokio::test]
    async fn unsupported_sort_field_is_rejected() {
        let (_root, store) = sample_store();
        let result = store
            .fetch_all(
                &ContentQuery::section(Section::Cases)
                    .sort_by(ContentField::Title, SortOrder::Ascending),
            )
            .await;
        assert!(matches!(result, Err(RepoError::InvalidQuery { .. })));
    }
}
