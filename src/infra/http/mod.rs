//! Public HTTP surface.
//!
//! Content endpoints build one `ContentCache` per request and resolve the
//! article, its neighbors, and the related picks through that single scope,
//! so every memoization guarantee holds within one response.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::application::content_cache::{
    ContentCache, DEFAULT_RELATED_LIMIT, Neighbors, RecencyJitter,
};
use crate::application::error::AppError;
use crate::application::repos::ContentRepo;
use crate::application::sitemap::{SitemapService, paginate};
use crate::domain::content::{Category, ContentItem, Section};
use crate::domain::services::{SERVICE_CATALOG, ServiceItem, find_service};

#[derive(Clone)]
pub struct HttpState {
    pub content: Arc<dyn ContentRepo>,
    pub jitter: Arc<dyn RecencyJitter>,
    pub sitemap: Arc<SitemapService>,
    pub page_size: usize,
}

impl HttpState {
    /// A fresh cache scope for one request.
    fn content_cache(&self) -> ContentCache {
        ContentCache::new(self.content.clone(), self.jitter.clone())
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/api/cases", get(list_cases))
        .route("/api/cases/{slug}", get(case_detail))
        .route("/api/insights", get(list_insights))
        .route("/api/insights/{slug}", get(insight_detail))
        .route("/api/services", get(list_services))
        .route("/api/services/{slug}", get(service_detail))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/robots.txt", get(robots_txt))
        .route("/_health", get(health))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InsightsQuery {
    category: Option<String>,
    page: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ArticleDetail {
    article: ContentItem,
    neighbors: Neighbors,
    related: Vec<ContentItem>,
}

#[derive(Debug, Serialize)]
struct InsightsPage {
    items: Vec<ContentItem>,
    page: usize,
    page_count: usize,
    total: usize,
}

async fn list_cases(State(state): State<HttpState>) -> Result<Response, AppError> {
    let cache = state.content_cache();
    let list = cache.fetch_list(Section::Cases, None, None).await?;
    Ok(Json(&*list).into_response())
}

async fn case_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
) -> Result<Json<ArticleDetail>, AppError> {
    let cache = state.content_cache();
    article_detail(&cache, Section::Cases, &slug, None).await.map(Json)
}

async fn list_insights(
    State(state): State<HttpState>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<InsightsPage>, AppError> {
    let dir = parse_category(query.category.as_deref())?;
    let page = query.page.unwrap_or(1);

    let cache = state.content_cache();
    let list = cache.fetch_list(Section::Insights, dir, None).await?;
    let items = paginate(&list, page, state.page_size).to_vec();

    Ok(Json(InsightsPage {
        items,
        page,
        page_count: list.len().div_ceil(state.page_size.max(1)),
        total: list.len(),
    }))
}

async fn insight_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(query): Query<InsightsQuery>,
) -> Result<Json<ArticleDetail>, AppError> {
    let dir = parse_category(query.category.as_deref())?;
    let cache = state.content_cache();
    article_detail(&cache, Section::Insights, &slug, dir).await.map(Json)
}

async fn list_services() -> Json<&'static [ServiceItem]> {
    Json(SERVICE_CATALOG)
}

async fn service_detail(Path(slug): Path<String>) -> Result<Json<&'static ServiceItem>, AppError> {
    find_service(&slug).map(Json).ok_or(AppError::NotFound)
}

async fn sitemap_xml(State(state): State<HttpState>) -> Result<Response, AppError> {
    let xml = state.sitemap.sitemap_xml().await?;
    Ok(([(CONTENT_TYPE, "application/xml")], xml).into_response())
}

async fn robots_txt(State(state): State<HttpState>) -> Response {
    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.sitemap.robots_txt(),
    )
        .into_response()
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// Shared article-page assembly: the article itself, its chronological
/// neighbors, and the related picks, all through one cache scope.
async fn article_detail(
    cache: &ContentCache,
    section: Section,
    slug: &str,
    dir: Option<Category>,
) -> Result<ArticleDetail, AppError> {
    let Some(article) = cache.fetch_article(section, slug, dir).await? else {
        return Err(AppError::NotFound);
    };

    let neighbors = cache.fetch_prev_next(section, &article.path, dir).await?;
    let related = cache
        .fetch_related(&article.path, section, dir, DEFAULT_RELATED_LIMIT)
        .await?;

    Ok(ArticleDetail {
        article,
        neighbors,
        related: (*related).clone(),
    })
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, AppError> {
    match raw {
        None | Some("") => Ok(None),
        Some(value) => Ok(Some(Category::try_from(value)?)),
    }
}
