/// Data models for posting-service
///
/// `*Row` types mirror database rows; the public types are the JSON shapes
/// returned to clients, with timestamps normalized to RFC 3339 strings.
use crate::error::AppError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Post row as stored
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct PostRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Post joined with its owner and like aggregates
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct FeedRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub image_url: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_cnt: i64,
    pub is_liked: bool,
}

/// Post to be inserted during ingestion
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub content: String,
}

/// Label returned by the detector, confidence on a 0..100 scale
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub name: String,
    pub confidence: f32,
}

impl DetectedLabel {
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub content: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            post_id: row.id,
            user_id: row.user_id,
            image_url: row.image_url,
            content: row.content,
            created_at: format_timestamp(&row.created_at),
            updated_at: row.updated_at.as_ref().map(format_timestamp),
        }
    }
}

/// Followed-feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub image_url: String,
    pub content: String,
    pub created_at: String,
    pub like_cnt: i64,
    /// 1 when the viewer liked the post, else 0
    pub is_liked: i32,
}

impl From<FeedRow> for FeedItem {
    fn from(row: FeedRow) -> Self {
        Self {
            post_id: row.id,
            user_id: row.user_id,
            email: row.email,
            image_url: row.image_url,
            content: row.content,
            created_at: format_timestamp(&row.created_at),
            like_cnt: row.like_cnt,
            is_liked: i32::from(row.is_liked),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub image_url: String,
    pub content: String,
    pub created_at: String,
    pub like_cnt: i64,
    pub is_liked: i32,
    /// Display tags, e.g. `#cat`
    pub tags: Vec<String>,
}

impl PostDetail {
    pub fn from_parts(row: FeedRow, tag_names: Vec<String>) -> Self {
        let item = FeedItem::from(row);
        Self {
            post_id: item.post_id,
            user_id: item.user_id,
            email: item.email,
            image_url: item.image_url,
            content: item.content,
            created_at: item.created_at,
            like_cnt: item.like_cnt,
            is_liked: item.is_liked,
            tags: tag_names.into_iter().map(|name| format!("#{}", name)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub offset: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: PageRequest) -> Self {
        Self {
            count: items.len(),
            items,
            offset: page.offset,
            limit: page.limit,
        }
    }
}

/// Validated pagination window `[offset, offset + limit)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(offset: i64, limit: i64) -> Result<Self, AppError> {
        if offset < 0 {
            return Err(AppError::Validation(format!(
                "offset must be non-negative, got {}",
                offset
            )));
        }
        if limit < 0 {
            return Err(AppError::Validation(format!(
                "limit must be non-negative, got {}",
                limit
            )));
        }
        if limit > MAX_PAGE_LIMIT {
            return Err(AppError::Validation(format!(
                "limit must not exceed {}, got {}",
                MAX_PAGE_LIMIT, limit
            )));
        }
        Ok(Self { offset, limit })
    }

    /// Parse raw query-string values; absent values take the defaults
    pub fn parse(offset: Option<&str>, limit: Option<&str>) -> Result<Self, AppError> {
        let offset = match offset {
            Some(raw) => parse_integer("offset", raw)?,
            None => 0,
        };
        let limit = match limit {
            Some(raw) => parse_integer("limit", raw)?,
            None => DEFAULT_PAGE_LIMIT,
        };
        Self::new(offset, limit)
    }
}

fn parse_integer(name: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::Validation(format!("{} must be an integer, got '{}'", name, raw)))
}

/// Canonical timestamp rendering: RFC 3339, UTC, millisecond precision
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
