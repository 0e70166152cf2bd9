use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tile_layout::{Dimensions, LayoutMode, Row};
use utoipa::{IntoParams, ToSchema};

use crate::error::{AppError, Result};

/// Kind of uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }
}

/// Media database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Media {
    pub id: i32,
    pub s3_key: String,
    pub section_id: Option<i32>,
    pub tags: Option<Vec<String>>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub media_type: String,
    pub width: i32,
    pub height: i32,
    pub uploaded_by: Option<i32>,
    pub uploaded_at: DateTime<Utc>,
}

impl Media {
    pub fn get_type(&self) -> MediaType {
        MediaType::parse(&self.media_type).unwrap_or(MediaType::Image)
    }
}

/// Media as returned to gallery clients, with its public URL
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MediaItem {
    pub id: i32,
    pub s3_key: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub width: i32,
    pub height: i32,
    pub tags: Option<Vec<String>>,
    pub uploaded_at: DateTime<Utc>,
    pub url: String,
}

impl MediaItem {
    pub fn from_media(media: Media, url: String) -> Self {
        Self {
            media_type: media.get_type(),
            id: media.id,
            s3_key: media.s3_key,
            width: media.width,
            height: media.height,
            tags: media.tags,
            uploaded_at: media.uploaded_at,
            url,
        }
    }
}

impl Dimensions for MediaItem {
    fn width(&self) -> f64 {
        f64::from(self.width)
    }

    fn height(&self) -> f64 {
        f64::from(self.height)
    }
}

// ========================================
// Listing / filtering
// ========================================

/// Column a section listing may be sorted by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Id,
    Type,
    Width,
    Height,
    UploadedAt,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Self::Id),
            "type" => Some(Self::Type),
            "width" => Some(Self::Width),
            "height" => Some(Self::Height),
            "uploaded_at" => Some(Self::UploadedAt),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Type => "type",
            Self::Width => "width",
            Self::Height => "height",
            Self::UploadedAt => "uploaded_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
    #[default]
    Random,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            "random" => Some(Self::Random),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MediaQuery {
    pub section_path: Option<String>,
    /// One of `id`, `type`, `width`, `height`, `uploaded_at`
    pub sort_by: Option<String>,
    /// One of `asc`, `desc`, `random`
    pub order: Option<String>,
    pub file_type: Option<String>,
    /// Comma separated; matches media carrying any of them
    pub tags: Option<String>,
}

/// Validated form of [`MediaQuery`]
#[derive(Debug, Clone, PartialEq)]
pub struct MediaFilter {
    pub section_path: String,
    pub sort: SortField,
    pub order: SortOrder,
    pub file_type: Option<String>,
    pub tags: Vec<String>,
}

impl MediaFilter {
    pub fn from_query(query: &MediaQuery) -> Result<Self> {
        // stored paths carry no surrounding slashes
        let section_path = non_blank(
            query
                .section_path
                .as_deref()
                .map(|p| p.trim().trim_matches('/')),
        )
        .ok_or_else(|| AppError::BadRequest("sectionPath is required".to_string()))?;

        let sort = match non_blank(query.sort_by.as_deref()) {
            Some(raw) => SortField::parse(&raw),
            None => Some(SortField::default()),
        };
        let order = match non_blank(query.order.as_deref()) {
            Some(raw) => SortOrder::parse(&raw),
            None => Some(SortOrder::default()),
        };
        let (Some(sort), Some(order)) = (sort, order) else {
            return Err(AppError::BadRequest("Invalid sorting parameters".to_string()));
        };

        Ok(Self {
            section_path,
            sort,
            order,
            file_type: non_blank(query.file_type.as_deref()),
            tags: split_tags(query.tags.as_deref()),
        })
    }

    /// Deterministic id ordering, used when the result feeds a layout.
    pub fn in_id_order(mut self) -> Self {
        self.sort = SortField::Id;
        self.order = SortOrder::Asc;
        self
    }

    pub fn order_clause(&self) -> String {
        match self.order {
            SortOrder::Random => "RANDOM()".to_string(),
            SortOrder::Asc => format!("{} ASC", self.sort.column()),
            SortOrder::Desc => format!("{} DESC", self.sort.column()),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn split_tags(raw: Option<&str>) -> Vec<String> {
    raw.map(|tags| {
        tags.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

// ========================================
// Upload flow
// ========================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileToSign {
    pub file_name: String,
    pub file_type: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    #[serde(default)]
    pub files: Vec<FileToSign>,
    pub section_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub file_name: String,
    pub url: String,
    pub key: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PresignResponse {
    pub urls: Vec<PresignedUpload>,
}

/// Metadata for one object that was uploaded through a pre-signed URL
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewMedia {
    pub s3_key: String,
    #[serde(rename = "sectionPath")]
    pub section_path: Option<String>,
    pub tags: Option<Vec<String>>,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub width: i32,
    pub height: i32,
    pub uploaded_by: Option<i32>,
}

impl NewMedia {
    /// Trimmed tags, `None` when nothing is left.
    pub fn normalized_tags(&self) -> Option<Vec<String>> {
        let tags: Vec<String> = self
            .tags
            .iter()
            .flatten()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        (!tags.is_empty()).then_some(tags)
    }

    pub fn validate(&self) -> Result<()> {
        if self.s3_key.trim().is_empty() {
            return Err(AppError::BadRequest("s3_key is required".to_string()));
        }
        if self.width <= 0 || self.height <= 0 {
            return Err(AppError::BadRequest(format!(
                "Invalid dimensions for {}",
                self.s3_key
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveMediaRequest {
    #[serde(default)]
    pub media: Vec<NewMedia>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteMediaRequest {
    #[serde(default)]
    pub ids: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteMediaResponse {
    pub message: String,
    pub deleted: u64,
}

// ========================================
// Layout
// ========================================

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LayoutQuery {
    pub section_path: Option<String>,
    pub container_width: Option<f64>,
    /// `justified` (default) or `cropped`
    #[param(value_type = Option<String>)]
    pub mode: Option<LayoutMode>,
    pub target_row_height: Option<f64>,
    pub file_type: Option<String>,
    pub tags: Option<String>,
}

impl LayoutQuery {
    pub fn media_filter(&self) -> Result<MediaFilter> {
        let query = MediaQuery {
            section_path: self.section_path.clone(),
            file_type: self.file_type.clone(),
            tags: self.tags.clone(),
            ..MediaQuery::default()
        };
        Ok(MediaFilter::from_query(&query)?.in_id_order())
    }
}

#[derive(Debug, Serialize)]
pub struct LayoutResponse<'a> {
    pub mode: LayoutMode,
    pub container_width: f64,
    pub rows: Vec<Row<'a, MediaItem>>,
}
