use crate::rect::{OverlapVerdict, Rectangle};
use crate::relation::{RelationMode, RelationOutcome, RelationParams};
use crate::utils::{CommaSeparatedVec, blank_as_none};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ========================
// API Request and Response Models
// ========================

/// Request body for the /api/parse endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ParseRequest {
    pub raw: String,
}

/// Request body for the /api/reproject endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReprojectRequest {
    pub lon: f64,
    pub lat: f64,
}

/// Request body for the /api/relationship endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelationshipRequest {
    pub query: Rectangle,
    pub candidate: Rectangle,
    pub mode: RelationMode,
    #[serde(default)]
    pub params: RelationParams,
}

#[derive(Debug, Serialize)]
pub struct RelationshipResponse {
    pub mode: RelationMode,
    pub result: RelationOutcome,
    pub verdict: OverlapVerdict,
}

/// Query string of the /api/areas/search endpoint.
///
/// Form fields arrive as strings and may be blank, so numbers go through
/// [`blank_as_none`].
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    pub bottom_left: Option<String>,
    pub top_right: Option<String>,
    #[serde(default)]
    pub modes: CommaSeparatedVec<RelationMode>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size_percentage: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub overlap_percentage: Option<f64>,
    /// Project uuid prefix.
    pub uuid: Option<String>,
    #[serde(default)]
    pub user_name: CommaSeparatedVec<String>,
    /// A paper size prefix, or `custom` together with both custom dimensions.
    pub paper_size: Option<String>,
    pub custom_height: Option<String>,
    pub custom_width: Option<String>,
    pub scale: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AreaHit {
    pub area_id: u64,
    pub project_id: String,
    pub project_name: String,
    pub user_name: String,
    pub date: NaiveDate,
    pub paper_size: String,
    pub file_location: String,
    #[serde(flatten)]
    pub bounds: Rectangle,
    pub scale: String,
    /// Share of the area covered by the query box, only for spatial searches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlap_pct: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current_page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub areas: Vec<AreaHit>,
    pub pagination: Pagination,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Rectangle>,
}

/// Query string of the /api/projects endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectListRequest {
    pub uuid_filter: Option<String>,
    pub project_name_filter: Option<String>,
    pub user_name_filter: Option<String>,
    pub date_filter: Option<String>,
    pub date_from_filter: Option<String>,
    pub date_to_filter: Option<String>,
    pub file_location_filter: Option<String>,
    pub paper_size_filter: Option<String>,
    pub associated_scales_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub uuid: String,
    pub project_name: String,
    pub user_name: String,
    pub date: NaiveDate,
    pub paper_size: String,
    pub file_location: String,
    pub area_count: usize,
    /// Distinct area scales in catalog order.
    pub associated_scales: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectListResponse {
    pub projects: Vec<ProjectSummary>,
    pub pagination: Pagination,
}

/// Query string of the /api/areas endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct AreaListRequest {
    pub id_filter: Option<String>,
    pub project_id_filter: Option<String>,
    pub xmin_filter: Option<String>,
    pub ymin_filter: Option<String>,
    pub xmax_filter: Option<String>,
    pub ymax_filter: Option<String>,
    pub scale_filter: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<usize>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub per_page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AreaListResponse {
    pub areas: Vec<AreaHit>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct UserNamesResponse {
    pub user_names: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl std::fmt::Display) -> Self {
        ErrorResponse {
            error: error.to_string(),
        }
    }
}
