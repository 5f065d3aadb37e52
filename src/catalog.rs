//! Read-only snapshot of projects and their map areas.
//!
//! The snapshot is loaded once from a JSON export at startup. Searching runs
//! the spatial filter and the attribute filters over every area and returns
//! one page of hits. The listings page through projects or areas with simple
//! per-column filters.

use crate::models::{
    AreaHit, AreaListRequest, AreaListResponse, Pagination, ProjectListRequest,
    ProjectListResponse, ProjectSummary, SearchRequest, SearchResponse,
};
use crate::parser::{CoordinateParser, ParseError};
use crate::rect::{self, Rectangle, ValidationError};
use crate::relation::SpatialFilter;
use anyhow::{Context as AnyhowContext, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_PER_PAGE: usize = 10;
pub const MAX_PER_PAGE: usize = 100;
pub const DEFAULT_SIZE_PERCENTAGE: f64 = 10.0;
pub const DEFAULT_OVERLAP_PERCENTAGE: f64 = 50.0;

/// Accepted spellings of a search date.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%y", "%Y-%m-%d"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: u64,
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(default)]
    pub scale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub uuid: String,
    pub project_name: String,
    pub user_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub paper_size: String,
    #[serde(default)]
    pub file_location: String,
    #[serde(default)]
    pub areas: Vec<Area>,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Both bottom left and top right are required for a spatial search")]
    IncompleteBox,
    #[error("Bottom left: {0}")]
    BottomLeft(#[source] ParseError),
    #[error("Top right: {0}")]
    TopRight(#[source] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid date '{0}'. Use DD/MM/YYYY")]
    InvalidDate(String),
    #[error("Please enter both height and width for custom size")]
    MissingCustomSize,
    #[error("Custom height and width must be valid numbers")]
    InvalidCustomSize,
}

/// Paper size value stored for a custom sheet, in centimeters.
pub fn custom_paper_size(height_cm: f64, width_cm: f64) -> String {
    format!("Custom Size: Height: {height_cm:?} cm, Width: {width_cm:?} cm")
}

/// Clamps `per_page` and `page` and cuts one page out of `items`. A page past
/// the end becomes the last page; an empty list reports page 1 of 0.
fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> (Vec<T>, Pagination) {
    let per_page = per_page.clamp(1, MAX_PER_PAGE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let current_page = page.clamp(1, total_pages.max(1));
    let page_items = items
        .into_iter()
        .skip((current_page - 1) * per_page)
        .take(per_page)
        .collect();
    (
        page_items,
        Pagination {
            current_page,
            per_page,
            total_pages,
            total_items,
        },
    )
}

struct IndexedArea {
    project: usize,
    area: Area,
    bounds: Rectangle,
}

pub struct Catalog {
    projects: Vec<Project>,
    areas: Vec<IndexedArea>,
}

impl Catalog {
    /// Indexes every area of `projects`. Areas with invalid bounds are
    /// skipped with a warning.
    pub fn new(projects: Vec<Project>) -> Self {
        let mut areas = Vec::new();
        for (index, project) in projects.iter().enumerate() {
            for area in &project.areas {
                match Rectangle::new(area.xmin, area.ymin, area.xmax, area.ymax) {
                    Ok(bounds) => areas.push(IndexedArea {
                        project: index,
                        area: area.clone(),
                        bounds,
                    }),
                    Err(err) => warn!(
                        "Skipping area {} of project {}: {err}",
                        area.id, project.uuid
                    ),
                }
            }
        }
        Catalog { projects, areas }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {path:?}"))?;
        let projects: Vec<Project> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog file {path:?}"))?;
        let catalog = Self::new(projects);
        info!(
            "Loaded {} projects with {} areas from {path:?}",
            catalog.num_projects(),
            catalog.num_areas()
        );
        Ok(catalog)
    }

    pub fn num_projects(&self) -> usize {
        self.projects.len()
    }

    pub fn num_areas(&self) -> usize {
        self.areas.len()
    }

    /// Exact, case-sensitive lookup.
    pub fn project(&self, uuid: &str) -> Option<&Project> {
        self.projects.iter().find(|project| project.uuid == uuid)
    }

    /// Distinct user names, sorted.
    pub fn user_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .projects
            .iter()
            .map(|project| project.user_name.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    fn hit(&self, indexed: &IndexedArea, overlap_pct: Option<f64>) -> AreaHit {
        let project = &self.projects[indexed.project];
        AreaHit {
            area_id: indexed.area.id,
            project_id: project.uuid.clone(),
            project_name: project.project_name.clone(),
            user_name: project.user_name.clone(),
            date: project.date,
            paper_size: project.paper_size.clone(),
            file_location: project.file_location.clone(),
            bounds: indexed.bounds,
            scale: indexed.area.scale.clone(),
            overlap_pct,
        }
    }

    pub fn search(&self, criteria: &SearchCriteria, page: usize, per_page: usize) -> SearchResponse {
        let matching: Vec<&IndexedArea> = self
            .areas
            .iter()
            .filter(|indexed| criteria.matches(&self.projects[indexed.project], indexed))
            .collect();
        let (matching, pagination) = paginate(matching, page, per_page);

        let areas = matching
            .into_iter()
            .map(|indexed| {
                let overlap_pct = criteria
                    .spatial
                    .as_ref()
                    .map(|filter| rect::overlap_percentage(&indexed.bounds, filter.query()));
                self.hit(indexed, overlap_pct)
            })
            .collect();

        SearchResponse {
            areas,
            pagination,
            query: criteria.spatial.as_ref().map(|filter| *filter.query()),
        }
    }

    pub fn list_projects(
        &self,
        filters: &ProjectFilters,
        page: usize,
        per_page: usize,
    ) -> ProjectListResponse {
        let matching: Vec<ProjectSummary> = self
            .projects
            .iter()
            .map(ProjectSummary::from)
            .filter(|summary| filters.matches(summary))
            .collect();
        let (projects, pagination) = paginate(matching, page, per_page);
        ProjectListResponse {
            projects,
            pagination,
        }
    }

    pub fn list_areas(&self, filters: &AreaFilters, page: usize, per_page: usize) -> AreaListResponse {
        let matching: Vec<&IndexedArea> = self
            .areas
            .iter()
            .filter(|indexed| filters.matches(&self.projects[indexed.project], indexed))
            .collect();
        let (matching, pagination) = paginate(matching, page, per_page);
        AreaListResponse {
            areas: matching
                .into_iter()
                .map(|indexed| self.hit(indexed, None))
                .collect(),
            pagination,
        }
    }
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        let mut associated_scales: Vec<String> = Vec::new();
        for area in &project.areas {
            if !area.scale.is_empty() && !associated_scales.contains(&area.scale) {
                associated_scales.push(area.scale.clone());
            }
        }
        ProjectSummary {
            uuid: project.uuid.clone(),
            project_name: project.project_name.clone(),
            user_name: project.user_name.clone(),
            date: project.date,
            paper_size: project.paper_size.clone(),
            file_location: project.file_location.clone(),
            area_count: project.areas.len(),
            associated_scales,
        }
    }
}

/// Validated search filters. Every present filter must match.
#[derive(Debug, Default)]
pub struct SearchCriteria {
    pub spatial: Option<SpatialFilter>,
    /// Project uuid prefix.
    pub uuid: Option<String>,
    /// Any of these user name prefixes.
    pub user_names: Vec<String>,
    pub paper_size: Option<String>,
    pub scale: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

fn parse_date(s: &str) -> Result<NaiveDate, SearchError> {
    let trimmed = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| SearchError::InvalidDate(s.to_string()))
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A blank filter passes everything; one that does not parse as `T` passes
/// nothing.
fn exactly<T: FromStr + PartialEq>(filter: Option<&str>, value: T) -> bool {
    filter.is_none_or(|wanted| wanted.parse::<T>().is_ok_and(|wanted| wanted == value))
}

/// Resolves the paper size filter. `custom` stands for the stored spelling of
/// a custom sheet and needs both dimensions.
fn paper_size_filter(request: &SearchRequest) -> Result<Option<String>, SearchError> {
    let Some(paper_size) = non_blank(&request.paper_size) else {
        return Ok(None);
    };
    if !paper_size.eq_ignore_ascii_case("custom") {
        return Ok(Some(paper_size.to_string()));
    }
    match (non_blank(&request.custom_height), non_blank(&request.custom_width)) {
        (Some(height), Some(width)) => match (height.parse::<f64>(), width.parse::<f64>()) {
            (Ok(height), Ok(width)) if height.is_finite() && width.is_finite() => {
                Ok(Some(custom_paper_size(height, width)))
            }
            _ => Err(SearchError::InvalidCustomSize),
        },
        _ => Err(SearchError::MissingCustomSize),
    }
}

/// Scales compare as numbers when both sides are numeric, so "1000" and
/// "1000.0" are the same scale.
fn same_scale(stored: &str, wanted: &str) -> bool {
    match (stored.trim().parse::<f64>(), wanted.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => stored.trim().eq_ignore_ascii_case(wanted.trim()),
    }
}

impl SearchCriteria {
    pub fn from_request(
        request: &SearchRequest,
        parser: &CoordinateParser,
    ) -> Result<Self, SearchError> {
        let spatial = match (non_blank(&request.bottom_left), non_blank(&request.top_right)) {
            (None, None) => None,
            (Some(bottom_left), Some(top_right)) => {
                let bl = parser.parse(bottom_left).map_err(SearchError::BottomLeft)?;
                let tr = parser.parse(top_right).map_err(SearchError::TopRight)?;
                let query = Rectangle::from_corners(bl, tr)?;
                Some(SpatialFilter::new(
                    query,
                    &request.modes.0,
                    request.size_percentage.unwrap_or(DEFAULT_SIZE_PERCENTAGE),
                    request
                        .overlap_percentage
                        .unwrap_or(DEFAULT_OVERLAP_PERCENTAGE),
                )?)
            }
            _ => return Err(SearchError::IncompleteBox),
        };

        Ok(SearchCriteria {
            spatial,
            uuid: non_blank(&request.uuid).map(str::to_string),
            user_names: request
                .user_name
                .0
                .iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            paper_size: paper_size_filter(request)?,
            scale: non_blank(&request.scale).map(str::to_string),
            date_from: non_blank(&request.date_from).map(parse_date).transpose()?,
            date_to: non_blank(&request.date_to).map(parse_date).transpose()?,
        })
    }

    fn matches(&self, project: &Project, indexed: &IndexedArea) -> bool {
        if let Some(filter) = &self.spatial {
            if !filter.matches(&indexed.bounds) {
                return false;
            }
        }
        if let Some(uuid) = &self.uuid {
            if !starts_with_ignore_case(&project.uuid, uuid) {
                return false;
            }
        }
        if !self.user_names.is_empty()
            && !self
                .user_names
                .iter()
                .any(|name| starts_with_ignore_case(&project.user_name, name))
        {
            return false;
        }
        if let Some(paper_size) = &self.paper_size {
            if !starts_with_ignore_case(&project.paper_size, paper_size) {
                return false;
            }
        }
        if let Some(scale) = &self.scale {
            if !same_scale(&indexed.area.scale, scale) {
                return false;
            }
        }
        if self.date_from.is_some_and(|from| project.date < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| project.date > to) {
            return false;
        }
        true
    }
}

/// Column filters of the project listing. Text filters are case-insensitive
/// prefixes; `associated_scales` is a substring of the comma-joined scales.
#[derive(Debug, Default)]
pub struct ProjectFilters {
    pub uuid: Option<String>,
    pub project_name: Option<String>,
    pub user_name: Option<String>,
    /// Prefix of the ISO date, so `2023-04` selects a month.
    pub date: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub file_location: Option<String>,
    pub paper_size: Option<String>,
    pub associated_scales: Option<String>,
}

impl ProjectFilters {
    pub fn from_request(request: &ProjectListRequest) -> Result<Self, SearchError> {
        let text = |s: &Option<String>| non_blank(s).map(str::to_string);
        Ok(ProjectFilters {
            uuid: text(&request.uuid_filter),
            project_name: text(&request.project_name_filter),
            user_name: text(&request.user_name_filter),
            date: text(&request.date_filter),
            date_from: non_blank(&request.date_from_filter)
                .map(parse_date)
                .transpose()?,
            date_to: non_blank(&request.date_to_filter)
                .map(parse_date)
                .transpose()?,
            file_location: text(&request.file_location_filter),
            paper_size: text(&request.paper_size_filter),
            associated_scales: text(&request.associated_scales_filter),
        })
    }

    fn matches(&self, summary: &ProjectSummary) -> bool {
        let prefix = |filter: &Option<String>, value: &str| {
            filter
                .as_deref()
                .is_none_or(|wanted| starts_with_ignore_case(value, wanted))
        };
        prefix(&self.uuid, &summary.uuid)
            && prefix(&self.project_name, &summary.project_name)
            && prefix(&self.user_name, &summary.user_name)
            && prefix(&self.date, &summary.date.format("%Y-%m-%d").to_string())
            && prefix(&self.file_location, &summary.file_location)
            && prefix(&self.paper_size, &summary.paper_size)
            && self.date_from.is_none_or(|from| summary.date >= from)
            && self.date_to.is_none_or(|to| summary.date <= to)
            && self.associated_scales.as_deref().is_none_or(|wanted| {
                contains_ignore_case(&summary.associated_scales.join(","), wanted)
            })
    }
}

/// Column filters of the area listing. Ids and bounds must be equal; the
/// project id is a case-insensitive substring. A numeric scale compares as a
/// number, anything else as a substring.
#[derive(Debug, Default)]
pub struct AreaFilters {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub xmin: Option<String>,
    pub ymin: Option<String>,
    pub xmax: Option<String>,
    pub ymax: Option<String>,
    pub scale: Option<String>,
}

impl AreaFilters {
    pub fn from_request(request: &AreaListRequest) -> Self {
        let text = |s: &Option<String>| non_blank(s).map(str::to_string);
        AreaFilters {
            id: text(&request.id_filter),
            project_id: text(&request.project_id_filter),
            xmin: text(&request.xmin_filter),
            ymin: text(&request.ymin_filter),
            xmax: text(&request.xmax_filter),
            ymax: text(&request.ymax_filter),
            scale: text(&request.scale_filter),
        }
    }

    fn matches(&self, project: &Project, indexed: &IndexedArea) -> bool {
        let bounds = &indexed.bounds;
        exactly(self.id.as_deref(), indexed.area.id)
            && self
                .project_id
                .as_deref()
                .is_none_or(|wanted| contains_ignore_case(&project.uuid, wanted))
            && exactly(self.xmin.as_deref(), bounds.xmin())
            && exactly(self.ymin.as_deref(), bounds.ymin())
            && exactly(self.xmax.as_deref(), bounds.xmax())
            && exactly(self.ymax.as_deref(), bounds.ymax())
            && self.scale.as_deref().is_none_or(|wanted| {
                if wanted.parse::<f64>().is_ok() {
                    same_scale(&indexed.area.scale, wanted)
                } else {
                    contains_ignore_case(&indexed.area.scale, wanted)
                }
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::relation::RelationMode;
    use crate::utils::CommaSeparatedVec;

    pub(crate) const SAMPLE: &str = r#"[
        {
            "uuid": "a1",
            "project_name": "Harbour survey",
            "user_name": "dana",
            "date": "2023-04-12",
            "paper_size": "A1 (594 x 841 mm)",
            "file_location": "projects/a1",
            "areas": [
                {"id": 1, "xmin": 700000, "ymin": 3500000, "xmax": 700010, "ymax": 3500010, "scale": "1000"},
                {"id": 2, "xmin": 700005, "ymin": 3500005, "xmax": 700015, "ymax": 3500015, "scale": "2500"}
            ]
        },
        {
            "uuid": "b2",
            "project_name": "Ridge line",
            "user_name": "Lior",
            "date": "2024-01-30",
            "paper_size": "A3 (297 x 420 mm)",
            "file_location": "projects/b2",
            "areas": [
                {"id": 3, "xmin": 700100, "ymin": 3500100, "xmax": 700110, "ymax": 3500110, "scale": "1000.0"},
                {"id": 4, "xmin": 700050, "ymin": 3500050, "xmax": 700040, "ymax": 3500060, "scale": "500"}
            ]
        }
    ]"#;

    fn catalog() -> Catalog {
        Catalog::new(serde_json::from_str(SAMPLE).unwrap())
    }

    fn request() -> SearchRequest {
        SearchRequest::default()
    }

    fn ids(response: &SearchResponse) -> Vec<u64> {
        ids_of(&response.areas)
    }

    fn ids_of(hits: &[AreaHit]) -> Vec<u64> {
        hits.iter().map(|hit| hit.area_id).collect()
    }

    fn search(request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let criteria = SearchCriteria::from_request(request, &CoordinateParser::default())?;
        Ok(catalog().search(&criteria, 1, DEFAULT_PER_PAGE))
    }

    #[test]
    fn test_invalid_areas_are_skipped() {
        let catalog = catalog();
        assert_eq!(catalog.num_projects(), 2);
        assert_eq!(catalog.num_areas(), 3);
    }

    #[test]
    fn test_no_filters_returns_everything() {
        let response = search(&request()).unwrap();
        assert_eq!(ids(&response), vec![1, 2, 3]);
        assert!(response.query.is_none());
        assert!(response.areas.iter().all(|hit| hit.overlap_pct.is_none()));
    }

    #[test]
    fn test_spatial_overlap_default() {
        let response = search(&SearchRequest {
            bottom_left: Some("700000/3500000".to_string()),
            top_right: Some("700010/3500010".to_string()),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&response), vec![1, 2]);
        assert_eq!(response.areas[0].overlap_pct, Some(100.0));
        assert_eq!(response.areas[1].overlap_pct, Some(25.0));
    }

    #[test]
    fn test_spatial_contains_mode() {
        let response = search(&SearchRequest {
            bottom_left: Some("700000,3500000".to_string()),
            top_right: Some("700012,3500012".to_string()),
            modes: CommaSeparatedVec(vec![RelationMode::Contains]),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&response), vec![1]);
    }

    #[test]
    fn test_spatial_errors() {
        let err = search(&SearchRequest {
            bottom_left: Some("700000/3500000".to_string()),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, SearchError::IncompleteBox));

        let err = search(&SearchRequest {
            bottom_left: Some("700010/3500010".to_string()),
            top_right: Some("700000/3500000".to_string()),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Validation(ValidationError::InvertedBounds { .. })
        ));

        let err = search(&SearchRequest {
            bottom_left: Some("nowhere".to_string()),
            top_right: Some("700000/3500000".to_string()),
            ..request()
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("Bottom left: "));

        let err = search(&SearchRequest {
            bottom_left: Some("700000/3500000".to_string()),
            top_right: Some("700010/3500010".to_string()),
            modes: CommaSeparatedVec(vec![RelationMode::RelativeSize]),
            size_percentage: Some(1500.0),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SearchError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_attribute_filters() {
        let by_user = search(&SearchRequest {
            user_name: CommaSeparatedVec(vec!["li".to_string()]),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&by_user), vec![3]);

        let by_paper = search(&SearchRequest {
            paper_size: Some("a1".to_string()),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&by_paper), vec![1, 2]);

        let by_scale = search(&SearchRequest {
            scale: Some("1000".to_string()),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&by_scale), vec![1, 3]);
    }

    #[test]
    fn test_date_range() {
        let from = search(&SearchRequest {
            date_from: Some("01/01/2024".to_string()),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&from), vec![3]);

        let until = search(&SearchRequest {
            date_to: Some("2023-04-12".to_string()),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&until), vec![1, 2]);

        let short = search(&SearchRequest {
            date_from: Some("13-04-23".to_string()),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&short), vec![3]);

        let err = search(&SearchRequest {
            date_from: Some("31/02/2024".to_string()),
            ..request()
        })
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidDate(_)));
    }

    #[test]
    fn test_uuid_prefix() {
        let response = search(&SearchRequest {
            uuid: Some(" A".to_string()),
            ..request()
        })
        .unwrap();
        assert_eq!(ids(&response), vec![1, 2]);

        let none = search(&SearchRequest {
            uuid: Some("1".to_string()),
            ..request()
        })
        .unwrap();
        assert!(none.areas.is_empty());
    }

    #[test]
    fn test_custom_paper_size() {
        assert_eq!(
            custom_paper_size(29.7, 21.0),
            "Custom Size: Height: 29.7 cm, Width: 21.0 cm"
        );

        let mut projects: Vec<Project> = serde_json::from_str(SAMPLE).unwrap();
        projects[1].paper_size = custom_paper_size(29.7, 21.0);
        let catalog = Catalog::new(projects);
        let custom = |height: &str, width: &str| SearchRequest {
            paper_size: Some("Custom".to_string()),
            custom_height: Some(height.to_string()),
            custom_width: Some(width.to_string()),
            ..request()
        };

        let criteria =
            SearchCriteria::from_request(&custom("29.7", "21"), &CoordinateParser::default())
                .unwrap();
        assert_eq!(ids(&catalog.search(&criteria, 1, 10)), vec![3]);

        let criteria =
            SearchCriteria::from_request(&custom("21", "29.7"), &CoordinateParser::default())
                .unwrap();
        assert!(catalog.search(&criteria, 1, 10).areas.is_empty());

        let err = search(&custom("29.7", " ")).unwrap_err();
        assert!(matches!(err, SearchError::MissingCustomSize));
        let err = search(&custom("tall", "21")).unwrap_err();
        assert!(matches!(err, SearchError::InvalidCustomSize));
    }

    #[test]
    fn test_project_lookup_and_user_names() {
        let catalog = catalog();
        assert_eq!(catalog.project("b2").unwrap().project_name, "Ridge line");
        assert!(catalog.project("b").is_none());
        assert_eq!(catalog.user_names(), vec!["Lior", "dana"]);

        let mut projects: Vec<Project> = serde_json::from_str(SAMPLE).unwrap();
        projects.push(projects[0].clone());
        assert_eq!(Catalog::new(projects).user_names(), vec!["Lior", "dana"]);
    }

    fn project_ids(request: ProjectListRequest) -> Vec<String> {
        let filters = ProjectFilters::from_request(&request).unwrap();
        catalog()
            .list_projects(&filters, 1, DEFAULT_PER_PAGE)
            .projects
            .into_iter()
            .map(|summary| summary.uuid)
            .collect()
    }

    #[test]
    fn test_project_listing_filters() {
        assert_eq!(project_ids(ProjectListRequest::default()), vec!["a1", "b2"]);
        assert_eq!(
            project_ids(ProjectListRequest {
                project_name_filter: Some("ridge".to_string()),
                ..Default::default()
            }),
            vec!["b2"]
        );
        assert_eq!(
            project_ids(ProjectListRequest {
                date_filter: Some("2023-04".to_string()),
                ..Default::default()
            }),
            vec!["a1"]
        );
        assert_eq!(
            project_ids(ProjectListRequest {
                date_from_filter: Some("01/05/2023".to_string()),
                date_to_filter: Some("31/12/2024".to_string()),
                ..Default::default()
            }),
            vec!["b2"]
        );
        assert_eq!(
            project_ids(ProjectListRequest {
                paper_size_filter: Some("a3".to_string()),
                file_location_filter: Some("projects/".to_string()),
                ..Default::default()
            }),
            vec!["b2"]
        );
        assert!(
            project_ids(ProjectListRequest {
                associated_scales_filter: Some("250".to_string()),
                uuid_filter: Some("b".to_string()),
                ..Default::default()
            })
            .is_empty()
        );

        let err = ProjectFilters::from_request(&ProjectListRequest {
            date_to_filter: Some("2024/13/01".to_string()),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SearchError::InvalidDate(_)));
    }

    #[test]
    fn test_area_listing_filters() {
        let catalog = catalog();
        let list = |request: AreaListRequest| {
            ids_of(&catalog.list_areas(&AreaFilters::from_request(&request), 1, 10).areas)
        };

        assert_eq!(list(AreaListRequest::default()), vec![1, 2, 3]);
        assert_eq!(
            list(AreaListRequest {
                ymax_filter: Some("3500015.0".to_string()),
                ..Default::default()
            }),
            vec![2]
        );
        // Numeric scales compare as numbers, text as a substring.
        assert_eq!(
            list(AreaListRequest {
                scale_filter: Some("1000".to_string()),
                ..Default::default()
            }),
            vec![1, 3]
        );
        assert!(
            list(AreaListRequest {
                xmin_filter: Some("left".to_string()),
                ..Default::default()
            })
            .is_empty()
        );
        assert_eq!(
            list(AreaListRequest {
                project_id_filter: Some("2".to_string()),
                ..Default::default()
            }),
            vec![3]
        );

        let mut projects: Vec<Project> = serde_json::from_str(SAMPLE).unwrap();
        projects[0].areas[0].scale = "1:1000".to_string();
        let ratio = Catalog::new(projects).list_areas(
            &AreaFilters {
                scale: Some("1:1".to_string()),
                ..Default::default()
            },
            1,
            10,
        );
        assert_eq!(ids_of(&ratio.areas), vec![1]);
    }

    #[test]
    fn test_pagination_clamps_page() {
        let catalog = catalog();
        let criteria = SearchCriteria::default();

        let page = catalog.search(&criteria, 2, 2);
        assert_eq!(ids(&page), vec![3]);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.pagination.total_items, 3);

        let beyond = catalog.search(&criteria, 9, 2);
        assert_eq!(beyond.pagination.current_page, 2);
        assert_eq!(ids(&beyond), vec![3]);

        let empty = Catalog::empty().search(&criteria, 3, 10);
        assert_eq!(empty.pagination.current_page, 1);
        assert_eq!(empty.pagination.total_pages, 0);
        assert!(empty.areas.is_empty());
    }
}
