use crate::AppState;
use crate::catalog::{AreaFilters, DEFAULT_PER_PAGE, ProjectFilters, SearchCriteria};
use crate::models::{
    AreaListRequest, ErrorResponse, ParseRequest, ProjectListRequest, RelationshipRequest,
    RelationshipResponse, ReprojectRequest, SearchRequest, UserNamesResponse,
};
use crate::prometheus;
use crate::rect::{self, check_range};
use crate::relation::evaluate_rectangle_relationship;
use crate::state::Metrics;
use actix_web::{HttpResponse, Responder, error, get, post, web};
use log::{debug, info};

fn bad_request(err: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(err))
}

/// Registers every endpoint together with extractor configs that report
/// malformed bodies and query strings as JSON errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let response = bad_request(&err);
        error::InternalError::from_response(err, response).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        let response = bad_request(&err);
        error::InternalError::from_response(err, response).into()
    }))
    .service(parse_coordinate)
    .service(reproject)
    .service(relationship)
    .service(search_areas)
    .service(list_areas)
    .service(list_projects)
    .service(get_project)
    .service(user_names)
    .service(metrics);
}

/// Handler for the `/api/parse` endpoint.
///
/// Turns a free-form coordinate string into a point in the configured UTM
/// zone.
#[post("/api/parse")]
pub async fn parse_coordinate(
    data: web::Json<ParseRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    Metrics::bump(&state.metrics.parse_requests);
    match state.parser.parse(&data.raw) {
        Ok(point) => HttpResponse::Ok().json(point),
        Err(err) => {
            Metrics::bump(&state.metrics.parse_failures);
            debug!("Rejected coordinate: {err}");
            bad_request(err)
        }
    }
}

/// Handler for the `/api/reproject` endpoint.
#[post("/api/reproject")]
pub async fn reproject(
    data: web::Json<ReprojectRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let (lon, lat) = match (
        check_range("lon", data.lon, -180.0, 180.0),
        check_range("lat", data.lat, -90.0, 90.0),
    ) {
        (Ok(lon), Ok(lat)) => (lon, lat),
        (Err(err), _) | (_, Err(err)) => return bad_request(err),
    };

    match state.parser.reprojector().project(lon, lat) {
        Ok(point) => HttpResponse::Ok().json(point),
        Err(err) => bad_request(err),
    }
}

/// Handler for the `/api/relationship` endpoint.
#[post("/api/relationship")]
pub async fn relationship(
    data: web::Json<RelationshipRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    Metrics::bump(&state.metrics.relationship_requests);
    match evaluate_rectangle_relationship(&data.query, &data.candidate, data.mode, &data.params) {
        Ok(result) => HttpResponse::Ok().json(RelationshipResponse {
            mode: data.mode,
            result,
            verdict: rect::verdict(&data.query, &data.candidate),
        }),
        Err(err) => bad_request(err),
    }
}

/// Handler for the `/api/areas/search` endpoint.
///
/// Every filter in the query string is optional. The spatial filter needs
/// both corners; its modes are OR-ed and default to plain overlap.
#[get("/api/areas/search")]
pub async fn search_areas(
    query: web::Query<SearchRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    Metrics::bump(&state.metrics.searches);
    let criteria = match SearchCriteria::from_request(&query, &state.parser) {
        Ok(criteria) => criteria,
        Err(err) => {
            Metrics::bump(&state.metrics.search_failures);
            info!("Rejected search: {err}");
            return bad_request(err);
        }
    };

    let response = state.catalog.search(
        &criteria,
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    );
    debug!(
        "Search matched {} areas",
        response.pagination.total_items
    );
    HttpResponse::Ok().json(response)
}

/// Handler for the `/api/areas` endpoint: every valid area, one page at a
/// time, narrowed by per-column filters.
#[get("/api/areas")]
pub async fn list_areas(
    query: web::Query<AreaListRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let filters = AreaFilters::from_request(&query);
    HttpResponse::Ok().json(state.catalog.list_areas(
        &filters,
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    ))
}

/// Handler for the `/api/projects` endpoint.
#[get("/api/projects")]
pub async fn list_projects(
    query: web::Query<ProjectListRequest>,
    state: web::Data<AppState>,
) -> impl Responder {
    let filters = match ProjectFilters::from_request(&query) {
        Ok(filters) => filters,
        Err(err) => return bad_request(err),
    };
    HttpResponse::Ok().json(state.catalog.list_projects(
        &filters,
        query.page.unwrap_or(1),
        query.per_page.unwrap_or(DEFAULT_PER_PAGE),
    ))
}

/// Handler for the `/api/projects/{uuid}` endpoint. Returns the project with
/// all of its stored areas.
#[get("/api/projects/{uuid}")]
pub async fn get_project(path: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    match state.catalog.project(&path) {
        Some(project) => HttpResponse::Ok().json(project),
        None => HttpResponse::NotFound().json(ErrorResponse::new("Project not found")),
    }
}

#[get("/api/user_names")]
pub async fn user_names(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(UserNamesResponse {
        user_names: state.catalog.user_names(),
    })
}

#[get("/metrics")]
pub async fn metrics(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(prometheus::generate_metrics(&state))
}
