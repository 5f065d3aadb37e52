use crate::state::{Metrics, State};

fn push_metric(lines: &mut Vec<String>, name: &str, kind: &str, help: &str, value: impl std::fmt::Display) {
    lines.push(format!("# HELP {name} {help}"));
    lines.push(format!("# TYPE {name} {kind}"));
    lines.push(format!("{name} {value}"));
}

/// Generates metrics in Prometheus text format.
pub fn generate_metrics(state: &State) -> String {
    let mut lines = Vec::new();
    let metrics = &state.metrics;

    push_metric(
        &mut lines,
        "uptime_seconds",
        "gauge",
        "Server process uptime in seconds.",
        state.uptime_seconds(),
    );

    // --- Catalog ---
    push_metric(
        &mut lines,
        "arcspatial_projects",
        "gauge",
        "Number of projects in the loaded catalog.",
        state.catalog.num_projects(),
    );
    push_metric(
        &mut lines,
        "arcspatial_areas",
        "gauge",
        "Number of searchable areas in the loaded catalog.",
        state.catalog.num_areas(),
    );

    // --- Parsing ---
    push_metric(
        &mut lines,
        "arcspatial_parse_requests_total",
        "counter",
        "Coordinate strings submitted for parsing.",
        Metrics::read(&metrics.parse_requests),
    );
    push_metric(
        &mut lines,
        "arcspatial_parse_failures_total",
        "counter",
        "Coordinate strings that could not be parsed.",
        Metrics::read(&metrics.parse_failures),
    );
    push_metric(
        &mut lines,
        "arcspatial_reprojection_fallbacks_total",
        "counter",
        "Reprojections that failed and returned the input unchanged.",
        Metrics::read(&metrics.degradations),
    );

    // --- Relationships and search ---
    push_metric(
        &mut lines,
        "arcspatial_relationship_requests_total",
        "counter",
        "Single rectangle relationship evaluations.",
        Metrics::read(&metrics.relationship_requests),
    );
    push_metric(
        &mut lines,
        "arcspatial_searches_total",
        "counter",
        "Area searches served.",
        Metrics::read(&metrics.searches),
    );
    push_metric(
        &mut lines,
        "arcspatial_search_failures_total",
        "counter",
        "Area searches rejected as invalid.",
        Metrics::read(&metrics.search_failures),
    );

    lines.push("# HELP arcspatial_info Build information about the server.".to_string());
    lines.push("# TYPE arcspatial_info gauge".to_string());
    lines.push(format!(
        "arcspatial_info{{version=\"{}\",utm_zone=\"{}\"}} 1",
        crate::version::VERSION,
        state.parser.settings().zone
    ));

    lines.join("\n") + "\n"
}
