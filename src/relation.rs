use crate::rect::{self, Rectangle, ValidationError, check_range};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relative-size tolerance accepted by the search, in percent.
pub const MAX_TOLERANCE_PCT: f64 = 1000.0;
pub const MAX_OVERLAP_THRESHOLD_PCT: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationMode {
    /// Candidate entirely inside the query.
    Contains,
    /// Interiors intersect.
    Overlaps,
    /// Share of the candidate covered by the query.
    OverlapPct,
    /// Candidate area within a tolerance of the query area.
    RelativeSize,
    /// Candidate entirely outside the query.
    Outside,
}

impl RelationMode {
    pub const ALL: [RelationMode; 5] = [
        RelationMode::Contains,
        RelationMode::Overlaps,
        RelationMode::OverlapPct,
        RelationMode::RelativeSize,
        RelationMode::Outside,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationMode::Contains => "contains",
            RelationMode::Overlaps => "overlaps",
            RelationMode::OverlapPct => "overlap_pct",
            RelationMode::RelativeSize => "relative_size",
            RelationMode::Outside => "outside",
        }
    }
}

impl fmt::Display for RelationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RelationMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RelationMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown relationship mode '{}'. Expected one of: contains, overlaps, overlap_pct, relative_size, outside",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlap_threshold_pct: Option<f64>,
}

/// Either a verdict or, for `overlap_pct` without a threshold, the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RelationOutcome {
    Flag(bool),
    Percentage(f64),
}

impl RelationOutcome {
    /// Reads the outcome as a filter decision. A bare percentage passes when
    /// anything overlaps at all.
    pub fn is_match(&self) -> bool {
        match *self {
            RelationOutcome::Flag(flag) => flag,
            RelationOutcome::Percentage(pct) => pct > 0.0,
        }
    }
}

pub fn evaluate_rectangle_relationship(
    query: &Rectangle,
    candidate: &Rectangle,
    mode: RelationMode,
    params: &RelationParams,
) -> Result<RelationOutcome, ValidationError> {
    Ok(match mode {
        RelationMode::Contains => RelationOutcome::Flag(rect::contains(query, candidate)),
        RelationMode::Overlaps => RelationOutcome::Flag(rect::overlaps(query, candidate)),
        RelationMode::Outside => RelationOutcome::Flag(rect::disjoint(query, candidate)),
        RelationMode::OverlapPct => {
            let pct = rect::overlap_percentage(candidate, query);
            match params.overlap_threshold_pct {
                Some(threshold) => {
                    let threshold = check_range(
                        "overlap_threshold_pct",
                        threshold,
                        0.0,
                        MAX_OVERLAP_THRESHOLD_PCT,
                    )?;
                    RelationOutcome::Flag(pct >= threshold)
                }
                None => RelationOutcome::Percentage(pct),
            }
        }
        RelationMode::RelativeSize => {
            let tolerance = params
                .tolerance_pct
                .ok_or(ValidationError::MissingParameter("tolerance_pct"))?;
            let tolerance = check_range("tolerance_pct", tolerance, 0.0, MAX_TOLERANCE_PCT)?;
            RelationOutcome::Flag(rect::within_relative_size_band(
                candidate.area(),
                query.area(),
                tolerance,
            ))
        }
    })
}

/// The spatial part of an area search: a query rectangle and the selected
/// relationship modes, any of which admits a candidate. With no mode
/// selected, plain overlap is used.
#[derive(Debug, Clone)]
pub struct SpatialFilter {
    query: Rectangle,
    modes: Vec<RelationMode>,
    params: RelationParams,
}

impl SpatialFilter {
    /// Validates the percentages of the selected modes only; an unselected
    /// mode's parameter is ignored.
    pub fn new(
        query: Rectangle,
        modes: &[RelationMode],
        size_tolerance_pct: f64,
        overlap_threshold_pct: f64,
    ) -> Result<Self, ValidationError> {
        let mut params = RelationParams::default();
        if modes.contains(&RelationMode::RelativeSize) {
            params.tolerance_pct = Some(check_range(
                "size_percentage",
                size_tolerance_pct,
                0.0,
                MAX_TOLERANCE_PCT,
            )?);
        }
        if modes.contains(&RelationMode::OverlapPct) {
            params.overlap_threshold_pct = Some(check_range(
                "overlap_percentage",
                overlap_threshold_pct,
                0.0,
                MAX_OVERLAP_THRESHOLD_PCT,
            )?);
        }

        // First occurrence wins, so the selection order survives.
        let mut modes = modes.iter().fold(Vec::new(), |mut unique, mode| {
            if !unique.contains(mode) {
                unique.push(*mode);
            }
            unique
        });
        if modes.is_empty() {
            modes.push(RelationMode::Overlaps);
        }

        Ok(Self {
            query,
            modes,
            params,
        })
    }

    pub fn query(&self) -> &Rectangle {
        &self.query
    }

    pub fn modes(&self) -> &[RelationMode] {
        &self.modes
    }

    pub fn matches(&self, candidate: &Rectangle) -> bool {
        self.modes.iter().any(|mode| {
            // Parameters were validated in new(), so evaluation cannot fail here.
            evaluate_rectangle_relationship(&self.query, candidate, *mode, &self.params)
                .map(|outcome| outcome.is_match())
                .unwrap_or(false)
        })
    }
}
