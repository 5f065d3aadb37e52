use serde::{Deserialize, Serialize};

/// A planar coordinate in the target projection, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "Bottom left must be southwest (smaller X and Y) of top right. Got xmin={xmin}, ymin={ymin}, xmax={xmax}, ymax={ymax}"
    )]
    InvertedBounds {
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
    },
    #[error("Rectangle bounds, width, height and area must be finite numbers")]
    NonFinite,
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{0} is required for this relationship mode")]
    MissingParameter(&'static str),
}

/// Checks that `value` lies in `[min, max]`. NaN never does.
pub fn check_range(
    name: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, ValidationError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// An axis-aligned rectangle with `xmin < xmax` and `ymin < ymax`.
///
/// The fields are private so the invariant can only be established through
/// [`Rectangle::new`] (or deserialization, which goes through it).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRectangle")]
pub struct Rectangle {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

#[derive(Deserialize)]
struct RawRectangle {
    xmin: f64,
    ymin: f64,
    xmax: f64,
    ymax: f64,
}

impl TryFrom<RawRectangle> for Rectangle {
    type Error = ValidationError;

    fn try_from(raw: RawRectangle) -> Result<Self, Self::Error> {
        Rectangle::new(raw.xmin, raw.ymin, raw.xmax, raw.ymax)
    }
}

impl Rectangle {
    /// Builds a rectangle, rejecting inverted or degenerate bounds. Bounds
    /// are never swapped into order.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self, ValidationError> {
        if ![xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite()) {
            return Err(ValidationError::NonFinite);
        }
        if xmin >= xmax || ymin >= ymax {
            return Err(ValidationError::InvertedBounds {
                xmin,
                ymin,
                xmax,
                ymax,
            });
        }
        // Finite bounds can still span more than f64::MAX.
        let (width, height) = (xmax - xmin, ymax - ymin);
        if !width.is_finite() || !height.is_finite() || !(width * height).is_finite() {
            return Err(ValidationError::NonFinite);
        }
        Ok(Rectangle {
            xmin,
            ymin,
            xmax,
            ymax,
        })
    }

    /// Builds the query rectangle from its bottom-left and top-right corners.
    pub fn from_corners(bottom_left: Point, top_right: Point) -> Result<Self, ValidationError> {
        Self::new(bottom_left.x, bottom_left.y, top_right.x, top_right.y)
    }

    pub fn xmin(&self) -> f64 {
        self.xmin
    }

    pub fn ymin(&self) -> f64 {
        self.ymin
    }

    pub fn xmax(&self) -> f64 {
        self.xmax
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    pub fn area(&self) -> f64 {
        area(self)
    }
}

impl std::str::FromStr for Rectangle {
    type Err = anyhow::Error;

    /// Parses `xmin,ymin,xmax,ymax`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(anyhow::anyhow!(
                "Invalid rectangle format. Expected 'xmin,ymin,xmax,ymax', got '{}'",
                s
            ));
        }

        let xmin = parts[0].parse::<f64>()?;
        let ymin = parts[1].parse::<f64>()?;
        let xmax = parts[2].parse::<f64>()?;
        let ymax = parts[3].parse::<f64>()?;

        Ok(Rectangle::new(xmin, ymin, xmax, ymax)?)
    }
}

/// The relationship between a query rectangle and one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlapVerdict {
    pub intersects: bool,
    pub intersection_area: f64,
    pub candidate_area: f64,
    pub overlap_pct_of_candidate: f64,
}

pub fn area(r: &Rectangle) -> f64 {
    (r.xmax - r.xmin) * (r.ymax - r.ymin)
}

/// True iff `candidate` lies entirely within `query`, boundaries included.
pub fn contains(query: &Rectangle, candidate: &Rectangle) -> bool {
    candidate.xmin >= query.xmin
        && candidate.xmax <= query.xmax
        && candidate.ymin >= query.ymin
        && candidate.ymax <= query.ymax
}

/// True iff the open interiors intersect. Rectangles sharing only an edge or
/// a corner do not overlap.
pub fn overlaps(a: &Rectangle, b: &Rectangle) -> bool {
    a.xmin < b.xmax && a.xmax > b.xmin && a.ymin < b.ymax && a.ymax > b.ymin
}

/// True iff `candidate` lies strictly outside `query` along at least one axis.
pub fn disjoint(query: &Rectangle, candidate: &Rectangle) -> bool {
    candidate.xmax < query.xmin
        || candidate.xmin > query.xmax
        || candidate.ymax < query.ymin
        || candidate.ymin > query.ymax
}

pub fn intersection_area(a: &Rectangle, b: &Rectangle) -> f64 {
    let width = (a.xmax.min(b.xmax) - a.xmin.max(b.xmin)).max(0.0);
    let height = (a.ymax.min(b.ymax) - a.ymin.max(b.ymin)).max(0.0);
    width * height
}

/// Share of the candidate covered by the query, in percent.
pub fn overlap_percentage(candidate: &Rectangle, query: &Rectangle) -> f64 {
    let candidate_area = area(candidate);
    if candidate_area == 0.0 {
        return 0.0;
    }
    // Rounding can push the ratio a hair past 1 for fully covered candidates.
    (intersection_area(candidate, query) / candidate_area * 100.0).clamp(0.0, 100.0)
}

/// True iff `candidate_area` is within `reference_area` ± `tolerance_pct`
/// percent, bounds inclusive. The caller validates `tolerance_pct`.
pub fn within_relative_size_band(candidate_area: f64, reference_area: f64, tolerance_pct: f64) -> bool {
    let min_size = reference_area * (1.0 - tolerance_pct / 100.0);
    let max_size = reference_area * (1.0 + tolerance_pct / 100.0);
    min_size <= candidate_area && candidate_area <= max_size
}

pub fn verdict(query: &Rectangle, candidate: &Rectangle) -> OverlapVerdict {
    let intersects = overlaps(query, candidate);
    let intersection_area = intersection_area(query, candidate);
    let candidate_area = area(candidate);
    let overlap_pct_of_candidate = if intersects {
        overlap_percentage(candidate, query)
    } else {
        0.0
    };
    OverlapVerdict {
        intersects,
        intersection_area,
        candidate_area,
        overlap_pct_of_candidate,
    }
}
