//! Geographic to planar reprojection into one fixed UTM zone.
//!
//! Every planar coordinate in the catalog lives in the same zone, so the
//! target zone is chosen once at startup and never derived from the input
//! longitude. The transform itself is a [`PlanarTransform`] strategy; the
//! default one is backed by `proj4rs`.

use crate::rect::Point;
use once_cell::sync::OnceCell;
use proj4rs::proj::Proj;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// WGS84 UTM zone 36N (EPSG:32636).
pub const DEFAULT_ZONE: UtmZone = UtmZone {
    number: 36,
    north: true,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("Invalid projection definition '{definition}': {reason}")]
    Definition { definition: String, reason: String },
    #[error("Transform of lon={lon}, lat={lat} failed: {reason}")]
    Transform { lon: f64, lat: f64, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid UTM zone '{0}'. Expected a zone number 1-60 followed by N or S, e.g. '36N'")]
pub struct InvalidZone(String);

/// A UTM zone on the WGS84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    number: u8,
    north: bool,
}

impl UtmZone {
    pub fn new(number: u8, north: bool) -> Result<Self, InvalidZone> {
        if (1..=60).contains(&number) {
            Ok(UtmZone { number, north })
        } else {
            Err(InvalidZone(format!(
                "{number}{}",
                if north { 'N' } else { 'S' }
            )))
        }
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn is_north(&self) -> bool {
        self.north
    }

    pub fn epsg(&self) -> u32 {
        let base = if self.north { 32600 } else { 32700 };
        base + u32::from(self.number)
    }

    pub fn central_meridian(&self) -> f64 {
        -183.0 + 6.0 * f64::from(self.number)
    }

    fn proj_string(&self) -> String {
        let mut s = format!("+proj=utm +zone={} +ellps=WGS84 +units=m", self.number);
        if !self.north {
            s.push_str(" +south");
        }
        s
    }
}

impl Default for UtmZone {
    fn default() -> Self {
        DEFAULT_ZONE
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, if self.north { 'N' } else { 'S' })
    }
}

impl std::str::FromStr for UtmZone {
    type Err = InvalidZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || InvalidZone(s.to_string());
        let Some((idx, band)) = trimmed.char_indices().last() else {
            return Err(invalid());
        };
        let north = match band {
            'N' | 'n' => true,
            'S' | 's' => false,
            _ => return Err(invalid()),
        };
        let number = trimmed[..idx].trim().parse::<u8>().map_err(|_| invalid())?;
        UtmZone::new(number, north).map_err(|_| invalid())
    }
}

/// Forward transform from geographic degrees to planar meters.
pub trait PlanarTransform: Send + Sync {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<Point, ProjectionError>;

    /// Human readable name of the target system, used in logs.
    fn target(&self) -> String;
}

/// [`PlanarTransform`] backed by `proj4rs`.
///
/// The definitions are parsed on first use and kept for every later call.
#[derive(Clone)]
pub struct Proj4Transform {
    source: String,
    target: String,
    projs: OnceCell<(Proj, Proj)>,
}

impl fmt::Debug for Proj4Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proj4Transform")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("initialized", &self.projs.get().is_some())
            .finish()
    }
}

impl Proj4Transform {
    pub fn utm(zone: UtmZone) -> Self {
        Self {
            source: "+proj=longlat +ellps=WGS84".to_string(),
            target: zone.proj_string(),
            projs: OnceCell::new(),
        }
    }

    fn build(definition: &str) -> Result<Proj, ProjectionError> {
        Proj::from_proj_string(definition).map_err(|err| ProjectionError::Definition {
            definition: definition.to_string(),
            reason: format!("{err:?}"),
        })
    }

    fn projs(&self) -> Result<&(Proj, Proj), ProjectionError> {
        self.projs
            .get_or_try_init(|| -> Result<_, ProjectionError> {
                Ok((Self::build(&self.source)?, Self::build(&self.target)?))
            })
    }
}

impl PlanarTransform for Proj4Transform {
    fn forward(&self, lon_deg: f64, lat_deg: f64) -> Result<Point, ProjectionError> {
        let (src, dst) = self.projs()?;

        let failed = |reason: String| ProjectionError::Transform {
            lon: lon_deg,
            lat: lat_deg,
            reason,
        };

        // proj4rs expects geographic input in radians.
        let mut point = (lon_deg.to_radians(), lat_deg.to_radians(), 0.0);
        proj4rs::transform::transform(src, dst, &mut point)
            .map_err(|err| failed(format!("{err:?}")))?;

        if !point.0.is_finite() || !point.1.is_finite() {
            return Err(failed("non-finite result".to_string()));
        }
        Ok(Point::new(point.0, point.1))
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

/// What to do when the transform fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegradationPolicy {
    /// Log a warning and hand back the untransformed `(lon, lat)`.
    #[default]
    Lenient,
    /// Surface the failure to the caller.
    Strict,
}

#[derive(Clone)]
pub struct Reprojector {
    transform: Arc<dyn PlanarTransform>,
    policy: DegradationPolicy,
    degradations: Arc<AtomicU64>,
}

impl fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reprojector")
            .field("target", &self.transform.target())
            .field("policy", &self.policy)
            .finish()
    }
}

impl Default for Reprojector {
    fn default() -> Self {
        Self::utm(DEFAULT_ZONE)
    }
}

impl Reprojector {
    pub fn utm(zone: UtmZone) -> Self {
        Self::with_transform(Arc::new(Proj4Transform::utm(zone)))
    }

    pub fn with_transform(transform: Arc<dyn PlanarTransform>) -> Self {
        Self {
            transform,
            policy: DegradationPolicy::default(),
            degradations: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_policy(mut self, policy: DegradationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Counts identity fallbacks into `counter` instead of a private one.
    pub fn with_degradation_counter(mut self, counter: Arc<AtomicU64>) -> Self {
        self.degradations = counter;
        self
    }

    pub fn policy(&self) -> DegradationPolicy {
        self.policy
    }

    pub fn degradations(&self) -> u64 {
        self.degradations.load(Ordering::Relaxed)
    }

    /// Transforms `(lon, lat)` honoring the degradation policy. `Ok(None)`
    /// means the transform failed under the lenient policy; the failure has
    /// already been logged and counted.
    pub fn try_project(&self, lon_deg: f64, lat_deg: f64) -> Result<Option<Point>, ProjectionError> {
        match self.transform.forward(lon_deg, lat_deg) {
            Ok(point) => Ok(Some(point)),
            Err(err) => match self.policy {
                DegradationPolicy::Strict => Err(err),
                DegradationPolicy::Lenient => {
                    self.degrade(lon_deg, lat_deg, &err);
                    Ok(None)
                }
            },
        }
    }

    /// Like [`Reprojector::try_project`], with the lenient fallback resolved
    /// to the input itself.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> Result<Point, ProjectionError> {
        Ok(self
            .try_project(lon_deg, lat_deg)?
            .unwrap_or(Point::new(lon_deg, lat_deg)))
    }

    /// Transforms `(lon, lat)`, falling back to the identity on failure.
    pub fn to_planar(&self, lon_deg: f64, lat_deg: f64) -> Point {
        match self.transform.forward(lon_deg, lat_deg) {
            Ok(point) => point,
            Err(err) => {
                self.degrade(lon_deg, lat_deg, &err);
                Point::new(lon_deg, lat_deg)
            }
        }
    }

    fn degrade(&self, lon_deg: f64, lat_deg: f64, err: &ProjectionError) {
        self.degradations.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(
            lon = lon_deg,
            lat = lat_deg,
            projection = %self.transform.target(),
            error = %err,
            "Coordinate transformation failed, returning input unchanged"
        );
    }
}

/// Reprojects into the default zone with the lenient policy.
pub fn reproject_geographic(lon_deg: f64, lat_deg: f64) -> Point {
    Reprojector::default().to_planar(lon_deg, lat_deg)
}
