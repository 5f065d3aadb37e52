//! Free-form coordinate strings to planar points.
//!
//! Input is matched against an ordered list of format [`Family`] entries.
//! The first family that both matches structurally and converts numerically
//! wins; a family whose numbers don't convert yields to the next one.

use crate::rect::Point;
use crate::reproject::{DegradationPolicy, ProjectionError, Reprojector, UtmZone};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Eastings closer than this to the zone edge are not considered UTM.
pub const UTM_EASTING_MIN: f64 = 160_000.0;
pub const UTM_EASTING_MAX: f64 = 834_000.0;
pub const UTM_NORTHING_MIN: f64 = 0.0;
/// Southern hemisphere false northing.
pub const UTM_NORTHING_MAX: f64 = 10_000_000.0;

pub const EXPECTED_FORMATS: &str = concat!(
    "'x,y', 'x/y', 'x:y', 'x y', ",
    "'WGS84 UTM 36N 735712 E / 3563829 N', ",
    "'WGS84 Geo 35° 30' 0.11\" E / 32° 11' 9.88\" N', ",
    "'WGS84 Geo 35.311654 E / 31.558439 N', ",
    "'35.311654 E / 31.558439 N', ",
    "'719415 E / 3493811 N', ",
    "'EPSG:4326 35.5, 32.2'"
);

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty coordinate string provided")]
    Empty,
    #[error("Invalid coordinate format: '{input}'. Expected formats: {formats}", formats = EXPECTED_FORMATS)]
    Unrecognized { input: String },
    #[error("Could not reproject '{input}' into UTM {zone}: {source}")]
    Projection {
        input: String,
        zone: UtmZone,
        source: ProjectionError,
    },
}

/// Magnitudes that plausibly are UTM easting/northing rather than degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmEnvelope {
    pub easting_min: f64,
    pub easting_max: f64,
    pub northing_min: f64,
    pub northing_max: f64,
}

impl Default for UtmEnvelope {
    fn default() -> Self {
        Self {
            easting_min: UTM_EASTING_MIN,
            easting_max: UTM_EASTING_MAX,
            northing_min: UTM_NORTHING_MIN,
            northing_max: UTM_NORTHING_MAX,
        }
    }
}

impl UtmEnvelope {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.easting_min..=self.easting_max).contains(&x.abs())
            && (self.northing_min..=self.northing_max).contains(&y.abs())
    }
}

/// How successful results are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Rounding {
    /// Whole meters, ties to even.
    #[default]
    HalfEven,
    /// Keep full precision.
    Exact,
}

impl Rounding {
    fn apply(self, p: Point) -> Point {
        match self {
            Rounding::HalfEven => Point::new(p.x.round_ties_even(), p.y.round_ties_even()),
            Rounding::Exact => p,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParserSettings {
    pub zone: UtmZone,
    pub envelope: UtmEnvelope,
    pub rounding: Rounding,
    pub policy: DegradationPolicy,
}

/// What a CRS prefix says about the numbers following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrsHint {
    Geographic,
    Planar,
    Unknown,
}

/// A structurally matched coordinate, before classification and reprojection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Easting/northing with the zone the input claimed.
    Utm { point: Point, zone: UtmZone },
    /// Signed decimal degrees.
    Geographic { lon: f64, lat: f64 },
    /// Unsigned magnitudes with compass letters.
    Directional {
        x: f64,
        y: f64,
        east: bool,
        north: bool,
    },
    /// A bare pair of numbers.
    Pair { x: f64, y: f64, hint: CrsHint },
}

/// One recognized input format.
pub struct Family {
    pub name: &'static str,
    pub extract: fn(&str) -> Option<Reading>,
}

/// Format families in priority order.
pub static FAMILIES: [Family; 5] = [
    Family {
        name: "prefixed UTM",
        extract: prefixed_utm,
    },
    Family {
        name: "prefixed geographic decimal",
        extract: prefixed_geographic_decimal,
    },
    Family {
        name: "prefixed geographic DMS",
        extract: prefixed_geographic_dms,
    },
    Family {
        name: "directional pair",
        extract: directional_pair,
    },
    Family {
        name: "delimited pair",
        extract: delimited_pair,
    },
];

const NUMBER: &str = r"[+-]?(?:\d+(?:\.\d*)?|\.\d+)";
const UNSIGNED: &str = r"\d+(?:\.\d+)?";
const SEPARATOR: &str = r"(?:\s*[/,;:|\\\t]\s*|\s+)";
const WGS84: &str = r"(?:WGS\s*-?\s*84\s*)?";
const GEO_MARKER: &str = r"GEO(?:GRAPHIC)?\b\s*:?\s*";

/// Separators tried for the delimited pair, in order.
const SEPARATORS: [char; 7] = ['/', ',', ':', ';', '|', '\\', '\t'];

static UTM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{WGS84}UTM\s*(?:ZONE\s*)?(?P<zone>\d{{1,2}})\s*(?P<band>[NS])\b\s*:?\s*(?P<x>{NUMBER})\s*(?P<xdir>[EW])?{SEPARATOR}(?P<y>{NUMBER})\s*(?P<ydir>[NS])?$"
    ))
    .expect("prefixed UTM regex")
});

static GEO_DECIMAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{WGS84}{GEO_MARKER}(?P<lon>{NUMBER})\s*(?P<londir>[EW])?{SEPARATOR}(?P<lat>{NUMBER})\s*(?P<latdir>[NS])?$"
    ))
    .expect("geographic decimal regex")
});

fn dms(prefix: &str) -> String {
    format!(
        r#"(?P<{prefix}d>{UNSIGNED})\s*[°º]\s*(?:(?P<{prefix}m>{UNSIGNED})\s*['′]\s*)?(?:(?P<{prefix}s>{UNSIGNED})\s*(?:"|″|''|”)\s*)?"#
    )
}

static GEO_DMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{WGS84}{GEO_MARKER}{lon}(?P<londir>[EW])?{SEPARATOR}{lat}(?P<latdir>[NS])?$",
        lon = dms("lon"),
        lat = dms("lat"),
    ))
    .expect("geographic DMS regex")
});

static DIRECTIONAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<x>{UNSIGNED})\s*(?P<xdir>[EW])(?:\s*[/,;:|\\\t]\s*|\s*)(?P<y>{UNSIGNED})\s*(?P<ydir>[NS])$"
    ))
    .expect("directional regex")
});

static CRS_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<geo>GEO(?:GRAPHIC)?)|EPSG\s*:\s*(?P<epsg>\d+)|(?P<utm>UTM(?:\s*\d{1,2}\s*[NS])?)|(?P<wgs>WGS\s*-?\s*84)|PROJ)\b\s*:?\s*",
    )
    .expect("CRS prefix regex")
});

static SEPARATED_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-+]?\d*\.?\d+)\s*[/,:;|\t\\]\s*([-+]?\d*\.?\d+)").expect("separated pair regex")
});

static SPACED_PAIR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([-+]?\d*\.?\d+)\s+([-+]?\d*\.?\d+)").expect("spaced pair regex")
});

fn number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn capture_number(caps: &Captures, name: &str) -> Option<f64> {
    caps.name(name).and_then(|m| number(m.as_str()))
}

fn has_letter(caps: &Captures, name: &str, letter: char) -> bool {
    caps.name(name)
        .is_some_and(|m| m.as_str().eq_ignore_ascii_case(&letter.to_string()))
}

fn signed(value: f64, negate: bool) -> f64 {
    if negate { -value } else { value }
}

fn prefixed_utm(s: &str) -> Option<Reading> {
    let caps = UTM_RE.captures(s)?;
    let number = caps.name("zone")?.as_str().parse::<u8>().ok()?;
    let zone = UtmZone::new(number, has_letter(&caps, "band", 'N')).ok()?;
    let x = capture_number(&caps, "x")?;
    let y = capture_number(&caps, "y")?;
    Some(Reading::Utm {
        point: Point::new(x, y),
        zone,
    })
}

/// Reads one axis that may carry either a sign or a compass letter, but not
/// both. `-35 W` is contradictory and does not match.
fn compass_axis(caps: &Captures, value: &str, letter: &str, negative: char) -> Option<f64> {
    let raw = caps.name(value)?.as_str();
    if caps.name(letter).is_some() && raw.starts_with(['-', '+']) {
        return None;
    }
    Some(signed(number(raw)?, has_letter(caps, letter, negative)))
}

fn prefixed_geographic_decimal(s: &str) -> Option<Reading> {
    let caps = GEO_DECIMAL_RE.captures(s)?;
    Some(Reading::Geographic {
        lon: compass_axis(&caps, "lon", "londir", 'W')?,
        lat: compass_axis(&caps, "lat", "latdir", 'S')?,
    })
}

/// `deg + min/60 + sec/3600`; minutes and seconds must be below 60.
fn dms_to_decimal(caps: &Captures, prefix: &str) -> Option<f64> {
    let degrees = capture_number(caps, &format!("{prefix}d"))?;
    let part = |suffix: &str| -> Option<f64> {
        match caps.name(&format!("{prefix}{suffix}")) {
            None => Some(0.0),
            Some(m) => number(m.as_str()).filter(|v| *v < 60.0),
        }
    };
    let minutes = part("m")?;
    let seconds = part("s")?;
    Some(degrees + minutes / 60.0 + seconds / 3600.0)
}

fn prefixed_geographic_dms(s: &str) -> Option<Reading> {
    let caps = GEO_DMS_RE.captures(s)?;
    let lon = dms_to_decimal(&caps, "lon")?;
    let lat = dms_to_decimal(&caps, "lat")?;
    Some(Reading::Geographic {
        lon: signed(lon, has_letter(&caps, "londir", 'W')),
        lat: signed(lat, has_letter(&caps, "latdir", 'S')),
    })
}

fn directional_pair(s: &str) -> Option<Reading> {
    let caps = DIRECTIONAL_RE.captures(s)?;
    Some(Reading::Directional {
        x: capture_number(&caps, "x")?,
        y: capture_number(&caps, "y")?,
        east: has_letter(&caps, "xdir", 'E'),
        north: has_letter(&caps, "ydir", 'N'),
    })
}

/// Splits off a leading `WGS84`, `EPSG:nnnn`, `GEO`, `UTM` or `PROJ` marker.
fn strip_crs_prefix(s: &str) -> (CrsHint, &str) {
    let Some(caps) = CRS_PREFIX_RE.captures(s) else {
        return (CrsHint::Unknown, s);
    };
    let hint = if caps.name("geo").is_some() || caps.name("wgs").is_some() {
        CrsHint::Geographic
    } else if caps.name("utm").is_some() {
        CrsHint::Planar
    } else if let Some(code) = caps.name("epsg") {
        match code.as_str().parse::<u32>() {
            Ok(4326) => CrsHint::Geographic,
            Ok(32601..=32660) | Ok(32701..=32760) => CrsHint::Planar,
            _ => CrsHint::Unknown,
        }
    } else {
        CrsHint::Unknown
    };
    let rest = &s[caps.get(0).map_or(0, |m| m.end())..];
    (hint, rest)
}

fn delimited_pair(s: &str) -> Option<Reading> {
    let (hint, rest) = strip_crs_prefix(s);
    let body = rest
        .trim()
        .trim_matches(|c| matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\''))
        .trim();
    let pair = |x: f64, y: f64| Some(Reading::Pair { x, y, hint });

    for separator in SEPARATORS {
        if let Some((left, right)) = body.split_once(separator) {
            if let (Some(x), Some(y)) = (number(left), number(right)) {
                return pair(x, y);
            }
        }
    }

    let tokens: Vec<&str> = body.split_whitespace().collect();
    if let [left, right] = tokens.as_slice() {
        if let (Some(x), Some(y)) = (number(left), number(right)) {
            return pair(x, y);
        }
    }

    for re in [&*SEPARATED_PAIR_RE, &*SPACED_PAIR_RE] {
        if let Some(caps) = re.captures(body) {
            if let (Some(x), Some(y)) = (number(&caps[1]), number(&caps[2])) {
                return pair(x, y);
            }
        }
    }

    None
}

fn is_geographic_domain(x: f64, y: f64) -> bool {
    x.abs() <= 180.0 && y.abs() <= 90.0
}

#[derive(Debug, Clone, Default)]
pub struct CoordinateParser {
    settings: ParserSettings,
    reprojector: Reprojector,
}

impl CoordinateParser {
    pub fn new(settings: ParserSettings) -> Self {
        let reprojector = Reprojector::utm(settings.zone).with_policy(settings.policy);
        Self::with_reprojector(settings, reprojector)
    }

    pub fn with_reprojector(settings: ParserSettings, reprojector: Reprojector) -> Self {
        Self {
            settings,
            reprojector,
        }
    }

    pub fn settings(&self) -> &ParserSettings {
        &self.settings
    }

    pub fn reprojector(&self) -> &Reprojector {
        &self.reprojector
    }

    /// Parses `raw` into a planar point in the target zone.
    pub fn parse(&self, raw: &str) -> Result<Point, ParseError> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        for family in FAMILIES.iter() {
            if let Some(reading) = (family.extract)(input) {
                debug!("'{input}' read as {} {reading:?}", family.name);
                return self.resolve(input, reading);
            }
        }

        Err(ParseError::Unrecognized {
            input: input.to_string(),
        })
    }

    fn resolve(&self, input: &str, reading: Reading) -> Result<Point, ParseError> {
        let rounding = self.settings.rounding;
        match reading {
            Reading::Utm { point, zone } => {
                if zone != self.settings.zone {
                    warn!(
                        "'{input}' is in UTM {zone}, not {}; using easting/northing unchanged",
                        self.settings.zone
                    );
                }
                Ok(rounding.apply(point))
            }
            Reading::Geographic { lon, lat } => self.reproject(input, lon, lat),
            Reading::Directional { x, y, east, north } => {
                if east && north && self.settings.envelope.contains(x, y) {
                    Ok(rounding.apply(Point::new(x, y)))
                } else {
                    self.reproject(input, signed(x, !east), signed(y, !north))
                }
            }
            Reading::Pair { x, y, hint } => match hint {
                CrsHint::Geographic => self.reproject(input, x, y),
                CrsHint::Planar => Ok(rounding.apply(Point::new(x, y))),
                CrsHint::Unknown if self.settings.envelope.contains(x, y) => {
                    Ok(rounding.apply(Point::new(x, y)))
                }
                CrsHint::Unknown if is_geographic_domain(x, y) => self.reproject(input, x, y),
                CrsHint::Unknown => Ok(rounding.apply(Point::new(x, y))),
            },
        }
    }

    /// Reprojects and rounds. A lenient fallback comes back exactly as given,
    /// unrounded.
    fn reproject(&self, input: &str, lon: f64, lat: f64) -> Result<Point, ParseError> {
        match self.reprojector.try_project(lon, lat) {
            Ok(Some(point)) => Ok(self.settings.rounding.apply(point)),
            Ok(None) => Ok(Point::new(lon, lat)),
            Err(source) => Err(ParseError::Projection {
                input: input.to_string(),
                zone: self.settings.zone,
                source,
            }),
        }
    }
}

/// Parses with the default settings: UTM 36N, half-even rounding, lenient
/// reprojection.
pub fn parse_coordinate(raw: &str) -> Result<Point, ParseError> {
    CoordinateParser::default().parse(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproject::tests::{Broken, TimesTen};
    use std::sync::Arc;

    fn assert_close(p: Point, x: f64, y: f64) {
        assert!(
            (p.x - x).abs() <= 1.0 && (p.y - y).abs() <= 1.0,
            "expected ({x}, {y}), got ({}, {})",
            p.x,
            p.y
        );
    }

    fn family(name: &str) -> &'static Family {
        FAMILIES.iter().find(|f| f.name == name).unwrap()
    }

    #[test]
    fn test_empty_input() {
        for raw in ["", "   ", "\t\n"] {
            let err = parse_coordinate(raw).unwrap_err();
            assert!(matches!(err, ParseError::Empty));
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_unrecognized_names_input_and_formats() {
        let err = parse_coordinate("somewhere near the lake").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'somewhere near the lake'"), "{message}");
        assert!(message.contains("WGS84 UTM 36N"), "{message}");
        assert!(parse_coordinate("12/abc").is_err());
        assert!(parse_coordinate("inf,nan").is_err());
    }

    #[test]
    fn test_prefixed_utm_is_not_reprojected() {
        let p = parse_coordinate("WGS84 UTM 36N 735712 E / 3563829 N").unwrap();
        assert_eq!(p, Point::new(735712.0, 3563829.0));

        let p = parse_coordinate("utm 36n: 735712/3563829").unwrap();
        assert_eq!(p, Point::new(735712.0, 3563829.0));

        let p = parse_coordinate("UTM 36N 735712 3563829").unwrap();
        assert_eq!(p, Point::new(735712.0, 3563829.0));
    }

    #[test]
    fn test_prefixed_utm_other_zone_is_kept() {
        let reading = (family("prefixed UTM").extract)("WGS84 UTM 37N 312000 E / 3563829 N");
        assert_eq!(
            reading,
            Some(Reading::Utm {
                point: Point::new(312000.0, 3563829.0),
                zone: "37N".parse().unwrap(),
            })
        );
        let p = parse_coordinate("WGS84 UTM 37N 312000 E / 3563829 N").unwrap();
        assert_eq!(p, Point::new(312000.0, 3563829.0));
    }

    #[test]
    fn test_prefixed_utm_bad_zone_falls_through() {
        assert_eq!(
            (family("prefixed UTM").extract)("UTM 99N 735712 E / 3563829 N"),
            None
        );
        // Nothing later in the cascade accepts the compass letters either.
        let p = parse_coordinate("UTM 99N 735712 E / 3563829 N");
        assert!(p.is_err());
    }

    #[test]
    fn test_geographic_decimal() {
        let reading = (family("prefixed geographic decimal").extract)(
            "WGS84 Geo 35.311654 W / 31.558439 S",
        );
        assert_eq!(
            reading,
            Some(Reading::Geographic {
                lon: -35.311654,
                lat: -31.558439,
            })
        );

        let p = parse_coordinate("WGS84 Geo 35.311654 E / 31.558439 N").unwrap();
        assert_close(p, 719415.118, 3493811.030);
        let p = parse_coordinate("geographic: 35.5, 32.2").unwrap();
        assert_close(p, 735656.897, 3565345.245);
    }

    #[test]
    fn test_geographic_sign_and_letter_conflict() {
        let extract = family("prefixed geographic decimal").extract;
        assert_eq!(extract("GEO -35 W / 32 N"), None);
        assert_eq!(extract("GEO 35 E / -32 S"), None);
        assert!(parse_coordinate("GEO -35 W / 32 N").is_err());
        assert!(parse_coordinate("GEO 35 E / -32 S").is_err());

        // A sign alone, or a letter alone, is fine.
        assert_eq!(
            extract("GEO -35, -32"),
            Some(Reading::Geographic {
                lon: -35.0,
                lat: -32.0,
            })
        );
        assert_eq!(
            extract("GEO 35 W / 32 S"),
            Some(Reading::Geographic {
                lon: -35.0,
                lat: -32.0,
            })
        );
    }

    #[test]
    fn test_geographic_dms() {
        let extract = family("prefixed geographic DMS").extract;
        let Some(Reading::Geographic { lon, lat }) =
            extract(r#"WGS84 Geo 35° 30' 0.11" E / 32° 11' 9.88" N"#)
        else {
            panic!("DMS not recognized");
        };
        assert!((lon - (35.0 + 30.0 / 60.0 + 0.11 / 3600.0)).abs() < 1e-12);
        assert!((lat - (32.0 + 11.0 / 60.0 + 9.88 / 3600.0)).abs() < 1e-12);

        let p = parse_coordinate(r#"WGS84 Geo 35° 30' 0.11" E / 32° 11' 9.88" N"#).unwrap();
        assert_close(p, 735695.691, 3563801.452);
    }

    #[test]
    fn test_geographic_dms_sign_applies_to_whole_value() {
        let extract = family("prefixed geographic DMS").extract;
        let Some(Reading::Geographic { lon, lat }) = extract(r#"GEO 10° 30' 0" W, 5° 15' 0" S"#)
        else {
            panic!("DMS not recognized");
        };
        assert_eq!(lon, -10.5);
        assert_eq!(lat, -5.25);
    }

    #[test]
    fn test_geographic_dms_rejects_sixty_minutes() {
        let extract = family("prefixed geographic DMS").extract;
        assert_eq!(extract(r#"GEO 35° 60' 0" E / 32° 11' 9.88" N"#), None);
        assert!(parse_coordinate(r#"GEO 35° 60' 0" E / 32° 11' 9.88" N"#).is_err());
    }

    #[test]
    fn test_directional_pair() {
        let p = parse_coordinate("719415 E / 3493811 N").unwrap();
        assert_eq!(p, Point::new(719415.0, 3493811.0));

        let p = parse_coordinate("719415E3493811N").unwrap();
        assert_eq!(p, Point::new(719415.0, 3493811.0));

        let p = parse_coordinate("35.311654 E / 31.558439 N").unwrap();
        assert_close(p, 719415.118, 3493811.030);

        let p = parse_coordinate("35.3 E / 31.5 S").unwrap();
        assert_close(p, 718444.774, -3487308.287);
    }

    #[test]
    fn test_directional_west_or_south_always_reprojects() {
        let parser = CoordinateParser::with_reprojector(
            ParserSettings {
                rounding: Rounding::Exact,
                ..Default::default()
            },
            Reprojector::with_transform(Arc::new(TimesTen)),
        );
        assert_close(parser.parse("35.3 W / 31.5 S").unwrap(), -353.0, -315.0);
        // Inside the envelope, but a W or S letter rules out UTM.
        assert_eq!(
            parser.parse("719415 W / 3493811 N").unwrap(),
            Point::new(-7194150.0, 34938110.0)
        );
        assert_eq!(
            parser.parse("719415 E / 3493811 S").unwrap(),
            Point::new(7194150.0, -34938110.0)
        );
        // E and N inside the envelope stay planar.
        assert_eq!(
            parser.parse("719415 E / 3493811 N").unwrap(),
            Point::new(719415.0, 3493811.0)
        );
    }

    #[test]
    fn test_delimited_separators() {
        for raw in [
            "735712/3563829",
            "735712,3563829",
            "735712:3563829",
            "735712;3563829",
            "735712|3563829",
            "735712\\3563829",
            "735712\t3563829",
            "735712 3563829",
            "735712 , 3563829",
            "(735712, 3563829)",
            "[735712 / 3563829]",
            "\"735712,3563829\"",
        ] {
            assert_eq!(
                parse_coordinate(raw).unwrap(),
                Point::new(735712.0, 3563829.0),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_regex_fallback_finds_embedded_pair() {
        let extract = family("delimited pair").extract;
        let expected = Some(Reading::Pair {
            x: 735712.0,
            y: 3563829.0,
            hint: CrsHint::Unknown,
        });
        // Splitting at '/' or ',' leaves non-numeric halves in both cases.
        assert_eq!(extract("x/y 735712,3563829"), expected);
        assert_eq!(extract("735712,3563829 /"), expected);
        assert_eq!(extract("at 735712 3563829 roughly"), expected);
    }

    #[test]
    fn test_planar_round_trip() {
        let p = parse_coordinate("123456/789012").unwrap();
        assert_eq!(p, Point::new(123456.0, 789012.0));
        let p = parse_coordinate("-5000/-250000").unwrap();
        assert_eq!(p, Point::new(-5000.0, -250000.0));
    }

    #[test]
    fn test_geographic_pair_is_reprojected() {
        let p = parse_coordinate("35.5,32.2").unwrap();
        assert_close(p, 735656.897, 3565345.245);
        let p = parse_coordinate("34.8 31.9").unwrap();
        assert_close(p, 670216.348, 3530764.735);
    }

    #[test]
    fn test_crs_prefix_hints() {
        let extract = family("delimited pair").extract;
        assert_eq!(
            extract("EPSG:4326 35.5, 32.2"),
            Some(Reading::Pair {
                x: 35.5,
                y: 32.2,
                hint: CrsHint::Geographic,
            })
        );
        assert_eq!(
            extract("EPSG:32636: 100, 200"),
            Some(Reading::Pair {
                x: 100.0,
                y: 200.0,
                hint: CrsHint::Planar,
            })
        );
        // A bare WGS84 prefix names the geographic system, whatever the magnitudes.
        assert_eq!(
            extract("WGS84: 735712, 3563829"),
            Some(Reading::Pair {
                x: 735712.0,
                y: 3563829.0,
                hint: CrsHint::Geographic,
            })
        );
        assert_eq!(
            extract("PROJ 35.5 32.2"),
            Some(Reading::Pair {
                x: 35.5,
                y: 32.2,
                hint: CrsHint::Unknown,
            })
        );
        assert_close(
            parse_coordinate("WGS84: 35.5, 32.2").unwrap(),
            735656.897,
            3565345.245,
        );
        // A planar hint keeps small numbers that would otherwise look like degrees.
        assert_eq!(
            parse_coordinate("EPSG:32636 100, 200").unwrap(),
            Point::new(100.0, 200.0)
        );
        assert_close(
            parse_coordinate("EPSG:4326 35.5, 32.2").unwrap(),
            735656.897,
            3565345.245,
        );
    }

    #[test]
    fn test_rounding_is_half_even() {
        let p = parse_coordinate("735712.5/3563829.5").unwrap();
        assert_eq!(p, Point::new(735712.0, 3563830.0));
        let p = parse_coordinate("735713.5/3563828.49").unwrap();
        assert_eq!(p, Point::new(735714.0, 3563828.0));

        let exact = CoordinateParser::new(ParserSettings {
            rounding: Rounding::Exact,
            ..Default::default()
        });
        assert_eq!(
            exact.parse("735712.5/3563829.5").unwrap(),
            Point::new(735712.5, 3563829.5)
        );
    }

    #[test]
    fn test_envelope_is_configurable() {
        let narrow = CoordinateParser::new(ParserSettings {
            envelope: UtmEnvelope {
                easting_min: 100.0,
                easting_max: 1000.0,
                northing_min: 0.0,
                northing_max: 1000.0,
            },
            ..Default::default()
        });
        // Inside the custom envelope, so kept planar instead of reprojected.
        assert_eq!(narrow.parse("120/80").unwrap(), Point::new(120.0, 80.0));
    }

    #[test]
    fn test_lenient_degradation_passes_input_through() {
        let parser = CoordinateParser::with_reprojector(
            ParserSettings {
                rounding: Rounding::Exact,
                ..Default::default()
            },
            Reprojector::with_transform(Arc::new(Broken)),
        );
        assert_eq!(parser.parse("35.5,32.2").unwrap(), Point::new(35.5, 32.2));
        assert_eq!(parser.reprojector().degradations(), 1);

        // Rounding applies to projected output only, not to the passthrough.
        let rounded = CoordinateParser::with_reprojector(
            ParserSettings::default(),
            Reprojector::with_transform(Arc::new(Broken)),
        );
        assert_eq!(rounded.parse("35.5,32.2").unwrap(), Point::new(35.5, 32.2));
        assert_eq!(
            rounded.parse("735712.5/3563829.5").unwrap(),
            Point::new(735712.0, 3563830.0)
        );
        // Planar input never touches the transform.
        assert_eq!(
            parser.parse("735712/3563829").unwrap(),
            Point::new(735712.0, 3563829.0)
        );
        assert_eq!(parser.reprojector().degradations(), 1);
    }

    #[test]
    fn test_strict_degradation_is_an_error() {
        let parser = CoordinateParser::with_reprojector(
            ParserSettings::default(),
            Reprojector::with_transform(Arc::new(Broken)).with_policy(DegradationPolicy::Strict),
        );
        let err = parser.parse("35.5,32.2").unwrap_err();
        assert!(matches!(err, ParseError::Projection { .. }));
        assert!(err.to_string().contains("35.5,32.2"));
    }
}
