//! GeoJSON-shaped geometry literals.
//!
//! Geometries are opaque to the engine: nothing here computes spatial
//! relationships. The module only moves values between the three shapes the
//! crate speaks: GeoJSON objects (CQL2-JSON), WKT text (CQL2-Text) and the
//! typed [`Geometry`] tree.

use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::ast::MAX_NESTING;
use crate::value::{format_number, number_to_json};

/// Two or three coordinates.
pub type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Position),
    LineString(Vec<Position>),
    Polygon(Vec<Vec<Position>>),
    MultiPoint(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
    GeometryCollection(Vec<Geometry>),
    /// Bounding box: `[minx, miny, maxx, maxy]` or the 3D six-number form.
    Envelope(Vec<f64>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("geometry must be a JSON object")]
    NotAnObject,

    #[error("geometry is missing its \"type\" member")]
    MissingType,

    #[error("unknown geometry type '{0}'")]
    UnknownType(String),

    #[error("{kind}: {message}")]
    BadCoordinates { kind: String, message: String },

    #[error("bounding box needs 4 or 6 numbers, got {0}")]
    BadEnvelope(usize),

    #[error("geometry contains a non-finite coordinate")]
    NonFinite,

    #[error("{0} contains an empty ring, line or polygon")]
    EmptyPart(String),

    #[error("geometry collections nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

impl GeometryError {
    fn coordinates(kind: &str, message: impl Into<String>) -> Self {
        GeometryError::BadCoordinates {
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}

/// WKT keywords accepted in CQL2-Text, upper-case.
pub const WKT_KEYWORDS: [&str; 7] = [
    "POINT",
    "LINESTRING",
    "POLYGON",
    "MULTIPOINT",
    "MULTILINESTRING",
    "MULTIPOLYGON",
    "GEOMETRYCOLLECTION",
];

impl Geometry {
    /// GeoJSON `type` member (`"BBox"` for envelopes, which have no
    /// GeoJSON type of their own).
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
            Geometry::Envelope(_) => "BBox",
        }
    }

    /// Builds an envelope, checking the 4/6 number rule.
    pub fn envelope(bounds: Vec<f64>) -> Result<Self, GeometryError> {
        match bounds.len() {
            4 | 6 => Ok(Geometry::Envelope(bounds)),
            n => Err(GeometryError::BadEnvelope(n)),
        }
    }

    /// The empty geometry of a WKT kind (`LINESTRING EMPTY`, ...). Points and
    /// envelopes have no empty form.
    pub fn empty(kind: &str) -> Option<Self> {
        let geometry = match kind {
            "LINESTRING" => Geometry::LineString(Vec::new()),
            "POLYGON" => Geometry::Polygon(Vec::new()),
            "MULTIPOINT" => Geometry::MultiPoint(Vec::new()),
            "MULTILINESTRING" => Geometry::MultiLineString(Vec::new()),
            "MULTIPOLYGON" => Geometry::MultiPolygon(Vec::new()),
            "GEOMETRYCOLLECTION" => Geometry::GeometryCollection(Vec::new()),
            _ => return None,
        };
        Some(geometry)
    }

    /// True when the geometry has no parts at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Geometry::Point(_) | Geometry::Envelope(_) => false,
            Geometry::LineString(ps) | Geometry::MultiPoint(ps) => ps.is_empty(),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => rings.is_empty(),
            Geometry::MultiPolygon(polygons) => polygons.is_empty(),
            Geometry::GeometryCollection(members) => members.is_empty(),
        }
    }

    /// Checks that the geometry can be written in both GeoJSON and WKT:
    /// finite coordinates, a 2 or 3 number point, a 4 or 6 number envelope,
    /// no empty ring, line or polygon below the top level, and collections
    /// nested at most [`MAX_NESTING`] deep.
    pub fn validate(&self) -> Result<(), GeometryError> {
        self.validate_at(0)
    }

    fn validate_at(&self, depth: usize) -> Result<(), GeometryError> {
        if let Geometry::GeometryCollection(members) = self {
            if depth >= MAX_NESTING {
                return Err(GeometryError::NestingTooDeep(MAX_NESTING));
            }
            return members.iter().try_for_each(|m| m.validate_at(depth + 1));
        }
        if !self.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        let empty_part = match self {
            Geometry::Point(p) if !(2..=3).contains(&p.len()) => {
                return Err(GeometryError::coordinates(
                    "Point",
                    format!("a position needs 2 or 3 numbers, got {}", p.len()),
                ));
            }
            Geometry::Envelope(bounds) if !matches!(bounds.len(), 4 | 6) => {
                return Err(GeometryError::BadEnvelope(bounds.len()));
            }
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().any(Vec::is_empty)
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .any(|rings| rings.is_empty() || rings.iter().any(Vec::is_empty)),
            _ => false,
        };
        if empty_part {
            return Err(GeometryError::EmptyPart(self.type_name().to_string()));
        }
        Ok(())
    }

    pub fn is_finite(&self) -> bool {
        fn all(positions: &[Position]) -> bool {
            positions.iter().flatten().all(|c| c.is_finite())
        }
        match self {
            Geometry::Point(p) | Geometry::Envelope(p) => p.iter().all(|c| c.is_finite()),
            Geometry::LineString(ps) | Geometry::MultiPoint(ps) => all(ps),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                rings.iter().all(|r| all(r))
            }
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().all(|r| all(r)),
            Geometry::GeometryCollection(members) => members.iter().all(Geometry::is_finite),
        }
    }

    /// Reads a GeoJSON geometry object.
    ///
    /// Foreign members (`bbox`, `crs`, ...) are ignored.
    pub fn from_geojson(value: &Value) -> Result<Self, GeometryError> {
        let geometry = Self::read_geojson(value, 0)?;
        geometry.validate()?;
        Ok(geometry)
    }

    fn read_geojson(value: &Value, depth: usize) -> Result<Self, GeometryError> {
        let object = value.as_object().ok_or(GeometryError::NotAnObject)?;
        let kind = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(GeometryError::MissingType)?;

        if kind == "GeometryCollection" {
            if depth >= MAX_NESTING {
                return Err(GeometryError::NestingTooDeep(MAX_NESTING));
            }
            let members = object
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or_else(|| GeometryError::coordinates(kind, "missing \"geometries\" array"))?;
            return members
                .iter()
                .map(|member| Geometry::read_geojson(member, depth + 1))
                .collect::<Result<Vec<_>, _>>()
                .map(Geometry::GeometryCollection);
        }

        let coordinates = object
            .get("coordinates")
            .ok_or_else(|| GeometryError::coordinates(kind, "missing \"coordinates\" member"))?;

        match kind {
            "Point" => Ok(Geometry::Point(position(kind, coordinates)?)),
            "LineString" => Ok(Geometry::LineString(positions(kind, coordinates)?)),
            "MultiPoint" => Ok(Geometry::MultiPoint(positions(kind, coordinates)?)),
            "Polygon" => Ok(Geometry::Polygon(rings(kind, coordinates)?)),
            "MultiLineString" => Ok(Geometry::MultiLineString(rings(kind, coordinates)?)),
            "MultiPolygon" => array(kind, coordinates)?
                .iter()
                .map(|polygon| rings(kind, polygon))
                .collect::<Result<Vec<_>, _>>()
                .map(Geometry::MultiPolygon),
            other => Err(GeometryError::UnknownType(other.to_string())),
        }
    }

    /// Writes the GeoJSON object; envelopes become `{"bbox": [...]}`.
    pub fn to_geojson(&self) -> Result<Value, GeometryError> {
        self.validate()?;
        Ok(self.write_geojson())
    }

    fn write_geojson(&self) -> Value {
        match self {
            Geometry::Envelope(bounds) => json!({ "bbox": numbers(bounds) }),
            Geometry::GeometryCollection(members) => {
                let geometries: Vec<Value> = members.iter().map(Geometry::write_geojson).collect();
                json!({ "type": self.type_name(), "geometries": geometries })
            }
            _ => {
                let mut object = Map::new();
                object.insert("type".into(), Value::from(self.type_name()));
                object.insert("coordinates".into(), self.coordinates_json());
                Value::Object(object)
            }
        }
    }

    fn coordinates_json(&self) -> Value {
        match self {
            Geometry::Point(p) | Geometry::Envelope(p) => numbers(p),
            Geometry::LineString(ps) | Geometry::MultiPoint(ps) => positions_json(ps),
            Geometry::Polygon(rings) | Geometry::MultiLineString(rings) => {
                Value::Array(rings.iter().map(|r| positions_json(r)).collect())
            }
            Geometry::MultiPolygon(polygons) => Value::Array(
                polygons
                    .iter()
                    .map(|rings| Value::Array(rings.iter().map(|r| positions_json(r)).collect()))
                    .collect(),
            ),
            Geometry::GeometryCollection(_) => Value::Null,
        }
    }

    /// Well-known text, with envelopes as `BBOX(...)` and geometries without
    /// parts as `<KIND> EMPTY`.
    ///
    /// ```
    /// use cql2_lang::Geometry;
    ///
    /// let line = Geometry::LineString(vec![vec![0.0, 0.0], vec![1.5, -2.0]]);
    /// assert_eq!(line.to_wkt(), "LINESTRING(0 0, 1.5 -2)");
    /// ```
    pub fn to_wkt(&self) -> String {
        if self.is_empty() {
            return format!("{} EMPTY", self.type_name().to_ascii_uppercase());
        }
        match self {
            Geometry::Point(p) => format!("POINT({})", wkt_position(p)),
            Geometry::LineString(ps) => format!("LINESTRING{}", wkt_positions(ps)),
            Geometry::Polygon(rings) => format!("POLYGON{}", wkt_rings(rings)),
            Geometry::MultiPoint(ps) => {
                let points: Vec<String> =
                    ps.iter().map(|p| format!("({})", wkt_position(p))).collect();
                format!("MULTIPOINT({})", points.join(", "))
            }
            Geometry::MultiLineString(lines) => format!("MULTILINESTRING{}", wkt_rings(lines)),
            Geometry::MultiPolygon(polygons) => {
                let parts: Vec<String> = polygons.iter().map(|r| wkt_rings(r)).collect();
                format!("MULTIPOLYGON({})", parts.join(", "))
            }
            Geometry::GeometryCollection(members) => {
                let parts: Vec<String> = members.iter().map(Geometry::to_wkt).collect();
                format!("GEOMETRYCOLLECTION({})", parts.join(", "))
            }
            Geometry::Envelope(bounds) => {
                let parts: Vec<String> = bounds.iter().map(|n| format_number(*n)).collect();
                format!("BBOX({})", parts.join(", "))
            }
        }
    }
}

fn numbers(coords: &[f64]) -> Value {
    Value::Array(
        coords
            .iter()
            .map(|n| number_to_json(*n).unwrap_or(Value::Null))
            .collect(),
    )
}

fn positions_json(ps: &[Position]) -> Value {
    Value::Array(ps.iter().map(|p| numbers(p)).collect())
}

fn wkt_position(p: &[f64]) -> String {
    p.iter()
        .map(|n| format_number(*n))
        .collect::<Vec<_>>()
        .join(" ")
}

fn wkt_positions(ps: &[Position]) -> String {
    let parts: Vec<String> = ps.iter().map(|p| wkt_position(p)).collect();
    format!("({})", parts.join(", "))
}

fn wkt_rings(rings: &[Vec<Position>]) -> String {
    let parts: Vec<String> = rings.iter().map(|r| wkt_positions(r)).collect();
    format!("({})", parts.join(", "))
}

fn array<'a>(kind: &str, value: &'a Value) -> Result<&'a Vec<Value>, GeometryError> {
    value
        .as_array()
        .ok_or_else(|| GeometryError::coordinates(kind, "expected an array of coordinates"))
}

fn position(kind: &str, value: &Value) -> Result<Position, GeometryError> {
    let coords = array(kind, value)?
        .iter()
        .map(|c| {
            c.as_f64()
                .ok_or_else(|| GeometryError::coordinates(kind, "coordinates must be numbers"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if !(2..=3).contains(&coords.len()) {
        return Err(GeometryError::coordinates(
            kind,
            format!("a position needs 2 or 3 numbers, got {}", coords.len()),
        ));
    }
    Ok(coords)
}

fn positions(kind: &str, value: &Value) -> Result<Vec<Position>, GeometryError> {
    array(kind, value)?
        .iter()
        .map(|p| position(kind, p))
        .collect()
}

fn rings(kind: &str, value: &Value) -> Result<Vec<Vec<Position>>, GeometryError> {
    array(kind, value)?
        .iter()
        .map(|r| positions(kind, r))
        .collect()
}
