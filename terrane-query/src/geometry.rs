//! Polygon geometry and bounding boxes.
//!
//! Spatial predicates and spatial row values are the one place the engine
//! inlines data into SQL text instead of binding a parameter: the
//! `geometry` column type cannot be carried as a simple bound parameter.
//! The safety of that exception rests entirely on this module: WKT text
//! is rendered from stored `f64` coordinates and fixed punctuation only,
//! and the JSON intake accepts nothing but finite numbers. No caller
//! string ever reaches the SQL text.
//!
//! ```rust
//! use terrane_query::geometry::Polygon;
//!
//! let json = serde_json::json!({
//!     "srid": 4326,
//!     "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 5.0], [0.0, 0.0]]]
//! });
//! let polygon = Polygon::from_json(&json).unwrap();
//! assert_eq!(polygon.to_wkt(), "POLYGON ((0 0, 10 0, 10 5, 0 0))");
//! assert_eq!(
//!     polygon.to_sql(),
//!     "geometry::STGeomFromText('POLYGON ((0 0, 10 0, 10 5, 0 0))', 4326)"
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::error::{StatementError, StatementResult};

/// Default spatial reference identifier (WGS 84).
pub const DEFAULT_SRID: i32 = 4326;

/// A polygon: one or more rings of planar vertices, plus an SRID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    srid: i32,
    rings: Vec<Vec<(f64, f64)>>,
}

impl Polygon {
    /// Create an empty polygon with the given SRID.
    pub fn new(srid: i32) -> Self {
        Self {
            srid,
            rings: Vec::new(),
        }
    }

    /// Append a ring of vertices.
    pub fn push_ring(&mut self, ring: Vec<(f64, f64)>) {
        self.rings.push(ring);
    }

    /// Builder-style [`push_ring`](Self::push_ring).
    pub fn with_ring(mut self, ring: Vec<(f64, f64)>) -> Self {
        self.push_ring(ring);
        self
    }

    /// Parse a polygon from its JSON representation.
    ///
    /// Expected shape: `{"srid": 4326, "coordinates": [[[x, y], ...], ...]}`
    /// where `coordinates` is a list of rings and every vertex is a pair of
    /// finite numbers. `srid` is optional and defaults to [`DEFAULT_SRID`].
    /// Anything else is rejected; this is the trust boundary for the
    /// inlined-WKT exception.
    pub fn from_json(value: &serde_json::Value) -> StatementResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| StatementError::invalid_geometry("expected a JSON object"))?;

        let srid = match object.get("srid") {
            None => DEFAULT_SRID,
            Some(v) => v
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| StatementError::invalid_geometry("srid must be an integer"))?,
        };

        let rings_json = object
            .get("coordinates")
            .and_then(|v| v.as_array())
            .ok_or_else(|| StatementError::invalid_geometry("missing coordinates array"))?;
        if rings_json.is_empty() {
            return Err(StatementError::invalid_geometry("polygon has no rings"));
        }

        let mut polygon = Self::new(srid);
        for ring_json in rings_json {
            let vertices_json = ring_json
                .as_array()
                .ok_or_else(|| StatementError::invalid_geometry("ring must be an array"))?;
            if vertices_json.is_empty() {
                return Err(StatementError::invalid_geometry("ring has no vertices"));
            }
            let mut ring = Vec::with_capacity(vertices_json.len());
            for vertex_json in vertices_json {
                ring.push(parse_vertex(vertex_json)?);
            }
            polygon.push_ring(ring);
        }
        Ok(polygon)
    }

    /// The spatial reference identifier.
    pub fn srid(&self) -> i32 {
        self.srid
    }

    /// Whether the polygon has no rings.
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Render well-known text: `POLYGON ((x y, x y, ...), (...))`.
    ///
    /// Output is built from stored coordinates and fixed punctuation only.
    pub fn to_wkt(&self) -> String {
        if self.rings.is_empty() {
            return "POLYGON EMPTY".to_string();
        }
        let mut wkt = String::from("POLYGON (");
        for (i, ring) in self.rings.iter().enumerate() {
            if i > 0 {
                wkt.push_str(", ");
            }
            wkt.push('(');
            for (j, (x, y)) in ring.iter().enumerate() {
                if j > 0 {
                    wkt.push_str(", ");
                }
                let _ = write!(wkt, "{} {}", x, y);
            }
            wkt.push(')');
        }
        wkt.push(')');
        wkt
    }

    /// Render the inline SQL expression
    /// `geometry::STGeomFromText('<wkt>', <srid>)`.
    pub fn to_sql(&self) -> String {
        format!("geometry::STGeomFromText('{}', {})", self.to_wkt(), self.srid)
    }
}

fn parse_vertex(value: &serde_json::Value) -> StatementResult<(f64, f64)> {
    let pair = value
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| StatementError::invalid_geometry("vertex must be an [x, y] pair"))?;
    let x = pair[0]
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| StatementError::invalid_geometry("coordinate must be a finite number"))?;
    let y = pair[1]
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| StatementError::invalid_geometry("coordinate must be a finite number"))?;
    Ok((x, y))
}

/// An axis-aligned bounding box in the polygon's coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum X.
    pub min_x: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a bounding box from its extents.
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }
}
