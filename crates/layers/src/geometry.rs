use foundation::bounds::Aabb2;
use serde::{Deserialize, Serialize};

/// Spatial shape attached to a feature. Coordinates are `[x, y]` in map units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Point { x: f64, y: f64 },
    Multipoint { points: Vec<[f64; 2]> },
    Polyline { paths: Vec<Vec<[f64; 2]>> },
    Polygon { rings: Vec<Vec<[f64; 2]>> },
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point { x, y }
    }

    /// Bounding extent, or `None` when the geometry has no vertices.
    pub fn extent(&self) -> Option<Aabb2> {
        match self {
            Geometry::Point { x, y } => Some(Aabb2::new([*x, *y], [*x, *y])),
            Geometry::Multipoint { points } => Aabb2::from_points(points),
            Geometry::Polyline { paths } => Aabb2::from_points(paths.iter().flatten()),
            Geometry::Polygon { rings } => Aabb2::from_points(rings.iter().flatten()),
        }
    }
}
