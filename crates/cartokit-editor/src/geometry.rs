//! Geometry values drawn on the map.
//!
//! A [`Geometry`] is a plain value: cloning it copies every coordinate, so two
//! features (or a feature and an undo record) never observe each other's edits.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    fn of_point(p: &Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn extend_point(&mut self, p: &Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Type tag of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    LinearRing,
    Polygon,
    MultiPolygon,
    Circle,
    GeometryCollection,
}

impl GeometryKind {
    pub const ALL: [GeometryKind; 9] = [
        GeometryKind::Point,
        GeometryKind::MultiPoint,
        GeometryKind::LineString,
        GeometryKind::MultiLineString,
        GeometryKind::LinearRing,
        GeometryKind::Polygon,
        GeometryKind::MultiPolygon,
        GeometryKind::Circle,
        GeometryKind::GeometryCollection,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::MultiPoint => "MultiPoint",
            GeometryKind::LineString => "LineString",
            GeometryKind::MultiLineString => "MultiLineString",
            GeometryKind::LinearRing => "LinearRing",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::MultiPolygon => "MultiPolygon",
            GeometryKind::Circle => "Circle",
            GeometryKind::GeometryCollection => "GeometryCollection",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Option<GeometryKind> {
        GeometryKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn is_point(&self) -> bool {
        matches!(self, GeometryKind::Point | GeometryKind::MultiPoint)
    }

    pub fn is_line(&self) -> bool {
        matches!(self, GeometryKind::LineString | GeometryKind::MultiLineString)
    }

    pub fn is_area(&self) -> bool {
        matches!(
            self,
            GeometryKind::Polygon | GeometryKind::MultiPolygon | GeometryKind::Circle
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    MultiPoint(Vec<Point>),
    LineString(Vec<Point>),
    MultiLineString(Vec<Vec<Point>>),
    LinearRing(Vec<Point>),
    /// Exterior ring first, then holes.
    Polygon(Vec<Vec<Point>>),
    MultiPolygon(Vec<Vec<Vec<Point>>>),
    Circle { center: Point, radius: f64 },
    GeometryCollection(Vec<Geometry>),
}

impl Geometry {
    pub fn point(x: f64, y: f64) -> Self {
        Geometry::Point(Point::new(x, y))
    }

    pub fn line(coords: &[(f64, f64)]) -> Self {
        Geometry::LineString(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// Single-ring polygon; the ring is closed if the last point differs from the first.
    pub fn polygon(coords: &[(f64, f64)]) -> Self {
        let mut ring: Vec<Point> = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
            if first != last {
                ring.push(first);
            }
        }
        Geometry::Polygon(vec![ring])
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::LinearRing(_) => GeometryKind::LinearRing,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Geometry::Circle { .. } => GeometryKind::Circle,
            Geometry::GeometryCollection(_) => GeometryKind::GeometryCollection,
        }
    }

    /// Bounding box, or `None` for an empty geometry.
    pub fn extent(&self) -> Option<Extent> {
        match self {
            Geometry::Circle { center, radius } => Some(Extent::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            )),
            Geometry::GeometryCollection(children) => children
                .iter()
                .filter_map(Geometry::extent)
                .reduce(|a, b| a.union(&b)),
            _ => {
                let mut extent: Option<Extent> = None;
                self.for_each_point(&mut |p| {
                    extent.get_or_insert_with(|| Extent::of_point(p)).extend_point(p);
                });
                extent
            }
        }
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.for_each_point_mut(&mut |p| {
            p.x += dx;
            p.y += dy;
        });
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Geometry {
        let mut copy = self.clone();
        copy.translate(dx, dy);
        copy
    }

    /// Number of coordinates, circles count as one.
    pub fn coordinate_count(&self) -> usize {
        let mut count = 0;
        self.for_each_point(&mut |_| count += 1);
        count
    }

    pub fn for_each_point(&self, f: &mut dyn FnMut(&Point)) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::Circle { center, .. } => f(center),
            Geometry::MultiPoint(points) | Geometry::LineString(points) | Geometry::LinearRing(points) => {
                points.iter().for_each(|p| f(p))
            }
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter().flatten().for_each(|p| f(p))
            }
            Geometry::MultiPolygon(polygons) => polygons.iter().flatten().flatten().for_each(|p| f(p)),
            Geometry::GeometryCollection(children) => {
                for child in children {
                    child.for_each_point(f);
                }
            }
        }
    }

    pub fn for_each_point_mut(&mut self, f: &mut dyn FnMut(&mut Point)) {
        match self {
            Geometry::Point(p) => f(p),
            Geometry::Circle { center, .. } => f(center),
            Geometry::MultiPoint(points) | Geometry::LineString(points) | Geometry::LinearRing(points) => {
                points.iter_mut().for_each(|p| f(p))
            }
            Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
                lines.iter_mut().flatten().for_each(|p| f(p))
            }
            Geometry::MultiPolygon(polygons) => polygons
                .iter_mut()
                .flatten()
                .flatten()
                .for_each(|p| f(p)),
            Geometry::GeometryCollection(children) => {
                for child in children {
                    child.for_each_point_mut(f);
                }
            }
        }
    }
}
