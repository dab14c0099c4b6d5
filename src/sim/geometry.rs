//! Geometry primitives for collision detection
//!
//! Screen space: x grows to the right, y grows downward. Every comparison that
//! decides whether a point lies on a segment uses `EPSILON`, since positions are
//! produced by repeated trigonometric transforms and drift slightly.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::EPSILON;
use crate::error::GeometryError;

/// A point in screen space.
///
/// Equality is tolerant: two points are equal when both coordinates are within
/// `EPSILON` of each other. This relation is not transitive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Checked constructor for untrusted input
    pub fn try_new(x: f64, y: f64) -> Result<Self, GeometryError> {
        if x.is_finite() && y.is_finite() {
            Ok(Self { x, y })
        } else {
            Err(GeometryError::NonFinite { x, y })
        }
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn as_vec(self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Euclidean distance. Non-finite input is a programmer error.
    pub fn distance(self, other: Point) -> f64 {
        debug_assert!(
            self.is_finite() && other.is_finite(),
            "distance between non-finite points {self:?} and {other:?}"
        );
        self.as_vec().distance(other.as_vec())
    }

    #[inline]
    pub fn translated(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }
}

impl From<DVec2> for Point {
    fn from(v: DVec2) -> Self {
        Point::new(v.x, v.y)
    }
}

impl From<Point> for DVec2 {
    fn from(p: Point) -> Self {
        p.as_vec()
    }
}

/// A line segment, canonicalized so that `start` is the endpoint with the lower x.
///
/// When both endpoints share an x, the first argument given stays the start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    start: Point,
    end: Point,
}

impl Segment {
    pub fn new(a: Point, b: Point) -> Self {
        if a.x <= b.x {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Checked constructor for untrusted input
    pub fn try_new(a: Point, b: Point) -> Result<Self, GeometryError> {
        let a = Point::try_new(a.x, a.y)?;
        let b = Point::try_new(b.x, b.y)?;
        Ok(Self::new(a, b))
    }

    #[inline]
    pub fn start(&self) -> Point {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Exact test: a vertical segment has no slope
    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.start.x == self.end.x
    }

    /// Slope of the supporting line, `None` when vertical
    pub fn slope(&self) -> Option<f64> {
        if self.is_vertical() {
            None
        } else {
            Some((self.end.y - self.start.y) / (self.end.x - self.start.x))
        }
    }

    /// y-intercept of the supporting line for a known slope
    #[inline]
    fn intercept(&self, slope: f64) -> f64 {
        self.start.y - slope * self.start.x
    }

    /// Whether `x` lies within the segment's horizontal extent (with tolerance)
    pub fn in_x_range(&self, x: f64) -> bool {
        self.start.x - EPSILON <= x && x <= self.end.x + EPSILON
    }

    /// Whether `y` lies within the segment's vertical extent (with tolerance)
    pub fn in_y_range(&self, y: f64) -> bool {
        let (low, high) = if self.start.y <= self.end.y {
            (self.start.y, self.end.y)
        } else {
            (self.end.y, self.start.y)
        };
        low - EPSILON <= y && y <= high + EPSILON
    }

    /// Whether a point already known to be on the supporting line lies within the segment
    pub fn covers(&self, p: Point) -> bool {
        self.in_x_range(p.x) && self.in_y_range(p.y)
    }

    /// Intersection point of two segments, if any.
    ///
    /// Vertical segments are handled without computing a slope. Parallel
    /// segments (equal slopes, or both vertical) never intersect, except two
    /// segments that both collapse to the same point. Every candidate must lie
    /// within both segments' extents.
    pub fn intersection(&self, other: &Segment) -> Option<Point> {
        let candidate = match (self.slope(), other.slope()) {
            (None, None) => return self.shared_point(other),
            (None, Some(m)) => {
                let x = self.start.x;
                Point::new(x, m * x + other.intercept(m))
            }
            (Some(m), None) => {
                let x = other.start.x;
                Point::new(x, m * x + self.intercept(m))
            }
            (Some(m1), Some(m2)) => {
                if m1 == m2 {
                    return None;
                }
                let b1 = self.intercept(m1);
                let b2 = other.intercept(m2);
                let x = (b2 - b1) / (m1 - m2);
                // Evaluate y on the flatter line; the choice is independent of
                // argument order so the result is symmetric.
                let (m, b) = if (m1.abs(), m1) < (m2.abs(), m2) {
                    (m1, b1)
                } else {
                    (m2, b2)
                };
                Point::new(x, m * x + b)
            }
        };

        (self.covers(candidate) && other.covers(candidate)).then_some(candidate)
    }

    /// Two vertical segments meet only when both degenerate to the same point
    fn shared_point(&self, other: &Segment) -> Option<Point> {
        let degenerate = self.start == self.end && other.start == other.end;
        (degenerate && self.start == other.start).then_some(self.start)
    }

    pub fn intersects(&self, other: &Segment) -> bool {
        self.intersection(other).is_some()
    }

    /// Nearest intersection with the rectangle's edges, measured from `start`.
    ///
    /// Edges are tested left, right, upper, lower; on equal distance the
    /// earlier edge wins.
    pub fn nearest_intersection_from_start(&self, rect: &Aabb) -> Option<Point> {
        self.nearest_intersection_to(rect, self.start)
    }

    /// Nearest intersection with the rectangle's edges, measured from `origin`
    pub fn nearest_intersection_to(&self, rect: &Aabb, origin: Point) -> Option<Point> {
        let mut nearest: Option<(Point, f64)> = None;
        for edge in rect.edges() {
            if let Some(hit) = self.intersection(&edge) {
                let dist = origin.distance(hit);
                match nearest {
                    Some((_, best)) if best <= dist => {}
                    _ => nearest = Some((hit, dist)),
                }
            }
        }
        nearest.map(|(p, _)| p)
    }
}

/// Axis-aligned rectangle described by its upper-left corner and size.
///
/// Edges are produced on demand, so they always reflect the current size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    upper_left: Point,
    width: f64,
    height: f64,
}

impl Aabb {
    pub fn new(upper_left: Point, width: f64, height: f64) -> Self {
        Self {
            upper_left,
            width,
            height,
        }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), width, height)
    }

    #[inline]
    pub fn upper_left(&self) -> Point {
        self.upper_left
    }

    pub fn set_upper_left(&mut self, upper_left: Point) {
        self.upper_left = upper_left;
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.upper_left.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.upper_left.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.upper_left.x + self.width / 2.0,
            self.upper_left.y + self.height / 2.0,
        )
    }

    pub fn left_edge(&self) -> Segment {
        let ul = self.upper_left;
        Segment::new(ul, Point::new(ul.x, self.bottom()))
    }

    pub fn right_edge(&self) -> Segment {
        let right = self.right();
        Segment::new(
            Point::new(right, self.upper_left.y),
            Point::new(right, self.bottom()),
        )
    }

    pub fn upper_edge(&self) -> Segment {
        let ul = self.upper_left;
        Segment::new(ul, Point::new(self.right(), ul.y))
    }

    pub fn lower_edge(&self) -> Segment {
        let bottom = self.bottom();
        Segment::new(
            Point::new(self.upper_left.x, bottom),
            Point::new(self.right(), bottom),
        )
    }

    /// Edges in test order: left, right, upper, lower
    pub fn edges(&self) -> [Segment; 4] {
        [
            self.left_edge(),
            self.right_edge(),
            self.upper_edge(),
            self.lower_edge(),
        ]
    }

    /// Every edge intersection with `segment`, in edge test order
    pub fn intersection_points(&self, segment: &Segment) -> Vec<Point> {
        self.edges()
            .iter()
            .filter_map(|edge| segment.intersection(edge))
            .collect()
    }

    /// Whether `x` falls within the horizontal span (with tolerance)
    pub fn spans_x(&self, x: f64) -> bool {
        self.upper_edge().in_x_range(x)
    }

    /// Whether `y` falls within the vertical span (with tolerance)
    pub fn spans_y(&self, y: f64) -> bool {
        self.left_edge().in_y_range(y)
    }

    /// Strict interior test (points on the boundary are outside)
    pub fn contains_strictly(&self, p: Point) -> bool {
        p.x > self.upper_left.x
            && p.x < self.right()
            && p.y > self.upper_left.y
            && p.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> Aabb {
        Aabb::from_xywh(380.0, 100.0, 40.0, 20.0)
    }

    #[test]
    fn test_point_tolerant_equality() {
        assert_eq!(Point::new(1.0, 1.0), Point::new(1.005, 0.995));
        assert_ne!(Point::new(1.0, 1.0), Point::new(1.01, 1.0));
    }

    #[test]
    fn test_point_try_new_rejects_nan() {
        assert!(Point::try_new(f64::NAN, 0.0).is_err());
        assert!(Point::try_new(0.0, f64::INFINITY).is_err());
        assert!(Point::try_new(3.0, 4.0).is_ok());
    }

    #[test]
    fn test_segment_canonical_order() {
        let seg = Segment::from_coords(10.0, 5.0, 2.0, 7.0);
        assert_eq!(seg.start(), Point::new(2.0, 7.0));
        assert_eq!(seg.end(), Point::new(10.0, 5.0));

        let same = Segment::new(Point::new(2.0, 7.0), Point::new(10.0, 5.0));
        assert_eq!(seg, same);
    }

    #[test]
    fn test_segment_length_and_midpoint() {
        let seg = Segment::from_coords(0.0, 0.0, 3.0, 4.0);
        assert!((seg.length() - 5.0).abs() < 1e-12);
        assert_eq!(seg.midpoint(), Point::new(1.5, 2.0));
    }

    #[test]
    fn test_vertical_segment_has_no_slope() {
        let seg = Segment::from_coords(5.0, 0.0, 5.0, 10.0);
        assert!(seg.is_vertical());
        assert_eq!(seg.slope(), None);
        assert_eq!(Segment::from_coords(0.0, 0.0, 2.0, 4.0).slope(), Some(2.0));
    }

    #[test]
    fn test_crossing_segments_intersect() {
        let a = Segment::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = Segment::from_coords(0.0, 10.0, 10.0, 0.0);
        assert_eq!(a.intersection(&b), Some(Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_one_vertical_intersects() {
        let vertical = Segment::from_coords(4.0, -10.0, 4.0, 10.0);
        let sloped = Segment::from_coords(0.0, 0.0, 8.0, 4.0);
        assert_eq!(vertical.intersection(&sloped), Some(Point::new(4.0, 2.0)));
        assert_eq!(sloped.intersection(&vertical), Some(Point::new(4.0, 2.0)));
    }

    #[test]
    fn test_vertical_out_of_range_misses() {
        let vertical = Segment::from_coords(4.0, 5.0, 4.0, 10.0);
        let sloped = Segment::from_coords(0.0, 0.0, 8.0, 4.0);
        assert_eq!(vertical.intersection(&sloped), None);
    }

    #[test]
    fn test_parallel_segments_do_not_intersect() {
        let a = Segment::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = Segment::from_coords(0.0, 1.0, 10.0, 11.0);
        assert_eq!(a.intersection(&b), None);

        // Collinear overlap is treated as parallel too
        let c = Segment::from_coords(5.0, 5.0, 15.0, 15.0);
        assert_eq!(a.intersection(&c), None);
    }

    #[test]
    fn test_two_verticals() {
        let a = Segment::from_coords(3.0, 0.0, 3.0, 10.0);
        let b = Segment::from_coords(3.0, 5.0, 3.0, 15.0);
        assert_eq!(a.intersection(&b), None);

        let dot = Segment::from_coords(3.0, 3.0, 3.0, 3.0);
        let same_dot = Segment::from_coords(3.0, 3.001, 3.0, 3.0);
        assert_eq!(dot.intersection(&same_dot), Some(Point::new(3.0, 3.0)));
    }

    #[test]
    fn test_line_hit_outside_extent_is_rejected() {
        // Supporting lines cross at (5, 5), but `b` stops short of it
        let a = Segment::from_coords(0.0, 0.0, 10.0, 10.0);
        let b = Segment::from_coords(0.0, 10.0, 4.0, 6.0);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn test_touching_endpoint_within_tolerance() {
        let a = Segment::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = Segment::from_coords(10.005, -5.0, 10.005, 5.0);
        assert!(a.intersects(&b));
    }

    #[test]
    fn test_rect_edges_follow_size_changes() {
        let mut r = rect();
        assert_eq!(r.right_edge().start(), Point::new(420.0, 100.0));
        r.set_width(60.0);
        assert_eq!(r.right_edge().start(), Point::new(440.0, 100.0));
        r.set_upper_left(Point::new(0.0, 0.0));
        assert_eq!(r.lower_edge().end(), Point::new(60.0, 20.0));
    }

    #[test]
    fn test_nearest_intersection_outside_rect() {
        let seg = Segment::from_coords(0.0, 0.0, 100.0, 50.0);
        assert_eq!(seg.nearest_intersection_from_start(&rect()), None);
    }

    #[test]
    fn test_nearest_intersection_single_edge() {
        // Upward trajectory entering through the lower edge only
        let seg = Segment::from_coords(400.0, 130.0, 400.0, 115.0);
        let hit = seg.nearest_intersection_from_start(&rect());
        assert_eq!(hit, Some(Point::new(400.0, 120.0)));
        assert_eq!(hit, seg.intersection(&rect().lower_edge()));
    }

    #[test]
    fn test_nearest_intersection_picks_closest_edge() {
        // Passes through left edge (x=380) and right edge (x=420)
        let seg = Segment::from_coords(300.0, 110.0, 500.0, 110.0);
        assert_eq!(
            seg.nearest_intersection_from_start(&rect()),
            Some(Point::new(380.0, 110.0))
        );
        assert_eq!(
            seg.nearest_intersection_to(&rect(), Point::new(500.0, 110.0)),
            Some(Point::new(420.0, 110.0))
        );
    }

    #[test]
    fn test_corner_tie_goes_to_left_edge() {
        // Diagonal through the upper-left corner touches left and upper edges at one point
        let r = Aabb::from_xywh(10.0, 10.0, 10.0, 10.0);
        let seg = Segment::from_coords(0.0, 0.0, 10.0, 10.0);
        let hits = r.intersection_points(&seg);
        assert_eq!(hits.len(), 2);
        assert_eq!(seg.nearest_intersection_from_start(&r), Some(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_contains_strictly() {
        let r = rect();
        assert!(r.contains_strictly(Point::new(400.0, 110.0)));
        assert!(!r.contains_strictly(Point::new(400.0, 120.0)));
        assert!(!r.contains_strictly(Point::new(379.0, 110.0)));
    }
}
