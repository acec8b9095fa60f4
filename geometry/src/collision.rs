//! Point, circle, segment and rectangle collision tests.
//!
//! Circle tests are inclusive: a point exactly `radius` away from the centre
//! collides.

use garden_defence_core::{Point, Rect};

/// Reports whether `point` lies within `radius` of `center`.
#[must_use]
pub fn point_in_circle(point: Point, center: Point, radius: i32) -> bool {
    let radius = i64::from(radius);
    point.distance_squared(center) <= radius * radius
}

/// Reports whether the segment from `start` to `end` passes within `radius`
/// of `center`.
///
/// The centre is projected onto the segment's supporting line, the projection
/// is clamped to the segment, and the clamped point is compared against the
/// radius.
#[must_use]
pub fn segment_hits_circle(start: Point, end: Point, center: Point, radius: i32) -> bool {
    let radius = f64::from(radius);
    distance_squared_to_segment(center, start, end) <= radius * radius
}

/// Squared distance from `point` to the closest point of the segment.
#[must_use]
pub fn distance_squared_to_segment(point: Point, start: Point, end: Point) -> f64 {
    let (sx, sy) = (f64::from(start.x()), f64::from(start.y()));
    let (dx, dy) = (f64::from(end.x()) - sx, f64::from(end.y()) - sy);
    let (px, py) = (f64::from(point.x()), f64::from(point.y()));

    let length_squared = dx * dx + dy * dy;
    let t = if length_squared == 0.0 {
        0.0
    } else {
        (((px - sx) * dx + (py - sy) * dy) / length_squared).clamp(0.0, 1.0)
    };

    let (cx, cy) = (sx + t * dx, sy + t * dy);
    (px - cx) * (px - cx) + (py - cy) * (py - cy)
}

/// Reports whether two closed segments share at least one point.
#[must_use]
pub fn segments_intersect(a: (Point, Point), b: (Point, Point)) -> bool {
    let d1 = orientation(b.0, b.1, a.0);
    let d2 = orientation(b.0, b.1, a.1);
    let d3 = orientation(a.0, a.1, b.0);
    let d4 = orientation(a.0, a.1, b.1);

    if ((d1 > 0 && d2 < 0) || (d1 < 0 && d2 > 0)) && ((d3 > 0 && d4 < 0) || (d3 < 0 && d4 > 0))
    {
        return true;
    }

    (d1 == 0 && on_segment(b, a.0))
        || (d2 == 0 && on_segment(b, a.1))
        || (d3 == 0 && on_segment(a, b.0))
        || (d4 == 0 && on_segment(a, b.1))
}

/// Squared distance between the closest points of two segments.
#[must_use]
pub fn segment_distance_squared(a: (Point, Point), b: (Point, Point)) -> f64 {
    if segments_intersect(a, b) {
        return 0.0;
    }

    [
        distance_squared_to_segment(a.0, b.0, b.1),
        distance_squared_to_segment(a.1, b.0, b.1),
        distance_squared_to_segment(b.0, a.0, a.1),
        distance_squared_to_segment(b.1, a.0, a.1),
    ]
    .into_iter()
    .fold(f64::INFINITY, f64::min)
}

/// Reports whether any of the rectangle's corners or its centre lies inside
/// the hitbox.
///
/// This is the coarse projectile test: a projectile's bounding box collides
/// with a unit when one of those five sample points touches the unit's hitbox.
#[must_use]
pub fn rect_touches_hitbox(probe: &Rect, hitbox: &Rect) -> bool {
    probe
        .corners()
        .into_iter()
        .chain(std::iter::once(probe.center()))
        .any(|point| hitbox.contains(point))
}

fn orientation(origin: Point, towards: Point, point: Point) -> i64 {
    let ax = i64::from(towards.x()) - i64::from(origin.x());
    let ay = i64::from(towards.y()) - i64::from(origin.y());
    let bx = i64::from(point.x()) - i64::from(origin.x());
    let by = i64::from(point.y()) - i64::from(origin.y());
    (ax * by - ay * bx).signum()
}

fn on_segment(segment: (Point, Point), point: Point) -> bool {
    let (start, end) = segment;
    point.x() >= start.x().min(end.x())
        && point.x() <= start.x().max(end.x())
        && point.y() >= start.y().min(end.y())
        && point.y() <= start.y().max(end.y())
}
