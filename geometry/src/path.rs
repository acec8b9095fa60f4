use std::{fmt, str::FromStr};

use garden_defence_core::Point;

/// Errors raised while building or parsing a path.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// A path needs at least two waypoints to have any length.
    #[error("a path requires at least two waypoints, found {count}")]
    TooFewWaypoints {
        /// Number of waypoints that were supplied.
        count: usize,
    },
    /// The textual form did not start with a point count.
    #[error("path text is missing the leading point count")]
    MissingCount,
    /// A token could not be parsed as an integer.
    #[error("`{token}` is not a valid integer")]
    InvalidInteger {
        /// Offending token.
        token: String,
    },
    /// The textual form ended before every declared point was read.
    #[error("path text declares {expected} points but waypoint {index} is incomplete")]
    MissingCoordinate {
        /// Zero-based index of the incomplete waypoint.
        index: usize,
        /// Number of waypoints declared by the count.
        expected: usize,
    },
}

/// Incrementally assembled path that has not yet been validated.
///
/// Segment lengths and the total length are kept in sync with every pushed
/// waypoint, so [`PathDraft::finish`] only needs to check the waypoint count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathDraft {
    waypoints: Vec<Point>,
    segment_lengths: Vec<f64>,
    total_length: f64,
}

impl PathDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a waypoint to the end of the draft.
    pub fn push(&mut self, point: Point) {
        if let Some(previous) = self.waypoints.last() {
            let length = previous.distance(point);
            self.segment_lengths.push(length);
            self.total_length += length;
        }
        self.waypoints.push(point);
    }

    /// Number of waypoints pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether no waypoints have been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoints pushed so far.
    #[must_use]
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Validates the draft and converts it into a usable path.
    pub fn finish(self) -> Result<PathGeometry, PathError> {
        if self.waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints {
                count: self.waypoints.len(),
            });
        }

        Ok(PathGeometry {
            waypoints: self.waypoints,
            segment_lengths: self.segment_lengths,
            total_length: self.total_length,
        })
    }
}

/// Immutable polyline walked by mobile units.
#[derive(Clone, Debug, PartialEq)]
pub struct PathGeometry {
    waypoints: Vec<Point>,
    segment_lengths: Vec<f64>,
    total_length: f64,
}

impl PathGeometry {
    /// Builds a path from the provided waypoints.
    pub fn new(waypoints: Vec<Point>) -> Result<Self, PathError> {
        let mut draft = PathDraft::new();
        for point in waypoints {
            draft.push(point);
        }
        draft.finish()
    }

    /// Appends a waypoint, extending the segment table and total length.
    pub fn push(&mut self, point: Point) {
        let length = self.last().distance(point);
        self.segment_lengths.push(length);
        self.total_length += length;
        self.waypoints.push(point);
    }

    /// Converts a progress fraction into a coordinate on the path.
    ///
    /// Values at or below zero map to the first waypoint and values at or
    /// above one map to the last. Coordinates are truncated toward zero.
    #[must_use]
    pub fn position(&self, progress: f64) -> Point {
        if progress.is_nan() || progress <= 0.0 {
            return self.first();
        }
        if progress >= 1.0 {
            return self.last();
        }

        let distance = progress * self.total_length;
        let mut cumulative = 0.0;
        let mut index = 0;
        for (segment, length) in self.segment_lengths.iter().enumerate() {
            cumulative += length;
            index = segment;
            if cumulative >= distance {
                break;
            }
        }

        let length = self.segment_lengths[index];
        let offset = distance - cumulative;
        let segment_percent = if length == 0.0 { 0.0 } else { offset / length };

        let start = self.waypoints[index];
        let end = self.waypoints[index + 1];
        let interpolate = |from: i32, to: i32| {
            ((1.0 + segment_percent) * f64::from(to) - segment_percent * f64::from(from)) as i32
        };

        Point::new(interpolate(start.x(), end.x()), interpolate(start.y(), end.y()))
    }

    /// Length of the polyline between waypoints `from` and `to`.
    ///
    /// Indices are clamped to the waypoint range and may be given in either
    /// order.
    #[must_use]
    pub fn length(&self, from: usize, to: usize) -> f64 {
        let last = self.waypoints.len() - 1;
        let (start, end) = (from.min(last), to.min(last));
        let (start, end) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        self.segment_lengths[start..end].iter().sum()
    }

    /// Ordered waypoints.
    #[must_use]
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Length of each segment; always one shorter than the waypoint list.
    #[must_use]
    pub fn segment_lengths(&self) -> &[f64] {
        &self.segment_lengths
    }

    /// Sum of all segment lengths.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Number of waypoints.
    #[must_use]
    pub fn waypoint_count(&self) -> usize {
        self.waypoints.len()
    }

    /// Start of the path.
    #[must_use]
    pub fn first(&self) -> Point {
        self.waypoints[0]
    }

    /// End of the path.
    #[must_use]
    pub fn last(&self) -> Point {
        self.waypoints[self.waypoints.len() - 1]
    }

    /// Consecutive waypoint pairs forming the path's segments.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.waypoints
            .windows(2)
            .map(|pair| (pair[0], pair[1]))
    }
}

impl FromStr for PathGeometry {
    type Err = PathError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut tokens = text.split_whitespace();
        let count_token = tokens.next().ok_or(PathError::MissingCount)?;
        let count: usize = count_token
            .parse()
            .map_err(|_| PathError::InvalidInteger {
                token: count_token.to_owned(),
            })?;

        let mut next_coordinate = |index: usize| -> Result<i32, PathError> {
            let token = tokens.next().ok_or(PathError::MissingCoordinate {
                index,
                expected: count,
            })?;
            token.parse().map_err(|_| PathError::InvalidInteger {
                token: token.to_owned(),
            })
        };

        let mut draft = PathDraft::new();
        for index in 0..count {
            let x = next_coordinate(index)?;
            let y = next_coordinate(index)?;
            draft.push(Point::new(x, y));
        }
        draft.finish()
    }
}

impl fmt::Display for PathGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.waypoints.len())?;
        for point in &self.waypoints {
            writeln!(f, "{} {}", point.x(), point.y())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner_path() -> PathGeometry {
        PathGeometry::new(vec![
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
        ])
        .expect("valid path")
    }

    #[test]
    fn interpolates_across_corner() {
        let path = corner_path();
        assert_eq!(path.total_length(), 20.0);
        assert_eq!(path.position(0.25), Point::new(5, 0));
        assert_eq!(path.position(0.5), Point::new(10, 0));
        assert_eq!(path.position(0.75), Point::new(10, 5));
    }

    #[test]
    fn clamps_out_of_range_progress() {
        let path = corner_path();
        assert_eq!(path.position(-3.0), Point::new(0, 0));
        assert_eq!(path.position(0.0), Point::new(0, 0));
        assert_eq!(path.position(1.0), Point::new(10, 10));
        assert_eq!(path.position(42.0), Point::new(10, 10));
        assert_eq!(path.position(f64::NAN), Point::new(0, 0));
    }

    #[test]
    fn zero_length_segments_do_not_divide_by_zero() {
        let path = PathGeometry::new(vec![
            Point::new(0, 0),
            Point::new(0, 0),
            Point::new(10, 0),
        ])
        .expect("valid path");
        assert_eq!(path.position(0.5), Point::new(5, 0));
    }

    #[test]
    fn coordinates_truncate_toward_zero() {
        let path =
            PathGeometry::new(vec![Point::new(0, 0), Point::new(-3, 0)]).expect("valid path");
        assert_eq!(path.position(0.5), Point::new(-1, 0));
    }

    #[test]
    fn rejects_single_waypoint() {
        assert_eq!(
            PathGeometry::new(vec![Point::new(1, 1)]),
            Err(PathError::TooFewWaypoints { count: 1 })
        );
        assert_eq!(
            PathDraft::new().finish(),
            Err(PathError::TooFewWaypoints { count: 0 })
        );
    }

    #[test]
    fn push_keeps_lengths_in_sync() {
        let mut path =
            PathGeometry::new(vec![Point::new(0, 0), Point::new(3, 4)]).expect("valid path");
        path.push(Point::new(3, 10));
        assert_eq!(path.segment_lengths(), &[5.0, 6.0]);
        assert_eq!(path.total_length(), 11.0);
        assert_eq!(path.waypoint_count(), 3);
    }

    #[test]
    fn length_clamps_and_orders_indices() {
        let path = corner_path();
        assert_eq!(path.length(0, 2), 20.0);
        assert_eq!(path.length(2, 0), 20.0);
        assert_eq!(path.length(1, 99), 10.0);
        assert_eq!(path.length(1, 1), 0.0);
    }

    #[test]
    fn parses_and_prints_text_format() {
        let path: PathGeometry = "3\n0 0\n10 0\n10 10\n".parse().expect("parse");
        assert_eq!(path, corner_path());
        assert_eq!(path.to_string(), "3\n0 0\n10 0\n10 10\n");
    }

    #[test]
    fn reports_malformed_text() {
        assert_eq!("".parse::<PathGeometry>(), Err(PathError::MissingCount));
        assert_eq!(
            "2 0 0 x 1".parse::<PathGeometry>(),
            Err(PathError::InvalidInteger {
                token: "x".to_owned()
            })
        );
        assert_eq!(
            "2 0 0 5".parse::<PathGeometry>(),
            Err(PathError::MissingCoordinate {
                index: 1,
                expected: 2
            })
        );
        assert_eq!(
            "1 0 0".parse::<PathGeometry>(),
            Err(PathError::TooFewWaypoints { count: 1 })
        );
    }
}
