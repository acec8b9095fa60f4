#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides whether a structure footprint may be committed.

use garden_defence_core::{ObstructionMode, PlacementError, Rect};
use garden_defence_geometry::{
    collision::{segment_distance_squared, segment_hits_circle},
    PathGeometry,
};
use log::debug;

/// Clearance kept between structure footprints and the path.
pub const DEFAULT_CLEARANCE: i32 = 22;

/// Validator that checks candidate footprints against structures and the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacementValidator {
    radius: i32,
    mode: ObstructionMode,
}

impl PlacementValidator {
    /// Creates a validator with the provided clearance radius and obstruction mode.
    #[must_use]
    pub const fn new(radius: i32, mode: ObstructionMode) -> Self {
        Self { radius, mode }
    }

    /// Clearance radius around the path.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    /// Active obstruction mode.
    #[must_use]
    pub const fn mode(&self) -> ObstructionMode {
        self.mode
    }

    /// Checks whether `candidate` may be placed.
    ///
    /// Overlap with a committed footprint is reported before path obstruction.
    pub fn validate(
        &self,
        candidate: &Rect,
        committed: &[Rect],
        path: &PathGeometry,
    ) -> Result<(), PlacementError> {
        if committed.iter().any(|footprint| footprint.overlaps(candidate)) {
            debug!("footprint {candidate:?} overlaps a committed structure");
            return Err(PlacementError::OverlapsStructure);
        }

        if self.blocks_waypoints(candidate, path) || self.blocks_segments(candidate, path) {
            debug!("footprint {candidate:?} blocks the path");
            return Err(PlacementError::BlocksPath);
        }

        Ok(())
    }

    /// Convenience wrapper over [`PlacementValidator::validate`].
    #[must_use]
    pub fn is_valid_placement(
        &self,
        candidate: &Rect,
        committed: &[Rect],
        path: &PathGeometry,
    ) -> bool {
        self.validate(candidate, committed, path).is_ok()
    }

    fn blocks_waypoints(&self, candidate: &Rect, path: &PathGeometry) -> bool {
        candidate.edges().into_iter().any(|(start, end)| {
            path.waypoints()
                .iter()
                .any(|&waypoint| segment_hits_circle(start, end, waypoint, self.radius))
        })
    }

    fn blocks_segments(&self, candidate: &Rect, path: &PathGeometry) -> bool {
        if self.mode != ObstructionMode::Segments {
            return false;
        }

        let radius = f64::from(self.radius);
        let limit = radius * radius;
        path.segments().any(|segment| {
            candidate.contains(segment.0)
                || candidate
                    .edges()
                    .into_iter()
                    .any(|edge| segment_distance_squared(edge, segment) <= limit)
        })
    }
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::new(DEFAULT_CLEARANCE, ObstructionMode::Waypoints)
    }
}
