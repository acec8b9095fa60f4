#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks targets for structures and computes firing solutions.
//!
//! The resolver never touches the world. Callers describe the shooter with a
//! [`Shooter`] and every alive unit with a [`TargetCandidate`], listed in
//! roster order so that ties resolve deterministically.

use garden_defence_core::{AimMode, EntityId, Point, TargetingPolicy, UnitKind};
use garden_defence_geometry::PathGeometry;
use glam::DVec2;
use log::debug;

/// Health at or below which a single hit from any structure kills a unit.
pub const ONE_SHOT_HEALTH: i32 = 1;

/// Snapshot of a unit considered for targeting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetCandidate {
    /// Identifier of the unit.
    pub id: EntityId,
    /// Class of the unit.
    pub kind: UnitKind,
    /// Current coordinate of the unit.
    pub position: Point,
    /// Progress along the path.
    pub progress: f64,
    /// Progress covered per second.
    pub speed: f64,
    /// Remaining health.
    pub health: i32,
    /// Health of the unit's class at spawn.
    pub max_health: i32,
    /// Damage carried by live projectiles already aimed at this unit.
    pub pending_damage: i32,
}

/// Description of a structure that is ready to fire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shooter {
    /// Location of the structure; range is measured from here.
    pub position: Point,
    /// Point from which projectiles launch.
    pub muzzle: Point,
    /// Targeting radius.
    pub range: i32,
    /// Damage carried by each projectile.
    pub damage: i32,
    /// Projectile speed in field units per second.
    pub projectile_speed: f64,
    /// Target selection policy.
    pub policy: TargetingPolicy,
    /// Aim computation mode.
    pub aim: AimMode,
}

/// Launch parameters for a projectile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FiringSolution {
    /// Unit the projectile is aimed at.
    pub target: EntityId,
    /// Launch position.
    pub origin: DVec2,
    /// Velocity in field units per second.
    pub velocity: DVec2,
    /// Point the projectile is aimed at.
    pub aim: Point,
}

/// Combat resolver that reuses scratch buffers across structures and ticks.
#[derive(Debug, Default)]
pub struct CombatResolver {
    pool: Vec<usize>,
    filtered: Vec<usize>,
}

impl CombatResolver {
    /// Creates a resolver with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a target and computes how to shoot at it.
    ///
    /// Returns `None` when nothing is in range or the aim direction is
    /// degenerate; the structure then keeps its shot loaded.
    pub fn engage(
        &mut self,
        shooter: &Shooter,
        candidates: &[TargetCandidate],
        path: &PathGeometry,
    ) -> Option<FiringSolution> {
        let target = self.select_target(shooter, candidates)?;
        let candidate = candidates.iter().find(|candidate| candidate.id == target)?;
        firing_solution(shooter, candidate, path)
    }

    /// Selects a target according to the shooter's policy.
    pub fn select_target(
        &mut self,
        shooter: &Shooter,
        candidates: &[TargetCandidate],
    ) -> Option<EntityId> {
        match shooter.policy {
            TargetingPolicy::Nearest => nearest_in_range(shooter.position, shooter.range, candidates),
            TargetingPolicy::Priority => self.priority_ranked(shooter, candidates),
        }
    }

    /// Runs the priority cascade over the candidates in range.
    ///
    /// Units already doomed by pending damage are excluded. The remaining set
    /// is narrowed by four filters in order, skipping any filter that would
    /// leave nothing: health above [`ONE_SHOT_HEALTH`], highest tier present,
    /// health equal to the shooter's damage, and health at the class maximum.
    /// If more than one unit survives, the one furthest along the path wins.
    pub fn priority_ranked(
        &mut self,
        shooter: &Shooter,
        candidates: &[TargetCandidate],
    ) -> Option<EntityId> {
        self.pool.clear();
        self.pool.extend(
            candidates
                .iter()
                .enumerate()
                .filter(|(_, candidate)| in_range(shooter.position, shooter.range, candidate))
                .filter(|(_, candidate)| candidate.pending_damage < candidate.health)
                .map(|(index, _)| index),
        );

        if self.pool.is_empty() {
            return None;
        }

        let top_tier = self
            .pool
            .iter()
            .map(|&index| candidates[index].kind.tier())
            .max()
            .unwrap_or_default();

        let filters: [&dyn Fn(&TargetCandidate) -> bool; 4] = [
            &|candidate: &TargetCandidate| candidate.health > ONE_SHOT_HEALTH,
            &|candidate: &TargetCandidate| candidate.kind.tier() == top_tier,
            &|candidate: &TargetCandidate| candidate.health == shooter.damage,
            &|candidate: &TargetCandidate| candidate.health == candidate.max_health,
        ];

        for filter in filters {
            if self.pool.len() <= 1 {
                break;
            }

            self.filtered.clear();
            self.filtered.extend(
                self.pool
                    .iter()
                    .copied()
                    .filter(|&index| filter(&candidates[index])),
            );

            if !self.filtered.is_empty() {
                std::mem::swap(&mut self.pool, &mut self.filtered);
            }
        }

        let mut best: Option<&TargetCandidate> = None;
        for &index in &self.pool {
            let candidate = &candidates[index];
            match best {
                Some(current) if candidate.progress <= current.progress => {}
                _ => best = Some(candidate),
            }
        }

        let chosen = best.map(|candidate| candidate.id);
        debug!(
            "priority targeting from {:?} narrowed to {} candidates, chose {:?}",
            shooter.position,
            self.pool.len(),
            chosen
        );
        chosen
    }
}

/// Returns the closest candidate within `range` of `origin`.
///
/// Ties resolve to the candidate listed first.
#[must_use]
pub fn nearest_in_range(
    origin: Point,
    range: i32,
    candidates: &[TargetCandidate],
) -> Option<EntityId> {
    let mut best: Option<(i64, EntityId)> = None;
    for candidate in candidates {
        if !in_range(origin, range, candidate) {
            continue;
        }

        let distance = origin.distance_squared(candidate.position);
        match best {
            Some((closest, _)) if distance >= closest => {}
            _ => best = Some((distance, candidate.id)),
        }
    }
    best.map(|(_, id)| id)
}

/// Computes the launch parameters for shooting at `target`.
///
/// Direct aim uses the target's current coordinate. Lead aim estimates the
/// flight time from the muzzle, advances the target's progress by that time
/// and aims at the resulting path coordinate.
#[must_use]
pub fn firing_solution(
    shooter: &Shooter,
    target: &TargetCandidate,
    path: &PathGeometry,
) -> Option<FiringSolution> {
    let aim = match shooter.aim {
        AimMode::Direct => target.position,
        AimMode::Lead => {
            let flight_time = shooter.muzzle.distance(target.position) / shooter.projectile_speed;
            path.position(target.progress + target.speed * flight_time)
        }
    };

    let origin = to_vec(shooter.muzzle);
    let direction = (to_vec(aim) - origin).try_normalize()?;

    Some(FiringSolution {
        target: target.id,
        origin,
        velocity: direction * shooter.projectile_speed,
        aim,
    })
}

fn in_range(origin: Point, range: i32, candidate: &TargetCandidate) -> bool {
    let range = i64::from(range);
    origin.distance_squared(candidate.position) <= range * range
}

fn to_vec(point: Point) -> DVec2 {
    DVec2::new(f64::from(point.x()), f64::from(point.y()))
}
