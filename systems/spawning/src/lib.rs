#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduler responsible for releasing units onto the path.

use std::{fmt, str::FromStr, time::Duration};

use garden_defence_core::UnitKind;
use log::info;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seconds between spawns during the first wave.
pub const DEFAULT_SPAWN_INTERVAL: Duration = Duration::from_secs(2);

/// Multiplier applied to the spawn interval whenever a wave completes.
pub const DEFAULT_ESCALATION_FACTOR: f64 = 0.6;

/// Errors raised while parsing a wave order.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WaveOrderError {
    /// The order contained no units.
    #[error("a wave order must contain at least one unit")]
    Empty,
    /// A token did not name a unit class.
    #[error("unknown unit token `{token}` at position {position}")]
    UnknownToken {
        /// Offending token.
        token: String,
        /// Zero-based token position.
        position: usize,
    },
}

/// Ordered list of unit classes released during each wave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WaveOrder {
    units: Vec<UnitKind>,
}

impl WaveOrder {
    /// Creates a wave order from an explicit unit list.
    pub fn new(units: Vec<UnitKind>) -> Result<Self, WaveOrderError> {
        if units.is_empty() {
            return Err(WaveOrderError::Empty);
        }
        Ok(Self { units })
    }

    /// Units in release order.
    #[must_use]
    pub fn units(&self) -> &[UnitKind] {
        &self.units
    }

    /// Number of units per wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always false; empty orders are rejected at construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns a copy of the order shuffled deterministically from `seed`.
    #[must_use]
    pub fn shuffled(&self, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut units = self.units.clone();
        units.shuffle(&mut rng);
        Self { units }
    }
}

impl Default for WaveOrder {
    fn default() -> Self {
        let mut units = vec![UnitKind::Snail; 5];
        units.push(UnitKind::Cargo);
        units.extend([UnitKind::Snail; 3]);
        units.push(UnitKind::Cargo);
        Self { units }
    }
}

impl FromStr for WaveOrder {
    type Err = WaveOrderError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let units = text
            .split_whitespace()
            .enumerate()
            .map(|(position, token)| {
                UnitKind::from_token(token).ok_or_else(|| WaveOrderError::UnknownToken {
                    token: token.to_owned(),
                    position,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(units)
    }
}

impl fmt::Display for WaveOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, unit) in self.units.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", unit.token())?;
        }
        Ok(())
    }
}

impl TryFrom<String> for WaveOrder {
    type Error = WaveOrderError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<WaveOrder> for String {
    fn from(order: WaveOrder) -> Self {
        order.to_string()
    }
}

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Debug)]
pub struct Config {
    spawn_interval: Duration,
    escalation_factor: f64,
    order: WaveOrder,
}

impl Config {
    /// Creates a new configuration using the provided cadence, escalation and order.
    #[must_use]
    pub const fn new(spawn_interval: Duration, escalation_factor: f64, order: WaveOrder) -> Self {
        Self {
            spawn_interval,
            escalation_factor,
            order,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            DEFAULT_SPAWN_INTERVAL,
            DEFAULT_ESCALATION_FACTOR,
            WaveOrder::default(),
        )
    }
}

/// Outcome of a scheduler step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaveCue {
    /// A unit of the given class should be spawned.
    Spawn(UnitKind),
    /// The order wrapped; a faster wave begins on the next release.
    Escalated {
        /// Zero-based index of the wave that begins.
        wave: u32,
        /// Interval between spawns for the new wave.
        interval: Duration,
    },
}

/// Scheduler that releases at most one unit per tick.
#[derive(Debug)]
pub struct WaveScheduler {
    spawn_interval: Duration,
    escalation_factor: f64,
    order: WaveOrder,
    cursor: usize,
    since_last_spawn: Duration,
    wave: u32,
}

impl WaveScheduler {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            escalation_factor: config.escalation_factor,
            order: config.order,
            cursor: 0,
            since_last_spawn: Duration::ZERO,
            wave: 0,
        }
    }

    /// Accumulates `dt` and reports whether a unit is due.
    ///
    /// A release happens once the time since the previous one strictly exceeds
    /// the interval. When the order is exhausted, the interval shrinks by the
    /// escalation factor and the order restarts without releasing a unit; the
    /// timer is left running so the next tick releases immediately. An
    /// interval that cannot be represented after escalation is left unchanged.
    pub fn handle(&mut self, dt: Duration) -> Option<WaveCue> {
        self.since_last_spawn = self.since_last_spawn.saturating_add(dt);
        if self.since_last_spawn <= self.spawn_interval {
            return None;
        }

        match self.order.units().get(self.cursor) {
            Some(&unit) => {
                self.cursor += 1;
                self.since_last_spawn = Duration::ZERO;
                Some(WaveCue::Spawn(unit))
            }
            None => {
                self.cursor = 0;
                self.wave += 1;
                self.spawn_interval = Duration::try_from_secs_f64(
                    self.spawn_interval.as_secs_f64() * self.escalation_factor,
                )
                .unwrap_or(self.spawn_interval);
                info!(
                    "wave {} begins with {:.3}s between spawns",
                    self.wave,
                    self.spawn_interval.as_secs_f64()
                );
                Some(WaveCue::Escalated {
                    wave: self.wave,
                    interval: self.spawn_interval,
                })
            }
        }
    }

    /// Current interval between spawns.
    #[must_use]
    pub fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Zero-based index of the current wave.
    #[must_use]
    pub fn wave(&self) -> u32 {
        self.wave
    }

    /// Order released during each wave.
    #[must_use]
    pub fn order(&self) -> &WaveOrder {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(kind: UnitKind) -> WaveOrder {
        WaveOrder::new(vec![kind]).expect("non-empty order")
    }

    #[test]
    fn waits_strictly_longer_than_interval() {
        let mut scheduler = WaveScheduler::new(Config::new(
            Duration::from_secs(2),
            DEFAULT_ESCALATION_FACTOR,
            single(UnitKind::Snail),
        ));
        assert_eq!(scheduler.handle(Duration::from_secs(2)), None);
        assert_eq!(
            scheduler.handle(Duration::from_millis(1)),
            Some(WaveCue::Spawn(UnitKind::Snail))
        );
        assert_eq!(scheduler.handle(Duration::from_secs(1)), None);
    }

    #[test]
    fn releases_at_most_one_unit_per_tick() {
        let order: WaveOrder = "s s s".parse().expect("order");
        let mut scheduler =
            WaveScheduler::new(Config::new(Duration::from_secs(1), 0.5, order));
        assert_eq!(
            scheduler.handle(Duration::from_secs(10)),
            Some(WaveCue::Spawn(UnitKind::Snail))
        );
        assert_eq!(scheduler.handle(Duration::ZERO), None);
    }

    #[test]
    fn wrap_escalates_without_spawning() {
        let mut scheduler = WaveScheduler::new(Config::new(
            Duration::from_secs(2),
            DEFAULT_ESCALATION_FACTOR,
            single(UnitKind::Cargo),
        ));
        let step = Duration::from_millis(2_100);
        assert_eq!(scheduler.handle(step), Some(WaveCue::Spawn(UnitKind::Cargo)));
        match scheduler.handle(step) {
            Some(WaveCue::Escalated { wave, interval }) => {
                assert_eq!(wave, 1);
                assert!((interval.as_secs_f64() - 1.2).abs() < 1e-6);
            }
            other => panic!("expected escalation, got {other:?}"),
        }
        assert_eq!(
            scheduler.handle(Duration::ZERO),
            Some(WaveCue::Spawn(UnitKind::Cargo))
        );
        assert_eq!(scheduler.wave(), 1);
    }

    #[test]
    fn unrepresentable_escalation_keeps_interval() {
        for factor in [-0.5, f64::NAN] {
            let mut scheduler = WaveScheduler::new(Config::new(
                Duration::from_secs(1),
                factor,
                single(UnitKind::Snail),
            ));
            let step = Duration::from_secs(2);
            assert_eq!(scheduler.handle(step), Some(WaveCue::Spawn(UnitKind::Snail)));
            assert_eq!(
                scheduler.handle(step),
                Some(WaveCue::Escalated {
                    wave: 1,
                    interval: Duration::from_secs(1),
                })
            );
        }
    }

    #[test]
    fn growing_interval_stops_at_duration_limit() {
        let mut scheduler = WaveScheduler::new(Config::new(
            Duration::from_secs(1),
            4.0,
            single(UnitKind::Cargo),
        ));
        for _ in 0..200 {
            let _ = scheduler.handle(Duration::MAX);
        }
        assert!(scheduler.wave() > 32);
        assert!(scheduler.spawn_interval() >= Duration::from_secs(1 << 62));
    }

    #[test]
    fn parses_tokens_and_rejects_unknown_ones() {
        let order: WaveOrder = "s c\ns".parse().expect("order");
        assert_eq!(
            order.units(),
            &[UnitKind::Snail, UnitKind::Cargo, UnitKind::Snail]
        );
        assert_eq!(order.to_string(), "s c s");
        assert_eq!(
            "s x".parse::<WaveOrder>(),
            Err(WaveOrderError::UnknownToken {
                token: "x".to_owned(),
                position: 1
            })
        );
        assert_eq!("  ".parse::<WaveOrder>(), Err(WaveOrderError::Empty));
    }

    #[test]
    fn shuffle_is_deterministic_and_preserves_units() {
        let order = WaveOrder::default();
        let first = order.shuffled(7);
        let second = order.shuffled(7);
        assert_eq!(first, second);

        let count = |order: &WaveOrder, kind: UnitKind| {
            order.units().iter().filter(|&&unit| unit == kind).count()
        };
        assert_eq!(count(&first, UnitKind::Cargo), count(&order, UnitKind::Cargo));
        assert_eq!(first.len(), order.len());
    }
}
