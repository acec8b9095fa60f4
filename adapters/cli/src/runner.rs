//! Headless driver that plays a scenario against a world.

use std::{collections::VecDeque, fmt, time::Duration};

use garden_defence_core::{Command, Economy, Event, Point};
use garden_defence_world::{self as world, query, World};
use log::{debug, info, warn};

use crate::scenario::ScriptedPlacement;

/// Tallies collected while a scenario runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) ticks: u64,
    pub(crate) spawned: u64,
    pub(crate) killed: u64,
    pub(crate) escaped: u64,
    pub(crate) shots: u64,
    pub(crate) hits: u64,
    pub(crate) placed: u64,
    pub(crate) rejected: u64,
    pub(crate) cancelled: u64,
    pub(crate) economy: Economy,
    pub(crate) wave: u32,
    pub(crate) game_over: bool,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::UnitSpawned { .. } => self.spawned += 1,
            Event::UnitKilled { .. } => self.killed += 1,
            Event::UnitEscaped { .. } => self.escaped += 1,
            Event::ProjectileFired { .. } => self.shots += 1,
            Event::ProjectileHit { .. } => self.hits += 1,
            Event::StructurePlaced { .. } => self.placed += 1,
            Event::PurchaseRejected { .. } | Event::PlacementRejected { .. } => {
                self.rejected += 1;
            }
            Event::PlacementCancelled { .. } => self.cancelled += 1,
            Event::TimeAdvanced { .. }
            | Event::StructurePurchased { .. }
            | Event::WaveEscalated { .. }
            | Event::GameOver { .. } => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks simulated: {}", self.ticks)?;
        writeln!(f, "waves reached: {}", self.wave + 1)?;
        writeln!(
            f,
            "units: {} spawned, {} killed, {} escaped",
            self.spawned, self.killed, self.escaped
        )?;
        writeln!(f, "projectiles: {} fired, {} hit", self.shots, self.hits)?;
        writeln!(
            f,
            "structures: {} placed, {} rejected, {} cancelled",
            self.placed, self.rejected, self.cancelled
        )?;
        writeln!(
            f,
            "health {}, money {}, score {}",
            self.economy.health(),
            self.economy.money(),
            self.economy.score()
        )?;
        write!(
            f,
            "{}",
            if self.game_over {
                "game over"
            } else {
                "still standing"
            }
        )
    }
}

/// Runs `ticks` ticks of length `dt`, executing `script` along the way.
///
/// At most one scripted placement is bought per tick, in `at_tick` order. A
/// purchase is confirmed once the tick has made the structure visible; if the
/// drop is refused, the structure is cancelled so the next one starts clean.
pub(crate) fn run(
    world: &mut World,
    script: &[ScriptedPlacement],
    ticks: u64,
    dt: Duration,
) -> Summary {
    let mut ordered = script.to_vec();
    ordered.sort_by_key(|placement| placement.at_tick);
    let mut queue = VecDeque::from(ordered);

    let mut summary = Summary::default();
    let mut events = Vec::new();

    for tick in 0..ticks {
        let due = match queue.front() {
            Some(placement) if placement.at_tick <= tick => queue.pop_front(),
            _ => None,
        };

        if let Some(placement) = &due {
            world::apply(
                world,
                Command::PurchaseStructure {
                    kind: placement.kind,
                },
                &mut events,
            );
        }
        world::apply(world, Command::Tick { dt }, &mut events);

        if let Some(placement) = due {
            let purchased = events
                .iter()
                .any(|event| matches!(event, Event::StructurePurchased { .. }));
            if purchased {
                confirm(world, &placement, &mut events);
            }
        }

        for event in events.drain(..) {
            log_event(tick, &event);
            summary.record(&event);
        }
        summary.ticks += 1;
    }

    summary.economy = query::economy(world);
    summary.wave = query::wave(world);
    summary.game_over = query::is_game_over(world);
    summary
}

fn confirm(world: &mut World, placement: &ScriptedPlacement, events: &mut Vec<Event>) {
    let start = events.len();
    click_at(world, placement.location(), events);

    let placed = events[start..]
        .iter()
        .any(|event| matches!(event, Event::StructurePlaced { .. }));
    if !placed {
        let menu = query::config(world).menu();
        click_at(world, Point::new(menu.center().x(), menu.bottom() - 1), events);
    }
}

fn click_at(world: &mut World, position: Point, events: &mut Vec<Event>) {
    world::apply(world, Command::MovePointer { position }, events);
    world::apply(world, Command::Click, events);
}

fn log_event(tick: u64, event: &Event) {
    match event {
        Event::TimeAdvanced { .. } => {}
        Event::GameOver { score } => info!("tick {tick}: game over with score {score}"),
        Event::WaveEscalated {
            wave,
            interval_secs,
        } => info!("tick {tick}: wave {wave}, one unit every {interval_secs:.3}s"),
        Event::PurchaseRejected { .. } | Event::PlacementRejected { .. } => {
            warn!("tick {tick}: {event:?}");
        }
        _ => debug!("tick {tick}: {event:?}"),
    }
}
