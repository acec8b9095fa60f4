#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Garden Defence.
//!
//! The [`World`] owns the path, the entity roster, the economy and the clock.
//! Adapters mutate it exclusively through [`apply`] and read it through the
//! functions in [`query`].

use std::{cmp::Reverse, collections::BTreeMap, time::Duration};

use garden_defence_core::{
    Command, DrawLayer, Economy, EntityId, Event, Point, PurchaseError, Rect, StructureKind,
    UnitKind, WELCOME_BANNER,
};
use garden_defence_geometry::{collision::rect_touches_hitbox, PathGeometry};
use garden_defence_system_placement::PlacementValidator;
use garden_defence_system_spawning::{WaveCue, WaveScheduler};
use garden_defence_system_targeting::{CombatResolver, TargetCandidate};
use log::{debug, info, warn};

pub mod clock;
pub mod config;
pub mod entities;
pub mod roster;

pub use clock::SimulationClock;
pub use config::{ConfigError, WorldConfig};
pub use roster::EntityRoster;

use entities::{
    ClickContext, Damageable, Decal, Decoration, Entity, EntityBody, EntityKind, MobileUnit,
    Projectile, PurchaseButton, Structure, UnitOutcome, Visual,
};

const MENU_BUTTON_MARGIN: i32 = 25;
const MENU_BUTTON_HEIGHT: i32 = 60;
const MENU_BUTTON_TOP: i32 = 100;
const MENU_BUTTON_SPACING: i32 = 100;
const MENU_STRUCTURES: [StructureKind; 2] = [StructureKind::Basic, StructureKind::Smart];

/// Authoritative simulation state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    path: PathGeometry,
    roster: EntityRoster,
    economy: Economy,
    clock: SimulationClock,
    scheduler: WaveScheduler,
    resolver: CombatResolver,
    validator: PlacementValidator,
    pointer: Point,
    game_over: bool,
    update_order: Vec<EntityId>,
    candidates: Vec<TargetCandidate>,
    pending_damage: BTreeMap<EntityId, i32>,
    fired_this_tick: Vec<(EntityId, i32)>,
}

impl World {
    /// Creates a world around `path`, seeded with the field backdrop, the menu
    /// panel and one purchase button per structure kind.
    #[must_use]
    pub fn new(path: PathGeometry, config: WorldConfig) -> Self {
        let mut world = Self {
            economy: Economy::new(config.starting_health, config.starting_money, 0),
            scheduler: WaveScheduler::new(config.spawning()),
            validator: PlacementValidator::new(config.clearance_radius, config.obstruction_mode),
            pointer: path.first(),
            path,
            roster: EntityRoster::new(),
            clock: SimulationClock::new(),
            resolver: CombatResolver::new(),
            game_over: false,
            update_order: Vec::new(),
            candidates: Vec::new(),
            pending_damage: BTreeMap::new(),
            fired_this_tick: Vec::new(),
            config,
        };

        let field = world.config.field();
        let menu = world.config.menu();
        let _ = world
            .roster
            .spawn(Entity::decoration(Decoration::Background { area: field }));
        let _ = world
            .roster
            .spawn(Entity::decoration(Decoration::Menu { area: menu }));

        for (slot, kind) in (0i32..).zip(MENU_STRUCTURES) {
            let bounds = Rect::new(
                menu.left() + MENU_BUTTON_MARGIN,
                MENU_BUTTON_TOP + slot * MENU_BUTTON_SPACING,
                menu.size().width() - 2 * MENU_BUTTON_MARGIN,
                MENU_BUTTON_HEIGHT,
            );
            let _ = world
                .roster
                .spawn(Entity::purchase_button(PurchaseButton::new(kind, bounds)));
        }
        world.roster.end_frame();

        world
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock.advance(dt);
        out_events.push(Event::TimeAdvanced { dt });
        self.roster.begin_frame();
        self.fired_this_tick.clear();

        if !self.game_over {
            if self.economy.health() <= 0 && self.clock.total() > self.config.game_over_grace() {
                self.end_game(out_events);
            } else if let Some(cue) = self.scheduler.handle(dt) {
                self.release(cue, out_events);
            }
            self.update_entities(dt.as_secs_f64(), out_events);
        }

        self.roster.end_frame();
    }

    fn end_game(&mut self, out_events: &mut Vec<Event>) {
        self.game_over = true;
        let _ = self
            .roster
            .spawn(Entity::decoration(Decoration::GameOverBanner));

        let buttons: Vec<EntityId> = self
            .roster
            .entities_of_kind(EntityKind::PurchaseButton)
            .map(|(id, _)| id)
            .collect();
        for id in buttons {
            if let Some(button) = self.roster.get_mut(id) {
                button.set_visible(false);
            }
        }

        let score = self.economy.score();
        info!("game over after {:.1}s with score {score}", self.clock.total().as_secs_f64());
        out_events.push(Event::GameOver { score });
    }

    fn release(&mut self, cue: WaveCue, out_events: &mut Vec<Event>) {
        match cue {
            WaveCue::Spawn(kind) => {
                let unit = self
                    .roster
                    .spawn(Entity::unit(MobileUnit::new(kind, &self.path)));
                debug!("released {kind:?} as {unit:?}");
                out_events.push(Event::UnitSpawned { unit, kind });
            }
            WaveCue::Escalated { wave, interval } => {
                out_events.push(Event::WaveEscalated {
                    wave,
                    interval_secs: interval.as_secs_f64(),
                });
            }
        }
    }

    fn update_entities(&mut self, dt: f64, out_events: &mut Vec<Event>) {
        let mut order = std::mem::take(&mut self.update_order);
        order.clear();
        order.extend_from_slice(self.roster.current_ids());

        for &id in &order {
            let Some(entity) = self.roster.get(id) else {
                continue;
            };
            if entity.is_expired() {
                continue;
            }

            match entity.kind() {
                EntityKind::Unit => self.update_unit(id, dt, out_events),
                EntityKind::Structure => self.update_structure(id, dt, out_events),
                EntityKind::Projectile => self.update_projectile(id, dt, out_events),
                EntityKind::Decal => self.update_decal(id, dt),
                EntityKind::PurchaseButton => self.update_button(id, out_events),
                EntityKind::Decoration => {}
            }
        }

        self.update_order = order;
    }

    fn update_unit(&mut self, id: EntityId, dt: f64, out_events: &mut Vec<Event>) {
        let Some(entity) = self.roster.get_mut(id) else {
            return;
        };
        let EntityBody::Unit(unit) = entity.body_mut() else {
            return;
        };

        match unit.advance(dt, &self.path) {
            UnitOutcome::Moving => {}
            UnitOutcome::Killed => {
                let kind = unit.kind();
                let position = unit.position();
                let (reward, score) = (unit.reward(), unit.score_value());
                entity.expire();

                self.economy.credit(reward);
                self.economy.increase_score(score);
                let _ = self.roster.spawn(Entity::decal(Decal::new(
                    kind,
                    position,
                    self.config.decal_life_span_secs,
                )));
                debug!("{kind:?} {id:?} killed at {position:?}");
                out_events.push(Event::UnitKilled {
                    unit: id,
                    kind,
                    position,
                });
            }
            UnitOutcome::Escaped => {
                let kind = unit.kind();
                let damage = unit.damage_on_arrival();
                entity.expire();

                self.economy.damage_user(damage);
                debug!("{kind:?} {id:?} escaped for {damage} damage");
                out_events.push(Event::UnitEscaped {
                    unit: id,
                    kind,
                    damage,
                });
            }
        }
    }

    fn update_structure(&mut self, id: EntityId, dt: f64, out_events: &mut Vec<Event>) {
        let pointer = self.pointer;
        let Some(structure) = self.roster.get_mut(id).and_then(Entity::as_structure_mut) else {
            return;
        };

        if structure.is_placing() {
            structure.move_to(pointer);
            return;
        }
        if !structure.cook(dt) {
            return;
        }

        let shooter = structure.shooter();
        self.collect_candidates();
        let Some(solution) = self
            .resolver
            .engage(&shooter, &self.candidates, &self.path)
        else {
            return;
        };

        let projectile = self.roster.spawn(Entity::projectile(Projectile::new(
            solution.origin,
            solution.velocity,
            shooter.damage,
            solution.target,
            self.config.projectile_max_travel,
            self.config.projectile_bounds(),
        )));
        self.fired_this_tick.push((solution.target, shooter.damage));
        if let Some(structure) = self.roster.get_mut(id).and_then(Entity::as_structure_mut) {
            structure.discharge();
        }

        debug!(
            "structure {id:?} fired {projectile:?} at {:?} aiming for {:?}",
            solution.target, solution.aim
        );
        out_events.push(Event::ProjectileFired {
            structure: id,
            target: solution.target,
            projectile,
        });
    }

    fn collect_candidates(&mut self) {
        self.pending_damage.clear();
        for (_, entity) in self.roster.iter() {
            if entity.is_expired() {
                continue;
            }
            if let Some(projectile) = entity.as_projectile() {
                *self.pending_damage.entry(projectile.target()).or_insert(0) +=
                    projectile.damage();
            }
        }
        for &(target, damage) in &self.fired_this_tick {
            *self.pending_damage.entry(target).or_insert(0) += damage;
        }

        self.candidates.clear();
        for (id, entity) in self.roster.iter() {
            if entity.is_expired() {
                continue;
            }
            let Some(unit) = entity.as_unit() else {
                continue;
            };
            self.candidates.push(TargetCandidate {
                id,
                kind: unit.kind(),
                position: unit.position(),
                progress: unit.progress(),
                speed: unit.speed(),
                health: unit.health(),
                max_health: unit.max_health(),
                pending_damage: self.pending_damage.get(&id).copied().unwrap_or(0),
            });
        }
    }

    fn update_projectile(&mut self, id: EntityId, dt: f64, out_events: &mut Vec<Event>) {
        let Some(entity) = self.roster.get_mut(id) else {
            return;
        };
        let EntityBody::Projectile(projectile) = entity.body_mut() else {
            return;
        };

        let spent = projectile.advance(dt);
        let bounds = projectile.bounds();
        let damage = projectile.damage();
        if spent {
            entity.expire();
        }

        let victim = self
            .roster
            .iter()
            .filter(|(_, other)| !other.is_expired())
            .find(|(_, other)| {
                other
                    .as_damageable()
                    .is_some_and(|target| rect_touches_hitbox(&bounds, &target.hitbox()))
            })
            .map(|(victim, _)| victim);
        let Some(victim) = victim else {
            return;
        };

        if let Some(target) = self
            .roster
            .get_mut(victim)
            .and_then(Entity::as_damageable_mut)
        {
            target.take_damage(damage);
        }
        if let Some(entity) = self.roster.get_mut(id) {
            entity.expire();
        }

        debug!("projectile {id:?} hit {victim:?} for {damage}");
        out_events.push(Event::ProjectileHit {
            projectile: id,
            unit: victim,
            damage,
        });
    }

    fn update_decal(&mut self, id: EntityId, dt: f64) {
        let Some(entity) = self.roster.get_mut(id) else {
            return;
        };
        let EntityBody::Decal(decal) = entity.body_mut() else {
            return;
        };
        if decal.age(dt) {
            entity.expire();
        }
    }

    fn update_button(&mut self, id: EntityId, out_events: &mut Vec<Event>) {
        let queued = match self.roster.get_mut(id).map(Entity::body_mut) {
            Some(EntityBody::PurchaseButton(button)) => button.take_queued(),
            _ => None,
        };
        if let Some(kind) = queued {
            self.purchase(kind, out_events);
        }
    }

    fn purchase(&mut self, kind: StructureKind, out_events: &mut Vec<Event>) {
        if self.game_over {
            warn!("purchase of {kind:?} rejected: the game is over");
            out_events.push(Event::PurchaseRejected {
                kind,
                reason: PurchaseError::GameOver,
            });
            return;
        }

        let cost = kind.cost();
        if !self.economy.can_afford(cost) {
            let reason = PurchaseError::InsufficientFunds {
                cost,
                available: self.economy.money(),
            };
            warn!("purchase of {kind:?} rejected: {reason}");
            out_events.push(Event::PurchaseRejected { kind, reason });
            return;
        }

        self.economy.debit(cost);
        let structure = self
            .roster
            .spawn(Entity::structure(Structure::placing(kind, self.pointer)));
        info!("purchased {kind:?} as {structure:?} for {cost}");
        out_events.push(Event::StructurePurchased { structure, kind });
    }

    fn placing_structures(&self) -> Vec<EntityId> {
        self.roster
            .iter()
            .filter(|(_, entity)| !entity.is_expired())
            .filter(|(_, entity)| entity.as_structure().is_some_and(Structure::is_placing))
            .map(|(id, _)| id)
            .collect()
    }

    fn move_pointer(&mut self, position: Point) {
        self.pointer = position;
        for id in self.placing_structures() {
            if let Some(structure) = self.roster.get_mut(id).and_then(Entity::as_structure_mut) {
                structure.move_to(position);
            }
        }
    }

    fn click(&mut self, out_events: &mut Vec<Event>) {
        let pointer = self.pointer;

        let mut placing: Vec<(EntityId, DrawLayer)> = self
            .placing_structures()
            .into_iter()
            .filter_map(|id| self.roster.get(id).map(|entity| (id, entity.layer())))
            .collect();
        placing.sort_by_key(|&(_, layer)| Reverse(layer));

        let others: Vec<EntityId> = self
            .roster
            .iter()
            .filter(|(_, entity)| !entity.is_expired() && entity.is_visible())
            .filter(|(_, entity)| match entity.body() {
                EntityBody::PurchaseButton(_) => true,
                EntityBody::Structure(structure) => !structure.is_placing(),
                _ => false,
            })
            .map(|(id, _)| id)
            .collect();

        let committed: Vec<Rect> = self
            .roster
            .iter()
            .filter(|(_, entity)| !entity.is_expired())
            .filter_map(|(_, entity)| entity.as_structure())
            .filter(|structure| !structure.is_placing())
            .map(Structure::footprint)
            .collect();

        let field = self.config.field();
        for id in placing.into_iter().map(|(id, _)| id).chain(others) {
            let Some(entity) = self.roster.get_mut(id) else {
                continue;
            };
            if let Some(structure) = entity.as_structure_mut() {
                structure.move_to(pointer);
            }
            let Some(clickable) = entity.as_clickable_mut() else {
                continue;
            };

            let mut ctx = ClickContext::new(
                id,
                pointer,
                field,
                &self.validator,
                &self.path,
                &committed,
                &mut self.economy,
                out_events,
            );
            let consumed = clickable.consume_click(&mut ctx);
            if ctx.is_discarded() {
                entity.expire();
            }
            if consumed {
                return;
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::MovePointer { position } => world.move_pointer(position),
        Command::Click => world.click(out_events),
        Command::PurchaseStructure { kind } => world.purchase(kind, out_events),
    }
}

/// Entity prepared for rendering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    /// Handle of the entity.
    pub id: EntityId,
    /// Layer the entity is painted on.
    pub layer: DrawLayer,
    /// What to paint.
    pub visual: Visual,
}

/// Read-only snapshot of a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSnapshot {
    /// Handle of the unit.
    pub id: EntityId,
    /// Class of the unit.
    pub kind: UnitKind,
    /// Current coordinate.
    pub position: Point,
    /// Progress along the path.
    pub progress: f64,
    /// Remaining health.
    pub health: i32,
}

/// Query functions that expose immutable views into the world state.
pub mod query {
    use garden_defence_core::{Economy, Point};
    use garden_defence_geometry::PathGeometry;

    use super::{
        Damageable, DrawItem, EntityRoster, SimulationClock, UnitSnapshot, World, WorldConfig,
        WELCOME_BANNER,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(_world: &World) -> &'static str {
        WELCOME_BANNER
    }

    /// Current health, money and score.
    #[must_use]
    pub fn economy(world: &World) -> Economy {
        world.economy
    }

    /// Simulation clock.
    #[must_use]
    pub fn clock(world: &World) -> SimulationClock {
        world.clock
    }

    /// Path walked by units.
    #[must_use]
    pub fn path(world: &World) -> &PathGeometry {
        &world.path
    }

    /// Last reported pointer position.
    #[must_use]
    pub fn pointer(world: &World) -> Point {
        world.pointer
    }

    /// Reports whether the game has ended.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Zero-based index of the current wave.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.scheduler.wave()
    }

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Entity roster, for typed queries over the current frame.
    #[must_use]
    pub fn roster(world: &World) -> &EntityRoster {
        &world.roster
    }

    /// Visible, live entities sorted by ascending draw priority.
    ///
    /// The sort is stable, so entities on the same layer keep roster order.
    #[must_use]
    pub fn draw_list(world: &World) -> Vec<DrawItem> {
        let mut items: Vec<DrawItem> = world
            .roster
            .iter()
            .filter(|(_, entity)| entity.is_visible() && !entity.is_expired())
            .map(|(id, entity)| DrawItem {
                id,
                layer: entity.layer(),
                visual: entity.visual(),
            })
            .collect();
        items.sort_by_key(|item| item.layer);
        items
    }

    /// Snapshots of every live unit in roster order.
    #[must_use]
    pub fn unit_view(world: &World) -> Vec<UnitSnapshot> {
        world
            .roster
            .units()
            .filter(|(id, _)| world.roster.get(*id).is_some_and(|entity| !entity.is_expired()))
            .map(|(id, unit)| UnitSnapshot {
                id,
                kind: unit.kind(),
                position: unit.position(),
                progress: unit.progress(),
                health: unit.health(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let path = PathGeometry::new(vec![Point::new(0, 300), Point::new(600, 300)])
            .expect("valid path");
        World::new(path, WorldConfig::default())
    }

    #[test]
    fn new_world_seeds_scenery_and_menu() {
        let world = world();
        let layers: Vec<DrawLayer> = query::draw_list(&world)
            .iter()
            .map(|item| item.layer)
            .collect();
        assert_eq!(
            layers,
            vec![
                DrawLayer::Background,
                DrawLayer::Ui,
                DrawLayer::SuperUi,
                DrawLayer::SuperUi
            ]
        );
        assert_eq!(query::economy(&world), Economy::new(100, 10_000, 0));
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
    }

    #[test]
    fn tick_reports_time_advanced() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut events,
        );
        assert_eq!(
            events.first(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_millis(16)
            })
        );
        assert_eq!(query::clock(&world).total(), Duration::from_millis(16));
    }

    #[test]
    fn projectile_over_stacked_units_damages_only_the_first() {
        let config = WorldConfig {
            spawn_interval_secs: 1_000.0,
            ..WorldConfig::default()
        };
        let path = PathGeometry::new(vec![Point::new(0, 300), Point::new(600, 300)])
            .expect("valid path");
        let mut world = World::new(path, config);

        let parked = MobileUnit::new(UnitKind::Snail, &world.path).with_speed(0.0);
        let front = world.roster.spawn(Entity::unit(parked.clone()));
        let back = world.roster.spawn(Entity::unit(parked));
        let projectile = world.roster.spawn(Entity::projectile(Projectile::new(
            glam::DVec2::new(0.0, 300.0),
            glam::DVec2::ZERO,
            7,
            back,
            300.0,
            world.config.projectile_bounds(),
        )));
        world.roster.end_frame();

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );

        let hits: Vec<&Event> = events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileHit { .. }))
            .collect();
        assert_eq!(
            hits,
            vec![&Event::ProjectileHit {
                projectile,
                unit: front,
                damage: 7,
            }]
        );

        let health = |id: EntityId| {
            query::unit_view(&world)
                .iter()
                .find(|snapshot| snapshot.id == id)
                .map(|snapshot| snapshot.health)
        };
        let full = UnitKind::Snail.max_health();
        assert_eq!(health(front), Some(full - 7));
        assert_eq!(health(back), Some(full));
        assert!(query::roster(&world).get(projectile).is_none());
    }

    #[test]
    fn unaffordable_purchase_is_rejected() {
        let path = PathGeometry::new(vec![Point::new(0, 300), Point::new(600, 300)])
            .expect("valid path");
        let config = WorldConfig {
            starting_money: 99,
            ..WorldConfig::default()
        };
        let mut world = World::new(path, config);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PurchaseStructure {
                kind: StructureKind::Basic,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::PurchaseRejected {
                kind: StructureKind::Basic,
                reason: PurchaseError::InsufficientFunds {
                    cost: 100,
                    available: 99
                },
            }]
        );
        assert_eq!(query::economy(&world).money(), 99);
    }
}
