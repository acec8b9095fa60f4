use std::{collections::BTreeMap, time::Duration};

use garden_defence_core::{Command, EntityId, Event, Point, StructureKind, UnitKind};
use garden_defence_geometry::PathGeometry;
use garden_defence_world::{self as world, entities::EntityKind, query, World, WorldConfig};

const STEP: Duration = Duration::from_millis(50);

fn lane() -> PathGeometry {
    PathGeometry::new(vec![Point::new(0, 300), Point::new(600, 300)]).expect("valid path")
}

fn snail_config() -> WorldConfig {
    WorldConfig {
        wave_order: "s".parse().expect("valid order"),
        ..WorldConfig::default()
    }
}

fn place(world: &mut World, kind: StructureKind, at: Point) {
    let mut events = Vec::new();
    world::apply(world, Command::PurchaseStructure { kind }, &mut events);
    world::apply(world, Command::Tick { dt: Duration::ZERO }, &mut events);
    world::apply(world, Command::MovePointer { position: at }, &mut events);
    world::apply(world, Command::Click, &mut events);
    assert!(
        events
            .iter()
            .any(|event| matches!(event, Event::StructurePlaced { .. })),
        "placement at {at:?} failed: {events:?}"
    );
}

fn run(world: &mut World, seconds: u64) -> Vec<Vec<Event>> {
    let ticks = seconds * 1_000 / STEP.as_millis() as u64;
    (0..ticks)
        .map(|_| {
            let mut events = Vec::new();
            world::apply(world, Command::Tick { dt: STEP }, &mut events);
            events
        })
        .collect()
}

#[test]
fn basic_structure_kills_snails_and_collects_bounty() {
    let mut world = World::new(lane(), snail_config());
    place(&mut world, StructureKind::Basic, Point::new(100, 360));

    let mut kills = 0;
    let mut decal_seen = false;
    for _ in 0..(15_000 / STEP.as_millis()) {
        let mut events = Vec::new();
        world::apply(&mut world, Command::Tick { dt: STEP }, &mut events);
        let killed = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    Event::UnitKilled {
                        kind: UnitKind::Snail,
                        ..
                    }
                )
            })
            .count();
        if killed > 0 {
            decal_seen |= query::roster(&world)
                .entities_of_kind(EntityKind::Decal)
                .next()
                .is_some();
        }
        kills += killed as i64;
    }

    assert!(kills >= 1, "expected at least one kill");
    assert!(decal_seen, "killed units leave a decal");

    let economy = query::economy(&world);
    assert_eq!(economy.money(), 10_000 - 100 + 25 * kills);
    assert_eq!(economy.score(), 100 * kills);
    assert_eq!(economy.health(), 100);
}

#[test]
fn projectiles_hit_at_most_once_and_vanish() {
    let mut world = World::new(lane(), snail_config());
    place(&mut world, StructureKind::Basic, Point::new(100, 360));
    place(&mut world, StructureKind::Smart, Point::new(200, 380));

    let ticks = run(&mut world, 20);

    let mut hits: BTreeMap<EntityId, usize> = BTreeMap::new();
    let mut fired = 0;
    for events in &ticks {
        for event in events {
            match event {
                Event::ProjectileHit { projectile, .. } => {
                    *hits.entry(*projectile).or_insert(0) += 1;
                }
                Event::ProjectileFired { .. } => fired += 1,
                _ => {}
            }
        }
    }

    assert!(fired > 0, "structures fired");
    assert!(!hits.is_empty(), "some projectiles connected");
    assert!(hits.values().all(|&count| count == 1));
    for projectile in hits.keys() {
        assert!(
            query::roster(&world).get(*projectile).is_none(),
            "projectile {projectile:?} removed after its hit"
        );
    }
}

#[test]
fn structures_hold_fire_without_targets() {
    let config = WorldConfig {
        spawn_interval_secs: 1_000.0,
        ..WorldConfig::default()
    };
    let mut world = World::new(lane(), config);
    place(&mut world, StructureKind::Smart, Point::new(300, 450));

    let ticks = run(&mut world, 5);
    assert!(ticks
        .iter()
        .flatten()
        .all(|event| !matches!(event, Event::ProjectileFired { .. })));

    let structure = query::roster(&world)
        .structures()
        .next()
        .map(|(_, structure)| structure.reload_fraction())
        .expect("structure placed");
    assert_eq!(structure, 1.0, "an idle structure stays loaded");
}

#[test]
fn escaped_units_damage_the_defender() {
    let config = WorldConfig {
        wave_order: "c".parse().expect("valid order"),
        ..WorldConfig::default()
    };
    let mut world = World::new(lane(), config);

    let ticks = run(&mut world, 10);
    let escaped: i64 = ticks
        .iter()
        .flatten()
        .filter_map(|event| match event {
            Event::UnitEscaped { damage, .. } => Some(*damage),
            _ => None,
        })
        .sum();

    assert!(escaped >= UnitKind::Cargo.damage_on_arrival());
    assert_eq!(query::economy(&world).health(), 100 - escaped);
}
