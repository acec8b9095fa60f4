use std::time::Duration;

use garden_defence_core::{Command, Event, Point, StructureKind};
use garden_defence_geometry::PathGeometry;
use garden_defence_world::{self as world, entities::Visual, query, World, WorldConfig};

fn lane() -> PathGeometry {
    PathGeometry::new(vec![Point::new(0, 300), Point::new(600, 300)]).expect("valid path")
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

#[test]
fn purchased_structure_is_hidden_until_next_tick() {
    let mut world = World::new(lane(), WorldConfig::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PurchaseStructure {
            kind: StructureKind::Basic,
        },
        &mut events,
    );

    let structure = match events.as_slice() {
        [Event::StructurePurchased { structure, kind }] => {
            assert_eq!(*kind, StructureKind::Basic);
            *structure
        }
        other => panic!("unexpected events: {other:?}"),
    };

    assert!(query::roster(&world).get(structure).is_none());
    assert_eq!(query::roster(&world).structures().count(), 0);

    let _ = tick(&mut world, 0);
    assert!(query::roster(&world).get(structure).is_some());
    assert_eq!(query::roster(&world).structures().count(), 1);
}

#[test]
fn spawned_unit_does_not_update_during_its_spawn_tick() {
    let mut world = World::new(lane(), WorldConfig::default());

    let mut spawned = None;
    for _ in 0..100 {
        let events = tick(&mut world, 100);
        spawned = events.iter().find_map(|event| match event {
            Event::UnitSpawned { unit, .. } => Some(*unit),
            _ => None,
        });
        if spawned.is_some() {
            break;
        }
    }
    let unit = spawned.expect("a unit is released within ten seconds");

    let view = query::unit_view(&world);
    let snapshot = view
        .iter()
        .find(|snapshot| snapshot.id == unit)
        .expect("unit visible once its spawn tick completes");
    assert_eq!(snapshot.progress, 0.0);
    assert_eq!(snapshot.position, Point::new(0, 300));

    let _ = tick(&mut world, 100);
    let view = query::unit_view(&world);
    let snapshot = view
        .iter()
        .find(|snapshot| snapshot.id == unit)
        .expect("unit still walking");
    assert!(snapshot.progress > 0.0);
}

#[test]
fn first_unit_waits_strictly_longer_than_the_interval() {
    let mut world = World::new(lane(), WorldConfig::default());

    for _ in 0..20 {
        let events = tick(&mut world, 100);
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::UnitSpawned { .. })),
            "no unit before two seconds have passed"
        );
    }

    let events = tick(&mut world, 100);
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::UnitSpawned { .. }))
            .count(),
        1
    );
}

#[test]
fn projectile_fired_during_a_tick_first_moves_on_the_next() {
    let mut world = World::new(lane(), WorldConfig::default());
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::PurchaseStructure {
            kind: StructureKind::Smart,
        },
        &mut events,
    );
    let _ = tick(&mut world, 0);
    world::apply(
        &mut world,
        Command::MovePointer {
            position: Point::new(300, 450),
        },
        &mut events,
    );
    world::apply(&mut world, Command::Click, &mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::StructurePlaced { .. })));

    let mut fired = None;
    for _ in 0..2_000 {
        let events = tick(&mut world, 10);
        fired = events.iter().find_map(|event| match event {
            Event::ProjectileFired { projectile, .. } => Some(*projectile),
            _ => None,
        });
        if let Some(projectile) = fired {
            assert!(
                !events.iter().any(|event| matches!(
                    event,
                    Event::ProjectileHit { projectile: hit, .. } if *hit == projectile
                )),
                "no hit test on the firing tick"
            );
            break;
        }
    }
    let projectile = fired.expect("the structure fires once a snail is in range");

    let roster = query::roster(&world);
    let launched = roster
        .projectiles()
        .find(|(id, _)| *id == projectile)
        .map(|(_, projectile)| projectile.clone())
        .expect("projectile visible once its firing tick completes");
    assert_eq!(launched.travelled(), 0.0);
    assert!(query::draw_list(&world).iter().any(|item| {
        item.id == projectile && matches!(item.visual, Visual::Projectile { .. })
    }));

    let events = tick(&mut world, 10);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ProjectileHit { .. })));
    let travelled = query::roster(&world)
        .projectiles()
        .find(|(id, _)| *id == projectile)
        .map(|(_, projectile)| projectile.travelled())
        .expect("projectile still in flight");
    let step = launched.velocity().length() * 0.01;
    assert!((travelled - step).abs() < 1e-9, "moved {travelled}, expected {step}");
}
