//! Double-buffered entity storage.
//!
//! Entities live in a single id-keyed store. The roster keeps two id lists:
//! `current`, which queries and renderers read, and `next`, which is assembled
//! while a frame is open. Spawned entities land only in `next` and stay
//! invisible to every lookup until [`EntityRoster::end_frame`] promotes it.

use std::collections::{BTreeMap, BTreeSet};

use garden_defence_core::EntityId;

use crate::entities::{Entity, EntityKind, MobileUnit, Projectile, Structure};

/// Owner of every entity in the simulation.
#[derive(Debug, Default)]
pub struct EntityRoster {
    store: BTreeMap<EntityId, Entity>,
    current: Vec<EntityId>,
    next: Option<Vec<EntityId>>,
    pending: BTreeSet<EntityId>,
    next_id: u32,
}

impl EntityRoster {
    /// Creates an empty roster with no open frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the next frame as a copy of the current one.
    ///
    /// Does nothing if a frame is already open, so entities spawned between
    /// ticks are carried into the tick's frame.
    pub fn begin_frame(&mut self) {
        if self.next.is_none() {
            self.next = Some(self.current.clone());
        }
    }

    /// Registers an entity in the next frame and returns its handle.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        self.begin_frame();
        if let Some(next) = self.next.as_mut() {
            next.push(id);
        }
        let _ = self.store.insert(id, entity);
        let _ = self.pending.insert(id);
        id
    }

    /// Drops expired entities and promotes the next frame to current.
    pub fn end_frame(&mut self) {
        let Some(mut next) = self.next.take() else {
            return;
        };

        let store = &mut self.store;
        next.retain(|id| {
            let expired = store.get(id).map_or(true, Entity::is_expired);
            if expired {
                let _ = store.remove(id);
            }
            !expired
        });

        self.current = next;
        self.pending.clear();
    }

    /// Reports whether a frame is open.
    #[must_use]
    pub fn is_frame_open(&self) -> bool {
        self.next.is_some()
    }

    /// Resolves a handle against the current frame.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if self.pending.contains(&id) {
            return None;
        }
        self.store.get(&id)
    }

    /// Resolves a handle against the current frame for mutation.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if self.pending.contains(&id) {
            return None;
        }
        self.store.get_mut(&id)
    }

    /// Handles of the current frame in insertion order.
    #[must_use]
    pub fn current_ids(&self) -> &[EntityId] {
        &self.current
    }

    /// Number of entities in the current frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Reports whether the current frame holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Iterates the current frame in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.current
            .iter()
            .filter_map(move |&id| self.store.get(&id).map(|entity| (id, entity)))
    }

    /// Iterates current entities matching `predicate`.
    pub fn query<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = (EntityId, &'a Entity)> + 'a
    where
        P: Fn(&Entity) -> bool + 'a,
    {
        self.iter().filter(move |(_, entity)| predicate(*entity))
    }

    /// Iterates current entities of one variant.
    pub fn entities_of_kind(
        &self,
        kind: EntityKind,
    ) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.query(move |entity| entity.kind() == kind)
    }

    /// Iterates current mobile units, expired or not.
    pub fn units(&self) -> impl Iterator<Item = (EntityId, &MobileUnit)> + '_ {
        self.iter()
            .filter_map(|(id, entity)| entity.as_unit().map(|unit| (id, unit)))
    }

    /// Iterates current structures, expired or not.
    pub fn structures(&self) -> impl Iterator<Item = (EntityId, &Structure)> + '_ {
        self.iter()
            .filter_map(|(id, entity)| entity.as_structure().map(|structure| (id, structure)))
    }

    /// Iterates current projectiles, expired or not.
    pub fn projectiles(&self) -> impl Iterator<Item = (EntityId, &Projectile)> + '_ {
        self.iter()
            .filter_map(|(id, entity)| entity.as_projectile().map(|projectile| (id, projectile)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Decal, Decoration};
    use garden_defence_core::{Point, UnitKind};

    fn decal() -> Entity {
        Entity::decal(Decal::new(UnitKind::Snail, Point::new(0, 0), 3.0))
    }

    #[test]
    fn spawned_entities_stay_hidden_until_promotion() {
        let mut roster = EntityRoster::new();
        roster.begin_frame();
        let id = roster.spawn(decal());

        assert!(roster.get(id).is_none());
        assert!(roster.get_mut(id).is_none());
        assert_eq!(roster.iter().count(), 0);

        roster.end_frame();
        assert!(roster.get(id).is_some());
        assert_eq!(roster.current_ids(), &[id]);
    }

    #[test]
    fn spawn_opens_frame_implicitly() {
        let mut roster = EntityRoster::new();
        assert!(!roster.is_frame_open());
        let id = roster.spawn(decal());
        assert!(roster.is_frame_open());

        roster.begin_frame();
        roster.end_frame();
        assert!(roster.get(id).is_some(), "between-tick spawn survives begin_frame");
    }

    #[test]
    fn expired_entities_are_dropped_at_frame_end() {
        let mut roster = EntityRoster::new();
        let first = roster.spawn(decal());
        let second = roster.spawn(Entity::decoration(Decoration::GameOverBanner));
        roster.end_frame();

        roster.begin_frame();
        roster.get_mut(first).expect("present").expire();
        assert!(roster.get(first).is_some(), "still current until frame end");
        roster.end_frame();

        assert!(roster.get(first).is_none());
        assert_eq!(roster.current_ids(), &[second]);
    }

    #[test]
    fn end_frame_without_open_frame_is_a_no_op() {
        let mut roster = EntityRoster::new();
        let id = roster.spawn(decal());
        roster.end_frame();
        roster.end_frame();
        assert_eq!(roster.len(), 1);
        assert!(roster.get(id).is_some());
    }

    #[test]
    fn typed_queries_preserve_insertion_order() {
        let mut roster = EntityRoster::new();
        let banner = roster.spawn(Entity::decoration(Decoration::GameOverBanner));
        let first = roster.spawn(decal());
        let second = roster.spawn(decal());
        roster.end_frame();

        let decals: Vec<_> = roster
            .entities_of_kind(EntityKind::Decal)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(decals, vec![first, second]);

        let others: Vec<_> = roster
            .query(|entity| entity.kind() != EntityKind::Decal)
            .map(|(id, _)| id)
            .collect();
        assert_eq!(others, vec![banner]);
        assert_eq!(roster.units().count(), 0);
    }
}
