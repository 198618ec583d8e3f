use crate::actor::{Actor, ActorId};

/// Fixed-capacity slot array owning all live actor state.
///
/// Slot index doubles as actor identity. `spawn` always takes the lowest
/// free slot, so the update loop stays a flat scan bounded by the high-water
/// mark and no allocation happens during simulation. The price is that ids
/// are stable only while the occupant is active; holders must re-validate
/// after any despawn.
#[derive(Debug)]
pub struct ActorPool {
    slots: Vec<Option<Actor>>,
    active: usize,
    high_water: usize,
}

impl ActorPool {
    /// Create an empty pool with the given slot count.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            active: 0,
            high_water: 0,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active actors.
    pub fn len(&self) -> usize {
        self.active
    }

    /// Whether no actor is active.
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// One past the highest active slot index; bounds iteration.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Place an actor in the lowest free slot. Returns `None` when full.
    pub fn spawn(&mut self, actor: Actor) -> Option<ActorId> {
        let idx = self.slots.iter().position(|slot| slot.is_none())?;
        self.slots[idx] = Some(actor);
        self.active += 1;
        if idx + 1 > self.high_water {
            self.high_water = idx + 1;
        }
        Some(ActorId(idx as u32))
    }

    /// Remove and return the actor in the slot. No-op if already empty.
    pub fn despawn(&mut self, id: ActorId) -> Option<Actor> {
        let actor = self.slots.get_mut(id.0 as usize)?.take()?;
        self.active -= 1;
        while self.high_water > 0 && self.slots[self.high_water - 1].is_none() {
            self.high_water -= 1;
        }
        Some(actor)
    }

    /// The actor in the slot, if one is active there.
    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.slots.get(id.0 as usize)?.as_ref()
    }

    /// Mutable access to the actor in the slot, if one is active there.
    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.slots.get_mut(id.0 as usize)?.as_mut()
    }

    /// Whether the slot currently holds an active actor.
    pub fn contains(&self, id: ActorId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate active actors in ascending slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ActorId, &Actor)> {
        self.slots[..self.high_water]
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|actor| (ActorId(idx as u32), actor)))
    }

    /// Snapshot of all active ids in ascending slot order.
    ///
    /// The per-actor pass iterates this snapshot so actors spawned mid-tick
    /// are not visited until the next tick.
    pub fn active_ids(&self) -> Vec<ActorId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Remove every actor.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.active = 0;
        self.high_water = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fauna_core::{Sex, SpeciesDef, SpeciesId, Vec2};

    fn actor() -> Actor {
        let def = SpeciesDef::new(SpeciesId(1), "deer");
        Actor::new(&def, Vec2::ZERO, Sex::Male)
    }

    #[test]
    fn spawn_takes_lowest_free_slot() {
        let mut pool = ActorPool::new(4);
        let a = pool.spawn(actor()).unwrap();
        let b = pool.spawn(actor()).unwrap();
        let c = pool.spawn(actor()).unwrap();
        assert_eq!((a, b, c), (ActorId(0), ActorId(1), ActorId(2)));

        pool.despawn(b);
        // The freed middle slot is reused before any higher one.
        assert_eq!(pool.spawn(actor()), Some(ActorId(1)));
    }

    #[test]
    fn spawn_fails_when_full() {
        let mut pool = ActorPool::new(2);
        assert!(pool.spawn(actor()).is_some());
        assert!(pool.spawn(actor()).is_some());
        assert_eq!(pool.spawn(actor()), None);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn double_despawn_is_noop() {
        let mut pool = ActorPool::new(2);
        let id = pool.spawn(actor()).unwrap();
        assert!(pool.despawn(id).is_some());
        assert!(pool.despawn(id).is_none());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn get_returns_only_active() {
        let mut pool = ActorPool::new(2);
        let id = pool.spawn(actor()).unwrap();
        assert!(pool.get(id).is_some());
        pool.despawn(id);
        assert!(pool.get(id).is_none());
        assert!(pool.get(ActorId(99)).is_none());
    }

    #[test]
    fn high_water_shrinks_lazily() {
        let mut pool = ActorPool::new(8);
        let ids: Vec<_> = (0..4).map(|_| pool.spawn(actor()).unwrap()).collect();
        assert_eq!(pool.high_water(), 4);

        // Removing a middle slot leaves the mark alone.
        pool.despawn(ids[1]);
        assert_eq!(pool.high_water(), 4);

        // Removing the top slot walks the mark back over the hole too.
        pool.despawn(ids[3]);
        assert_eq!(pool.high_water(), 3);
        pool.despawn(ids[2]);
        assert_eq!(pool.high_water(), 1);
    }

    #[test]
    fn iter_visits_ascending_active_slots() {
        let mut pool = ActorPool::new(8);
        let ids: Vec<_> = (0..5).map(|_| pool.spawn(actor()).unwrap()).collect();
        pool.despawn(ids[2]);

        let visited: Vec<_> = pool.iter().map(|(id, _)| id.0).collect();
        assert_eq!(visited, vec![0, 1, 3, 4]);
        assert_eq!(pool.active_ids().len(), 4);
    }

    #[test]
    fn clear_empties_everything() {
        let mut pool = ActorPool::new(4);
        pool.spawn(actor());
        pool.spawn(actor());
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.high_water(), 0);
        assert_eq!(pool.spawn(actor()), Some(ActorId(0)));
    }
}
