use std::collections::BTreeMap;

use crate::error::Result;
use crate::workout::{ElementId, Workout};

/// Persistence for authored workouts.
///
/// The countdown engine never talks to a store; hosts load a workout and
/// hand it to the engine.
pub trait WorkoutStore {
    fn list_all(&self) -> Result<Vec<Workout>>;

    fn get_by_id(&self, id: ElementId) -> Result<Option<Workout>>;

    /// Insert, or replace the workout with the same id.
    fn upsert(&mut self, workout: &Workout) -> Result<()>;

    /// Delete by id. Deleting a missing workout is not an error.
    fn delete(&mut self, id: ElementId) -> Result<()>;
}

/// In-process store, ordered by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    workouts: BTreeMap<ElementId, Workout>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_samples() -> Self {
        Self {
            workouts: Workout::samples().into_iter().map(|w| (w.id, w)).collect(),
        }
    }
}

impl WorkoutStore for MemoryStore {
    fn list_all(&self) -> Result<Vec<Workout>> {
        Ok(self.workouts.values().cloned().collect())
    }

    fn get_by_id(&self, id: ElementId) -> Result<Option<Workout>> {
        Ok(self.workouts.get(&id).cloned())
    }

    fn upsert(&mut self, workout: &Workout) -> Result<()> {
        self.workouts.insert(workout.id, workout.clone());
        Ok(())
    }

    fn delete(&mut self, id: ElementId) -> Result<()> {
        self.workouts.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_replaces_by_id() {
        let mut store = MemoryStore::new();
        let workout = Workout::new("First").with_id(7);
        store.upsert(&workout).unwrap();
        store.upsert(&Workout::new("Renamed").with_id(7)).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Renamed");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = MemoryStore::with_samples();
        store.delete(1).unwrap();
        store.delete(1).unwrap();
        assert!(store.get_by_id(1).unwrap().is_none());
        assert!(store.get_by_id(2).unwrap().is_some());
    }
}
