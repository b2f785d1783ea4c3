//! Workout data model.
//!
//! A [`Workout`] is an ordered list of [`WorkoutElement`]s: single exercises,
//! or blocks of exercises repeated for a number of rounds. The countdown
//! engine only ever reads a workout; all mutation goes through the editing
//! methods here, which keep cached block durations in sync.

mod color;
mod element;

pub use color::Color;
pub use element::{
    Block, Exercise, ExerciseKind, WorkoutElement, DEFAULT_BLOCK_NAME, DEFAULT_EXERCISE_NAME,
};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use element::name_or_default;

/// Identifier shared by workouts and elements.
pub type ElementId = u64;

pub const DEFAULT_WORKOUT_NAME: &str = "New workout";

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Mint a new id: epoch milliseconds with three random low digits.
///
/// Ids handed out by one process are strictly increasing.
pub fn next_id() -> ElementId {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let candidate = millis
        .saturating_mul(1000)
        .saturating_add(rand::thread_rng().gen_range(0..1000));
    let previous = LAST_ID
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |last| {
            Some(candidate.max(last + 1))
        })
        .unwrap_or(candidate);
    candidate.max(previous + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub id: ElementId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<WorkoutElement>,
}

impl Workout {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            name: name_or_default(name.into(), DEFAULT_WORKOUT_NAME),
            description: String::new(),
            elements: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    pub fn with_element(mut self, element: impl Into<WorkoutElement>) -> Self {
        self.elements.push(element.into());
        self
    }

    pub fn push(&mut self, element: impl Into<WorkoutElement>) {
        self.elements.push(element.into());
    }

    /// Sum of cached element durations.
    pub fn total_duration_ms(&self) -> u64 {
        self.elements
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.duration_ms()))
    }

    pub fn find_element(&self, id: ElementId) -> Option<&WorkoutElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Find an exercise by id, looking inside blocks too.
    pub fn find_exercise(&self, id: ElementId) -> Option<&Exercise> {
        self.elements.iter().find_map(|e| match e {
            WorkoutElement::Exercise(ex) if ex.id == id => Some(ex),
            WorkoutElement::Exercise(_) => None,
            WorkoutElement::Block(b) => b.exercises().find(|ex| ex.id == id),
        })
    }

    /// Replace the exercise with the same id wherever it sits, refreshing the
    /// owning block's cached duration. Returns `false` if absent.
    pub fn update_exercise(&mut self, exercise: Exercise) -> bool {
        let top_level = self
            .find_element(exercise.id)
            .is_some_and(|e| !e.is_block());
        if top_level {
            return self.replace_element(exercise.into());
        }
        self.elements.iter_mut().any(|e| match e {
            WorkoutElement::Block(b) => b.replace_exercise(exercise.clone()),
            WorkoutElement::Exercise(_) => false,
        })
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name_or_default(name.into(), DEFAULT_WORKOUT_NAME);
    }

    /// Find a top-level block by id.
    pub fn block_mut(&mut self, id: ElementId) -> Option<&mut Block> {
        self.elements.iter_mut().find_map(|e| match e {
            WorkoutElement::Block(b) if b.id == id => Some(b),
            _ => None,
        })
    }

    /// Replace the top-level element with the same id. Returns `false` if absent.
    pub fn replace_element(&mut self, element: WorkoutElement) -> bool {
        match self.elements.iter_mut().find(|e| e.id() == element.id()) {
            Some(slot) => {
                *slot = element;
                true
            }
            None => false,
        }
    }

    /// Remove an element by id, looking inside blocks too.
    /// Returns `false` if nothing matched.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id() != id);
        if self.elements.len() != before {
            return true;
        }
        self.elements.iter_mut().any(|e| match e {
            WorkoutElement::Block(b) => b.remove_element(id),
            WorkoutElement::Exercise(_) => false,
        })
    }

    /// Workouts seeded into an empty store.
    pub fn samples() -> Vec<Workout> {
        vec![
            Workout {
                id: 1,
                name: "Morning warm-up".into(),
                description: "Light ten-minute warm-up".into(),
                elements: vec![
                    Exercise::new("Warm-up", ExerciseKind::Preparation, 60_000)
                        .with_id(101)
                        .into(),
                    Exercise::new("Jog in place", ExerciseKind::Work, 120_000)
                        .with_id(102)
                        .into(),
                    Exercise::new("Rest", ExerciseKind::Rest, 30_000)
                        .with_id(103)
                        .into(),
                ],
            },
            Workout {
                id: 2,
                name: "Interval run".into(),
                description: "Run with 30/30 intervals".into(),
                elements: vec![
                    Exercise::new("Warm-up", ExerciseKind::Preparation, 120_000)
                        .with_id(201)
                        .into(),
                    Exercise::new("Sprint", ExerciseKind::Work, 30_000)
                        .with_id(202)
                        .into(),
                    Exercise::new("Walk", ExerciseKind::Rest, 30_000)
                        .with_id(203)
                        .into(),
                ],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_embed_creation_time() {
        let before = chrono::Utc::now().timestamp_millis() as u64;
        let id = next_id();
        assert!(id / 1000 >= before);
    }

    #[test]
    fn ids_strictly_increase() {
        let ids: Vec<_> = (0..500).map(|_| next_id()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn total_uses_cached_block_duration() {
        let block = Block::new(
            "Circuit",
            4,
            vec![Exercise::new("Push-ups", ExerciseKind::Work, 20_000)],
        )
        .unwrap();
        let workout = Workout::new("Test")
            .with_element(Exercise::new("Prep", ExerciseKind::Preparation, 10_000))
            .with_element(block);
        assert_eq!(workout.total_duration_ms(), 90_000);
    }

    #[test]
    fn replace_locates_by_id() {
        let ex = Exercise::new("Old", ExerciseKind::Work, 1000);
        let id = ex.id;
        let mut workout = Workout::new("W").with_element(ex);

        let updated = Exercise::new("New", ExerciseKind::Work, 2000).with_id(id);
        assert!(workout.replace_element(updated.into()));
        assert_eq!(workout.elements[0].name(), "New");

        let stranger = Exercise::new("Stranger", ExerciseKind::Rest, 1000);
        assert!(!workout.replace_element(stranger.into()));
        assert_eq!(workout.elements.len(), 1);
    }

    #[test]
    fn remove_reaches_into_blocks() {
        let inner = Exercise::new("Inner", ExerciseKind::Work, 1000);
        let inner_id = inner.id;
        let block = Block::new("B", 2, vec![inner]).unwrap();
        let block_id = block.id;
        let mut workout = Workout::new("W").with_element(block);

        assert!(workout.remove_element(inner_id));
        assert_eq!(workout.total_duration_ms(), 0);
        assert!(workout.remove_element(block_id));
        assert!(workout.elements.is_empty());
        assert!(!workout.remove_element(block_id));
    }

    #[test]
    fn update_exercise_reaches_into_blocks() {
        let top = Exercise::new("Top", ExerciseKind::Work, 1000);
        let inner = Exercise::new("Inner", ExerciseKind::Work, 1000);
        let (top_id, inner_id) = (top.id, inner.id);
        let block = Block::new("B", 3, vec![inner]).unwrap();
        let mut workout = Workout::new("W").with_element(top).with_element(block);

        let mut edited = workout.find_exercise(inner_id).unwrap().clone();
        edited.name = "Renamed".into();
        edited.duration_ms = 2000;
        assert!(workout.update_exercise(edited));
        assert_eq!(workout.find_exercise(inner_id).unwrap().name, "Renamed");
        assert_eq!(workout.elements[1].duration_ms(), 6000);

        let mut edited = workout.find_exercise(top_id).unwrap().clone();
        edited.kind = ExerciseKind::Rest;
        assert!(workout.update_exercise(edited));
        assert_eq!(workout.find_exercise(top_id).unwrap().kind, ExerciseKind::Rest);
        assert_eq!(workout.total_duration_ms(), 7000);

        let stranger = Exercise::new("Stranger", ExerciseKind::Work, 1000);
        assert!(!workout.update_exercise(stranger));
    }

    #[test]
    fn blank_workout_name_falls_back_to_default() {
        let mut workout = Workout::new("W");
        workout.set_name("  ");
        assert_eq!(workout.name, DEFAULT_WORKOUT_NAME);
        workout.set_name("Legs");
        assert_eq!(workout.name, "Legs");
    }

    #[test]
    fn samples_have_unique_ids() {
        let samples = Workout::samples();
        assert_eq!(samples.len(), 2);
        let mut ids: Vec<_> = samples
            .iter()
            .flat_map(|w| w.elements.iter().map(|e| e.id()))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
