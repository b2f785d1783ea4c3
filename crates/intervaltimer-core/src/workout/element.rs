use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{next_id, Color, ElementId};
use crate::error::ValidationError;

pub const DEFAULT_EXERCISE_NAME: &str = "Exercise";
pub const DEFAULT_BLOCK_NAME: &str = "Block";

/// Classification of an exercise. Only affects labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    #[serde(alias = "prep")]
    Preparation,
    Work,
    Rest,
}

impl ExerciseKind {
    /// Stable storage tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseKind::Preparation => "prep",
            ExerciseKind::Work => "work",
            ExerciseKind::Rest => "rest",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExerciseKind::Preparation => "Prep",
            ExerciseKind::Work => "Work",
            ExerciseKind::Rest => "Rest",
        })
    }
}

impl FromStr for ExerciseKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prep" | "preparation" => Ok(ExerciseKind::Preparation),
            "work" => Ok(ExerciseKind::Work),
            "rest" => Ok(ExerciseKind::Rest),
            _ => Err(ValidationError::InvalidKind(s.to_string())),
        }
    }
}

/// A single timed exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: ElementId,
    pub name: String,
    pub kind: ExerciseKind,
    pub duration_ms: u64,
    #[serde(default)]
    pub color: Color,
}

impl Exercise {
    /// Create an exercise with a fresh id and no color.
    ///
    /// A blank name falls back to [`DEFAULT_EXERCISE_NAME`].
    pub fn new(name: impl Into<String>, kind: ExerciseKind, duration_ms: u64) -> Self {
        Self {
            id: next_id(),
            name: name_or_default(name.into(), DEFAULT_EXERCISE_NAME),
            kind,
            duration_ms,
            color: Color::Unset,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name_or_default(name.into(), DEFAULT_EXERCISE_NAME);
    }
}

/// A group of exercises repeated `rounds` times.
///
/// Blocks are one level deep: `elements` may only hold exercises. The editing
/// methods below refuse nested blocks, and flattening skips any that arrive
/// through deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: ElementId,
    pub name: String,
    pub rounds: u32,
    #[serde(default)]
    pub elements: Vec<WorkoutElement>,
    /// Cached `rounds * sum(child durations)`, kept current by the editing
    /// methods. Display only.
    pub duration_ms: u64,
}

impl Block {
    /// Create a block with a fresh id.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidRounds`] if `rounds` is zero.
    pub fn new(
        name: impl Into<String>,
        rounds: u32,
        exercises: Vec<Exercise>,
    ) -> Result<Self, ValidationError> {
        if rounds == 0 {
            return Err(ValidationError::InvalidRounds(rounds));
        }
        let mut block = Self {
            id: next_id(),
            name: name_or_default(name.into(), DEFAULT_BLOCK_NAME),
            rounds,
            elements: exercises.into_iter().map(WorkoutElement::Exercise).collect(),
            duration_ms: 0,
        };
        block.recompute_duration();
        Ok(block)
    }

    pub fn with_id(mut self, id: ElementId) -> Self {
        self.id = id;
        self
    }

    /// Exercises in order, ignoring any nested blocks.
    pub fn exercises(&self) -> impl Iterator<Item = &Exercise> {
        self.elements.iter().filter_map(|e| match e {
            WorkoutElement::Exercise(ex) => Some(ex),
            WorkoutElement::Block(_) => None,
        })
    }

    /// Duration of one pass through the exercises.
    pub fn round_duration_ms(&self) -> u64 {
        self.exercises()
            .fold(0u64, |acc, ex| acc.saturating_add(ex.duration_ms))
    }

    pub fn recompute_duration(&mut self) {
        self.duration_ms = self
            .round_duration_ms()
            .saturating_mul(u64::from(self.rounds));
    }

    /// Append an element to the block.
    ///
    /// # Errors
    /// Returns [`ValidationError::NestedBlock`] for a block element.
    pub fn add_element(&mut self, element: WorkoutElement) -> Result<(), ValidationError> {
        if let WorkoutElement::Block(_) = element {
            return Err(ValidationError::NestedBlock {
                block: self.name.clone(),
            });
        }
        self.elements.push(element);
        self.recompute_duration();
        Ok(())
    }

    /// # Errors
    /// Returns [`ValidationError::InvalidRounds`] if `rounds` is zero.
    pub fn set_rounds(&mut self, rounds: u32) -> Result<(), ValidationError> {
        if rounds == 0 {
            return Err(ValidationError::InvalidRounds(rounds));
        }
        self.rounds = rounds;
        self.recompute_duration();
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name_or_default(name.into(), DEFAULT_BLOCK_NAME);
    }

    /// Replace the exercise with the same id. Returns `false` if absent.
    pub fn replace_exercise(&mut self, exercise: Exercise) -> bool {
        let slot = self.elements.iter_mut().find(|e| match e {
            WorkoutElement::Exercise(ex) => ex.id == exercise.id,
            WorkoutElement::Block(_) => false,
        });
        match slot {
            Some(slot) => {
                *slot = WorkoutElement::Exercise(exercise);
                self.recompute_duration();
                true
            }
            None => false,
        }
    }

    /// Remove the child with `id`. Returns `false` if absent.
    pub fn remove_element(&mut self, id: ElementId) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id() != id);
        let removed = self.elements.len() != before;
        if removed {
            self.recompute_duration();
        }
        removed
    }
}

/// Workout content: an exercise or a block of exercises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutElement {
    Exercise(Exercise),
    Block(Block),
}

impl WorkoutElement {
    pub fn id(&self) -> ElementId {
        match self {
            WorkoutElement::Exercise(e) => e.id,
            WorkoutElement::Block(b) => b.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            WorkoutElement::Exercise(e) => &e.name,
            WorkoutElement::Block(b) => &b.name,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            WorkoutElement::Exercise(e) => e.duration_ms,
            WorkoutElement::Block(b) => b.duration_ms,
        }
    }

    /// Blocks carry no color of their own.
    pub fn color(&self) -> Color {
        match self {
            WorkoutElement::Exercise(e) => e.color,
            WorkoutElement::Block(_) => Color::Unset,
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self, WorkoutElement::Block(_))
    }
}

impl From<Exercise> for WorkoutElement {
    fn from(value: Exercise) -> Self {
        WorkoutElement::Exercise(value)
    }
}

impl From<Block> for WorkoutElement {
    fn from(value: Block) -> Self {
        WorkoutElement::Block(value)
    }
}

pub(crate) fn name_or_default(name: String, default: &str) -> String {
    if name.trim().is_empty() {
        default.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_fall_back_to_defaults() {
        assert_eq!(Exercise::new("  ", ExerciseKind::Work, 1000).name, "Exercise");
        assert_eq!(Block::new("", 1, vec![]).unwrap().name, "Block");
    }

    #[test]
    fn block_duration_tracks_rounds_and_children() {
        let mut block = Block::new(
            "Circuit",
            3,
            vec![
                Exercise::new("A", ExerciseKind::Work, 5000),
                Exercise::new("B", ExerciseKind::Rest, 3000),
            ],
        )
        .unwrap();
        assert_eq!(block.duration_ms, 24_000);

        block.set_rounds(2).unwrap();
        assert_eq!(block.duration_ms, 16_000);

        block
            .add_element(Exercise::new("C", ExerciseKind::Work, 2000).into())
            .unwrap();
        assert_eq!(block.duration_ms, 20_000);
    }

    #[test]
    fn zero_rounds_rejected() {
        assert_eq!(
            Block::new("x", 0, vec![]).unwrap_err(),
            ValidationError::InvalidRounds(0)
        );
        let mut block = Block::new("x", 1, vec![]).unwrap();
        assert!(block.set_rounds(0).is_err());
        assert_eq!(block.rounds, 1);
    }

    #[test]
    fn nested_block_rejected() {
        let mut outer = Block::new("Outer", 2, vec![]).unwrap();
        let inner = Block::new("Inner", 2, vec![]).unwrap();
        let err = outer.add_element(inner.into()).unwrap_err();
        assert!(matches!(err, ValidationError::NestedBlock { .. }));
        assert!(outer.elements.is_empty());
    }

    #[test]
    fn replace_and_remove_by_id() {
        let a = Exercise::new("A", ExerciseKind::Work, 1000);
        let a_id = a.id;
        let mut block = Block::new("Circuit", 2, vec![a]).unwrap();

        let edited = Exercise::new("A2", ExerciseKind::Rest, 4000).with_id(a_id);
        assert!(block.replace_exercise(edited));
        assert_eq!(block.duration_ms, 8000);
        assert_eq!(block.exercises().next().unwrap().name, "A2");

        assert!(block.remove_element(a_id));
        assert!(!block.remove_element(a_id));
        assert_eq!(block.duration_ms, 0);
    }

    #[test]
    fn kind_parses_short_and_long_forms() {
        assert_eq!("prep".parse::<ExerciseKind>().unwrap(), ExerciseKind::Preparation);
        assert_eq!("Preparation".parse::<ExerciseKind>().unwrap(), ExerciseKind::Preparation);
        assert_eq!("REST".parse::<ExerciseKind>().unwrap(), ExerciseKind::Rest);
        assert!("sprint".parse::<ExerciseKind>().is_err());
    }

    #[test]
    fn element_serializes_with_type_tag() {
        let ex = Exercise::new("Squat", ExerciseKind::Work, 30_000).with_color(Color::RED);
        let json = serde_json::to_value(WorkoutElement::from(ex.clone())).unwrap();
        assert_eq!(json["type"], "exercise");
        assert_eq!(json["kind"], "work");

        let back: WorkoutElement = serde_json::from_value(json).unwrap();
        assert_eq!(back, WorkoutElement::Exercise(ex));
    }
}
