use serde::{Deserialize, Serialize};

use crate::workout::{Color, ExerciseKind, Workout, WorkoutElement};

/// One non-repeating unit of countdown time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStep {
    /// Display label; block steps read `"Circuit (2/4): Push-ups"`.
    pub label: String,
    pub kind: ExerciseKind,
    pub duration_ms: u64,
    pub color: Color,
}

/// Expand a workout into its linear step sequence.
///
/// Exercises yield one step each. A block yields `rounds * exercises` steps,
/// round by round, in place. Blocks nested inside a block are never
/// expanded: the nesting depth is fixed at one.
pub fn flatten(workout: &Workout) -> Vec<TimerStep> {
    let mut steps = Vec::new();
    for element in &workout.elements {
        match element {
            WorkoutElement::Exercise(ex) => steps.push(TimerStep {
                label: ex.name.clone(),
                kind: ex.kind,
                duration_ms: ex.duration_ms,
                color: ex.color,
            }),
            WorkoutElement::Block(block) => {
                for round in 1..=block.rounds {
                    for child in &block.elements {
                        match child {
                            WorkoutElement::Exercise(ex) => steps.push(TimerStep {
                                label: format!(
                                    "{} ({}/{}): {}",
                                    block.name, round, block.rounds, ex.name
                                ),
                                kind: ex.kind,
                                duration_ms: ex.duration_ms,
                                color: ex.color,
                            }),
                            WorkoutElement::Block(nested) => {
                                if round == 1 {
                                    tracing::debug!(
                                        block = %block.name,
                                        nested = %nested.name,
                                        "skipping nested block"
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Block, Exercise};

    fn exercise(name: &str, ms: u64) -> Exercise {
        Exercise::new(name, ExerciseKind::Work, ms)
    }

    #[test]
    fn block_rounds_expand_in_order() {
        let block = Block::new("Circuit", 3, vec![exercise("A", 5000), exercise("B", 3000)]).unwrap();
        let steps = flatten(&Workout::new("W").with_element(block));

        let labels: Vec<_> = steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(
            labels,
            [
                "Circuit (1/3): A",
                "Circuit (1/3): B",
                "Circuit (2/3): A",
                "Circuit (2/3): B",
                "Circuit (3/3): A",
                "Circuit (3/3): B",
            ]
        );
        let durations: Vec<_> = steps.iter().map(|s| s.duration_ms).collect();
        assert_eq!(durations, [5000, 3000, 5000, 3000, 5000, 3000]);
    }

    #[test]
    fn exercise_fields_copied_verbatim() {
        let ex = Exercise::new("Plank", ExerciseKind::Rest, 45_000).with_color(Color::ORANGE);
        let steps = flatten(&Workout::new("W").with_element(ex));
        assert_eq!(
            steps,
            vec![TimerStep {
                label: "Plank".into(),
                kind: ExerciseKind::Rest,
                duration_ms: 45_000,
                color: Color::ORANGE,
            }]
        );
    }

    #[test]
    fn nested_block_is_absent() {
        let mut outer = Block::new("Outer", 2, vec![exercise("A", 1000)]).unwrap();
        // Bypass the editor guard, as a hand-written or legacy record might.
        outer
            .elements
            .push(Block::new("Inner", 5, vec![exercise("X", 9000)]).unwrap().into());

        let steps = flatten(&Workout::new("W").with_element(outer));
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| !s.label.contains("Inner")));
        assert!(steps.iter().all(|s| !s.label.contains('X')));
    }

    #[test]
    fn empty_inputs_yield_no_steps() {
        assert!(flatten(&Workout::new("Empty")).is_empty());

        let empty_block = Block::new("Empty", 3, vec![]).unwrap();
        let mut zero_rounds = Block::new("Zero", 1, vec![exercise("A", 1000)]).unwrap();
        zero_rounds.rounds = 0;
        let workout = Workout::new("W")
            .with_element(empty_block)
            .with_element(zero_rounds);
        assert!(flatten(&workout).is_empty());
    }

    #[test]
    fn siblings_keep_their_order() {
        let workout = Workout::new("W")
            .with_element(exercise("First", 1000))
            .with_element(Block::new("B", 2, vec![exercise("Mid", 1000)]).unwrap())
            .with_element(exercise("Last", 1000));
        let labels: Vec<_> = flatten(&workout).into_iter().map(|s| s.label).collect();
        assert_eq!(labels, ["First", "B (1/2): Mid", "B (2/2): Mid", "Last"]);
    }
}
