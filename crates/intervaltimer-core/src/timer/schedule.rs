use super::flatten::{flatten, TimerStep};
use crate::workout::Workout;

/// Flattened steps plus their suffix sums.
///
/// `remaining_after[i]` is the time left from the start of step `i` to the end
/// of the workout; it has `steps.len() + 1` entries and ends with `0`.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    steps: Vec<TimerStep>,
    remaining_after: Vec<u64>,
}

impl Schedule {
    pub fn new(steps: Vec<TimerStep>) -> Self {
        let mut remaining_after = vec![0u64; steps.len() + 1];
        for i in (0..steps.len()).rev() {
            remaining_after[i] = remaining_after[i + 1].saturating_add(steps[i].duration_ms);
        }
        Self {
            steps,
            remaining_after,
        }
    }

    pub fn from_workout(workout: &Workout) -> Self {
        Self::new(flatten(workout))
    }

    pub fn steps(&self) -> &[TimerStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&TimerStep> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.remaining_after[0]
    }

    /// Time from the start of step `index` to the end; `0` past the end.
    pub fn remaining_after(&self, index: usize) -> u64 {
        self.remaining_after.get(index).copied().unwrap_or(0)
    }

    /// Time spent before step `index` begins.
    pub fn elapsed_before(&self, index: usize) -> u64 {
        self.total_duration_ms() - self.remaining_after(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{Color, ExerciseKind};
    use proptest::prelude::*;

    fn step(ms: u64) -> TimerStep {
        TimerStep {
            label: String::new(),
            kind: ExerciseKind::Work,
            duration_ms: ms,
            color: Color::Unset,
        }
    }

    #[test]
    fn empty_schedule_totals_zero() {
        let s = Schedule::new(Vec::new());
        assert!(s.is_empty());
        assert_eq!(s.total_duration_ms(), 0);
        assert_eq!(s.remaining_after(0), 0);
        assert_eq!(s.remaining_after(7), 0);
    }

    #[test]
    fn suffix_sums_and_elapsed() {
        let s = Schedule::new(vec![step(2000), step(1000), step(1000)]);
        assert_eq!(s.total_duration_ms(), 4000);
        assert_eq!(s.remaining_after(1), 2000);
        assert_eq!(s.remaining_after(2), 1000);
        assert_eq!(s.remaining_after(3), 0);
        assert_eq!(s.elapsed_before(2), 3000);
    }

    proptest! {
        #[test]
        fn suffix_sum_recurrence(durations in prop::collection::vec(0u64..10_000_000, 0..64)) {
            let s = Schedule::new(durations.iter().copied().map(step).collect());
            let n = durations.len();
            prop_assert_eq!(s.remaining_after(n), 0);
            for i in 0..n {
                prop_assert_eq!(s.remaining_after(i), durations[i] + s.remaining_after(i + 1));
            }
            prop_assert_eq!(s.total_duration_ms(), durations.iter().sum::<u64>());
        }
    }
}
