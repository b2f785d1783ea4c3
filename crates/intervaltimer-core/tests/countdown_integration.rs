//! Integration tests for the countdown engine.
//!
//! Drives flattened workouts through the engine the way a host tick loop
//! would, checking totals, cue timing, and state transitions end to end.

use intervaltimer_core::{
    flatten, Block, CountdownEngine, Cue, Event, Exercise, ExerciseKind, TimerState, Workout,
};

fn collect_cues(engine: &mut CountdownEngine, ticks: usize, tick_ms: u64) -> Vec<(u64, Cue)> {
    let mut cues = Vec::new();
    for _ in 0..ticks {
        if let Some(Event::CueTriggered {
            seconds_remaining,
            cue,
            ..
        }) = engine.tick(tick_ms)
        {
            cues.push((seconds_remaining, cue));
        }
    }
    cues
}

#[test]
fn test_end_to_end_prep_then_block() {
    let workout = Workout::new("E2E")
        .with_element(Exercise::new("Prep", ExerciseKind::Preparation, 2000))
        .with_element(
            Block::new(
                "Block",
                2,
                vec![Exercise::new("Work", ExerciseKind::Work, 1000)],
            )
            .unwrap(),
        );

    let mut engine = CountdownEngine::from_workout(&workout);
    assert_eq!(engine.schedule().len(), 3);
    assert_eq!(engine.total_duration_ms(), 4000);

    engine.start();
    assert_eq!(engine.state(), TimerState::Running);
    assert_eq!(engine.total_remaining_ms(), 4000);

    engine.tick(2000);
    assert_eq!(engine.state(), TimerState::Running);
    assert_eq!(engine.total_remaining_ms(), 2000);

    engine.tick(1000);
    assert_eq!(engine.state(), TimerState::Running);
    assert_eq!(engine.total_remaining_ms(), 1000);

    let last = engine.tick(1000);
    assert_eq!(engine.state(), TimerState::Finished);
    assert_eq!(engine.total_remaining_ms(), 0);
    assert!(matches!(
        last,
        Some(Event::WorkoutFinished {
            steps_completed: 3,
            total_ms: 4000,
            ..
        })
    ));
}

#[test]
fn test_cue_once_per_threshold_over_twelve_seconds() {
    let workout =
        Workout::new("Cues").with_element(Exercise::new("Hold", ExerciseKind::Work, 12_000));
    let mut engine = CountdownEngine::from_workout(&workout);
    engine.start();

    let cues = collect_cues(&mut engine, 119, 100);
    assert_eq!(
        cues,
        vec![
            (10, Cue::Beep),
            (3, Cue::Beep),
            (2, Cue::Beep),
            (1, Cue::LastBeep),
        ]
    );
    assert_eq!(engine.state(), TimerState::Running);
    assert_eq!(engine.remaining_ms(), 100);
}

#[test]
fn test_pause_resume_does_not_refire() {
    let workout =
        Workout::new("Cues").with_element(Exercise::new("Hold", ExerciseKind::Work, 12_000));
    let mut engine = CountdownEngine::from_workout(&workout);
    engine.start();

    // 11.9s .. 10.5s remaining: the 10-second cue fires at 10.9s.
    let before = collect_cues(&mut engine, 15, 100);
    assert_eq!(before, vec![(10, Cue::Beep)]);
    assert_eq!(engine.remaining_ms(), 10_500);

    engine.pause();
    engine.resume();
    assert_eq!(engine.last_cue_second(), Some(10));

    let after = collect_cues(&mut engine, 104, 100);
    assert_eq!(after, vec![(3, Cue::Beep), (2, Cue::Beep), (1, Cue::LastBeep)]);
}

#[test]
fn test_resume_inside_fired_second_stays_quiet() {
    let workout =
        Workout::new("Cues").with_element(Exercise::new("Hold", ExerciseKind::Work, 4_000));
    let mut engine = CountdownEngine::from_workout(&workout);
    engine.start();

    assert!(matches!(
        engine.tick(500),
        Some(Event::CueTriggered {
            seconds_remaining: 3,
            ..
        })
    ));
    engine.pause();
    engine.resume();

    // 3.4s .. 2.9s remaining: second 3 stays quiet, second 2 fires.
    let cues = collect_cues(&mut engine, 6, 100);
    assert_eq!(cues, vec![(2, Cue::Beep)]);
}

#[test]
fn test_stop_then_start_refires_from_scratch() {
    let workout =
        Workout::new("Cues").with_element(Exercise::new("Hold", ExerciseKind::Work, 4_000));
    let mut engine = CountdownEngine::from_workout(&workout);
    engine.start();
    engine.tick(1000);
    assert_eq!(engine.last_cue_second(), Some(3));

    engine.stop();
    assert_eq!(engine.last_cue_second(), None);
    engine.start();
    assert_eq!(engine.remaining_ms(), 4000);
    let cues = collect_cues(&mut engine, 5, 100);
    assert_eq!(cues, vec![(3, Cue::Beep)]);
}

#[test]
fn test_tick_monotonicity_across_block() {
    let workout = Workout::new("Mono").with_element(
        Block::new(
            "Circuit",
            3,
            vec![
                Exercise::new("A", ExerciseKind::Work, 5000),
                Exercise::new("B", ExerciseKind::Rest, 3000),
            ],
        )
        .unwrap(),
    );
    let mut engine = CountdownEngine::from_workout(&workout);
    engine.start();
    assert_eq!(engine.remaining_ms(), 5000);

    let mut last_index = engine.step_index();
    let mut last_remaining = engine.remaining_ms();
    while engine.state() == TimerState::Running {
        engine.tick(300);
        if engine.state() != TimerState::Running {
            break;
        }
        if engine.step_index() == last_index {
            assert!(engine.remaining_ms() <= last_remaining);
        } else {
            assert_eq!(engine.step_index(), last_index + 1);
            let nominal = engine.current_step().map(|s| s.duration_ms).unwrap();
            assert_eq!(engine.remaining_ms(), nominal);
        }
        last_index = engine.step_index();
        last_remaining = engine.remaining_ms();
    }
    assert_eq!(engine.state(), TimerState::Finished);
    assert_eq!(last_index, 5);
}

#[test]
fn test_step_transitions_reset_cue_state() {
    let workout = Workout::new("Two")
        .with_element(Exercise::new("A", ExerciseKind::Work, 3000))
        .with_element(Exercise::new("B", ExerciseKind::Work, 3000));
    let mut engine = CountdownEngine::from_workout(&workout);
    engine.start();

    let cues = collect_cues(&mut engine, 60, 100);
    let seconds: Vec<u64> = cues.into_iter().map(|(s, _)| s).collect();
    assert_eq!(seconds, vec![2, 1, 2, 1]);
    assert_eq!(engine.state(), TimerState::Finished);
}

#[test]
fn test_restart_replays_flattened_steps_and_load_picks_up_edits() {
    let mut workout = Workout::new("Edit").with_element(
        Block::new(
            "Circuit",
            2,
            vec![Exercise::new("A", ExerciseKind::Work, 2000)],
        )
        .unwrap(),
    );
    let mut engine = CountdownEngine::from_workout(&workout);
    let before = engine.schedule().steps().to_vec();

    engine.start();
    engine.tick(2500);
    engine.stop();
    engine.start();
    assert_eq!(engine.schedule().steps(), flatten(&workout).as_slice());
    assert_eq!(engine.schedule().steps(), before.as_slice());
    assert_eq!(engine.total_remaining_ms(), 4000);

    let block_id = workout.elements[0].id();
    workout.block_mut(block_id).unwrap().set_rounds(3).unwrap();
    engine.load(&workout);
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.schedule().len(), 3);
    assert_eq!(engine.total_duration_ms(), 6000);
}
