use clap::Subcommand;
use intervaltimer_core::error::CoreError;
use intervaltimer_core::{
    flatten, format_duration, parse_duration, Block, Color, ElementId, Exercise, ExerciseKind,
    ValidationError, Workout, WorkoutDb, WorkoutElement, WorkoutStore,
};

#[derive(Subcommand)]
pub enum WorkoutAction {
    /// List all workouts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a workout and the steps it plays as
    Show {
        /// Workout ID
        id: ElementId,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an empty workout
    Create {
        /// Workout name
        name: String,
        /// Free-form description
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Append an exercise to a workout or to one of its blocks
    AddExercise {
        /// Workout ID
        workout_id: ElementId,
        /// Exercise name
        name: String,
        /// Duration ("45", "1:30", "2m", "1m30s")
        #[arg(long, short)]
        duration: String,
        /// prep, work or rest
        #[arg(long, short, default_value = "work")]
        kind: String,
        /// Hex color or palette name
        #[arg(long, short)]
        color: Option<String>,
        /// Append to this block instead of the workout
        #[arg(long)]
        block: Option<ElementId>,
    },
    /// Append an empty block to a workout
    AddBlock {
        /// Workout ID
        workout_id: ElementId,
        /// Block name
        name: String,
        /// Number of rounds
        #[arg(long, short, default_value = "1")]
        rounds: u32,
    },
    /// Rename a workout or change its description
    Edit {
        /// Workout ID
        id: ElementId,
        /// New name
        #[arg(long, short)]
        name: Option<String>,
        /// New description
        #[arg(long, short)]
        description: Option<String>,
    },
    /// Edit an exercise, at top level or inside a block
    EditExercise {
        /// Workout ID
        workout_id: ElementId,
        /// Exercise ID
        exercise_id: ElementId,
        /// New name
        #[arg(long, short)]
        name: Option<String>,
        /// New duration
        #[arg(long, short)]
        duration: Option<String>,
        /// prep, work or rest
        #[arg(long, short)]
        kind: Option<String>,
        /// Hex color, palette name, or "unset"
        #[arg(long, short)]
        color: Option<String>,
    },
    /// Rename a block or change its rounds
    EditBlock {
        /// Workout ID
        workout_id: ElementId,
        /// Block ID
        block_id: ElementId,
        /// New name
        #[arg(long, short)]
        name: Option<String>,
        /// New round count
        #[arg(long, short)]
        rounds: Option<u32>,
    },
    /// Change how many rounds a block plays
    SetRounds {
        /// Workout ID
        workout_id: ElementId,
        /// Block ID
        block_id: ElementId,
        /// New round count
        rounds: u32,
    },
    /// Remove an exercise or block from a workout
    Remove {
        /// Workout ID
        workout_id: ElementId,
        /// Element ID
        element_id: ElementId,
    },
    /// Delete a workout
    Delete {
        /// Workout ID
        id: ElementId,
    },
}

fn load(db: &WorkoutDb, id: ElementId) -> Result<Workout, CoreError> {
    db.get_by_id(id)?.ok_or(CoreError::NotFound { id })
}

fn print_element(element: &WorkoutElement, indent: usize) {
    let pad = " ".repeat(indent);
    match element {
        WorkoutElement::Exercise(ex) => {
            let color = if ex.color.is_unset() {
                String::new()
            } else {
                format!("  {}", ex.color)
            };
            println!(
                "{pad}[{}] {:<24} {:<5} {}{color}",
                ex.id,
                ex.name,
                ex.kind.as_str(),
                format_duration(ex.duration_ms)
            );
        }
        WorkoutElement::Block(block) => {
            println!(
                "{pad}[{}] {} x{}  {}",
                block.id,
                block.name,
                block.rounds,
                format_duration(block.duration_ms)
            );
            for child in &block.elements {
                print_element(child, indent + 4);
            }
        }
    }
}

pub fn run(action: WorkoutAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut db = WorkoutDb::open()?;

    match action {
        WorkoutAction::List { json } => {
            let workouts = db.list_all()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&workouts)?);
            } else if workouts.is_empty() {
                println!("No workouts found.");
            } else {
                for w in &workouts {
                    println!(
                        "{}  {}  {} ({} elements)",
                        w.id,
                        w.name,
                        format_duration(w.total_duration_ms()),
                        w.elements.len()
                    );
                }
            }
        }
        WorkoutAction::Show { id, json } => {
            let workout = load(&db, id)?;
            let steps = flatten(&workout);
            if json {
                let value = serde_json::json!({
                    "workout": workout,
                    "steps": steps,
                    "total_ms": workout.total_duration_ms(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!(
                    "{} [{}]  total {}",
                    workout.name,
                    workout.id,
                    format_duration(workout.total_duration_ms())
                );
                if !workout.description.is_empty() {
                    println!("  {}", workout.description);
                }
                for element in &workout.elements {
                    print_element(element, 2);
                }
                println!();
                println!("Steps:");
                for (i, step) in steps.iter().enumerate() {
                    println!(
                        "  {:>3}. {:<40} {}",
                        i + 1,
                        step.label,
                        format_duration(step.duration_ms)
                    );
                }
            }
        }
        WorkoutAction::Create { name, description } => {
            let mut workout = Workout::new(name);
            if let Some(description) = description {
                workout = workout.with_description(description);
            }
            db.upsert(&workout)?;
            println!("Workout created: {}", workout.id);
        }
        WorkoutAction::AddExercise {
            workout_id,
            name,
            duration,
            kind,
            color,
            block,
        } => {
            let mut workout = load(&db, workout_id)?;
            let kind: ExerciseKind = kind.parse()?;
            let mut exercise = Exercise::new(name, kind, parse_duration(&duration)?);
            if let Some(color) = color {
                exercise = exercise.with_color(color.parse::<Color>()?);
            }
            let exercise_id = exercise.id;
            match block {
                Some(block_id) => workout
                    .block_mut(block_id)
                    .ok_or(ValidationError::ElementNotFound { id: block_id })?
                    .add_element(exercise.into())?,
                None => workout.push(exercise),
            }
            db.upsert(&workout)?;
            println!("Exercise added: {exercise_id}");
        }
        WorkoutAction::AddBlock {
            workout_id,
            name,
            rounds,
        } => {
            let mut workout = load(&db, workout_id)?;
            let block = Block::new(name, rounds, Vec::new())?;
            let block_id = block.id;
            workout.push(block);
            db.upsert(&workout)?;
            println!("Block added: {block_id}");
        }
        WorkoutAction::Edit {
            id,
            name,
            description,
        } => {
            let mut workout = load(&db, id)?;
            if let Some(name) = name {
                workout.set_name(name);
            }
            if let Some(description) = description {
                workout.description = description;
            }
            db.upsert(&workout)?;
            println!("Workout updated: {} ({})", workout.id, workout.name);
        }
        WorkoutAction::EditExercise {
            workout_id,
            exercise_id,
            name,
            duration,
            kind,
            color,
        } => {
            let mut workout = load(&db, workout_id)?;
            let mut exercise = workout
                .find_exercise(exercise_id)
                .cloned()
                .ok_or(ValidationError::ElementNotFound { id: exercise_id })?;
            if let Some(name) = name {
                exercise.set_name(name);
            }
            if let Some(duration) = duration {
                exercise.duration_ms = parse_duration(&duration)?;
            }
            if let Some(kind) = kind {
                exercise.kind = kind.parse::<ExerciseKind>()?;
            }
            if let Some(color) = color {
                exercise.color = color.parse::<Color>()?;
            }
            workout.update_exercise(exercise);
            db.upsert(&workout)?;
            println!(
                "Exercise updated: {exercise_id} (total {})",
                format_duration(workout.total_duration_ms())
            );
        }
        WorkoutAction::EditBlock {
            workout_id,
            block_id,
            name,
            rounds,
        } => {
            let mut workout = load(&db, workout_id)?;
            let block = workout
                .block_mut(block_id)
                .ok_or(ValidationError::ElementNotFound { id: block_id })?;
            if let Some(name) = name {
                block.set_name(name);
            }
            if let Some(rounds) = rounds {
                block.set_rounds(rounds)?;
            }
            db.upsert(&workout)?;
            println!(
                "Block updated: {block_id} (total {})",
                format_duration(workout.total_duration_ms())
            );
        }
        WorkoutAction::SetRounds {
            workout_id,
            block_id,
            rounds,
        } => {
            let mut workout = load(&db, workout_id)?;
            workout
                .block_mut(block_id)
                .ok_or(ValidationError::ElementNotFound { id: block_id })?
                .set_rounds(rounds)?;
            db.upsert(&workout)?;
            println!(
                "Rounds set: {rounds} (total {})",
                format_duration(workout.total_duration_ms())
            );
        }
        WorkoutAction::Remove {
            workout_id,
            element_id,
        } => {
            let mut workout = load(&db, workout_id)?;
            if !workout.remove_element(element_id) {
                return Err(ValidationError::ElementNotFound { id: element_id }.into());
            }
            db.upsert(&workout)?;
            println!("Element removed: {element_id}");
        }
        WorkoutAction::Delete { id } => {
            load(&db, id)?;
            db.delete(id)?;
            println!("Workout deleted: {id}");
        }
    }
    Ok(())
}
