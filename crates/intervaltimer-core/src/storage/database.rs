//! SQLite-based workout storage.
//!
//! Workouts live in a `workouts` table; their elements live in `elements`,
//! one row per exercise or block. Exercises inside a block point at the
//! block's row through `parent_row`. Only one level of nesting is stored.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, WorkoutStore};
use crate::error::{DatabaseError, Result};
use crate::workout::{Block, Color, ElementId, Exercise, ExerciseKind, Workout, WorkoutElement};

/// SQLite database holding authored workouts.
pub struct WorkoutDb {
    conn: Connection,
}

/// One `elements` row before it is turned back into a model value.
struct ElementRow {
    row_id: i64,
    element_id: ElementId,
    parent_row: Option<i64>,
    kind_tag: String,
    name: String,
    duration_ms: u64,
    color: i64,
    exercise_kind: Option<String>,
    rounds: Option<u32>,
}

impl WorkoutDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/intervaltimer.db`, seeding the
    /// sample workouts if it holds none.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let db = Self::open_at(&data_dir()?.join("intervaltimer.db"))?;
        db.seed_samples_if_empty()?;
        Ok(db)
    }

    /// Open (or create) a database file at `path` without seeding.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an empty in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS workouts (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS elements (
                row_id      INTEGER PRIMARY KEY AUTOINCREMENT,
                element_id  INTEGER NOT NULL,
                workout_id  INTEGER NOT NULL,
                parent_row  INTEGER,
                position    INTEGER NOT NULL,
                type        TEXT NOT NULL,
                name        TEXT NOT NULL,
                duration_ms INTEGER NOT NULL,
                color       INTEGER NOT NULL DEFAULT -1,
                kind        TEXT,
                rounds      INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_elements_workout_id ON elements(workout_id);",
        )
    }

    /// Insert the sample workouts when the store is empty.
    /// Returns how many were inserted.
    ///
    /// # Errors
    /// Returns an error if the count query or an insert fails.
    pub fn seed_samples_if_empty(&self) -> Result<usize> {
        let count: u64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM workouts", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(0);
        }
        let samples = Workout::samples();
        for workout in &samples {
            self.save(workout)?;
        }
        tracing::info!(count = samples.len(), "seeded sample workouts");
        Ok(samples.len())
    }

    fn save(&self, workout: &Workout) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO workouts (id, name, description) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, description = excluded.description",
            params![workout.id, workout.name, workout.description],
        )?;
        tx.execute(
            "DELETE FROM elements WHERE workout_id = ?1",
            params![workout.id],
        )?;

        for (position, element) in workout.elements.iter().enumerate() {
            let row = insert_element(&tx, workout.id, None, position, element)?;
            if let WorkoutElement::Block(block) = element {
                for (child_pos, child) in block.elements.iter().enumerate() {
                    if child.is_block() {
                        tracing::warn!(
                            block = %block.name,
                            nested = %child.name(),
                            "nested block not saved"
                        );
                        continue;
                    }
                    insert_element(&tx, workout.id, Some(row), child_pos, child)?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load_elements(&self, workout_id: ElementId) -> Result<Vec<WorkoutElement>> {
        let mut stmt = self.conn.prepare(
            "SELECT row_id, element_id, parent_row, type, name, duration_ms, color, kind, rounds
             FROM elements
             WHERE workout_id = ?1
             ORDER BY position, row_id",
        )?;
        let rows = stmt
            .query_map(params![workout_id], |row| {
                Ok(ElementRow {
                    row_id: row.get(0)?,
                    element_id: row.get(1)?,
                    parent_row: row.get(2)?,
                    kind_tag: row.get(3)?,
                    name: row.get(4)?,
                    duration_ms: row.get(5)?,
                    color: row.get(6)?,
                    exercise_kind: row.get(7)?,
                    rounds: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut children: HashMap<i64, Vec<&ElementRow>> = HashMap::new();
        for row in rows.iter().filter(|r| r.parent_row.is_some()) {
            if let Some(parent) = row.parent_row {
                children.entry(parent).or_default().push(row);
            }
        }

        let mut elements = Vec::new();
        for row in rows.iter().filter(|r| r.parent_row.is_none()) {
            match row.kind_tag.as_str() {
                "exercise" => {
                    if let Some(ex) = exercise_from_row(row) {
                        elements.push(WorkoutElement::Exercise(ex));
                    }
                }
                "block" => {
                    let Some(rounds) = row.rounds else {
                        tracing::warn!(id = row.element_id, "block row without rounds skipped");
                        continue;
                    };
                    let block_children = children
                        .get(&row.row_id)
                        .map(|rows| rows.as_slice())
                        .unwrap_or_default()
                        .iter()
                        .filter_map(|child| {
                            if child.kind_tag != "exercise" {
                                tracing::warn!(
                                    id = child.element_id,
                                    tag = %child.kind_tag,
                                    "non-exercise row inside block skipped"
                                );
                                return None;
                            }
                            exercise_from_row(child).map(WorkoutElement::Exercise)
                        })
                        .collect();
                    elements.push(WorkoutElement::Block(Block {
                        id: row.element_id,
                        name: row.name.clone(),
                        rounds,
                        elements: block_children,
                        duration_ms: row.duration_ms,
                    }));
                }
                other => {
                    tracing::warn!(id = row.element_id, tag = other, "unknown element type skipped");
                }
            }
        }
        Ok(elements)
    }
}

fn insert_element(
    tx: &rusqlite::Transaction<'_>,
    workout_id: ElementId,
    parent_row: Option<i64>,
    position: usize,
    element: &WorkoutElement,
) -> Result<i64> {
    let (tag, kind, rounds) = match element {
        WorkoutElement::Exercise(ex) => ("exercise", Some(ex.kind.as_str()), None),
        WorkoutElement::Block(b) => ("block", None, Some(b.rounds)),
    };
    tx.execute(
        "INSERT INTO elements
            (element_id, workout_id, parent_row, position, type, name, duration_ms, color, kind, rounds)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            element.id(),
            workout_id,
            parent_row,
            position as i64,
            tag,
            element.name(),
            element.duration_ms(),
            element.color().to_db(),
            kind,
            rounds,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

fn exercise_from_row(row: &ElementRow) -> Option<Exercise> {
    let tag = row.exercise_kind.as_deref().unwrap_or_default();
    let kind = match tag.parse::<ExerciseKind>() {
        Ok(kind) => kind,
        Err(_) => {
            tracing::warn!(id = row.element_id, kind = tag, "exercise with unknown kind skipped");
            return None;
        }
    };
    Some(Exercise {
        id: row.element_id,
        name: row.name.clone(),
        kind,
        duration_ms: row.duration_ms,
        color: Color::from_db(row.color),
    })
}

impl WorkoutStore for WorkoutDb {
    fn list_all(&self) -> Result<Vec<Workout>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, description FROM workouts ORDER BY id")?;
        let heads = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, u64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        heads
            .into_iter()
            .map(|(id, name, description)| {
                Ok(Workout {
                    id,
                    name,
                    description,
                    elements: self.load_elements(id)?,
                })
            })
            .collect()
    }

    fn get_by_id(&self, id: ElementId) -> Result<Option<Workout>> {
        let head = self
            .conn
            .query_row(
                "SELECT name, description FROM workouts WHERE id = ?1",
                params![id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        match head {
            Some((name, description)) => Ok(Some(Workout {
                id,
                name,
                description,
                elements: self.load_elements(id)?,
            })),
            None => Ok(None),
        }
    }

    fn upsert(&mut self, workout: &Workout) -> Result<()> {
        self.save(workout)
    }

    fn delete(&mut self, id: ElementId) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM elements WHERE workout_id = ?1", params![id])?;
        tx.execute("DELETE FROM workouts WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(())
    }
}
