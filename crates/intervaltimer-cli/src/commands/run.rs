use std::io::{BufRead, Write};
use std::time::Duration;

use clap::Args;
use intervaltimer_core::error::CoreError;
use intervaltimer_core::playback::{self, Control, PlaybackSession, RunOutcome};
use intervaltimer_core::{
    format_duration, Color, Config, CountdownEngine, CuePlayer, ElementId, Event, LookAhead,
    SilentPlayer, TerminalBell, TimerState, Workout, WorkoutDb, WorkoutStore,
};
use tokio::sync::mpsc;

#[derive(Args)]
pub struct RunArgs {
    /// Workout ID
    pub id: ElementId,
    /// Do not ring the terminal bell on cues
    #[arg(long)]
    pub no_sound: bool,
    /// Tick interval in milliseconds (overrides timer.tick_interval_ms)
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Print events as JSON lines instead of the live display
    #[arg(long)]
    pub json: bool,
}

/// Map a line typed during playback to a control command.
fn parse_control(line: &str) -> Option<Control> {
    match line.trim().to_ascii_lowercase().as_str() {
        "g" | "go" | "start" => Some(Control::Start),
        "p" | "pause" => Some(Control::Pause),
        "r" | "resume" => Some(Control::Resume),
        "s" | "stop" => Some(Control::Stop),
        "q" | "quit" => Some(Control::Quit),
        _ => None,
    }
}

/// Forward stdin lines as controls from a dedicated thread.
///
/// Blocking reads stay off the runtime; the sender is dropped at EOF.
fn spawn_stdin_reader(tx: mpsc::Sender<Control>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_control(&line) {
                Some(control) => {
                    if tx.blocking_send(control).is_err() {
                        break;
                    }
                }
                None => tracing::debug!(input = %line, "ignored input"),
            }
        }
    });
}

/// Block until the user asks to start. Returns `false` on quit or EOF.
async fn wait_for_start(controls: &mut mpsc::Receiver<Control>) -> bool {
    while let Some(control) = controls.recv().await {
        match control {
            Control::Start | Control::Resume => return true,
            Control::Quit => return false,
            Control::Pause | Control::Stop => {}
        }
    }
    false
}

fn paint(text: &str, color: Color, enabled: bool) -> String {
    match color.channels() {
        Some((r, g, b)) if enabled => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        _ => text.to_string(),
    }
}

fn look_ahead_text(slot: &LookAhead, color: bool) -> String {
    match slot {
        LookAhead::Step {
            label,
            duration_ms,
            color: step_color,
        } => format!(
            "{} ({})",
            paint(label, *step_color, color),
            format_duration(*duration_ms)
        ),
        LookAhead::EndOfWorkout => "end".to_string(),
    }
}

/// Terminal renderer for playback updates.
struct Display {
    json: bool,
    color: bool,
    look_ahead: u32,
    status: String,
}

impl Display {
    fn new(config: &Config, json: bool) -> Self {
        Self {
            json,
            color: config.ui.color,
            look_ahead: config.ui.look_ahead.min(2),
            status: String::new(),
        }
    }

    fn update(&mut self, engine: &CountdownEngine, event: Option<&Event>) {
        if self.json {
            if let Some(event) = event {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "failed to encode event"),
                }
            }
            return;
        }

        if let Some(message) = event.and_then(|e| self.describe(e)) {
            self.clear_status();
            println!("{message}");
        }
        let status = self.status_line(engine);
        if status != self.status {
            print!("\r\x1b[2K{status}");
            let _ = std::io::stdout().flush();
            self.status = status;
        }
    }

    fn describe(&self, event: &Event) -> Option<String> {
        let line = match event {
            Event::TimerStarted {
                step_label,
                duration_ms,
                ..
            } => format!("Started: {step_label} ({})", format_duration(*duration_ms)),
            Event::StepAdvanced {
                step_index,
                step_label,
                duration_ms,
                ..
            } => format!(
                "Step {}: {step_label} ({})",
                step_index + 1,
                format_duration(*duration_ms)
            ),
            Event::TimerPaused { .. } => "Paused (r to resume)".to_string(),
            Event::TimerResumed { .. } => "Resumed".to_string(),
            Event::TimerStopped { .. } => "Stopped (g to start again)".to_string(),
            Event::WorkoutFinished {
                steps_completed,
                total_ms,
                ..
            } => format!(
                "Workout finished: {steps_completed} steps in {}",
                format_duration(*total_ms)
            ),
            Event::CueTriggered { .. } | Event::StateSnapshot { .. } => return None,
        };
        Some(line)
    }

    fn status_line(&self, engine: &CountdownEngine) -> String {
        let state = match engine.state() {
            TimerState::Idle => "IDLE",
            TimerState::Running => "RUN",
            TimerState::Paused => "PAUSE",
            TimerState::Finished => "DONE",
        };
        let mut line = match engine.current_step() {
            Some(step) => format!(
                "{state:<5} {}  {}",
                paint(&step.label, step.color, self.color),
                format_duration(engine.remaining_ms())
            ),
            None => state.to_string(),
        };
        line.push_str(&format!(
            "  | total {}",
            format_duration(engine.total_remaining_ms())
        ));
        if self.look_ahead >= 1 {
            line.push_str(&format!(
                "  | next: {}",
                look_ahead_text(&engine.next_step(), self.color)
            ));
        }
        if self.look_ahead >= 2 {
            line.push_str(&format!(
                "  | then: {}",
                look_ahead_text(&engine.step_after_next(), self.color)
            ));
        }
        line
    }

    fn clear_status(&mut self) {
        if !self.status.is_empty() {
            print!("\r\x1b[2K");
            self.status.clear();
        }
    }

    fn finish(&mut self) {
        if !self.json {
            self.clear_status();
            let _ = std::io::stdout().flush();
        }
    }
}

async fn play<P: CuePlayer>(
    workout: &Workout,
    player: P,
    tick_interval: Duration,
    auto_start: bool,
    display: &mut Display,
) -> RunOutcome {
    let (tx, mut controls) = mpsc::channel(16);
    spawn_stdin_reader(tx);

    let mut session = PlaybackSession::for_workout(workout, player);
    if !auto_start {
        if !display.json {
            println!("Type g and Enter to start.");
        }
        if !wait_for_start(&mut controls).await {
            return RunOutcome::Quit;
        }
    }
    playback::run(&mut session, tick_interval, controls, |engine, event| {
        display.update(engine, event)
    })
    .await
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = WorkoutDb::open()?;
    let workout = db
        .get_by_id(args.id)?
        .ok_or(CoreError::NotFound { id: args.id })?;

    let tick_interval = args
        .tick_ms
        .map(|ms| Duration::from_millis(ms.max(10)))
        .unwrap_or_else(|| config.tick_interval());
    let sound = config.sound.enabled && config.sound.volume > 0 && !args.no_sound;
    tracing::info!(
        workout = workout.id,
        tick_ms = tick_interval.as_millis() as u64,
        sound,
        "starting playback"
    );

    if !args.json {
        println!(
            "{}  total {}  (p pause, r resume, s stop, g start, q quit)",
            workout.name,
            format_duration(workout.total_duration_ms())
        );
    }

    let mut display = Display::new(&config, args.json);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let auto_start = config.timer.auto_start;
    let outcome = if sound {
        runtime.block_on(play(&workout, TerminalBell, tick_interval, auto_start, &mut display))
    } else {
        runtime.block_on(play(&workout, SilentPlayer, tick_interval, auto_start, &mut display))
    };
    display.finish();
    tracing::info!(?outcome, "playback ended");

    if outcome == RunOutcome::Quit && !args.json {
        println!("Quit.");
    }
    Ok(())
}
