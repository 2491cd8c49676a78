//! Terminal runner (default binary).
//!
//! Drives the playground from real wall-clock frames, crossterm key events
//! and the framebuffer renderer. Logs go to the file named by `BRICKFALL_LOG`
//! (nothing is logged otherwise, the terminal belongs to the game).

use std::fs::File;
use std::io;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use brickfall::cli::parse_run_args;
use brickfall::core::{Playground, PlaygroundConfig, PlaygroundEvent};
use brickfall::input::{classify_key_event, KeyInput, KeyboardState};
use brickfall::term::{FrameBuffer, GameView, TerminalRenderer, Viewport};

const FRAME_BUDGET: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let run_args = parse_run_args("brickfall", &args, false)?;
    init_logging()?;

    let config = PlaygroundConfig::default().with_seed(run_args.seed);
    let mut playground = Playground::new(config)?;
    info!(seed = run_args.seed, "starting playground");

    let mut term = TerminalRenderer::new();
    term.enter()?;
    // Release events where the terminal supports them; timeouts otherwise.
    let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();

    let result = run(&mut term, &mut playground);

    // Always try to restore terminal state.
    if enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    let _ = term.exit();

    info!(
        score = playground.score(),
        level = playground.level(),
        rows = playground.destroyed_rows(),
        "session ended"
    );
    result
}

fn init_logging() -> Result<()> {
    let Some(path) = std::env::var_os("BRICKFALL_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(term: &mut TerminalRenderer, playground: &mut Playground) -> Result<()> {
    let view = GameView::default();
    let mut keyboard = KeyboardState::new();
    let mut fb = FrameBuffer::new(0, 0);
    let mut last_frame = Instant::now();

    loop {
        let (w, h) = terminal::size().unwrap_or((80, 24));
        view.render_into(&playground.snapshot(), Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Collect input until the frame budget is spent.
        let deadline = last_frame + FRAME_BUDGET;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if !event::poll(timeout)? {
                break;
            }
            match event::read()? {
                Event::Key(key) => match classify_key_event(key) {
                    KeyInput::Quit => return Ok(()),
                    input => keyboard.apply(input, Instant::now()),
                },
                Event::Resize(..) => term.invalidate(),
                Event::FocusLost => keyboard.reset(),
                _ => {}
            }
        }

        let now = Instant::now();
        keyboard.expire(now);
        let elapsed_ms = now.duration_since(last_frame).as_secs_f64() * 1000.0;
        last_frame = now;

        playground.frame(elapsed_ms, &keyboard);
        keyboard.end_frame();

        for event in playground.drain_events() {
            log_event(&event);
        }
    }
}

fn log_event(event: &PlaygroundEvent) {
    match event {
        PlaygroundEvent::ScoreUpdated(report) => {
            info!(total = report.total, groups = report.groups.len(), "score updated")
        }
        PlaygroundEvent::LevelChanged(level) => info!(level, "level changed"),
        PlaygroundEvent::GameOver => info!("game over"),
        other => debug!(event = other.name(), "playground event"),
    }
}
