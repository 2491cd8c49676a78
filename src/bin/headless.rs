//! Headless runner: plays a scripted game and prints events as JSON lines.
//!
//! ```text
//! brickfall-headless [--seed N] [--frames N] [--frame-ms MS]
//! ```
//!
//! Each stdout line is `{"frame": n, "event": ..., "data": ...}`. The same
//! arguments always print the same lines. Logs go to stderr (`RUST_LOG`).

use std::io::{self, BufWriter, Write};

use anyhow::Result;
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use brickfall::autopilot::Autopilot;
use brickfall::cli::parse_run_args;
use brickfall::core::{Playground, PlaygroundConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let run_args = parse_run_args("brickfall-headless", &args, true)?;

    let config = PlaygroundConfig::default().with_seed(run_args.seed);
    let mut playground = Playground::new(config)?;
    let mut pilot = Autopilot::new(run_args.seed);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut frame = 0u32;
    while frame < run_args.frames && !playground.is_game_over() {
        pilot.advance();
        playground.frame(run_args.frame_ms, &pilot);
        frame += 1;

        for event in playground.drain_events() {
            let mut line = serde_json::to_value(&event)?;
            if let Value::Object(map) = &mut line {
                map.insert("frame".to_string(), json!(frame));
            }
            serde_json::to_writer(&mut out, &line)?;
            out.write_all(b"\n")?;
        }
    }
    out.flush()?;

    info!(
        frames = frame,
        score = playground.score(),
        level = playground.level(),
        rows = playground.destroyed_rows(),
        game_over = playground.is_game_over(),
        "headless run finished"
    );
    Ok(())
}
