mod renderer;
mod scene;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::scene::{Scene, TimeScale};

/// Pixel width used for horizontal positioning in `--json` mode.
const JSON_WIDTH: f64 = 1000.0;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let json = args.iter().any(|a| a == "--json");
    let Some(path) = args.iter().find(|a| !a.starts_with("--")) else {
        eprintln!("Usage: stackline [--json] <scene.json>");
        std::process::exit(1);
    };

    init_tracing();

    let scene = Scene::load(&PathBuf::from(path))?;
    let scale = TimeScale::new(scene.window, JSON_WIDTH);
    let mut timeline = scene.into_timeline(&scale)?;

    if json {
        let commands = timeline.layout_all();
        let mut out = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut out, &commands)?;
        writeln!(out)?;
        return Ok(());
    }

    renderer::run_preview(timeline, scale)
}
