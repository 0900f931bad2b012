//! wglboot entry point.
//!
//! Usage:
//!   wglboot [--config <path>]
//!
//! Examples:
//!   cargo run                                → config search order (see config.rs)
//!   cargo run -- --config demo.toml          → explicit config file
//!   RUST_LOG=wglboot=debug cargo run         → log every resolved entry point

use std::env;
use std::error::Error;
use std::path::PathBuf;

use wglboot::config::Config;

fn main() -> Result<(), Box<dyn Error>> {
    // ── 1. Logging / Tracing ───────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // ── 2. Configuration ───────────────────────────────────────────────
    let config = match config_path_from_args() {
        Some(path) => Config::load_from(&path),
        None => Config::load(),
    };

    // ── 3. Window + event loop ─────────────────────────────────────────
    run(config)
}

#[cfg(windows)]
fn run(config: Config) -> Result<(), Box<dyn Error>> {
    use winit::event_loop::{ControlFlow, EventLoop};

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = wglboot::app::App::new(config);
    Ok(event_loop.run_app(&mut app)?)
}

#[cfg(not(windows))]
fn run(_config: Config) -> Result<(), Box<dyn Error>> {
    tracing::error!("wglboot negotiates WGL contexts and only runs on Windows");
    Err("unsupported platform".into())
}

/// Value following `--config`, if present.
fn config_path_from_args() -> Option<PathBuf> {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
