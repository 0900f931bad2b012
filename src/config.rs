//! TOML-based configuration system.
//!
//! Loads settings from a `config.toml` file, falling back to defaults that
//! reproduce the reference setup (800×600 window, 24/8/24/8 double-buffered
//! pixel format, OpenGL 3.3 core with forward-compatible and debug flags).
//! Every struct implements `Default` so a missing or partial config file
//! produces the same behavior.
//!
//! ## Config file search order
//!
//! 1. `--config <path>` on the command line (see `main.rs`)
//! 2. `WGLBOOT_CONFIG` environment variable
//! 3. Next to the executable (`<exe_dir>/config.toml`)
//! 4. Platform config directory (`%APPDATA%\wglboot\config.toml` on Windows)
//! 5. Current working directory (`./config.toml`)
//! 6. No file found → `Config::default()`

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ─────────────────────────────────────────────────────────────────────────────
// Config structs
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub context: ContextConfig,
    pub format: FormatConfig,
    pub render: RenderConfig,
}

/// Window title and inner size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

/// Requested OpenGL context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub major: i32,
    pub minor: i32,
    pub forward_compatible: bool,
    pub debug: bool,
    /// Fail as soon as a context-creation extension is missing. When false,
    /// the failure surfaces at context creation instead.
    pub strict_extensions: bool,
}

/// Pixel format requirements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub color_bits: u8,
    pub alpha_bits: u8,
    pub accum_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub double_buffer: bool,
}

/// Render loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA clear color (values 0.0–1.0).
    pub clear_color: [f32; 4],
}

// ─────────────────────────────────────────────────────────────────────────────
// Default impls
// ─────────────────────────────────────────────────────────────────────────────

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "wglboot".to_string(),
            width: 800,
            height: 600,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            major: 3,
            minor: 3,
            forward_compatible: true,
            debug: true,
            strict_extensions: true,
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            color_bits: 24,
            alpha_bits: 8,
            accum_bits: 0,
            depth_bits: 24,
            stencil_bits: 8,
            double_buffer: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Loads configuration from the standard locations. Never panics —
    /// returns defaults if no file is found or if parsing fails.
    pub fn load() -> Self {
        match find_config_path() {
            Some(path) => Self::load_from(&path),
            None => {
                info!("No config file found, using defaults");
                Config::default()
            }
        }
    }

    /// Loads configuration from an explicit path, with the same fallback
    /// behavior as [`Config::load`].
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "Configuration loaded");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Invalid config, using defaults");
                    Config::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read config, using defaults");
                Config::default()
            }
        }
    }
}

/// Searches for a config file in the standard locations.
fn find_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("WGLBOOT_CONFIG") {
        let p = PathBuf::from(path);
        if p.is_file() {
            return Some(p);
        }
    }

    if let Ok(exe) = std::env::current_exe()
        && let Some(dir) = exe.parent()
    {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    if let Some(dir) = platform_config_dir() {
        let p = dir.join("config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    let p = PathBuf::from("config.toml");
    if p.is_file() {
        return Some(p);
    }

    None
}

/// Returns the platform config directory without adding a dependency.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join("wglboot"))
    }
    #[cfg(not(windows))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .or_else(|| std::env::var("HOME").ok().map(|h| format!("{h}/.config")))
            .map(|dir| PathBuf::from(dir).join("wglboot"))
    }
}
