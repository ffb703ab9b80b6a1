// Configuration - load settings from config.toml
//
// Provides sensible defaults if the config file is missing or has errors.
// The validation toggle lives here so the entry point sets it exactly once.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub debug: DebugConfig,
    pub assets: AssetsConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Quad Host".to_string(),
            width: 1024,
            height: 512,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub clear_color: [f32; 4],
    /// K: how many frames may be recorded before waiting on the GPU.
    pub max_frames_in_flight: usize,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            max_frames_in_flight: 2,
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub show_fps: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: cfg!(debug_assertions),
            show_fps: true,
        }
    }
}

/// File paths consumed through the external-collaborator interfaces:
/// SPIR-V blobs compiled offline, texture decoded by the image crate.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub texture: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            vertex_shader: "shaders/quad.vert.spv".to_string(),
            fragment_shader: "shaders/quad.frag.spv".to_string(),
            texture: "assets/texture.png".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.sanitize();

        log::info!("Loaded configuration from {:?}", path);
        log::debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Clamp values the rest of the host cannot tolerate. Zero frames in
    /// flight would leave the scheduler with no slot to wait on.
    fn sanitize(&mut self) {
        if self.graphics.max_frames_in_flight == 0 {
            log::warn!("max_frames_in_flight must be at least 1, clamping");
            self.graphics.max_frames_in_flight = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_keep_two_frames_in_flight() {
        let config = Config::default();
        assert_eq!(config.graphics.max_frames_in_flight, 2);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 512);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [window]
            title = "testbed"
            width = 640

            [graphics]
            max_frames_in_flight = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.window.title, "testbed");
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 512);
        assert_eq!(config.graphics.max_frames_in_flight, 3);
        assert_eq!(config.assets.vertex_shader, "shaders/quad.vert.spv");
    }

    #[test]
    fn zero_frames_in_flight_is_clamped_to_one() {
        let mut config: Config = toml::from_str(
            r#"
            [graphics]
            max_frames_in_flight = 0
            "#,
        )
        .unwrap();
        config.sanitize();
        assert_eq!(config.graphics.max_frames_in_flight, 1);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.window.title, "Quad Host");
    }
}
