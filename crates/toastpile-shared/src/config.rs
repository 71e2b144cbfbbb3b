use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{Corner, Direction, Size, Style, ToastOptions};

/// Return XDG_DATA_HOME/toastpile.
/// The `dirs` crate returns ~/Library/Application Support on macOS,
/// so we construct ~/.local/share directly for XDG compliance.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg).join("toastpile")
    } else {
        let home = std::env::var("HOME").expect("HOME not set");
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("toastpile")
    }
}

/// Return the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("toastpile.log")
}

/// Return XDG_CONFIG_HOME/toastpile.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg).join("toastpile")
    } else {
        let home = std::env::var("HOME").expect("HOME not set");
        PathBuf::from(home).join(".config").join("toastpile")
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub editor: Option<String>,
    #[serde(default)]
    pub toast: ToastConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub stack: StackConfig,
}

impl AppConfig {
    pub fn toast_options(&self) -> ToastOptions {
        ToastOptions {
            style: self.animation.style,
            direction: self.animation.direction,
            animation_ms: self.animation.duration_ms,
            corner: self.toast.corner,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToastConfig {
    #[serde(default = "default_toast_duration")]
    pub duration_ms: u64,
    #[serde(default)]
    pub persistent: bool,
    #[serde(default)]
    pub corner: Corner,
    #[serde(default = "default_toast_width")]
    pub width: f64,
    #[serde(default = "default_toast_height")]
    pub height: f64,
}

impl ToastConfig {
    /// Delay passed to `show`. Zero keeps the toast up until dismissed.
    pub fn display_delay_ms(&self) -> u64 {
        if self.persistent {
            0
        } else {
            self.duration_ms
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_toast_duration(),
            persistent: false,
            corner: Corner::default(),
            width: default_toast_width(),
            height: default_toast_height(),
        }
    }
}

fn default_toast_duration() -> u64 {
    4000
}

fn default_toast_width() -> f64 {
    360.0
}

fn default_toast_height() -> f64 {
    96.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimationConfig {
    #[serde(default)]
    pub style: Style,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    #[serde(default = "default_animation_duration")]
    pub duration_ms: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            style: Style::default(),
            direction: default_direction(),
            duration_ms: default_animation_duration(),
        }
    }
}

fn default_direction() -> Direction {
    Direction::Up
}

fn default_animation_duration() -> u64 {
    250
}

#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    #[serde(default = "default_gap")]
    pub gap: f64,
    #[serde(default = "default_margin")]
    pub margin: f64,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            gap: default_gap(),
            margin: default_margin(),
        }
    }
}

fn default_gap() -> f64 {
    8.0
}

fn default_margin() -> f64 {
    16.0
}

/// Return the path to config.toml.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load config.toml. Return defaults if the file is missing or fails to parse.
pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            log::warn!("Failed to parse config.toml: {}, using defaults", e);
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

/// Default config.toml template.
fn default_config_template() -> &'static str {
    r#"# toastpile configuration

# Editor to open when running `toastpile config`
# Falls back to $EDITOR environment variable, then vim
# editor = "vim"

# Toast popup notification
[toast]
# Display duration in milliseconds (default: 4000)
# duration_ms = 4000

# Keep toasts visible until dismissed (default: false)
# persistent = false

# Screen corner new toasts stack from (default: bottom-right)
# Available: top-left, top-right, bottom-left, bottom-right
# corner = "bottom-right"

# Toast window size in points
# width = 360.0
# height = 96.0

# Entrance / exit animation
[animation]
# Available: slide, fade, blend, center (default: slide)
# style = "slide"

# Entrance direction of the first toast in a stack (default: up)
# Later toasts travel along the stack's growth direction
# direction = "up"

# Animation length in milliseconds (default: 250)
# duration_ms = 250

# Stacking
[stack]
# Space between stacked toasts (default: 8.0)
# gap = 8.0

# Distance from the screen edges (default: 16.0)
# margin = 16.0
"#
}

/// Create config.toml with the default template if it does not exist. Return its path.
pub fn ensure_config_file() -> io::Result<PathBuf> {
    let path = config_path();
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, default_config_template())?;
    }
    Ok(path)
}

/// Resolve the editor to use.
/// Priority: config.toml `editor` -> $EDITOR env var -> vim.
pub fn resolve_editor() -> String {
    let config = load_config();
    if let Some(ref editor) = config.editor {
        if !editor.is_empty() {
            return editor.clone();
        }
    }
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return editor;
        }
    }
    "vim".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AppConfig::default();
        assert_eq!(config.toast.duration_ms, 4000);
        assert!(!config.toast.persistent);
        assert_eq!(config.toast.corner, Corner::BottomRight);
        assert_eq!(config.animation.style, Style::Slide);
        assert_eq!(config.animation.direction, Direction::Up);
        assert_eq!(config.stack.gap, 8.0);
    }

    #[test]
    fn persistent_means_zero_delay() {
        let toml_str = r#"
[toast]
duration_ms = 5000
persistent = true
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.toast.duration_ms, 5000);
        assert_eq!(config.toast.display_delay_ms(), 0);
    }

    #[test]
    fn parse_animation_section() {
        let toml_str = r#"
[toast]
corner = "top-left"

[animation]
style = "fade"
direction = "right"
duration_ms = 120
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        let options = config.toast_options();
        assert_eq!(options.corner, Corner::TopLeft);
        assert_eq!(options.style, Style::Fade);
        assert_eq!(options.direction, Direction::Right);
        assert_eq!(options.animation_ms, 120);
        // Untouched sections keep defaults
        assert_eq!(config.stack.margin, 16.0);
    }

    #[test]
    fn template_parses_to_defaults() {
        let config: AppConfig = toml::from_str(default_config_template()).unwrap();
        assert_eq!(config.toast.duration_ms, 4000);
        assert_eq!(config.toast.size(), Size::new(360.0, 96.0));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[toast\nduration_ms = ").unwrap();
        let config = load_config_from(&path);
        assert_eq!(config.toast.duration_ms, 4000);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config_from(Path::new("/nonexistent/toastpile/config.toml"));
        assert_eq!(config.stack.gap, 8.0);
    }
}
