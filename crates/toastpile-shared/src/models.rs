use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Travel axis of an entrance or exit animation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Exit travel for a toast that entered moving in `self`.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            _ => Err(format!("Invalid direction: {}", s)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Animation kind. `Fade` and `Center` ignore the direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Slide,
    Fade,
    Blend,
    Center,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Slide => "slide",
            Style::Fade => "fade",
            Style::Blend => "blend",
            Style::Center => "center",
        }
    }

    pub fn uses_direction(self) -> bool {
        matches!(self, Style::Slide | Style::Blend)
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slide" => Ok(Style::Slide),
            "fade" => Ok(Style::Fade),
            "blend" => Ok(Style::Blend),
            "center" => Ok(Style::Center),
            _ => Err(format!("Invalid style: {}", s)),
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Screen corner a stack of toasts is anchored to.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Corner {
    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Corner::BottomLeft | Corner::BottomRight)
    }

    pub fn is_right(self) -> bool {
        matches!(self, Corner::TopRight | Corner::BottomRight)
    }

    /// Direction the stack grows in as siblings arrive.
    pub fn growth_direction(self) -> Direction {
        if self.is_bottom() {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl FromStr for Corner {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top-left" => Ok(Corner::TopLeft),
            "top-right" => Ok(Corner::TopRight),
            "bottom-left" => Ok(Corner::BottomLeft),
            "bottom-right" => Ok(Corner::BottomRight),
            _ => Err(format!("Invalid corner: {}", s)),
        }
    }
}

impl std::fmt::Display for Corner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Screen coordinates, origin top-left, y growing downward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn right(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn bottom(&self) -> f64 {
        self.origin.y + self.size.height
    }
}

pub type Rgba = (f64, f64, f64, f64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ColorScheme {
    pub background: Rgba,
    pub foreground: Rgba,
    pub border: Rgba,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: (0.173, 0.173, 0.18, 0.95),
            foreground: (1.0, 1.0, 1.0, 0.70),
            border: (1.0, 1.0, 1.0, 0.10),
        }
    }
}

/// What the rendering surface draws. Late-bound until the toast is shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToastContent {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub icon_padding: f64,
    #[serde(default)]
    pub colors: ColorScheme,
}

impl ToastContent {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            ..Default::default()
        }
    }
}

/// Immutable per-toast animation and placement settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToastOptions {
    pub style: Style,
    pub direction: Direction,
    pub animation_ms: u64,
    pub corner: Corner,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            style: Style::Slide,
            direction: Direction::Up,
            animation_ms: 250,
            corner: Corner::BottomRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for d in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert_ne!(d.opposite(), d);
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn corner_names_parse_back() {
        for c in [
            Corner::TopLeft,
            Corner::TopRight,
            Corner::BottomLeft,
            Corner::BottomRight,
        ] {
            assert_eq!(c.as_str().parse::<Corner>().unwrap(), c);
        }
        assert!("middle".parse::<Corner>().is_err());
    }

    #[test]
    fn bottom_corners_grow_upward() {
        assert_eq!(Corner::BottomRight.growth_direction(), Direction::Up);
        assert_eq!(Corner::TopLeft.growth_direction(), Direction::Down);
    }

    #[test]
    fn fade_and_center_ignore_direction() {
        assert!(Style::Slide.uses_direction());
        assert!(Style::Blend.uses_direction());
        assert!(!Style::Fade.uses_direction());
        assert!(!Style::Center.uses_direction());
    }

    #[test]
    fn content_deserializes_with_defaults() {
        let content: ToastContent =
            serde_json::from_str(r#"{"title": "Build", "body": "done"}"#).unwrap();
        assert_eq!(content.title, "Build");
        assert!(content.icon.is_empty());
        assert_eq!(content.colors, ColorScheme::default());
    }
}
