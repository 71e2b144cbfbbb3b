use serde::Deserialize;
use toastpile_core::Intent;
use toastpile_shared::models::{Corner, Direction, Rect, Style};

/// A scripted session: toasts to show and the pointer / dismiss input they
/// receive, with times in milliseconds from the start.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    #[serde(default)]
    pub screen: Screen,
    pub steps: Vec<Step>,
    /// Stop the clock here. Without it the simulation runs until nothing is pending.
    #[serde(default)]
    pub until: Option<u64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Screen {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Screen {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1920.0,
            height: 1080.0,
        }
    }
}

impl From<Screen> for Rect {
    fn from(s: Screen) -> Self {
        Rect::new(s.x, s.y, s.width, s.height)
    }
}

#[derive(Debug, Deserialize)]
pub struct Step {
    pub at: u64,
    #[serde(flatten)]
    pub op: Op,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Op {
    Show {
        id: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        body: String,
        /// Display delay; falls back to the configured duration.
        delay: Option<u64>,
        corner: Option<Corner>,
        style: Option<Style>,
        direction: Option<Direction>,
        animation_ms: Option<u64>,
        height: Option<f64>,
    },
    Enter {
        id: String,
    },
    Leave {
        id: String,
    },
    Dismiss {
        id: String,
        #[serde(default)]
        instant: bool,
    },
    /// The host reports that the animation played for `intent` finished.
    AnimationFinished {
        id: String,
        intent: Intent,
    },
    Resize {
        id: String,
        height: f64,
    },
    Tick,
}

impl Op {
    pub fn id(&self) -> Option<&str> {
        match self {
            Op::Show { id, .. }
            | Op::Enter { id }
            | Op::Leave { id }
            | Op::Dismiss { id, .. }
            | Op::AnimationFinished { id, .. }
            | Op::Resize { id, .. } => Some(id),
            Op::Tick => None,
        }
    }
}

pub fn parse(input: &str) -> Result<Trace, String> {
    let trace: Trace =
        serde_json::from_str(input).map_err(|e| format!("Failed to parse trace: {}", e))?;
    if let Some(pair) = trace.steps.windows(2).find(|w| w[1].at < w[0].at) {
        return Err(format!(
            "Steps must be in time order ({}ms comes after {}ms)",
            pair[1].at, pair[0].at
        ));
    }
    Ok(trace)
}
