use std::rc::Rc;
use std::time::Duration;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use toastpile_shared::models::{Direction, Style};

use crate::error::AnimationError;
use crate::window::{ToastWindow, WindowHandle};

bitflags! {
    /// Flags handed to the native animation call.
    ///
    /// Bit layout follows the classic `AnimateWindow` flag set so a Win32
    /// effect can pass `bits()` straight through.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AnimationFlags: u32 {
        const HOR_POSITIVE = 0x0000_0001;
        const HOR_NEGATIVE = 0x0000_0002;
        const VER_POSITIVE = 0x0000_0004;
        const VER_NEGATIVE = 0x0000_0008;
        const CENTER = 0x0000_0010;
        const HIDE = 0x0001_0000;
        const ACTIVATE = 0x0002_0000;
        const SLIDE = 0x0004_0000;
        const BLEND = 0x0008_0000;
    }
}

impl AnimationFlags {
    fn from_direction(direction: Direction) -> Self {
        // Screen y grows downward, so travelling up is the negative vertical axis.
        match direction {
            Direction::Up => AnimationFlags::VER_NEGATIVE,
            Direction::Down => AnimationFlags::VER_POSITIVE,
            Direction::Left => AnimationFlags::HOR_NEGATIVE,
            Direction::Right => AnimationFlags::HOR_POSITIVE,
        }
    }

    fn from_style(style: Style) -> Self {
        match style {
            Style::Slide => AnimationFlags::SLIDE,
            Style::Fade | Style::Blend => AnimationFlags::BLEND,
            Style::Center => AnimationFlags::CENTER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Enter,
    Exit,
    /// Flip the current visibility; the effect decides which way.
    Toggle,
}

impl Intent {
    fn flags(self) -> AnimationFlags {
        match self {
            Intent::Enter => AnimationFlags::ACTIVATE,
            Intent::Exit => AnimationFlags::HIDE,
            Intent::Toggle => AnimationFlags::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationRequest {
    pub duration: Duration,
    pub direction: Direction,
    pub style: Style,
    pub intent: Intent,
}

impl AnimationRequest {
    pub fn flags(&self) -> AnimationFlags {
        let mut flags = AnimationFlags::from_style(self.style) | self.intent.flags();
        if self.style.uses_direction() {
            flags |= AnimationFlags::from_direction(self.direction);
        }
        flags
    }
}

/// The opaque platform animation call.
///
/// Must return promptly: the animation runs on its own and the caller never
/// waits for it to finish.
///
/// An `Enter` request arrives for a window that is already visible. Calls
/// such as `AnimateWindow` skip windows that are already shown, so an effect
/// built on one hides the window first and then plays the `ACTIVATE` flags.
/// An `Exit` request also arrives for a visible window; the effect hides it.
pub trait AnimationEffect {
    fn animate(
        &self,
        handle: WindowHandle,
        request: &AnimationRequest,
    ) -> Result<(), AnimationError>;
}

/// Effect that never animates. Windows always snap.
pub struct NoAnimation;

impl AnimationEffect for NoAnimation {
    fn animate(
        &self,
        _handle: WindowHandle,
        _request: &AnimationRequest,
    ) -> Result<(), AnimationError> {
        Err(AnimationError::Unsupported)
    }
}

/// Fire-and-forget wrapper around an [`AnimationEffect`].
#[derive(Clone)]
pub struct Animator {
    effect: Rc<dyn AnimationEffect>,
}

impl Animator {
    pub fn new(effect: Rc<dyn AnimationEffect>) -> Self {
        Self { effect }
    }

    /// Start an animation. Returns `false` when the effect failed, in which
    /// case the window has already been snapped to its final visibility.
    pub fn play(&self, window: &dyn ToastWindow, request: AnimationRequest) -> bool {
        let handle = window.handle();
        match self.effect.animate(handle, &request) {
            Ok(()) => {
                log::debug!(
                    "[animation] {:?} {} flags={:#x} ({}ms)",
                    request.intent,
                    handle,
                    request.flags().bits(),
                    request.duration.as_millis()
                );
                true
            }
            Err(e) => {
                log::warn!(
                    "[animation] {:?} on {} failed: {}, snapping",
                    request.intent,
                    handle,
                    e
                );
                let visible = match request.intent {
                    Intent::Enter => true,
                    Intent::Exit => false,
                    Intent::Toggle => !window.is_visible(),
                };
                window.set_visible(visible);
                false
            }
        }
    }
}
