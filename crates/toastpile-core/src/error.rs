use thiserror::Error;

use crate::toast::ToastState;
use crate::window::WindowHandle;

/// Misuse of a toast by its caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToastError {
    #[error("toast {handle} cannot be shown again (state: {state})")]
    AlreadyShown {
        handle: WindowHandle,
        state: ToastState,
    },

    #[error("toast {handle} is already closed")]
    Closed { handle: WindowHandle },

    #[error("toast {handle} content can only change before it is shown")]
    ContentLocked { handle: WindowHandle },

    #[error("no active toast with handle {handle}")]
    UnknownToast { handle: WindowHandle },
}

/// Failure reported by a platform animation effect. Never fatal: the
/// animator logs it and snaps the window to its final state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    #[error("window animation is not supported on this platform")]
    Unsupported,

    #[error("invalid window handle {0}")]
    InvalidHandle(WindowHandle),

    #[error("platform animation failed: {0}")]
    Platform(String),
}
