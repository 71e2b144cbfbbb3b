use serde::Serialize;
use toastpile_shared::models::{Point, Size, ToastContent};

/// Opaque identity of a toast window, assigned by whoever creates the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host window driven by a toast.
///
/// Platform windows are cheap shared handles, so every method takes `&self`
/// and implementations use interior mutability where they need it. The
/// rendering surface behind `render` is re-invoked each time the toast is
/// shown or resized.
pub trait ToastWindow {
    fn handle(&self) -> WindowHandle;

    fn size(&self) -> Size;

    fn set_size(&self, size: Size);

    fn set_position(&self, position: Point);

    fn is_visible(&self) -> bool;

    /// Toasts are made visible before their entrance animation is requested,
    /// so the window is on screen even when no effect runs.
    fn set_visible(&self, visible: bool);

    fn render(&self, content: &ToastContent);

    /// Tear down the native window. Called exactly once, when the toast closes.
    fn destroy(&self);
}
