//! Lifecycle and stacking core for transient toast windows.
//!
//! Everything here runs on the single UI-owning thread. Shared state is
//! `Rc<RefCell<_>>`, so none of these types are `Send`.

pub mod animation;
pub mod error;
pub mod headless;
pub mod stack;
pub mod timer;
pub mod toast;
pub mod toaster;
pub mod window;

pub use animation::{AnimationEffect, AnimationFlags, AnimationRequest, Animator, Intent};
pub use error::{AnimationError, ToastError};
pub use stack::{Relocation, Reservation, StackCoordinator, StackLayout};
pub use timer::{LifecycleTimer, TimerState};
pub use toast::{CloseReason, Toast, ToastEvent, ToastState};
pub use toaster::Toaster;
pub use window::{ToastWindow, WindowHandle};
