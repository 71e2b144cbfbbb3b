//! In-memory window and animation backend.
//!
//! Records every call so tests and the `simulate` command can inspect what a
//! real platform would have been asked to do.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use toastpile_shared::models::{Point, Size, ToastContent};

use crate::animation::{AnimationEffect, AnimationFlags, AnimationRequest};
use crate::error::AnimationError;
use crate::window::{ToastWindow, WindowHandle};

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlessState {
    pub position: Point,
    pub size: Size,
    pub visible: bool,
    pub destroyed: bool,
    pub renders: usize,
    pub moves: usize,
    pub visibility_changes: usize,
    pub title: String,
}

pub struct HeadlessWindow {
    handle: WindowHandle,
    state: RefCell<HeadlessState>,
}

impl HeadlessWindow {
    pub fn new(size: Size) -> Rc<Self> {
        let handle = WindowHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        Self::with_handle(handle, size)
    }

    pub fn with_handle(handle: WindowHandle, size: Size) -> Rc<Self> {
        Rc::new(Self {
            handle,
            state: RefCell::new(HeadlessState {
                size,
                ..Default::default()
            }),
        })
    }

    pub fn snapshot(&self) -> HeadlessState {
        self.state.borrow().clone()
    }
}

impl ToastWindow for HeadlessWindow {
    fn handle(&self) -> WindowHandle {
        self.handle
    }

    fn size(&self) -> Size {
        self.state.borrow().size
    }

    fn set_size(&self, size: Size) {
        self.state.borrow_mut().size = size;
    }

    fn set_position(&self, position: Point) {
        let mut state = self.state.borrow_mut();
        state.position = position;
        state.moves += 1;
    }

    fn is_visible(&self) -> bool {
        self.state.borrow().visible
    }

    fn set_visible(&self, visible: bool) {
        let mut state = self.state.borrow_mut();
        if state.visible != visible {
            state.visible = visible;
            state.visibility_changes += 1;
        }
    }

    fn render(&self, content: &ToastContent) {
        let mut state = self.state.borrow_mut();
        state.title = content.title.clone();
        state.renders += 1;
    }

    fn destroy(&self) {
        let mut state = self.state.borrow_mut();
        debug_assert!(!state.destroyed, "window {} destroyed twice", self.handle);
        state.visible = false;
        state.destroyed = true;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Played {
    pub handle: WindowHandle,
    pub request: AnimationRequest,
    pub flags: u32,
}

/// Effect that records requests. Can be told to fail to exercise the
/// snap-to-final-state path.
#[derive(Default)]
pub struct RecordingEffect {
    plays: RefCell<Vec<Played>>,
    failure: RefCell<Option<AnimationError>>,
}

impl RecordingEffect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: Option<AnimationError>) {
        *self.failure.borrow_mut() = error;
    }

    pub fn plays(&self) -> Vec<Played> {
        self.plays.borrow().clone()
    }

    pub fn plays_for(&self, handle: WindowHandle) -> Vec<Played> {
        self.plays
            .borrow()
            .iter()
            .filter(|p| p.handle == handle)
            .cloned()
            .collect()
    }
}

impl AnimationEffect for RecordingEffect {
    fn animate(
        &self,
        handle: WindowHandle,
        request: &AnimationRequest,
    ) -> Result<(), AnimationError> {
        if let Some(error) = self.failure.borrow().clone() {
            return Err(error);
        }
        let flags: AnimationFlags = request.flags();
        self.plays.borrow_mut().push(Played {
            handle,
            request: *request,
            flags: flags.bits(),
        });
        Ok(())
    }
}
