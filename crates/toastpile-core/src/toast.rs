use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;
use toastpile_shared::models::{
    ColorScheme, Direction, Point, Size, ToastContent, ToastOptions,
};

use crate::animation::{AnimationEffect, AnimationRequest, Animator, Intent};
use crate::error::ToastError;
use crate::stack::StackCoordinator;
use crate::timer::{LifecycleTimer, TimerState};
use crate::window::{ToastWindow, WindowHandle};

/// Extra time an exit animation gets before the window is torn down.
const EXIT_GRACE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToastState {
    Created,
    /// Visible, entrance animation still running.
    Showing,
    Visible,
    HoverPaused,
    /// Exit animation running.
    Dismissing,
    Closed,
}

impl std::fmt::Display for ToastState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ToastState::Created => "created",
            ToastState::Showing => "showing",
            ToastState::Visible => "visible",
            ToastState::HoverPaused => "hover-paused",
            ToastState::Dismissing => "dismissing",
            ToastState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    /// The display delay ran out.
    Expired,
    /// Someone called `dismiss`.
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ToastEvent {
    Shown {
        handle: WindowHandle,
        slot: usize,
        direction: Direction,
        position: Point,
    },
    Closing {
        handle: WindowHandle,
        reason: CloseReason,
        instant: bool,
    },
    Dismissed {
        handle: WindowHandle,
        reason: CloseReason,
    },
}

pub type Listener = Box<dyn FnMut(&ToastEvent)>;

/// A single toast: its window, its countdown and its place in the stack.
///
/// The toast owns its window and holds the coordinator it was created with;
/// the coordinator only keeps a weak reference back to the window.
pub struct Toast {
    window: Rc<dyn ToastWindow>,
    stack: Rc<RefCell<StackCoordinator>>,
    animator: Animator,
    content: ToastContent,
    options: ToastOptions,
    state: ToastState,
    direction: Direction,
    timer: Option<LifecycleTimer>,
    /// End of the running enter or exit animation.
    transition_until: Option<Instant>,
    close_reason: CloseReason,
    holds_slot: bool,
    listeners: Vec<Listener>,
}

impl Toast {
    pub fn new(
        window: Rc<dyn ToastWindow>,
        stack: Rc<RefCell<StackCoordinator>>,
        effect: Rc<dyn AnimationEffect>,
        content: ToastContent,
        options: ToastOptions,
    ) -> Self {
        Self {
            window,
            stack,
            animator: Animator::new(effect),
            content,
            direction: options.direction,
            options,
            state: ToastState::Created,
            timer: None,
            transition_until: None,
            close_reason: CloseReason::Dismissed,
            holds_slot: false,
            listeners: Vec::new(),
        }
    }

    pub fn handle(&self) -> WindowHandle {
        self.window.handle()
    }

    pub fn state(&self) -> ToastState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == ToastState::Closed
    }

    pub fn content(&self) -> &ToastContent {
        &self.content
    }

    pub fn options(&self) -> &ToastOptions {
        &self.options
    }

    /// Current entrance direction. Reassigned by the coordinator on show.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn exit_direction(&self) -> Direction {
        self.direction.opposite()
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer
            .as_ref()
            .map_or(TimerState::Stopped, LifecycleTimer::state)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.timer.as_ref().and_then(|t| t.remaining(now))
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ToastEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), ToastError> {
        self.ensure_unshown()?;
        self.content.title = title.into();
        Ok(())
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> Result<(), ToastError> {
        self.ensure_unshown()?;
        self.content.body = body.into();
        Ok(())
    }

    pub fn set_icon(&mut self, icon: impl Into<String>, padding: f64) -> Result<(), ToastError> {
        self.ensure_unshown()?;
        self.content.icon = icon.into();
        self.content.icon_padding = padding;
        Ok(())
    }

    pub fn set_colors(&mut self, colors: ColorScheme) -> Result<(), ToastError> {
        self.ensure_unshown()?;
        self.content.colors = colors;
        Ok(())
    }

    /// Reserve a slot, put the window on screen and start the countdown.
    /// `delay_ms == 0` keeps the toast up until it is dismissed.
    pub fn show(&mut self, delay_ms: u64, now: Instant) -> Result<(), ToastError> {
        match self.state {
            ToastState::Created => {}
            ToastState::Closed => return Err(ToastError::Closed { handle: self.handle() }),
            state => {
                return Err(ToastError::AlreadyShown {
                    handle: self.handle(),
                    state,
                })
            }
        }

        let reservation =
            self.stack
                .borrow_mut()
                .reserve(self.options.corner, &self.window, self.options.direction);
        self.holds_slot = true;
        self.direction = reservation.direction;

        self.window.set_position(reservation.position);
        self.window.render(&self.content);
        self.window.set_visible(true);
        self.state = ToastState::Showing;

        let duration = Duration::from_millis(self.options.animation_ms);
        let played = self.animator.play(&*self.window, self.request(Intent::Enter));
        if played && !duration.is_zero() {
            self.transition_until = Some(now + duration);
        } else {
            self.state = ToastState::Visible;
        }

        if delay_ms > 0 {
            let mut timer = LifecycleTimer::new();
            timer.start(Duration::from_millis(delay_ms), now);
            self.timer = Some(timer);
        }

        log::info!(
            "[toast] show {} slot {} in {} ({}, delay {}ms)",
            self.handle(),
            reservation.slot,
            reservation.corner,
            self.direction,
            delay_ms
        );
        self.emit(ToastEvent::Shown {
            handle: self.handle(),
            slot: reservation.slot,
            direction: self.direction,
            position: reservation.position,
        });
        Ok(())
    }

    /// The host reports that the animation played for `intent` finished.
    ///
    /// A completion that does not match the running transition is stale (an
    /// entrance finishing after an exit has started) and is ignored.
    pub fn animation_finished(&mut self, intent: Intent) {
        match (self.state, intent) {
            (ToastState::Showing, Intent::Enter) => self.finish_entrance(),
            (ToastState::Dismissing, Intent::Exit) => self.close(),
            (state, intent) => {
                log::debug!(
                    "[toast] {} ignored {:?} completion while {}",
                    self.handle(),
                    intent,
                    state
                );
            }
        }
    }

    pub fn pointer_enter(&mut self, now: Instant) {
        if self.state == ToastState::Showing {
            self.finish_entrance();
        }
        if self.state != ToastState::Visible {
            return;
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.pause(now);
        }
        self.state = ToastState::HoverPaused;
        log::debug!("[toast] {} paused on hover", self.handle());
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        if self.state != ToastState::HoverPaused {
            return;
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.resume(now);
        }
        self.state = ToastState::Visible;
        log::debug!("[toast] {} resumed", self.handle());
    }

    /// Close the toast. `instant` hides the window without an exit animation,
    /// and also cuts short an exit animation already running.
    ///
    /// Safe to call repeatedly; a closed toast ignores it.
    pub fn dismiss(&mut self, instant: bool, now: Instant) {
        self.begin_dismiss(CloseReason::Dismissed, instant, now);
    }

    /// Drive timers and animation deadlines forward.
    pub fn tick(&mut self, now: Instant) {
        let transition_done = self.transition_until.is_some_and(|until| now >= until);
        match self.state {
            ToastState::Showing if transition_done => self.finish_entrance(),
            ToastState::Dismissing if transition_done => self.close(),
            _ => {}
        }

        if matches!(self.state, ToastState::Showing | ToastState::Visible) {
            let expired = self.timer.as_mut().is_some_and(|t| t.poll(now));
            if expired {
                log::info!("[toast] {} expired", self.handle());
                self.begin_dismiss(CloseReason::Expired, false, now);
            }
        }
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let timer = match self.state {
            ToastState::Showing | ToastState::Visible => {
                self.timer.as_ref().and_then(LifecycleTimer::deadline)
            }
            _ => None,
        };
        match (timer, self.transition_until) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Resize the window, redraw it and restack the siblings above.
    pub fn resize(&mut self, size: Size) -> Result<(), ToastError> {
        if self.state == ToastState::Closed {
            return Err(ToastError::Closed { handle: self.handle() });
        }
        self.window.set_size(size);
        if self.holds_slot {
            let moved = self.stack.borrow_mut().resize(self.handle(), size);
            log::debug!("[toast] {} resized, {} restacked", self.handle(), moved.len());
        }
        self.window.render(&self.content);
        Ok(())
    }

    fn begin_dismiss(&mut self, reason: CloseReason, instant: bool, now: Instant) {
        match self.state {
            ToastState::Closed => {
                log::debug!("[toast] {} already closed", self.handle());
                return;
            }
            ToastState::Dismissing => {
                if instant {
                    self.window.set_visible(false);
                    self.close();
                }
                return;
            }
            _ => {}
        }

        if let Some(timer) = self.timer.as_mut() {
            timer.stop();
        }
        self.close_reason = reason;
        let was_created = self.state == ToastState::Created;
        self.state = ToastState::Dismissing;
        self.transition_until = None;
        self.emit(ToastEvent::Closing {
            handle: self.handle(),
            reason,
            instant,
        });

        if instant || was_created {
            self.window.set_visible(false);
            self.close();
            return;
        }

        let duration = Duration::from_millis(self.options.animation_ms);
        if self.animator.play(&*self.window, self.request(Intent::Exit)) {
            self.transition_until = Some(now + duration + EXIT_GRACE);
        } else {
            self.close();
        }
    }

    fn finish_entrance(&mut self) {
        self.transition_until = None;
        self.state = ToastState::Visible;
    }

    fn close(&mut self) {
        self.state = ToastState::Closed;
        self.transition_until = None;
        self.timer = None;
        self.window.destroy();

        if self.holds_slot {
            self.holds_slot = false;
            let moved = self.stack.borrow_mut().release(self.handle());
            if let Some(moved) = moved {
                for r in &moved {
                    log::debug!("[toast] {} moved {} -> {}", r.handle, r.from, r.to);
                }
            }
        }

        log::info!("[toast] {} closed ({:?})", self.handle(), self.close_reason);
        self.emit(ToastEvent::Dismissed {
            handle: self.handle(),
            reason: self.close_reason,
        });
    }

    fn request(&self, intent: Intent) -> AnimationRequest {
        let direction = match intent {
            Intent::Exit => self.exit_direction(),
            _ => self.direction,
        };
        AnimationRequest {
            duration: Duration::from_millis(self.options.animation_ms),
            direction,
            style: self.options.style,
            intent,
        }
    }

    fn ensure_unshown(&self) -> Result<(), ToastError> {
        match self.state {
            ToastState::Created => Ok(()),
            _ => Err(ToastError::ContentLocked { handle: self.handle() }),
        }
    }

    fn emit(&mut self, event: ToastEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl Drop for Toast {
    fn drop(&mut self) {
        if !self.holds_slot {
            return;
        }
        // Dropped while on screen: tear down without animation so the slot is freed.
        let handle = self.handle();
        self.emit(ToastEvent::Closing {
            handle,
            reason: CloseReason::Dismissed,
            instant: true,
        });
        self.window.set_visible(false);
        self.window.destroy();
        if let Ok(mut stack) = self.stack.try_borrow_mut() {
            stack.release(handle);
        }
        log::info!("[toast] {} dropped while shown", handle);
        self.emit(ToastEvent::Dismissed {
            handle,
            reason: CloseReason::Dismissed,
        });
    }
}
