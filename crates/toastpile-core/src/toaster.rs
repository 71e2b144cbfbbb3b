use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Instant;

use toastpile_shared::config::AppConfig;
use toastpile_shared::models::{Rect, Size, ToastContent, ToastOptions};

use crate::animation::{AnimationEffect, Intent};
use crate::error::ToastError;
use crate::stack::{StackCoordinator, StackLayout};
use crate::toast::{Toast, ToastEvent, ToastState};
use crate::window::{ToastWindow, WindowHandle};

type SharedListeners = Rc<RefCell<Vec<Box<dyn FnMut(&ToastEvent)>>>>;

/// Owns every live toast on the UI thread.
///
/// The host creates native windows and hands them in; the toaster wires each
/// one to the shared coordinator and effect, forwards pointer events by
/// handle, and drops toasts once they have closed.
pub struct Toaster {
    stack: Rc<RefCell<StackCoordinator>>,
    effect: Rc<dyn AnimationEffect>,
    defaults: ToastOptions,
    toasts: BTreeMap<WindowHandle, Toast>,
    listeners: SharedListeners,
}

impl Toaster {
    pub fn new(
        stack: Rc<RefCell<StackCoordinator>>,
        effect: Rc<dyn AnimationEffect>,
        defaults: ToastOptions,
    ) -> Self {
        Self {
            stack,
            effect,
            defaults,
            toasts: BTreeMap::new(),
            listeners: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Build a toaster laid out on `screen` with the configured gap, margin
    /// and animation defaults.
    pub fn from_config(config: &AppConfig, screen: Rect, effect: Rc<dyn AnimationEffect>) -> Self {
        let layout = StackLayout {
            screen,
            margin: config.stack.margin,
            gap: config.stack.gap,
        };
        Self::new(
            StackCoordinator::shared(layout),
            effect,
            config.toast_options(),
        )
    }

    pub fn stack(&self) -> Rc<RefCell<StackCoordinator>> {
        self.stack.clone()
    }

    pub fn defaults(&self) -> ToastOptions {
        self.defaults
    }

    /// Receive the events of every toast created from now on.
    pub fn subscribe(&mut self, listener: impl FnMut(&ToastEvent) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn show(
        &mut self,
        window: Rc<dyn ToastWindow>,
        content: ToastContent,
        delay_ms: u64,
        now: Instant,
    ) -> Result<WindowHandle, ToastError> {
        self.show_with(window, content, self.defaults, delay_ms, now)
    }

    pub fn show_with(
        &mut self,
        window: Rc<dyn ToastWindow>,
        content: ToastContent,
        options: ToastOptions,
        delay_ms: u64,
        now: Instant,
    ) -> Result<WindowHandle, ToastError> {
        let handle = window.handle();
        if self.toasts.contains_key(&handle) {
            return Err(ToastError::AlreadyShown {
                handle,
                state: self.toasts[&handle].state(),
            });
        }

        let mut toast = Toast::new(
            window,
            self.stack.clone(),
            self.effect.clone(),
            content,
            options,
        );
        let listeners = self.listeners.clone();
        toast.subscribe(move |event| {
            for listener in listeners.borrow_mut().iter_mut() {
                listener(event);
            }
        });

        toast.show(delay_ms, now)?;
        self.toasts.insert(handle, toast);
        Ok(handle)
    }

    pub fn pointer_enter(&mut self, handle: WindowHandle, now: Instant) -> Result<(), ToastError> {
        self.get_mut(handle)?.pointer_enter(now);
        Ok(())
    }

    pub fn pointer_leave(&mut self, handle: WindowHandle, now: Instant) -> Result<(), ToastError> {
        self.get_mut(handle)?.pointer_leave(now);
        Ok(())
    }

    pub fn dismiss(
        &mut self,
        handle: WindowHandle,
        instant: bool,
        now: Instant,
    ) -> Result<(), ToastError> {
        self.get_mut(handle)?.dismiss(instant, now);
        self.sweep();
        Ok(())
    }

    /// Close everything at once, without exit animations.
    pub fn dismiss_all(&mut self, now: Instant) {
        for toast in self.toasts.values_mut() {
            toast.dismiss(true, now);
        }
        self.sweep();
    }

    pub fn animation_finished(
        &mut self,
        handle: WindowHandle,
        intent: Intent,
    ) -> Result<(), ToastError> {
        self.get_mut(handle)?.animation_finished(intent);
        self.sweep();
        Ok(())
    }

    pub fn resize(&mut self, handle: WindowHandle, size: Size) -> Result<(), ToastError> {
        self.get_mut(handle)?.resize(size)
    }

    pub fn tick(&mut self, now: Instant) {
        for toast in self.toasts.values_mut() {
            toast.tick(now);
        }
        self.sweep();
    }

    /// When the host event loop should wake up next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.toasts.values().filter_map(Toast::next_deadline).min()
    }

    pub fn get(&self, handle: WindowHandle) -> Option<&Toast> {
        self.toasts.get(&handle)
    }

    pub fn state_of(&self, handle: WindowHandle) -> Option<ToastState> {
        self.toasts.get(&handle).map(Toast::state)
    }

    pub fn handles(&self) -> Vec<WindowHandle> {
        self.toasts.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    fn get_mut(&mut self, handle: WindowHandle) -> Result<&mut Toast, ToastError> {
        self.toasts
            .get_mut(&handle)
            .ok_or(ToastError::UnknownToast { handle })
    }

    fn sweep(&mut self) {
        self.toasts.retain(|_, toast| !toast.is_closed());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::headless::{HeadlessWindow, RecordingEffect};
    use toastpile_shared::models::Corner;

    fn toaster() -> (Toaster, Rc<RefCell<Vec<ToastEvent>>>) {
        let config = AppConfig::default();
        let mut toaster = Toaster::from_config(
            &config,
            Rect::new(0.0, 0.0, 1440.0, 900.0),
            Rc::new(RecordingEffect::new()),
        );
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        toaster.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        (toaster, events)
    }

    fn window() -> Rc<HeadlessWindow> {
        HeadlessWindow::new(Size::new(360.0, 96.0))
    }

    #[test]
    fn three_toasts_stack_and_restack() {
        let (mut toaster, _events) = toaster();
        let t0 = Instant::now();
        let (a, b, c) = (window(), window(), window());
        let ha = toaster.show(a.clone(), ToastContent::new("A", ""), 0, t0).unwrap();
        let hb = toaster.show(b.clone(), ToastContent::new("B", ""), 0, t0).unwrap();
        let hc = toaster.show(c.clone(), ToastContent::new("C", ""), 0, t0).unwrap();

        let stack = toaster.stack();
        assert_eq!(stack.borrow().handles(Corner::BottomRight), vec![ha, hb, hc]);

        let b_pos = b.snapshot().position;
        toaster.dismiss(hb, true, t0).unwrap();
        assert_eq!(stack.borrow().handles(Corner::BottomRight), vec![ha, hc]);
        assert_eq!(c.snapshot().position, b_pos);
        assert_eq!(toaster.len(), 2);
        assert_eq!(toaster.state_of(hb), None);
    }

    #[test]
    fn tick_sweeps_closed_toasts() {
        let (mut toaster, events) = toaster();
        let t0 = Instant::now();
        let h = toaster
            .show(window(), ToastContent::new("A", ""), 1000, t0)
            .unwrap();

        assert_eq!(toaster.next_deadline(), Some(t0 + Duration::from_millis(250)));
        toaster.tick(t0 + Duration::from_millis(250));
        assert_eq!(toaster.next_deadline(), Some(t0 + Duration::from_millis(1000)));
        toaster.tick(t0 + Duration::from_millis(1000));
        assert_eq!(toaster.state_of(h), Some(ToastState::Dismissing));
        toaster.tick(t0 + Duration::from_millis(1300));

        assert!(toaster.is_empty());
        assert!(toaster.stack().borrow().is_empty());
        let kinds: Vec<&str> = events
            .borrow()
            .iter()
            .map(|e| match e {
                ToastEvent::Shown { .. } => "shown",
                ToastEvent::Closing { .. } => "closing",
                ToastEvent::Dismissed { .. } => "dismissed",
            })
            .collect();
        assert_eq!(kinds, vec!["shown", "closing", "dismissed"]);
    }

    #[test]
    fn unknown_handles_are_reported() {
        let (mut toaster, _events) = toaster();
        let t0 = Instant::now();
        let h = toaster.show(window(), ToastContent::new("A", ""), 0, t0).unwrap();
        toaster.dismiss(h, true, t0).unwrap();

        assert_eq!(
            toaster.dismiss(h, true, t0),
            Err(ToastError::UnknownToast { handle: h })
        );
        assert!(toaster.pointer_enter(h, t0).is_err());
    }

    #[test]
    fn same_window_cannot_be_shown_twice() {
        let (mut toaster, _events) = toaster();
        let t0 = Instant::now();
        let w = window();
        toaster.show(w.clone(), ToastContent::new("A", ""), 0, t0).unwrap();
        let err = toaster
            .show(w.clone(), ToastContent::new("A", ""), 0, t0)
            .unwrap_err();
        assert!(matches!(err, ToastError::AlreadyShown { .. }));
        assert_eq!(toaster.stack().borrow().len(), 1);
    }

    #[test]
    fn dismiss_all_empties_every_corner() {
        let (mut toaster, _events) = toaster();
        let t0 = Instant::now();
        let top = ToastOptions {
            corner: Corner::TopLeft,
            ..toaster.defaults()
        };
        toaster.show(window(), ToastContent::new("A", ""), 0, t0).unwrap();
        toaster
            .show_with(window(), ToastContent::new("B", ""), top, 0, t0)
            .unwrap();

        toaster.dismiss_all(t0);
        assert!(toaster.is_empty());
        assert!(toaster.stack().borrow().is_empty());
    }

    #[test]
    fn late_entrance_completion_keeps_the_exit_running() {
        let (mut toaster, _events) = toaster();
        let t0 = Instant::now();
        let a = window();
        let b = window();
        let ha = toaster.show(a.clone(), ToastContent::new("A", ""), 0, t0).unwrap();
        toaster.show(b.clone(), ToastContent::new("B", ""), 0, t0).unwrap();
        let b_pos = b.snapshot().position;

        toaster.dismiss(ha, false, t0 + Duration::from_millis(10)).unwrap();
        toaster.animation_finished(ha, Intent::Enter).unwrap();
        assert_eq!(toaster.state_of(ha), Some(ToastState::Dismissing));
        assert_eq!(b.snapshot().position, b_pos);

        toaster.animation_finished(ha, Intent::Exit).unwrap();
        assert_eq!(toaster.state_of(ha), None);
        assert!(a.snapshot().destroyed);
        assert_ne!(b.snapshot().position, b_pos);
    }
}
