pub mod trace;

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::Read;
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;
use toastpile_core::headless::{HeadlessWindow, RecordingEffect};
use toastpile_core::{ToastError, ToastEvent, ToastState, ToastWindow, Toaster, WindowHandle};
use toastpile_shared::config::AppConfig;
use toastpile_shared::models::{Corner, Point, Size, ToastContent, ToastOptions};

use trace::{Op, Trace};

/// Safety valve for traces whose toasts keep rescheduling each other.
const MAX_TICKS: usize = 100_000;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub events: Vec<TimedEvent>,
    pub rejected: Vec<Rejection>,
    pub toasts: Vec<ToastReport>,
    pub finished_at: u64,
}

impl SimulationResult {
    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            events: Vec::new(),
            rejected: Vec::new(),
            toasts: Vec::new(),
            finished_at: 0,
        }
    }
}

#[derive(Serialize)]
pub struct TimedEvent {
    pub at: u64,
    pub id: String,
    #[serde(flatten)]
    pub event: ToastEvent,
}

/// A step the core refused, e.g. showing a toast twice.
#[derive(Serialize)]
pub struct Rejection {
    pub at: u64,
    pub id: String,
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastReport {
    pub id: String,
    pub handle: WindowHandle,
    pub state: ToastState,
    pub corner: Corner,
    pub slot: Option<usize>,
    pub position: Point,
    pub visible: bool,
    pub destroyed: bool,
    pub renders: usize,
    pub moves: usize,
}

struct Simulator {
    config: AppConfig,
    toaster: Toaster,
    t0: Instant,
    now_ms: Rc<Cell<u64>>,
    events: Rc<RefCell<Vec<(u64, ToastEvent)>>>,
    windows: BTreeMap<String, (Rc<HeadlessWindow>, Corner)>,
    rejected: Vec<Rejection>,
}

impl Simulator {
    fn new(config: AppConfig, trace: &Trace) -> Self {
        let mut toaster = Toaster::from_config(
            &config,
            trace.screen.into(),
            Rc::new(RecordingEffect::new()),
        );
        let now_ms = Rc::new(Cell::new(0));
        let events = Rc::new(RefCell::new(Vec::new()));
        {
            let now_ms = now_ms.clone();
            let events = events.clone();
            toaster.subscribe(move |e| events.borrow_mut().push((now_ms.get(), e.clone())));
        }
        Self {
            config,
            toaster,
            t0: Instant::now(),
            now_ms,
            events,
            windows: BTreeMap::new(),
            rejected: Vec::new(),
        }
    }

    fn instant(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    /// Fire every deadline up to `target`, or all of them when `None`.
    fn advance(&mut self, target: Option<u64>) {
        let limit = target.map(|ms| self.instant(ms));
        for _ in 0..MAX_TICKS {
            let Some(deadline) = self.toaster.next_deadline() else {
                break;
            };
            if limit.is_some_and(|limit| deadline > limit) {
                break;
            }
            let ms = deadline.duration_since(self.t0).as_millis() as u64;
            self.now_ms.set(ms.max(self.now_ms.get()));
            self.toaster.tick(deadline);
        }
        if let Some(ms) = target {
            self.now_ms.set(ms.max(self.now_ms.get()));
        }
    }

    fn handle_of(&self, id: &str) -> Result<WindowHandle, String> {
        self.windows
            .get(id)
            .map(|(w, _)| w.handle())
            .ok_or_else(|| format!("Unknown toast id '{}'", id))
    }

    fn apply(&mut self, at: u64, op: &Op) -> Result<(), String> {
        let now = self.instant(at);
        let id = op.id().unwrap_or_default().to_string();
        let outcome = match op {
            Op::Show {
                id,
                title,
                body,
                delay,
                corner,
                style,
                direction,
                animation_ms,
                height,
            } => {
                if self.windows.contains_key(id) {
                    let handle = self.handle_of(id)?;
                    let state = self.toaster.state_of(handle).unwrap_or(ToastState::Closed);
                    Err(ToastError::AlreadyShown { handle, state })
                } else {
                    let defaults = self.toaster.defaults();
                    let options = ToastOptions {
                        corner: corner.unwrap_or(defaults.corner),
                        style: style.unwrap_or(defaults.style),
                        direction: direction.unwrap_or(defaults.direction),
                        animation_ms: animation_ms.unwrap_or(defaults.animation_ms),
                    };
                    let size = Size::new(
                        self.config.toast.width,
                        height.unwrap_or(self.config.toast.height),
                    );
                    let handle = WindowHandle(self.windows.len() as u64 + 1);
                    let window = HeadlessWindow::with_handle(handle, size);
                    self.windows
                        .insert(id.clone(), (window.clone(), options.corner));
                    let delay = delay.unwrap_or_else(|| self.config.toast.display_delay_ms());
                    self.toaster
                        .show_with(window, ToastContent::new(title, body), options, delay, now)
                        .map(|_| ())
                }
            }
            Op::Enter { id } => {
                let handle = self.handle_of(id)?;
                self.toaster.pointer_enter(handle, now)
            }
            Op::Leave { id } => {
                let handle = self.handle_of(id)?;
                self.toaster.pointer_leave(handle, now)
            }
            Op::Dismiss { id, instant } => {
                let handle = self.handle_of(id)?;
                self.toaster.dismiss(handle, *instant, now)
            }
            Op::AnimationFinished { id, intent } => {
                let handle = self.handle_of(id)?;
                self.toaster.animation_finished(handle, *intent)
            }
            Op::Resize { id, height } => {
                let handle = self.handle_of(id)?;
                let size = Size::new(self.config.toast.width, *height);
                self.toaster.resize(handle, size)
            }
            Op::Tick => {
                self.toaster.tick(now);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            log::info!("[simulate] {}ms {}: {}", at, id, e);
            self.rejected.push(Rejection {
                at,
                id,
                message: e.to_string(),
            });
        }
        Ok(())
    }

    fn finish(self) -> SimulationResult {
        let ids: BTreeMap<WindowHandle, String> = self
            .windows
            .iter()
            .map(|(id, (w, _))| (w.handle(), id.clone()))
            .collect();

        let events = self
            .events
            .borrow()
            .iter()
            .map(|(at, event)| {
                let handle = match event {
                    ToastEvent::Shown { handle, .. }
                    | ToastEvent::Closing { handle, .. }
                    | ToastEvent::Dismissed { handle, .. } => *handle,
                };
                TimedEvent {
                    at: *at,
                    id: ids.get(&handle).cloned().unwrap_or_default(),
                    event: event.clone(),
                }
            })
            .collect();

        let stack = self.toaster.stack();
        let stack = stack.borrow();
        let toasts = self
            .windows
            .iter()
            .map(|(id, (window, corner))| {
                let handle = window.handle();
                let snap = window.snapshot();
                ToastReport {
                    id: id.clone(),
                    handle,
                    state: self.toaster.state_of(handle).unwrap_or(ToastState::Closed),
                    corner: *corner,
                    slot: stack.slot_of(handle).map(|(_, slot)| slot),
                    position: snap.position,
                    visible: snap.visible,
                    destroyed: snap.destroyed,
                    renders: snap.renders,
                    moves: snap.moves,
                }
            })
            .collect();

        SimulationResult {
            success: true,
            error: None,
            events,
            rejected: self.rejected,
            toasts,
            finished_at: self.now_ms.get(),
        }
    }
}

/// Replay `trace` against the headless backend.
pub fn run(trace: Trace, config: AppConfig) -> Result<SimulationResult, String> {
    let mut sim = Simulator::new(config, &trace);
    for step in &trace.steps {
        sim.advance(Some(step.at));
        sim.apply(step.at, &step.op)?;
    }
    sim.advance(trace.until);
    Ok(sim.finish())
}

/// Read a trace from stdin, run it and print the result as JSON.
pub fn handle(input: Option<&std::path::Path>, config: AppConfig, pretty: bool) {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e)),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| format!("Failed to read stdin: {}", e))
        }
    };

    let result = raw
        .and_then(|raw| trace::parse(&raw))
        .and_then(|trace| run(trace, config))
        .unwrap_or_else(SimulationResult::failure);
    let success = result.success;
    emit_result(&result, pretty);
    if !success {
        std::process::exit(1);
    }
}

/// Serializes a SimulationResult as JSON and writes it to stdout
fn emit_result(result: &SimulationResult, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    };
    println!(
        "{}",
        json.unwrap_or_else(|_| r#"{"success":false}"#.to_string())
    );
}
