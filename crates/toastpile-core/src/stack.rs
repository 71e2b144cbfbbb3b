use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use serde::Serialize;
use toastpile_shared::models::{Corner, Direction, Point, Rect, Size};

use crate::window::{ToastWindow, WindowHandle};

/// Screen geometry the stacks are laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackLayout {
    /// Usable work area (menu bars and docks excluded).
    pub screen: Rect,
    /// Distance between the screen edges and the outermost toast.
    pub margin: f64,
    /// Space between neighbouring toasts.
    pub gap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reservation {
    pub corner: Corner,
    pub slot: usize,
    pub direction: Direction,
    pub position: Point,
}

/// A sibling that moved because the stack below it changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Relocation {
    pub handle: WindowHandle,
    pub from: usize,
    pub to: usize,
    pub position: Point,
}

struct Entry {
    handle: WindowHandle,
    window: Weak<dyn ToastWindow>,
    size: Size,
}

/// Registry of visible toasts, one ordered list per screen corner.
///
/// Slot `i` of a corner is index `i` of its list, so slots are contiguous by
/// construction. Windows are held weakly: the toast owns its window, the
/// coordinator only moves it.
pub struct StackCoordinator {
    layout: StackLayout,
    corners: BTreeMap<Corner, Vec<Entry>>,
}

impl StackCoordinator {
    pub fn new(layout: StackLayout) -> Self {
        Self {
            layout,
            corners: BTreeMap::new(),
        }
    }

    pub fn shared(layout: StackLayout) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(layout)))
    }

    pub fn layout(&self) -> StackLayout {
        self.layout
    }

    /// Append a toast to `corner` and derive its entrance direction.
    ///
    /// The first toast in a corner keeps `requested`; later arrivals travel
    /// along the corner's growth axis, away from the sibling below them.
    pub fn reserve(
        &mut self,
        corner: Corner,
        window: &Rc<dyn ToastWindow>,
        requested: Direction,
    ) -> Reservation {
        let handle = window.handle();
        debug_assert!(
            self.slot_of(handle).is_none(),
            "window {} reserved twice",
            handle
        );

        let entries = self.corners.entry(corner).or_default();
        let slot = entries.len();
        entries.push(Entry {
            handle,
            window: Rc::downgrade(window),
            size: window.size(),
        });

        let direction = if slot == 0 {
            requested
        } else {
            corner.growth_direction()
        };
        let position = self.position_at(corner, slot);

        log::debug!(
            "[stack] reserve {} at {} slot {} ({})",
            handle,
            corner,
            slot,
            direction
        );

        Reservation {
            corner,
            slot,
            direction,
            position,
        }
    }

    /// Remove a toast and slide everything above it down one slot.
    ///
    /// Returns `None` when the handle holds no slot, so a second release of the
    /// same toast is harmless.
    pub fn release(&mut self, handle: WindowHandle) -> Option<Vec<Relocation>> {
        let (corner, slot) = self.slot_of(handle)?;

        let entries = self.corners.get_mut(&corner)?;
        entries.remove(slot);
        let emptied = entries.is_empty();

        let moved = self.restack(corner, slot, |to| to + 1);
        if emptied {
            self.corners.remove(&corner);
        }
        self.check_invariants();

        log::debug!(
            "[stack] release {} from {} slot {}, {} moved",
            handle,
            corner,
            slot,
            moved.len()
        );
        Some(moved)
    }

    /// Record a new size for a toast and reposition it and the siblings above it.
    pub fn resize(&mut self, handle: WindowHandle, size: Size) -> Vec<Relocation> {
        let Some((corner, slot)) = self.slot_of(handle) else {
            return Vec::new();
        };
        if let Some(entry) = self.corners.get_mut(&corner).and_then(|e| e.get_mut(slot)) {
            entry.size = size;
        }
        self.restack(corner, slot, |to| to)
    }

    pub fn slot_of(&self, handle: WindowHandle) -> Option<(Corner, usize)> {
        self.corners.iter().find_map(|(corner, entries)| {
            entries
                .iter()
                .position(|e| e.handle == handle)
                .map(|slot| (*corner, slot))
        })
    }

    pub fn position_of(&self, handle: WindowHandle) -> Option<Point> {
        let (corner, slot) = self.slot_of(handle)?;
        Some(self.position_at(corner, slot))
    }

    /// Handles in `corner`, slot order.
    pub fn handles(&self, corner: Corner) -> Vec<WindowHandle> {
        self.corners
            .get(&corner)
            .map(|entries| entries.iter().map(|e| e.handle).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.corners.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.corners.is_empty()
    }

    /// Reposition every entry from `from` upward. `previous` maps a current
    /// slot to the slot the entry occupied before the change.
    fn restack(
        &self,
        corner: Corner,
        from: usize,
        previous: impl Fn(usize) -> usize,
    ) -> Vec<Relocation> {
        let Some(entries) = self.corners.get(&corner) else {
            return Vec::new();
        };

        let mut moved = Vec::new();
        for (slot, entry) in entries.iter().enumerate().skip(from) {
            let position = self.position_at(corner, slot);
            match entry.window.upgrade() {
                Some(window) => window.set_position(position),
                None => log::warn!("[stack] {} dropped without release", entry.handle),
            }
            moved.push(Relocation {
                handle: entry.handle,
                from: previous(slot),
                to: slot,
                position,
            });
        }
        moved
    }

    /// Top-left of the window in `slot`: the corner's base point pushed
    /// inward by the heights of every sibling below it plus one gap each.
    fn position_at(&self, corner: Corner, slot: usize) -> Point {
        let StackLayout {
            screen,
            margin,
            gap,
        } = self.layout;
        let Some(entries) = self.corners.get(&corner) else {
            return screen.origin;
        };
        let size = entries.get(slot).map(|e| e.size).unwrap_or_default();
        let below: f64 = entries[..slot.min(entries.len())]
            .iter()
            .map(|e| e.size.height + gap)
            .sum();

        let x = if corner.is_right() {
            screen.right() - margin - size.width
        } else {
            screen.origin.x + margin
        };
        let y = if corner.is_bottom() {
            screen.bottom() - margin - size.height - below
        } else {
            screen.origin.y + margin + below
        };
        Point::new(x, y)
    }

    fn check_invariants(&self) {
        if cfg!(debug_assertions) {
            for (corner, entries) in &self.corners {
                debug_assert!(!entries.is_empty(), "empty stack kept for {}", corner);
                for (i, entry) in entries.iter().enumerate() {
                    debug_assert!(
                        entries[i + 1..].iter().all(|e| e.handle != entry.handle),
                        "{} occupies two slots in {}",
                        entry.handle,
                        corner
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessWindow;

    const SCREEN: Rect = Rect {
        origin: Point { x: 0.0, y: 0.0 },
        size: Size {
            width: 1920.0,
            height: 1080.0,
        },
    };

    fn coordinator() -> StackCoordinator {
        StackCoordinator::new(StackLayout {
            screen: SCREEN,
            margin: 16.0,
            gap: 8.0,
        })
    }

    fn window() -> Rc<dyn ToastWindow> {
        HeadlessWindow::new(Size::new(360.0, 100.0))
    }

    fn assert_contiguous(stack: &StackCoordinator, corner: Corner) {
        for (i, handle) in stack.handles(corner).into_iter().enumerate() {
            assert_eq!(stack.slot_of(handle), Some((corner, i)));
        }
    }

    #[test]
    fn slots_are_assigned_in_arrival_order() {
        let mut stack = coordinator();
        let windows: Vec<_> = (0..3).map(|_| window()).collect();
        let slots: Vec<usize> = windows
            .iter()
            .map(|w| stack.reserve(Corner::BottomRight, w, Direction::Left).slot)
            .collect();
        assert_eq!(slots, vec![0, 1, 2]);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn bottom_right_offsets_grow_upward() {
        let mut stack = coordinator();
        let a = window();
        let b = window();
        let first = stack.reserve(Corner::BottomRight, &a, Direction::Up);
        let second = stack.reserve(Corner::BottomRight, &b, Direction::Up);

        assert_eq!(first.position, Point::new(1920.0 - 16.0 - 360.0, 1080.0 - 16.0 - 100.0));
        // slot 1 sits one (height + gap) above slot 0
        assert_eq!(second.position.x, first.position.x);
        assert_eq!(second.position.y, first.position.y - 108.0);
    }

    #[test]
    fn top_left_offsets_grow_downward() {
        let mut stack = coordinator();
        let windows: Vec<_> = (0..3).map(|_| window()).collect();
        let positions: Vec<Point> = windows
            .iter()
            .map(|w| stack.reserve(Corner::TopLeft, w, Direction::Right).position)
            .collect();
        assert_eq!(positions[0], Point::new(16.0, 16.0));
        assert_eq!(positions[2], Point::new(16.0, 16.0 + 2.0 * 108.0));
    }

    #[test]
    fn sibling_direction_follows_occupancy() {
        let mut stack = coordinator();
        let a = window();
        let b = window();
        let c = window();
        assert_eq!(stack.reserve(Corner::BottomLeft, &a, Direction::Right).direction, Direction::Right);
        assert_eq!(stack.reserve(Corner::BottomLeft, &b, Direction::Right).direction, Direction::Up);
        // A different corner starts its own stack
        assert_eq!(stack.reserve(Corner::TopRight, &c, Direction::Left).direction, Direction::Left);
    }

    #[test]
    fn first_arrival_after_emptying_gets_requested_direction_again() {
        let mut stack = coordinator();
        let a = window();
        let b = window();
        stack.reserve(Corner::TopRight, &a, Direction::Left);
        stack.release(a.handle());
        assert!(stack.is_empty());
        let again = stack.reserve(Corner::TopRight, &b, Direction::Left);
        assert_eq!((again.slot, again.direction), (0, Direction::Left));
    }

    #[test]
    fn releasing_middle_shifts_upper_siblings_down() {
        let mut stack = coordinator();
        let a = window();
        let b = window();
        let c = window();
        let pa = stack.reserve(Corner::BottomRight, &a, Direction::Up).position;
        let pb = stack.reserve(Corner::BottomRight, &b, Direction::Up).position;
        stack.reserve(Corner::BottomRight, &c, Direction::Up);

        let moved = stack.release(b.handle()).unwrap();
        assert_eq!(
            moved,
            vec![Relocation {
                handle: c.handle(),
                from: 2,
                to: 1,
                position: pb,
            }]
        );
        assert_eq!(stack.position_of(a.handle()), Some(pa));
        assert_eq!(stack.slot_of(c.handle()), Some((Corner::BottomRight, 1)));
        assert_contiguous(&stack, Corner::BottomRight);
    }

    #[test]
    fn relocation_moves_the_window() {
        let mut stack = coordinator();
        let a = HeadlessWindow::new(Size::new(360.0, 100.0));
        let b = HeadlessWindow::new(Size::new(360.0, 100.0));
        let a_dyn: Rc<dyn ToastWindow> = a.clone();
        let b_dyn: Rc<dyn ToastWindow> = b.clone();
        let pa = stack.reserve(Corner::BottomRight, &a_dyn, Direction::Up).position;
        stack.reserve(Corner::BottomRight, &b_dyn, Direction::Up);

        stack.release(a.handle());
        assert_eq!(b.snapshot().position, pa);
    }

    #[test]
    fn double_release_is_a_noop() {
        let mut stack = coordinator();
        let a = window();
        stack.reserve(Corner::BottomRight, &a, Direction::Up);
        assert!(stack.release(a.handle()).is_some());
        assert!(stack.release(a.handle()).is_none());
        assert!(stack.is_empty());
    }

    #[test]
    fn random_reserve_release_keeps_slots_contiguous() {
        let mut stack = coordinator();
        let mut live: Vec<Rc<dyn ToastWindow>> = Vec::new();
        // Deterministic LCG so the sequence is reproducible
        let mut seed: u64 = 0x5eed;
        for _ in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            if live.is_empty() || seed % 3 != 0 {
                let w = window();
                stack.reserve(Corner::BottomRight, &w, Direction::Up);
                live.push(w);
            } else {
                let victim = live.remove((seed >> 33) as usize % live.len());
                stack.release(victim.handle());
            }
            assert_eq!(stack.len(), live.len());
            assert_contiguous(&stack, Corner::BottomRight);
        }
    }

    #[test]
    fn resize_relocates_the_entry_and_everything_above() {
        let mut stack = coordinator();
        let a = window();
        let b = window();
        let c = window();
        stack.reserve(Corner::TopRight, &a, Direction::Down);
        stack.reserve(Corner::TopRight, &b, Direction::Down);
        stack.reserve(Corner::TopRight, &c, Direction::Down);

        let moved = stack.resize(a.handle(), Size::new(360.0, 150.0));
        let tos: Vec<usize> = moved.iter().map(|r| r.to).collect();
        assert_eq!(tos, vec![0, 1, 2]);
        assert_eq!(
            stack.position_of(b.handle()),
            Some(Point::new(1920.0 - 16.0 - 360.0, 16.0 + 158.0))
        );
        assert_eq!(
            stack.position_of(c.handle()),
            Some(Point::new(1920.0 - 16.0 - 360.0, 16.0 + 158.0 + 108.0))
        );
    }
}
