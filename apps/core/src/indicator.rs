use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::debug;
use serde::Serialize;

use crate::domain::{ContainerId, IndicatorSize};
use crate::generation::Generations;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorState {
    #[default]
    Absent,
    Visible,
    Hidden,
}

/// Guards handed out and guards given back. Equal once every pipeline has
/// reached a terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndicatorStats {
    pub shown: usize,
    pub released: usize,
}

impl IndicatorStats {
    pub const fn outstanding(self) -> usize {
        self.shown.saturating_sub(self.released)
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: IndicatorState,
    holders: usize,
    owner: u64,
}

#[derive(Debug, Clone, Copy)]
enum Release {
    Hide,
    Remove,
}

struct Inner {
    surface: Rc<dyn Surface>,
    generations: Generations,
    slots: RefCell<BTreeMap<ContainerId, Slot>>,
    stats: Cell<IndicatorStats>,
}

/// Per-container busy state. At most one indicator node per container; the
/// node stays visible while any holder of the current generation keeps a
/// guard.
#[derive(Clone)]
pub struct IndicatorManager {
    inner: Rc<Inner>,
}

impl IndicatorManager {
    pub fn new(surface: Rc<dyn Surface>, generations: Generations) -> Self {
        Self {
            inner: Rc::new(Inner {
                surface,
                generations,
                slots: RefCell::new(BTreeMap::new()),
                stats: Cell::new(IndicatorStats::default()),
            }),
        }
    }

    /// `None` when the container is not on the page.
    pub fn show(&self, id: ContainerId, size: IndicatorSize) -> Option<IndicatorGuard> {
        let inner = &self.inner;
        if !inner.surface.contains(id) {
            debug!("No container #{} for a loading indicator", id.dom_id());
            return None;
        }

        let generation = inner.generations.current();
        {
            let mut slots = inner.slots.borrow_mut();
            let slot = slots.entry(id).or_default();
            match slot.state {
                IndicatorState::Absent => inner.surface.attach_indicator(id, size),
                IndicatorState::Hidden => inner.surface.set_indicator_visible(id, true),
                IndicatorState::Visible => {}
            }
            if slot.state == IndicatorState::Visible && slot.owner == generation {
                slot.holders += 1;
            } else {
                slot.holders = 1;
                slot.owner = generation;
            }
            slot.state = IndicatorState::Visible;
        }

        let mut stats = inner.stats.get();
        stats.shown += 1;
        inner.stats.set(stats);

        Some(IndicatorGuard {
            manager: Rc::clone(inner),
            id,
            generation,
            released: false,
        })
    }

    /// Force-hides the indicator regardless of holders. No-op when there is
    /// nothing to hide.
    pub fn hide(&self, id: ContainerId) {
        let mut slots = self.inner.slots.borrow_mut();
        let Some(slot) = slots.get_mut(&id) else {
            return;
        };
        if slot.state == IndicatorState::Visible {
            self.inner.surface.set_indicator_visible(id, false);
            slot.state = IndicatorState::Hidden;
            slot.holders = 0;
        }
    }

    pub fn state(&self, id: ContainerId) -> IndicatorState {
        self.inner
            .slots
            .borrow()
            .get(&id)
            .map_or(IndicatorState::Absent, |slot| slot.state)
    }

    pub fn stats(&self) -> IndicatorStats {
        self.inner.stats.get()
    }
}

impl fmt::Debug for IndicatorManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorManager")
            .field("slots", &self.inner.slots.borrow())
            .field("stats", &self.inner.stats.get())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn release(&self, id: ContainerId, generation: u64, mode: Release) {
        let mut stats = self.stats.get();
        stats.released += 1;
        self.stats.set(stats);

        let mut slots = self.slots.borrow_mut();
        let Some(slot) = slots.get_mut(&id) else {
            return;
        };
        if slot.state != IndicatorState::Visible || slot.owner != generation {
            debug!(
                "Ignoring release of #{} from superseded generation {generation}",
                id.dom_id()
            );
            return;
        }

        slot.holders = slot.holders.saturating_sub(1);
        if slot.holders > 0 {
            return;
        }
        match mode {
            Release::Hide => {
                self.surface.set_indicator_visible(id, false);
                slot.state = IndicatorState::Hidden;
            }
            Release::Remove => {
                self.surface.detach_indicator(id);
                slot.state = IndicatorState::Absent;
            }
        }
    }
}

/// One holder's claim on a container's indicator. Released exactly once:
/// explicitly, or when dropped.
#[must_use = "dropping the guard releases the indicator immediately"]
pub struct IndicatorGuard {
    manager: Rc<Inner>,
    id: ContainerId,
    generation: u64,
    released: bool,
}

impl IndicatorGuard {
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Hides the indicator, keeping its node for the next `show`.
    pub fn release(mut self) {
        self.finish(Release::Hide);
    }

    /// Removes the indicator node entirely.
    pub fn remove(mut self) {
        self.finish(Release::Remove);
    }

    fn finish(&mut self, mode: Release) {
        if self.released {
            return;
        }
        self.released = true;
        self.manager.release(self.id, self.generation, mode);
    }
}

impl Drop for IndicatorGuard {
    fn drop(&mut self) {
        self.finish(Release::Hide);
    }
}

impl fmt::Debug for IndicatorGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndicatorGuard")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
