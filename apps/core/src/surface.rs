use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::domain::{ContainerId, IndicatorSize};
use crate::error::HandleConflict;
use crate::render::PanelView;

/// The page the dashboard draws into. Containers are the only shared mutable
/// resource; every write goes through a [`PanelHandle`] or the indicator
/// manager.
pub trait Surface {
    fn contains(&self, id: ContainerId) -> bool;

    /// Creates the container's single indicator node and switches the
    /// container to overlay layout.
    fn attach_indicator(&self, id: ContainerId, size: IndicatorSize);

    fn set_indicator_visible(&self, id: ContainerId, visible: bool);

    fn detach_indicator(&self, id: ContainerId);

    /// Replaces the container's content subtree. An attached indicator
    /// survives the replacement.
    fn replace(&self, id: ContainerId, view: PanelView);

    fn set_event_options(&self, events: &[String], selected: Option<&str>);
}

/// Exclusive write access to one container.
pub struct PanelHandle {
    id: ContainerId,
    surface: Rc<dyn Surface>,
}

impl PanelHandle {
    pub const fn id(&self) -> ContainerId {
        self.id
    }

    /// Returns `false` without writing when the container is not on the page.
    pub fn write(&self, view: PanelView) -> bool {
        if !self.surface.contains(self.id) {
            debug!("Container #{} missing, dropping write", self.id.dom_id());
            return false;
        }
        self.surface.replace(self.id, view);
        true
    }
}

impl fmt::Debug for PanelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelHandle").field("id", &self.id).finish()
    }
}

/// Hands out at most one [`PanelHandle`] per container.
pub struct HandleRegistry {
    surface: Rc<dyn Surface>,
    claimed: BTreeSet<ContainerId>,
}

impl HandleRegistry {
    pub fn new(surface: Rc<dyn Surface>) -> Self {
        Self {
            surface,
            claimed: BTreeSet::new(),
        }
    }

    pub fn claim(&mut self, id: ContainerId) -> Result<PanelHandle, HandleConflict> {
        if !self.claimed.insert(id) {
            return Err(HandleConflict(id));
        }
        Ok(PanelHandle {
            id,
            surface: Rc::clone(&self.surface),
        })
    }

    /// All or nothing: on a conflict no container is claimed.
    pub fn claim_all(&mut self, ids: &[ContainerId]) -> Result<Vec<PanelHandle>, HandleConflict> {
        if let Some(taken) = ids.iter().find(|id| self.claimed.contains(*id)) {
            return Err(HandleConflict(*taken));
        }
        ids.iter().map(|id| self.claim(*id)).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerState {
    pub view: Option<PanelView>,
    pub indicator_nodes: usize,
    pub indicator_size: Option<IndicatorSize>,
    pub indicator_visible: bool,
    pub overlay_layout: bool,
    pub replacements: usize,
}

#[derive(Debug, Default)]
struct MemoryState {
    containers: BTreeMap<ContainerId, ContainerState>,
    events: Vec<String>,
    selected_event: Option<String>,
}

/// A surface kept entirely in memory. The terminal front end draws from it
/// and tests inspect it.
#[derive(Debug, Default)]
pub struct MemorySurface {
    state: RefCell<MemoryState>,
}

impl MemorySurface {
    /// A page with every container.
    pub fn new() -> Self {
        Self::with_containers(&ContainerId::ALL)
    }

    pub fn with_containers(ids: &[ContainerId]) -> Self {
        let containers = ids
            .iter()
            .map(|id| (*id, ContainerState::default()))
            .collect();
        Self {
            state: RefCell::new(MemoryState {
                containers,
                ..MemoryState::default()
            }),
        }
    }

    pub fn container(&self, id: ContainerId) -> Option<ContainerState> {
        self.state.borrow().containers.get(&id).cloned()
    }

    pub fn view(&self, id: ContainerId) -> Option<PanelView> {
        self.container(id).and_then(|state| state.view)
    }

    pub fn indicator_visible(&self, id: ContainerId) -> bool {
        self.container(id)
            .is_some_and(|state| state.indicator_nodes > 0 && state.indicator_visible)
    }

    pub fn busy_containers(&self) -> Vec<ContainerId> {
        self.state
            .borrow()
            .containers
            .iter()
            .filter(|(_, state)| state.indicator_nodes > 0 && state.indicator_visible)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn event_options(&self) -> Vec<String> {
        self.state.borrow().events.clone()
    }

    pub fn selected_event(&self) -> Option<String> {
        self.state.borrow().selected_event.clone()
    }

    pub fn snapshot(&self) -> BTreeMap<ContainerId, ContainerState> {
        self.state.borrow().containers.clone()
    }

    fn with_container(&self, id: ContainerId, update: impl FnOnce(&mut ContainerState)) {
        if let Some(state) = self.state.borrow_mut().containers.get_mut(&id) {
            update(state);
        }
    }
}

impl Surface for MemorySurface {
    fn contains(&self, id: ContainerId) -> bool {
        self.state.borrow().containers.contains_key(&id)
    }

    fn attach_indicator(&self, id: ContainerId, size: IndicatorSize) {
        self.with_container(id, |state| {
            state.indicator_nodes += 1;
            state.indicator_size = Some(size);
            state.indicator_visible = true;
            state.overlay_layout = true;
        });
    }

    fn set_indicator_visible(&self, id: ContainerId, visible: bool) {
        self.with_container(id, |state| {
            if state.indicator_nodes > 0 {
                state.indicator_visible = visible;
            }
        });
    }

    fn detach_indicator(&self, id: ContainerId) {
        self.with_container(id, |state| {
            state.indicator_nodes = state.indicator_nodes.saturating_sub(1);
            state.indicator_visible = false;
            if state.indicator_nodes == 0 {
                state.indicator_size = None;
            }
        });
    }

    fn replace(&self, id: ContainerId, view: PanelView) {
        self.with_container(id, |state| {
            state.view = Some(view);
            state.replacements += 1;
        });
    }

    fn set_event_options(&self, events: &[String], selected: Option<&str>) {
        let mut state = self.state.borrow_mut();
        state.events = events.to_vec();
        state.selected_event = selected.map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Notice;

    #[test]
    fn each_container_is_claimed_once() {
        let surface: Rc<dyn Surface> = Rc::new(MemorySurface::new());
        let mut registry = HandleRegistry::new(surface);

        assert!(registry.claim(ContainerId::Pitstops).is_ok());
        assert_eq!(
            registry.claim(ContainerId::Pitstops).map(|handle| handle.id()),
            Err(HandleConflict(ContainerId::Pitstops))
        );
        assert!(registry
            .claim_all(&[ContainerId::TrackStats, ContainerId::Pitstops])
            .is_err());
        assert!(registry.claim(ContainerId::TrackStats).is_ok());
    }

    #[test]
    fn write_to_missing_container_is_a_silent_no_op() {
        let memory = Rc::new(MemorySurface::with_containers(&[ContainerId::Results]));
        let mut registry = HandleRegistry::new(memory.clone());
        let Ok(handle) = registry.claim(ContainerId::Replay) else {
            panic!("replay handle should be free");
        };

        assert!(!handle.write(PanelView::Notice(Notice::new("hello"))));
        assert_eq!(memory.view(ContainerId::Replay), None);
    }

    #[test]
    fn replacing_content_keeps_the_indicator() {
        let memory = MemorySurface::new();
        memory.attach_indicator(ContainerId::Results, IndicatorSize::Normal);

        memory.replace(ContainerId::Results, PanelView::Html("<table></table>".to_string()));

        assert!(memory.indicator_visible(ContainerId::Results));
        assert_eq!(
            memory.container(ContainerId::Results).map(|state| state.replacements),
            Some(1)
        );
    }
}
