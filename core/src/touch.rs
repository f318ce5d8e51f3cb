use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Opaque platform touch identifier, only ever compared for equality.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TouchId(pub u64);

/// Touches currently down, and which of them changed during the current tick.
#[derive(Clone, Debug, Default)]
pub struct TouchSession {
    active: HashSet<TouchId>,
    just_pressed: HashSet<TouchId>,
    just_released: HashSet<TouchId>,
}

impl TouchSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new tick from the platform's transition lists.
    pub fn update(&mut self, pressed: &[TouchId], released: &[TouchId]) {
        self.just_pressed.clear();
        self.just_released.clear();

        for &id in pressed {
            self.just_pressed.insert(id);
            self.active.insert(id);
        }
        for &id in released {
            self.just_released.insert(id);
            if !self.active.remove(&id) {
                log::trace!("Release of unknown touch {:?}", id);
            }
        }
    }

    pub fn active(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.active.iter().copied()
    }

    pub fn is_active(&self, id: TouchId) -> bool {
        self.active.contains(&id)
    }

    pub fn is_just_pressed(&self, id: TouchId) -> bool {
        self.just_pressed.contains(&id)
    }

    pub fn is_just_released(&self, id: TouchId) -> bool {
        self.just_released.contains(&id)
    }

    /// Everything a recognizer has to look at this tick: touches still down plus
    /// the ones lifted during this tick, so their release can still be observed.
    pub fn tick_ids(&self) -> impl Iterator<Item = TouchId> + '_ {
        self.active
            .iter()
            .chain(self.just_released.difference(&self.active))
            .copied()
    }

    pub fn clear(&mut self) {
        self.active.clear();
        self.just_pressed.clear();
        self.just_released.clear();
    }
}
