use alloc::string::{String, ToString};
use alloc::vec::Vec;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::*;

/// Stable handle of a hittable region, assigned in registration order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u32);

/// Containment test supplied by the presentation layer, which owns the geometry.
pub trait HitTest {
    fn contains(&self, region: RegionId, point: Point) -> bool;
}

/// A region that can show one of `frame_count` frames.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    /// Position among the regions sharing `name`.
    pub index: usize,
    pub frame_count: usize,
    frame: usize,
}

impl Region {
    pub fn frame(&self) -> usize {
        self.frame
    }
}

/// Named regions as declared by the scene, repeated names grouped in order.
#[derive(Clone, Debug, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
    by_name: HashMap<String, Vec<RegionId>>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `count` regions called `name`, all starting on frame 0.
    pub fn add(&mut self, name: &str, count: usize, frame_count: usize) -> &[RegionId] {
        let ids = self.by_name.entry(name.to_string()).or_default();
        for _ in 0..count {
            let id = RegionId(self.regions.len() as u32);
            self.regions.push(Region {
                name: name.to_string(),
                index: ids.len(),
                frame_count,
                frame: 0,
            });
            ids.push(id);
        }
        ids
    }

    pub fn lookup(&self, name: &str) -> Result<&[RegionId]> {
        self.by_name
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| GameError::UnknownRegion(name.to_string()))
    }

    /// Looks up `name` and checks it has exactly `expected` entries.
    pub fn lookup_exact(&self, name: &str, expected: usize) -> Result<&[RegionId]> {
        let ids = self.lookup(name)?;
        if ids.len() != expected {
            return Err(GameError::RegionCountMismatch {
                name: name.to_string(),
                expected,
                actual: ids.len(),
            });
        }
        Ok(ids)
    }

    pub fn get(&self, id: RegionId) -> Result<&Region> {
        self.regions
            .get(id.0 as usize)
            .ok_or(GameError::UnknownRegionId)
    }

    pub fn frame(&self, id: RegionId) -> Result<usize> {
        self.get(id).map(Region::frame)
    }

    pub fn goto_frame(&mut self, id: RegionId, frame: usize) -> Result<()> {
        let region = self
            .regions
            .get_mut(id.0 as usize)
            .ok_or(GameError::UnknownRegionId)?;
        if frame >= region.frame_count {
            return Err(GameError::FrameOutOfRange {
                frame,
                count: region.frame_count,
            });
        }
        region.frame = frame;
        Ok(())
    }

    pub fn ids(&self) -> impl Iterator<Item = RegionId> + '_ {
        (0..self.regions.len() as u32).map(RegionId)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

pub type Handler<T, K> = fn(&mut T, K, PointerSource);

/// The four event subscriptions of a region; empty slots ignore the gesture.
pub struct Handlers<T, K> {
    pub on_press: Option<Handler<T, K>>,
    pub on_long_press: Option<Handler<T, K>>,
    pub on_release: Option<Handler<T, K>>,
    pub on_release_outside: Option<Handler<T, K>>,
}

impl<T, K> Handlers<T, K> {
    pub const fn none() -> Self {
        Self {
            on_press: None,
            on_long_press: None,
            on_release: None,
            on_release_outside: None,
        }
    }

    pub fn slot(&self, kind: GestureKind) -> Option<Handler<T, K>> {
        match kind {
            GestureKind::Press => self.on_press,
            GestureKind::LongPress => self.on_long_press,
            GestureKind::Release => self.on_release,
            GestureKind::ReleaseOutside => self.on_release_outside,
        }
    }
}

// derives would require `T: Clone`, fn pointers are always `Copy`
impl<T, K> Clone for Handlers<T, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, K> Copy for Handlers<T, K> {}

struct Binding<T, K> {
    key: K,
    handlers: Handlers<T, K>,
}

/// Routes gestures on a region to the handlers bound to it.
pub struct DispatchTable<T, K> {
    bindings: HashMap<RegionId, Binding<T, K>>,
}

impl<T, K: Copy> DispatchTable<T, K> {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, region: RegionId, key: K, handlers: Handlers<T, K>) {
        self.bindings.insert(region, Binding { key, handlers });
    }

    pub fn key(&self, region: RegionId) -> Option<K> {
        self.bindings.get(&region).map(|binding| binding.key)
    }

    pub fn is_bound(&self, region: RegionId) -> bool {
        self.bindings.contains_key(&region)
    }

    /// Calls the matching handler, returning whether one was subscribed.
    pub fn dispatch(&self, target: &mut T, region: RegionId, event: GestureEvent) -> bool {
        let Some(binding) = self.bindings.get(&region) else {
            return false;
        };
        match binding.handlers.slot(event.kind) {
            Some(handler) => {
                handler(target, binding.key, event.source);
                true
            }
            None => false,
        }
    }
}

impl<T, K: Copy> Default for DispatchTable<T, K> {
    fn default() -> Self {
        Self::new()
    }
}
