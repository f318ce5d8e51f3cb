use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::{SmallVec, smallvec};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointerSource {
    Mouse,
    Touch(TouchId),
}

impl PointerSource {
    /// Which containment sample decides between release and release-outside.
    ///
    /// A lifted finger has no reliable position on the release tick, so touch
    /// looks at where it was on the previous tick.
    pub const fn release_gate(self) -> ReleaseGate {
        match self {
            Self::Mouse => ReleaseGate::Current,
            Self::Touch(_) => ReleaseGate::Previous,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReleaseGate {
    Current,
    Previous,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GestureKind {
    Press,
    LongPress,
    Release,
    ReleaseOutside,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub source: PointerSource,
}

/// Everything the recognizer knows about one pointer relative to one region.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerFacts {
    pub inside_now: bool,
    pub inside_prev: bool,
    /// Ticks held on the previous tick, 0 when it was up.
    pub prev_duration: u32,
    /// Ticks held including this one, 0 when up.
    pub duration: u32,
    pub just_pressed: bool,
    pub just_released: bool,
}

/// Stateless per-tick classification of pointer facts into gestures.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GestureRecognizer {
    long_press_ticks: u32,
}

impl GestureRecognizer {
    pub fn new(long_press_ticks: u32) -> Result<Self> {
        if long_press_ticks < 2 {
            return Err(GameError::LongPressTooShort(long_press_ticks));
        }
        Ok(Self { long_press_ticks })
    }

    pub const fn long_press_ticks(&self) -> u32 {
        self.long_press_ticks
    }

    /// At most one gesture fires per tick for a given region and pointer.
    pub fn evaluate(&self, source: PointerSource, facts: &PointerFacts) -> Option<GestureKind> {
        if facts.just_released {
            return Some(if Self::released_inside(source, facts) {
                GestureKind::Release
            } else {
                GestureKind::ReleaseOutside
            });
        }

        if !facts.inside_now {
            return None;
        }

        if facts.just_pressed {
            Some(GestureKind::Press)
        } else if facts.prev_duration < self.long_press_ticks
            && facts.duration >= self.long_press_ticks
        {
            Some(GestureKind::LongPress)
        } else {
            None
        }
    }

    /// Like [`Self::evaluate`], except that a touch pressed and lifted within one
    /// tick inside the region yields a press followed by its release.
    pub fn gestures(
        &self,
        source: PointerSource,
        facts: &PointerFacts,
    ) -> SmallVec<[GestureKind; 2]> {
        if facts.just_pressed && facts.just_released && Self::released_inside(source, facts) {
            return smallvec![GestureKind::Press, GestureKind::Release];
        }
        self.evaluate(source, facts).into_iter().collect()
    }

    fn released_inside(source: PointerSource, facts: &PointerFacts) -> bool {
        match source.release_gate() {
            ReleaseGate::Current => facts.inside_now,
            ReleaseGate::Previous => facts.inside_prev,
        }
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self {
            long_press_ticks: GameConfig::DEFAULT_TICKS_PER_SECOND / 2,
        }
    }
}

/// Where a pointer was and how long it had been held, as of the previous tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerHistory {
    pub position: Option<Point>,
    pub duration: u32,
}

/// One pointer's state for the current tick, before region containment is known.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PointerSnapshot {
    pub source: PointerSource,
    /// `None` for a touch lifted this tick.
    pub position: Option<Point>,
    pub prev_position: Option<Point>,
    pub prev_duration: u32,
    pub duration: u32,
    pub just_pressed: bool,
    pub just_released: bool,
}

impl PointerSnapshot {
    pub fn facts(&self, region: RegionId, hit_test: &dyn HitTest) -> PointerFacts {
        // a lifted touch is judged where it was last seen
        let now = self.position.or(self.prev_position);
        PointerFacts {
            inside_now: now.is_some_and(|point| hit_test.contains(region, point)),
            inside_prev: self
                .prev_position
                .is_some_and(|point| hit_test.contains(region, point)),
            prev_duration: self.prev_duration,
            duration: self.duration,
            just_pressed: self.just_pressed,
            just_released: self.just_released,
        }
    }
}

/// Remembers the previous tick of every pointer source.
#[derive(Clone, Debug, Default)]
pub struct PointerTracker {
    history: HashMap<PointerSource, PointerHistory>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self, source: PointerSource) -> PointerHistory {
        self.history.get(&source).copied().unwrap_or_default()
    }

    /// Builds the mouse snapshot, deriving transitions from the held duration.
    pub fn mouse(&self, sample: &MouseSample) -> PointerSnapshot {
        let prev = self.history(PointerSource::Mouse);
        PointerSnapshot {
            source: PointerSource::Mouse,
            position: Some(sample.position),
            prev_position: prev.position,
            prev_duration: prev.duration,
            duration: sample.press_duration,
            just_pressed: prev.duration == 0 && sample.press_duration > 0,
            just_released: prev.duration > 0 && sample.press_duration == 0,
        }
    }

    /// Builds a touch snapshot; transitions come from the touch session.
    pub fn touch(
        &self,
        id: TouchId,
        sample: Option<&TouchSample>,
        session: &TouchSession,
    ) -> PointerSnapshot {
        let source = PointerSource::Touch(id);
        let prev = self.history(source);
        let released = session.is_just_released(id);
        let position = sample.map(|sample| sample.position);
        PointerSnapshot {
            source,
            position: position.filter(|_| !released),
            // a touch with no history is judged where it was first seen
            prev_position: prev.position.or(position),
            prev_duration: prev.duration,
            duration: match (released, sample) {
                (true, _) | (false, None) => 0,
                (false, Some(sample)) => sample.press_duration.max(1),
            },
            just_pressed: session.is_just_pressed(id),
            just_released: released,
        }
    }

    /// Stores this tick's snapshots as history and forgets lifted touches.
    pub fn commit(&mut self, snapshots: &[PointerSnapshot]) {
        for snapshot in snapshots {
            match snapshot.source {
                PointerSource::Touch(_) if snapshot.just_released => {
                    self.history.remove(&snapshot.source);
                }
                source => {
                    self.history.insert(
                        source,
                        PointerHistory {
                            position: snapshot.position.or(snapshot.prev_position),
                            duration: snapshot.duration,
                        },
                    );
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}
