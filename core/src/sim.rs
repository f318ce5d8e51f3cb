use alloc::boxed::Box;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MouseSample {
    pub position: Point,
    /// Ticks the button has been held including this one, 0 when up.
    pub press_duration: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchSample {
    pub id: TouchId,
    pub position: Point,
    pub press_duration: u32,
}

/// Raw pointer state for one tick, as sampled by the platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    pub mouse: MouseSample,
    /// Touches currently down, plus any pressed and lifted within this tick.
    pub touches: Vec<TouchSample>,
    pub just_pressed_touches: Vec<TouchId>,
    pub just_released_touches: Vec<TouchId>,
}

impl TickInput {
    pub fn touch(&self, id: TouchId) -> Option<&TouchSample> {
        self.touches.iter().find(|sample| sample.id == id)
    }
}

/// A gesture that was routed to a bound region.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Dispatched {
    pub region: RegionId,
    pub target: Target,
    pub event: GestureEvent,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// In dispatch order.
    pub events: Vec<Dispatched>,
    pub restarted: bool,
}

impl TickReport {
    /// Skips the release-outside that every region not under a lifted pointer receives.
    pub fn interesting(&self) -> impl Iterator<Item = &Dispatched> + '_ {
        self.events
            .iter()
            .filter(|dispatched| dispatched.event.kind != GestureKind::ReleaseOutside)
    }
}

/// The whole tick loop: touches, gestures, dispatch, restart and display.
pub struct Simulation {
    game: Game,
    regions: RegionSet,
    table: DispatchTable<Game, Target>,
    /// Bound regions in registration order.
    bound: Vec<RegionId>,
    display: DisplayAdapter,
    touch: TouchSession,
    tracker: PointerTracker,
    recognizer: GestureRecognizer,
    hit_test: Box<dyn HitTest>,
}

impl Simulation {
    /// Declares the regions the display adapter expects, with their frame counts.
    pub fn standard_regions(config: &GameConfig) -> RegionSet {
        let mut regions = RegionSet::new();
        regions.add(DisplayAdapter::FACE, 1, FaceButton::FRAME_COUNT);
        regions.add(DisplayAdapter::MINES, 3, DIGIT_FRAME_COUNT);
        regions.add(DisplayAdapter::TIME, 3, DIGIT_FRAME_COUNT);
        regions.add(
            DisplayAdapter::TILES,
            usize::from(config.total_tiles()),
            TileIcon::FRAME_COUNT,
        );
        regions
    }

    /// Validates the configuration and wires every required region.
    pub fn new(
        config: GameConfig,
        seed: u64,
        now: DateTime<Utc>,
        regions: RegionSet,
        hit_test: Box<dyn HitTest>,
    ) -> Result<Self> {
        let game = Game::new(config, seed, now)?;
        let recognizer = GestureRecognizer::new(config.long_press_ticks)?;
        let display = DisplayAdapter::from_regions(&regions, &config)?;

        let mut table = DispatchTable::new();
        table.bind(display.face(), Target::Face, Game::FACE_HANDLERS);
        for (coords, id) in display.tile_regions() {
            table.bind(id, Target::Tile(coords), Game::TILE_HANDLERS);
        }
        let bound = regions.ids().filter(|&id| table.is_bound(id)).collect();

        log::debug!(
            "Simulation wired: {}x{} with {} mines, {} regions",
            config.width,
            config.height,
            config.mines,
            regions.len()
        );

        let mut sim = Self {
            game,
            regions,
            table,
            bound,
            display,
            touch: TouchSession::new(),
            tracker: PointerTracker::new(),
            recognizer,
            hit_test,
        };
        sim.refresh(now)?;
        Ok(sim)
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn display(&self) -> &DisplayAdapter {
        &self.display
    }

    pub fn touch_session(&self) -> &TouchSession {
        &self.touch
    }

    /// Frame shown by the `index`-th region called `name`.
    pub fn frame(&self, name: &str, index: usize) -> Result<usize> {
        let id = self
            .regions
            .lookup(name)?
            .get(index)
            .copied()
            .ok_or(GameError::UnknownRegionId)?;
        self.regions.frame(id)
    }

    /// Frames of every region called `name`, in repeat order.
    pub fn frames(&self, name: &str) -> Result<Vec<usize>> {
        self.regions
            .lookup(name)?
            .iter()
            .map(|&id| self.regions.frame(id))
            .collect()
    }

    /// Advances one tick. Every region sees the same pointer snapshot.
    pub fn tick(&mut self, input: &TickInput, now: DateTime<Utc>) -> Result<TickReport> {
        self.touch
            .update(&input.just_pressed_touches, &input.just_released_touches);
        let snapshots = self.snapshots(input);

        let mut events = Vec::new();
        for &region in &self.bound {
            let Some(target) = self.table.key(region) else {
                continue;
            };
            for snapshot in &snapshots {
                let facts = snapshot.facts(region, self.hit_test.as_ref());
                for kind in self.recognizer.gestures(snapshot.source, &facts) {
                    events.push(Dispatched {
                        region,
                        target,
                        event: GestureEvent {
                            kind,
                            source: snapshot.source,
                        },
                    });
                }
            }
        }

        self.game.set_clock(now);
        for dispatched in &events {
            if dispatched.event.kind != GestureKind::ReleaseOutside {
                log::trace!(
                    "{:?} {:?} on {:?}",
                    dispatched.event.source,
                    dispatched.event.kind,
                    dispatched.target
                );
            }
            self.table
                .dispatch(&mut self.game, dispatched.region, dispatched.event);
        }
        let restarted = self.game.apply_pending_restart();

        self.refresh(now)?;
        self.tracker.commit(&snapshots);
        Ok(TickReport { events, restarted })
    }

    /// Mouse first, then touches by id.
    fn snapshots(&self, input: &TickInput) -> Vec<PointerSnapshot> {
        let mut ids: Vec<TouchId> = self.touch.tick_ids().collect();
        ids.sort_unstable();

        let mut snapshots = Vec::with_capacity(ids.len() + 1);
        snapshots.push(self.tracker.mouse(&input.mouse));
        snapshots.extend(
            ids.into_iter()
                .map(|id| self.tracker.touch(id, input.touch(id), &self.touch)),
        );
        snapshots
    }

    fn refresh(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.display.refresh(&self.game, now, &mut self.regions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Region `n` covers the single point `(n, 0)`.
    struct Line;

    impl HitTest for Line {
        fn contains(&self, region: RegionId, point: Point) -> bool {
            point.y == 0 && region.0 as i32 == point.x
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    fn sim(config: GameConfig) -> Simulation {
        let regions = Simulation::standard_regions(&config);
        Simulation::new(config, 9, start(), regions, Box::new(Line)).unwrap()
    }

    #[test]
    fn missing_time_region_fails_startup() {
        let config = GameConfig::BEGINNER;
        let mut regions = RegionSet::new();
        regions.add(DisplayAdapter::FACE, 1, FaceButton::FRAME_COUNT);
        regions.add(DisplayAdapter::MINES, 3, DIGIT_FRAME_COUNT);
        regions.add(DisplayAdapter::TILES, 81, TileIcon::FRAME_COUNT);

        let err = Simulation::new(config, 0, start(), regions, Box::new(Line))
            .err()
            .unwrap();
        assert_eq!(err, GameError::UnknownRegion("time".into()));
    }

    #[test]
    fn wrong_tile_count_fails_startup() {
        let config = GameConfig::BEGINNER;
        let regions = Simulation::standard_regions(&GameConfig::INTERMEDIATE);
        let err = Simulation::new(config, 0, start(), regions, Box::new(Line))
            .err()
            .unwrap();
        assert!(matches!(err, GameError::RegionCountMismatch { .. }));
    }

    #[test]
    fn initial_frames_show_fresh_board() {
        let sim = sim(GameConfig::BEGINNER);
        assert_eq!(sim.frames(DisplayAdapter::MINES).unwrap(), [0, 1, 0]);
        assert_eq!(sim.frames(DisplayAdapter::TIME).unwrap(), [0, 0, 0]);
        assert_eq!(
            sim.frame(DisplayAdapter::FACE, 0).unwrap(),
            FaceButton::Playing.frame()
        );
        assert!(
            sim.frames(DisplayAdapter::TILES)
                .unwrap()
                .iter()
                .all(|&frame| frame == TileIcon::Closed.frame())
        );
    }

    #[test]
    fn face_click_restarts_at_tick_boundary() {
        let mut sim = sim(GameConfig::BEGINNER);
        // the face is region 0, at (0, 0) under `Line`
        let down = |duration| TickInput {
            mouse: MouseSample {
                position: Point::new(0, 0),
                press_duration: duration,
            },
            ..TickInput::default()
        };

        let report = sim.tick(&down(1), start()).unwrap();
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].event.kind, GestureKind::Press);
        assert_eq!(
            sim.frame(DisplayAdapter::FACE, 0).unwrap(),
            FaceButton::Pressed.frame()
        );

        let report = sim.tick(&down(0), start()).unwrap();
        assert!(report.restarted);
        assert_eq!(sim.game().state(), GameState::Waiting);
        assert_eq!(
            sim.frame(DisplayAdapter::FACE, 0).unwrap(),
            FaceButton::Playing.frame()
        );
    }
}
