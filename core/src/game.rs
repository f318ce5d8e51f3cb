use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Valid transitions:
/// - Waiting -> Playing
/// - Playing -> Won
/// - Playing -> Lost
/// - any -> Waiting (restart)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Fresh board, mines not placed yet
    #[default]
    Waiting,
    /// Mines placed and clock running
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Face button visual, in sprite frame order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceButton {
    Playing = 0,
    Evaluating = 1,
    Lost = 2,
    Won = 3,
    Pressed = 4,
}

impl FaceButton {
    pub const FRAME_COUNT: usize = 5;

    pub const fn frame(self) -> usize {
        self as usize
    }
}

/// What a hittable region is wired to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Face,
    Tile(Coord2),
}

/// A pointer that went down on a tile and has not been released yet.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Hold {
    source: PointerSource,
    coords: Coord2,
    /// A long press already acted on this hold, its release does nothing.
    consumed: bool,
}

/// Drives one board from the first reveal to a win or loss, and across restarts.
#[derive(Clone, Debug)]
pub struct Game {
    config: GameConfig,
    board: Board,
    state: GameState,
    seed: u64,
    now: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    holds: SmallVec<[Hold; 4]>,
    face_held_by: Option<PointerSource>,
    restart_requested: bool,
}

impl Game {
    pub const FACE_HANDLERS: Handlers<Game, Target> = Handlers {
        on_press: Some(Self::on_face_press),
        on_long_press: None,
        on_release: Some(Self::on_face_release),
        on_release_outside: Some(Self::on_face_release),
    };

    pub const TILE_HANDLERS: Handlers<Game, Target> = Handlers {
        on_press: Some(Self::on_tile_press),
        on_long_press: Some(Self::on_tile_long_press),
        on_release: Some(Self::on_tile_release),
        on_release_outside: Some(Self::on_tile_release_outside),
    };

    /// `seed` drives mine placement; it is advanced on every restart.
    pub fn new(config: GameConfig, seed: u64, now: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            board: Board::new(&config),
            config,
            state: GameState::Waiting,
            seed,
            now,
            started_at: None,
            ended_at: None,
            holds: SmallVec::new(),
            face_held_by: None,
            restart_requested: false,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Sets the time used by state transitions in this tick.
    pub fn set_clock(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn face(&self) -> FaceButton {
        if self.face_held_by.is_some() {
            return FaceButton::Pressed;
        }
        match self.state {
            GameState::Lost => FaceButton::Lost,
            GameState::Won => FaceButton::Won,
            _ if self.holds.iter().any(|hold| self.is_live(hold)) => FaceButton::Evaluating,
            _ => FaceButton::Playing,
        }
    }

    /// Whole seconds on the clock: 0 while waiting, frozen once the game ended.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        let Some(started_at) = self.started_at else {
            return 0;
        };
        let until = match self.state {
            GameState::Waiting => return 0,
            GameState::Playing => now,
            GameState::Won | GameState::Lost => self.ended_at.unwrap_or(now),
        };
        (until - started_at).num_seconds().max(0)
    }

    /// Mines not accounted for by flags, 0 once won since every mine is flagged then.
    pub fn mines_left(&self) -> i32 {
        match self.state {
            GameState::Won => 0,
            _ => self.board.remaining_flags(),
        }
    }

    /// Opens a tile, starting the game on the first successful reveal.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let tile = self.board.tile(coords)?;
        if self.state.is_final() || !tile.is_revealable() {
            return Ok(RevealOutcome::NoChange);
        }
        self.start(coords)?;
        let outcome = self.board.reveal(coords)?;
        self.apply(outcome);
        Ok(outcome)
    }

    pub fn chord(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.board.validate_coords(coords)?;
        if self.state != GameState::Playing {
            return Ok(RevealOutcome::NoChange);
        }
        let outcome = self.board.chord(coords)?;
        self.apply(outcome);
        Ok(outcome)
    }

    /// Flags or unflags a closed tile; does not start the clock.
    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.board.validate_coords(coords)?;
        if self.state.is_final() {
            return Ok(MarkOutcome::NoChange);
        }
        self.board.toggle_flag(coords)
    }

    /// Replaces the board with a fresh one and goes back to waiting.
    pub fn restart(&mut self) {
        log::debug!("Restarting game");
        self.board = Board::new(&self.config);
        self.state = GameState::Waiting;
        self.seed = self.seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        self.started_at = None;
        self.ended_at = None;
        self.holds.clear();
        self.face_held_by = None;
        self.restart_requested = false;
    }

    pub fn request_restart(&mut self) {
        self.restart_requested = true;
    }

    /// Applies a restart requested during this tick, returning whether it happened.
    pub fn apply_pending_restart(&mut self) -> bool {
        if self.restart_requested {
            self.restart();
            true
        } else {
            false
        }
    }

    fn start(&mut self, origin: Coord2) -> Result<()> {
        if self.state != GameState::Waiting {
            return Ok(());
        }
        let mut sampler = RandomSampler::new(self.seed);
        self.board
            .place_mines_avoiding(origin, self.config.mines, &mut sampler)?;
        self.started_at = Some(self.now);
        self.state = GameState::Playing;
        log::debug!("Game started at {:?}", self.now);
        Ok(())
    }

    fn apply(&mut self, outcome: RevealOutcome) {
        let next = match outcome {
            RevealOutcome::HitMine => GameState::Lost,
            RevealOutcome::Cleared => GameState::Won,
            RevealOutcome::NoChange | RevealOutcome::Revealed => return,
        };
        if self.state.is_final() {
            return;
        }
        self.state = next;
        self.ended_at = Some(self.now);
        self.board.clear_pressed();
        log::debug!("Game ended {:?} after {}s", next, self.elapsed_secs(self.now));
    }

    fn refresh_pressed(&mut self) {
        self.board.clear_pressed();
        if self.state.is_final() {
            return;
        }
        let live: SmallVec<[Coord2; 4]> = self
            .holds
            .iter()
            .filter(|hold| !hold.consumed && self.is_live(hold))
            .map(|hold| hold.coords)
            .collect();
        for coords in live {
            // coords come from bound regions, which are always on the board
            let _ = self.board.press(coords);
        }
    }

    /// Holds on flagged tiles only wait for a long press to unflag.
    fn is_live(&self, hold: &Hold) -> bool {
        !self.board.tile(hold.coords).is_ok_and(|tile| tile.flagged)
    }

    fn take_hold(&mut self, source: PointerSource) -> Option<Hold> {
        let index = self.holds.iter().position(|hold| hold.source == source)?;
        Some(self.holds.remove(index))
    }

    fn log_lookup<T>(result: Result<T>) {
        if let Err(err) = result {
            log::warn!("Gesture on unknown tile: {}", err);
        }
    }

    fn on_face_press(game: &mut Game, _target: Target, source: PointerSource) {
        game.face_held_by = Some(source);
    }

    fn on_face_release(game: &mut Game, _target: Target, source: PointerSource) {
        if game.face_held_by == Some(source) {
            game.face_held_by = None;
            game.request_restart();
        }
    }

    fn on_tile_press(game: &mut Game, target: Target, source: PointerSource) {
        let Target::Tile(coords) = target else {
            return;
        };
        if game.state.is_final() {
            return;
        }
        log::trace!("{:?} pressed tile {:?}", source, coords);
        game.take_hold(source);
        game.holds.push(Hold {
            source,
            coords,
            consumed: false,
        });
        game.refresh_pressed();
    }

    fn on_tile_long_press(game: &mut Game, target: Target, source: PointerSource) {
        let Target::Tile(coords) = target else {
            return;
        };
        if game.state.is_final() {
            return;
        }
        let Some(hold) = game
            .holds
            .iter_mut()
            .find(|hold| hold.source == source && hold.coords == coords && !hold.consumed)
        else {
            return;
        };
        hold.consumed = true;
        log::trace!("{:?} long pressed tile {:?}", source, coords);

        match game.board.tile(coords) {
            Ok(tile) if tile.open => Self::log_lookup(game.chord(coords)),
            Ok(_) => Self::log_lookup(game.toggle_flag(coords)),
            Err(err) => log::warn!("Gesture on unknown tile: {}", err),
        }
        game.refresh_pressed();
    }

    fn on_tile_release(game: &mut Game, target: Target, source: PointerSource) {
        let Target::Tile(coords) = target else {
            return;
        };
        let Some(hold) = game.take_hold(source) else {
            return;
        };
        if hold.coords == coords && !hold.consumed && !game.state.is_final() {
            log::trace!("{:?} released tile {:?}", source, coords);
            match game.board.tile(coords) {
                Ok(tile) if tile.open => Self::log_lookup(game.chord(coords)),
                Ok(_) => Self::log_lookup(game.reveal(coords)),
                Err(err) => log::warn!("Gesture on unknown tile: {}", err),
            }
        }
        game.refresh_pressed();
    }

    fn on_tile_release_outside(game: &mut Game, target: Target, source: PointerSource) {
        let Target::Tile(coords) = target else {
            return;
        };
        if game
            .holds
            .iter()
            .any(|hold| hold.source == source && hold.coords == coords)
        {
            game.take_hold(source);
            game.refresh_pressed();
        }
    }
}
