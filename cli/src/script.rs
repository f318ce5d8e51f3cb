use std::path::Path;

use anyhow::Context;
use clipsweeper_core::{Coord2, Point};
use serde::Deserialize;

use crate::layout::ClassicLayout;

/// A named spot of the classic layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Face,
    /// Well away from every region.
    Outside,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Anchor(Anchor),
    /// Center of a board tile.
    Tile { tile: Coord2 },
    Point { x: i32, y: i32 },
}

impl Position {
    pub fn resolve(self, layout: &ClassicLayout) -> Point {
        match self {
            Self::Anchor(Anchor::Face) => layout.face().center(),
            Self::Anchor(Anchor::Outside) => Point::new(-1000, -1000),
            Self::Tile { tile } => layout.tile(tile).center(),
            Self::Point { x, y } => Point::new(x, y),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum TouchAction {
    Down { id: u64, at: Position },
    Move { id: u64, at: Position },
    Up { id: u64 },
}

/// One scripted tick, optionally repeated.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Step {
    /// Mouse position; it stays put when absent.
    pub mouse: Option<Position>,
    /// Whether the button is held during this tick.
    pub down: bool,
    /// Applied on the first repetition only.
    pub touches: Vec<TouchAction>,
    pub repeat: u32,
}

impl Default for Step {
    fn default() -> Self {
        Self {
            mouse: None,
            down: false,
            touches: Vec::new(),
            repeat: 1,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading script {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing script {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn total_ticks(&self) -> u64 {
        self.steps.iter().map(|step| u64::from(step.repeat)).sum()
    }
}
