use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use clipsweeper_core::{CellCount, Coord, GameConfig};
use serde::Deserialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Preset {
    pub fn config(self) -> GameConfig {
        match self {
            Self::Beginner => GameConfig::BEGINNER,
            Self::Intermediate => GameConfig::INTERMEDIATE,
            Self::Expert => GameConfig::EXPERT,
        }
    }
}

/// Game settings that may come from the command line or a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub preset: Option<Preset>,
    pub width: Option<Coord>,
    pub height: Option<Coord>,
    pub mines: Option<CellCount>,
    pub long_press_ticks: Option<u32>,
    pub ticks_per_second: Option<u32>,
    pub seed: Option<u64>,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Fields set here win over `base`.
    pub fn or(self, base: Settings) -> Settings {
        Settings {
            preset: self.preset.or(base.preset),
            width: self.width.or(base.width),
            height: self.height.or(base.height),
            mines: self.mines.or(base.mines),
            long_press_ticks: self.long_press_ticks.or(base.long_press_ticks),
            ticks_per_second: self.ticks_per_second.or(base.ticks_per_second),
            seed: self.seed.or(base.seed),
        }
    }

    /// Starts from the preset and applies every explicit field.
    pub fn resolve(&self) -> anyhow::Result<GameConfig> {
        let mut config = self.preset.unwrap_or_default().config();
        if let Some(ticks_per_second) = self.ticks_per_second {
            config = config.with_ticks_per_second(ticks_per_second);
        }
        config.width = self.width.unwrap_or(config.width);
        config.height = self.height.unwrap_or(config.height);
        config.mines = self.mines.unwrap_or(config.mines);
        config.long_press_ticks = self.long_press_ticks.unwrap_or(config.long_press_ticks);
        config.seed = self.seed;
        config.validate().context("invalid game configuration")?;
        Ok(config)
    }
}

/// Decimal or `0x`-prefixed hexadecimal.
pub fn parse_seed(raw: &str) -> anyhow::Result<u64> {
    let trimmed = raw.trim();
    let value = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    value.with_context(|| format!("invalid seed {raw:?}"))
}
