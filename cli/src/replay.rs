use std::collections::BTreeMap;

use anyhow::Context;
use chrono::{DateTime, TimeDelta, Utc};
use clipsweeper_core::{
    GameConfig, MouseSample, Simulation, TickInput, TickReport, TouchId, TouchSample,
};

use crate::layout::ClassicLayout;
use crate::script::{Step, TouchAction};

/// Turns scripted button and finger states into per-tick samples.
pub struct Replayer {
    sim: Simulation,
    layout: ClassicLayout,
    epoch: DateTime<Utc>,
    ticks: i64,
    mouse: MouseSample,
    touches: BTreeMap<u64, TouchSample>,
}

impl Replayer {
    pub fn new(config: GameConfig, seed: u64) -> anyhow::Result<Self> {
        let regions = Simulation::standard_regions(&config);
        let layout = ClassicLayout::new(&regions, &config)?;
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        let sim = Simulation::new(config, seed, epoch, regions, Box::new(layout.clone()))
            .context("wiring simulation")?;
        Ok(Self {
            sim,
            layout,
            epoch,
            ticks: 0,
            mouse: MouseSample::default(),
            touches: BTreeMap::new(),
        })
    }

    pub fn sim(&self) -> &Simulation {
        &self.sim
    }

    pub fn ticks(&self) -> i64 {
        self.ticks
    }

    /// Virtual time of the current tick.
    pub fn now(&self) -> DateTime<Utc> {
        let ticks_per_second = i64::from(self.sim.game().config().ticks_per_second);
        self.epoch + TimeDelta::nanoseconds(self.ticks * 1_000_000_000 / ticks_per_second)
    }

    /// Runs every repetition of `step`, calling `after_tick` once per tick.
    pub fn play(
        &mut self,
        step: &Step,
        mut after_tick: impl FnMut(&Self, &TickReport),
    ) -> anyhow::Result<()> {
        for repetition in 0..step.repeat {
            let input = self.input(step, repetition == 0);
            self.ticks += 1;
            let now = self.now();
            let report = self
                .sim
                .tick(&input, now)
                .with_context(|| format!("tick {}", self.ticks))?;
            for dispatched in report.interesting() {
                log::debug!(
                    "tick {}: {:?} {:?} on {:?}",
                    self.ticks,
                    dispatched.event.source,
                    dispatched.event.kind,
                    dispatched.target
                );
            }
            if report.restarted {
                log::info!("tick {}: game restarted", self.ticks);
            }
            after_tick(self, &report);
        }
        Ok(())
    }

    fn input(&mut self, step: &Step, first: bool) -> TickInput {
        if let Some(position) = step.mouse {
            self.mouse.position = position.resolve(&self.layout);
        }
        self.mouse.press_duration = if step.down {
            self.mouse.press_duration.saturating_add(1)
        } else {
            0
        };

        let mut pressed = Vec::new();
        let mut released = Vec::new();
        let mut tapped = Vec::new();
        if first {
            for action in &step.touches {
                match *action {
                    TouchAction::Down { id, at } => {
                        self.touches.insert(
                            id,
                            TouchSample {
                                id: TouchId(id),
                                position: at.resolve(&self.layout),
                                press_duration: 0,
                            },
                        );
                        pressed.push(TouchId(id));
                    }
                    TouchAction::Move { id, at } => match self.touches.get_mut(&id) {
                        Some(touch) => touch.position = at.resolve(&self.layout),
                        None => log::warn!("Move of touch {id} that is not down"),
                    },
                    TouchAction::Up { id } => {
                        let lifted = self.touches.remove(&id);
                        if let Some(sample) = lifted.filter(|_| pressed.contains(&TouchId(id))) {
                            tapped.push(sample);
                        }
                        released.push(TouchId(id));
                    }
                }
            }
        }
        for touch in self.touches.values_mut() {
            touch.press_duration = touch.press_duration.saturating_add(1);
        }

        TickInput {
            mouse: self.mouse,
            touches: self.touches.values().copied().chain(tapped).collect(),
            just_pressed_touches: pressed,
            just_released_touches: released,
        }
    }
}
