use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use clap::Parser;
use clipsweeper_core::{CellCount, Coord};

mod config;
mod layout;
mod render;
mod replay;
mod script;

use config::{Preset, Settings};
use replay::Replayer;
use script::Script;

#[derive(Parser, Debug)]
#[command(version, about = "Replays scripted pointer input on a minesweeper board", long_about = None)]
struct Args {
    /// JSON script of ticks to replay
    script: PathBuf,

    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    #[arg(short, long, value_enum)]
    preset: Option<Preset>,

    #[arg(long)]
    width: Option<Coord>,

    #[arg(long)]
    height: Option<Coord>,

    #[arg(short, long)]
    mines: Option<CellCount>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<String>,

    /// Ticks a pointer has to stay down for a long press
    #[arg(long)]
    long_press: Option<u32>,

    #[arg(long)]
    ticks_per_second: Option<u32>,

    /// TOML file with game settings, flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also print the board every N ticks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    every: Option<u64>,
}

impl Args {
    fn settings(&self) -> anyhow::Result<Settings> {
        let flags = Settings {
            preset: self.preset,
            width: self.width,
            height: self.height,
            mines: self.mines,
            long_press_ticks: self.long_press,
            ticks_per_second: self.ticks_per_second,
            seed: self.seed.as_deref().map(config::parse_seed).transpose()?,
        };
        let file = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Ok(flags.or(file))
    }
}

fn random_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = args.settings()?.resolve()?;
    let seed = config.seed.unwrap_or_else(random_seed);
    log::debug!("seed: {seed:#x}");
    log::debug!("config: {config:?}");

    let script = Script::load(&args.script)?;
    log::info!(
        "Replaying {} ticks from {}",
        script.total_ticks(),
        args.script.display()
    );

    let mut replayer = Replayer::new(config, seed)?;
    let mut failure = None;
    for step in &script.steps {
        replayer.play(step, |replayer, _| {
            let Some(every) = args.every else {
                return;
            };
            let tick = replayer.ticks() as u64;
            if tick % every != 0 || failure.is_some() {
                return;
            }
            match render::render(replayer.sim()) {
                Ok(frame) => println!("tick {tick}\n{frame}"),
                Err(err) => failure = Some(err),
            }
        })?;
    }
    if let Some(err) = failure {
        return Err(err.context("rendering intermediate frame"));
    }

    let frame = render::render(replayer.sim()).context("rendering final frame")?;
    println!("final after {} ticks ({:?})", replayer.ticks(), replayer.sim().game().state());
    print!("{frame}");
    Ok(())
}
