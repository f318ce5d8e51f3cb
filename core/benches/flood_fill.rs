use chrono::{TimeZone, Utc};
use clipsweeper_core::*;
use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn open_board(config: &GameConfig) -> Board {
    let mut board = Board::new(config);
    // a single mine in the corner leaves one huge zero region
    let corner = (config.width - 1, config.height - 1);
    let mut sampler = ScriptedSampler::new([corner]);
    board
        .place_mines_avoiding((0, 0), config.mines, &mut sampler)
        .unwrap();
    board
}

fn criterion_benchmark(c: &mut Criterion) {
    let wide = GameConfig {
        width: 250,
        height: 250,
        mines: 1,
        ..GameConfig::default()
    };
    c.bench_function("flood_fill_250x250", |b| {
        b.iter_batched(
            || open_board(&wide),
            |mut board| black_box(board.reveal((0, 0)).unwrap()),
            BatchSize::LargeInput,
        )
    });

    let expert = GameConfig::EXPERT;
    c.bench_function("place_and_reveal_expert", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            let mut board = Board::new(&expert);
            board
                .place_mines_avoiding((15, 8), expert.mines, &mut RandomSampler::new(seed))
                .unwrap();
            black_box(board.reveal((15, 8)).unwrap())
        })
    });

    let now = Utc.timestamp_opt(0, 0).unwrap();
    c.bench_function("idle_tick_expert", |b| {
        struct Nothing;
        impl HitTest for Nothing {
            fn contains(&self, _: RegionId, _: Point) -> bool {
                false
            }
        }
        let regions = Simulation::standard_regions(&expert);
        let mut sim = Simulation::new(expert, 7, now, regions, Box::new(Nothing)).unwrap();
        let input = TickInput::default();
        b.iter(|| black_box(sim.tick(&input, now).unwrap()))
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = criterion_benchmark
}
criterion_main!(benches);
