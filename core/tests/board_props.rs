//! Placement and flood-fill invariants over generated board shapes.

use clipsweeper_core::*;
use proptest::prelude::*;

fn config(width: Coord, height: Coord, mines: CellCount) -> GameConfig {
    GameConfig {
        width,
        height,
        mines,
        ..GameConfig::default()
    }
}

/// Board shape, mine count below the tile count, and an origin on the board.
fn layout() -> impl Strategy<Value = (GameConfig, Coord2, u64)> {
    (1..=30u8, 1..=24u8)
        .prop_filter("needs room for a mine", |(w, h)| mult(*w, *h) >= 2)
        .prop_flat_map(|(w, h)| {
            let total = mult(w, h);
            (
                Just(w),
                Just(h),
                1..total,
                (0..w, 0..h),
                any::<u64>(),
            )
        })
        .prop_map(|(w, h, mines, origin, seed)| (config(w, h, mines), origin, seed))
}

fn placed_board(config: &GameConfig, origin: Coord2, seed: u64) -> Board {
    let mut board = Board::new(config);
    board
        .place_mines_avoiding(origin, config.mines, &mut RandomSampler::new(seed))
        .unwrap();
    board
}

proptest! {
    #[test]
    fn placement_avoids_origin_and_counts_exactly((config, origin, seed) in layout()) {
        let board = placed_board(&config, origin, seed);

        let mines = board.iter().filter(|(_, tile)| tile.mine).count();
        prop_assert_eq!(mines, usize::from(config.mines));
        prop_assert!(!board.tile(origin).unwrap().mine);
        prop_assert_eq!(board.closed_safe(), config.total_tiles() - config.mines);
        prop_assert_eq!(board.remaining_flags(), i32::from(config.mines));

        for (coords, tile) in board.iter() {
            let expected = board
                .neighbors(coords)
                .filter(|&pos| board.tile(pos).unwrap().mine)
                .count();
            prop_assert_eq!(usize::from(tile.adjacent), expected, "at {:?}", coords);
        }
    }

    #[test]
    fn reveal_opens_whole_zero_region((config, origin, seed) in layout()) {
        let mut board = placed_board(&config, origin, seed);
        let outcome = board.reveal(origin).unwrap();
        prop_assert_ne!(outcome, RevealOutcome::HitMine);

        let closed_safe = board
            .iter()
            .filter(|(_, tile)| tile.is_closed_safe())
            .count();
        prop_assert_eq!(usize::from(board.closed_safe()), closed_safe);
        prop_assert_eq!(outcome == RevealOutcome::Cleared, closed_safe == 0);

        for (coords, tile) in board.iter() {
            prop_assert!(!(tile.open && tile.mine));
            if tile.open && tile.adjacent == 0 {
                for pos in board.neighbors(coords) {
                    prop_assert!(board.tile(pos).unwrap().open, "{:?} next to {:?}", pos, coords);
                }
            }
        }
    }

    #[test]
    fn revealing_flagged_tile_changes_nothing((config, origin, seed) in layout()) {
        let mut board = placed_board(&config, origin, seed);
        board.toggle_flag(origin).unwrap();
        let before = board.clone();

        prop_assert_eq!(board.reveal(origin).unwrap(), RevealOutcome::NoChange);
        prop_assert_eq!(board, before);
    }

    #[test]
    fn chord_only_fires_when_flags_match(
        (config, origin, seed) in layout(),
        extra_flags in 0..3usize,
    ) {
        let mut board = placed_board(&config, origin, seed);
        board.reveal(origin).unwrap();

        let Some((numbered, tile)) = board.iter().find(|(_, tile)| tile.is_numbered()) else {
            return Ok(());
        };
        let mut flagged = 0u8;
        for pos in board.neighbors(numbered) {
            if board.tile(pos).unwrap().mine {
                board.toggle_flag(pos).unwrap();
                flagged += 1;
            }
        }
        let spare: Vec<_> = board
            .neighbors(numbered)
            .filter(|&pos| {
                let tile = board.tile(pos).unwrap();
                !tile.open && !tile.flagged
            })
            .take(extra_flags)
            .collect();
        for &pos in &spare {
            board.toggle_flag(pos).unwrap();
            flagged += 1;
        }
        prop_assert_eq!(board.count_flagged_neighbors(numbered), flagged);

        let before = board.clone();
        let outcome = board.chord(numbered).unwrap();
        if flagged == tile.adjacent {
            prop_assert_ne!(outcome, RevealOutcome::HitMine);
            for pos in board.neighbors(numbered) {
                let tile = board.tile(pos).unwrap();
                prop_assert!(tile.open || tile.flagged);
            }
        } else {
            prop_assert_eq!(outcome, RevealOutcome::NoChange);
            prop_assert_eq!(board, before);
        }
    }
}

#[test]
fn beginner_center_reveal_keeps_count_consistent() {
    let config = GameConfig::BEGINNER;
    for seed in 0..200 {
        let mut board = placed_board(&config, (4, 4), seed);
        board.reveal((4, 4)).unwrap();
        let closed_safe = board.iter().filter(|(_, tile)| tile.is_closed_safe()).count();
        assert_eq!(usize::from(board.closed_safe()), closed_safe, "seed {seed}");
        assert!(board.closed_safe() <= 71);
    }
}
