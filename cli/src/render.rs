use std::fmt::Write;

use clipsweeper_core::{DIGIT_MINUS, DisplayAdapter, FaceButton, Simulation, TileIcon};

fn digit_glyph(frame: usize) -> char {
    match frame {
        DIGIT_MINUS => '-',
        _ => char::from_digit(frame as u32, 10).unwrap_or('?'),
    }
}

fn face_glyph(frame: usize) -> &'static str {
    const FACES: [(FaceButton, &str); 5] = [
        (FaceButton::Playing, ":)"),
        (FaceButton::Evaluating, ":o"),
        (FaceButton::Lost, "x("),
        (FaceButton::Won, "B)"),
        (FaceButton::Pressed, "[]"),
    ];
    FACES
        .iter()
        .find(|(face, _)| face.frame() == frame)
        .map_or("??", |(_, glyph)| glyph)
}

fn tile_glyph(frame: usize) -> char {
    match frame {
        0 => '.',
        1..=8 => char::from_digit(frame as u32, 10).unwrap_or('?'),
        _ if frame == TileIcon::Closed.frame() => '#',
        _ if frame == TileIcon::Opened.frame() => '.',
        _ if frame == TileIcon::Mine.frame() => '*',
        _ if frame == TileIcon::Flag.frame() => 'F',
        _ if frame == TileIcon::WrongFlag.frame() => 'X',
        _ if frame == TileIcon::Exploded.frame() => '@',
        _ => '?',
    }
}

/// Counters and face on the first line, then one line per board row.
pub fn render(sim: &Simulation) -> anyhow::Result<String> {
    let width = usize::from(sim.game().config().width);
    let counter = |name: &str| -> anyhow::Result<String> {
        Ok(sim.frames(name)?.into_iter().map(digit_glyph).collect())
    };

    let mut out = String::new();
    writeln!(
        out,
        "{} {} {}",
        counter(DisplayAdapter::MINES)?,
        face_glyph(sim.frame(DisplayAdapter::FACE, 0)?),
        counter(DisplayAdapter::TIME)?
    )?;
    for row in sim.frames(DisplayAdapter::TILES)?.chunks(width) {
        let line: String = row.iter().copied().map(tile_glyph).collect();
        writeln!(out, "{line}")?;
    }
    Ok(out)
}
