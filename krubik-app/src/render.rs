//! Terminal rendering of the cube net and of solution playback.
use krubik_model::{CubeState, Face};
use owo_colors::OwoColorize;

use crate::i18n::{Language, Text};
use crate::playback::PlaybackSnapshot;

/// How output is decorated.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Style {
    Plain,
    /// 24-bit ANSI colors.
    Color,
}

/// Display color of each face, as RGB.
pub fn face_rgb(face: Face) -> (u8, u8, u8) {
    match face {
        Face::U => (0xf8, 0xfa, 0xfc),
        Face::R => (0xef, 0x44, 0x44),
        Face::F => (0x22, 0xc5, 0x5e),
        Face::D => (0xf9, 0x73, 0x16),
        Face::L => (0xfa, 0xcc, 0x15),
        Face::B => (0x3b, 0x82, 0xf6),
    }
}

fn cell(color: Face, style: Style) -> String {
    match style {
        Style::Plain => color.letter().to_string(),
        Style::Color => {
            let (r, g, b) = face_rgb(color);
            color
                .letter()
                .truecolor(0x11, 0x18, 0x27)
                .on_truecolor(r, g, b)
                .to_string()
        }
    }
}

fn face_row(state: &CubeState, face: Face, row: usize, style: Style) -> String {
    state.face(face)[row * 3..row * 3 + 3]
        .iter()
        .map(|&color| cell(color, style))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unfolded net: U on top, then L F R B side by side, then D.
pub fn render_net(state: &CubeState, style: Style) -> String {
    const INDENT: &str = "       ";
    let mut lines = Vec::with_capacity(9);
    for row in 0..3 {
        lines.push(format!("{}{}", INDENT, face_row(state, Face::U, row, style)));
    }
    for row in 0..3 {
        lines.push(
            [Face::L, Face::F, Face::R, Face::B]
                .iter()
                .map(|&face| face_row(state, face, row, style))
                .collect::<Vec<_>>()
                .join("  "),
        );
    }
    for row in 0..3 {
        lines.push(format!("{}{}", INDENT, face_row(state, Face::D, row, style)));
    }
    with_newlines(lines)
}

/// Numbered move list with the active move marked.
pub fn render_moves(snapshot: &PlaybackSnapshot, language: Language, style: Style) -> String {
    if snapshot.is_empty() {
        return with_newlines(vec![language.text(Text::AlreadySolved).to_string()]);
    }
    let mut lines = Vec::with_capacity(snapshot.len() + 1);
    lines.push(format!(
        "{} ({} / {})",
        language.text(Text::SolutionHeading),
        snapshot.index + 1,
        snapshot.len()
    ));
    for (i, step) in snapshot.moves.iter().enumerate() {
        let line = format!("{:>3}. {}", i + 1, step);
        lines.push(match (i == snapshot.index, style) {
            (true, Style::Plain) => format!("> {}", line),
            (true, Style::Color) => format!("> {}", line.bold()),
            (false, _) => format!("  {}", line),
        });
    }
    with_newlines(lines)
}

/// Join lines, ending every one of them with a newline.
fn with_newlines(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}
