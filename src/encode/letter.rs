//! 5x7 letter bitmaps and the letter-recognition preset.
//!
//! A bitmap flattens row by row into 35 inputs, `1.0` for ink and `0.0`
//! for background. The built-in glyphs are the lowercase letters most often
//! mirrored or swapped by dyslexic readers.

use image::{imageops::FilterType, GrayImage};
use rand::Rng;

use crate::classify::classifier::Classifier;
use crate::error::{NetError, Result};
use crate::network::{network::Network, spec::NetworkSpec};
use crate::train::example::TrainingExample;

pub const GRID_COLS: usize = 5;
pub const GRID_ROWS: usize = 7;
pub const BITMAP_LEN: usize = GRID_COLS * GRID_ROWS;

/// Letters with a built-in glyph, in output-unit order.
pub const GLYPH_LETTERS: [char; 10] = ['b', 'd', 'p', 'q', 'm', 'n', 'u', 'w', 's', 'z'];

/// Grayscale cells darker than this (after downsampling) count as ink.
const INK_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterBitmap {
    cells: [bool; BITMAP_LEN],
}

impl LetterBitmap {
    /// Parses seven rows of five characters. `#`, `X` and `1` are ink;
    /// `.`, space and `0` are background.
    pub fn from_rows(rows: &[&str]) -> Result<LetterBitmap> {
        if rows.len() != GRID_ROWS {
            return Err(NetError::Configuration(format!(
                "bitmap has {} rows, expected {GRID_ROWS}", rows.len()
            )));
        }
        let mut cells = [false; BITMAP_LEN];
        for (r, row) in rows.iter().enumerate() {
            let chars: Vec<char> = row.chars().collect();
            if chars.len() != GRID_COLS {
                return Err(NetError::Configuration(format!(
                    "bitmap row {r} has {} cells, expected {GRID_COLS}", chars.len()
                )));
            }
            for (c, ch) in chars.into_iter().enumerate() {
                cells[r * GRID_COLS + c] = match ch {
                    '#' | 'X' | '1' => true,
                    '.' | ' ' | '0' => false,
                    other => {
                        return Err(NetError::Configuration(format!(
                            "unexpected bitmap character {other:?} at row {r}, column {c}"
                        )))
                    }
                };
            }
        }
        Ok(LetterBitmap { cells })
    }

    /// Downsamples a grayscale image to the 5x7 grid. Dark pixels are ink.
    pub fn from_luma(img: &GrayImage) -> LetterBitmap {
        let small = image::imageops::resize(img, GRID_COLS as u32, GRID_ROWS as u32, FilterType::Triangle);
        let mut cells = [false; BITMAP_LEN];
        for (cell, p) in cells.iter_mut().zip(small.pixels()) {
            *cell = 1.0 - p.0[0] as f64 / 255.0 >= INK_THRESHOLD;
        }
        LetterBitmap { cells }
    }

    /// Decodes PNG/JPEG/BMP/GIF bytes and downsamples them with [`LetterBitmap::from_luma`].
    pub fn from_image_bytes(bytes: &[u8]) -> Result<LetterBitmap> {
        let img = image::load_from_memory(bytes)?;
        Ok(LetterBitmap::from_luma(&img.to_luma8()))
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * GRID_COLS + col]
    }

    pub fn ink(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }

    pub fn to_input(&self) -> Vec<f64> {
        self.cells.iter().map(|&c| if c { 1.0 } else { 0.0 }).collect()
    }

    /// Copy with `flips` distinct cells inverted.
    pub fn with_noise<R: Rng + ?Sized>(&self, flips: usize, rng: &mut R) -> LetterBitmap {
        let mut noisy = self.clone();
        for idx in rand::seq::index::sample(rng, BITMAP_LEN, flips.min(BITMAP_LEN)) {
            noisy.cells[idx] = !noisy.cells[idx];
        }
        noisy
    }
}

impl std::fmt::Display for LetterBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(GRID_COLS) {
            let line: String = row.iter().map(|&c| if c { '#' } else { '.' }).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn glyph_rows(letter: char) -> Option<[&'static str; GRID_ROWS]> {
    let rows = match letter {
        'b' => ["#....", "#....", "####.", "#...#", "#...#", "#...#", "####."],
        'd' => ["....#", "....#", ".####", "#...#", "#...#", "#...#", ".####"],
        'p' => [".....", "####.", "#...#", "#...#", "####.", "#....", "#...."],
        'q' => [".....", ".####", "#...#", "#...#", ".####", "....#", "....#"],
        'm' => [".....", ".....", "##.#.", "#.#.#", "#.#.#", "#.#.#", "#.#.#"],
        'n' => [".....", ".....", "####.", "#...#", "#...#", "#...#", "#...#"],
        'u' => [".....", ".....", "#...#", "#...#", "#...#", "#...#", ".####"],
        'w' => [".....", ".....", "#...#", "#...#", "#.#.#", "#.#.#", ".#.#."],
        's' => [".....", ".....", ".####", "#....", ".###.", "....#", "####."],
        'z' => [".....", ".....", "#####", "...#.", "..#..", ".#...", "#####"],
        _ => return None,
    };
    Some(rows)
}

/// Built-in bitmap for `letter`, if there is one.
pub fn glyph(letter: char) -> Option<LetterBitmap> {
    glyph_rows(letter.to_ascii_lowercase()).and_then(|rows| LetterBitmap::from_rows(&rows).ok())
}

pub fn letter_labels() -> Vec<String> {
    GLYPH_LETTERS.iter().map(|c| c.to_string()).collect()
}

/// 35 inputs, one sigmoid output per built-in glyph.
pub fn letter_spec(hidden_size: usize) -> NetworkSpec {
    NetworkSpec::new(BITMAP_LEN, hidden_size, GLYPH_LETTERS.len())
}

/// Every clean glyph plus `noisy_copies` variants of each with `flips`
/// inverted cells.
pub fn letter_training_set<R: Rng + ?Sized>(noisy_copies: usize, flips: usize, rng: &mut R) -> Vec<TrainingExample> {
    let mut examples = Vec::with_capacity(GLYPH_LETTERS.len() * (noisy_copies + 1));
    for (class, letter) in GLYPH_LETTERS.iter().enumerate() {
        let Some(clean) = glyph(*letter) else { continue };
        examples.push(TrainingExample::one_hot(clean.to_input(), class, GLYPH_LETTERS.len()));
        for _ in 0..noisy_copies {
            let noisy = clean.with_noise(flips, rng);
            examples.push(TrainingExample::one_hot(noisy.to_input(), class, GLYPH_LETTERS.len()));
        }
    }
    examples
}

pub fn letter_classifier(network: Network) -> Result<Classifier> {
    Classifier::new(network, letter_labels())
}
