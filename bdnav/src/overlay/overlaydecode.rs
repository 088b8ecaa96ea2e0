/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    OverlayInstruction,
    Palette,
    PALETTE_SIZE,
    RleRun,
    super::ycbcr::{rgba_pixel, Coefficients, Rgba},
};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for overlay decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// The error type for [`decode`].
///
/// A failed decode produces no raster at all.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The runs do not cover the rectangle exactly.
    #[error("run lengths total {actual} pixels but the rectangle holds {expected}")]
    RunLengthMismatch {
        expected: usize,
        actual: usize,
    },
    /// A run references a color index past the end of the palette.
    #[error("run references color index {0}, which is outside of the palette")]
    ColorOutOfRange(u16),
    /// A draw instruction arrived without a palette.
    #[error("draw instruction has no palette")]
    MissingPalette,
}

/// An indexed-color image with its palette already converted to RGBA.
#[derive(Clone, Debug, Hash, PartialEq)]
pub struct Raster {
    pub width: u16,
    pub height: u16,
    /// One palette index per pixel, row by row.
    pub indices: Vec<u8>,
    pub colors: [Rgba; PALETTE_SIZE],
}

impl Raster {

    pub fn pixel_count(&self) -> usize {
        self.indices.len()
    }

    /// The color of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u16, y: u16) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None
        }
        let index = self.indices[y as usize * self.width as usize + x as usize];
        Some(self.colors[index as usize])
    }

    /// Expands the image into packed 8-bit RGBA.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.indices
            .iter()
            .flat_map(|index| self.colors[*index as usize].to_array())
            .collect()
    }
}

/// Decodes a draw instruction into a raster.
pub fn decode(instruction: &OverlayInstruction) -> DecodeResult<Raster> {

    let palette = instruction.palette.as_deref().ok_or(DecodeError::MissingPalette)?;

    decode_runs(
        instruction.rect.width,
        instruction.rect.height,
        palette,
        &instruction.rle,
    )
}

/// Decodes a run-length image of `width` by `height` pixels against `palette`.
pub fn decode_runs(
    width: u16,
    height: u16,
    palette: &Palette,
    runs: &[RleRun],
) -> DecodeResult<Raster> {

    let expected = width as usize * height as usize;
    let actual = runs.iter().map(|run| run.len as usize).sum::<usize>();

    if actual != expected {
        return Err(DecodeError::RunLengthMismatch { expected, actual })
    }

    let mut indices = Vec::with_capacity(expected);

    for run in runs.iter() {
        if run.color as usize >= PALETTE_SIZE {
            return Err(DecodeError::ColorOutOfRange(run.color))
        }
        indices.extend(std::iter::repeat(run.color as u8).take(run.len as usize));
    }

    Ok(
        Raster {
            width,
            height,
            indices,
            colors: convert_palette(palette, Coefficients::for_height(height)),
        }
    )
}

/// Converts every palette entry to RGBA with the given coefficients.
pub fn convert_palette(palette: &Palette, coefficients: Coefficients) -> [Rgba; PALETTE_SIZE] {

    let mut colors = [Rgba::default(); PALETTE_SIZE];

    for (color, entry) in colors.iter_mut().zip(palette.iter()) {
        *color = rgba_pixel(entry, coefficients);
    }

    colors
}
