/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Converts overlay palette entries from limited-range YCbCr to RGBA.

#[cfg(test)]
mod tests;

use super::overlay::PaletteEntry;

/// Images at least this tall are treated as high definition.
pub const HD_HEIGHT_THRESHOLD: u16 = 600;

const LUMA_OFFSET: f64 = 16.0;
const LUMA_GAIN: f64 = 255.0 / 219.0;
const CHROMA_GAIN: f64 = 255.0 / 112.0;

/// Luma coefficients of the colour primaries used by a disc's video format.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coefficients {
    /// ITU-R BT.709, used by high-definition video.
    Bt709,
    /// ITU-R BT.601, used by standard-definition video.
    Bt601,
}

impl Coefficients {

    /// Picks the coefficient set for an image of the given height.
    pub fn for_height(height: u16) -> Self {
        if height >= HD_HEIGHT_THRESHOLD {
            Self::Bt709
        } else {
            Self::Bt601
        }
    }

    /// The (red, green, blue) luma weights.
    pub fn weights(self) -> (f64, f64, f64) {
        match self {
            Self::Bt709 => (0.2126, 0.7152, 0.0722),
            Self::Bt601 => (0.299, 0.587, 0.114),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Rgba {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Rgba {
    pub fn to_array(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

pub fn rgba_pixel(entry: &PaletteEntry, coefficients: Coefficients) -> Rgba {

    let (kr, kg, kb) = coefficients.weights();
    let y = LUMA_GAIN * (entry.y as f64 - LUMA_OFFSET);
    let cb = CHROMA_GAIN * (entry.cb as f64 - 128.0);
    let cr = CHROMA_GAIN * (entry.cr as f64 - 128.0);

    let red = y + cr * (1.0 - kr);
    let green = y - cb * (1.0 - kb) * kb / kg - cr * (1.0 - kr) * kr / kg;
    let blue = y + cb * (1.0 - kb);

    Rgba {
        red: channel(red),
        green: channel(green),
        blue: channel(blue),
        alpha: entry.alpha,
    }
}

// Truncates toward zero before clamping.
fn channel(value: f64) -> u8 {
    (value as i32).max(0).min(255) as u8
}
