/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Operates on the navigation engine's overlay graphics.
//!
//! # Overview
//!
//! Menu buttons and subtitles reach the screen as overlay instructions. Each instruction
//! targets one of two graphics planes and carries a command:
//!
//! 1. Open: the plane is (re)initialized and may be drawn on.
//! 2. Draw: an indexed-color image is placed at a rectangle of the plane.
//! 3. Wipe: a rectangle of the plane is cleared.
//! 4. Flush: everything drawn so far is ready to be shown.
//! 5. Hide: the plane is empty and may be hidden.
//! 6. Clear: every image on the plane is discarded.
//! 7. Close: like Clear, and nothing more may be drawn until the next Open.
//!
//! ## Images
//!
//! A drawn image is a 256-entry palette of limited-range YCbCr values with a transparency
//! value each, plus a run-length encoded sequence of palette indices. Expanding the runs row
//! by row, left to right, must fill the rectangle exactly. See [`decode`].
//!
//! ## Captures
//!
//! Instructions can be written to and read back from any byte stream with
//! [`WriteOverlayExt`] and [`ReadOverlayExt`], which is how overlay traffic is recorded for
//! later inspection.


mod compositor;
mod overlaydecode;
mod overlayread;
mod overlaywrite;

pub use compositor::*;
pub use overlaydecode::*;
pub use overlayread::*;
pub use overlaywrite::*;

/// The number of entries in an overlay palette.
pub const PALETTE_SIZE: usize = 256;

/// A complete overlay palette, indexed by color index.
pub type Palette = [PaletteEntry; PALETTE_SIZE];

/// The graphics plane an overlay instruction targets.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OverlayPlane {
    /// Presentation graphics, typically subtitles.
    Presentation,
    /// Interactive graphics, typically menus.
    Interactive,
}

impl Default for OverlayPlane {
    fn default() -> Self { Self::Presentation }
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum OverlayCommand {
    Open,
    Close,
    Clear,
    Draw,
    Wipe,
    Hide,
    Flush,
}

impl Default for OverlayCommand {
    fn default() -> Self { Self::Draw }
}

/// A rectangle in navigation space.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.x as u32 + other.width as u32 <= self.x as u32 + self.width as u32
            && other.y as u32 + other.height as u32 <= self.y as u32 + self.height as u32
    }
}

/// One palette entry as delivered by the navigation engine.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct PaletteEntry {
    pub y: u8,
    pub cr: u8,
    pub cb: u8,
    /// Transparency, where zero is fully transparent.
    pub alpha: u8,
}

/// A run of identical palette indices.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct RleRun {
    pub len: u16,
    pub color: u16,
}

/// A single overlay instruction from the navigation engine.
#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct OverlayInstruction {
    /// Presentation timestamp in navigation ticks.
    pub pts: u64,
    pub plane: OverlayPlane,
    pub command: OverlayCommand,
    pub rect: Rect,
    /// Only present on draw instructions.
    pub palette: Option<Box<Palette>>,
    /// Only present on draw instructions.
    pub rle: Vec<RleRun>,
}
