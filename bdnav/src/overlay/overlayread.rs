/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    OverlayCommand,
    OverlayInstruction,
    OverlayPlane,
    Palette,
    PaletteEntry,
    PALETTE_SIZE,
    Rect,
    RleRun,
};
use std::io::{Error as IoError, Read};
use byteorder::{BigEndian, ReadBytesExt};
use thiserror::Error as ThisError;

/// Marks the start of every captured overlay instruction.
pub const CAPTURE_MAGIC: u16 = 0x4F56;

/// A specialized [`Result`](std::result::Result) type for overlay-reading operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// The error type for [`ReadOverlayExt`].
#[derive(ThisError, Debug)]
pub enum ReadError {
    #[error("overlay IO error")]
    IoError {
        #[from]
        source: IoError,
    },
    #[error("overlay capture has unrecognized magic number")]
    UnrecognizedMagicNumber,
    #[error("overlay instruction has unrecognized plane")]
    UnrecognizedPlane,
    #[error("overlay instruction has unrecognized command")]
    UnrecognizedCommand,
    #[error("overlay instruction has unrecognized palette flag")]
    UnrecognizedPaletteFlag,
}

/// Allows reading captured overlay instructions from a source.
pub trait ReadOverlayExt {
    /// Reads the next overlay instruction from a source.
    fn read_overlay(&mut self) -> ReadResult<OverlayInstruction>;
}

impl<T> ReadOverlayExt for T where
    T: Read,
{

    fn read_overlay(&mut self) -> ReadResult<OverlayInstruction> {

        if self.read_u16::<BigEndian>()? != CAPTURE_MAGIC {
            return Err(ReadError::UnrecognizedMagicNumber)
        }

        let pts = self.read_u64::<BigEndian>()?;
        let plane = match self.read_u8()? {
            0x00 => OverlayPlane::Presentation,
            0x01 => OverlayPlane::Interactive,
            _ => return Err(ReadError::UnrecognizedPlane),
        };
        let command = match self.read_u8()? {
            0x00 => OverlayCommand::Open,
            0x01 => OverlayCommand::Close,
            0x02 => OverlayCommand::Clear,
            0x03 => OverlayCommand::Draw,
            0x04 => OverlayCommand::Wipe,
            0x05 => OverlayCommand::Hide,
            0x06 => OverlayCommand::Flush,
            _ => return Err(ReadError::UnrecognizedCommand),
        };
        let rect = Rect {
            x: self.read_u16::<BigEndian>()?,
            y: self.read_u16::<BigEndian>()?,
            width: self.read_u16::<BigEndian>()?,
            height: self.read_u16::<BigEndian>()?,
        };
        let palette = match self.read_u8()? {
            0x00 => {
                None
            }
            0x80 => {
                Some(read_palette(self)?)
            }
            _ => {
                return Err(ReadError::UnrecognizedPaletteFlag)
            }
        };
        let count = self.read_u32::<BigEndian>()? as usize;
        let mut rle = Vec::new();

        for _ in 0..count {
            rle.push(
                RleRun {
                    len: self.read_u16::<BigEndian>()?,
                    color: self.read_u16::<BigEndian>()?,
                }
            );
        }

        Ok(
            OverlayInstruction {
                pts,
                plane,
                command,
                rect,
                palette,
                rle,
            }
        )
    }
}

fn read_palette<T: Read>(input: &mut T) -> ReadResult<Box<Palette>> {

    let mut palette = Box::new([PaletteEntry::default(); PALETTE_SIZE]);

    for entry in palette.iter_mut() {

        let y = input.read_u8()?;
        let cr = input.read_u8()?;
        let cb = input.read_u8()?;
        let alpha = input.read_u8()?;

        *entry = PaletteEntry { y, cr, cb, alpha };
    }

    Ok(palette)
}
