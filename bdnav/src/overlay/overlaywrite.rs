/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

use super::{
    CAPTURE_MAGIC,
    OverlayCommand,
    OverlayInstruction,
    OverlayPlane,
};
use std::io::{
    Error as IoError,
    Write,
};
use byteorder::{BigEndian, WriteBytesExt};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for overlay-writing operations.
pub type WriteResult<T> = Result<T, WriteError>;

/// The error type for [`WriteOverlayExt`].
#[derive(ThisError, Debug)]
pub enum WriteError {
    /// The instruction could not be written because of an underlying I/O error.
    #[error("overlay IO error")]
    IoError {
        /// The underlying I/O error.
        #[from]
        source: IoError,
    },
    /// The instruction has more runs than a capture can count.
    #[error("too many runs in overlay instruction")]
    TooManyRuns,
}

/// Allows writing overlay instructions to a destination.
pub trait WriteOverlayExt {
    /// Writes an overlay instruction to a destination.
    fn write_overlay(&mut self, instruction: &OverlayInstruction) -> WriteResult<()>;
}

impl<T> WriteOverlayExt for T where
    T: Write,
{

    fn write_overlay(&mut self, instruction: &OverlayInstruction) -> WriteResult<()> {

        if instruction.rle.len() > u32::MAX as usize {
            return Err(WriteError::TooManyRuns)
        }

        self.write_u16::<BigEndian>(CAPTURE_MAGIC)?;
        self.write_u64::<BigEndian>(instruction.pts)?;
        self.write_u8(
            match instruction.plane {
                OverlayPlane::Presentation => 0x00,
                OverlayPlane::Interactive => 0x01,
            }
        )?;
        self.write_u8(
            match instruction.command {
                OverlayCommand::Open => 0x00,
                OverlayCommand::Close => 0x01,
                OverlayCommand::Clear => 0x02,
                OverlayCommand::Draw => 0x03,
                OverlayCommand::Wipe => 0x04,
                OverlayCommand::Hide => 0x05,
                OverlayCommand::Flush => 0x06,
            }
        )?;
        self.write_u16::<BigEndian>(instruction.rect.x)?;
        self.write_u16::<BigEndian>(instruction.rect.y)?;
        self.write_u16::<BigEndian>(instruction.rect.width)?;
        self.write_u16::<BigEndian>(instruction.rect.height)?;

        match &instruction.palette {
            Some(palette) => {
                self.write_u8(0x80)?;
                for entry in palette.iter() {
                    self.write_u8(entry.y)?;
                    self.write_u8(entry.cr)?;
                    self.write_u8(entry.cb)?;
                    self.write_u8(entry.alpha)?;
                }
            }
            None => {
                self.write_u8(0x00)?;
            }
        }

        self.write_u32::<BigEndian>(instruction.rle.len() as u32)?;

        for run in instruction.rle.iter() {
            self.write_u16::<BigEndian>(run.len)?;
            self.write_u16::<BigEndian>(run.color)?;
        }

        Ok(())
    }
}
