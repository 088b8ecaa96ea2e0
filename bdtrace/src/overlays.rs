/*
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * Copyright 2021 William Swartzendruber
 *
 * SPDX-License-Identifier: MPL-2.0
 */

use bdnav::{
    overlay::{
        Compositor,
        OverlayCommand,
        OverlayInstruction,
        ReadError,
        ReadOverlayExt,
    },
    timestamp::format_ticks,
};
use std::{
    fs::File,
    io::{stdin, BufReader, ErrorKind, Read},
};
use anyhow::{bail, Context, Result};
use tracing::{info, warn};

/// Prints every instruction of a capture along with what the compositor shows after each flush.
pub fn run(input_value: &str) -> Result<()> {

    let (mut stdin_read, mut file_read);
    let mut input = BufReader::<&mut dyn Read>::new(
        if input_value == "-" {
            stdin_read = stdin();
            &mut stdin_read
        } else {
            file_read = File::open(input_value)
                .with_context(|| format!("could not open {}", input_value))?;
            &mut file_read
        }
    );
    let mut compositor = Compositor::new();
    let mut count = 0;

    info!("iterating through overlay instructions");

    loop {

        let instruction = match input.read_overlay() {
            Ok(instruction) => instruction,
            Err(ReadError::IoError { source }) if source.kind() == ErrorKind::UnexpectedEof => {
                break
            }
            Err(err) => bail!("could not read overlay instruction {}: {}", count, err),
        };

        count += 1;
        print_instruction(&instruction);

        match compositor.apply(&instruction) {
            Ok(()) if instruction.command == OverlayCommand::Draw => {
                match drawn_size(&compositor, &instruction) {
                    Some((width, height)) => println!("  decoded = {}x{}", width, height),
                    None => println!("  not drawn: plane is closed"),
                }
            }
            Ok(()) => {
            }
            Err(err) => {
                warn!("dropping instruction {}: {}", count, err);
                println!("  decode error: {}", err);
            }
        }

        if instruction.command == OverlayCommand::Flush {
            println!("  visible regions = {}", compositor.regions().len());
            for region in compositor.regions() {
                println!(
                    "    {:?} {},{} {}x{}",
                    region.plane,
                    region.rect.x,
                    region.rect.y,
                    region.rect.width,
                    region.rect.height,
                );
            }
        }
    }

    info!("read {} overlay instructions", count);

    Ok(())
}

/// The size of the raster a draw left on its plane, if it was kept.
fn drawn_size(compositor: &Compositor, instruction: &OverlayInstruction) -> Option<(u16, u16)> {
    compositor
        .regions()
        .iter()
        .find(|region| region.plane == instruction.plane && region.rect == instruction.rect)
        .map(|region| (region.raster.width, region.raster.height))
}

fn print_instruction(instruction: &OverlayInstruction) {

    println!(
        "overlay({}) {:?} {:?}",
        format_ticks(instruction.pts),
        instruction.plane,
        instruction.command,
    );
    println!(
        "  rect = {},{} {}x{}",
        instruction.rect.x,
        instruction.rect.y,
        instruction.rect.width,
        instruction.rect.height,
    );

    if instruction.command == OverlayCommand::Draw {
        println!("  palette = {}", if instruction.palette.is_some() { "present" } else { "absent" });
        println!("  runs = [{}]", instruction.rle.len());
    }
}
