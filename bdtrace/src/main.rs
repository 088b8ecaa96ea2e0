/*
 * This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a
 * copy of the MPL was not distributed with this file, You can obtain one at
 * https://mozilla.org/MPL/2.0/.
 *
 * Copyright 2021 William Swartzendruber
 *
 * SPDX-License-Identifier: MPL-2.0
 */

mod overlays;
mod scenario;

use anyhow::Result;
use clap::{
    app_from_crate,
    crate_authors,
    crate_description,
    crate_name,
    crate_version,
    AppSettings,
    Arg,
    SubCommand,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bdnav=info,bdtrace=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = app_from_crate!()
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(SubCommand::with_name("overlays")
            .about("Dumps a capture of overlay instructions")
            .arg(Arg::with_name("input")
                .index(1)
                .value_name("INPUT-FILE")
                .help("Overlay capture file; use - for STDIN")
                .required(true)
            )
        )
        .subcommand(SubCommand::with_name("session")
            .about("Replays a scripted navigation session against simulated engines")
            .arg(Arg::with_name("scenario")
                .index(1)
                .value_name("SCENARIO-FILE")
                .help("TOML scenario file")
                .required(true)
            )
            .arg(Arg::with_name("no-skip-first-play")
                .long("no-skip-first-play")
                .help("Plays the disc's first-play title instead of skipping it")
            )
        )
        .after_help("This utility traces what a Blu-ray navigation adapter does.\n\n\
            Copyright © 2021 William Swartzendruber\n\
            Licensed under the Mozilla Public License 2.0")
        .get_matches();

    match matches.subcommand() {
        ("overlays", Some(overlays_matches)) => {
            overlays::run(overlays_matches.value_of("input").unwrap_or("-"))
        }
        ("session", Some(session_matches)) => {
            scenario::run(
                session_matches.value_of("scenario").unwrap_or("-"),
                session_matches.is_present("no-skip-first-play"),
            )
        }
        _ => Ok(()),
    }
}
