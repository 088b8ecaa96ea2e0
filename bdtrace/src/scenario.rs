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
    engine::{Property, PropertyValue},
    event::NavEvent,
    input::{InputEvent, Key, Surface},
    session::PlaybackEvent,
    sim::{Reaction, RecordingPlayback, SimulatedDisc, SimulatedNavigation},
    HostEvent,
    Session,
    SessionConfig,
};
use std::{
    fs,
    io::{stdin, Read},
    path::PathBuf,
    process,
};
use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use serde::Deserialize;
use tracing::info;

/// A scripted session: a simulated disc, how its navigation engine reacts, and what the host
/// does.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Disc root. A scratch directory with a disc marker is used when absent.
    pub disc_dir: Option<PathBuf>,
    pub session: SessionConfig,
    pub disc: SimulatedDisc,
    pub reactions: Vec<Reaction>,
    pub steps: Vec<Step>,
}

/// One thing the host or the playback engine does.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    /// The playback engine reports an event.
    Playback(PlaybackEvent),
    /// The playback engine reaches a position and reports it.
    Position(f64),
    /// The playback engine starts presenting video of this size.
    Video {
        width: u32,
        height: u32,
    },
    Key(Key),
    /// A pointer press, or a double-click when `activate` is set, on the host's surface.
    Pointer {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
        #[serde(default)]
        activate: bool,
    },
    /// The navigation engine raises events on its own.
    Navigation(Vec<NavEvent>),
}

impl Step {
    fn notification(&self) -> Option<InputEvent> {
        match *self {
            Step::Key(key) => Some(InputEvent::Key(key)),
            Step::Pointer { x, y, width, height, activate } => {
                let surface = Surface { width, height };
                if activate {
                    Some(InputEvent::PointerActivate { x, y, surface })
                } else {
                    Some(InputEvent::PointerPress { x, y, surface })
                }
            }
            _ => None,
        }
    }
}

pub fn run(scenario_value: &str, no_skip_first_play: bool) -> Result<()> {

    let text = if scenario_value == "-" {
        let mut text = String::new();
        stdin().read_to_string(&mut text).context("could not read scenario from STDIN")?;
        text
    } else {
        fs::read_to_string(scenario_value)
            .with_context(|| format!("could not read scenario {}", scenario_value))?
    };
    let mut scenario: Scenario = toml::from_str(&text)
        .with_context(|| format!("could not parse scenario {}", scenario_value))?;

    if no_skip_first_play {
        scenario.session.skip_first_play = false;
    }

    let disc_dir = match scenario.disc_dir.take() {
        Some(dir) => dir,
        None => scratch_disc(&scenario.session)?,
    };
    let mut session = Session::new(
        SimulatedNavigation::new(scenario.disc).with_reactions(scenario.reactions),
        RecordingPlayback::new(),
        scenario.session,
    );
    let host = session.host_events();
    let dispatcher = session.dispatcher();

    println!("open {}", disc_dir.display());
    session.open_disc(&disc_dir).with_context(|| format!("could not open {}", disc_dir.display()))?;
    print_output(&mut session, &host);

    for (index, step) in scenario.steps.iter().enumerate() {

        println!("step {}: {:?}", index + 1, step);

        match step {
            Step::Playback(event) => {
                dispatcher.playback(*event);
            }
            Step::Position(seconds) => {
                session.playback_mut().update(Property::TimePos, PropertyValue::Double(*seconds));
                dispatcher.playback(PlaybackEvent::PositionChanged(*seconds));
            }
            Step::Video { width, height } => {
                session.playback_mut().update(Property::Width, PropertyValue::Int(*width as i64));
                session.playback_mut().update(Property::Height, PropertyValue::Int(*height as i64));
            }
            Step::Navigation(events) => {
                session.navigation_mut().push_events(events.iter().copied());
            }
            Step::Key(_) | Step::Pointer { .. } => {
                if let Some(event) = step.notification() {
                    dispatcher.input(event);
                }
            }
        }

        session.run_pending().with_context(|| format!("step {} failed", index + 1))?;
        print_output(&mut session, &host);
    }

    info!("scenario finished after {} steps", scenario.steps.len());

    Ok(())
}

/// Creates an empty directory that passes the disc marker check.
fn scratch_disc(config: &SessionConfig) -> Result<PathBuf> {

    let dir = std::env::temp_dir().join(format!("bdtrace-{}", process::id()));
    let marker = dir.join(&config.marker_dir);

    fs::create_dir_all(&marker)
        .with_context(|| format!("could not create {}", marker.display()))?;

    Ok(dir)
}

fn print_output(
    session: &mut Session<SimulatedNavigation, RecordingPlayback>,
    host: &Receiver<HostEvent>,
) {
    for command in session.playback_mut().take_commands() {
        println!("  > {}", command);
    }
    for event in host.try_iter() {
        println!("  < {:?}", event);
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use bdnav::{event::NavEventKind, session::EndReason, sim::Trigger};

    #[test]
    fn test_parses_scenario() {

        let scenario: Scenario = toml::from_str(r#"
            [session]
            skip_first_play = false

            [disc]
            first_play_supported = true

            [[disc.playlists]]
            playlist = 1
            chapters = [0, 900000]
            clips = [{ clip_id = "00001", in_time = 0, out_time = 1800000 }]

            [[reactions]]
            on = "play"
            events = [{ kind = "title", param = 1 }, { kind = "playlist", param = 1 }]

            [[reactions]]
            on = "user-input"
            key = "enter"
            events = [{ kind = "chapter", param = 2 }]

            [[steps]]
            key = "activate"

            [[steps]]
            playback = "file-loaded"

            [[steps]]
            playback = { end-file = "eof" }

            [[steps]]
            position = 2.5

            [[steps]]
            pointer = { x = 10.0, y = 20.0, width = 960, height = 540 }

            [[steps]]
            navigation = [{ kind = "menu", param = 1 }]
        "#).unwrap();

        assert!(!scenario.session.skip_first_play);
        assert_eq!(scenario.session.max_stop_restarts, 8);
        assert!(scenario.disc.first_play_supported);
        assert!(scenario.disc.bluray_detected);
        assert_eq!(scenario.disc.playlists[0].clips[0].out_time, 1_800_000);
        assert_eq!(scenario.reactions[0].on, Trigger::Play);
        assert_eq!(scenario.reactions[1].events[0], NavEvent::new(NavEventKind::Chapter, 2));
        assert_eq!(scenario.steps.len(), 6);
        assert!(matches!(scenario.steps[0], Step::Key(Key::Activate)));
        assert!(matches!(scenario.steps[1], Step::Playback(PlaybackEvent::FileLoaded)));
        assert!(matches!(
            scenario.steps[2],
            Step::Playback(PlaybackEvent::EndFile(EndReason::Eof)),
        ));
        assert_eq!(
            scenario.steps[4].notification(),
            Some(InputEvent::PointerPress {
                x: 10.0,
                y: 20.0,
                surface: Surface { width: 960, height: 540 },
            }),
        );
        assert_eq!(scenario.steps[5].notification(), None);
    }
}
