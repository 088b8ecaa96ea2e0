/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Drains the navigation engine's event queue.
//!
//! The pump never waits for new events; it consumes whatever is already queued, records each
//! event into the [`PlayerInfo`] table, pushes stream selections to the playback engine, and
//! tells the caller what has to happen next. Deciding whether to reload playback is left to the
//! caller.


use super::{
    engine::{NavigationEngine, PlaybackEngine, Property, PropertyValue},
    event::{NavEvent, NavEventKind, UO_MENU_CALL},
    info::PlayerInfo,
};
use tracing::{debug, info, warn};

/// What a drain of the event queue means for playback.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PumpOutcome {
    /// Nothing requires a reload.
    Idle,
    /// A new playable position (angle, title, playlist, play item, mark or chapter) has been
    /// selected.
    PositionChanged,
    /// The current playlist was stopped. Draining stopped at that event.
    PlaylistStopped,
}

impl Default for PumpOutcome {
    fn default() -> Self { Self::Idle }
}

/// A change to what the host should offer the user.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Capability {
    /// Whether the disc menu may be called.
    Menu(bool),
    /// Whether a pop-up menu is available.
    Popup(bool),
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PumpReport {
    pub outcome: PumpOutcome,
    /// Capability changes in the order they were reported.
    pub capabilities: Vec<Capability>,
    /// Number of events consumed.
    pub events: usize,
    /// The first error, read-error or encrypted event consumed.
    pub error: Option<NavEventKind>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DrainReport {
    pub bytes: u64,
    /// Whether the navigation engine reported the end of the title.
    pub reached_end: bool,
    /// Whether a new playable position was selected while reading.
    pub position_changed: bool,
    pub capabilities: Vec<Capability>,
    /// The first error, read-error or encrypted event raised while reading.
    pub error: Option<NavEventKind>,
}

/// Subtitle selection that outlives individual events.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct StreamSelection {
    /// The last subtitle stream the navigation engine selected.
    pub subtitle: u32,
}

/// Drains every queued event.
///
/// Stops at an empty queue, at an error event, or right after a playlist stop.
pub fn pump<N, P>(
    nav: &mut N,
    playback: &mut P,
    info: &mut PlayerInfo,
    streams: &mut StreamSelection,
) -> PumpReport where
    N: NavigationEngine + ?Sized,
    P: PlaybackEngine + ?Sized,
{

    let mut report = PumpReport::default();

    loop {

        let event = nav.next_event();

        if event.kind == NavEventKind::None {
            break
        }

        report.events += 1;
        apply_event(event, playback, info, streams, &mut report.capabilities);

        if event.kind.is_error() && report.error.is_none() {
            report.error = Some(event.kind);
        }
        if event.kind.selects_position() && report.outcome == PumpOutcome::Idle {
            report.outcome = PumpOutcome::PositionChanged;
        }
        if event.kind == NavEventKind::PlaylistStop {
            report.outcome = PumpOutcome::PlaylistStopped;
            break
        }
        if event.kind == NavEventKind::Error {
            break
        }
    }

    report
}

/// Reads the current title to its end, applying every event raised on the way.
///
/// At most `limit` single-byte reads are attempted.
pub fn drain_to_end_of_title<N, P>(
    nav: &mut N,
    playback: &mut P,
    info: &mut PlayerInfo,
    streams: &mut StreamSelection,
    limit: usize,
) -> DrainReport where
    N: NavigationEngine + ?Sized,
    P: PlaybackEngine + ?Sized,
{

    let mut report = DrainReport::default();
    let mut buf = [0u8; 1];
    let last_byte = nav.title_size().saturating_sub(1);

    if let Err(err) = nav.seek(last_byte) {
        warn!("could not seek to the end of the title: {}", err);
    }

    for _ in 0..limit {
        match nav.read(&mut buf) {
            Ok((bytes, event)) => {
                report.bytes += bytes as u64;
                match event.kind {
                    NavEventKind::EndOfTitle => {
                        report.reached_end = true;
                        break
                    }
                    NavEventKind::None => {
                    }
                    _ => {
                        apply_event(event, playback, info, streams, &mut report.capabilities);
                        if event.kind.selects_position() {
                            report.position_changed = true;
                        }
                        if event.kind.is_error() {
                            report.error = Some(event.kind);
                            break
                        }
                    }
                }
            }
            Err(err) => {
                debug!("title read stopped: {}", err);
                break
            }
        }
    }

    if !report.reached_end {
        warn!("end of title not reached after {} bytes", report.bytes);
    }

    info!("read {} bytes to the end of the title", report.bytes);

    report
}

fn apply_event<P>(
    event: NavEvent,
    playback: &mut P,
    info: &mut PlayerInfo,
    streams: &mut StreamSelection,
    capabilities: &mut Vec<Capability>,
) where
    P: PlaybackEngine + ?Sized,
{

    let param = event.param;

    match event.kind {
        NavEventKind::Error | NavEventKind::ReadError | NavEventKind::Encrypted => {
            warn!("navigation {:?}: {}", event.kind, param);
        }
        NavEventKind::UoMaskChanged => {
            debug!("UoMaskChanged: 0x{:04x}", param);
            capabilities.push(Capability::Menu(param & UO_MENU_CALL == 0));
        }
        NavEventKind::Popup => {
            debug!("Popup: {}", param);
            capabilities.push(Capability::Popup(param != 0));
        }
        NavEventKind::KeyInterestTable => {
            debug!("KeyInterestTable: 0x{:04x}", param);
        }
        NavEventKind::Playlist => {
            debug!("Playlist: {:05}.mpls", param);
        }
        NavEventKind::PgTextst => {
            debug!("PgTextst: {}", param);
            let sid = if param != 0 { streams.subtitle } else { 0 };
            set_property(playback, Property::Sid, sid);
        }
        NavEventKind::PgTextstStream => {
            debug!("PgTextstStream: {}", param);
            streams.subtitle = param;
            if info.flag(NavEventKind::PgTextst) {
                set_property(playback, Property::Sid, param);
            }
        }
        NavEventKind::AudioStream => {
            debug!("AudioStream: {}", param);
            set_property(playback, Property::Aid, param);
        }
        kind => {
            debug!("{:?}: {}", kind, param);
        }
    }

    info.record(event);
}

fn set_property<P>(playback: &mut P, property: Property, value: u32) where
    P: PlaybackEngine + ?Sized,
{
    if let Err(err) = playback.set_property(property, PropertyValue::Int(value as i64)) {
        warn!("could not set {}: {}", property, err);
    }
}
