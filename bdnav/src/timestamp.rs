/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Translates playback positions into navigation timestamps.

use super::{
    engine::{NavigationEngine, PlaybackEngine, Property},
    info::{resolve_clip, ClipInfo, PlayerInfo, StateResult},
};

/// The navigation engine's clock rate.
pub const TICKS_PER_SECOND: u64 = 90_000;

/// Converts seconds of playback into navigation ticks.
///
/// Negative and non-finite values count as zero; partial ticks are dropped.
pub fn seconds_to_ticks(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * TICKS_PER_SECOND as f64) as u64
    } else {
        0
    }
}

pub fn ticks_to_seconds(ticks: u64) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}

/// Formats ticks as `h:mm:ss.mmm`.
pub fn format_ticks(ticks: u64) -> String {

    let millis = ticks / (TICKS_PER_SECOND / 1000);

    format!(
        "{}:{:02}:{:02}.{:03}",
        millis / 3_600_000,
        millis / 60_000 % 60,
        millis / 1000 % 60,
        millis % 1000,
    )
}

/// The clip's presentation timestamp after `seconds` of playing it.
pub fn nav_timestamp(clip: &ClipInfo, seconds: f64) -> u64 {
    clip.in_time + seconds_to_ticks(seconds)
}

/// The position on the playlist's timeline after `seconds` of playing `clip`.
pub fn title_timestamp(clip: &ClipInfo, seconds: f64) -> u64 {
    clip.start_time + seconds_to_ticks(seconds)
}

/// The playback engine's current position, or zero before anything has played.
pub fn playback_position<P>(playback: &P) -> f64 where
    P: PlaybackEngine + ?Sized,
{
    playback
        .get_property(Property::TimePos)
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0)
}

/// The navigation timestamp of whatever the playback engine is presenting right now.
pub fn current_nav_timestamp<N, P>(
    info: &PlayerInfo,
    nav: &N,
    playback: &P,
) -> StateResult<u64> where
    N: NavigationEngine + ?Sized,
    P: PlaybackEngine + ?Sized,
{
    let clip = resolve_clip(info, nav)?;
    Ok(nav_timestamp(&clip, playback_position(playback)))
}
