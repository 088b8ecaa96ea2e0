/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Where playback currently is on the disc.
//!
//! [`PlayerInfo`] records the last parameter seen for every navigation event kind. It is the
//! only source of "current playlist", "current play item", "current chapter" and so on. The
//! clip and playlist descriptions are derived from it on demand and never cached, because any
//! navigation event may invalidate them.

use super::{
    engine::NavigationEngine,
    event::{NavEvent, NavEventKind},
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for position lookups.
pub type StateResult<T> = Result<T, StateError>;

/// The error type for lookups against the navigation state.
///
/// None of these mean the disc is broken. They mean the navigation engine has not yet reported
/// enough to know where playback is, and the caller should treat the disc as not yet
/// navigable.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum StateError {
    /// The given event kind has never been observed since the disc was opened.
    #[error("position unknown: no {0:?} event observed")]
    PositionUnknown(NavEventKind),
    /// The navigation engine has no description for the current playlist.
    #[error("playlist {playlist} (angle {angle}) is not known to the navigation engine")]
    MissingPlaylist {
        playlist: u32,
        angle: u32,
    },
    /// The current play item does not index a clip of the current playlist.
    #[error("play item {play_item} is out of range for a playlist of {clips} clips")]
    ClipOutOfRange {
        play_item: u32,
        clips: usize,
    },
    /// No disc is open.
    #[error("no disc is open")]
    NoDisc,
}

/// Last observed parameter per navigation event kind.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerInfo {
    slots: [Option<u32>; NavEventKind::COUNT],
}

impl Default for PlayerInfo {
    fn default() -> Self {
        Self { slots: [None; NavEventKind::COUNT] }
    }
}

impl PlayerInfo {

    pub fn new() -> Self {
        Self::default()
    }

    /// The last parameter seen for `kind`, or `None` if it was never observed.
    pub fn get(&self, kind: NavEventKind) -> Option<u32> {
        self.slots[kind as usize]
    }

    /// Like [`get`](Self::get), but an unobserved kind is a [`StateError::PositionUnknown`].
    pub fn require(&self, kind: NavEventKind) -> StateResult<u32> {
        self.get(kind).ok_or(StateError::PositionUnknown(kind))
    }

    /// Treats the last parameter as a flag; never observed counts as off.
    pub fn flag(&self, kind: NavEventKind) -> bool {
        self.get(kind).map_or(false, |param| param != 0)
    }

    /// Whether a title is active, meaning the title number is known and non-zero.
    pub fn title_active(&self) -> bool {
        self.flag(NavEventKind::Title)
    }

    pub(crate) fn record(&mut self, event: NavEvent) {
        if event.kind != NavEventKind::None {
            self.slots[event.kind as usize] = Some(event.param);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.slots = [None; NavEventKind::COUNT];
    }

    /// Iterates over every observed kind and its parameter.
    pub fn observed(&self) -> impl Iterator<Item = (NavEventKind, u32)> + '_ {
        NavEventKind::ALL
            .iter()
            .zip(self.slots.iter())
            .filter_map(|(kind, slot)| slot.map(|param| (*kind, param)))
    }
}

/// A contiguous stream segment within a playlist.
///
/// All times are navigation ticks.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ClipInfo {
    /// Name of the stream file holding this clip, without directory or extension.
    pub clip_id: String,
    /// Presentation timestamp at which the clip starts within its stream file.
    pub in_time: u64,
    /// Presentation timestamp at which the clip ends within its stream file.
    pub out_time: u64,
    /// Where the clip starts on the playlist's timeline.
    pub start_time: u64,
}

impl ClipInfo {
    pub fn duration(&self) -> u64 {
        self.out_time.saturating_sub(self.in_time)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ChapterInfo {
    /// Start on the playlist's timeline.
    pub start: u64,
    pub duration: u64,
}

/// The active playlist as described by the navigation engine.
#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PlaylistInfo {
    pub playlist: u32,
    pub angle: u32,
    /// Total duration of the playlist in ticks.
    pub duration: u64,
    pub chapters: Vec<ChapterInfo>,
    /// Clips in playback order.
    pub clips: Vec<ClipInfo>,
}

impl PlaylistInfo {

    /// Looks up a chapter by its 1-based number.
    pub fn chapter(&self, number: u32) -> Option<&ChapterInfo> {
        number.checked_sub(1).and_then(|index| self.chapters.get(index as usize))
    }

    /// Total duration of every clip before `play_item`.
    pub fn preceding_duration(&self, play_item: u32) -> u64 {
        self.clips.iter().take(play_item as usize).map(ClipInfo::duration).sum()
    }
}

/// Resolves the current playlist from the table's playlist and angle.
pub fn resolve_playlist<N>(info: &PlayerInfo, nav: &N) -> StateResult<PlaylistInfo> where
    N: NavigationEngine + ?Sized,
{

    let playlist = info.require(NavEventKind::Playlist)?;
    let angle = info.get(NavEventKind::Angle).unwrap_or(0);

    nav.playlist_info(playlist, angle).ok_or(StateError::MissingPlaylist { playlist, angle })
}

/// Resolves the current clip from the current playlist and play item.
pub fn resolve_clip<N>(info: &PlayerInfo, nav: &N) -> StateResult<ClipInfo> where
    N: NavigationEngine + ?Sized,
{
    let playlist = resolve_playlist(info, nav)?;
    clip_of(info, &playlist).cloned()
}

/// Picks the current clip out of an already resolved playlist.
pub fn clip_of<'a>(info: &PlayerInfo, playlist: &'a PlaylistInfo) -> StateResult<&'a ClipInfo> {

    let play_item = info.require(NavEventKind::PlayItem)?;

    playlist.clips.get(play_item as usize).ok_or(
        StateError::ClipOutOfRange {
            play_item,
            clips: playlist.clips.len(),
        }
    )
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_unset_is_not_zero() {

        let mut info = PlayerInfo::new();

        assert_eq!(info.get(NavEventKind::PlayItem), None);
        assert_eq!(
            info.require(NavEventKind::PlayItem),
            Err(StateError::PositionUnknown(NavEventKind::PlayItem)),
        );

        info.record(NavEvent::new(NavEventKind::PlayItem, 0));

        assert_eq!(info.get(NavEventKind::PlayItem), Some(0));
        assert_eq!(info.require(NavEventKind::PlayItem), Ok(0));
    }

    #[test]
    fn test_record_overwrites_and_reset_clears() {

        let mut info = PlayerInfo::new();

        info.record(NavEvent::new(NavEventKind::Chapter, 2));
        info.record(NavEvent::new(NavEventKind::Chapter, 5));
        info.record(NavEvent::none());

        assert_eq!(info.get(NavEventKind::Chapter), Some(5));
        assert_eq!(info.get(NavEventKind::None), None);
        assert_eq!(info.observed().count(), 1);

        info.reset();

        assert_eq!(info.observed().count(), 0);
    }

    #[test]
    fn test_chapter_numbers_are_one_based() {

        let playlist = PlaylistInfo {
            chapters: vec![
                ChapterInfo { start: 0, duration: 100 },
                ChapterInfo { start: 100, duration: 50 },
            ],
            ..Default::default()
        };

        assert_eq!(playlist.chapter(0), None);
        assert_eq!(playlist.chapter(2).map(|c| c.start), Some(100));
        assert_eq!(playlist.chapter(3), None);
    }

    #[test]
    fn test_preceding_duration() {

        let playlist = PlaylistInfo {
            clips: vec![
                ClipInfo { in_time: 1_000, out_time: 4_000, ..Default::default() },
                ClipInfo { in_time: 500, out_time: 2_500, ..Default::default() },
                ClipInfo { in_time: 0, out_time: 9_000, ..Default::default() },
            ],
            ..Default::default()
        };

        assert_eq!(playlist.preceding_duration(0), 0);
        assert_eq!(playlist.preceding_duration(2), 5_000);
        assert_eq!(playlist.preceding_duration(10), 14_000);
    }
}
