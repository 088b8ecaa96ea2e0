/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! Decides what the playback engine plays.
//!
//! After every change of navigation state the controller resolves the current clip, works out
//! whether playback has to resume part way into it, and loads the clip's stream file. It is the
//! only place that issues load and seek commands to the playback engine.

#[cfg(test)]
mod tests;

use super::{
    engine::{EngineError, NavigationEngine, PlaybackEngine},
    event::NavEventKind,
    info::{clip_of, resolve_playlist, ClipInfo, PlayerInfo, PlaylistInfo, StateError, StateResult},
    timestamp::ticks_to_seconds,
};
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;
use tracing::{debug, info};

/// A specialized [`Result`](std::result::Result) type for play operations.
pub type PlayResult<T> = Result<T, PlayError>;

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum PlayError {
    /// The current position could not be resolved.
    #[error("cannot continue navigation: {source}")]
    State {
        #[from]
        source: StateError,
    },
    #[error("playback command failed: {source}")]
    Engine {
        #[from]
        source: EngineError,
    },
}

/// Where a disc keeps its stream files.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(default)]
pub struct StreamLayout {
    /// Directory of stream files, relative to the disc root.
    pub stream_dir: PathBuf,
    pub extension: String,
}

impl Default for StreamLayout {
    fn default() -> Self {
        Self {
            stream_dir: PathBuf::from("BDMV").join("STREAM"),
            extension: "m2ts".to_string(),
        }
    }
}

/// What happens when the playback engine runs off the end of the current clip.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SegmentEnd {
    /// The clip was the last of its playlist; the title has to be read to its end.
    EndOfPlaylist,
    /// Navigation continues at this tick of the playlist's timeline.
    Seek(u64),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayController {
    disc_dir: PathBuf,
    layout: StreamLayout,
    deferred_start: Option<f64>,
}

impl PlayController {

    pub fn new<D: Into<PathBuf>>(disc_dir: D, layout: StreamLayout) -> Self {
        Self {
            disc_dir: disc_dir.into(),
            layout,
            deferred_start: None,
        }
    }

    pub fn disc_dir(&self) -> &Path {
        &self.disc_dir
    }

    /// Seconds to seek to once the pending load completes.
    pub fn deferred_start(&self) -> Option<f64> {
        self.deferred_start
    }

    /// The stream file holding `clip`.
    pub fn stream_path(&self, clip: &ClipInfo) -> PathBuf {
        self.disc_dir
            .join(&self.layout.stream_dir)
            .join(&clip.clip_id)
            .with_extension(&self.layout.extension)
    }

    /// Loads the current clip, remembering where to start it if a title begins part way in.
    ///
    /// Any earlier deferred start is superseded.
    pub fn play_current_segment<N, P>(
        &mut self,
        info: &PlayerInfo,
        nav: &N,
        playback: &mut P,
    ) -> PlayResult<PathBuf> where
        N: NavigationEngine + ?Sized,
        P: PlaybackEngine + ?Sized,
    {

        let playlist = resolve_playlist(info, nav)?;
        let clip = clip_of(info, &playlist)?;

        self.deferred_start = None;

        if info.title_active() {

            let play_item = info.require(NavEventKind::PlayItem)?;
            let offset = info
                .get(NavEventKind::Chapter)
                .and_then(|chapter| chapter_start_offset(&playlist, play_item, chapter));

            self.deferred_start = offset.map(ticks_to_seconds);
        }

        let path = self.stream_path(clip);

        match self.deferred_start {
            Some(start) => info!("loading {} from {:.3}s", path.display(), start),
            None => info!("loading {}", path.display()),
        }

        playback.load(&path)?;

        Ok(path)
    }

    /// Applies the deferred start, if any, once the loaded file is ready.
    ///
    /// The start is applied at most once.
    pub fn on_file_loaded<P>(&mut self, playback: &mut P) -> PlayResult<Option<f64>> where
        P: PlaybackEngine + ?Sized,
    {
        match self.deferred_start.take() {
            Some(start) => {
                debug!("seeking to deferred start {:.3}s", start);
                playback.seek(start)?;
                Ok(Some(start))
            }
            None => {
                Ok(None)
            }
        }
    }
}

/// Ticks into the current clip at which `chapter` (1-based) starts.
///
/// Returns `None` unless the chapter starts strictly inside the clip at `play_item`.
pub fn chapter_start_offset(playlist: &PlaylistInfo, play_item: u32, chapter: u32) -> Option<u64> {

    let start = playlist.chapter(chapter)?.start;
    let clip = playlist.clips.get(play_item as usize)?;

    start
        .checked_sub(playlist.preceding_duration(play_item))
        .filter(|offset| *offset > 0 && *offset < clip.duration())
}

/// Decides how navigation continues past the end of the current clip.
pub fn segment_end<N>(info: &PlayerInfo, nav: &N) -> StateResult<SegmentEnd> where
    N: NavigationEngine + ?Sized,
{

    let playlist = resolve_playlist(info, nav)?;
    let clip = clip_of(info, &playlist)?;
    let end = clip.start_time + clip.duration();

    if end >= playlist.duration {
        Ok(SegmentEnd::EndOfPlaylist)
    } else {
        Ok(SegmentEnd::Seek(end))
    }
}
