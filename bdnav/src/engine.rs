/*
 * SPDX-FileCopyrightText: 2021 William Swartzendruber <wswartzendruber@gmail.com>
 *
 * SPDX-License-Identifier: OSL-3.0
 */

//! The command surfaces of the two engines this crate bridges.
//!
//! Bindings to a real navigation library or media player implement these traits. All calls are
//! synchronous; a failure is reported once and never retried at this layer.

use super::{
    event::NavEvent,
    info::PlaylistInfo,
};
use std::{
    fmt,
    path::Path,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// A specialized [`Result`](std::result::Result) type for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// The error type for engine calls.
#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The navigation engine rejected a call or could not read from the disc.
    #[error("navigation engine: {0}")]
    Navigation(String),
    /// The playback engine rejected a command.
    #[error("playback engine: {0}")]
    Playback(String),
}

/// What the navigation engine reports about a disc it has opened.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct DiscInfo {
    /// Whether a Blu-ray disc structure was detected at all.
    pub bluray_detected: bool,
    /// Whether the disc defines a first-play title.
    pub first_play_supported: bool,
}

/// Virtual keys understood by the navigation engine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserKey {
    RootMenu,
    Popup,
    Up,
    Down,
    Left,
    Right,
    Enter,
    MouseActivate,
}

impl UserKey {

    /// The engine's numeric key code.
    pub fn code(self) -> u32 {
        match self {
            Self::RootMenu => 10,
            Self::Popup => 11,
            Self::Up => 12,
            Self::Down => 13,
            Self::Left => 14,
            Self::Right => 15,
            Self::Enter => 16,
            Self::MouseActivate => 17,
        }
    }
}

/// The navigation engine: disc structure, menus, and their event stream.
pub trait NavigationEngine {

    /// Opens the disc rooted at `path`.
    fn open(&mut self, path: &Path) -> EngineResult<DiscInfo>;

    fn close(&mut self);

    /// Starts navigation at the disc's first title.
    fn play(&mut self) -> EngineResult<()>;

    /// Seeks to a byte offset within the current title, returning the new position.
    fn seek(&mut self, offset: u64) -> EngineResult<u64>;

    /// Seeks to a tick within the current title, returning the new position.
    fn seek_time(&mut self, tick: u64) -> EngineResult<u64>;

    fn user_input(&mut self, pts: u64, key: UserKey) -> EngineResult<()>;

    /// Selects whatever button lies under `(x, y)` in navigation space.
    fn mouse_select(&mut self, pts: u64, x: u16, y: u16) -> EngineResult<()>;

    fn menu_call(&mut self, pts: u64) -> EngineResult<()>;

    /// Size of the current title in bytes.
    fn title_size(&self) -> u64;

    fn playlist_info(&self, playlist: u32, angle: u32) -> Option<PlaylistInfo>;

    /// Returns the next queued event without blocking, or a `None` kind event when the queue is
    /// empty.
    fn next_event(&mut self) -> NavEvent;

    /// Reads stream data into `buf`, returning the byte count and any event raised on the way.
    /// An error means the end of the title's data or a read failure.
    fn read(&mut self, buf: &mut [u8]) -> EngineResult<(usize, NavEvent)>;
}

/// Properties of the playback engine this crate reads or writes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Property {
    Pause,
    TimePos,
    Duration,
    Width,
    Height,
    Sid,
    Aid,
}

impl Property {

    /// The property's name on the playback engine's wire.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::TimePos => "time-pos",
            Self::Duration => "duration",
            Self::Width => "width",
            Self::Height => "height",
            Self::Sid => "sid",
            Self::Aid => "aid",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Flag(bool),
    Int(i64),
    Double(f64),
}

impl PropertyValue {

    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Flag(_) => None,
            Self::Int(value) => Some(value as f64),
            Self::Double(value) => Some(value),
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(value),
            Self::Int(value) => Some(value != 0),
            Self::Double(_) => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(value) => write!(f, "{}", if *value { "yes" } else { "no" }),
            Self::Int(value) => write!(f, "{}", value),
            Self::Double(value) => write!(f, "{:.3}", value),
        }
    }
}

/// The playback engine: decodes and presents one stream file at a time.
pub trait PlaybackEngine {

    fn load(&mut self, path: &Path) -> EngineResult<()>;

    /// Seeks to an absolute position in seconds.
    fn seek(&mut self, seconds: f64) -> EngineResult<()>;

    fn set_property(&mut self, property: Property, value: PropertyValue) -> EngineResult<()>;

    fn get_property(&self, property: Property) -> Option<PropertyValue>;
}
